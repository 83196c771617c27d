//! Value objects shared across entities and ports.

mod search;

pub use search::{AskOptions, SearchMode};

/// Tunable constants. Centralized so tests and implementations agree on
/// the numbers that matter across the crate.
pub mod constants {
    /// RRF smoothing constant `K` (§4.F).
    pub const RRF_K: f64 = 60.0;
    /// Diversity penalty base (§4.F): `0.9^n_prior_from_same_file`.
    pub const DIVERSITY_PENALTY_BASE: f64 = 0.9;
    /// BM25 `k1` term-frequency saturation parameter (§4.B).
    pub const BM25_K1: f64 = 1.5;
    /// BM25 `b` length-normalization parameter (§4.B).
    pub const BM25_B: f64 = 0.75;
    /// Default number of results returned post-fusion/filter.
    pub const DEFAULT_TOP_K: usize = 5;
    /// Default minimum similarity score, vector-only mode.
    pub const DEFAULT_MIN_SCORE: f32 = 0.0;
    /// Maximum characters fed to the LLM as context (§4.G.1).
    pub const DEFAULT_MAX_CONTEXT_LENGTH: usize = 4000;
    /// Fixed embedding dimension; any other size is a protocol error.
    pub const EMBEDDING_DIMENSIONS: usize = 1024;
    /// Answer cache capacity (§3).
    pub const CACHE_MAX_ENTRIES: usize = 200;
    /// Answer cache TTL, in seconds (§3).
    pub const CACHE_TTL_SECS: u64 = 300;
    /// Default LLM sampling temperature (§4.E).
    pub const DEFAULT_TEMPERATURE: f32 = 0.2;
    /// Default LLM max output tokens (§4.E).
    pub const DEFAULT_MAX_TOKENS: u32 = 500;
    /// Default worker poll interval, in milliseconds (§4.H).
    pub const DEFAULT_POLL_INTERVAL_MS: u64 = 1000;
    /// Default worker heartbeat interval, in milliseconds (§4.H).
    pub const DEFAULT_HEARTBEAT_INTERVAL_MS: u64 = 5000;
    /// Grace period a worker waits for an in-flight job during shutdown.
    pub const SHUTDOWN_GRACE_SECS: u64 = 30;
    /// Embedding service single-request timeout, in seconds.
    pub const EMBED_TIMEOUT_SECS: u64 = 30;
    /// Embedding service batch-request timeout, in seconds.
    pub const EMBED_BATCH_TIMEOUT_SECS: u64 = 60;
    /// Embedding batch size.
    pub const EMBED_BATCH_SIZE: usize = 12;
    /// Embedding health-check cache lifetime, in seconds.
    pub const EMBED_HEALTH_CACHE_SECS: u64 = 60;
    /// Priority assigned to jobs enqueued from the HTTP surface. No
    /// per-request priority knob is exposed (§6).
    pub const DEFAULT_JOB_PRIORITY: i64 = 5;
    /// Advisory job timeout, in milliseconds, for HTTP-enqueued jobs.
    pub const DEFAULT_JOB_TIMEOUT_MS: u64 = 30_000;
    /// Vector store collection name surfaced by `/stats`.
    pub const VECTOR_COLLECTION_NAME: &str = "rag_chunks";
}
