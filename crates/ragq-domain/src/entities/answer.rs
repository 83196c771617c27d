//! The answer record returned to callers and stored in the cache.

use serde::{Deserialize, Serialize};

use super::retrieval::Source;

/// A single cited source in an [`AnswerRecord`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerSource {
    /// Display file name, as used in the `[Source N: name]` citation.
    pub file_name: String,
    /// The score this chunk was ranked by.
    pub score: f64,
    /// The chunk's text.
    pub text: String,
    /// Position of the chunk within its file.
    pub chunk_index: usize,
    /// File id.
    pub file_id: String,
    /// Contributing retrieval path(s).
    pub sources: Vec<Source>,
    /// 1-indexed fusion rank, when the answer came from hybrid search.
    pub fusion_rank: Option<usize>,
}

/// Metadata describing how an [`AnswerRecord`] was produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    /// The original question, as submitted (pre-normalization).
    pub question: String,
    /// Number of chunks retrieved before context-length truncation.
    pub chunks_retrieved: usize,
    /// Number of chunks actually fed to the LLM.
    pub chunks_used: usize,
    /// Length in characters of the assembled context.
    pub context_length: usize,
    /// Count of distinct files among the retrieved chunks.
    pub unique_files: usize,
    /// Distinct file display names among the retrieved chunks.
    pub unique_file_names: Vec<String>,
    /// Which search mode produced this answer.
    pub search_mode: String,
    /// Unix-epoch milliseconds when the answer was produced.
    pub timestamp: i64,
    /// `true` when this record was served from the cache rather than
    /// freshly computed.
    pub cache_hit: Option<bool>,
    /// Present when retrieval short-circuited instead of calling the LLM
    /// (e.g. `"no_files"`).
    pub reason: Option<String>,
}

/// The answer returned to callers and cached for the TTL window.
/// Immutable once constructed. Serializes as camelCase (§6): this is the
/// one wire contract, reused unchanged for both the HTTP response body
/// and the JSON blob a completed job stores in its `result` field.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerRecord {
    /// The synthesized answer text.
    pub answer: String,
    /// The assembled context that was fed to the LLM.
    pub context: String,
    /// Sources cited in the answer, including any dropped for length.
    pub sources: Vec<AnswerSource>,
    /// Provenance metadata.
    pub metadata: Metadata,
}
