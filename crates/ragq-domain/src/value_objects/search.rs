//! Search-mode selection and per-request options.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Retrieval strategy for an `answer()` call.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    /// BM25 + vector fused via RRF (§4.F). The default.
    #[default]
    Hybrid,
    /// Vector-only, with `minScore` filtering applied (§4.G step 4).
    Vector,
    /// BM25-only.
    Bm25,
}

impl SearchMode {
    /// Parse a user-supplied mode string, rejecting anything unrecognized
    /// with `INVALID_INPUT` per the error-handling design (§7).
    pub fn parse(raw: &str) -> Result<Self> {
        match raw.to_ascii_lowercase().as_str() {
            "hybrid" => Ok(Self::Hybrid),
            "vector" => Ok(Self::Vector),
            "bm25" => Ok(Self::Bm25),
            other => Err(Error::invalid_input(format!(
                "unknown search mode '{other}'"
            ))),
        }
    }

    /// Wire name, used in cache keys and metadata.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Hybrid => "hybrid",
            Self::Vector => "vector",
            Self::Bm25 => "bm25",
        }
    }
}

/// Per-request options controlling retrieval breadth and filtering.
#[derive(Debug, Clone)]
pub struct AskOptions {
    /// Number of results returned after fusion/filtering.
    pub top_k: usize,
    /// Minimum similarity score (vector-only mode).
    pub min_score: f32,
    /// Retrieval strategy.
    pub search_mode: SearchMode,
    /// `true` when the caller has at least one indexed file; `false`
    /// short-circuits to the canned "no documents" answer (§4.G step 3).
    pub has_files: bool,
}

impl Default for AskOptions {
    fn default() -> Self {
        Self {
            top_k: crate::value_objects::constants::DEFAULT_TOP_K,
            min_score: crate::value_objects::constants::DEFAULT_MIN_SCORE,
            search_mode: SearchMode::default(),
            has_files: true,
        }
    }
}
