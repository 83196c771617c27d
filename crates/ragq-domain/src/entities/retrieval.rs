//! Transient retrieval results produced per-query by BM25, vector search,
//! and fusion.

use serde::{Deserialize, Serialize};

/// Which retrieval path produced (or contributed to) a result.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    /// Lexical (Okapi BM25) match.
    Bm25,
    /// Dense vector similarity match.
    Vector,
    /// Fused from both lexical and vector lists.
    Hybrid,
}

/// A single retrieved chunk with per-query scoring metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalResult {
    /// File the chunk belongs to.
    pub file_id: String,
    /// File display name.
    pub file_name: String,
    /// Position of the chunk within its file.
    pub chunk_index: usize,
    /// The chunk's text.
    pub text: String,
    /// The score used for ranking in the path that produced this result
    /// (RRF score in hybrid mode, cosine similarity in vector mode, BM25
    /// score in lexical mode).
    pub score: f64,
    /// Which path produced this result.
    pub source: Source,
    /// Reciprocal-rank-fusion score, present only after fusion.
    pub rrf_score: Option<f64>,
    /// Cosine similarity from the vector store, when contributed.
    pub vector_score: Option<f64>,
    /// BM25 relevance score, when contributed.
    pub bm25_score: Option<f64>,
    /// 1-indexed position after fusion + diversity re-sort.
    pub fusion_rank: Option<usize>,
    /// Which list(s) contributed this chunk ("bm25", "vector", or both).
    pub sources: Vec<Source>,
}

impl RetrievalResult {
    /// Identity used for fusion de-duplication: `(fileId, chunkIndex)`.
    #[must_use]
    pub fn identity(&self) -> (String, usize) {
        (self.file_id.clone(), self.chunk_index)
    }
}
