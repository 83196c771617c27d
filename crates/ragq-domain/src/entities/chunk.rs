//! Chunk entity: the unit of retrieval, produced by ingestion (out of scope)
//! and immutable at query time.

use serde::{Deserialize, Serialize};

/// A bounded text fragment belonging to one user's file, as produced by the
/// (out-of-scope) ingestion pipeline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Chunk {
    /// Id of the file this chunk was extracted from.
    pub file_id: String,
    /// Display name of the file, used in citations.
    pub file_name: String,
    /// Owning user. Every chunk returned to a query MUST match the
    /// requester's `userId` (invariant 3).
    pub user_id: String,
    /// Position of this chunk within its file.
    pub chunk_index: usize,
    /// The chunk's text content.
    pub text: String,
    /// Pre-computed dense embedding, when available (used by the vector
    /// store; the BM25 index never needs it).
    pub embedding: Option<Vec<f32>>,
}

impl Chunk {
    /// Identity used for fusion: a chunk appearing in both the BM25 and
    /// vector result lists is recognized as the same chunk by this pair.
    #[must_use]
    pub fn identity(&self) -> (String, usize) {
        (self.file_id.clone(), self.chunk_index)
    }
}
