//! BM25 Index port (§4.B).

use async_trait::async_trait;

use crate::entities::{Chunk, RetrievalResult};
use crate::error::Result;

/// Port for per-user lexical retrieval over a chunk corpus.
#[cfg_attr(feature = "test-utils", mockall::automock)]
#[async_trait]
pub trait Bm25Index: Send + Sync {
    /// Replace the indexed corpus for `user_id` with `chunks`. Rebuilds
    /// take a writer lock while reads continue serving the previous
    /// snapshot (§4.B, §5).
    async fn rebuild(&self, user_id: &str, chunks: Vec<Chunk>);

    /// Top-`limit` chunks for `query` within `user_id`'s corpus, ordered
    /// by descending BM25 score. An empty corpus returns an empty list
    /// without error (§4.B).
    async fn search(&self, user_id: &str, query: &str, limit: usize) -> Result<Vec<RetrievalResult>>;
}
