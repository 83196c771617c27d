//! Vector Client port (§4.C).

use async_trait::async_trait;

use crate::entities::RetrievalResult;
use crate::error::Result;

/// A server-side equality filter applied by the vector store. The core
/// never trusts results that violate the requested filter (§4.C).
#[derive(Debug, Clone)]
pub struct VectorFilter {
    /// Metadata key to filter on (`"userId"` or `"fileId"`).
    pub key: String,
    /// Required value for that key.
    pub value: String,
}

impl VectorFilter {
    /// Filter retrieval to a single user's chunks.
    #[must_use]
    pub fn user(user_id: impl Into<String>) -> Self {
        Self {
            key: "userId".to_owned(),
            value: user_id.into(),
        }
    }

    /// Filter retrieval to a single file's chunks (file-scoped variant).
    #[must_use]
    pub fn file(file_id: impl Into<String>) -> Self {
        Self {
            key: "fileId".to_owned(),
            value: file_id.into(),
        }
    }
}

/// Port for filtered k-NN retrieval against the external vector store.
#[cfg_attr(feature = "test-utils", mockall::automock)]
#[async_trait]
pub trait VectorStoreClient: Send + Sync {
    /// Search for the `k` nearest chunks to `query_vector`, constrained by
    /// `filter`. Results are ordered by descending cosine similarity.
    async fn search(
        &self,
        query_vector: &[f32],
        k: usize,
        filter: VectorFilter,
    ) -> Result<Vec<RetrievalResult>>;

    /// Total point count in the collection, for `/stats`.
    async fn count(&self) -> Result<u64>;
}
