//! External provider port interfaces.
//!
//! Every trait here is implemented by an adapter in the providers crate and
//! mocked (via `mockall`) in the application crate's unit tests. None of
//! these traits know anything about Redis, HTTP, or any other transport.

mod bm25;
mod embedding;
mod file_registry;
mod llm;
mod queue;
mod vector_store;

pub use bm25::Bm25Index;
pub use embedding::EmbeddingClient;
pub use file_registry::FileRegistryClient;
pub use llm::{LlmClient, LlmRequest};
pub use queue::{
    ClaimOutcome, EnqueueOutcome, QueueClient, QueueStats,
};
pub use vector_store::{VectorFilter, VectorStoreClient};

#[cfg(feature = "test-utils")]
pub use bm25::MockBm25Index;
#[cfg(feature = "test-utils")]
pub use embedding::MockEmbeddingClient;
#[cfg(feature = "test-utils")]
pub use file_registry::MockFileRegistryClient;
#[cfg(feature = "test-utils")]
pub use llm::MockLlmClient;
#[cfg(feature = "test-utils")]
pub use queue::MockQueueClient;
#[cfg(feature = "test-utils")]
pub use vector_store::MockVectorStoreClient;
