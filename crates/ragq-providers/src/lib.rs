//! Infrastructure adapters implementing the `ragq-domain` ports.
//!
//! | Module           | Adapter                                   |
//! |-------------------|--------------------------------------------|
//! | [`queue`]         | `RedisQueueClient` (§4.A)                  |
//! | [`bm25`]          | `InMemoryBm25Index` + shared tokenizer (§4.B) |
//! | [`vector_store`]  | `HttpVectorStoreClient` (§4.C)             |
//! | [`embedding`]     | `HttpEmbeddingClient` (§4.D)                |
//! | [`llm`]           | `HttpLlmClient` (§4.E)                      |
//! | [`file_registry`] | `HttpFileRegistryClient` (§4.L)             |
//! | [`config`]        | Environment-driven process configuration   |

pub mod bm25;
pub mod config;
pub mod embedding;
pub mod file_registry;
pub mod llm;
pub mod queue;
pub mod vector_store;

pub use bm25::InMemoryBm25Index;
pub use config::Config;
pub use embedding::HttpEmbeddingClient;
pub use file_registry::HttpFileRegistryClient;
pub use llm::HttpLlmClient;
pub use queue::RedisQueueClient;
pub use vector_store::HttpVectorStoreClient;
