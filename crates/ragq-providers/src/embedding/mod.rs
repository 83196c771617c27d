//! HTTP embedding-service adapter (§4.D).

mod http;

pub use http::HttpEmbeddingClient;
