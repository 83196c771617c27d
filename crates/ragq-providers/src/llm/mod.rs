//! HTTP LLM-service adapter (§4.E).

mod http;

pub use http::HttpLlmClient;
