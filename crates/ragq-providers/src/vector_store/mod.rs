//! HTTP vector-store adapter (§4.C).

mod http;

pub use http::HttpVectorStoreClient;
