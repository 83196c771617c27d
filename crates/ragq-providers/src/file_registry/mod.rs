//! HTTP file-registry adapter (§4.L).

mod http;

pub use http::HttpFileRegistryClient;
