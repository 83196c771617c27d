//! Embedding Client port (§4.D).

use async_trait::async_trait;

use crate::error::Result;

/// Port for turning text into fixed-dimension dense vectors.
#[cfg_attr(feature = "test-utils", mockall::automock)]
#[async_trait]
pub trait EmbeddingClient: Send + Sync {
    /// Embed a single piece of text.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Embed a batch of texts in one request (bounded by the provider's
    /// batch size; adapters chunk larger inputs internally).
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Expected output dimension. Any response of a different size is an
    /// `INTERNAL` protocol error (§4.D).
    fn dimensions(&self) -> usize;

    /// Cached health flag, refreshed at most once per the provider's
    /// configured interval. A failing health short-circuits `embed`
    /// with `UNAVAILABLE_EMBED` before attempting the network call.
    async fn healthy(&self) -> bool;
}
