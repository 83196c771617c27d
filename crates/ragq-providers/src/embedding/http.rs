//! HTTP embedding-service adapter (§4.D, §6).

use std::sync::Mutex;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use ragq_domain::error::{Error, Result};
use ragq_domain::ports::EmbeddingClient;
use ragq_domain::value_objects::constants::{
    EMBEDDING_DIMENSIONS, EMBED_BATCH_SIZE, EMBED_BATCH_TIMEOUT_SECS, EMBED_HEALTH_CACHE_SECS,
    EMBED_TIMEOUT_SECS,
};
use serde::{Deserialize, Serialize};

use crate::config::HttpClientConfig;

#[derive(Serialize)]
struct EmbedRequest<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct EmbedResponse {
    embedding: Vec<f32>,
}

#[derive(Serialize)]
struct EmbedBatchRequest<'a> {
    texts: &'a [String],
}

#[derive(Deserialize)]
struct EmbedBatchResponse {
    embeddings: Vec<Vec<f32>>,
}

struct HealthCache {
    checked_at: Instant,
    healthy: bool,
}

/// HTTP client for the embedding service. Retries once on timeout (§4.D)
/// and caches its own health probe so a failing service doesn't add a
/// round-trip to every `embed` call.
pub struct HttpEmbeddingClient {
    client: reqwest::Client,
    base_url: String,
    health: Mutex<Option<HealthCache>>,
}

impl HttpEmbeddingClient {
    pub fn new(base_url: impl Into<String>) -> reqwest::Result<Self> {
        Ok(Self {
            client: HttpClientConfig::default().build()?,
            base_url: base_url.into(),
            health: Mutex::new(None),
        })
    }

    async fn probe_health(&self) -> bool {
        self.client
            .get(format!("{}/health", self.base_url))
            .timeout(Duration::from_secs(EMBED_TIMEOUT_SECS))
            .send()
            .await
            .is_ok_and(|r| r.status().is_success())
    }

    async fn embed_with_retry(&self, text: &str) -> Result<Vec<f32>> {
        match self.embed_once(text).await {
            Ok(v) => Ok(v),
            Err(e) if matches!(e, Error::Timeout { .. }) => {
                tokio::time::sleep(Duration::from_secs(1)).await;
                self.embed_once(text).await
            }
            Err(e) => Err(e),
        }
    }

    async fn embed_once(&self, text: &str) -> Result<Vec<f32>> {
        let response = self
            .client
            .post(format!("{}/embed", self.base_url))
            .timeout(Duration::from_secs(EMBED_TIMEOUT_SECS))
            .json(&EmbedRequest { text })
            .send()
            .await
            .map_err(classify_transport_error)?;

        if !response.status().is_success() {
            return Err(Error::UnavailableEmbed {
                message: format!("embedding service returned status {}", response.status()),
            });
        }

        let body: EmbedResponse = response.json().await.map_err(|e| Error::Internal {
            message: format!("malformed embedding response: {e}"),
        })?;
        check_dimension(&body.embedding)?;
        Ok(body.embedding)
    }
}

#[async_trait]
impl EmbeddingClient for HttpEmbeddingClient {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        if !self.healthy().await {
            return Err(Error::UnavailableEmbed {
                message: "embedding service failed its last health check".to_owned(),
            });
        }
        self.embed_with_retry(text).await
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if !self.healthy().await {
            return Err(Error::UnavailableEmbed {
                message: "embedding service failed its last health check".to_owned(),
            });
        }

        let mut out = Vec::with_capacity(texts.len());
        for batch in texts.chunks(EMBED_BATCH_SIZE) {
            let send = || async {
                self.client
                    .post(format!("{}/embed/batch", self.base_url))
                    .timeout(Duration::from_secs(EMBED_BATCH_TIMEOUT_SECS))
                    .json(&EmbedBatchRequest { texts: batch })
                    .send()
                    .await
            };

            let response = match send().await {
                Ok(r) => r,
                Err(e) if e.is_timeout() => {
                    tokio::time::sleep(Duration::from_secs(1)).await;
                    send().await.map_err(classify_transport_error)?
                }
                Err(e) => return Err(classify_transport_error(e)),
            };

            if !response.status().is_success() {
                return Err(Error::UnavailableEmbed {
                    message: format!("embedding service returned status {}", response.status()),
                });
            }

            let body: EmbedBatchResponse = response.json().await.map_err(|e| Error::Internal {
                message: format!("malformed embedding batch response: {e}"),
            })?;
            for embedding in &body.embeddings {
                check_dimension(embedding)?;
            }
            out.extend(body.embeddings);
        }
        Ok(out)
    }

    fn dimensions(&self) -> usize {
        EMBEDDING_DIMENSIONS
    }

    async fn healthy(&self) -> bool {
        {
            let cache = self.health.lock().expect("embedding health lock poisoned");
            if let Some(cached) = cache.as_ref() {
                if cached.checked_at.elapsed() < Duration::from_secs(EMBED_HEALTH_CACHE_SECS) {
                    return cached.healthy;
                }
            }
        }

        let healthy = self.probe_health().await;
        let mut cache = self.health.lock().expect("embedding health lock poisoned");
        *cache = Some(HealthCache {
            checked_at: Instant::now(),
            healthy,
        });
        healthy
    }
}

fn check_dimension(embedding: &[f32]) -> Result<()> {
    if embedding.len() != EMBEDDING_DIMENSIONS {
        return Err(Error::Internal {
            message: format!(
                "embedding service returned {} dimensions, expected {EMBEDDING_DIMENSIONS}",
                embedding.len()
            ),
        });
    }
    Ok(())
}

fn classify_transport_error(e: reqwest::Error) -> Error {
    if e.is_timeout() {
        Error::Timeout {
            message: e.to_string(),
        }
    } else {
        Error::UnavailableEmbed {
            message: e.to_string(),
        }
    }
}
