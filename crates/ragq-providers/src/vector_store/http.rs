//! HTTP adapter for the external vector store (§4.C).

use async_trait::async_trait;
use ragq_domain::entities::{RetrievalResult, Source};
use ragq_domain::error::{Error, Result};
use ragq_domain::ports::{VectorFilter, VectorStoreClient};
use serde::{Deserialize, Serialize};

use crate::config::HttpClientConfig;

#[derive(Serialize)]
struct SearchRequest<'a> {
    vector: &'a [f32],
    k: usize,
    filter: FilterClause,
}

#[derive(Serialize)]
struct FilterClause {
    #[serde(rename = "must")]
    must: Vec<MatchClause>,
}

#[derive(Serialize)]
struct MatchClause {
    key: String,
    #[serde(rename = "match")]
    matches: MatchValue,
}

#[derive(Serialize)]
struct MatchValue {
    value: String,
}

#[derive(Deserialize)]
struct SearchResponse {
    results: Vec<ScoredPoint>,
}

#[derive(Deserialize)]
struct ScoredPoint {
    file_id: String,
    file_name: String,
    chunk_index: usize,
    text: String,
    score: f64,
    user_id: String,
}

#[derive(Deserialize)]
struct CountResponse {
    count: u64,
}

/// HTTP client for the vector store's point-search and cardinality
/// endpoints. The core never trusts a result that violates the requested
/// filter, re-checking server-side filter compliance rather than
/// assuming the store enforced it correctly.
pub struct HttpVectorStoreClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpVectorStoreClient {
    pub fn new(base_url: impl Into<String>) -> reqwest::Result<Self> {
        Ok(Self {
            client: HttpClientConfig::default().build()?,
            base_url: base_url.into(),
        })
    }
}

#[async_trait]
impl VectorStoreClient for HttpVectorStoreClient {
    async fn search(
        &self,
        query_vector: &[f32],
        k: usize,
        filter: VectorFilter,
    ) -> Result<Vec<RetrievalResult>> {
        let filter_value = filter.value.clone();
        let filter_key = filter.key.clone();
        let request = SearchRequest {
            vector: query_vector,
            k,
            filter: FilterClause {
                must: vec![MatchClause {
                    key: filter.key,
                    matches: MatchValue { value: filter.value },
                }],
            },
        };

        let response = self
            .client
            .post(format!("{}/search", self.base_url))
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::UnavailableVector {
                message: e.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(Error::UnavailableVector {
                message: format!("vector store returned status {}", response.status()),
            });
        }

        let body: SearchResponse = response.json().await.map_err(|e| Error::Internal {
            message: format!("malformed vector store response: {e}"),
        })?;

        let results = body
            .results
            .into_iter()
            .filter(|point| match filter_key.as_str() {
                "userId" => point.user_id == filter_value,
                "fileId" => point.file_id == filter_value,
                _ => true,
            })
            .map(|point| RetrievalResult {
                file_id: point.file_id,
                file_name: point.file_name,
                chunk_index: point.chunk_index,
                text: point.text,
                score: point.score,
                source: Source::Vector,
                rrf_score: None,
                vector_score: Some(point.score),
                bm25_score: None,
                fusion_rank: None,
                sources: vec![Source::Vector],
            })
            .collect();

        Ok(results)
    }

    async fn count(&self) -> Result<u64> {
        let response = self
            .client
            .get(format!("{}/count", self.base_url))
            .send()
            .await
            .map_err(|e| Error::UnavailableVector {
                message: e.to_string(),
            })?;

        let body: CountResponse = response.json().await.map_err(|e| Error::Internal {
            message: format!("malformed vector store count response: {e}"),
        })?;
        Ok(body.count)
    }
}
