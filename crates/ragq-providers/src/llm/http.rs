//! HTTP LLM-service adapter (§4.E).
//!
//! Owns prompt framing: the context is included verbatim, the model is
//! instructed to answer strictly from it and cite `[Source N]` tags, and
//! an empty context short-circuits to a canned refusal without a network
//! call.

use async_trait::async_trait;
use ragq_domain::error::{Error, Result};
use ragq_domain::ports::{LlmClient, LlmRequest};
use serde::{Deserialize, Serialize};

use crate::config::HttpClientConfig;

const NO_CONTEXT_REFUSAL: &str =
    "I don't have any relevant information to answer this question.";

#[derive(Serialize)]
struct CompletionRequest<'a> {
    prompt: String,
    temperature: f32,
    max_tokens: u32,
    #[serde(rename = "metadata")]
    metadata: &'a [String],
}

#[derive(Deserialize)]
struct CompletionResponse {
    completion: String,
}

/// HTTP client for the LLM completion service.
pub struct HttpLlmClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpLlmClient {
    pub fn new(base_url: impl Into<String>) -> reqwest::Result<Self> {
        Ok(Self {
            client: HttpClientConfig::default().build()?,
            base_url: base_url.into(),
        })
    }
}

#[async_trait]
impl LlmClient for HttpLlmClient {
    async fn generate_answer(
        &self,
        question: &str,
        context: &str,
        request: LlmRequest,
    ) -> Result<String> {
        if context.trim().is_empty() {
            return Ok(NO_CONTEXT_REFUSAL.to_owned());
        }

        let prompt = format!(
            "Answer the question strictly using the context below. Cite the \
             source of each claim with its [Source N] tag exactly as it \
             appears. If the context does not contain the answer, say so.\n\n\
             Context:\n{context}\n\nQuestion: {question}\n\nAnswer:"
        );

        let response = self
            .client
            .post(format!("{}/complete", self.base_url))
            .json(&CompletionRequest {
                prompt,
                temperature: request.temperature,
                max_tokens: request.max_tokens,
                metadata: &request.unique_file_names,
            })
            .send()
            .await
            .map_err(|e| Error::UnavailableLlm {
                message: e.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(Error::UnavailableLlm {
                message: format!("llm service returned status {}", response.status()),
            });
        }

        let body: CompletionResponse = response.json().await.map_err(|e| Error::Internal {
            message: format!("malformed llm response: {e}"),
        })?;
        Ok(body.completion)
    }
}
