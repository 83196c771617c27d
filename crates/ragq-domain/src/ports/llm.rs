//! LLM Client port (§4.E).

use async_trait::async_trait;

use crate::error::Result;
use crate::value_objects::constants::{DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE};

/// Parameters for a single `generate_answer` call.
#[derive(Debug, Clone)]
pub struct LlmRequest {
    /// Sampling temperature.
    pub temperature: f32,
    /// Maximum tokens to generate.
    pub max_tokens: u32,
    /// Unique file names available in the context, passed through as
    /// prompt metadata so the model may reference them (§4.G step 7).
    pub unique_file_names: Vec<String>,
}

impl Default for LlmRequest {
    fn default() -> Self {
        Self {
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            unique_file_names: Vec::new(),
        }
    }
}

/// Port for context + question → answer synthesis.
///
/// Implementations are responsible for prompt framing: including the
/// context verbatim, instructing the model to answer strictly from it,
/// citing with `[Source N]` tags, and refusing with a canned reply when
/// context is empty (§4.E).
#[cfg_attr(feature = "test-utils", mockall::automock)]
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Generate an answer for `question` grounded in `context`.
    async fn generate_answer(
        &self,
        question: &str,
        context: &str,
        request: LlmRequest,
    ) -> Result<String>;
}
