//! camelCase HTTP DTOs, translated to/from the snake_case domain and wire
//! types at the handler boundary (§9).

use ragq_domain::entities::{AnswerRecord, JobSummary};
use serde::{Deserialize, Serialize};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AskRequest {
    pub question: String,
    pub top_k: Option<usize>,
    pub min_score: Option<f32>,
    /// `"hybrid"` (default), `"vector"`, or `"bm25"`; rejected at the
    /// handler boundary with `INVALID_INPUT` if unrecognized.
    pub search_mode: Option<String>,
}

#[derive(Serialize)]
pub struct Envelope<T> {
    pub success: bool,
    pub data: T,
}

impl<T> Envelope<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AskAccepted {
    pub job_id: String,
    pub status_url: String,
}

/// `/ask-sync`'s response shape: `{data, metadata: {requestId, timing}}`
/// alongside the top-level envelope, distinct from `AnswerRecord`'s own
/// (per-answer) `metadata` field.
#[derive(Serialize)]
pub struct AskSyncResponse {
    pub success: bool,
    pub data: AnswerRecord,
    pub metadata: AskSyncMetadata,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AskSyncMetadata {
    pub request_id: String,
    pub timing_ms: u128,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsData {
    pub total_vectors: u64,
    pub user_files: usize,
    pub collection_name: &'static str,
    pub vector_size: usize,
}

pub type StatusData = JobSummary;
