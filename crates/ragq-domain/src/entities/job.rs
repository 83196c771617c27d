//! Job entity and its lifecycle.
//!
//! Mirrors the Redis `job:<id>` hash schema bit-for-bit in field naming so
//! that a polyglot worker reading the same hash sees the same vocabulary.

use serde::{Deserialize, Serialize};

/// Unique identifier for a job. Typically a v4 UUID string.
pub type JobId = String;

/// The kind of work a job performs.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskType {
    /// Answer a question against a user's whole corpus.
    RagQuery,
    /// Answer a question scoped to a single file.
    RagQueryFile,
    /// Process (index) a file. Out of scope for this core; reserved so the
    /// queue schema stays shared with the ingestion pipeline's workers.
    ProcessFile,
}

/// Worker-capability tag used to route a job to a queue.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum QueueClass {
    /// CPU-bound worker class.
    Cpu,
    /// GPU-bound worker class.
    Gpu,
    /// RAG-pipeline worker class (the one this core actually drives).
    Rag,
    /// Any worker class; the fallback queue every worker also drains.
    Any,
}

impl QueueClass {
    /// Redis key for this class's sorted set.
    #[must_use]
    pub fn queue_key(self) -> String {
        format!("queue:{}", self.as_str())
    }

    /// Lowercase wire representation, matching the Redis key schema.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cpu => "cpu",
            Self::Gpu => "gpu",
            Self::Rag => "rag",
            Self::Any => "any",
        }
    }
}

/// Task-specific payload carried by a job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobPayload {
    /// Owning user, trusted from the authenticated HTTP surface.
    pub user_id: String,
    /// The natural-language question.
    pub question: String,
    /// Number of chunks to retrieve (post-fusion/filter), default applied
    /// by the caller if absent.
    pub top_k: Option<usize>,
    /// Minimum similarity score, applied only in vector-only mode.
    pub min_score: Option<f32>,
    /// File to scope retrieval to, for `RagQueryFile` jobs.
    pub file_id: Option<String>,
    /// Retrieval strategy requested by the caller (`"hybrid"`, `"vector"`,
    /// or `"bm25"`); `None` defers to `SearchMode::default()`.
    pub search_mode: Option<String>,
}

/// Lifecycle status of a job. `Queued -> Running -> (Completed | Failed)`
/// with no other transitions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    /// Waiting to be claimed.
    Queued,
    /// Claimed by exactly one worker.
    Running,
    /// Finished successfully.
    Completed,
    /// Finished with an error.
    Failed,
}

impl JobStatus {
    /// Returns `true` if no further transitions are possible.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

/// Mutable execution state of a job, updated only by the worker holding it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobState {
    /// Current lifecycle status.
    pub status: JobStatus,
    /// Progress percentage, monotonically non-decreasing while `Running`.
    pub progress: u8,
    /// Chunks processed so far (reported via `updateProgress`).
    pub chunks_processed: usize,
    /// Unix-epoch seconds when the job started running.
    pub started_at: Option<i64>,
    /// Unix-epoch seconds of the most recent heartbeat.
    pub last_heartbeat: Option<i64>,
    /// Unix-epoch seconds when the job reached a terminal state.
    pub completed_at: Option<i64>,
    /// Unix-epoch seconds when the job failed, if it did.
    pub failed_at: Option<i64>,
    /// Id of the worker currently (or formerly) holding the job.
    pub worker_id: Option<String>,
    /// Error message, present only when `status == Failed`.
    pub error: Option<String>,
    /// JSON-encoded result, present only when `status == Completed`.
    pub result: Option<serde_json::Value>,
}

impl Default for JobState {
    fn default() -> Self {
        Self {
            status: JobStatus::Queued,
            progress: 0,
            chunks_processed: 0,
            started_at: None,
            last_heartbeat: None,
            completed_at: None,
            failed_at: None,
            worker_id: None,
            error: None,
            result: None,
        }
    }
}

/// A unit of deferred work tracked in Redis, owned by at most one worker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    /// Unique identifier.
    pub id: JobId,
    /// What kind of work this job performs.
    pub task_type: TaskType,
    /// Queue selector used to route the job.
    pub requires: QueueClass,
    /// Scheduling priority. Larger values are claimed first (see
    /// `DESIGN.md` for the resolution of the priority-sign ambiguity).
    pub priority: i64,
    /// Task-specific payload.
    pub payload: JobPayload,
    /// Advisory timeout; the worker never checks its own deadline.
    pub timeout_ms: u64,
    /// Unix-epoch seconds when the job was enqueued.
    pub created_at: i64,
    /// Mutable execution state.
    pub state: JobState,
}

impl Job {
    /// Create a new job in `Queued` status with the given id and creation
    /// timestamp (supplied by the caller so construction stays pure).
    #[must_use]
    pub fn new(
        id: JobId,
        task_type: TaskType,
        requires: QueueClass,
        priority: i64,
        payload: JobPayload,
        timeout_ms: u64,
        created_at: i64,
    ) -> Self {
        Self {
            id,
            task_type,
            requires,
            priority,
            payload,
            timeout_ms,
            created_at,
            state: JobState::default(),
        }
    }
}

/// Lightweight status snapshot returned by `status()`, safe to serialize
/// directly as the HTTP `/status/:jobId` response body. Unlike [`Job`]
/// itself, which stays snake_case for the shared Go-consumer wire schema
/// (§6), this is an HTTP-only view, so it serializes as camelCase.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobSummary {
    /// Job id.
    pub id: JobId,
    /// Current lifecycle status.
    pub status: JobStatus,
    /// Progress percentage.
    pub progress: u8,
    /// Chunks processed so far.
    pub chunks_processed: usize,
    /// Error message, if failed.
    pub error: Option<String>,
    /// JSON-encoded result, if completed.
    pub result: Option<serde_json::Value>,
}

impl From<&Job> for JobSummary {
    fn from(job: &Job) -> Self {
        Self {
            id: job.id.clone(),
            status: job.state.status.clone(),
            progress: job.state.progress,
            chunks_processed: job.state.chunks_processed,
            error: job.state.error.clone(),
            result: job.state.result.clone(),
        }
    }
}
