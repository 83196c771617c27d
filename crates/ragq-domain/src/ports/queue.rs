//! Queue Client port (§4.A).

use async_trait::async_trait;
use std::collections::HashMap;

use crate::entities::{Job, JobId, JobSummary, QueueClass, TaskType};
use crate::error::Result;

/// Outcome of `enqueue()`: either the new job's id, or a sentinel meaning
/// Redis is unavailable. Never an `Err` for the "down" case: availability
/// is a first-class outcome the HTTP surface branches on (§4.A, §7).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnqueueOutcome {
    /// The job was persisted and is now claimable.
    Enqueued(JobId),
    /// Redis is currently down; the caller should run synchronously.
    Unavailable,
}

/// Outcome of `claim()`.
#[derive(Debug, Clone)]
pub enum ClaimOutcome {
    /// A job was claimed and marked `Running` for this worker.
    Claimed(Job),
    /// No job was available in this worker's queue or `queue:any`.
    Empty,
    /// Redis is currently down.
    Unavailable,
}

/// Queue depth per class, for `/stats`.
#[derive(Debug, Clone, Default)]
pub struct QueueStats {
    /// Number of queued (not yet claimed) jobs per queue class.
    pub queued_by_class: HashMap<QueueClass, u64>,
    /// Number of jobs currently held by a worker (summed across
    /// `running:<workerId>` hashes).
    pub running: u64,
}

/// Port for the Redis-backed priority job queue (§4.A).
///
/// Implementations own the single lazily-opened connection for the
/// process; this trait itself carries no connection state.
#[cfg_attr(feature = "test-utils", mockall::automock)]
#[async_trait]
pub trait QueueClient: Send + Sync {
    /// Persist a new job and make it claimable. Returns
    /// [`EnqueueOutcome::Unavailable`] rather than erroring when Redis is
    /// down (§4.A, §7).
    async fn enqueue(&self, job: &Job) -> Result<EnqueueOutcome>;

    /// Atomically claim the highest-priority job from `worker_type`'s
    /// native queue, falling back to `queue:any` (§4.A, §5).
    async fn claim(&self, worker_type: QueueClass, worker_id: &str) -> Result<ClaimOutcome>;

    /// Refresh `last_heartbeat` for a job this worker still holds.
    async fn heartbeat(&self, job_id: &str, worker_id: &str) -> Result<()>;

    /// Update `progress` and `chunks_processed` for a running job.
    /// `progress` MUST be monotonically non-decreasing (invariant 2);
    /// implementations enforce this by clamping to the previous value.
    async fn update_progress(&self, job_id: &str, progress: u8, chunks_processed: usize)
        -> Result<()>;

    /// Mark a job completed and store its JSON-encoded result.
    async fn complete(&self, job_id: &str, worker_id: &str, result: serde_json::Value)
        -> Result<()>;

    /// Mark a job failed with an error message.
    async fn fail(&self, job_id: &str, worker_id: &str, error: &str) -> Result<()>;

    /// Fetch a point-in-time status snapshot, or `None` if the job id is
    /// unknown (including jobs leaked per §5/S6).
    async fn status(&self, job_id: &str) -> Result<Option<JobSummary>>;

    /// Queue depths, for the `/stats` endpoint.
    async fn stats(&self) -> Result<QueueStats>;

    /// `true` if the last known Redis connectivity event was a success.
    /// Edge-triggered per §4.A / §9: flips on PING success/failure, not
    /// polled per call.
    async fn healthy(&self) -> bool;
}

/// Convenience used by adapters building payload JSON matching §6's
/// snake_case wire schema, kept here so both the queue client and its
/// tests agree on the task-type wire name.
#[must_use]
pub fn task_type_wire_name(task_type: TaskType) -> &'static str {
    match task_type {
        TaskType::RagQuery => "RAG_QUERY",
        TaskType::RagQueryFile => "RAG_QUERY_FILE",
        TaskType::ProcessFile => "PROCESS_FILE",
    }
}
