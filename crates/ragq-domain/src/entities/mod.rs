//! Core business entities.

mod answer;
mod chunk;
mod job;
mod retrieval;

pub use answer::{AnswerRecord, AnswerSource, Metadata};
pub use chunk::Chunk;
pub use job::{
    Job, JobId, JobPayload, JobState, JobStatus, JobSummary, QueueClass, TaskType,
};
pub use retrieval::{RetrievalResult, Source};
