//! Per-job dispatch: heartbeat task, progress reporting, and routing a
//! claimed job to the pipeline by its task type (§4.H).

use std::sync::Arc;

use ragq_domain::entities::{AnswerRecord, Job, TaskType};
use ragq_domain::error::{Error, Result};
use ragq_domain::value_objects::{AskOptions, SearchMode};
use tokio::task::JoinHandle;

use crate::context::WorkerContext;

/// Progress written the moment a job is claimed, before any retrieval work
/// has started.
const PROGRESS_CLAIMED: u8 = 10;
/// Progress written once synthesis has produced an answer, before the
/// queue is updated with the terminal status.
const PROGRESS_SYNTHESIZED: u8 = 90;

/// Run one claimed job to completion: heartbeat while it's in flight,
/// report progress, dispatch to the pipeline, and record the outcome.
pub async fn process_job(ctx: Arc<WorkerContext>, job: Job) {
    let job_id = job.id.clone();
    tracing::info!(job_id = %job_id, task_type = ?job.task_type, "claimed job");

    if let Err(e) = ctx.queue.update_progress(&job_id, PROGRESS_CLAIMED, 0).await {
        tracing::warn!(job_id = %job_id, error = %e, "failed to write initial progress");
    }

    let heartbeat = spawn_heartbeat(&ctx, job_id.clone());
    let outcome = run_task(&ctx, &job).await;
    heartbeat.abort();

    match outcome {
        Ok(record) => {
            if let Err(e) = ctx
                .queue
                .update_progress(&job_id, PROGRESS_SYNTHESIZED, record.metadata.chunks_used)
                .await
            {
                tracing::warn!(job_id = %job_id, error = %e, "failed to write pre-completion progress");
            }
            let result = serde_json::to_value(&record).unwrap_or(serde_json::Value::Null);
            if let Err(e) = ctx.queue.complete(&job_id, &ctx.worker_id, result).await {
                tracing::error!(job_id = %job_id, error = %e, "failed to record job completion");
            }
        }
        Err(e) => {
            tracing::warn!(job_id = %job_id, error = %e, "job failed");
            if let Err(e2) = ctx.queue.fail(&job_id, &ctx.worker_id, &e.to_string()).await {
                tracing::error!(job_id = %job_id, error = %e2, "failed to record job failure");
            }
        }
    }
}

fn spawn_heartbeat(ctx: &Arc<WorkerContext>, job_id: String) -> JoinHandle<()> {
    let ctx = ctx.clone();
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(ctx.heartbeat_interval);
        ticker.tick().await; // claim() already wrote started_at; skip the immediate first tick
        loop {
            ticker.tick().await;
            if let Err(e) = ctx.queue.heartbeat(&job_id, &ctx.worker_id).await {
                tracing::warn!(job_id = %job_id, error = %e, "heartbeat failed");
            }
        }
    })
}

async fn run_task(ctx: &WorkerContext, job: &Job) -> Result<AnswerRecord> {
    let options = options_for(job)?;

    match job.task_type {
        TaskType::RagQuery => {
            let has_files = !ctx
                .file_registry
                .list_file_names(&job.payload.user_id)
                .await?
                .is_empty();
            let options = AskOptions { has_files, ..options };
            ctx.pipeline
                .answer(&job.payload.question, &job.payload.user_id, options)
                .await
        }
        TaskType::RagQueryFile => {
            let file_id = job
                .payload
                .file_id
                .as_deref()
                .ok_or_else(|| Error::invalid_input("RAG_QUERY_FILE job missing fileId"))?;
            ctx.pipeline
                .answer_for_file(&job.payload.question, file_id, &job.payload.user_id, options)
                .await
        }
        TaskType::ProcessFile => Err(Error::invalid_input(
            "PROCESS_FILE jobs are not handled by this worker",
        )),
    }
}

/// `AskOptions::default()` carries the standard defaults; a job payload only
/// overrides `topK`/`minScore`/`searchMode` when the caller actually
/// supplied them. `has_files` is filled in by the caller once it knows the
/// task type.
fn options_for(job: &Job) -> Result<AskOptions> {
    let defaults = AskOptions::default();
    let search_mode = job
        .payload
        .search_mode
        .as_deref()
        .map(SearchMode::parse)
        .transpose()?
        .unwrap_or(defaults.search_mode);
    Ok(AskOptions {
        top_k: job.payload.top_k.unwrap_or(defaults.top_k),
        min_score: job.payload.min_score.unwrap_or(defaults.min_score),
        search_mode,
        ..defaults
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ragq_application::cache::AnswerCache;
    use ragq_application::pipeline::PipelineOrchestrator;
    use ragq_domain::entities::{JobPayload, JobState, QueueClass};
    use ragq_domain::ports::{
        MockBm25Index, MockEmbeddingClient, MockFileRegistryClient, MockLlmClient,
        MockQueueClient, MockVectorStoreClient,
    };
    use std::time::Duration;

    fn job(task_type: TaskType, payload: JobPayload) -> Job {
        Job::new(
            "job-1".to_owned(),
            task_type,
            QueueClass::Rag,
            5,
            payload,
            30_000,
            0,
        )
    }

    fn build_ctx(
        bm25: MockBm25Index,
        vector_store: MockVectorStoreClient,
        embedding: MockEmbeddingClient,
        llm: MockLlmClient,
        file_registry: MockFileRegistryClient,
    ) -> WorkerContext {
        let file_registry = Arc::new(file_registry);
        let pipeline = Arc::new(PipelineOrchestrator::new(
            Arc::new(bm25),
            Arc::new(vector_store),
            Arc::new(embedding),
            Arc::new(llm),
            file_registry.clone(),
            Arc::new(AnswerCache::new()),
        ));
        WorkerContext {
            queue: Arc::new(MockQueueClient::new()),
            pipeline,
            file_registry,
            worker_id: "worker-1".to_owned(),
            worker_type: QueueClass::Rag,
            poll_interval: Duration::from_millis(10),
            heartbeat_interval: Duration::from_millis(10),
        }
    }

    #[test]
    fn options_for_falls_back_to_defaults_when_payload_omits_them() {
        let j = job(
            TaskType::RagQuery,
            JobPayload {
                user_id: "u1".to_owned(),
                question: "what?".to_owned(),
                top_k: None,
                min_score: None,
                file_id: None,
                search_mode: None,
            },
        );
        let options = options_for(&j).unwrap();
        let defaults = AskOptions::default();
        assert_eq!(options.top_k, defaults.top_k);
        assert_eq!(options.min_score, defaults.min_score);
    }

    #[test]
    fn options_for_honors_payload_overrides() {
        let j = job(
            TaskType::RagQuery,
            JobPayload {
                user_id: "u1".to_owned(),
                question: "what?".to_owned(),
                top_k: Some(3),
                min_score: Some(0.4),
                file_id: None,
                search_mode: None,
            },
        );
        let options = options_for(&j).unwrap();
        assert_eq!(options.top_k, 3);
        assert!((options.min_score - 0.4).abs() < f32::EPSILON);
    }

    #[test]
    fn options_for_parses_a_payload_search_mode() {
        let j = job(
            TaskType::RagQuery,
            JobPayload {
                user_id: "u1".to_owned(),
                question: "what?".to_owned(),
                top_k: None,
                min_score: None,
                file_id: None,
                search_mode: Some("bm25".to_owned()),
            },
        );
        let options = options_for(&j).unwrap();
        assert_eq!(options.search_mode, SearchMode::Bm25);
    }

    #[test]
    fn options_for_rejects_an_unknown_search_mode() {
        let j = job(
            TaskType::RagQuery,
            JobPayload {
                user_id: "u1".to_owned(),
                question: "what?".to_owned(),
                top_k: None,
                min_score: None,
                file_id: None,
                search_mode: Some("quantum".to_owned()),
            },
        );
        let err = options_for(&j).unwrap_err();
        assert_eq!(err.code(), "INVALID_INPUT");
    }

    #[tokio::test]
    async fn process_file_jobs_are_rejected_without_touching_the_pipeline() {
        let ctx = build_ctx(
            MockBm25Index::new(),
            MockVectorStoreClient::new(),
            MockEmbeddingClient::new(),
            MockLlmClient::new(),
            MockFileRegistryClient::new(),
        );
        let j = job(
            TaskType::ProcessFile,
            JobPayload {
                user_id: "u1".to_owned(),
                question: String::new(),
                top_k: None,
                min_score: None,
                file_id: None,
                search_mode: None,
            },
        );
        let err = run_task(&ctx, &j).await.unwrap_err();
        assert_eq!(err.code(), "INVALID_INPUT");
    }

    #[tokio::test]
    async fn rag_query_file_without_a_file_id_is_rejected() {
        let ctx = build_ctx(
            MockBm25Index::new(),
            MockVectorStoreClient::new(),
            MockEmbeddingClient::new(),
            MockLlmClient::new(),
            MockFileRegistryClient::new(),
        );
        let j = job(
            TaskType::RagQueryFile,
            JobPayload {
                user_id: "u1".to_owned(),
                question: "what?".to_owned(),
                top_k: None,
                min_score: None,
                file_id: None,
                search_mode: None,
            },
        );
        let err = run_task(&ctx, &j).await.unwrap_err();
        assert_eq!(err.code(), "INVALID_INPUT");
    }

    #[tokio::test]
    async fn rag_query_with_no_indexed_files_short_circuits_to_the_canned_answer() {
        let mut file_registry = MockFileRegistryClient::new();
        file_registry
            .expect_list_file_names()
            .returning(|_| Ok(Vec::new()));

        let ctx = build_ctx(
            MockBm25Index::new(),
            MockVectorStoreClient::new(),
            MockEmbeddingClient::new(),
            MockLlmClient::new(),
            file_registry,
        );
        let j = job(
            TaskType::RagQuery,
            JobPayload {
                user_id: "u1".to_owned(),
                question: "what?".to_owned(),
                top_k: None,
                min_score: None,
                file_id: None,
                search_mode: None,
            },
        );
        let record = run_task(&ctx, &j).await.unwrap();
        assert_eq!(record.metadata.reason.as_deref(), Some("no_files"));
    }

    #[test]
    fn job_state_starts_queued_with_zero_progress() {
        let j = job(
            TaskType::RagQuery,
            JobPayload {
                user_id: "u1".to_owned(),
                question: "what?".to_owned(),
                top_k: None,
                min_score: None,
                file_id: None,
                search_mode: None,
            },
        );
        assert_eq!(j.state.status, ragq_domain::entities::JobStatus::Queued);
        assert_eq!(j.state.progress, 0);
        let _: JobState = j.state;
    }
}
