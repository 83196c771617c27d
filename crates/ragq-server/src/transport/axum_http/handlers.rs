//! Route handlers (§4.I). Thin by policy: validation, enqueue-or-fallback,
//! and response shaping live here; retrieval/synthesis logic lives in
//! `ragq-application`.

use std::sync::Arc;
use std::time::Instant;

use axum::extract::{Path, State};
use axum::Json;
use ragq_domain::entities::{Job, JobPayload, QueueClass, TaskType};
use ragq_domain::error::Error;
use ragq_domain::ports::EnqueueOutcome;
use ragq_domain::value_objects::constants::{
    DEFAULT_JOB_PRIORITY, DEFAULT_JOB_TIMEOUT_MS, EMBEDDING_DIMENSIONS, VECTOR_COLLECTION_NAME,
};
use ragq_domain::value_objects::{AskOptions, SearchMode};
use uuid::Uuid;

use super::auth::UserId;
use super::dto::{
    AskAccepted, AskRequest, AskSyncMetadata, AskSyncResponse, Envelope, StatsData, StatusData,
};
use super::errors::ApiError;
use super::state::AppState;

fn options_from(request: &AskRequest) -> Result<AskOptions, Error> {
    let defaults = AskOptions::default();
    let search_mode = request
        .search_mode
        .as_deref()
        .map(SearchMode::parse)
        .transpose()?
        .unwrap_or(defaults.search_mode);
    Ok(AskOptions {
        top_k: request.top_k.unwrap_or(defaults.top_k),
        min_score: request.min_score.unwrap_or(defaults.min_score),
        search_mode,
        ..defaults
    })
}

async fn has_files(state: &AppState, user_id: &str) -> Result<bool, Error> {
    Ok(!state.file_registry.list_file_names(user_id).await?.is_empty())
}

fn new_job(task_type: TaskType, payload: JobPayload) -> Job {
    Job::new(
        Uuid::new_v4().to_string(),
        task_type,
        QueueClass::Rag,
        DEFAULT_JOB_PRIORITY,
        payload,
        DEFAULT_JOB_TIMEOUT_MS,
        chrono::Utc::now().timestamp(),
    )
}

/// `POST /api/rag/ask`
pub async fn ask(
    State(state): State<Arc<AppState>>,
    UserId(user_id): UserId,
    Json(request): Json<AskRequest>,
) -> Result<axum::response::Response, ApiError> {
    use axum::response::IntoResponse;

    if request.question.trim().is_empty() {
        return Err(Error::invalid_input("question must not be empty").into());
    }
    let options = options_from(&request)?;

    let job = new_job(
        TaskType::RagQuery,
        JobPayload {
            user_id: user_id.clone(),
            question: request.question.clone(),
            top_k: request.top_k,
            min_score: request.min_score,
            file_id: None,
            search_mode: request.search_mode.clone(),
        },
    );

    match state.queue.enqueue(&job).await? {
        EnqueueOutcome::Enqueued(job_id) => Ok((
            axum::http::StatusCode::ACCEPTED,
            Json(Envelope::ok(AskAccepted {
                status_url: format!("/api/rag/status/{job_id}"),
                job_id,
            })),
        )
            .into_response()),
        EnqueueOutcome::Unavailable => {
            let options = AskOptions {
                has_files: has_files(&state, &user_id).await?,
                ..options
            };
            let record = state
                .pipeline
                .answer(&request.question, &user_id, options)
                .await?;
            Ok((
                axum::http::StatusCode::OK,
                Json(Envelope::ok(record)),
            )
                .into_response())
        }
    }
}

/// `POST /api/rag/ask-sync`
pub async fn ask_sync(
    State(state): State<Arc<AppState>>,
    UserId(user_id): UserId,
    Json(request): Json<AskRequest>,
) -> Result<Json<AskSyncResponse>, ApiError> {
    if request.question.trim().is_empty() {
        return Err(Error::invalid_input("question must not be empty").into());
    }

    let started = Instant::now();
    let options = options_from(&request)?;
    let options = AskOptions {
        has_files: has_files(&state, &user_id).await?,
        ..options
    };
    let record = state
        .pipeline
        .answer(&request.question, &user_id, options)
        .await?;

    Ok(Json(AskSyncResponse {
        success: true,
        data: record,
        metadata: AskSyncMetadata {
            request_id: Uuid::new_v4().to_string(),
            timing_ms: started.elapsed().as_millis(),
        },
    }))
}

/// `POST /api/rag/ask-file/:fileId`
pub async fn ask_file(
    State(state): State<Arc<AppState>>,
    UserId(user_id): UserId,
    Path(file_id): Path<String>,
    Json(request): Json<AskRequest>,
) -> Result<axum::response::Response, ApiError> {
    use axum::response::IntoResponse;

    if request.question.trim().is_empty() {
        return Err(Error::invalid_input("question must not be empty").into());
    }
    let options = options_from(&request)?;
    if !state.file_registry.is_owned(&file_id, &user_id).await? {
        return Err(Error::not_found(format!("file {file_id}")).into());
    }

    let job = new_job(
        TaskType::RagQueryFile,
        JobPayload {
            user_id: user_id.clone(),
            question: request.question.clone(),
            top_k: request.top_k,
            min_score: request.min_score,
            file_id: Some(file_id.clone()),
            search_mode: request.search_mode.clone(),
        },
    );

    match state.queue.enqueue(&job).await? {
        EnqueueOutcome::Enqueued(job_id) => Ok((
            axum::http::StatusCode::ACCEPTED,
            Json(Envelope::ok(AskAccepted {
                status_url: format!("/api/rag/status/{job_id}"),
                job_id,
            })),
        )
            .into_response()),
        EnqueueOutcome::Unavailable => {
            let record = state
                .pipeline
                .answer_for_file(&request.question, &file_id, &user_id, options)
                .await?;
            Ok((axum::http::StatusCode::OK, Json(Envelope::ok(record))).into_response())
        }
    }
}

/// `GET /api/rag/status/:jobId`
pub async fn status(
    State(state): State<Arc<AppState>>,
    Path(job_id): Path<String>,
) -> Result<Json<Envelope<StatusData>>, ApiError> {
    match state.queue.status(&job_id).await? {
        Some(summary) => Ok(Json(Envelope::ok(summary))),
        None => Err(Error::not_found(format!("job {job_id}")).into()),
    }
}

/// `GET /api/rag/stats`
pub async fn stats(
    State(state): State<Arc<AppState>>,
    UserId(user_id): UserId,
) -> Result<Json<Envelope<StatsData>>, ApiError> {
    let total_vectors = state.vector_store.count().await?;
    let user_files = state.file_registry.list_file_names(&user_id).await?.len();

    Ok(Json(Envelope::ok(StatsData {
        total_vectors,
        user_files,
        collection_name: VECTOR_COLLECTION_NAME,
        vector_size: EMBEDDING_DIMENSIONS,
    })))
}
