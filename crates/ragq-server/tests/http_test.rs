//! In-process HTTP surface tests via `tower::ServiceExt::oneshot` (§8).

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use ragq_application::cache::AnswerCache;
use ragq_application::pipeline::PipelineOrchestrator;
use ragq_domain::entities::{JobStatus, JobSummary};
use ragq_domain::ports::{
    EnqueueOutcome, MockBm25Index, MockEmbeddingClient, MockFileRegistryClient, MockLlmClient,
    MockQueueClient, MockVectorStoreClient,
};
use ragq_server::transport::axum_http::{build_router, AppState};
use serde_json::{json, Value};
use tower::ServiceExt;

struct Mocks {
    queue: MockQueueClient,
    bm25: MockBm25Index,
    vector_store: MockVectorStoreClient,
    embedding: MockEmbeddingClient,
    llm: MockLlmClient,
    file_registry: MockFileRegistryClient,
}

fn app(mocks: Mocks) -> axum::Router {
    let file_registry = Arc::new(mocks.file_registry);
    let vector_store = Arc::new(mocks.vector_store);
    let pipeline = Arc::new(PipelineOrchestrator::new(
        Arc::new(mocks.bm25),
        vector_store.clone(),
        Arc::new(mocks.embedding),
        Arc::new(mocks.llm),
        file_registry.clone(),
        Arc::new(AnswerCache::new()),
    ));
    let state = Arc::new(AppState {
        queue: Arc::new(mocks.queue),
        pipeline,
        vector_store,
        file_registry,
    });
    build_router(state)
}

async fn send(app: axum::Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn post(path: &str, bearer: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(path)
        .header("content-type", "application/json");
    if let Some(token) = bearer {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn get(path: &str, bearer: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(path);
    if let Some(token) = bearer {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

#[tokio::test]
async fn ask_without_a_bearer_token_is_rejected() {
    let app = app(Mocks {
        queue: MockQueueClient::new(),
        bm25: MockBm25Index::new(),
        vector_store: MockVectorStoreClient::new(),
        embedding: MockEmbeddingClient::new(),
        llm: MockLlmClient::new(),
        file_registry: MockFileRegistryClient::new(),
    });

    let (status, _) = send(app, post("/api/rag/ask", None, json!({"question": "hi"}))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn ask_returns_202_and_a_status_url_when_the_queue_accepts_the_job() {
    let mut queue = MockQueueClient::new();
    queue
        .expect_enqueue()
        .returning(|job| Ok(EnqueueOutcome::Enqueued(job.id.clone())));

    let app = app(Mocks {
        queue,
        bm25: MockBm25Index::new(),
        vector_store: MockVectorStoreClient::new(),
        embedding: MockEmbeddingClient::new(),
        llm: MockLlmClient::new(),
        file_registry: MockFileRegistryClient::new(),
    });

    let (status, body) = send(
        app,
        post("/api/rag/ask", Some("user-1"), json!({"question": "hi"})),
    )
    .await;

    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(body["success"], true);
    assert!(body["data"]["statusUrl"]
        .as_str()
        .unwrap()
        .starts_with("/api/rag/status/"));
}

#[tokio::test]
async fn ask_falls_back_to_a_synchronous_answer_when_the_queue_is_unavailable() {
    let mut queue = MockQueueClient::new();
    queue
        .expect_enqueue()
        .returning(|_| Ok(EnqueueOutcome::Unavailable));

    let mut file_registry = MockFileRegistryClient::new();
    file_registry
        .expect_list_file_names()
        .returning(|_| Ok(Vec::new()));

    let app = app(Mocks {
        queue,
        bm25: MockBm25Index::new(),
        vector_store: MockVectorStoreClient::new(),
        embedding: MockEmbeddingClient::new(),
        llm: MockLlmClient::new(),
        file_registry,
    });

    let (status, body) = send(
        app,
        post("/api/rag/ask", Some("user-1"), json!({"question": "hi"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["answer"]
        .as_str()
        .unwrap()
        .starts_with("You haven't uploaded"));
}

#[tokio::test]
async fn ask_rejects_a_blank_question_before_touching_the_queue() {
    let app = app(Mocks {
        queue: MockQueueClient::new(),
        bm25: MockBm25Index::new(),
        vector_store: MockVectorStoreClient::new(),
        embedding: MockEmbeddingClient::new(),
        llm: MockLlmClient::new(),
        file_registry: MockFileRegistryClient::new(),
    });

    let (status, body) = send(
        app,
        post("/api/rag/ask", Some("user-1"), json!({"question": "   "})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "INVALID_INPUT");
}

#[tokio::test]
async fn ask_rejects_an_unknown_search_mode_before_touching_the_queue() {
    let app = app(Mocks {
        queue: MockQueueClient::new(),
        bm25: MockBm25Index::new(),
        vector_store: MockVectorStoreClient::new(),
        embedding: MockEmbeddingClient::new(),
        llm: MockLlmClient::new(),
        file_registry: MockFileRegistryClient::new(),
    });

    let (status, body) = send(
        app,
        post(
            "/api/rag/ask",
            Some("user-1"),
            json!({"question": "hi", "searchMode": "quantum"}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "INVALID_INPUT");
}

#[tokio::test]
async fn ask_file_returns_404_when_the_file_is_not_owned() {
    let mut file_registry = MockFileRegistryClient::new();
    file_registry.expect_is_owned().returning(|_, _| Ok(false));

    let app = app(Mocks {
        queue: MockQueueClient::new(),
        bm25: MockBm25Index::new(),
        vector_store: MockVectorStoreClient::new(),
        embedding: MockEmbeddingClient::new(),
        llm: MockLlmClient::new(),
        file_registry,
    });

    let (status, body) = send(
        app,
        post(
            "/api/rag/ask-file/file-1",
            Some("user-1"),
            json!({"question": "hi"}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "NOT_FOUND");
}

#[tokio::test]
async fn status_returns_404_for_an_unknown_job() {
    let mut queue = MockQueueClient::new();
    queue.expect_status().returning(|_| Ok(None));

    let app = app(Mocks {
        queue,
        bm25: MockBm25Index::new(),
        vector_store: MockVectorStoreClient::new(),
        embedding: MockEmbeddingClient::new(),
        llm: MockLlmClient::new(),
        file_registry: MockFileRegistryClient::new(),
    });

    let (status, _) = send(app, get("/api/rag/status/unknown-job", None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn status_returns_the_job_snapshot_when_known() {
    let mut queue = MockQueueClient::new();
    queue.expect_status().returning(|job_id| {
        Ok(Some(JobSummary {
            id: job_id.to_owned(),
            status: JobStatus::Running,
            progress: 42,
            chunks_processed: 3,
            error: None,
            result: None,
        }))
    });

    let app = app(Mocks {
        queue,
        bm25: MockBm25Index::new(),
        vector_store: MockVectorStoreClient::new(),
        embedding: MockEmbeddingClient::new(),
        llm: MockLlmClient::new(),
        file_registry: MockFileRegistryClient::new(),
    });

    let (status, body) = send(app, get("/api/rag/status/job-42", None)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["progress"], 42);
    assert_eq!(body["data"]["status"], "running");
}
