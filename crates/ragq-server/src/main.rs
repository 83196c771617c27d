//! HTTP server binary: builds the shared `AppState` and serves the
//! `/api/rag/*` surface (§4.I, §4.J).

use std::sync::Arc;

use ragq_application::cache::AnswerCache;
use ragq_application::pipeline::PipelineOrchestrator;
use ragq_providers::{
    Config, HttpEmbeddingClient, HttpFileRegistryClient, HttpLlmClient, HttpVectorStoreClient,
    InMemoryBm25Index, RedisQueueClient,
};
use ragq_server::transport::axum_http::{build_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(
            |_| tracing_subscriber::EnvFilter::new("info"),
        ))
        .json()
        .init();

    let config = Config::from_env()?;
    tracing::info!(bind_addr = %config.http_bind_addr, "starting http surface");

    let queue = Arc::new(RedisQueueClient::connect(&config.redis_url()).await?);
    let bm25 = Arc::new(InMemoryBm25Index::new());
    let vector_store = Arc::new(HttpVectorStoreClient::new(config.vector_store_url.clone())?);
    let embedding = Arc::new(HttpEmbeddingClient::new(config.embedding_api_url.clone())?);
    let llm = Arc::new(HttpLlmClient::new(config.llm_api_url.clone())?);
    let file_registry = Arc::new(HttpFileRegistryClient::new(config.file_registry_url.clone())?);

    let pipeline = Arc::new(PipelineOrchestrator::new(
        bm25,
        vector_store.clone(),
        embedding,
        llm,
        file_registry.clone(),
        Arc::new(AnswerCache::new()),
    ));

    let state = Arc::new(AppState {
        queue,
        pipeline,
        vector_store,
        file_registry,
    });

    let listener = tokio::net::TcpListener::bind(&config.http_bind_addr).await?;
    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(wait_for_shutdown_signal())
        .await?;

    tracing::info!("http surface stopped");
    Ok(())
}

#[cfg(unix)]
async fn wait_for_shutdown_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigterm = signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {}
        _ = sigterm.recv() => {}
    }
}

#[cfg(not(unix))]
async fn wait_for_shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
