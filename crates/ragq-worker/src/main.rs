//! Long-running claim-loop worker process (§4.H).
//!
//! Polls its queue class (falling back to `queue:any`), runs each claimed
//! job through the pipeline orchestrator, and heartbeats while the job is
//! in flight. Shuts down gracefully on `SIGINT`/`SIGTERM`, giving an
//! in-flight job up to `SHUTDOWN_GRACE_SECS` to finish before returning.

mod claim_loop;
mod context;
mod dispatch;

use std::sync::Arc;

use ragq_application::cache::AnswerCache;
use ragq_application::pipeline::PipelineOrchestrator;
use ragq_domain::entities::QueueClass;
use ragq_providers::{
    Config, HttpEmbeddingClient, HttpFileRegistryClient, HttpLlmClient, HttpVectorStoreClient,
    InMemoryBm25Index, RedisQueueClient,
};
use tokio::sync::watch;

use context::WorkerContext;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(
            |_| tracing_subscriber::EnvFilter::new("info"),
        ))
        .json()
        .init();

    let config = Config::from_env()?;
    tracing::info!(worker_id = %config.worker_id, worker_type = %config.worker_type, "starting worker");

    let queue = Arc::new(RedisQueueClient::connect(&config.redis_url()).await?);
    let bm25 = Arc::new(InMemoryBm25Index::new());
    let vector_store = Arc::new(HttpVectorStoreClient::new(config.vector_store_url.clone())?);
    let embedding = Arc::new(HttpEmbeddingClient::new(config.embedding_api_url.clone())?);
    let llm = Arc::new(HttpLlmClient::new(config.llm_api_url.clone())?);
    let file_registry = Arc::new(HttpFileRegistryClient::new(config.file_registry_url.clone())?);

    let pipeline = Arc::new(PipelineOrchestrator::new(
        bm25,
        vector_store,
        embedding,
        llm,
        file_registry.clone(),
        Arc::new(AnswerCache::new()),
    ));

    let worker_type = parse_queue_class(&config.worker_type);
    let ctx = Arc::new(WorkerContext {
        queue,
        pipeline,
        file_registry,
        worker_id: config.worker_id.clone(),
        worker_type,
        poll_interval: config.poll_interval,
        heartbeat_interval: config.heartbeat_interval,
    });

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let loop_handle = tokio::spawn(claim_loop::run(ctx, shutdown_rx));

    wait_for_shutdown_signal().await;
    tracing::info!("shutdown signal received, draining in-flight job");
    let _ = shutdown_tx.send(true);

    if let Err(e) = loop_handle.await {
        tracing::error!(error = %e, "claim loop task panicked");
    }
    tracing::info!("worker stopped");
    Ok(())
}

fn parse_queue_class(raw: &str) -> QueueClass {
    match raw {
        "cpu" => QueueClass::Cpu,
        "gpu" => QueueClass::Gpu,
        "any" => QueueClass::Any,
        _ => QueueClass::Rag,
    }
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
