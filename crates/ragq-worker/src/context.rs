//! Shared worker context: the queue client, pipeline, and identity a
//! claim loop needs, bundled so it can be passed around as a single
//! `Arc` rather than as module-level globals.

use std::sync::Arc;
use std::time::Duration;

use ragq_application::pipeline::PipelineOrchestrator;
use ragq_domain::entities::QueueClass;
use ragq_domain::ports::{FileRegistryClient, QueueClient};

pub struct WorkerContext {
    pub queue: Arc<dyn QueueClient>,
    pub pipeline: Arc<PipelineOrchestrator>,
    pub file_registry: Arc<dyn FileRegistryClient>,
    pub worker_id: String,
    pub worker_type: QueueClass,
    pub poll_interval: Duration,
    pub heartbeat_interval: Duration,
}
