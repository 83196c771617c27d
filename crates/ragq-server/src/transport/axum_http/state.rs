//! `AppContext`/`AppState`: the explicitly-constructed, `Arc`-shared set
//! of dependencies handlers need (§9).

use std::sync::Arc;

use ragq_application::pipeline::PipelineOrchestrator;
use ragq_domain::ports::{FileRegistryClient, QueueClient, VectorStoreClient};

pub struct AppState {
    pub queue: Arc<dyn QueueClient>,
    pub pipeline: Arc<PipelineOrchestrator>,
    pub vector_store: Arc<dyn VectorStoreClient>,
    pub file_registry: Arc<dyn FileRegistryClient>,
}
