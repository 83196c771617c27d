//! Pipeline Orchestrator (§4.G): combines BM25, vector search, fusion,
//! context assembly, and LLM synthesis behind a single `answer()`/
//! `answer_for_file()` surface, with caching and graceful short-circuits.

use std::sync::Arc;

use ragq_domain::entities::{AnswerRecord, AnswerSource, Metadata, RetrievalResult, Source};
use ragq_domain::error::{Error, Result};
use ragq_domain::ports::{
    Bm25Index, EmbeddingClient, FileRegistryClient, LlmClient, LlmRequest, VectorFilter,
    VectorStoreClient,
};
use ragq_domain::value_objects::constants::DEFAULT_MAX_CONTEXT_LENGTH;
use ragq_domain::value_objects::{AskOptions, SearchMode};

use crate::cache::{cache_key_for_file, cache_key_for_user, AnswerCache};
use crate::context::assemble;
use crate::fusion::fuse_and_rank;

const NO_DOCUMENTS_ANSWER: &str =
    "You haven't uploaded any documents yet. Please upload a file before asking questions about it.";
const NO_RELEVANT_INFO_ANSWER: &str =
    "I couldn't find any relevant information in your documents to answer this question.";

/// Dependencies the orchestrator is built from. All are swappable ports;
/// production wiring injects HTTP/Redis-backed adapters, tests inject
/// `mockall` mocks.
pub struct PipelineOrchestrator {
    bm25: Arc<dyn Bm25Index>,
    vector_store: Arc<dyn VectorStoreClient>,
    embedding: Arc<dyn EmbeddingClient>,
    llm: Arc<dyn LlmClient>,
    file_registry: Arc<dyn FileRegistryClient>,
    cache: Arc<AnswerCache>,
    max_context_length: usize,
}

impl PipelineOrchestrator {
    /// Construct the orchestrator from its injected dependencies.
    #[must_use]
    pub fn new(
        bm25: Arc<dyn Bm25Index>,
        vector_store: Arc<dyn VectorStoreClient>,
        embedding: Arc<dyn EmbeddingClient>,
        llm: Arc<dyn LlmClient>,
        file_registry: Arc<dyn FileRegistryClient>,
        cache: Arc<AnswerCache>,
    ) -> Self {
        Self {
            bm25,
            vector_store,
            embedding,
            llm,
            file_registry,
            cache,
            max_context_length: DEFAULT_MAX_CONTEXT_LENGTH,
        }
    }

    /// Override the default context-length budget, mainly for tests that
    /// want to exercise truncation without 4000-character fixtures.
    #[must_use]
    pub fn with_max_context_length(mut self, max_context_length: usize) -> Self {
        self.max_context_length = max_context_length;
        self
    }

    /// Answer `question` against `user_id`'s full corpus (§4.G).
    pub async fn answer(
        &self,
        question: &str,
        user_id: &str,
        options: AskOptions,
    ) -> Result<AnswerRecord> {
        let question = validate_question(question)?;

        let cache_key = cache_key_for_user(
            question,
            user_id,
            options.search_mode.as_str(),
            options.top_k,
            options.min_score,
        );
        if let Some(mut hit) = self.cache.get(&cache_key) {
            hit.metadata.cache_hit = Some(true);
            return Ok(hit);
        }

        if !options.has_files {
            let record = no_documents_record(question, options.search_mode);
            self.cache.insert(cache_key, record.clone());
            return Ok(record);
        }

        let results = self.retrieve(question, user_id, &options).await?;
        let record = self
            .synthesize(question, results, options.search_mode)
            .await?;
        self.cache.insert(cache_key, record.clone());
        Ok(record)
    }

    /// Answer `question` scoped to a single file (§4.G file-scoped
    /// variant): skips BM25 and the "no files" short-circuit, forces
    /// vector-only search filtered by `fileId`.
    pub async fn answer_for_file(
        &self,
        question: &str,
        file_id: &str,
        user_id: &str,
        options: AskOptions,
    ) -> Result<AnswerRecord> {
        let question = validate_question(question)?;

        if !self.file_registry.is_owned(file_id, user_id).await? {
            return Err(Error::not_found(format!("file {file_id}")));
        }

        let cache_key = cache_key_for_file(
            question,
            file_id,
            SearchMode::Vector.as_str(),
            options.top_k,
            options.min_score,
        );
        if let Some(mut hit) = self.cache.get(&cache_key) {
            hit.metadata.cache_hit = Some(true);
            return Ok(hit);
        }

        let results = self
            .vector_search(question, options.top_k, options.min_score, VectorFilter::file(file_id))
            .await?;
        let record = self
            .synthesize(question, results, SearchMode::Vector)
            .await?;
        self.cache.insert(cache_key, record.clone());
        Ok(record)
    }

    async fn retrieve(
        &self,
        question: &str,
        user_id: &str,
        options: &AskOptions,
    ) -> Result<Vec<RetrievalResult>> {
        match options.search_mode {
            SearchMode::Hybrid => {
                let fetch_k = options.top_k * 2;
                let bm25_fut = self.bm25.search(user_id, question, fetch_k);
                let vector_fut = self.vector_search(question, fetch_k, f32::MIN, VectorFilter::user(user_id));
                let (bm25_results, vector_results) = tokio::join!(bm25_fut, vector_fut);
                let bm25_results = bm25_results?;
                let vector_results = vector_results?;
                Ok(fuse_and_rank(bm25_results, vector_results, options.top_k))
            }
            SearchMode::Vector => {
                self.vector_search(question, options.top_k, options.min_score, VectorFilter::user(user_id))
                    .await
            }
            SearchMode::Bm25 => self.bm25.search(user_id, question, options.top_k).await,
        }
    }

    async fn vector_search(
        &self,
        question: &str,
        k: usize,
        min_score: f32,
        filter: VectorFilter,
    ) -> Result<Vec<RetrievalResult>> {
        if !self.embedding.healthy().await {
            return Err(Error::UnavailableEmbed {
                message: "embedding service failed its last health check".to_owned(),
            });
        }
        let query_vector = self.embedding.embed(question).await?;
        let mut results = self.vector_store.search(&query_vector, k, filter).await?;
        if min_score > f32::MIN {
            results.retain(|r| r.score >= f64::from(min_score));
        }
        for r in &mut results {
            r.source = Source::Vector;
        }
        Ok(results)
    }

    async fn synthesize(
        &self,
        question: &str,
        results: Vec<RetrievalResult>,
        search_mode: SearchMode,
    ) -> Result<AnswerRecord> {
        if results.is_empty() {
            return Ok(no_relevant_info_record(question, search_mode));
        }

        let chunks_retrieved = results.len();
        let assembled = assemble(&results, self.max_context_length);

        let answer = self
            .llm
            .generate_answer(
                question,
                &assembled.context,
                LlmRequest {
                    unique_file_names: assembled.unique_file_names.clone(),
                    ..LlmRequest::default()
                },
            )
            .await?;

        Ok(AnswerRecord {
            answer,
            context: assembled.context.clone(),
            sources: assembled.sources,
            metadata: Metadata {
                question: question.to_owned(),
                chunks_retrieved,
                chunks_used: assembled.chunks_used,
                context_length: assembled.context.len(),
                unique_files: assembled.unique_file_names.len(),
                unique_file_names: assembled.unique_file_names,
                search_mode: search_mode.as_str().to_owned(),
                timestamp: now_ms(),
                cache_hit: Some(false),
                reason: None,
            },
        })
    }
}

fn validate_question(question: &str) -> Result<&str> {
    let trimmed = question.trim();
    if trimmed.is_empty() {
        return Err(Error::invalid_input("question must not be empty"));
    }
    Ok(trimmed)
}

fn no_documents_record(question: &str, search_mode: SearchMode) -> AnswerRecord {
    AnswerRecord {
        answer: NO_DOCUMENTS_ANSWER.to_owned(),
        context: String::new(),
        sources: Vec::<AnswerSource>::new(),
        metadata: Metadata {
            question: question.to_owned(),
            chunks_retrieved: 0,
            chunks_used: 0,
            context_length: 0,
            unique_files: 0,
            unique_file_names: Vec::new(),
            search_mode: search_mode.as_str().to_owned(),
            timestamp: now_ms(),
            cache_hit: Some(false),
            reason: Some("no_files".to_owned()),
        },
    }
}

fn no_relevant_info_record(question: &str, search_mode: SearchMode) -> AnswerRecord {
    AnswerRecord {
        answer: NO_RELEVANT_INFO_ANSWER.to_owned(),
        context: String::new(),
        sources: Vec::new(),
        metadata: Metadata {
            question: question.to_owned(),
            chunks_retrieved: 0,
            chunks_used: 0,
            context_length: 0,
            unique_files: 0,
            unique_file_names: Vec::new(),
            search_mode: search_mode.as_str().to_owned(),
            timestamp: now_ms(),
            cache_hit: Some(false),
            reason: Some("no_relevant_results".to_owned()),
        },
    }
}

fn now_ms() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock before unix epoch")
        .as_millis() as i64
}
