use std::sync::Arc;

use ragq_application::cache::AnswerCache;
use ragq_application::pipeline::PipelineOrchestrator;
use ragq_domain::entities::{RetrievalResult, Source};
use ragq_domain::ports::{
    MockBm25Index, MockEmbeddingClient, MockFileRegistryClient, MockLlmClient,
    MockVectorStoreClient,
};
use ragq_domain::value_objects::AskOptions;

fn chunk(file_id: &str, file_name: &str, text: &str, score: f64, source: Source) -> RetrievalResult {
    RetrievalResult {
        file_id: file_id.to_owned(),
        file_name: file_name.to_owned(),
        chunk_index: 0,
        text: text.to_owned(),
        score,
        source,
        rrf_score: None,
        vector_score: None,
        bm25_score: None,
        fusion_rank: None,
        sources: Vec::new(),
    }
}

struct Mocks {
    bm25: MockBm25Index,
    vector_store: MockVectorStoreClient,
    embedding: MockEmbeddingClient,
    llm: MockLlmClient,
    file_registry: MockFileRegistryClient,
}

fn build(mocks: Mocks) -> PipelineOrchestrator {
    PipelineOrchestrator::new(
        Arc::new(mocks.bm25),
        Arc::new(mocks.vector_store),
        Arc::new(mocks.embedding),
        Arc::new(mocks.llm),
        Arc::new(mocks.file_registry),
        Arc::new(AnswerCache::new()),
    )
}

#[tokio::test]
async fn answer_short_circuits_when_the_user_has_no_files() {
    // S1: empty corpus.
    let orchestrator = build(Mocks {
        bm25: MockBm25Index::new(),
        vector_store: MockVectorStoreClient::new(),
        embedding: MockEmbeddingClient::new(),
        llm: MockLlmClient::new(),
        file_registry: MockFileRegistryClient::new(),
    });

    let options = AskOptions {
        has_files: false,
        ..AskOptions::default()
    };
    let record = orchestrator.answer("hi", "user-1", options).await.unwrap();

    assert!(record.answer.starts_with("You haven't uploaded"));
    assert_eq!(record.metadata.chunks_retrieved, 0);
    assert_eq!(record.metadata.reason.as_deref(), Some("no_files"));
}

#[tokio::test]
async fn answer_rejects_blank_questions() {
    let orchestrator = build(Mocks {
        bm25: MockBm25Index::new(),
        vector_store: MockVectorStoreClient::new(),
        embedding: MockEmbeddingClient::new(),
        llm: MockLlmClient::new(),
        file_registry: MockFileRegistryClient::new(),
    });

    let err = orchestrator
        .answer("   ", "user-1", AskOptions::default())
        .await
        .unwrap_err();
    assert_eq!(err.code(), "INVALID_INPUT");
}

#[tokio::test]
async fn answer_returns_canned_response_when_retrieval_is_empty() {
    let mut bm25 = MockBm25Index::new();
    bm25.expect_search().returning(|_, _, _| Ok(Vec::new()));
    let mut embedding = MockEmbeddingClient::new();
    embedding.expect_healthy().returning(|| true);
    embedding.expect_embed().returning(|_| Ok(vec![0.1, 0.2]));
    let mut vector_store = MockVectorStoreClient::new();
    vector_store
        .expect_search()
        .returning(|_, _, _| Ok(Vec::new()));

    let orchestrator = build(Mocks {
        bm25,
        vector_store,
        embedding,
        llm: MockLlmClient::new(),
        file_registry: MockFileRegistryClient::new(),
    });

    let record = orchestrator
        .answer("what is in my docs?", "user-1", AskOptions::default())
        .await
        .unwrap();

    assert!(record.answer.contains("couldn't find"));
    assert_eq!(record.metadata.reason.as_deref(), Some("no_relevant_results"));
}

#[tokio::test]
async fn answer_fuses_bm25_and_vector_results_and_calls_the_llm() {
    let mut bm25 = MockBm25Index::new();
    bm25.expect_search()
        .returning(|_, _, _| Ok(vec![chunk("f1", "a.md", "bm25 text", 9.0, Source::Bm25)]));

    let mut embedding = MockEmbeddingClient::new();
    embedding.expect_healthy().returning(|| true);
    embedding.expect_embed().returning(|_| Ok(vec![0.1, 0.2]));

    let mut vector_store = MockVectorStoreClient::new();
    vector_store.expect_search().returning(|_, _, _| {
        Ok(vec![chunk("f2", "b.md", "vector text", 0.9, Source::Vector)])
    });

    let mut llm = MockLlmClient::new();
    llm.expect_generate_answer()
        .withf(|question, context, _req| question == "my question" && context.contains("bm25 text"))
        .returning(|_, _, _| Ok("synthesized answer".to_owned()));

    let orchestrator = build(Mocks {
        bm25,
        vector_store,
        embedding,
        llm,
        file_registry: MockFileRegistryClient::new(),
    });

    let record = orchestrator
        .answer("my question", "user-1", AskOptions::default())
        .await
        .unwrap();

    assert_eq!(record.answer, "synthesized answer");
    assert_eq!(record.metadata.chunks_retrieved, 2);
    assert!(record.metadata.cache_hit == Some(false));
}

#[tokio::test]
async fn repeated_identical_queries_are_served_from_cache() {
    let mut bm25 = MockBm25Index::new();
    bm25.expect_search()
        .times(1)
        .returning(|_, _, _| Ok(vec![chunk("f1", "a.md", "bm25 text", 9.0, Source::Bm25)]));

    let mut embedding = MockEmbeddingClient::new();
    embedding.expect_healthy().returning(|| true);
    embedding.expect_embed().returning(|_| Ok(vec![0.1, 0.2]));

    let mut vector_store = MockVectorStoreClient::new();
    vector_store
        .expect_search()
        .times(1)
        .returning(|_, _, _| Ok(Vec::new()));

    let mut llm = MockLlmClient::new();
    llm.expect_generate_answer()
        .times(1)
        .returning(|_, _, _| Ok("cached-worthy answer".to_owned()));

    let orchestrator = build(Mocks {
        bm25,
        vector_store,
        embedding,
        llm,
        file_registry: MockFileRegistryClient::new(),
    });

    let first = orchestrator
        .answer("same question", "user-1", AskOptions::default())
        .await
        .unwrap();
    let second = orchestrator
        .answer("same question", "user-1", AskOptions::default())
        .await
        .unwrap();

    assert_eq!(first.answer, second.answer);
    assert_eq!(second.metadata.cache_hit, Some(true));
}

#[tokio::test]
async fn answer_for_file_returns_not_found_when_the_file_is_not_owned() {
    let mut file_registry = MockFileRegistryClient::new();
    file_registry
        .expect_is_owned()
        .returning(|_, _| Ok(false));

    let orchestrator = build(Mocks {
        bm25: MockBm25Index::new(),
        vector_store: MockVectorStoreClient::new(),
        embedding: MockEmbeddingClient::new(),
        llm: MockLlmClient::new(),
        file_registry,
    });

    let err = orchestrator
        .answer_for_file("q", "file-1", "user-1", AskOptions::default())
        .await
        .unwrap_err();
    assert_eq!(err.code(), "NOT_FOUND");
}

#[tokio::test]
async fn answer_for_file_forces_vector_only_search_scoped_to_the_file() {
    let mut file_registry = MockFileRegistryClient::new();
    file_registry.expect_is_owned().returning(|_, _| Ok(true));

    let mut embedding = MockEmbeddingClient::new();
    embedding.expect_healthy().returning(|| true);
    embedding.expect_embed().returning(|_| Ok(vec![0.3]));

    let mut vector_store = MockVectorStoreClient::new();
    vector_store.expect_search().withf(|_, _, filter| filter.key == "fileId" && filter.value == "file-1").returning(|_, _, _| {
        Ok(vec![chunk("file-1", "c.md", "file-scoped text", 0.8, Source::Vector)])
    });

    let mut llm = MockLlmClient::new();
    llm.expect_generate_answer()
        .returning(|_, _, _| Ok("file-scoped answer".to_owned()));

    let orchestrator = build(Mocks {
        bm25: MockBm25Index::new(),
        vector_store,
        embedding,
        llm,
        file_registry,
    });

    let record = orchestrator
        .answer_for_file("q", "file-1", "user-1", AskOptions::default())
        .await
        .unwrap();

    assert_eq!(record.answer, "file-scoped answer");
    assert_eq!(record.metadata.search_mode, "vector");
}
