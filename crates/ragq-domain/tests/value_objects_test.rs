use ragq_domain::entities::QueueClass;
use ragq_domain::value_objects::SearchMode;

#[test]
fn search_mode_parses_known_values_case_insensitively() {
    assert_eq!(SearchMode::parse("Hybrid").unwrap(), SearchMode::Hybrid);
    assert_eq!(SearchMode::parse("VECTOR").unwrap(), SearchMode::Vector);
    assert_eq!(SearchMode::parse("bm25").unwrap(), SearchMode::Bm25);
}

#[test]
fn search_mode_rejects_unknown_values() {
    let err = SearchMode::parse("fuzzy").unwrap_err();
    assert_eq!(err.code(), "INVALID_INPUT");
}

#[test]
fn search_mode_default_is_hybrid() {
    assert_eq!(SearchMode::default(), SearchMode::Hybrid);
}

#[test]
fn queue_class_keys_match_redis_schema() {
    assert_eq!(QueueClass::Cpu.queue_key(), "queue:cpu");
    assert_eq!(QueueClass::Gpu.queue_key(), "queue:gpu");
    assert_eq!(QueueClass::Rag.queue_key(), "queue:rag");
    assert_eq!(QueueClass::Any.queue_key(), "queue:any");
}
