//! Bounded, TTL'd, process-local answer cache (§3, §5).
//!
//! Single-writer-single-reader is not sufficient per the concurrency
//! model, so access is guarded by a `std::sync::Mutex` around a plain
//! `VecDeque` + `HashMap` pair, enough concurrency for an in-process
//! cache with no I/O in the critical section.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

use ragq_domain::entities::AnswerRecord;
use ragq_domain::value_objects::constants::{CACHE_MAX_ENTRIES, CACHE_TTL_SECS};

struct Entry {
    value: AnswerRecord,
    inserted_at_ms: i64,
}

struct Inner {
    entries: HashMap<String, Entry>,
    insertion_order: VecDeque<String>,
}

/// Bounded FIFO-evicting, TTL-expiring cache of [`AnswerRecord`]s, keyed by
/// the caller-computed cache key (question + scope + mode + topK +
/// minScore, per §3).
pub struct AnswerCache {
    inner: Mutex<Inner>,
    max_entries: usize,
    ttl_ms: i64,
}

impl AnswerCache {
    /// Build a cache with the standard defaults (200 entries, 5 minute TTL).
    #[must_use]
    pub fn new() -> Self {
        Self::with_limits(CACHE_MAX_ENTRIES, CACHE_TTL_SECS)
    }

    /// Build a cache with explicit limits, for tests that want to
    /// exercise eviction/expiry without waiting or inserting 200 entries.
    #[must_use]
    pub fn with_limits(max_entries: usize, ttl_secs: u64) -> Self {
        Self {
            inner: Mutex::new(Inner {
                entries: HashMap::new(),
                insertion_order: VecDeque::new(),
            }),
            max_entries,
            ttl_ms: (ttl_secs as i64) * 1000,
        }
    }

    /// Look up `key`. Returns `None` on miss or on an expired entry,
    /// removing the expired entry as a side effect (§8 property 6).
    #[must_use]
    pub fn get(&self, key: &str) -> Option<AnswerRecord> {
        let mut inner = self.inner.lock().expect("answer cache mutex poisoned");
        let now = now_ms();
        let expired = inner
            .entries
            .get(key)
            .is_some_and(|e| now - e.inserted_at_ms >= self.ttl_ms);
        if expired {
            inner.entries.remove(key);
            return None;
        }
        inner.entries.get(key).map(|e| e.value.clone())
    }

    /// Insert `value` under `key`, evicting the oldest entry by insertion
    /// order if the cache is at capacity (§8 property 5).
    pub fn insert(&self, key: String, value: AnswerRecord) {
        let mut inner = self.inner.lock().expect("answer cache mutex poisoned");
        if inner.entries.contains_key(&key) {
            // Re-inserting an existing key refreshes its value but keeps
            // FIFO order anchored to the original insertion.
            if let Some(entry) = inner.entries.get_mut(&key) {
                entry.value = value;
                entry.inserted_at_ms = now_ms();
            }
            return;
        }

        while inner.entries.len() >= self.max_entries {
            let Some(oldest) = inner.insertion_order.pop_front() else {
                break;
            };
            inner.entries.remove(&oldest);
        }

        inner.insertion_order.push_back(key.clone());
        inner.entries.insert(
            key,
            Entry {
                value,
                inserted_at_ms: now_ms(),
            },
        );
    }

    /// Current entry count, for diagnostics/tests.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().expect("answer cache mutex poisoned").entries.len()
    }

    /// `true` if the cache holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for AnswerCache {
    fn default() -> Self {
        Self::new()
    }
}

fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock before unix epoch")
        .as_millis() as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use ragq_domain::entities::Metadata;

    fn record(answer: &str) -> AnswerRecord {
        AnswerRecord {
            answer: answer.to_owned(),
            context: String::new(),
            sources: Vec::new(),
            metadata: Metadata {
                question: "q".to_owned(),
                chunks_retrieved: 0,
                chunks_used: 0,
                context_length: 0,
                unique_files: 0,
                unique_file_names: Vec::new(),
                search_mode: "hybrid".to_owned(),
                timestamp: 0,
                cache_hit: Some(false),
                reason: None,
            },
        }
    }

    #[test]
    fn evicts_oldest_entry_once_over_capacity() {
        // S4: insert 201 distinct keys into a 200-entry cache; the first
        // key is gone, keys 2..=201 still hit.
        let cache = AnswerCache::with_limits(200, 300);
        for i in 0..201 {
            cache.insert(format!("k{i}"), record(&format!("a{i}")));
        }

        assert!(cache.get("k0").is_none());
        for i in 1..201 {
            assert!(cache.get(&format!("k{i}")).is_some());
        }
        assert_eq!(cache.len(), 200);
    }

    #[test]
    fn expired_entry_misses_and_is_removed() {
        let cache = AnswerCache::with_limits(10, 0);
        cache.insert("k".to_owned(), record("a"));
        assert!(cache.get("k").is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn re_inserting_an_existing_key_refreshes_value_without_growing() {
        let cache = AnswerCache::with_limits(10, 300);
        cache.insert("k".to_owned(), record("first"));
        cache.insert("k".to_owned(), record("second"));
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("k").unwrap().answer, "second");
    }

    #[test]
    fn cache_keys_differ_by_scope_mode_top_k_and_min_score() {
        let a = cache_key_for_user("same question", "u1", "hybrid", 5, 0.0);
        let b = cache_key_for_user("same question", "u2", "hybrid", 5, 0.0);
        let c = cache_key_for_user("Same Question", "u1", "hybrid", 5, 0.0);
        assert_ne!(a, b);
        assert_eq!(a, c, "cache key should be case-insensitive on the question");

        let f = cache_key_for_file("same question", "file1", "vector", 5, 0.0);
        assert_ne!(a, f);
    }
}

/// Build the deterministic cache key for a user-scoped query (§3).
#[must_use]
pub fn cache_key_for_user(
    question: &str,
    user_id: &str,
    search_mode: &str,
    top_k: usize,
    min_score: f32,
) -> String {
    format!(
        "u:{}:{}:{}:{}:{}",
        user_id,
        search_mode,
        top_k,
        min_score,
        question.trim().to_lowercase()
    )
}

/// Build the deterministic cache key for a file-scoped query (§3): the
/// file id replaces the user scope.
#[must_use]
pub fn cache_key_for_file(
    question: &str,
    file_id: &str,
    search_mode: &str,
    top_k: usize,
    min_score: f32,
) -> String {
    format!(
        "f:{}:{}:{}:{}:{}",
        file_id,
        search_mode,
        top_k,
        min_score,
        question.trim().to_lowercase()
    )
}
