//! Per-user in-memory Okapi BM25 index (§4.B).

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use ragq_domain::entities::{Chunk, RetrievalResult, Source};
use ragq_domain::error::Result;
use ragq_domain::ports::Bm25Index;
use ragq_domain::value_objects::constants::{BM25_B, BM25_K1};

use super::tokenizer::tokenize;

struct Document {
    file_id: String,
    file_name: String,
    chunk_index: usize,
    text: String,
    term_freqs: HashMap<String, usize>,
    length: usize,
}

/// A single user's corpus snapshot: document list, inverted postings, and
/// the corpus-wide statistics BM25 needs (`N`, `avgdl`, `df`).
struct UserIndex {
    documents: Vec<Document>,
    postings: HashMap<String, Vec<usize>>,
    df: HashMap<String, usize>,
    avgdl: f64,
}

impl UserIndex {
    fn build(chunks: Vec<Chunk>) -> Self {
        let mut documents = Vec::with_capacity(chunks.len());
        let mut postings: HashMap<String, Vec<usize>> = HashMap::new();
        let mut df: HashMap<String, usize> = HashMap::new();
        let mut total_len = 0usize;

        for chunk in chunks {
            let tokens = tokenize(&chunk.text);
            let length = tokens.len();
            total_len += length;

            let mut term_freqs: HashMap<String, usize> = HashMap::new();
            for token in tokens {
                *term_freqs.entry(token).or_insert(0) += 1;
            }

            let doc_idx = documents.len();
            for term in term_freqs.keys() {
                postings.entry(term.clone()).or_default().push(doc_idx);
                *df.entry(term.clone()).or_insert(0) += 1;
            }

            documents.push(Document {
                file_id: chunk.file_id,
                file_name: chunk.file_name,
                chunk_index: chunk.chunk_index,
                text: chunk.text,
                term_freqs,
                length,
            });
        }

        let avgdl = if documents.is_empty() {
            0.0
        } else {
            total_len as f64 / documents.len() as f64
        };

        Self {
            documents,
            postings,
            df,
            avgdl,
        }
    }

    fn search(&self, query: &str, limit: usize) -> Vec<RetrievalResult> {
        if self.documents.is_empty() {
            return Vec::new();
        }
        let n = self.documents.len() as f64;
        let query_terms = tokenize(query);

        let mut scores: HashMap<usize, f64> = HashMap::new();
        for term in &query_terms {
            let Some(df) = self.df.get(term) else {
                continue;
            };
            let idf = (((n - *df as f64 + 0.5) / (*df as f64 + 0.5)) + 1.0).ln();
            for &doc_idx in &self.postings[term] {
                let doc = &self.documents[doc_idx];
                let tf = *doc.term_freqs.get(term).unwrap_or(&0) as f64;
                let denom = tf + BM25_K1 * (1.0 - BM25_B + BM25_B * doc.length as f64 / self.avgdl);
                let score = idf * (tf * (BM25_K1 + 1.0)) / denom;
                *scores.entry(doc_idx).or_insert(0.0) += score;
            }
        }

        let mut ranked: Vec<(usize, f64)> = scores.into_iter().collect();
        ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        ranked.truncate(limit);

        ranked
            .into_iter()
            .map(|(doc_idx, score)| {
                let doc = &self.documents[doc_idx];
                RetrievalResult {
                    file_id: doc.file_id.clone(),
                    file_name: doc.file_name.clone(),
                    chunk_index: doc.chunk_index,
                    text: doc.text.clone(),
                    score,
                    source: Source::Bm25,
                    rrf_score: None,
                    vector_score: None,
                    bm25_score: Some(score),
                    fusion_rank: None,
                    sources: vec![Source::Bm25],
                }
            })
            .collect()
    }
}

/// Process-local BM25 index, keyed by `userId`. Each user's corpus is an
/// independent snapshot behind a shared `Arc`, so `rebuild` can replace it
/// atomically without blocking concurrent `search` calls on the previous
/// version (§5).
#[derive(Default)]
pub struct InMemoryBm25Index {
    users: RwLock<HashMap<String, Arc<UserIndex>>>,
}

impl InMemoryBm25Index {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Bm25Index for InMemoryBm25Index {
    async fn rebuild(&self, user_id: &str, chunks: Vec<Chunk>) {
        let index = Arc::new(UserIndex::build(chunks));
        let mut users = self.users.write().expect("bm25 index lock poisoned");
        users.insert(user_id.to_owned(), index);
    }

    async fn search(&self, user_id: &str, query: &str, limit: usize) -> Result<Vec<RetrievalResult>> {
        let snapshot = {
            let users = self.users.read().expect("bm25 index lock poisoned");
            users.get(user_id).cloned()
        };
        Ok(snapshot.map_or_else(Vec::new, |index| index.search(query, limit)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(file_id: &str, chunk_index: usize, text: &str) -> Chunk {
        Chunk {
            file_id: file_id.to_owned(),
            file_name: format!("{file_id}.md"),
            user_id: "u1".to_owned(),
            chunk_index,
            text: text.to_owned(),
            embedding: None,
        }
    }

    #[tokio::test]
    async fn empty_corpus_returns_empty_results_without_error() {
        let index = InMemoryBm25Index::new();
        let results = index.search("u1", "anything", 5).await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn ranks_by_descending_bm25_score() {
        let index = InMemoryBm25Index::new();
        index
            .rebuild(
                "u1",
                vec![
                    chunk("f1", 0, "rust memory safety ownership borrowing"),
                    chunk("f2", 0, "rust rust rust ownership"),
                    chunk("f3", 0, "python dynamic typing"),
                ],
            )
            .await;

        let results = index.search("u1", "rust ownership", 5).await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].file_id, "f2");
        assert_eq!(results[0].source, Source::Bm25);
    }

    #[tokio::test]
    async fn different_users_have_independent_corpora() {
        let index = InMemoryBm25Index::new();
        index.rebuild("u1", vec![chunk("f1", 0, "rust")]).await;

        let results = index.search("u2", "rust", 5).await.unwrap();
        assert!(results.is_empty());
    }
}
