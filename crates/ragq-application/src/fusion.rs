//! Reciprocal Rank Fusion and the post-fusion diversity penalty (§4.F).

use std::collections::HashMap;

use ragq_domain::entities::{RetrievalResult, Source};
use ragq_domain::value_objects::constants::{DIVERSITY_PENALTY_BASE, RRF_K};

/// Fuse a BM25-ranked list and a vector-ranked list via Reciprocal Rank
/// Fusion, then apply the diversity penalty and truncate to `top_k`.
///
/// This is the only entry point most callers need; [`fuse`] and
/// [`apply_diversity_penalty`] are exposed separately for the property
/// tests pinned to the worked examples in S2 and S3.
#[must_use]
pub fn fuse_and_rank(
    bm25: Vec<RetrievalResult>,
    vector: Vec<RetrievalResult>,
    top_k: usize,
) -> Vec<RetrievalResult> {
    let mut fused = fuse(bm25, vector, RRF_K);
    apply_diversity_penalty(&mut fused);
    fused.truncate(top_k);
    for (i, r) in fused.iter_mut().enumerate() {
        r.fusion_rank = Some(i + 1);
    }
    fused
}

/// Reciprocal Rank Fusion of two ranked lists (§4.F). Chunk identity is
/// `(fileId, chunkIndex)`. Absent-from-a-list contributes 0 rather than
/// `1/(K+inf)`, which is the same thing in the limit but avoids a literal
/// infinity in the arithmetic.
#[must_use]
pub fn fuse(bm25: Vec<RetrievalResult>, vector: Vec<RetrievalResult>, k: f64) -> Vec<RetrievalResult> {
    let mut by_identity: HashMap<(String, usize), RetrievalResult> = HashMap::new();
    let mut order: Vec<(String, usize)> = Vec::new();

    for (rank, result) in bm25.into_iter().enumerate() {
        let identity = result.identity();
        let rrf_term = 1.0 / (k + (rank + 1) as f64);
        let bm25_score = result.score;
        match by_identity.entry(identity.clone()) {
            std::collections::hash_map::Entry::Vacant(e) => {
                order.push(identity);
                let mut r = result;
                r.bm25_score = Some(bm25_score);
                r.vector_score = None;
                r.rrf_score = Some(rrf_term);
                r.sources = vec![Source::Bm25];
                e.insert(r);
            }
            std::collections::hash_map::Entry::Occupied(mut e) => {
                let r = e.get_mut();
                r.bm25_score = Some(bm25_score);
                r.rrf_score = Some(r.rrf_score.unwrap_or(0.0) + rrf_term);
                r.sources.push(Source::Bm25);
            }
        }
    }

    for (rank, result) in vector.into_iter().enumerate() {
        let identity = result.identity();
        let rrf_term = 1.0 / (k + (rank + 1) as f64);
        let vector_score = result.score;
        match by_identity.entry(identity.clone()) {
            std::collections::hash_map::Entry::Vacant(e) => {
                order.push(identity);
                let mut r = result;
                r.vector_score = Some(vector_score);
                r.bm25_score = None;
                r.rrf_score = Some(rrf_term);
                r.sources = vec![Source::Vector];
                e.insert(r);
            }
            std::collections::hash_map::Entry::Occupied(mut e) => {
                let r = e.get_mut();
                r.vector_score = Some(vector_score);
                r.rrf_score = Some(r.rrf_score.unwrap_or(0.0) + rrf_term);
                r.sources.push(Source::Vector);
            }
        }
    }

    let mut results: Vec<RetrievalResult> = order
        .into_iter()
        .filter_map(|id| by_identity.remove(&id))
        .map(|mut r| {
            r.score = r.rrf_score.unwrap_or(0.0);
            r.source = Source::Hybrid;
            r
        })
        .collect();

    // Descending rrfScore; ties broken by fileName lexicographic
    // (invariant 5). `fusionRank` itself is assigned after this sort, by
    // the caller, so it cannot participate in its own tie-break.
    results.sort_by(|a, b| {
        b.rrf_score
            .partial_cmp(&a.rrf_score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.file_name.cmp(&b.file_name))
    });

    results
}

/// Multiply each result's `rrfScore` by `0.9^(n_prior_from_same_file)`,
/// where `n_prior_from_same_file` counts results earlier in `results`
/// (in its current, already-fused order) sharing the same `fileId`, then
/// stably re-sort by the adjusted score (§4.F).
pub fn apply_diversity_penalty(results: &mut Vec<RetrievalResult>) {
    let mut seen_counts: HashMap<String, u32> = HashMap::new();
    for r in results.iter_mut() {
        let count = seen_counts.entry(r.file_id.clone()).or_insert(0);
        let penalty = DIVERSITY_PENALTY_BASE.powi(*count as i32);
        let base = r.rrf_score.unwrap_or(r.score);
        let adjusted = base * penalty;
        r.rrf_score = Some(adjusted);
        r.score = adjusted;
        *count += 1;
    }

    results.sort_by(|a, b| {
        b.rrf_score
            .partial_cmp(&a.rrf_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
}
