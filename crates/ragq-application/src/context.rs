//! Context assembly (§4.G.1): format ranked results into the string fed
//! to the LLM, truncated to `maxContextLength`.

use std::collections::BTreeSet;

use ragq_domain::entities::{AnswerSource, RetrievalResult};

/// Result of assembling context from a ranked result list.
pub struct AssembledContext {
    /// The text handed to the LLM, trimmed of trailing whitespace.
    pub context: String,
    /// Number of chunks whose text actually made it into `context`.
    pub chunks_used: usize,
    /// Display sources for every retrieved chunk, including ones dropped
    /// for length. These remain visible to the caller even though the
    /// LLM never saw their text.
    pub sources: Vec<AnswerSource>,
    /// Distinct file display names among all retrieved chunks.
    pub unique_file_names: Vec<String>,
}

/// Assemble context from `results` (already ranked, best first), stopping
/// before any chunk whose addition would exceed `max_context_length`.
#[must_use]
pub fn assemble(results: &[RetrievalResult], max_context_length: usize) -> AssembledContext {
    let mut context = String::new();
    let mut chunks_used = 0;
    let mut sources = Vec::with_capacity(results.len());
    let mut unique_files = BTreeSet::new();

    for (i, result) in results.iter().enumerate() {
        unique_files.insert(result.file_name.clone());

        let index = i + 1;
        let block = format!("[Source {index}: {}]\n{}\n\n", result.file_name, result.text);
        if context.len() + block.len() <= max_context_length {
            context.push_str(&block);
            chunks_used += 1;
        }

        sources.push(AnswerSource {
            file_name: result.file_name.clone(),
            score: result.score,
            text: result.text.clone(),
            chunk_index: result.chunk_index,
            file_id: result.file_id.clone(),
            sources: result.sources.clone(),
            fusion_rank: result.fusion_rank,
        });
    }

    AssembledContext {
        context: context.trim_end().to_owned(),
        chunks_used,
        sources,
        unique_file_names: unique_files.into_iter().collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ragq_domain::entities::Source;

    fn result(file_id: &str, file_name: &str, text: &str) -> RetrievalResult {
        RetrievalResult {
            file_id: file_id.to_owned(),
            file_name: file_name.to_owned(),
            chunk_index: 0,
            text: text.to_owned(),
            score: 1.0,
            source: Source::Hybrid,
            rrf_score: None,
            vector_score: None,
            bm25_score: None,
            fusion_rank: None,
            sources: Vec::new(),
        }
    }

    #[test]
    fn assembles_sources_in_order_with_citation_headers() {
        let results = vec![
            result("f1", "a.md", "first chunk"),
            result("f2", "b.md", "second chunk"),
        ];
        let assembled = assemble(&results, 4000);

        assert_eq!(assembled.chunks_used, 2);
        assert!(assembled.context.contains("[Source 1: a.md]"));
        assert!(assembled.context.contains("[Source 2: b.md]"));
        assert_eq!(assembled.sources.len(), 2);
        assert_eq!(assembled.unique_file_names, vec!["a.md".to_owned(), "b.md".to_owned()]);
    }

    #[test]
    fn stops_adding_chunks_once_the_budget_is_exceeded_but_keeps_all_sources() {
        let results = vec![
            result("f1", "a.md", &"x".repeat(50)),
            result("f2", "b.md", &"y".repeat(50)),
        ];
        let assembled = assemble(&results, 70);

        assert_eq!(assembled.chunks_used, 1);
        assert_eq!(assembled.sources.len(), 2, "dropped chunks remain visible as sources");
        assert!(!assembled.context.contains("y"));
    }

    #[test]
    fn empty_results_yield_empty_context() {
        let assembled = assemble(&[], 4000);
        assert_eq!(assembled.chunks_used, 0);
        assert!(assembled.context.is_empty());
        assert!(assembled.unique_file_names.is_empty());
    }
}
