//! The BM25 tokenizer (§4.B, §9): a single pure function shared by both
//! indexing and query paths so they can never drift out of agreement.

const STOPWORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "but", "by", "for", "if", "in", "into", "is", "it",
    "no", "not", "of", "on", "or", "such", "that", "the", "their", "then", "there", "these",
    "they", "this", "to", "was", "will", "with",
];

/// Lowercase, split on non-alphanumeric boundaries, drop stopwords.
#[must_use]
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|tok| !tok.is_empty() && !STOPWORDS.contains(tok))
        .map(str::to_owned)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_punctuation_and_lowercases() {
        assert_eq!(tokenize("Hello, World!"), vec!["hello", "world"]);
    }

    #[test]
    fn drops_stopwords() {
        assert_eq!(tokenize("the cat and the dog"), vec!["cat", "dog"]);
    }

    #[test]
    fn empty_input_yields_no_tokens() {
        assert!(tokenize("   ...   ").is_empty());
    }
}
