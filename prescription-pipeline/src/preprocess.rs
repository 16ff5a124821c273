//! Text normalization shared by query expansion and keyword extraction.

const STOP_WORDS: [&str; 15] = [
    "the", "a", "an", "and", "or", "but", "in", "on", "at", "to", "for", "with", "by", "about",
    "as",
];

/// Normalize a term for use as a search query: lowercase, strip characters
/// outside alphanumerics/whitespace/basic punctuation, collapse whitespace,
/// drop stop-words. Returns `None` when nothing survives.
pub fn normalize_for_search(text: &str) -> Option<String> {
    if text.is_empty() {
        return None;
    }
    let lowered = text.to_lowercase();
    let cleaned: String = lowered
        .chars()
        .filter(|c| {
            c.is_ascii_lowercase() || c.is_ascii_digit() || c.is_whitespace() || ".,;:!?-".contains(*c)
        })
        .collect();
    let filtered: Vec<&str> = cleaned
        .split_whitespace()
        .filter(|word| !STOP_WORDS.contains(word))
        .collect();
    if filtered.is_empty() {
        None
    } else {
        Some(filtered.join(" "))
    }
}

/// Unique normalized words of a text, in first-seen order.
pub fn extract_keywords(text: &str) -> Vec<String> {
    let Some(processed) = normalize_for_search(text) else {
        return Vec::new();
    };
    let mut keywords: Vec<String> = Vec::new();
    for word in processed.split_whitespace() {
        if !keywords.iter().any(|k| k == word) {
            keywords.push(word.to_string());
        }
    }
    keywords
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowercases_and_collapses_whitespace() {
        assert_eq!(
            normalize_for_search("  Severe   HEADACHE  ").as_deref(),
            Some("severe headache")
        );
    }

    #[test]
    fn drops_stop_words() {
        assert_eq!(
            normalize_for_search("pain in the chest").as_deref(),
            Some("pain chest")
        );
    }

    #[test]
    fn strips_unexpected_characters_but_keeps_basic_punctuation() {
        assert_eq!(
            normalize_for_search("blood-pressure @ 150/95!").as_deref(),
            Some("blood-pressure 15095!")
        );
    }

    #[test]
    fn empty_or_stopword_only_input_yields_none() {
        assert_eq!(normalize_for_search(""), None);
        assert_eq!(normalize_for_search("the and or"), None);
        assert_eq!(normalize_for_search("@#$"), None);
    }

    #[test]
    fn keywords_are_unique_and_ordered() {
        assert_eq!(
            extract_keywords("Fatigue severe fatigue and dizziness"),
            vec!["fatigue", "severe", "dizziness"]
        );
    }
}
