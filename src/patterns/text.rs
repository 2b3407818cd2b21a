//! Phrase tokenization for pattern discovery

use crate::entry::{DailyEntry, Metric};
use crate::sources::{collect_phrases, SourceExample, SourcePhrase};
use regex::Regex;
use std::sync::OnceLock;

/// Words too common to carry a theme
const STOPWORDS: &[&str] = &[
    "a", "about", "after", "all", "also", "am", "an", "and", "any", "are", "around", "as", "at",
    "be", "been", "before", "being", "but", "by", "can", "could", "day", "did", "do", "does",
    "doing", "during", "each", "for", "from", "got", "had", "has", "have", "having", "her",
    "him", "his", "how", "into", "its", "just", "lot", "lots", "more", "most", "much", "my",
    "myself", "not", "of", "off", "on", "once", "only", "or", "other", "our", "out", "over",
    "really", "she", "so", "some", "than", "that", "the", "their", "them", "then", "there",
    "these", "they", "this", "those", "through", "today", "too", "under", "until", "up", "very",
    "was", "way", "we", "were", "what", "when", "where", "which", "while", "who", "why", "will",
    "with", "would", "you", "your",
];

/// Words shorter than this are ignored
const MIN_TERM_CHARS: usize = 3;

fn word_pattern() -> &'static Regex {
    static WORD: OnceLock<Regex> = OnceLock::new();
    WORD.get_or_init(|| Regex::new(r"[\p{L}\p{N}]+(?:'[\p{L}]+)?").expect("valid word regex"))
}

/// A content word of a phrase
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Term {
    /// Grouping form
    pub stem: String,
    /// Word as it appeared (lower-case)
    pub word: String,
}

/// A distinct phrase prepared for clustering
#[derive(Debug, Clone)]
pub struct PhraseGroup {
    /// Normalized phrase
    pub key: String,
    /// Days mentioning the phrase
    pub count: usize,
    /// Most recent occurrences, newest first
    pub examples: Vec<SourceExample>,
    pub terms: Vec<Term>,
}

impl From<SourcePhrase> for PhraseGroup {
    fn from(phrase: SourcePhrase) -> Self {
        let terms = tokenize(&phrase.text);
        Self {
            key: phrase.text,
            count: phrase.count,
            examples: phrase.examples,
            terms,
        }
    }
}

/// All distinct phrases of a metric, most mentioned first
pub fn phrase_groups(entries: &[DailyEntry], metric: Metric) -> Vec<PhraseGroup> {
    collect_phrases(entries, metric)
        .into_iter()
        .map(PhraseGroup::from)
        .collect()
}

/// Content words of a phrase, stopwords removed
pub fn tokenize(text: &str) -> Vec<Term> {
    let lower = text.to_lowercase();
    word_pattern()
        .find_iter(&lower)
        .map(|m| m.as_str().trim_end_matches("'s").to_string())
        .filter(|w| w.chars().count() >= MIN_TERM_CHARS)
        .filter(|w| !STOPWORDS.contains(&w.as_str()))
        .filter(|w| !w.chars().all(|c| c.is_ascii_digit()))
        .map(|word| Term {
            stem: stem(&word),
            word,
        })
        .collect()
}

/// Light suffix stripping so "walks", "walking" and "walked" group together
pub fn stem(word: &str) -> String {
    const RULES: &[(&str, &str)] = &[("ies", "y"), ("ing", ""), ("ed", ""), ("s", "")];

    for (suffix, replacement) in RULES {
        if !word.ends_with(suffix) || word.len() < suffix.len() + 3 {
            continue;
        }
        if *suffix == "s" && (word.ends_with("ss") || word.ends_with("us")) {
            continue;
        }
        let base = &word[..word.len() - suffix.len()];
        return format!("{}{}", base, replacement);
    }

    word.to_string()
}

/// Upper-case the first character
pub fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_drops_stopwords_and_short_words() {
        let terms = tokenize("A walk in the park with my dog");
        let words: Vec<&str> = terms.iter().map(|t| t.word.as_str()).collect();
        assert_eq!(words, vec!["walk", "park", "dog"]);
    }

    #[test]
    fn test_stem_variants_share_stem() {
        assert_eq!(stem("walks"), "walk");
        assert_eq!(stem("walking"), "walk");
        assert_eq!(stem("walked"), "walk");
        assert_eq!(stem("stories"), "story");
        assert_eq!(stem("stress"), "stress");
        assert_eq!(stem("bus"), "bus");
        assert_eq!(stem("sing"), "sing");
    }

    #[test]
    fn test_possessive_trimmed() {
        let terms = tokenize("Mom's cooking");
        assert_eq!(terms[0].word, "mom");
        assert_eq!(terms[1].stem, "cook");
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("coffee"), "Coffee");
        assert_eq!(capitalize("éclair"), "Éclair");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn test_phrase_groups_most_mentioned_first() {
        let entries = vec![
            DailyEntry::new("2024-03-01").energy_sources("Coffee, yoga class"),
            DailyEntry::new("2024-03-02").energy_sources("yoga class"),
        ];
        let groups = phrase_groups(&entries, Metric::Energy);
        assert_eq!(groups[0].key, "yoga class");
        assert_eq!(groups[0].count, 2);
        assert_eq!(groups[0].terms.len(), 2);
        assert_eq!(groups[1].key, "coffee");
    }
}
