//! Source Frequency Processor
//!
//! Splits the free-text "what gave me energy / what stressed me" fields into
//! phrases and ranks them by how often they come up across the period.
//!
//! # Example
//! ```
//! use energylog::entry::DailyEntry;
//! use energylog::sources::extract_sources;
//!
//! let entries = vec![
//!     DailyEntry::new("2024-03-04").energy_sources("Morning run, coffee"),
//!     DailyEntry::new("2024-03-05").energy_sources("morning run"),
//! ];
//! let sources = extract_sources(&entries);
//! assert_eq!(sources.energy_sources[0].text, "morning run");
//! assert_eq!(sources.energy_sources[0].count, 2);
//! ```

use crate::entry::{chronological_key, DailyEntry, Metric};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::OnceLock;

/// Phrases shorter than this (in characters) are dropped
pub const MIN_PHRASE_CHARS: usize = 3;
/// Examples kept per phrase
pub const MAX_EXAMPLES: usize = 3;
/// Phrases returned per metric
pub const TOP_PHRASES: usize = 10;

fn phrase_separator() -> &'static Regex {
    static SEPARATOR: OnceLock<Regex> = OnceLock::new();
    SEPARATOR.get_or_init(|| Regex::new(r"[,;.]").expect("valid separator regex"))
}

/// Split a free-text field into trimmed phrases, original casing kept
pub fn split_phrases(text: &str) -> Vec<&str> {
    phrase_separator()
        .split(text)
        .map(str::trim)
        .filter(|p| p.chars().count() >= MIN_PHRASE_CHARS)
        .collect()
}

/// Grouping key for a phrase
pub fn normalize_phrase(phrase: &str) -> String {
    phrase
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// One occurrence of a phrase
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SourceExample {
    pub date: String,
    /// Phrase as written
    pub text: String,
}

/// A ranked source phrase
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SourcePhrase {
    /// Normalized (lower-case) phrase
    pub text: String,
    /// Number of days mentioning the phrase
    pub count: usize,
    /// `count / days in period`
    pub frequency: f64,
    /// Most recent occurrences, newest first
    pub examples: Vec<SourceExample>,
}

/// Ranked phrases for both metrics
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DataSources {
    pub energy_sources: Vec<SourcePhrase>,
    pub stress_sources: Vec<SourcePhrase>,
}

/// Rank energy and stress source phrases across the entries
pub fn extract_sources(entries: &[DailyEntry]) -> DataSources {
    DataSources {
        energy_sources: rank_phrases(entries, Metric::Energy),
        stress_sources: rank_phrases(entries, Metric::Stress),
    }
}

#[derive(Debug, Default)]
struct PhraseTally {
    count: usize,
    examples: VecDeque<SourceExample>,
}

/// Rank the phrases of one metric, top [`TOP_PHRASES`] by frequency
pub fn rank_phrases(entries: &[DailyEntry], metric: Metric) -> Vec<SourcePhrase> {
    let mut phrases = collect_phrases(entries, metric);
    phrases.truncate(TOP_PHRASES);
    phrases
}

/// Every distinct phrase of one metric, sorted by frequency descending
///
/// A phrase counts at most once per entry, so frequency never exceeds 1.
/// Ties are broken by count and then text, so the order is deterministic.
pub fn collect_phrases(entries: &[DailyEntry], metric: Metric) -> Vec<SourcePhrase> {
    let total_days = entries.len().max(1) as f64;

    let mut ordered: Vec<&DailyEntry> = entries.iter().collect();
    ordered.sort_by(|a, b| chronological_key(&a.date).cmp(&chronological_key(&b.date)));

    let mut tallies: HashMap<String, PhraseTally> = HashMap::new();
    for entry in ordered {
        let mut seen = HashSet::new();
        for phrase in split_phrases(entry.sources(metric)) {
            let key = normalize_phrase(phrase);
            if !seen.insert(key.clone()) {
                continue;
            }

            let tally = tallies.entry(key).or_default();
            tally.count += 1;
            tally.examples.push_back(SourceExample {
                date: entry.date.clone(),
                text: phrase.to_string(),
            });
            if tally.examples.len() > MAX_EXAMPLES {
                tally.examples.pop_front();
            }
        }
    }

    let mut phrases: Vec<SourcePhrase> = tallies
        .into_iter()
        .map(|(text, tally)| SourcePhrase {
            text,
            count: tally.count,
            frequency: tally.count as f64 / total_days,
            examples: tally.examples.into_iter().rev().collect(),
        })
        .collect();

    phrases.sort_by(|a, b| {
        b.frequency
            .partial_cmp(&a.frequency)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| b.count.cmp(&a.count))
            .then_with(|| a.text.cmp(&b.text))
    });

    phrases
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_phrases_drops_short_fragments() {
        let phrases = split_phrases("Walk in park; ok, Coffee. . a,  yoga ");
        assert_eq!(phrases, vec!["Walk in park", "Coffee", "yoga"]);
    }

    #[test]
    fn test_case_insensitive_grouping_keeps_examples() {
        let entries = vec![
            DailyEntry::new("2024-03-01").stress_sources("Work deadline"),
            DailyEntry::new("2024-03-03").stress_sources("work  DEADLINE, traffic"),
            DailyEntry::new("2024-03-02").stress_sources("work deadline"),
        ];
        let ranked = rank_phrases(&entries, Metric::Stress);

        assert_eq!(ranked[0].text, "work deadline");
        assert_eq!(ranked[0].count, 3);
        assert_eq!(ranked[0].frequency, 1.0);
        // newest first, original casing
        assert_eq!(ranked[0].examples[0].date, "2024-03-03");
        assert_eq!(ranked[0].examples[0].text, "work  DEADLINE");
        assert_eq!(ranked[0].examples[2].text, "Work deadline");
        assert_eq!(ranked[1].text, "traffic");
    }

    #[test]
    fn test_examples_capped_at_three() {
        let entries: Vec<DailyEntry> = (1..=6)
            .map(|d| DailyEntry::new(format!("2024-03-0{}", d)).energy_sources("Music"))
            .collect();
        let ranked = rank_phrases(&entries, Metric::Energy);
        assert_eq!(ranked[0].examples.len(), 3);
        assert_eq!(ranked[0].examples[0].date, "2024-03-06");
        assert_eq!(ranked[0].examples[2].date, "2024-03-04");
    }

    #[test]
    fn test_repeat_within_entry_counts_once() {
        let entries = vec![
            DailyEntry::new("2024-03-01").energy_sources("nap, nap, Nap"),
            DailyEntry::new("2024-03-02"),
        ];
        let ranked = rank_phrases(&entries, Metric::Energy);
        assert_eq!(ranked[0].count, 1);
        assert_eq!(ranked[0].frequency, 0.5);
    }

    #[test]
    fn test_top_ten_descending() {
        let entries: Vec<DailyEntry> = (0..12)
            .map(|i| {
                let phrases: Vec<String> = (0..=i).map(|p| format!("source {}", p)).collect();
                DailyEntry::new(format!("2024-03-{:02}", i + 1)).energy_sources(phrases.join(", "))
            })
            .collect();

        let ranked = rank_phrases(&entries, Metric::Energy);
        assert_eq!(ranked.len(), 10);
        assert_eq!(ranked[0].text, "source 0");
        for pair in ranked.windows(2) {
            assert!(pair[0].frequency >= pair[1].frequency);
        }
        assert!(ranked.iter().all(|p| p.frequency <= 1.0));
    }

    #[test]
    fn test_empty_input() {
        let sources = extract_sources(&[]);
        assert!(sources.energy_sources.is_empty());
        assert!(sources.stress_sources.is_empty());
    }
}
