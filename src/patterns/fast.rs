//! Keyword-anchor clustering (fast mode)

use super::cluster::{Cluster, ClusterContext, ClusterError, Clusterer};
use super::text::{capitalize, PhraseGroup};
use super::types::DiscoveryMethod;
use async_trait::async_trait;
use std::collections::HashMap;

/// Groups each phrase under its most mentioned keyword
///
/// A keyword's weight is the number of days mentioning any phrase that
/// contains it. Every phrase is anchored on its heaviest keyword, so
/// "morning walk" and "walk with dog" both land under "Walk" when walking
/// comes up more often than mornings or dogs.
#[derive(Debug, Clone, Default)]
pub struct KeywordClusterer;

impl KeywordClusterer {
    pub fn new() -> Self {
        Self
    }
}

/// Mention weight per stem
fn stem_weights(phrases: &[PhraseGroup]) -> HashMap<&str, usize> {
    let mut weights: HashMap<&str, usize> = HashMap::new();
    for phrase in phrases {
        let mut stems: Vec<&str> = phrase.terms.iter().map(|t| t.stem.as_str()).collect();
        stems.sort_unstable();
        stems.dedup();
        for stem in stems {
            *weights.entry(stem).or_default() += phrase.count;
        }
    }
    weights
}

/// Heaviest stem of a phrase, ties to the alphabetically first
fn anchor_of<'a>(phrase: &'a PhraseGroup, weights: &HashMap<&str, usize>) -> Option<&'a str> {
    phrase
        .terms
        .iter()
        .map(|t| t.stem.as_str())
        .max_by(|a, b| {
            let wa = weights.get(a).copied().unwrap_or(0);
            let wb = weights.get(b).copied().unwrap_or(0);
            wa.cmp(&wb).then_with(|| b.cmp(a))
        })
}

/// Most mentioned surface form of `stem` among the members
fn surface_word(stem: &str, members: &[usize], phrases: &[PhraseGroup]) -> String {
    let mut words: HashMap<&str, usize> = HashMap::new();
    for &index in members {
        let phrase = &phrases[index];
        for term in phrase.terms.iter().filter(|t| t.stem == stem) {
            *words.entry(term.word.as_str()).or_default() += phrase.count;
        }
    }

    words
        .into_iter()
        .max_by(|(wa, ca), (wb, cb)| ca.cmp(cb).then_with(|| wb.cmp(wa)))
        .map(|(word, _)| word.to_string())
        .unwrap_or_else(|| stem.to_string())
}

#[async_trait]
impl Clusterer for KeywordClusterer {
    fn method(&self) -> DiscoveryMethod {
        DiscoveryMethod::KEYWORD_FREQUENCY
    }

    async fn cluster(
        &self,
        phrases: &[PhraseGroup],
        cx: &ClusterContext<'_>,
    ) -> Result<Vec<Cluster>, ClusterError> {
        let total = phrases.len();
        let weights = stem_weights(phrases);

        // (anchor stem, members); phrases without keywords keep their own key
        let mut groups: Vec<(Option<&str>, String, Vec<usize>)> = Vec::new();
        let mut by_anchor: HashMap<&str, usize> = HashMap::new();

        for (chunk_index, chunk) in phrases.chunks(cx.chunk_size()).enumerate() {
            let offset = chunk_index * cx.chunk_size();
            for (i, phrase) in chunk.iter().enumerate() {
                let index = offset + i;
                match anchor_of(phrase, &weights) {
                    Some(anchor) => {
                        let slot = *by_anchor.entry(anchor).or_insert_with(|| {
                            groups.push((Some(anchor), String::new(), Vec::new()));
                            groups.len() - 1
                        });
                        groups[slot].2.push(index);
                    }
                    None => groups.push((None, capitalize(&phrase.key), vec![index])),
                }
            }
            cx.checkpoint(offset + chunk.len(), total).await?;
        }

        let clusters = groups
            .into_iter()
            .map(|(anchor, label, members)| {
                let label = match anchor {
                    Some(stem) => capitalize(&surface_word(stem, &members, phrases)),
                    None => label,
                };
                Cluster { label, members }
            })
            .collect();

        Ok(clusters)
    }
}
