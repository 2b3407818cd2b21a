//! TF-IDF cosine clustering (deep mode)
//!
//! Each phrase becomes an L2-normalized TF-IDF vector over keyword stems.
//! A leader pass walks the phrases from most to least mentioned and joins
//! each one to the most similar existing cluster when the cosine similarity
//! reaches the threshold, otherwise it starts a new cluster. A second pass
//! reassigns every phrase to its nearest final centroid, which fixes early
//! phrases that joined before a better cluster existed.

use super::cluster::{Cluster, ClusterContext, ClusterError, Clusterer};
use super::text::{capitalize, PhraseGroup};
use super::types::DiscoveryMethod;
use async_trait::async_trait;
use std::collections::HashMap;

/// A second label term is added when its weight is at least this share of the top term
const SECOND_TERM_RATIO: f64 = 0.8;

/// Sparse vector: (term id, weight), sorted by term id
type SparseVec = Vec<(usize, f64)>;

#[derive(Debug, Clone)]
pub struct TfidfClusterer {
    similarity_threshold: f64,
}

impl TfidfClusterer {
    pub fn new(similarity_threshold: f64) -> Self {
        Self {
            similarity_threshold: similarity_threshold.clamp(0.0, 1.0),
        }
    }

    pub fn similarity_threshold(&self) -> f64 {
        self.similarity_threshold
    }
}

impl Default for TfidfClusterer {
    fn default() -> Self {
        Self::new(0.3)
    }
}

/// Stem vocabulary with the most mentioned surface word of each stem
struct Vocabulary {
    stems: Vec<String>,
    words: Vec<String>,
    ids: HashMap<String, usize>,
}

impl Vocabulary {
    fn build(phrases: &[PhraseGroup]) -> Self {
        let mut ids: HashMap<String, usize> = HashMap::new();
        let mut stems = Vec::new();
        let mut word_counts: Vec<HashMap<String, usize>> = Vec::new();

        for phrase in phrases {
            for term in &phrase.terms {
                let id = *ids.entry(term.stem.clone()).or_insert_with(|| {
                    stems.push(term.stem.clone());
                    word_counts.push(HashMap::new());
                    stems.len() - 1
                });
                *word_counts[id].entry(term.word.clone()).or_default() += phrase.count;
            }
        }

        let words = word_counts
            .into_iter()
            .zip(&stems)
            .map(|(counts, stem)| {
                counts
                    .into_iter()
                    .max_by(|(wa, ca), (wb, cb)| ca.cmp(cb).then_with(|| wb.cmp(wa)))
                    .map(|(word, _)| word)
                    .unwrap_or_else(|| stem.clone())
            })
            .collect();

        Self { stems, words, ids }
    }

    fn len(&self) -> usize {
        self.stems.len()
    }
}

/// L2-normalized TF-IDF vector per phrase; empty for phrases without keywords
fn tfidf_vectors(phrases: &[PhraseGroup], vocab: &Vocabulary) -> Vec<SparseVec> {
    let mut df = vec![0usize; vocab.len()];
    let mut term_freqs: Vec<HashMap<usize, usize>> = Vec::with_capacity(phrases.len());

    for phrase in phrases {
        let mut tf: HashMap<usize, usize> = HashMap::new();
        for term in &phrase.terms {
            if let Some(&id) = vocab.ids.get(&term.stem) {
                *tf.entry(id).or_default() += 1;
            }
        }
        for &id in tf.keys() {
            df[id] += 1;
        }
        term_freqs.push(tf);
    }

    let n = phrases.len() as f64;
    term_freqs
        .into_iter()
        .map(|tf| {
            let total: usize = tf.values().sum();
            let mut vector: SparseVec = tf
                .into_iter()
                .map(|(id, count)| {
                    let idf = ((n + 1.0) / (df[id] as f64 + 1.0)).ln() + 1.0;
                    (id, count as f64 / total as f64 * idf)
                })
                .collect();
            vector.sort_by_key(|&(id, _)| id);

            let norm = vector.iter().map(|(_, w)| w * w).sum::<f64>().sqrt();
            if norm > 0.0 {
                for (_, w) in vector.iter_mut() {
                    *w /= norm;
                }
            }
            vector
        })
        .collect()
}

/// Count-weighted sum of member vectors
#[derive(Debug, Clone)]
struct Centroid {
    weights: Vec<f64>,
    norm: f64,
}

impl Centroid {
    fn new(dimensions: usize) -> Self {
        Self {
            weights: vec![0.0; dimensions],
            norm: 0.0,
        }
    }

    fn add(&mut self, vector: &SparseVec, count: usize) {
        for &(id, w) in vector {
            self.weights[id] += w * count as f64;
        }
        self.norm = self.weights.iter().map(|w| w * w).sum::<f64>().sqrt();
    }

    /// Cosine similarity with a normalized phrase vector
    fn similarity(&self, vector: &SparseVec) -> Result<f64, ClusterError> {
        if self.norm == 0.0 {
            return Ok(0.0);
        }
        let dot: f64 = vector.iter().map(|&(id, w)| self.weights[id] * w).sum();
        let similarity = dot / self.norm;
        if !similarity.is_finite() {
            return Err(ClusterError::Failed(format!(
                "non-finite similarity {}",
                similarity
            )));
        }
        Ok(similarity)
    }
}

/// Index and similarity of the closest centroid, ties to the earliest
fn nearest(centroids: &[Centroid], vector: &SparseVec) -> Result<Option<(usize, f64)>, ClusterError> {
    let mut best: Option<(usize, f64)> = None;
    for (index, centroid) in centroids.iter().enumerate() {
        let similarity = centroid.similarity(vector)?;
        if best.map_or(true, |(_, s)| similarity > s) {
            best = Some((index, similarity));
        }
    }
    Ok(best)
}

fn label_for(centroid: &Centroid, vocab: &Vocabulary) -> String {
    let mut ranked: Vec<(usize, f64)> = centroid
        .weights
        .iter()
        .copied()
        .enumerate()
        .filter(|&(_, w)| w > 0.0)
        .collect();
    ranked.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| vocab.words[a.0].cmp(&vocab.words[b.0]))
    });

    match ranked.as_slice() {
        [] => String::new(),
        [(top, _)] => capitalize(&vocab.words[*top]),
        [(top, wt), (second, ws), ..] => {
            if *ws >= wt * SECOND_TERM_RATIO {
                format!("{} & {}", capitalize(&vocab.words[*top]), vocab.words[*second])
            } else {
                capitalize(&vocab.words[*top])
            }
        }
    }
}

#[async_trait]
impl Clusterer for TfidfClusterer {
    fn method(&self) -> DiscoveryMethod {
        DiscoveryMethod::TFIDF_COSINE
    }

    async fn cluster(
        &self,
        phrases: &[PhraseGroup],
        cx: &ClusterContext<'_>,
    ) -> Result<Vec<Cluster>, ClusterError> {
        let vocab = Vocabulary::build(phrases);
        let vectors = tfidf_vectors(phrases, &vocab);
        cx.check()?;

        // Both passes report against one total
        let total = phrases.len() * 2;
        let mut centroids: Vec<Centroid> = Vec::new();
        let mut singletons: Vec<usize> = Vec::new();

        for (chunk_index, chunk) in vectors.chunks(cx.chunk_size()).enumerate() {
            let offset = chunk_index * cx.chunk_size();
            for (i, vector) in chunk.iter().enumerate() {
                let index = offset + i;
                if vector.is_empty() {
                    singletons.push(index);
                    continue;
                }
                let count = phrases[index].count;
                match nearest(&centroids, vector)? {
                    Some((best, similarity)) if similarity >= self.similarity_threshold => {
                        centroids[best].add(vector, count);
                    }
                    _ => {
                        let mut centroid = Centroid::new(vocab.len());
                        centroid.add(vector, count);
                        centroids.push(centroid);
                    }
                }
            }
            cx.checkpoint(offset + chunk.len(), total).await?;
        }

        // Refinement: nearest final centroid for every phrase
        let mut members: Vec<Vec<usize>> = vec![Vec::new(); centroids.len()];
        for (chunk_index, chunk) in vectors.chunks(cx.chunk_size()).enumerate() {
            let offset = chunk_index * cx.chunk_size();
            for (i, vector) in chunk.iter().enumerate() {
                if vector.is_empty() {
                    continue;
                }
                if let Some((best, _)) = nearest(&centroids, vector)? {
                    members[best].push(offset + i);
                }
            }
            cx.checkpoint(phrases.len() + offset + chunk.len(), total)
                .await?;
        }

        let mut clusters = Vec::with_capacity(members.len() + singletons.len());
        for group in members.into_iter().filter(|m| !m.is_empty()) {
            let mut centroid = Centroid::new(vocab.len());
            for &index in &group {
                centroid.add(&vectors[index], phrases[index].count);
            }
            clusters.push(Cluster {
                label: label_for(&centroid, &vocab),
                members: group,
            });
        }
        for index in singletons {
            clusters.push(Cluster {
                label: capitalize(&phrases[index].key),
                members: vec![index],
            });
        }

        Ok(clusters)
    }
}
