//! Hierarchical Pattern Engine
//!
//! Groups the free-text energy and stress sources into themes:
//! - `fast`: keyword-anchor grouping, cheap enough to run on every refresh
//! - `deep`: TF-IDF cosine clustering with a refinement pass, run on request
//!
//! Both strategies sit behind the [`Clusterer`] trait and run cooperatively,
//! checking the abort signal between chunks of phrases.

pub mod cluster;
pub mod deep;
pub mod engine;
pub mod fast;
pub mod text;
pub mod types;

pub use cluster::{Cluster, ClusterContext, ClusterError, Clusterer, ProgressFn};
pub use deep::TfidfClusterer;
pub use engine::PatternEngine;
pub use fast::KeywordClusterer;
pub use text::{phrase_groups, PhraseGroup};
pub use types::{DiscoveryMethod, MainPattern, PatternMode, PatternResult, SubPattern};
