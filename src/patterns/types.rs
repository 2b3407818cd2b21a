//! Pattern result types
//!
//! `PatternResult` is the only way pattern output leaves the engine. Its
//! constructors guarantee `main_patterns` is always a list, and
//! deserialization maps a missing or `null` list to an empty one.

use crate::entry::Metric;
use crate::sources::SourceExample;
use serde::{Deserialize, Deserializer, Serialize};
use std::borrow::Cow;

/// Clustering quality tier
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum PatternMode {
    /// Cheap heuristic grouping, safe to run eagerly
    Fast,
    /// Thorough lexical clustering, only on explicit request
    Deep,
}

impl std::fmt::Display for PatternMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PatternMode::Fast => write!(f, "fast"),
            PatternMode::Deep => write!(f, "deep"),
        }
    }
}

impl std::str::FromStr for PatternMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "fast" => Ok(PatternMode::Fast),
            "deep" => Ok(PatternMode::Deep),
            other => Err(format!("Unknown pattern mode: {}", other)),
        }
    }
}

/// Tag naming the technique that produced a result
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DiscoveryMethod(Cow<'static, str>);

impl DiscoveryMethod {
    /// No clustering ran (empty input or failure)
    pub const NONE: DiscoveryMethod = DiscoveryMethod(Cow::Borrowed("none"));
    pub const KEYWORD_FREQUENCY: DiscoveryMethod =
        DiscoveryMethod(Cow::Borrowed("keyword-frequency"));
    pub const TFIDF_COSINE: DiscoveryMethod = DiscoveryMethod(Cow::Borrowed("tfidf-cosine"));

    /// A custom method tag
    pub fn custom(name: impl Into<String>) -> Self {
        DiscoveryMethod(Cow::Owned(name.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for DiscoveryMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A specific wording within a main pattern
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SubPattern {
    pub label: String,
    pub count: usize,
    #[serde(default)]
    pub examples: Vec<SourceExample>,
}

/// A theme grouping several sub-patterns
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MainPattern {
    pub label: String,
    pub total_count: usize,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub sub_patterns: Vec<SubPattern>,
}

/// Pattern discovery output for one metric and mode
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PatternResult {
    #[serde(rename = "type")]
    pub metric: Metric,
    pub total_mentions: usize,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub main_patterns: Vec<MainPattern>,
    pub mode: PatternMode,
    pub discovery_method: DiscoveryMethod,
    /// Set when clustering failed and this is a fallback result
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<String>,
}

impl PatternResult {
    /// Zero-value result for empty input
    pub fn empty(metric: Metric, mode: PatternMode) -> Self {
        Self {
            metric,
            total_mentions: 0,
            main_patterns: Vec::new(),
            mode,
            discovery_method: DiscoveryMethod::NONE,
            failure: None,
        }
    }

    /// Result of a successful clustering pass
    pub fn discovered(
        metric: Metric,
        mode: PatternMode,
        method: DiscoveryMethod,
        total_mentions: usize,
        main_patterns: Vec<MainPattern>,
    ) -> Self {
        Self {
            metric,
            total_mentions,
            main_patterns,
            mode,
            discovery_method: method,
            failure: None,
        }
    }

    /// Zero-value result standing in for a failed clustering pass
    pub fn failed(metric: Metric, mode: PatternMode, reason: impl Into<String>) -> Self {
        Self {
            failure: Some(reason.into()),
            ..Self::empty(metric, mode)
        }
    }

    pub fn is_failed(&self) -> bool {
        self.failure.is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.main_patterns.is_empty()
    }
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}
