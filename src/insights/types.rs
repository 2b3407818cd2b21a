//! Insight types

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Kind of analysis an insight comes from
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum InsightKind {
    /// Energy/stress correlation
    Correlation,
    /// Weekly (day-of-week) pattern
    Pattern,
    /// Energy trend direction
    Prediction,
    /// Overall wellness recommendation
    Recommendation,
}

impl InsightKind {
    pub fn all() -> &'static [InsightKind] {
        &[
            InsightKind::Correlation,
            InsightKind::Pattern,
            InsightKind::Prediction,
            InsightKind::Recommendation,
        ]
    }
}

impl std::fmt::Display for InsightKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InsightKind::Correlation => write!(f, "correlation"),
            InsightKind::Pattern => write!(f, "pattern"),
            InsightKind::Prediction => write!(f, "prediction"),
            InsightKind::Recommendation => write!(f, "recommendation"),
        }
    }
}

/// A labelled value shown alongside an insight
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InsightDatum {
    pub label: String,
    pub value: String,
}

impl InsightDatum {
    pub fn new(label: impl Into<String>, value: impl ToString) -> Self {
        Self {
            label: label.into(),
            value: value.to_string(),
        }
    }
}

/// A generated insight
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Insight {
    #[serde(rename = "type")]
    pub kind: InsightKind,
    pub title: String,
    pub subtitle: String,
    pub description: String,
    /// 0.0 to 1.0
    pub confidence: f64,
    pub data: Vec<InsightDatum>,
    pub action_items: Vec<String>,
}

impl Insight {
    /// Create an insight with no data or action items
    pub fn new(
        kind: InsightKind,
        title: impl Into<String>,
        subtitle: impl Into<String>,
        description: impl Into<String>,
        confidence: f64,
    ) -> Self {
        Self {
            kind,
            title: title.into(),
            subtitle: subtitle.into(),
            description: description.into(),
            confidence: confidence.clamp(0.0, 1.0),
            data: Vec::new(),
            action_items: Vec::new(),
        }
    }

    /// Builder method: append a data row
    pub fn datum(mut self, label: impl Into<String>, value: impl ToString) -> Self {
        self.data.push(InsightDatum::new(label, value));
        self
    }

    /// Builder method: set action items
    pub fn actions<I, S>(mut self, items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.action_items = items.into_iter().map(Into::into).collect();
        self
    }

    /// Value of a data row by label
    pub fn data_value(&self, label: &str) -> Option<&str> {
        self.data
            .iter()
            .find(|d| d.label == label)
            .map(|d| d.value.as_str())
    }
}

/// Insights keyed by kind; only kinds that met their thresholds are present
pub type InsightMap = BTreeMap<InsightKind, Insight>;
