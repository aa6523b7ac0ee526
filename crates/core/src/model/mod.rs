//! Core data model: metric records and the rendered document tree.
//!
//! Metric records are produced by the loader and never mutated afterwards.
//! The document tree (chapters → sections → charts) is produced by the
//! renderer; the only mutable part of it is each block's placeholder, which
//! changes through the placeholder tracker.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Value of a single statistic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetricValue {
    Number(f64),
    Text(String),
}

impl MetricValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            MetricValue::Number(n) => Some(*n),
            MetricValue::Text(_) => None,
        }
    }
}

/// Display unit of a metric, which decides how its value is formatted.
///
/// Any unit name other than the four reserved ones is an amount unit whose
/// name is printed after the number (e.g. `billion Rials`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Unit {
    Count,
    Percent,
    Ratio,
    Text,
    Amount(String),
}

impl Unit {
    /// Whether values with this unit must be numeric.
    pub fn is_numeric(&self) -> bool {
        !matches!(self, Unit::Text)
    }
}

impl From<String> for Unit {
    fn from(value: String) -> Self {
        match value.trim() {
            "count" => Unit::Count,
            "percent" | "%" => Unit::Percent,
            "ratio" => Unit::Ratio,
            "text" => Unit::Text,
            other => Unit::Amount(other.to_string()),
        }
    }
}

impl From<Unit> for String {
    fn from(unit: Unit) -> Self {
        unit.to_string()
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Unit::Count => f.write_str("count"),
            Unit::Percent => f.write_str("percent"),
            Unit::Ratio => f.write_str("ratio"),
            Unit::Text => f.write_str("text"),
            Unit::Amount(label) => f.write_str(label),
        }
    }
}

/// A named statistic, identified by `(section_id, key)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricRecord {
    pub section_id: String,
    pub key: String,
    /// Human-readable indicator label used in statistics tables.
    pub label: String,
    pub value: MetricValue,
    pub unit: Unit,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<f64>,
}

/// Validated metric records for one report run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MetricSet {
    sections: BTreeMap<String, BTreeMap<String, MetricRecord>>,
}

impl MetricSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record, replacing any previous record with the same identity.
    pub fn insert(&mut self, record: MetricRecord) {
        self.sections
            .entry(record.section_id.clone())
            .or_default()
            .insert(record.key.clone(), record);
    }

    pub fn get(&self, section_id: &str, key: &str) -> Option<&MetricRecord> {
        self.sections.get(section_id).and_then(|s| s.get(key))
    }

    /// Ids of every section (or chapter) that carries metrics.
    pub fn section_ids(&self) -> impl Iterator<Item = &str> {
        self.sections.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.sections.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// State of an output placeholder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum Placeholder {
    Pending,
    Filled { text: String },
}

impl Placeholder {
    pub fn is_filled(&self) -> bool {
        matches!(self, Placeholder::Filled { .. })
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            Placeholder::Pending => None,
            Placeholder::Filled { text } => Some(text),
        }
    }
}

/// File references for one chart figure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartFiles {
    pub primary: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub alternates: Vec<String>,
}

/// One prompt unit: a chart analysis, or a chapter synthesis (no files).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartBlock {
    pub id: String,
    /// Display label, e.g. `Chart 1-2`.
    pub label: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub files: Option<ChartFiles>,
    pub prompt: String,
    /// SHA-256 hex digest of `prompt`.
    pub prompt_digest: String,
    pub placeholder: Placeholder,
}

/// Formatted statistics-table row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricRow {
    pub key: String,
    pub label: String,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionBlock {
    pub id: String,
    /// Dotted number, e.g. `1.2`.
    pub number: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intro: Option<String>,
    pub table: Vec<MetricRow>,
    pub charts: Vec<ChartBlock>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chapter {
    pub id: String,
    pub number: usize,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intro: Option<String>,
    pub sections: Vec<SectionBlock>,
    /// Chapter synthesis prompt.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conclusion: Option<ChartBlock>,
}

impl Chapter {
    /// All prompt blocks of the chapter in document order (charts, then conclusion).
    pub fn blocks(&self) -> impl Iterator<Item = &ChartBlock> {
        self.sections.iter().flat_map(|s| s.charts.iter()).chain(self.conclusion.iter())
    }

    pub fn blocks_mut(&mut self) -> impl Iterator<Item = &mut ChartBlock> {
        self.sections
            .iter_mut()
            .flat_map(|s| s.charts.iter_mut())
            .chain(self.conclusion.iter_mut())
    }
}

/// The assembled report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub title: String,
    pub chapters: Vec<Chapter>,
    generated_at: Option<DateTime<Utc>>,
}

impl Document {
    pub fn new(title: impl Into<String>, chapters: Vec<Chapter>) -> Self {
        Self { title: title.into(), chapters, generated_at: None }
    }

    pub fn generated_at(&self) -> Option<DateTime<Utc>> {
        self.generated_at
    }

    /// Set the generation timestamp if it has not been set yet.
    ///
    /// Returns the timestamp the document carries afterwards.
    pub fn stamp(&mut self, at: DateTime<Utc>) -> DateTime<Utc> {
        *self.generated_at.get_or_insert(at)
    }

    pub fn blocks(&self) -> impl Iterator<Item = &ChartBlock> {
        self.chapters.iter().flat_map(Chapter::blocks)
    }

    pub fn blocks_mut(&mut self) -> impl Iterator<Item = &mut ChartBlock> {
        self.chapters.iter_mut().flat_map(Chapter::blocks_mut)
    }

    pub fn block(&self, id: &str) -> Option<&ChartBlock> {
        self.blocks().find(|b| b.id == id)
    }
}
