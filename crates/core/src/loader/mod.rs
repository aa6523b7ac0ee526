//! Metric data loader.
//!
//! Reads a mapping from section (or chapter) ids to metric collections and
//! turns it into a validated `MetricSet`. A metric is either a bare scalar
//! or a map with `value` and optional `unit`, `label`, and `target`:
//!
//! ```yaml
//! sections:
//!   ch1.overview:
//!     total_subjects: 387
//!     payment_rate: { value: "42.5%", unit: percent, target: 60 }
//! ```
//!
//! Without an explicit `unit`, integral numbers are counts and fractional
//! numbers are ratios. Strings are text, except for keys listed in a
//! statistics table: there a string must read as a number (a trailing `%`
//! makes it a percent), and `unit: text` is needed to keep it as text.

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ReportError, ReportResult};
use crate::files::{parse_structured, read_structured, Syntax};
use crate::model::{MetricRecord, MetricSet, MetricValue, Unit};
use crate::skeleton::{MetricRequirement, Skeleton};

/// Raw metrics document as read from disk.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetricsInput {
    #[serde(default)]
    pub sections: BTreeMap<String, BTreeMap<String, RawMetric>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Number(f64),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawMetric {
    Detailed {
        value: RawValue,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        unit: Option<Unit>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        label: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        target: Option<f64>,
    },
    Scalar(RawValue),
}

fn is_key_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-')
}

/// Parse a numeric string, tolerating thousands separators and a trailing `%`.
fn parse_number(text: &str) -> Option<f64> {
    let cleaned: String = text
        .trim()
        .trim_end_matches('%')
        .chars()
        .filter(|c| !matches!(c, ',' | '_' | ' '))
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok()
}

fn numeric_unit(n: f64) -> Unit {
    if n.fract() == 0.0 {
        Unit::Count
    } else {
        Unit::Ratio
    }
}

/// Unit for a metric given without one. `table_key` marks keys shown in a
/// statistics table, whose strings are read as numbers.
fn default_unit(value: &RawValue, table_key: bool) -> Unit {
    match value {
        RawValue::Number(n) => numeric_unit(*n),
        RawValue::Text(_) if !table_key => Unit::Text,
        RawValue::Text(text) if text.trim().ends_with('%') => Unit::Percent,
        // Unparseable strings stay numeric so they fail validation below.
        RawValue::Text(text) => parse_number(text).map_or(Unit::Count, numeric_unit),
    }
}

fn to_record(
    section_id: &str,
    key: &str,
    raw: RawMetric,
    table_key: bool,
) -> ReportResult<MetricRecord> {
    if key.is_empty() || !key.chars().all(is_key_char) {
        return Err(ReportError::validation(
            section_id,
            Some(key),
            format!("metric key '{key}' may only contain letters, digits, '_', '.' and '-'"),
        ));
    }

    let (value, explicit_unit, label, target) = match raw {
        RawMetric::Scalar(value) => (value, None, None, None),
        RawMetric::Detailed { value, unit, label, target } => (value, unit, label, target),
    };
    let unit = explicit_unit.clone().unwrap_or_else(|| default_unit(&value, table_key));

    let value = match (value, unit.is_numeric()) {
        (RawValue::Number(n), true) => MetricValue::Number(n),
        // Numbers tagged as text (years, codes) are kept as written.
        (RawValue::Number(n), false) => MetricValue::Text(n.to_string()),
        (RawValue::Text(text), true) => match parse_number(&text) {
            Some(n) => MetricValue::Number(n),
            None if explicit_unit.is_none() => {
                return Err(ReportError::validation(
                    section_id,
                    Some(key),
                    format!(
                        "table metric '{key}' has value '{text}', which is not a number; \
                         set `unit: text` to show it as text"
                    ),
                ))
            }
            None => {
                return Err(ReportError::validation(
                    section_id,
                    Some(key),
                    format!("metric '{key}' has unit '{unit}' but value '{text}' is not a number"),
                ))
            }
        },
        (RawValue::Text(text), false) => MetricValue::Text(text),
    };

    if value.as_number().is_some_and(|n| !n.is_finite()) {
        return Err(ReportError::validation(
            section_id,
            Some(key),
            format!("metric '{key}' has a non-finite value"),
        ));
    }

    let target = match target {
        Some(_) if unit == Unit::Text => {
            return Err(ReportError::validation(
                section_id,
                Some(key),
                format!("metric '{key}' is text and cannot have a target"),
            ))
        }
        Some(t) if !t.is_finite() => {
            return Err(ReportError::validation(
                section_id,
                Some(key),
                format!("metric '{key}' has a non-finite target"),
            ))
        }
        t => t,
    };

    Ok(MetricRecord {
        section_id: section_id.to_string(),
        key: key.to_string(),
        label: label.unwrap_or_else(|| key.to_string()),
        value,
        unit,
        target,
    })
}

/// Validate raw input against the metrics the skeleton requires.
pub fn load_metrics(
    input: MetricsInput,
    requirements: &[MetricRequirement],
) -> ReportResult<MetricSet> {
    let table_keys: HashSet<(&str, &str)> =
        requirements.iter().map(|r| (r.section_id.as_str(), r.key.as_str())).collect();

    let mut set = MetricSet::new();
    for (section_id, metrics) in input.sections {
        for (key, raw) in metrics {
            let table_key = table_keys.contains(&(section_id.as_str(), key.as_str()));
            set.insert(to_record(&section_id, &key, raw, table_key)?);
        }
    }

    for req in requirements {
        if set.get(&req.section_id, &req.key).is_none() {
            return Err(ReportError::validation(
                &req.section_id,
                Some(&req.key),
                format!("required metric '{}' is missing", req.key),
            ));
        }
    }

    log::debug!("validated {} metric record(s)", set.len());
    Ok(set)
}

/// Parse and validate metrics from a YAML or JSON string.
pub fn parse_metrics_str(
    body: &str,
    syntax: Syntax,
    requirements: &[MetricRequirement],
) -> ReportResult<MetricSet> {
    let input: MetricsInput = parse_structured(body, syntax, Path::new("<metrics>"))?;
    load_metrics(input, requirements)
}

/// Read and validate a metrics file (YAML or JSON by extension).
pub fn load_metrics_file(
    path: &Path,
    requirements: &[MetricRequirement],
) -> ReportResult<MetricSet> {
    let input: MetricsInput = read_structured(path)?;
    let set = load_metrics(input, requirements)?;
    log::info!("loaded {} metric(s) from {}", set.len(), path.display());
    Ok(set)
}

/// Sections present in the metrics but unknown to the skeleton.
///
/// These are not errors: extra data is harmless, but usually a typo.
pub fn unknown_sections(metrics: &MetricSet, skeleton: &Skeleton) -> Vec<String> {
    let known: Vec<&str> = skeleton.scope_ids().collect();
    metrics.section_ids().filter(|id| !known.contains(id)).map(str::to_string).collect()
}
