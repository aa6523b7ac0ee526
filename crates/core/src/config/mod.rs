//! Report configuration and on-disk project layout.
//!
//! - `ReportConfig`: serializable settings for formatting and export.
//! - `ReportLayout`: conventional paths for a report project.

mod layout;

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ReportResult;
use crate::files::read_structured;

pub use layout::ReportLayout;

/// Digit system used when formatting numbers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Digits {
    #[default]
    Latin,
    /// Eastern Arabic-Indic digits with Persian separators.
    Persian,
}

/// Serialized form of the exported document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Markdown,
    Json,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Markdown => "markdown",
            OutputFormat::Json => "json",
        }
    }
}

/// How metric values are turned into text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatOptions {
    pub digits: Digits,
    pub percent_decimals: usize,
    pub ratio_decimals: usize,
    pub amount_decimals: usize,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self { digits: Digits::Latin, percent_decimals: 1, ratio_decimals: 3, amount_decimals: 0 }
    }
}

/// Export policy and Markdown presentation settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportOptions {
    /// Refuse to export while any placeholder is pending.
    pub strict: bool,
    pub output_format: OutputFormat,
    /// Line written in place of pending analysis output.
    pub placeholder_marker: String,
    /// Info string on the fenced code block that holds each prompt.
    pub prompt_fence_label: String,
    pub indicator_header: String,
    pub value_header: String,
    pub target_header: String,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            strict: false,
            output_format: OutputFormat::Markdown,
            placeholder_marker: "[ANALYSIS OUTPUT HERE]".to_string(),
            prompt_fence_label: "prompt".to_string(),
            indicator_header: "Indicator".to_string(),
            value_header: "Value".to_string(),
            target_header: "Target".to_string(),
        }
    }
}

/// Serializable configuration for a report run.
///
/// Missing fields fall back to their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Config format version, not the report's version.
    pub config_version: String,
    /// Overrides the skeleton's document title when set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub format: FormatOptions,
    pub export: ExportOptions,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            config_version: "0.1.0".to_string(),
            title: None,
            format: FormatOptions::default(),
            export: ExportOptions::default(),
        }
    }
}

/// Load a report config from YAML or JSON (by extension).
pub fn load_report_config(path: &Path) -> ReportResult<ReportConfig> {
    let config: ReportConfig = read_structured(path)?;
    log::debug!("loaded report config from {}", path.display());
    Ok(config)
}
