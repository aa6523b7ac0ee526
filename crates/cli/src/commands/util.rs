use std::path::Path;

use anyhow::{Context, Result};
use report_core::config::{load_report_config, ReportConfig};
use report_core::loader::{load_metrics_file, unknown_sections};
use report_core::model::{ChartBlock, Document};
use report_core::render::render_document;
use report_core::skeleton::load_skeleton;
use report_core::tracker::{ApplyReport, FillSet};
use report_core::ReportError;

/// Input files shared by every command that renders the report.
#[derive(Debug, Clone, Default)]
pub struct ReportInputs {
    /// Metrics file (YAML or JSON).
    pub input: String,
    /// Skeleton file (YAML or JSON).
    pub template: String,
    /// Optional fills file applied after rendering.
    pub fills: Option<String>,
    /// Optional report config; defaults apply when absent.
    pub config: Option<String>,
}

impl ReportInputs {
    pub fn new(input: impl Into<String>, template: impl Into<String>) -> Self {
        Self { input: input.into(), template: template.into(), fills: None, config: None }
    }

    pub fn with_fills(mut self, fills: Option<String>) -> Self {
        self.fills = fills;
        self
    }

    pub fn with_config(mut self, config: Option<String>) -> Self {
        self.config = config;
        self
    }
}

/// A rendered document with its fills applied.
#[derive(Debug)]
pub struct Assembled {
    pub config: ReportConfig,
    pub document: Document,
    pub fills: ApplyReport,
}

/// Load the report config, or the defaults when no path is given.
pub fn load_config(path: Option<&str>) -> Result<ReportConfig> {
    match path {
        Some(p) => load_report_config(Path::new(p))
            .with_context(|| format!("Failed to load report config {p}")),
        None => Ok(ReportConfig::default()),
    }
}

/// Load skeleton and metrics and render the document, without fills.
pub fn render_inputs(inputs: &ReportInputs) -> Result<(ReportConfig, Document)> {
    let config = load_config(inputs.config.as_deref())?;
    let skeleton = load_skeleton(Path::new(&inputs.template))
        .with_context(|| format!("Failed to load skeleton {}", inputs.template))?;
    let metrics = load_metrics_file(Path::new(&inputs.input), &skeleton.requirements())
        .with_context(|| format!("Failed to load metrics {}", inputs.input))?;

    for section in unknown_sections(&metrics, &skeleton) {
        log::warn!("metrics section '{section}' is not used by the skeleton");
    }

    let document = render_document(&skeleton, &metrics, &config)
        .with_context(|| format!("Failed to render {}", inputs.template))?;
    Ok((config, document))
}

/// Render the document and apply the fills file, if one is configured.
pub fn assemble(inputs: &ReportInputs) -> Result<Assembled> {
    let (config, mut document) = render_inputs(inputs)?;
    let fills = match &inputs.fills {
        Some(path) => {
            let set = FillSet::load(Path::new(path))
                .with_context(|| format!("Failed to load fills {path}"))?;
            set.apply(&mut document).with_context(|| format!("Failed to apply fills {path}"))?
        }
        None => ApplyReport::default(),
    };
    Ok(Assembled { config, document, fills })
}

/// Look up a placeholder block, failing with `NotFound` for unknown ids.
pub fn require_block<'d>(document: &'d Document, id: &str) -> Result<&'d ChartBlock> {
    document.block(id).ok_or_else(|| ReportError::NotFound { id: id.to_string() }.into())
}
