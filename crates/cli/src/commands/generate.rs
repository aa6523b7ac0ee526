use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use report_core::config::OutputFormat;
use report_core::export::Exporter;
use report_core::tracker;

use crate::commands::{assemble, ReportInputs};

/// Flags of the `generate` command that shape the export.
#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    pub out: String,
    /// Force strict export regardless of the config.
    pub strict: bool,
    /// Overrides the configured output format.
    pub format: Option<OutputFormat>,
    /// RFC 3339 generation time, for reproducible output.
    pub timestamp: Option<String>,
}

/// Parse an RFC 3339 timestamp into UTC.
pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    let parsed = DateTime::parse_from_rfc3339(value)
        .with_context(|| format!("Invalid --timestamp '{value}' (expected RFC 3339)"))?;
    Ok(parsed.with_timezone(&Utc))
}

/// Render, fill, and export the report to `opts.out`.
pub fn generate_command(inputs: &ReportInputs, opts: &GenerateOptions) -> Result<()> {
    let assembled = assemble(inputs)?;
    let mut document = assembled.document;

    let mut exporter = Exporter::from_config(&assembled.config);
    if opts.strict {
        exporter = exporter.strict(true);
    }
    if let Some(format) = opts.format {
        exporter = exporter.format(format);
    }
    if let Some(ts) = &opts.timestamp {
        exporter = exporter.with_timestamp(parse_timestamp(ts)?);
    }

    // Fail before touching the filesystem.
    exporter.check(&document)?;

    let out = Path::new(&opts.out);
    if let Some(parent) = out.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create output dir: {}", parent.display()))?;
    }
    exporter
        .export_to_path(&mut document, out)
        .with_context(|| format!("Failed to export report to {}", out.display()))?;

    let summary = tracker::summary(&document);
    if summary.pending > 0 {
        log::warn!("{} placeholder(s) still pending", summary.pending);
    }
    println!("Wrote {} ({})", out.display(), exporter.options.output_format.as_str());
    println!("  Placeholders: {} filled, {} pending", summary.filled, summary.pending);
    if !assembled.fills.stale.is_empty() {
        println!("  Stale fills: {}", assembled.fills.stale.join(", "));
    }
    Ok(())
}
