//! Document export.
//!
//! The exporter enforces the strict/lenient completeness policy, stamps the
//! generation timestamp (once), serializes the document, and writes it to a
//! stream or, atomically, to a file.

mod markdown;

use std::io::Write;
use std::path::Path;

use chrono::{DateTime, Utc};

use crate::config::{ExportOptions, OutputFormat, ReportConfig};
use crate::error::{ReportError, ReportResult};
use crate::files::write_atomic;
use crate::model::Document;
use crate::tracker;

pub use markdown::to_markdown;

#[derive(Debug, Clone, Default)]
pub struct Exporter {
    pub options: ExportOptions,
    /// Fixed generation time; the current time is used when unset.
    pub timestamp: Option<DateTime<Utc>>,
}

impl Exporter {
    pub fn new(options: ExportOptions) -> Self {
        Self { options, timestamp: None }
    }

    pub fn from_config(config: &ReportConfig) -> Self {
        Self::new(config.export.clone())
    }

    pub fn strict(mut self, strict: bool) -> Self {
        self.options.strict = strict;
        self
    }

    pub fn format(mut self, format: OutputFormat) -> Self {
        self.options.output_format = format;
        self
    }

    pub fn with_timestamp(mut self, at: DateTime<Utc>) -> Self {
        self.timestamp = Some(at);
        self
    }

    /// In strict mode, fail with `IncompleteDocument` if anything is pending.
    pub fn check(&self, doc: &Document) -> ReportResult<()> {
        if self.options.strict && !tracker::is_complete(doc) {
            return Err(ReportError::IncompleteDocument { pending: tracker::pending_ids(doc) });
        }
        Ok(())
    }

    /// Check, stamp, and serialize `doc` in the configured format.
    ///
    /// A document that already carries a timestamp keeps it, so exporting
    /// the same document twice yields identical output.
    pub fn render(&self, doc: &mut Document) -> ReportResult<String> {
        self.check(doc)?;
        doc.stamp(self.timestamp.unwrap_or_else(Utc::now));
        match self.options.output_format {
            OutputFormat::Markdown => Ok(to_markdown(doc, &self.options)),
            OutputFormat::Json => {
                let body = serde_json::to_string_pretty(&*doc).map_err(|e| ReportError::Encode {
                    path: "<document>".into(),
                    message: e.to_string(),
                })?;
                Ok(body + "\n")
            }
        }
    }

    /// Export to a stream.
    pub fn export_to_writer<W: Write>(
        &self,
        doc: &mut Document,
        mut writer: W,
    ) -> ReportResult<()> {
        let body = self.render(doc)?;
        writer
            .write_all(body.as_bytes())
            .and_then(|_| writer.flush())
            .map_err(|e| ReportError::io("<stream>", e))
    }

    /// Export to `path`, replacing it atomically.
    ///
    /// Nothing is written if the strict check fails, and a failure while
    /// writing leaves any existing file at `path` untouched.
    pub fn export_to_path(&self, doc: &mut Document, path: &Path) -> ReportResult<()> {
        let body = self.render(doc)?;
        write_atomic(path, body.as_bytes())?;
        log::info!(
            "exported {} ({}) to {}",
            doc.title,
            self.options.output_format.as_str(),
            path.display()
        );
        Ok(())
    }
}
