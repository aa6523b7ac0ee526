//! Error type shared by every stage of report assembly.

use std::path::PathBuf;

use thiserror::Error;

/// Error type for loading, rendering, tracking, and exporting a report.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Input metric data is missing or malformed.
    #[error("validation error in section '{section}': {message}")]
    Validation { section: String, key: Option<String>, message: String },

    /// The skeleton references data that does not exist, or is malformed.
    #[error("template error at {location}: {message}")]
    Template { location: String, marker: Option<String>, message: String },

    /// An operation named a placeholder that is not in the document.
    #[error("placeholder not found: '{id}'")]
    NotFound { id: String },

    /// Strict export was requested while placeholders are still pending.
    #[error(
        "document incomplete: {} placeholder(s) pending ({})",
        pending.len(),
        pending.join(", ")
    )]
    IncompleteDocument { pending: Vec<String> },

    /// Fill text was empty after trimming.
    #[error("fill text for placeholder '{id}' is empty")]
    EmptyFill { id: String },

    /// An input file could not be parsed as YAML/JSON.
    #[error("failed to parse {path}: {message}")]
    Parse { path: PathBuf, message: String },

    /// A value could not be serialized for writing.
    #[error("failed to encode {path}: {message}")]
    Encode { path: PathBuf, message: String },

    /// Filesystem error, tagged with the path involved.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ReportError {
    pub(crate) fn validation(
        section: impl Into<String>,
        key: Option<&str>,
        message: impl Into<String>,
    ) -> Self {
        ReportError::Validation {
            section: section.into(),
            key: key.map(str::to_string),
            message: message.into(),
        }
    }

    pub(crate) fn template(location: impl Into<String>, message: impl Into<String>) -> Self {
        ReportError::Template { location: location.into(), marker: None, message: message.into() }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ReportError::Io { path: path.into(), source }
    }
}

/// Convenience result type for report operations.
pub type ReportResult<T> = Result<T, ReportError>;
