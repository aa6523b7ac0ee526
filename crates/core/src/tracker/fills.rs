use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ReportError, ReportResult};
use crate::files::{read_structured, to_structured_string, write_atomic};
use crate::model::Document;
use crate::tracker::PlaceholderTracker;

/// Analysis text recorded for one placeholder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FillEntry {
    pub text: String,
    /// Digest of the prompt the text answers; used to spot stale fills.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_digest: Option<String>,
}

/// Fill texts keyed by placeholder id, as kept in a fills file.
///
/// The fills file belongs to whoever performs the fill step (a person or an
/// external tool); the assembler only reads it, or edits it through `fill`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FillSet {
    #[serde(default)]
    pub fills: BTreeMap<String, FillEntry>,
}

/// Outcome of applying a fill set to a document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ApplyReport {
    pub applied: Vec<String>,
    /// Fills whose recorded prompt digest no longer matches the prompt.
    pub stale: Vec<String>,
}

impl FillSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a fills file. A missing file is an `Io` error.
    pub fn load(path: &Path) -> ReportResult<Self> {
        let set: FillSet = read_structured(path)?;
        log::info!("loaded {} fill(s) from {}", set.fills.len(), path.display());
        Ok(set)
    }

    /// Load a fills file, starting empty when it does not exist yet.
    pub fn load_or_default(path: &Path) -> ReportResult<Self> {
        if !path.exists() {
            log::info!("no fills file at {}; starting empty", path.display());
            return Ok(Self::new());
        }
        Self::load(path)
    }

    /// Write the fills file atomically (YAML or JSON by extension).
    pub fn save(&self, path: &Path) -> ReportResult<()> {
        let body = to_structured_string(self, path)?;
        write_atomic(path, body.as_bytes())
    }

    /// Record `text` for `id`, answering the prompt with `prompt_digest`.
    pub fn upsert(
        &mut self,
        id: &str,
        text: &str,
        prompt_digest: Option<String>,
    ) -> ReportResult<()> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ReportError::EmptyFill { id: id.to_string() });
        }
        self.fills.insert(id.to_string(), FillEntry { text: text.to_string(), prompt_digest });
        Ok(())
    }

    /// Fill every placeholder named in the set.
    ///
    /// All ids are checked before anything is filled, so an unknown id
    /// (`NotFound`) or blank text (`EmptyFill`) leaves the document unchanged.
    pub fn apply(&self, doc: &mut Document) -> ReportResult<ApplyReport> {
        let mut report = ApplyReport::default();
        for (id, entry) in &self.fills {
            let block = doc.block(id).ok_or_else(|| ReportError::NotFound { id: id.clone() })?;
            if entry.text.trim().is_empty() {
                return Err(ReportError::EmptyFill { id: id.clone() });
            }
            if let Some(recorded) = &entry.prompt_digest {
                if *recorded != block.prompt_digest {
                    log::warn!("fill for '{id}' was written against an older prompt");
                    report.stale.push(id.clone());
                }
            }
        }

        let mut tracker = PlaceholderTracker::new(doc);
        for (id, entry) in &self.fills {
            tracker.fill(id, &entry.text)?;
            report.applied.push(id.clone());
        }
        Ok(report)
    }
}
