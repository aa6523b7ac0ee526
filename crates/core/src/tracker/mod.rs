//! Placeholder tracking: which output placeholders are filled, which are
//! still pending, and the operation that fills them.

mod fills;

use serde::Serialize;

use crate::error::{ReportError, ReportResult};
use crate::model::{Document, Placeholder};

pub use fills::{ApplyReport, FillEntry, FillSet};

/// Placeholder counts for a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PlaceholderSummary {
    pub total: usize,
    pub filled: usize,
    pub pending: usize,
}

/// Ids of pending placeholders, in document order.
pub fn pending_ids(doc: &Document) -> Vec<String> {
    doc.blocks().filter(|b| !b.placeholder.is_filled()).map(|b| b.id.clone()).collect()
}

/// Ids of filled placeholders, in document order.
pub fn filled_ids(doc: &Document) -> Vec<String> {
    doc.blocks().filter(|b| b.placeholder.is_filled()).map(|b| b.id.clone()).collect()
}

/// True only if every placeholder in the document is filled.
pub fn is_complete(doc: &Document) -> bool {
    doc.blocks().all(|b| b.placeholder.is_filled())
}

pub fn summary(doc: &Document) -> PlaceholderSummary {
    let total = doc.blocks().count();
    let filled = doc.blocks().filter(|b| b.placeholder.is_filled()).count();
    PlaceholderSummary { total, filled, pending: total - filled }
}

/// Mutable view over a document's placeholders.
///
/// The tracker is the only path through which placeholder state changes.
pub struct PlaceholderTracker<'d> {
    doc: &'d mut Document,
}

impl<'d> PlaceholderTracker<'d> {
    pub fn new(doc: &'d mut Document) -> Self {
        Self { doc }
    }

    pub fn pending(&self) -> Vec<String> {
        pending_ids(self.doc)
    }

    pub fn filled(&self) -> Vec<String> {
        filled_ids(self.doc)
    }

    pub fn is_complete(&self) -> bool {
        is_complete(self.doc)
    }

    pub fn summary(&self) -> PlaceholderSummary {
        summary(self.doc)
    }

    /// Mark placeholder `id` filled with `text` (trimmed).
    ///
    /// Fails with `NotFound` if no such placeholder exists and with
    /// `EmptyFill` if the text is blank; in both cases the document is
    /// unchanged. Filling an already filled placeholder replaces its text.
    pub fn fill(&mut self, id: &str, text: &str) -> ReportResult<()> {
        let block = self
            .doc
            .blocks_mut()
            .find(|b| b.id == id)
            .ok_or_else(|| ReportError::NotFound { id: id.to_string() })?;
        let text = text.trim();
        if text.is_empty() {
            return Err(ReportError::EmptyFill { id: id.to_string() });
        }
        block.placeholder = Placeholder::Filled { text: text.to_string() };
        log::debug!("filled placeholder {id}");
        Ok(())
    }
}
