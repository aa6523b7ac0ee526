use anyhow::Result;
use report_core::tracker;
use report_core::ReportError;
use serde::Serialize;

use crate::commands::{assemble, ReportInputs};

/// Placeholder state of a rendered report.
#[derive(Debug, Serialize)]
pub struct StatusReport {
    pub title: String,
    pub total: usize,
    pub filled: usize,
    pub pending: usize,
    pub complete: bool,
    pub filled_ids: Vec<String>,
    pub pending_ids: Vec<String>,
    /// Fills written against an older version of their prompt.
    pub stale_ids: Vec<String>,
}

pub fn status_report(inputs: &ReportInputs) -> Result<StatusReport> {
    let assembled = assemble(inputs)?;
    let doc = &assembled.document;
    let summary = tracker::summary(doc);
    Ok(StatusReport {
        title: doc.title.clone(),
        total: summary.total,
        filled: summary.filled,
        pending: summary.pending,
        complete: tracker::is_complete(doc),
        filled_ids: tracker::filled_ids(doc),
        pending_ids: tracker::pending_ids(doc),
        stale_ids: assembled.fills.stale,
    })
}

/// Report which placeholders are filled; with `check`, fail when any is pending.
pub fn status_command(inputs: &ReportInputs, json: bool, check: bool) -> Result<()> {
    let report = status_report(inputs)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Report: {}", report.title);
        println!(
            "  Placeholders: {} total, {} filled, {} pending",
            report.total, report.filled, report.pending
        );
        for id in &report.pending_ids {
            println!("  - pending: {id}");
        }
        for id in &report.stale_ids {
            println!("  - stale: {id}");
        }
        if report.complete {
            println!("  Complete: yes");
        }
    }

    if check && !report.complete {
        return Err(ReportError::IncompleteDocument { pending: report.pending_ids }.into());
    }
    Ok(())
}
