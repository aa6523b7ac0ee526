use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use report_core::tracker::{self, FillSet};

use crate::commands::{render_inputs, require_block, ReportInputs};

/// Where the analysis text for a fill comes from.
#[derive(Debug, Clone)]
pub enum FillSource {
    Text(String),
    File(String),
}

impl FillSource {
    fn read(&self) -> Result<String> {
        match self {
            FillSource::Text(text) => Ok(text.clone()),
            FillSource::File(path) => fs::read_to_string(path)
                .with_context(|| format!("Failed to read fill text from {path}")),
        }
    }
}

/// Record analysis text for placeholder `id` in the fills file.
///
/// The id is checked against the rendered document, and the fill is stored
/// with the digest of the prompt it answers.
pub fn fill_command(
    inputs: &ReportInputs,
    fills_path: &str,
    id: &str,
    source: &FillSource,
) -> Result<()> {
    let (_config, mut document) = render_inputs(inputs)?;
    let digest = require_block(&document, id)?.prompt_digest.clone();
    let text = source.read()?;

    let path = Path::new(fills_path);
    let mut set = FillSet::load_or_default(path)
        .with_context(|| format!("Failed to load fills {fills_path}"))?;
    set.upsert(id, &text, Some(digest))?;

    // Every recorded id must still name a placeholder before the file is saved.
    set.apply(&mut document).with_context(|| format!("Failed to apply fills {fills_path}"))?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create fills dir: {}", parent.display()))?;
    }
    set.save(path).with_context(|| format!("Failed to save fills {fills_path}"))?;

    let summary = tracker::summary(&document);
    println!("Recorded fill for '{id}' in {fills_path}");
    println!("  Placeholders: {} filled, {} pending", summary.filled, summary.pending);
    Ok(())
}
