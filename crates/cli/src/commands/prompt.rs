use anyhow::Result;

use crate::commands::{render_inputs, require_block, ReportInputs};

/// The fully rendered prompt of placeholder `id`.
pub fn render_prompt(inputs: &ReportInputs, id: &str) -> Result<String> {
    let (_config, document) = render_inputs(inputs)?;
    Ok(require_block(&document, id)?.prompt.clone())
}

/// Print one prompt, ready to paste into the analysis tool.
pub fn prompt_command(inputs: &ReportInputs, id: &str) -> Result<()> {
    println!("{}", render_prompt(inputs, id)?);
    Ok(())
}
