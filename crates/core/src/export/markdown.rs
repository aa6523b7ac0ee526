use chrono::SecondsFormat;

use crate::config::ExportOptions;
use crate::model::{ChartBlock, Document, MetricRow, Placeholder, SectionBlock};

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|").replace(['\r', '\n'], " ")
}

fn escape_alt(text: &str) -> String {
    text.replace('[', "\\[").replace(']', "\\]")
}

fn link_target(path: &str) -> String {
    if path.contains(' ') {
        format!("<{path}>")
    } else {
        path.to_string()
    }
}

/// Backtick fence long enough that nothing inside `body` can close it.
fn fence_for(body: &str) -> String {
    let mut longest = 0;
    let mut run = 0;
    for c in body.chars() {
        if c == '`' {
            run += 1;
            longest = longest.max(run);
        } else {
            run = 0;
        }
    }
    "`".repeat((longest + 1).max(3))
}

fn push_table(out: &mut String, rows: &[MetricRow], opts: &ExportOptions) {
    if rows.is_empty() {
        return;
    }
    let with_target = rows.iter().any(|r| r.target.is_some());
    if with_target {
        out.push_str(&format!(
            "| {} | {} | {} |\n| --- | --- | --- |\n",
            escape_cell(&opts.indicator_header),
            escape_cell(&opts.value_header),
            escape_cell(&opts.target_header)
        ));
    } else {
        out.push_str(&format!(
            "| {} | {} |\n| --- | --- |\n",
            escape_cell(&opts.indicator_header),
            escape_cell(&opts.value_header)
        ));
    }
    for row in rows {
        if with_target {
            let target = row.target.as_deref().unwrap_or("-");
            out.push_str(&format!(
                "| {} | {} | {} |\n",
                escape_cell(&row.label),
                escape_cell(&row.value),
                escape_cell(target)
            ));
        } else {
            out.push_str(&format!(
                "| {} | {} |\n",
                escape_cell(&row.label),
                escape_cell(&row.value)
            ));
        }
    }
    out.push('\n');
}

fn push_block(out: &mut String, heading: &str, block: &ChartBlock, opts: &ExportOptions) {
    out.push_str(heading);
    out.push_str("\n\n");

    if let Some(files) = &block.files {
        out.push_str(&format!(
            "![{}]({})\n\n",
            escape_alt(&block.title),
            link_target(&files.primary)
        ));
        if !files.alternates.is_empty() {
            let listed: Vec<String> = files.alternates.iter().map(|p| format!("`{p}`")).collect();
            out.push_str(&format!("Alternate formats: {}\n\n", listed.join(", ")));
        }
    }

    let fence = fence_for(&block.prompt);
    out.push_str("**Analysis prompt:**\n\n");
    out.push_str(&format!("{fence}{}\n{}\n{fence}\n\n", opts.prompt_fence_label, block.prompt));

    out.push_str("**Analysis output:**\n\n");
    out.push_str(&format!("<!-- placeholder:{} -->\n", block.id));
    match &block.placeholder {
        Placeholder::Pending => out.push_str(&opts.placeholder_marker),
        Placeholder::Filled { text } => out.push_str(text),
    }
    out.push_str(&format!("\n<!-- /placeholder:{} -->\n\n", block.id));
}

fn push_section(out: &mut String, section: &SectionBlock, opts: &ExportOptions) {
    out.push_str(&format!("### {} {}\n\n", section.number, section.title));
    if let Some(intro) = &section.intro {
        out.push_str(intro);
        out.push_str("\n\n");
    }
    push_table(out, &section.table, opts);
    for chart in &section.charts {
        let heading = format!("#### {}: {}", chart.label, chart.title);
        push_block(out, &heading, chart, opts);
    }
}

/// Serialize a document to the canonical Markdown layout.
pub fn to_markdown(doc: &Document, opts: &ExportOptions) -> String {
    let mut out = String::new();
    out.push_str(&format!("# {}\n\n", doc.title));
    if let Some(at) = doc.generated_at() {
        let stamp = at.to_rfc3339_opts(SecondsFormat::Secs, true);
        out.push_str(&format!("_Generated: {stamp}_\n\n"));
    }

    for chapter in &doc.chapters {
        out.push_str(&format!("## {}. {}\n\n", chapter.number, chapter.title));
        if let Some(intro) = &chapter.intro {
            out.push_str(intro);
            out.push_str("\n\n");
        }
        for section in &chapter.sections {
            push_section(&mut out, section, opts);
        }
        if let Some(conclusion) = &chapter.conclusion {
            let number = format!("{}.{}", chapter.number, chapter.sections.len() + 1);
            let heading = format!("### {number} {}", conclusion.title);
            push_block(&mut out, &heading, conclusion, opts);
        }
    }

    // Exactly one trailing newline.
    let trimmed = out.trim_end().len();
    out.truncate(trimmed);
    out.push('\n');
    out
}
