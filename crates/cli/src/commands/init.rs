use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use report_core::config::{ReportConfig, ReportLayout};
use report_core::files::{to_structured_string, write_atomic, Syntax};
use report_core::skeleton::Skeleton;
use report_core::tracker::FillSet;

use crate::{canonicalize_or_current, infer_report_name};

const STARTER_SKELETON: &str = r#"title: Report
chapters:
  - id: ch1
    title: Overview
    intro: "Reporting period: {{period}}."
    sections:
      - id: ch1.summary
        title: Key statistics
        table:
          - total_subjects
          - { key: share_with_contract, label: Share with contract }
        charts:
          - id: chart_1_1
            title: Subjects by contract status
            files:
              primary: figs/chart_1_1.png
              alternates: [figs/chart_1_1.jpg]
            prompt: >-
              The chart shows {{total_subjects}} subjects, of which
              {{share_with_contract}} hold a contract. Describe the distribution
              and name the groups that stand out.
    conclusion:
      prompt: >-
        Summarise chapter 1 for the {{ch1.summary/total_subjects}} subjects
        covered, in two paragraphs.
"#;

const STARTER_METRICS: &str = r#"# Metric values keyed by chapter or section id.
sections:
  ch1:
    period: { value: "2025", unit: text }
  ch1.summary:
    total_subjects: 387
    share_with_contract: { value: 62.5, unit: percent, target: 80 }
"#;

/// Write `contents` unless the file exists and `force` is off.
fn write_starter(path: &Path, contents: &str, force: bool) -> Result<bool> {
    if path.exists() && !force {
        println!("  Keeping existing {}", path.display());
        return Ok(false);
    }
    write_atomic(path, contents.as_bytes())
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(true)
}

/// Scaffold a starter report project at `root`.
pub fn init_command(root: &str, force: bool) -> Result<()> {
    let root_path = canonicalize_or_current(root)?;
    let layout = ReportLayout::new(&root_path);

    for dir in [
        &layout.root,
        &layout.templates_dir,
        &layout.data_dir,
        &layout.fills_dir,
        &layout.out_dir,
        &layout.figs_dir,
    ] {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create dir: {}", dir.display()))?;
    }

    let mut skeleton = Skeleton::parse(STARTER_SKELETON, Syntax::Yaml)?;
    skeleton.title = format!("{} report", infer_report_name(&root_path));
    let skeleton_body = to_structured_string(&skeleton, &layout.skeleton_path)?;
    let config_body = to_structured_string(&ReportConfig::default(), &layout.config_path)?;
    let fills_body = to_structured_string(&FillSet::new(), &layout.fills_path)?;

    let starters = [
        (&layout.config_path, config_body.as_str()),
        (&layout.skeleton_path, skeleton_body.as_str()),
        (&layout.metrics_path, STARTER_METRICS),
        (&layout.fills_path, fills_body.as_str()),
    ];
    let mut written = 0;
    for (path, body) in starters {
        if write_starter(path, body, force)? {
            written += 1;
        }
    }

    println!("Initialized report project:");
    println!("  Root: {}", layout.root.display());
    println!("  Config: {}", layout.relative_string(&layout.config_path));
    println!("  Skeleton: {}", layout.relative_string(&layout.skeleton_path));
    println!("  Metrics: {}", layout.relative_string(&layout.metrics_path));
    println!("  Fills: {}", layout.relative_string(&layout.fills_path));
    println!("  Output: {}", layout.relative_string(&layout.output_path("md")));
    println!("  Files written: {written}");
    Ok(())
}
