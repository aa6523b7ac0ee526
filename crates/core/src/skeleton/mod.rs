//! Skeleton definitions: the fixed chapter → section → chart structure of a
//! report, with prompt texts that carry substitution markers.
//!
//! Skeletons are plain data (YAML or JSON). `Skeleton::validate` performs the
//! structural checks that do not need metric data: identifier uniqueness,
//! marker syntax, and chart file paths.

pub mod markers;

use std::collections::HashSet;
use std::path::{Component, Path};

use serde::{Deserialize, Serialize};

use crate::error::{ReportError, ReportResult};
use crate::files::{parse_structured, read_structured, Syntax};

pub use markers::{parse_template, Marker, MarkerSyntaxError, Segment};

pub(crate) use markers::is_name_char;

/// Top-level skeleton: a titled sequence of chapter templates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Skeleton {
    pub title: String,
    pub chapters: Vec<ChapterTemplate>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChapterTemplate {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intro: Option<String>,
    #[serde(default)]
    pub sections: Vec<SectionTemplate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conclusion: Option<ConclusionTemplate>,
}

impl ChapterTemplate {
    /// Placeholder id of the conclusion, defaulting to `<chapter>.conclusion`.
    pub fn conclusion_id(&self) -> Option<String> {
        self.conclusion
            .as_ref()
            .map(|c| c.id.clone().unwrap_or_else(|| format!("{}.conclusion", self.id)))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionTemplate {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intro: Option<String>,
    /// Statistics-table rows; each key is a required metric of this section.
    #[serde(default)]
    pub table: Vec<TableRowTemplate>,
    #[serde(default)]
    pub charts: Vec<ChartTemplate>,
}

/// A table row: either a bare key, or a key with an explicit label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TableRowTemplate {
    Key(String),
    Labeled { key: String, label: String },
}

impl TableRowTemplate {
    pub fn key(&self) -> &str {
        match self {
            TableRowTemplate::Key(key) => key,
            TableRowTemplate::Labeled { key, .. } => key,
        }
    }

    pub fn label(&self) -> Option<&str> {
        match self {
            TableRowTemplate::Key(_) => None,
            TableRowTemplate::Labeled { label, .. } => Some(label),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilesTemplate {
    pub primary: String,
    #[serde(default)]
    pub alternates: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartTemplate {
    pub id: String,
    pub title: String,
    pub files: FilesTemplate,
    pub prompt: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConclusionTemplate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default = "default_conclusion_title")]
    pub title: String,
    pub prompt: String,
}

fn default_conclusion_title() -> String {
    "Chapter synthesis".to_string()
}

/// A metric the statistics tables expect: `(section_id, key)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct MetricRequirement {
    pub section_id: String,
    pub key: String,
}

/// Check that `path` is a syntactically valid relative path.
///
/// Rejects empty paths, absolute or drive-prefixed paths, `..` components,
/// backslashes, and control characters.
pub fn validate_relative_path(path: &str) -> Result<(), &'static str> {
    if path.trim().is_empty() {
        return Err("path is empty");
    }
    if path.chars().any(char::is_control) {
        return Err("path contains control characters");
    }
    if path.contains('\\') {
        return Err("path contains backslashes; use '/' separators");
    }
    if path.len() >= 2 && path.as_bytes()[1] == b':' && path.as_bytes()[0].is_ascii_alphabetic() {
        return Err("path has a drive prefix");
    }
    for component in Path::new(path).components() {
        match component {
            Component::RootDir | Component::Prefix(_) => return Err("path is absolute"),
            Component::ParentDir => return Err("path escapes its base with '..'"),
            Component::CurDir | Component::Normal(_) => {}
        }
    }
    Ok(())
}

impl Skeleton {
    /// Parse and validate a skeleton from a YAML or JSON string.
    pub fn parse(body: &str, syntax: Syntax) -> ReportResult<Self> {
        let skeleton: Skeleton = parse_structured(body, syntax, Path::new("<skeleton>"))?;
        skeleton.validate()?;
        Ok(skeleton)
    }

    /// Every `(section, key)` pair the statistics tables reference.
    pub fn requirements(&self) -> Vec<MetricRequirement> {
        let mut out = Vec::new();
        for chapter in &self.chapters {
            for section in &chapter.sections {
                for row in &section.table {
                    out.push(MetricRequirement {
                        section_id: section.id.clone(),
                        key: row.key().to_string(),
                    });
                }
            }
        }
        out
    }

    /// Structural checks that do not need metric data.
    pub fn validate(&self) -> ReportResult<()> {
        let mut ids: HashSet<&str> = HashSet::new();
        let mut placeholder_ids: HashSet<String> = HashSet::new();

        if self.chapters.is_empty() {
            return Err(ReportError::template("skeleton", "skeleton defines no chapters"));
        }
        check_title(&self.title, "skeleton title")?;

        for chapter in &self.chapters {
            let chapter_loc = format!("chapter '{}'", chapter.id);
            check_id(&chapter.id, &chapter_loc)?;
            if !ids.insert(&chapter.id) {
                return Err(ReportError::template(chapter_loc, "duplicate chapter/section id"));
            }
            check_title(&chapter.title, &chapter_loc)?;
            if let Some(intro) = &chapter.intro {
                check_markers(intro, &format!("{chapter_loc} intro"))?;
            }

            for section in &chapter.sections {
                let section_loc = format!("{chapter_loc} / section '{}'", section.id);
                check_id(&section.id, &section_loc)?;
                if !ids.insert(&section.id) {
                    return Err(ReportError::template(section_loc, "duplicate chapter/section id"));
                }
                check_title(&section.title, &section_loc)?;
                if let Some(intro) = &section.intro {
                    check_markers(intro, &format!("{section_loc} intro"))?;
                }
                let mut row_keys = HashSet::new();
                for row in &section.table {
                    if !row_keys.insert(row.key()) {
                        return Err(ReportError::template(
                            &section_loc,
                            format!("table lists metric '{}' twice", row.key()),
                        ));
                    }
                }

                for chart in &section.charts {
                    let chart_loc = format!("{section_loc} / chart '{}'", chart.id);
                    check_id(&chart.id, &chart_loc)?;
                    if !placeholder_ids.insert(chart.id.clone()) {
                        return Err(ReportError::template(chart_loc, "duplicate placeholder id"));
                    }
                    check_title(&chart.title, &chart_loc)?;
                    for path in std::iter::once(&chart.files.primary).chain(&chart.files.alternates)
                    {
                        validate_relative_path(path).map_err(|reason| {
                            ReportError::template(
                                &chart_loc,
                                format!("invalid file path '{path}': {reason}"),
                            )
                        })?;
                    }
                    check_markers(&chart.prompt, &chart_loc)?;
                }
            }

            if let (Some(conclusion), Some(id)) = (&chapter.conclusion, chapter.conclusion_id()) {
                let loc = format!("{chapter_loc} / conclusion '{id}'");
                check_id(&id, &loc)?;
                if !placeholder_ids.insert(id) {
                    return Err(ReportError::template(loc, "duplicate placeholder id"));
                }
                check_title(&conclusion.title, &loc)?;
                check_markers(&conclusion.prompt, &loc)?;
            }
        }

        Ok(())
    }

    /// Ids of every chapter and section: the scopes metrics can attach to.
    pub fn scope_ids(&self) -> impl Iterator<Item = &str> {
        self.chapters.iter().flat_map(|c| {
            std::iter::once(c.id.as_str()).chain(c.sections.iter().map(|s| s.id.as_str()))
        })
    }
}

/// Ids double as marker scopes and appear inside HTML comments in the
/// exported Markdown, so they share the marker-name charset.
fn check_id(id: &str, location: &str) -> ReportResult<()> {
    if id.trim().is_empty() {
        return Err(ReportError::template(location, "identifier is empty"));
    }
    if !id.chars().all(is_name_char) {
        return Err(ReportError::template(
            location,
            format!("identifier '{id}' may only contain letters, digits, '_', '.' and '-'"),
        ));
    }
    Ok(())
}

/// Titles are printed verbatim; markers belong in intros and prompts.
pub(crate) fn check_title(title: &str, location: &str) -> ReportResult<()> {
    if title.contains("{{") {
        return Err(ReportError::template(
            location,
            format!("title '{title}' contains a substitution marker"),
        ));
    }
    Ok(())
}

fn check_markers(text: &str, location: &str) -> ReportResult<()> {
    parse_template(text).map(|_| ()).map_err(|e| marker_error(location, e))
}

pub(crate) fn marker_error(location: &str, err: MarkerSyntaxError) -> ReportError {
    ReportError::Template {
        location: location.to_string(),
        marker: Some(err.text.clone()),
        message: format!("{} at byte {}: {}", err.reason, err.offset, err.text),
    }
}

/// Load and validate a skeleton file (YAML or JSON by extension).
pub fn load_skeleton(path: &Path) -> ReportResult<Skeleton> {
    let skeleton: Skeleton = read_structured(path)?;
    skeleton.validate()?;
    log::info!(
        "loaded skeleton '{}' with {} chapter(s) from {}",
        skeleton.title,
        skeleton.chapters.len(),
        path.display()
    );
    Ok(skeleton)
}
