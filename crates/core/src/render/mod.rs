//! Template renderer: merges validated metrics into a skeleton, producing a
//! `Document` whose prompts are fully substituted.
//!
//! Rendering is a pure function of its inputs. A marker that cannot be
//! resolved is a hard error; nothing is ever left blank.

pub mod format;

use sha2::{Digest, Sha256};

use crate::config::{FormatOptions, ReportConfig};
use crate::error::{ReportError, ReportResult};
use crate::model::{
    Chapter, ChartBlock, ChartFiles, Document, MetricRecord, MetricRow, MetricSet, Placeholder,
    SectionBlock,
};
use crate::skeleton::markers::{parse_template, Marker, Segment};
use crate::skeleton::{check_title, marker_error, ChapterTemplate, SectionTemplate, Skeleton};

/// SHA-256 hex digest of a rendered prompt.
pub fn prompt_digest(prompt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(prompt.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Where a piece of template text lives, which decides how markers resolve.
#[derive(Debug, Clone, Copy)]
enum Scope<'a> {
    /// Section intro or chart prompt: section metrics, then chapter metrics.
    Section { chapter: &'a ChapterTemplate, section: &'a SectionTemplate },
    /// Chapter intro or conclusion: chapter metrics, or any of its sections when qualified.
    Chapter { chapter: &'a ChapterTemplate },
}

impl Scope<'_> {
    fn resolve<'m>(
        &self,
        marker: &Marker,
        metrics: &'m MetricSet,
    ) -> Result<&'m MetricRecord, String> {
        match (self, marker.scope.as_deref()) {
            (Scope::Section { chapter, section }, None) => metrics
                .get(&section.id, &marker.key)
                .or_else(|| metrics.get(&chapter.id, &marker.key))
                .ok_or_else(|| {
                    format!(
                        "no metric '{}' in section '{}' or chapter '{}'",
                        marker.key, section.id, chapter.id
                    )
                }),
            (Scope::Section { chapter, section }, Some(scope)) => {
                if scope != section.id && scope != chapter.id {
                    return Err(format!(
                        "marker scope '{scope}' is outside section '{}' and chapter '{}'",
                        section.id, chapter.id
                    ));
                }
                metrics
                    .get(scope, &marker.key)
                    .ok_or_else(|| format!("no metric '{}' in '{scope}'", marker.key))
            }
            (Scope::Chapter { chapter }, None) => {
                metrics.get(&chapter.id, &marker.key).ok_or_else(|| {
                    format!("no metric '{}' in chapter '{}'", marker.key, chapter.id)
                })
            }
            (Scope::Chapter { chapter }, Some(scope)) => {
                let in_chapter =
                    scope == chapter.id || chapter.sections.iter().any(|s| s.id == scope);
                if !in_chapter {
                    return Err(format!(
                        "marker scope '{scope}' is outside chapter '{}'",
                        chapter.id
                    ));
                }
                metrics
                    .get(scope, &marker.key)
                    .ok_or_else(|| format!("no metric '{}' in '{scope}'", marker.key))
            }
        }
    }
}

/// Merges metric records into a skeleton.
#[derive(Debug, Clone, Default)]
pub struct Renderer {
    pub format: FormatOptions,
    /// Replaces the skeleton title when set.
    pub title: Option<String>,
}

impl Renderer {
    pub fn from_config(config: &ReportConfig) -> Self {
        Self { format: config.format.clone(), title: config.title.clone() }
    }

    /// Render the skeleton with `metrics`, substituting every marker.
    pub fn render(&self, skeleton: &Skeleton, metrics: &MetricSet) -> ReportResult<Document> {
        skeleton.validate()?;

        let mut chapters = Vec::with_capacity(skeleton.chapters.len());
        for (idx, chapter) in skeleton.chapters.iter().enumerate() {
            chapters.push(self.render_chapter(idx + 1, chapter, metrics)?);
        }

        let title = match &self.title {
            Some(title) => {
                check_title(title, "config title")?;
                title.clone()
            }
            None => skeleton.title.clone(),
        };
        let doc = Document::new(title, chapters);
        log::info!(
            "rendered '{}': {} chapter(s), {} placeholder(s)",
            doc.title,
            doc.chapters.len(),
            doc.blocks().count()
        );
        Ok(doc)
    }

    fn render_chapter(
        &self,
        number: usize,
        chapter: &ChapterTemplate,
        metrics: &MetricSet,
    ) -> ReportResult<Chapter> {
        let chapter_loc = format!("chapter '{}'", chapter.id);
        let chapter_scope = Scope::Chapter { chapter };

        let intro = match &chapter.intro {
            Some(text) => {
                let loc = format!("{chapter_loc} intro");
                Some(self.substitute(text, chapter_scope, metrics, &loc)?)
            }
            None => None,
        };

        let mut chart_counter = 0;
        let mut sections = Vec::with_capacity(chapter.sections.len());
        for (s_idx, section) in chapter.sections.iter().enumerate() {
            let scope = Scope::Section { chapter, section };
            let section_loc = format!("{chapter_loc} / section '{}'", section.id);

            let intro = match &section.intro {
                Some(text) => {
                    Some(self.substitute(text, scope, metrics, &format!("{section_loc} intro"))?)
                }
                None => None,
            };

            let mut table = Vec::with_capacity(section.table.len());
            for row in &section.table {
                let record = metrics.get(&section.id, row.key()).ok_or_else(|| {
                    ReportError::Template {
                        location: section_loc.clone(),
                        marker: Some(row.key().to_string()),
                        message: format!("statistics table lists missing metric '{}'", row.key()),
                    }
                })?;
                table.push(MetricRow {
                    key: record.key.clone(),
                    label: row.label().unwrap_or(&record.label).to_string(),
                    value: format::format_value(record, &self.format),
                    target: format::format_target(record, &self.format),
                });
            }

            let mut charts = Vec::with_capacity(section.charts.len());
            for chart in &section.charts {
                chart_counter += 1;
                let chart_loc = format!("{section_loc} / chart '{}'", chart.id);
                let prompt = self.substitute(&chart.prompt, scope, metrics, &chart_loc)?;
                log::debug!("rendered prompt for {}", chart.id);
                charts.push(ChartBlock {
                    id: chart.id.clone(),
                    label: format!("Chart {number}-{chart_counter}"),
                    title: chart.title.clone(),
                    files: Some(ChartFiles {
                        primary: chart.files.primary.clone(),
                        alternates: chart.files.alternates.clone(),
                    }),
                    prompt_digest: prompt_digest(&prompt),
                    prompt,
                    placeholder: Placeholder::Pending,
                });
            }

            sections.push(SectionBlock {
                id: section.id.clone(),
                number: format!("{number}.{}", s_idx + 1),
                title: section.title.clone(),
                intro,
                table,
                charts,
            });
        }

        let conclusion = match (&chapter.conclusion, chapter.conclusion_id()) {
            (Some(template), Some(id)) => {
                let loc = format!("{chapter_loc} / conclusion '{id}'");
                let prompt = self.substitute(&template.prompt, chapter_scope, metrics, &loc)?;
                Some(ChartBlock {
                    id,
                    label: format!("Chapter {number} synthesis"),
                    title: template.title.clone(),
                    files: None,
                    prompt_digest: prompt_digest(&prompt),
                    prompt,
                    placeholder: Placeholder::Pending,
                })
            }
            _ => None,
        };

        Ok(Chapter {
            id: chapter.id.clone(),
            number,
            title: chapter.title.clone(),
            intro,
            sections,
            conclusion,
        })
    }

    /// Replace every marker in `text` with its formatted metric value.
    fn substitute(
        &self,
        text: &str,
        scope: Scope<'_>,
        metrics: &MetricSet,
        location: &str,
    ) -> ReportResult<String> {
        let segments = parse_template(text).map_err(|e| marker_error(location, e))?;
        let mut out = String::with_capacity(text.len());
        for segment in segments {
            match segment {
                Segment::Literal(literal) => out.push_str(&literal),
                Segment::Marker(marker) => {
                    let record = scope.resolve(&marker, metrics).map_err(|message| {
                        ReportError::Template {
                            location: location.to_string(),
                            marker: Some(marker.name()),
                            message,
                        }
                    })?;
                    out.push_str(&format::format_value(record, &self.format));
                }
            }
        }
        Ok(out.trim_end().to_string())
    }
}

/// Render a document with the settings from `config`.
pub fn render_document(
    skeleton: &Skeleton,
    metrics: &MetricSet,
    config: &ReportConfig,
) -> ReportResult<Document> {
    Renderer::from_config(config).render(skeleton, metrics)
}
