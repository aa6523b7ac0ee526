use report_core::config::{Digits, FormatOptions, ReportConfig};
use report_core::files::Syntax;
use report_core::loader::parse_metrics_str;
use report_core::model::{MetricRecord, MetricSet, MetricValue, Placeholder, Unit};
use report_core::render::format::format_number;
use report_core::render::{prompt_digest, render_document, Renderer};
use report_core::skeleton::Skeleton;
use report_core::ReportError;

const SKELETON: &str = r#"
title: Performance Report
chapters:
  - id: ch1
    title: Introduction
    intro: "Reporting year {{reporting_year}}."
    sections:
      - id: ch1.overview
        title: Key statistics
        intro: "Overview of {{ total_subjects }} subjects."
        table:
          - total_subjects
          - { key: contracts_without, label: "Subjects without contracts" }
          - payment_rate
        charts:
          - id: chart_1_1
            title: Subject coverage
            files:
              primary: figs/s1/chart_1_1.png
              alternates: [figs/s1/chart_1_1.jpg]
            prompt: "There are {{total_subjects}} subjects; {{contracts_without}} have no contract."
          - id: chart_1_2
            title: Payments
            files: { primary: figs/s1/chart_1_2.png }
            prompt: "Payment rate is {{payment_rate}}. Year {{reporting_year}}."
    conclusion:
      prompt: "Summarise the {{ch1.overview/total_subjects}} subjects."
  - id: ch2
    title: Results
    sections:
      - id: ch2.budget
        title: Budget
        charts:
          - id: chart_2_1
            title: Budget split
            files: { primary: figs/s2/chart_2_1.png }
            prompt: "Budget was {{budget}}."
"#;

const METRICS: &str = r#"
sections:
  ch1:
    reporting_year: { value: 1404, unit: text }
  ch1.overview:
    total_subjects: 387
    contracts_without: 0
    payment_rate: { value: 42.5, unit: percent, target: 60, label: Payment rate }
  ch2.budget:
    budget: { value: 1250000, unit: billion Rials }
"#;

fn fixture() -> (Skeleton, MetricSet) {
    let skeleton = Skeleton::parse(SKELETON, Syntax::Yaml).unwrap();
    let metrics = parse_metrics_str(METRICS, Syntax::Yaml, &skeleton.requirements()).unwrap();
    (skeleton, metrics)
}

fn prompt_of(doc: &report_core::model::Document, id: &str) -> String {
    doc.block(id).unwrap().prompt.clone()
}

#[test]
fn substitutes_metric_values_into_prompts() {
    let (skeleton, metrics) = fixture();
    let doc = Renderer::default().render(&skeleton, &metrics).unwrap();

    assert_eq!(prompt_of(&doc, "chart_1_1"), "There are 387 subjects; 0 have no contract.");
    assert_eq!(prompt_of(&doc, "chart_1_2"), "Payment rate is 42.5%. Year 1404.");
    assert_eq!(prompt_of(&doc, "ch1.conclusion"), "Summarise the 387 subjects.");
    assert_eq!(prompt_of(&doc, "chart_2_1"), "Budget was 1,250,000 billion Rials.");
    for block in doc.blocks() {
        assert!(!block.prompt.contains("{{"), "marker survived in {}", block.id);
        assert_eq!(block.placeholder, Placeholder::Pending);
        assert_eq!(block.prompt_digest, prompt_digest(&block.prompt));
    }
}

#[test]
fn numbers_chapters_sections_and_charts() {
    let (skeleton, metrics) = fixture();
    let doc = Renderer::default().render(&skeleton, &metrics).unwrap();

    assert_eq!(doc.title, "Performance Report");
    assert_eq!(doc.chapters[0].number, 1);
    assert_eq!(doc.chapters[0].intro.as_deref(), Some("Reporting year 1404."));
    assert_eq!(doc.chapters[0].sections[0].number, "1.1");
    assert_eq!(doc.chapters[0].sections[0].intro.as_deref(), Some("Overview of 387 subjects."));
    assert_eq!(doc.chapters[1].sections[0].number, "2.1");

    let labels: Vec<_> = doc.blocks().map(|b| (b.id.as_str(), b.label.as_str())).collect();
    assert_eq!(
        labels,
        vec![
            ("chart_1_1", "Chart 1-1"),
            ("chart_1_2", "Chart 1-2"),
            ("ch1.conclusion", "Chapter 1 synthesis"),
            ("chart_2_1", "Chart 2-1"),
        ]
    );

    let chart = doc.block("chart_1_1").unwrap();
    let files = chart.files.as_ref().unwrap();
    assert_eq!(files.primary, "figs/s1/chart_1_1.png");
    assert_eq!(files.alternates, vec!["figs/s1/chart_1_1.jpg".to_string()]);
    assert!(doc.block("ch1.conclusion").unwrap().files.is_none());
}

#[test]
fn builds_statistics_tables() {
    let (skeleton, metrics) = fixture();
    let doc = Renderer::default().render(&skeleton, &metrics).unwrap();
    let table = &doc.chapters[0].sections[0].table;

    let rows: Vec<_> = table
        .iter()
        .map(|r| (r.label.as_str(), r.value.as_str(), r.target.as_deref()))
        .collect();
    assert_eq!(
        rows,
        vec![
            ("total_subjects", "387", None),
            ("Subjects without contracts", "0", None),
            ("Payment rate", "42.5%", Some("60.0%")),
        ]
    );
    assert!(doc.chapters[1].sections[0].table.is_empty());
}

#[test]
fn rendering_is_deterministic() {
    let (skeleton, metrics) = fixture();
    let renderer = Renderer::default();
    let first = renderer.render(&skeleton, &metrics).unwrap();
    let second = renderer.render(&skeleton, &metrics).unwrap();
    assert_eq!(first, second);
    assert!(first.generated_at().is_none());
}

#[test]
fn unresolved_marker_is_a_template_error() {
    let (_, metrics) = fixture();
    let body = SKELETON.replace("Budget was {{budget}}.", "Budget was {{missing_key}}.");
    let skeleton = Skeleton::parse(&body, Syntax::Yaml).unwrap();

    let err = Renderer::default().render(&skeleton, &metrics).unwrap_err();
    match err {
        ReportError::Template { location, marker, message } => {
            assert!(location.contains("chart_2_1"));
            assert_eq!(marker.as_deref(), Some("missing_key"));
            assert!(message.contains("missing_key"));
        }
        other => panic!("unexpected error {other}"),
    }
}

#[test]
fn chapter_intro_does_not_see_section_metrics_without_scope() {
    let (_, metrics) = fixture();
    let body = SKELETON.replace("Reporting year {{reporting_year}}.", "{{total_subjects}}");
    let skeleton = Skeleton::parse(&body, Syntax::Yaml).unwrap();
    let err = Renderer::default().render(&skeleton, &metrics).unwrap_err();
    assert!(err.to_string().contains("no metric 'total_subjects' in chapter 'ch1'"));

    let body = SKELETON
        .replace("Reporting year {{reporting_year}}.", "{{ch1.overview/total_subjects}}");
    let skeleton = Skeleton::parse(&body, Syntax::Yaml).unwrap();
    let doc = Renderer::default().render(&skeleton, &metrics).unwrap();
    assert_eq!(doc.chapters[0].intro.as_deref(), Some("387"));
}

#[test]
fn scoped_marker_outside_section_is_rejected() {
    let (_, metrics) = fixture();
    let body = SKELETON.replace("Budget was {{budget}}.", "{{ch1.overview/total_subjects}}");
    let skeleton = Skeleton::parse(&body, Syntax::Yaml).unwrap();
    let err = Renderer::default().render(&skeleton, &metrics).unwrap_err();
    assert!(err.to_string().contains("outside section 'ch2.budget'"));
}

#[test]
fn table_row_without_metric_is_a_template_error() {
    let skeleton = Skeleton::parse(SKELETON, Syntax::Yaml).unwrap();
    // Loaded without requirements, so the gap only shows at render time.
    let body = METRICS.replace("    contracts_without: 0\n", "");
    let metrics = parse_metrics_str(&body, Syntax::Yaml, &[]).unwrap();
    let err = Renderer::default().render(&skeleton, &metrics).unwrap_err();
    match err {
        ReportError::Template { marker, .. } => {
            assert_eq!(marker.as_deref(), Some("contracts_without"));
        }
        other => panic!("unexpected error {other}"),
    }
}

#[test]
fn persian_digits_apply_to_prompts_and_tables() {
    let (skeleton, metrics) = fixture();
    let mut config = ReportConfig::default();
    config.format.digits = Digits::Persian;
    config.title = Some("گزارش عملکرد".into());

    let doc = render_document(&skeleton, &metrics, &config).unwrap();
    assert_eq!(doc.title, "گزارش عملکرد");
    assert_eq!(prompt_of(&doc, "chart_1_1"), "There are ۳۸۷ subjects; ۰ have no contract.");
    assert_eq!(prompt_of(&doc, "chart_2_1"), "Budget was ۱،۲۵۰،۰۰۰ billion Rials.");
    // Text metrics are left as written.
    assert_eq!(prompt_of(&doc, "chart_1_2"), "Payment rate is ۴۲.۵٪. Year 1404.");
    assert_eq!(doc.chapters[0].sections[0].table[2].target.as_deref(), Some("۶۰.۰٪"));
}

#[test]
fn config_title_with_marker_is_a_template_error() {
    let (skeleton, metrics) = fixture();
    let mut config = ReportConfig::default();
    config.title = Some("Report on {{total_subjects}}".into());
    let err = render_document(&skeleton, &metrics, &config).unwrap_err();
    match err {
        ReportError::Template { location, message, .. } => {
            assert_eq!(location, "config title");
            assert!(message.contains("substitution marker"), "message: {message}");
        }
        other => panic!("unexpected error {other}"),
    }
}

#[test]
fn format_number_follows_unit_and_precision() {
    let opts = FormatOptions::default();
    assert_eq!(format_number(1_234_567.0, &Unit::Count, &opts), "1,234,567");
    assert_eq!(format_number(12.346, &Unit::Percent, &opts), "12.3%");
    assert_eq!(format_number(0.41234, &Unit::Ratio, &opts), "0.412");
    assert_eq!(format_number(2.0, &Unit::Amount("MW".into()), &opts), "2 MW");

    let precise = FormatOptions { percent_decimals: 2, ..FormatOptions::default() };
    assert_eq!(format_number(12.346, &Unit::Percent, &precise), "12.35%");
}

#[test]
fn text_values_render_verbatim() {
    let mut metrics = MetricSet::new();
    metrics.insert(MetricRecord {
        section_id: "s1".into(),
        key: "province".into(),
        label: "Province".into(),
        value: MetricValue::Text("Tehran 1,2".into()),
        unit: Unit::Text,
        target: None,
    });
    let skeleton = Skeleton::parse(
        r#"
title: T
chapters:
  - id: c1
    title: One
    sections:
      - id: s1
        title: S
        charts:
          - id: k
            title: K
            files: { primary: k.png }
            prompt: "In {{province}}."
"#,
        Syntax::Yaml,
    )
    .unwrap();
    let config = ReportConfig {
        format: FormatOptions { digits: Digits::Persian, ..FormatOptions::default() },
        ..ReportConfig::default()
    };
    let doc = render_document(&skeleton, &metrics, &config).unwrap();
    assert_eq!(prompt_of(&doc, "k"), "In Tehran 1,2.");
}
