use report_core::files::Syntax;
use report_core::loader::{load_metrics_file, parse_metrics_str, unknown_sections};
use report_core::model::{MetricValue, Unit};
use report_core::skeleton::{MetricRequirement, Skeleton};
use report_core::ReportError;
use tempfile::tempdir;

const METRICS: &str = r#"
sections:
  ch1:
    reporting_year: { value: 1404, unit: text }
  ch1.overview:
    total_subjects: 387
    gini: 0.4123
    province: Tehran
    payment_rate: { value: "42.5%", unit: percent, target: 60, label: Payment rate }
    budget: { value: "1,250,000", unit: billion Rials }
"#;

const SKELETON: &str = r#"
title: T
chapters:
  - id: ch1
    title: One
    sections:
      - id: ch1.overview
        title: Overview
"#;

fn req(section: &str, key: &str) -> MetricRequirement {
    MetricRequirement { section_id: section.into(), key: key.into() }
}

#[test]
fn shorthand_values_get_default_units() {
    let set = parse_metrics_str(METRICS, Syntax::Yaml, &[]).unwrap();
    assert_eq!(set.len(), 6);

    let total = set.get("ch1.overview", "total_subjects").unwrap();
    assert_eq!(total.value, MetricValue::Number(387.0));
    assert_eq!(total.unit, Unit::Count);
    assert_eq!(total.label, "total_subjects");

    assert_eq!(set.get("ch1.overview", "gini").unwrap().unit, Unit::Ratio);
    let province = set.get("ch1.overview", "province").unwrap();
    assert_eq!(province.value, MetricValue::Text("Tehran".into()));
    assert_eq!(province.unit, Unit::Text);
}

#[test]
fn detailed_values_are_parsed_by_unit() {
    let set = parse_metrics_str(METRICS, Syntax::Yaml, &[]).unwrap();

    let rate = set.get("ch1.overview", "payment_rate").unwrap();
    assert_eq!(rate.value, MetricValue::Number(42.5));
    assert_eq!(rate.unit, Unit::Percent);
    assert_eq!(rate.target, Some(60.0));
    assert_eq!(rate.label, "Payment rate");

    let budget = set.get("ch1.overview", "budget").unwrap();
    assert_eq!(budget.value, MetricValue::Number(1_250_000.0));
    assert_eq!(budget.unit, Unit::Amount("billion Rials".into()));

    let year = set.get("ch1", "reporting_year").unwrap();
    assert_eq!(year.value, MetricValue::Text("1404".into()));
}

#[test]
fn json_metrics_are_accepted() {
    let body = r#"{"sections": {"s1": {"total": 12, "rate": {"value": 3.5, "unit": "%"}}}}"#;
    let set = parse_metrics_str(body, Syntax::Json, &[req("s1", "total")]).unwrap();
    assert_eq!(set.get("s1", "rate").unwrap().unit, Unit::Percent);
}

#[test]
fn missing_required_metric_is_a_validation_error() {
    let err = parse_metrics_str(METRICS, Syntax::Yaml, &[req("ch1.overview", "contracts")])
        .unwrap_err();
    match err {
        ReportError::Validation { section, key, message } => {
            assert_eq!(section, "ch1.overview");
            assert_eq!(key.as_deref(), Some("contracts"));
            assert!(message.contains("required metric 'contracts' is missing"));
        }
        other => panic!("unexpected error {other}"),
    }
}

#[test]
fn non_numeric_value_for_numeric_unit_is_rejected() {
    let body = "sections:\n  s1:\n    rate: { value: high, unit: percent }\n";
    let err = parse_metrics_str(body, Syntax::Yaml, &[]).unwrap_err();
    assert!(matches!(err, ReportError::Validation { .. }));
    assert!(err.to_string().contains("is not a number"));
}

#[test]
fn target_on_text_metric_is_rejected() {
    let body = "sections:\n  s1:\n    name: { value: Tehran, target: 3 }\n";
    let err = parse_metrics_str(body, Syntax::Yaml, &[]).unwrap_err();
    assert!(err.to_string().contains("cannot have a target"));
}

#[test]
fn invalid_metric_key_is_rejected() {
    let body = "sections:\n  s1:\n    \"bad key\": 3\n";
    let err = parse_metrics_str(body, Syntax::Yaml, &[]).unwrap_err();
    assert!(err.to_string().contains("may only contain"));
}

#[test]
fn malformed_input_is_a_parse_error() {
    let err = parse_metrics_str("sections: [1, 2", Syntax::Yaml, &[]).unwrap_err();
    assert!(matches!(err, ReportError::Parse { .. }));
}

#[test]
fn load_metrics_file_reads_from_disk() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("metrics.yaml");
    std::fs::write(&path, METRICS).unwrap();
    let set = load_metrics_file(&path, &[req("ch1.overview", "total_subjects")]).unwrap();
    assert!(set.get("ch1.overview", "total_subjects").is_some());
}

#[test]
fn unknown_sections_are_reported() {
    let skeleton = Skeleton::parse(SKELETON, Syntax::Yaml).unwrap();
    let body = "sections:\n  ch1.overview: { a: 1 }\n  ch9: { b: 2 }\n";
    let set = parse_metrics_str(body, Syntax::Yaml, &[]).unwrap();
    assert_eq!(unknown_sections(&set, &skeleton), vec!["ch9".to_string()]);
}

#[test]
fn table_metric_strings_must_read_as_numbers() {
    let body = r#"
sections:
  ch1.overview:
    total_subjects: "38x7"
"#;
    let reqs = [req("ch1.overview", "total_subjects")];
    let err = parse_metrics_str(body, Syntax::Yaml, &reqs).unwrap_err();
    match err {
        ReportError::Validation { section, key, message } => {
            assert_eq!(section, "ch1.overview");
            assert_eq!(key.as_deref(), Some("total_subjects"));
            assert!(message.contains("unit: text"), "message: {message}");
        }
        other => panic!("unexpected error: {other:?}"),
    }

    // Outside a table the same value is ordinary text.
    let set = parse_metrics_str(body, Syntax::Yaml, &[]).unwrap();
    assert_eq!(set.get("ch1.overview", "total_subjects").unwrap().unit, Unit::Text);
}

#[test]
fn table_metric_strings_get_numeric_units() {
    let body = r#"
sections:
  ch1.overview:
    total_subjects: "1,234"
    gini: "0.25"
    payment_rate: "42.5%"
    region: { value: "North", unit: text }
"#;
    let reqs = [
        req("ch1.overview", "total_subjects"),
        req("ch1.overview", "gini"),
        req("ch1.overview", "payment_rate"),
        req("ch1.overview", "region"),
    ];
    let set = parse_metrics_str(body, Syntax::Yaml, &reqs).unwrap();

    let total = set.get("ch1.overview", "total_subjects").unwrap();
    assert_eq!(total.value, MetricValue::Number(1234.0));
    assert_eq!(total.unit, Unit::Count);
    assert_eq!(set.get("ch1.overview", "gini").unwrap().unit, Unit::Ratio);
    let rate = set.get("ch1.overview", "payment_rate").unwrap();
    assert_eq!(rate.value, MetricValue::Number(42.5));
    assert_eq!(rate.unit, Unit::Percent);
    let region = set.get("ch1.overview", "region").unwrap();
    assert_eq!(region.value, MetricValue::Text("North".into()));
}
