use report_core::skeleton::{parse_template, Marker, Segment};

#[test]
fn splits_literals_and_markers() {
    let segments = parse_template("There are {{total}} subjects.").unwrap();
    assert_eq!(
        segments,
        vec![
            Segment::Literal("There are ".into()),
            Segment::Marker(Marker { scope: None, key: "total".into() }),
            Segment::Literal(" subjects.".into()),
        ]
    );
}

#[test]
fn whitespace_inside_braces_is_ignored() {
    let segments = parse_template("{{  ch1.overview/total_subjects }}").unwrap();
    let [Segment::Marker(found)] = segments.as_slice() else {
        panic!("expected one marker, got {segments:?}");
    };
    assert_eq!(found.scope.as_deref(), Some("ch1.overview"));
    assert_eq!(found.key, "total_subjects");
    assert_eq!(found.name(), "ch1.overview/total_subjects");
}

#[test]
fn text_without_markers_is_one_literal() {
    let segments = parse_template("No markers here; a stray }} is fine.").unwrap();
    assert_eq!(segments, vec![Segment::Literal("No markers here; a stray }} is fine.".into())]);
    assert!(parse_template("").unwrap().is_empty());
}

#[test]
fn unterminated_marker_is_rejected() {
    let err = parse_template("Value: {{total").unwrap_err();
    assert_eq!(err.reason, "unterminated marker");
    assert_eq!(err.offset, 7);

    let err = parse_template("{{total\n}}").unwrap_err();
    assert_eq!(err.reason, "unterminated marker");

    let err = parse_template("{{a {{b}}").unwrap_err();
    assert_eq!(err.reason, "unterminated marker");
}

#[test]
fn malformed_marker_names_are_rejected() {
    assert_eq!(parse_template("{{ }}").unwrap_err().reason, "empty marker");
    assert_eq!(parse_template("{{a/b/c}}").unwrap_err().reason, "more than one '/' in marker");
    assert_eq!(parse_template("{{/key}}").unwrap_err().reason, "invalid scope in marker");
    assert_eq!(parse_template("{{has space}}").unwrap_err().reason, "invalid key in marker");
}
