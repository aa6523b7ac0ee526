use std::path::Path;

use report_assembler::{canonicalize_or_current, infer_report_name};
use tempfile::tempdir;

#[test]
fn canonicalize_or_current_returns_cwd_for_dot() {
    let original = std::env::current_dir().expect("cwd");
    let tmp = tempdir().expect("tempdir");
    std::env::set_current_dir(tmp.path()).expect("chdir tmp");

    let result = canonicalize_or_current(".").expect("canonicalize").canonicalize().expect("canon");
    let expected = tmp.path().canonicalize().expect("canon tmp");
    assert_eq!(result, expected);

    std::env::set_current_dir(original).expect("restore cwd");
}

#[test]
fn canonicalize_or_current_keeps_missing_paths_absolute() {
    let tmp = tempdir().expect("tempdir");
    let missing = tmp.path().join("not-yet");
    let result = canonicalize_or_current(&missing.to_string_lossy()).expect("resolve");
    assert!(result.is_absolute());
    assert!(result.ends_with("not-yet"));
    assert!(!result.exists());
}

#[test]
fn infer_report_name_uses_last_path_component() {
    assert_eq!(infer_report_name(Path::new("/tmp/annual-2025")), "annual-2025");
}

#[test]
fn infer_report_name_falls_back_when_missing() {
    assert_eq!(infer_report_name(Path::new("/")), "report");
}
