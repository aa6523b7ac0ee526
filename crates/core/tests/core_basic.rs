use report_core::render::format::{group_thousands, localize_digits};
use report_core::config::Digits;
use report_core::version;

#[test]
fn version_is_non_empty() {
    let v = version();
    assert!(!v.is_empty());
}

#[test]
fn group_thousands_inserts_separators() {
    assert_eq!(group_thousands(1_234_567.0, 0), "1,234,567");
    assert_eq!(group_thousands(387.0, 0), "387");
    assert_eq!(group_thousands(-1234.56, 1), "-1,234.6");
    assert_eq!(group_thousands(0.4123, 3), "0.412");
}

#[test]
fn group_thousands_drops_sign_of_rounded_zero() {
    assert_eq!(group_thousands(-0.01, 1), "0.0");
}

#[test]
fn persian_digits_replace_digits_and_separators() {
    assert_eq!(localize_digits("1,234.5%", Digits::Persian), "۱،۲۳۴.۵٪");
    assert_eq!(localize_digits("1,234", Digits::Latin), "1,234");
}
