//! Unit-aware value formatting.
//!
//! Percent values are expected already scaled (42.5 means 42.5%).

use crate::config::{Digits, FormatOptions};
use crate::model::{MetricRecord, MetricValue, Unit};

const PERSIAN_DIGITS: [char; 10] = ['۰', '۱', '۲', '۳', '۴', '۵', '۶', '۷', '۸', '۹'];

/// Format `n` with `decimals` fraction digits and `,` thousands separators.
pub fn group_thousands(n: f64, decimals: usize) -> String {
    let body = format!("{:.*}", decimals, n.abs());
    let (int_part, frac_part) = match body.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (body.as_str(), None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3 + 2);
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    if let Some(frac) = frac_part {
        grouped.push('.');
        grouped.push_str(frac);
    }

    let is_zero = body.chars().all(|c| c == '0' || c == '.');
    if n.is_sign_negative() && !is_zero {
        grouped.insert(0, '-');
    }
    grouped
}

/// Rewrite Latin digits and separators into the configured digit system.
pub fn localize_digits(text: &str, digits: Digits) -> String {
    match digits {
        Digits::Latin => text.to_string(),
        Digits::Persian => text
            .chars()
            .map(|c| match c {
                '0'..='9' => PERSIAN_DIGITS[(c as u8 - b'0') as usize],
                ',' => '،',
                '%' => '٪',
                other => other,
            })
            .collect(),
    }
}

/// Format a number according to its unit.
pub fn format_number(n: f64, unit: &Unit, opts: &FormatOptions) -> String {
    let local = |latin: String| localize_digits(&latin, opts.digits);
    match unit {
        Unit::Count => local(group_thousands(n, 0)),
        Unit::Percent => local(format!("{}%", group_thousands(n, opts.percent_decimals))),
        Unit::Ratio => local(group_thousands(n, opts.ratio_decimals)),
        // The unit label is prose; only the number is localized.
        Unit::Amount(label) => {
            format!("{} {label}", local(group_thousands(n, opts.amount_decimals)))
        }
        Unit::Text => n.to_string(),
    }
}

/// Format a metric's value for prompts and tables.
pub fn format_value(record: &MetricRecord, opts: &FormatOptions) -> String {
    match &record.value {
        MetricValue::Number(n) => format_number(*n, &record.unit, opts),
        MetricValue::Text(text) => text.clone(),
    }
}

/// Format a metric's target, if it has one, in the metric's unit.
pub fn format_target(record: &MetricRecord, opts: &FormatOptions) -> Option<String> {
    record.target.map(|t| format_number(t, &record.unit, opts))
}
