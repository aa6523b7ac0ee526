//! Substitution-marker scanner.
//!
//! Markers look like `{{ key }}` or `{{ scope/key }}`. Scope and key are
//! non-empty runs of `[A-Za-z0-9_.-]`; whitespace just inside the braces is
//! ignored. Everything outside markers is literal text.

use serde::Serialize;

const OPEN: &str = "{{";
const CLOSE: &str = "}}";

/// A parsed marker reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Marker {
    /// Explicit section or chapter id, when written as `scope/key`.
    pub scope: Option<String>,
    pub key: String,
}

impl Marker {
    /// The marker name as written, without braces.
    pub fn name(&self) -> String {
        match &self.scope {
            Some(scope) => format!("{scope}/{}", self.key),
            None => self.key.clone(),
        }
    }
}

/// Piece of a parsed template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Segment {
    Literal(String),
    Marker(Marker),
}

/// Why a piece of template text is not a valid marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerSyntaxError {
    /// Byte offset of the offending `{{`.
    pub offset: usize,
    /// The offending text, as far as it could be read.
    pub text: String,
    pub reason: &'static str,
}

pub(crate) fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-')
}

fn is_valid_part(part: &str) -> bool {
    !part.is_empty() && part.chars().all(is_name_char)
}

fn parse_marker(inner: &str, offset: usize) -> Result<Marker, MarkerSyntaxError> {
    let name = inner.trim();
    let err = |reason| MarkerSyntaxError { offset, text: format!("{OPEN}{inner}{CLOSE}"), reason };
    if name.is_empty() {
        return Err(err("empty marker"));
    }
    let mut parts = name.split('/');
    let (scope, key) = match (parts.next(), parts.next(), parts.next()) {
        (Some(key), None, _) => (None, key),
        (Some(scope), Some(key), None) => (Some(scope), key),
        _ => return Err(err("more than one '/' in marker")),
    };
    if let Some(scope) = scope {
        if !is_valid_part(scope) {
            return Err(err("invalid scope in marker"));
        }
    }
    if !is_valid_part(key) {
        return Err(err("invalid key in marker"));
    }
    Ok(Marker { scope: scope.map(str::to_string), key: key.to_string() })
}

/// Split template text into literal and marker segments.
pub fn parse_template(text: &str) -> Result<Vec<Segment>, MarkerSyntaxError> {
    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut rest = text;
    let mut consumed = 0;

    while let Some(start) = rest.find(OPEN) {
        literal.push_str(&rest[..start]);
        let after_open = &rest[start + OPEN.len()..];
        let unterminated = || MarkerSyntaxError {
            offset: consumed + start,
            text: rest[start..].lines().next().unwrap_or_default().to_string(),
            reason: "unterminated marker",
        };
        let Some(end) = after_open.find(CLOSE) else {
            return Err(unterminated());
        };
        let inner = &after_open[..end];
        if inner.contains(OPEN) || inner.contains('\n') {
            return Err(unterminated());
        }
        let marker = parse_marker(inner, consumed + start)?;
        if !literal.is_empty() {
            segments.push(Segment::Literal(std::mem::take(&mut literal)));
        }
        segments.push(Segment::Marker(marker));

        let advance = start + OPEN.len() + end + CLOSE.len();
        consumed += advance;
        rest = &rest[advance..];
    }

    literal.push_str(rest);
    if !literal.is_empty() {
        segments.push(Segment::Literal(literal));
    }
    Ok(segments)
}
