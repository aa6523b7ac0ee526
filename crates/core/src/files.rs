use std::fs;
use std::io::Write;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tempfile::NamedTempFile;

use crate::error::{ReportError, ReportResult};

/// Structured file syntax, chosen from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Syntax {
    Json,
    Yaml,
}

impl Syntax {
    /// `.json` is JSON; everything else is treated as YAML.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Syntax::Json,
            _ => Syntax::Yaml,
        }
    }
}

/// Parse a YAML or JSON string into `T`. `origin` is used in error messages.
pub fn parse_structured<T: DeserializeOwned>(
    body: &str,
    syntax: Syntax,
    origin: &Path,
) -> ReportResult<T> {
    let parsed = match syntax {
        Syntax::Json => serde_json::from_str(body).map_err(|e| e.to_string()),
        Syntax::Yaml => serde_yaml::from_str(body).map_err(|e| e.to_string()),
    };
    parsed.map_err(|message| ReportError::Parse { path: origin.to_path_buf(), message })
}

/// Read and parse a YAML or JSON file (syntax chosen by extension).
pub fn read_structured<T: DeserializeOwned>(path: &Path) -> ReportResult<T> {
    let body = fs::read_to_string(path).map_err(|e| ReportError::io(path, e))?;
    parse_structured(&body, Syntax::from_path(path), path)
}

/// Serialize `value` as YAML or JSON (by extension of `path`).
pub fn to_structured_string<T: Serialize>(value: &T, path: &Path) -> ReportResult<String> {
    let out = match Syntax::from_path(path) {
        Syntax::Json => {
            serde_json::to_string_pretty(value).map(|s| s + "\n").map_err(|e| e.to_string())
        }
        Syntax::Yaml => serde_yaml::to_string(value).map_err(|e| e.to_string()),
    };
    out.map_err(|message| ReportError::Encode { path: path.to_path_buf(), message })
}

/// Write `contents` to `path` all-or-nothing.
///
/// The bytes go to a temporary file in the destination directory, which is
/// flushed and then renamed over `path`. If anything fails, `path` keeps its
/// previous contents (or stays absent). An existing destination keeps its
/// permissions; a new one gets the usual `0644`.
pub fn write_atomic(path: &Path, contents: &[u8]) -> ReportResult<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| ReportError::io(dir, e))?;
    tmp.write_all(contents).map_err(|e| ReportError::io(tmp.path(), e))?;
    tmp.as_file().sync_all().map_err(|e| ReportError::io(tmp.path(), e))?;
    if let Some(perms) = target_permissions(path)? {
        tmp.as_file().set_permissions(perms).map_err(|e| ReportError::io(tmp.path(), e))?;
    }
    tmp.persist(path).map_err(|e| ReportError::io(path, e.error))?;
    log::debug!("wrote {} bytes to {}", contents.len(), path.display());
    Ok(())
}

/// Permissions the persisted file should carry. Temp files are created
/// owner-only, which must not leak onto the destination.
fn target_permissions(path: &Path) -> ReportResult<Option<fs::Permissions>> {
    match fs::metadata(path) {
        Ok(meta) => Ok(Some(meta.permissions())),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(default_permissions()),
        Err(e) => Err(ReportError::io(path, e)),
    }
}

#[cfg(unix)]
fn default_permissions() -> Option<fs::Permissions> {
    use std::os::unix::fs::PermissionsExt;
    Some(fs::Permissions::from_mode(0o644))
}

#[cfg(not(unix))]
fn default_permissions() -> Option<fs::Permissions> {
    None
}
