use std::path::{Path, PathBuf};

/// Logical layout of a report project on disk.
///
/// This is derived from a chosen root path. It does *not* perform any IO itself;
/// `init` creates the directories and starter files it describes.
#[derive(Debug, Clone)]
pub struct ReportLayout {
    /// Root directory of the project.
    pub root: PathBuf,
    /// Path to the report config file (YAML).
    pub config_path: PathBuf,
    /// Directory for skeleton definitions (templates).
    pub templates_dir: PathBuf,
    /// Default skeleton file.
    pub skeleton_path: PathBuf,
    /// Directory for metric inputs (data).
    pub data_dir: PathBuf,
    /// Default metrics file.
    pub metrics_path: PathBuf,
    /// Directory for fills files (fills).
    pub fills_dir: PathBuf,
    /// Default fills file.
    pub fills_path: PathBuf,
    /// Directory for exported documents (out).
    pub out_dir: PathBuf,
    /// Directory where chart images are expected (figs).
    pub figs_dir: PathBuf,
}

impl ReportLayout {
    /// Compute the default layout for a project rooted at `root`.
    pub fn new(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref().to_path_buf();
        let config_path = root.join("report.yaml");
        let templates_dir = root.join("templates");
        let skeleton_path = templates_dir.join("skeleton.yaml");
        let data_dir = root.join("data");
        let metrics_path = data_dir.join("metrics.yaml");
        let fills_dir = root.join("fills");
        let fills_path = fills_dir.join("fills.yaml");
        let out_dir = root.join("out");
        let figs_dir = root.join("figs");

        Self {
            root,
            config_path,
            templates_dir,
            skeleton_path,
            data_dir,
            metrics_path,
            fills_dir,
            fills_path,
            out_dir,
            figs_dir,
        }
    }

    /// Default export destination for the given extension (`md`, `json`).
    pub fn output_path(&self, extension: &str) -> PathBuf {
        self.out_dir.join(format!("report.{extension}"))
    }

    /// Express `path` relative to the root when it lives under it.
    pub fn relative_string(&self, path: &Path) -> String {
        match path.strip_prefix(&self.root) {
            Ok(rel) => rel.to_string_lossy().to_string(),
            Err(_) => path.to_string_lossy().to_string(),
        }
    }
}
