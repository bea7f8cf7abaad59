//! Pipeline configuration.

use std::path::PathBuf;

/// Runtime configuration for the export pipeline.
///
/// Passed explicitly into [`crate::export::ExportManager`] rather than
/// read from ambient process state, so embedders and tests control
/// where archives land.
#[derive(Debug, Clone)]
pub struct ExportConfig {
    /// Directory receiving finished archives when the caller does not
    /// override it per export.
    pub export_dir: PathBuf,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            export_dir: std::env::temp_dir().join("labelkit").join("exports"),
        }
    }
}

impl ExportConfig {
    /// Configuration writing archives beneath the given directory.
    pub fn with_export_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            export_dir: dir.into(),
        }
    }
}
