//! Dataset export pipeline.
//!
//! Turns a project's stored files and annotations into a ZIP archive
//! in one of the supported ML dataset layouts:
//!
//! - **COCO**: `manifest.json` plus image copies at the archive root
//! - **YOLO**: `data.yaml`, a shuffled train/val image split, and
//!   per-image label files
//! - **Classification**: one folder per label under `data/`
//!
//! Each export is a synchronous run-to-completion operation: the caller
//! gets back either the path of a finished archive or an error, never a
//! path to a partial file.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use labelkit::config::ExportConfig;
//! use labelkit::export::{ExportFormat, ExportManager, ExportOptions};
//!
//! let manager = ExportManager::new(&repo, &blobs, ExportConfig::default());
//! let archive = manager.export_project(
//!     project_id,
//!     ExportFormat::Coco,
//!     None,
//!     &ExportOptions::new(),
//! )?;
//! ```

mod archive;
mod error;
pub mod formats;

pub use error::ExportError;

use std::fmt;
use std::io::{Seek, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use zip::ZipWriter;

use crate::config::ExportConfig;
use crate::export::archive::ArchiveBuilder;
use crate::model::{Project, ProjectId};
use crate::store::{BlobStore, MetadataRepository};

/// Target dataset layout for an export run.
///
/// A closed set: adding a format means adding a variant and its
/// `populate` arm, and the compiler points at every dispatch site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportFormat {
    Coco,
    Yolo,
    Classification,
}

impl ExportFormat {
    /// Identifier used in archive filenames and format selection.
    pub fn name(&self) -> &'static str {
        match self {
            ExportFormat::Coco => "coco",
            ExportFormat::Yolo => "yolo",
            ExportFormat::Classification => "classification",
        }
    }

    /// All supported formats.
    pub fn all() -> &'static [ExportFormat] {
        &[
            ExportFormat::Coco,
            ExportFormat::Yolo,
            ExportFormat::Classification,
        ]
    }

    /// Write this format's entries for `project` into the open archive.
    pub(crate) fn populate<W: Write + Seek>(
        &self,
        project: &Project,
        ctx: &ExportContext<'_>,
        zip: &mut ZipWriter<W>,
        options: &ExportOptions,
    ) -> Result<(), ExportError> {
        match self {
            ExportFormat::Coco => formats::coco::populate(project, ctx, zip, options),
            ExportFormat::Yolo => formats::yolo::populate(project, ctx, zip, options),
            ExportFormat::Classification => {
                formats::classification::populate(project, ctx, zip, options)
            }
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "coco" => Ok(ExportFormat::Coco),
            "yolo" => Ok(ExportFormat::Yolo),
            "classification" => Ok(ExportFormat::Classification),
            _ => Err(ExportError::UnknownFormat(s.to_string())),
        }
    }
}

/// Cooperative cancellation flag shared with an export run.
///
/// Clone one half into the export options and keep the other; firing
/// [`CancelToken::cancel`] makes the run abort with
/// [`ExportError::Cancelled`] at its next per-file checkpoint, and the
/// partial archive is cleaned up as for any other failure.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation of the export run holding this token.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    pub(crate) fn check(&self) -> Result<(), ExportError> {
        if self.is_cancelled() {
            Err(ExportError::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// Options for an export run.
#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// Fraction of image files assigned to the validation split.
    /// Only the YOLO format reads this. Must lie within [0, 1].
    pub validation_ratio: f64,

    /// Cancellation flag polled between files.
    pub cancel: CancelToken,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            validation_ratio: 0.1,
            cancel: CancelToken::new(),
        }
    }
}

impl ExportOptions {
    /// Create options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the validation split ratio.
    pub fn validation_ratio(mut self, ratio: f64) -> Self {
        self.validation_ratio = ratio;
        self
    }

    /// Attach a cancellation token.
    pub fn cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = token;
        self
    }
}

/// Shared collaborators handed to format strategies.
pub(crate) struct ExportContext<'a> {
    pub repo: &'a dyn MetadataRepository,
    pub blobs: &'a dyn BlobStore,
}

/// Entry point for dataset exports.
pub struct ExportManager<'a> {
    repo: &'a dyn MetadataRepository,
    blobs: &'a dyn BlobStore,
    config: ExportConfig,
}

impl<'a> ExportManager<'a> {
    /// Bind the pipeline to its storage collaborators.
    pub fn new(
        repo: &'a dyn MetadataRepository,
        blobs: &'a dyn BlobStore,
        config: ExportConfig,
    ) -> Self {
        Self { repo, blobs, config }
    }

    /// Export a project as `format`, returning the path of the finished
    /// archive.
    ///
    /// `export_dir` overrides the configured output directory for this
    /// run. The caller owns the returned file: stream it to the client,
    /// then delete it.
    pub fn export_project(
        &self,
        project_id: ProjectId,
        format: ExportFormat,
        export_dir: Option<&Path>,
        options: &ExportOptions,
    ) -> Result<PathBuf, ExportError> {
        let dir = export_dir.unwrap_or(&self.config.export_dir);
        let ctx = ExportContext {
            repo: self.repo,
            blobs: self.blobs,
        };
        ArchiveBuilder::new(project_id, format, dir).build(&ctx, options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_names() {
        assert_eq!(ExportFormat::Coco.name(), "coco");
        assert_eq!(ExportFormat::Yolo.name(), "yolo");
        assert_eq!(ExportFormat::Classification.name(), "classification");
        assert_eq!(ExportFormat::all().len(), 3);
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!("coco".parse::<ExportFormat>().unwrap(), ExportFormat::Coco);
        assert_eq!("YOLO".parse::<ExportFormat>().unwrap(), ExportFormat::Yolo);
        assert_eq!(
            "Classification".parse::<ExportFormat>().unwrap(),
            ExportFormat::Classification
        );
        assert!(matches!(
            "voc".parse::<ExportFormat>(),
            Err(ExportError::UnknownFormat(_))
        ));
    }

    #[test]
    fn test_cancel_token() {
        let token = CancelToken::new();
        assert!(!token.is_cancelled());
        assert!(token.check().is_ok());

        let shared = token.clone();
        shared.cancel();
        assert!(token.is_cancelled());
        assert!(matches!(token.check(), Err(ExportError::Cancelled)));
    }
}
