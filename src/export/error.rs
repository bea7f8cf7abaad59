//! Error types for the export pipeline.

use thiserror::Error;

use crate::geometry::GeometryError;
use crate::model::FileId;
use crate::store::StoreError;

/// Errors that can abort an export run.
///
/// Any of these reaching the caller means the partial archive has
/// already been removed from disk.
#[derive(Error, Debug)]
pub enum ExportError {
    /// Referenced project or file does not exist.
    #[error("resource not found: {0}")]
    NotFound(String),

    /// The requested export format is not recognized.
    #[error("unknown export format '{0}'")]
    UnknownFormat(String),

    /// A strategy cannot structurally represent an annotation kind.
    #[error("{format} export is not implemented for {kind} annotations")]
    UnsupportedAnnotation {
        /// Format that rejected the annotation.
        format: &'static str,
        /// Kind it cannot encode.
        kind: &'static str,
    },

    /// An image file lacks the pixel dimensions a format needs.
    #[error("image dimensions required for {format} export but missing for file {file_id}")]
    MissingDimensions {
        /// Format requiring dimensions.
        format: &'static str,
        /// File missing them.
        file_id: FileId,
    },

    /// Malformed strategy options.
    #[error("invalid export option: {0}")]
    InvalidOption(String),

    /// The export's cancellation token fired.
    #[error("export cancelled")]
    Cancelled,

    /// Stored geometry failed conversion.
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    /// I/O failure writing the archive.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Manifest serialization failure.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Archive writer failure.
    #[error("archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Storage backend failure other than not-found.
    #[error("storage error: {0}")]
    Store(StoreError),
}

impl From<StoreError> for ExportError {
    fn from(err: StoreError) -> Self {
        // Not-found keeps its identity so the HTTP boundary can map it
        // to a 404 instead of a 500.
        match err {
            StoreError::NotFound(what) => ExportError::NotFound(what),
            other => ExportError::Store(other),
        }
    }
}
