//! Core data model: projects, files, and annotations.

mod annotation;
mod file;
mod project;

pub use annotation::{Annotation, AnnotationId, AnnotationKind, AnnotationShape};
pub use file::{DataType, FileId, FileMeta, FileStatus};
pub use project::{Project, ProjectId, ProjectSettings};

use thiserror::Error;

/// Unique identifier for a user account.
pub type UserId = uuid::Uuid;

/// Validation errors for model values.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    /// The MIME type maps to no supported data category.
    #[error("unsupported content type '{0}'")]
    UnsupportedContentType(String),

    /// Confidence outside the [0, 1] interval.
    #[error("confidence must be within [0, 1], got {0}")]
    InvalidConfidence(f64),
}
