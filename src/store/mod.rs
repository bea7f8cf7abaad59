//! Storage seams consumed by the export pipeline.
//!
//! The pipeline reads project metadata through [`MetadataRepository`]
//! and file content through [`BlobStore`]; both are traits so the
//! production document store, the blob backend, and test doubles plug
//! in interchangeably. [`MemoryStore`] implements both in-process.

mod memory;

pub use memory::MemoryStore;

use std::io::Read;

use thiserror::Error;

use crate::model::{Annotation, FileId, FileMeta, Project, ProjectId};

/// Errors surfaced by metadata and blob storage backends.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The referenced resource does not exist.
    #[error("resource not found: {0}")]
    NotFound(String),

    /// The input was rejected before reaching storage.
    #[error("invalid input: {0}")]
    Invalid(String),

    /// The backend failed for reasons other than the request itself.
    #[error("storage backend error: {0}")]
    Backend(String),

    /// I/O failure talking to the backend.
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Read access to project, file, and annotation metadata.
pub trait MetadataRepository: Send + Sync {
    /// Fetch a project by ID, or `None` if it does not exist.
    fn project_by_id(&self, project_id: ProjectId) -> Result<Option<Project>, StoreError>;

    /// All file metadata belonging to a project.
    fn files_by_project(&self, project_id: ProjectId) -> Result<Vec<FileMeta>, StoreError>;

    /// All annotations belonging to a project.
    fn annotations_by_project(&self, project_id: ProjectId) -> Result<Vec<Annotation>, StoreError>;
}

/// Binary content storage addressed by file ID.
pub trait BlobStore: Send + Sync {
    /// Open the stored bytes of a file for streaming reads, together
    /// with its metadata. Content is consumed through the reader so
    /// large files never need to be buffered whole.
    fn open_blob(&self, file_id: FileId) -> Result<(Box<dyn Read + Send>, FileMeta), StoreError>;
}
