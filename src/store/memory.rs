//! In-memory metadata and blob storage.
//!
//! Backs the test suite and small embedded deployments. Mirrors the
//! lifecycle rules of the production document store: annotation writes
//! keep the owning file's status in sync, and deleting a file cascades
//! to its annotations and blob.

use std::collections::HashMap;
use std::io::{Cursor, Read};
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use uuid::Uuid;

use crate::geometry::{BoundingBox, Polygon};
use crate::model::{
    Annotation, AnnotationId, AnnotationShape, DataType, FileId, FileMeta, FileStatus, Project,
    ProjectId, ProjectSettings, UserId,
};
use crate::store::{BlobStore, MetadataRepository, StoreError};

#[derive(Default)]
struct Inner {
    projects: Vec<Project>,
    files: Vec<FileMeta>,
    annotations: Vec<Annotation>,
    blobs: HashMap<FileId, Vec<u8>>,
}

/// In-process implementation of [`MetadataRepository`] and [`BlobStore`].
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Create and register a project.
    pub fn create_project(
        &self,
        name: impl Into<String>,
        description: impl Into<String>,
        created_by: UserId,
        settings: ProjectSettings,
    ) -> Project {
        let project = Project::new(name, description, created_by, settings);
        self.lock().projects.push(project.clone());
        project
    }

    /// Store a file's content and metadata under an existing project.
    ///
    /// Image uploads must carry pixel dimensions; video uploads are
    /// rejected. Files start out [`FileStatus::Unannotated`].
    pub fn upload_file(
        &self,
        project_id: ProjectId,
        created_by: UserId,
        filename: impl Into<String>,
        content_type: &str,
        bytes: Vec<u8>,
        dimensions: Option<(u32, u32)>,
    ) -> Result<FileMeta, StoreError> {
        let data_type =
            DataType::from_mime(content_type).map_err(|e| StoreError::Invalid(e.to_string()))?;

        match data_type {
            DataType::Image if dimensions.is_none() => {
                return Err(StoreError::Invalid(
                    "image uploads require pixel dimensions".to_string(),
                ));
            }
            DataType::Video => {
                return Err(StoreError::Invalid(
                    "video uploads are not supported".to_string(),
                ));
            }
            _ => {}
        }

        let mut inner = self.lock();
        if !inner.projects.iter().any(|p| p.project_id == project_id) {
            return Err(StoreError::NotFound(format!("project {project_id}")));
        }

        let meta = FileMeta {
            file_id: Uuid::new_v4(),
            project_id,
            created_by,
            filename: filename.into(),
            content_type: content_type.to_string(),
            data_type,
            size: bytes.len() as u64,
            created_at: Utc::now(),
            width: dimensions.map(|(w, _)| w),
            height: dimensions.map(|(_, h)| h),
            status: FileStatus::Unannotated,
        };
        inner.blobs.insert(meta.file_id, bytes);
        inner.files.push(meta.clone());
        Ok(meta)
    }

    fn insert_annotation(&self, annotation: Annotation) -> Result<Annotation, StoreError> {
        let mut inner = self.lock();
        if !inner.files.iter().any(|f| f.file_id == annotation.file_id) {
            return Err(StoreError::NotFound(format!("file {}", annotation.file_id)));
        }
        if !inner
            .projects
            .iter()
            .any(|p| p.project_id == annotation.project_id)
        {
            return Err(StoreError::NotFound(format!(
                "project {}",
                annotation.project_id
            )));
        }

        if let Some(file) = inner
            .files
            .iter_mut()
            .find(|f| f.file_id == annotation.file_id)
        {
            file.status = FileStatus::Annotated;
        }
        inner.annotations.push(annotation.clone());
        Ok(annotation)
    }

    /// Create a whole-file classification annotation.
    pub fn create_classification_annotation(
        &self,
        file_id: FileId,
        project_id: ProjectId,
        created_by: UserId,
        label: impl Into<String>,
    ) -> Result<Annotation, StoreError> {
        self.insert_annotation(Annotation::classification(
            file_id, project_id, created_by, label,
        ))
    }

    /// Create an object-detection annotation.
    pub fn create_object_detection_annotation(
        &self,
        file_id: FileId,
        project_id: ProjectId,
        created_by: UserId,
        label: impl Into<String>,
        bbox: BoundingBox,
    ) -> Result<Annotation, StoreError> {
        self.insert_annotation(Annotation::object_detection(
            file_id, project_id, created_by, label, bbox,
        ))
    }

    /// Create a segmentation annotation.
    pub fn create_segmentation_annotation(
        &self,
        file_id: FileId,
        project_id: ProjectId,
        created_by: UserId,
        label: impl Into<String>,
        points: Polygon,
    ) -> Result<Annotation, StoreError> {
        self.insert_annotation(Annotation::segmentation(
            file_id, project_id, created_by, label, points,
        ))
    }

    /// Patch an annotation's label and/or shape.
    ///
    /// Replacing the shape with one of a different kind swaps the whole
    /// payload, so coordinates from the previous kind cannot linger.
    pub fn update_annotation(
        &self,
        annotation_id: AnnotationId,
        label: Option<&str>,
        shape: Option<AnnotationShape>,
    ) -> Result<(), StoreError> {
        let mut inner = self.lock();
        let annotation = inner
            .annotations
            .iter_mut()
            .find(|a| a.annotation_id == annotation_id)
            .ok_or_else(|| StoreError::NotFound(format!("annotation {annotation_id}")))?;

        if let Some(label) = label {
            annotation.label = label.to_string();
        }
        if let Some(shape) = shape {
            annotation.shape = shape;
        }
        annotation.updated_at = Utc::now();
        Ok(())
    }

    /// Delete an annotation; the owning file flips back to
    /// [`FileStatus::Unannotated`] when this was its last one.
    pub fn delete_annotation(&self, annotation_id: AnnotationId) -> Result<(), StoreError> {
        let mut inner = self.lock();
        let index = inner
            .annotations
            .iter()
            .position(|a| a.annotation_id == annotation_id)
            .ok_or_else(|| StoreError::NotFound(format!("annotation {annotation_id}")))?;
        let removed = inner.annotations.remove(index);

        let still_annotated = inner.annotations.iter().any(|a| a.file_id == removed.file_id);
        if !still_annotated {
            if let Some(file) = inner.files.iter_mut().find(|f| f.file_id == removed.file_id) {
                file.status = FileStatus::Unannotated;
            }
        }
        Ok(())
    }

    /// Delete a file along with its annotations and stored content.
    pub fn delete_file(&self, file_id: FileId) -> Result<(), StoreError> {
        let mut inner = self.lock();
        let index = inner
            .files
            .iter()
            .position(|f| f.file_id == file_id)
            .ok_or_else(|| StoreError::NotFound(format!("file {file_id}")))?;
        inner.files.remove(index);
        inner.annotations.retain(|a| a.file_id != file_id);
        inner.blobs.remove(&file_id);
        Ok(())
    }

    /// Fetch one file's metadata.
    pub fn file_by_id(&self, file_id: FileId) -> Option<FileMeta> {
        self.lock().files.iter().find(|f| f.file_id == file_id).cloned()
    }
}

impl MetadataRepository for MemoryStore {
    fn project_by_id(&self, project_id: ProjectId) -> Result<Option<Project>, StoreError> {
        Ok(self
            .lock()
            .projects
            .iter()
            .find(|p| p.project_id == project_id)
            .cloned())
    }

    fn files_by_project(&self, project_id: ProjectId) -> Result<Vec<FileMeta>, StoreError> {
        Ok(self
            .lock()
            .files
            .iter()
            .filter(|f| f.project_id == project_id)
            .cloned()
            .collect())
    }

    fn annotations_by_project(&self, project_id: ProjectId) -> Result<Vec<Annotation>, StoreError> {
        Ok(self
            .lock()
            .annotations
            .iter()
            .filter(|a| a.project_id == project_id)
            .cloned()
            .collect())
    }
}

impl BlobStore for MemoryStore {
    fn open_blob(&self, file_id: FileId) -> Result<(Box<dyn Read + Send>, FileMeta), StoreError> {
        let inner = self.lock();
        let meta = inner
            .files
            .iter()
            .find(|f| f.file_id == file_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("file {file_id}")))?;
        let bytes = inner
            .blobs
            .get(&file_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("blob {file_id}")))?;
        Ok((Box::new(Cursor::new(bytes)), meta))
    }
}
