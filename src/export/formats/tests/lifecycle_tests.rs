//! Tests for the archive lifecycle: cleanup on failure, cancellation,
//! path uniqueness, and coordinator error mapping.

use std::io::{self, Read};

use tempfile::TempDir;
use uuid::Uuid;

use super::fixtures::{dir_is_empty, export, image_project, upload_image};
use crate::config::ExportConfig;
use crate::export::{CancelToken, ExportError, ExportFormat, ExportManager, ExportOptions};
use crate::model::{FileId, FileMeta};
use crate::store::{BlobStore, MemoryStore, StoreError};

/// Blob store whose downloads fail before the first byte.
struct FailingBlobStore;

impl BlobStore for FailingBlobStore {
    fn open_blob(&self, _file_id: FileId) -> Result<(Box<dyn Read + Send>, FileMeta), StoreError> {
        Err(StoreError::Backend("blob service unavailable".to_string()))
    }
}

/// Reader that yields a few bytes, then dies mid-stream.
#[derive(Default)]
struct BrokenReader {
    sent: bool,
}

impl Read for BrokenReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.sent {
            Err(io::Error::new(
                io::ErrorKind::ConnectionAborted,
                "stream interrupted",
            ))
        } else {
            self.sent = true;
            let chunk = b"part";
            buf[..chunk.len()].copy_from_slice(chunk);
            Ok(chunk.len())
        }
    }
}

/// Blob store whose readers fail halfway through the content.
struct InterruptedBlobStore<'a> {
    inner: &'a MemoryStore,
}

impl BlobStore for InterruptedBlobStore<'_> {
    fn open_blob(&self, file_id: FileId) -> Result<(Box<dyn Read + Send>, FileMeta), StoreError> {
        let (_, meta) = self.inner.open_blob(file_id)?;
        Ok((Box::new(BrokenReader::default()), meta))
    }
}

#[test]
fn test_missing_project_is_not_found() {
    let store = MemoryStore::new();
    let dir = TempDir::new().unwrap();
    let manager = ExportManager::new(&store, &store, ExportConfig::with_export_dir(dir.path()));

    let err = manager
        .export_project(
            Uuid::new_v4(),
            ExportFormat::Coco,
            None,
            &ExportOptions::new(),
        )
        .unwrap_err();

    assert!(matches!(err, ExportError::NotFound(_)));
    assert!(dir_is_empty(dir.path()));
}

#[test]
fn test_blob_failure_cleans_up_archive() {
    let store = MemoryStore::new();
    let project = image_project(&store);
    upload_image(&store, &project, "a.png", 64, 64);

    let dir = TempDir::new().unwrap();
    let blobs = FailingBlobStore;
    let manager = ExportManager::new(&store, &blobs, ExportConfig::with_export_dir(dir.path()));

    for format in [ExportFormat::Coco, ExportFormat::Yolo] {
        let err = manager
            .export_project(project.project_id, format, None, &ExportOptions::new())
            .unwrap_err();
        assert!(matches!(err, ExportError::Store(_)), "{format}: {err}");
        assert!(dir_is_empty(dir.path()), "{format} left a partial archive");
    }
}

#[test]
fn test_midstream_failure_cleans_up_archive() {
    let store = MemoryStore::new();
    let project = image_project(&store);
    upload_image(&store, &project, "a.png", 64, 64);

    let dir = TempDir::new().unwrap();
    let blobs = InterruptedBlobStore { inner: &store };
    let manager = ExportManager::new(&store, &blobs, ExportConfig::with_export_dir(dir.path()));

    let err = manager
        .export_project(
            project.project_id,
            ExportFormat::Coco,
            None,
            &ExportOptions::new(),
        )
        .unwrap_err();

    assert!(matches!(err, ExportError::Io(_)));
    assert!(dir_is_empty(dir.path()));
}

#[test]
fn test_cancellation_aborts_and_cleans_up() {
    let store = MemoryStore::new();
    let project = image_project(&store);
    let file = upload_image(&store, &project, "a.png", 64, 64);
    store
        .create_classification_annotation(
            file.file_id,
            project.project_id,
            project.created_by,
            "cat",
        )
        .unwrap();

    let token = CancelToken::new();
    token.cancel();

    let dir = TempDir::new().unwrap();
    for format in ExportFormat::all() {
        let err = export(
            &store,
            &project,
            *format,
            dir.path(),
            &ExportOptions::new().cancel_token(token.clone()),
        )
        .unwrap_err();
        assert!(matches!(err, ExportError::Cancelled), "{format}");
        assert!(dir_is_empty(dir.path()), "{format} left a partial archive");
    }
}

#[test]
fn test_cancellation_requires_annotations_for_classification() {
    // Classification polls the token per annotation; a project with
    // files but no annotations runs to (empty) completion.
    let store = MemoryStore::new();
    let project = image_project(&store);

    let token = CancelToken::new();
    token.cancel();

    let dir = TempDir::new().unwrap();
    let result = export(
        &store,
        &project,
        ExportFormat::Classification,
        dir.path(),
        &ExportOptions::new().cancel_token(token),
    );
    assert!(result.is_ok());
}

#[test]
fn test_repeat_exports_use_distinct_paths() {
    let store = MemoryStore::new();
    let project = image_project(&store);
    upload_image(&store, &project, "a.png", 64, 64);

    let dir = TempDir::new().unwrap();
    let first = export(
        &store,
        &project,
        ExportFormat::Coco,
        dir.path(),
        &ExportOptions::new(),
    )
    .unwrap();
    let second = export(
        &store,
        &project,
        ExportFormat::Coco,
        dir.path(),
        &ExportOptions::new(),
    )
    .unwrap();

    assert_ne!(first, second);
    assert!(first.exists());
    assert!(second.exists());
}

#[test]
fn test_archive_filename_shape() {
    let store = MemoryStore::new();
    let project = image_project(&store);

    let dir = TempDir::new().unwrap();
    let path = export(
        &store,
        &project,
        ExportFormat::Yolo,
        dir.path(),
        &ExportOptions::new(),
    )
    .unwrap();

    let name = path.file_name().unwrap().to_str().unwrap();
    assert!(name.starts_with(&format!("{}_yolo_", project.project_id)));
    assert!(name.ends_with(".zip"));
}
