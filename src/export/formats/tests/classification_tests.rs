//! Tests for the folder-per-label classification export.

use tempfile::TempDir;

use super::fixtures::{
    entry_names, export, image_project, open_archive, read_entry_bytes, upload_image, IMAGE_BYTES,
};
use crate::export::{ExportFormat, ExportOptions};
use crate::geometry::BoundingBox;
use crate::store::MemoryStore;

#[test]
fn test_files_grouped_by_label() {
    let store = MemoryStore::new();
    let project = image_project(&store);
    let a = upload_image(&store, &project, "a.png", 64, 64);
    let b = upload_image(&store, &project, "b.png", 64, 64);
    store
        .create_classification_annotation(a.file_id, project.project_id, project.created_by, "cat")
        .unwrap();
    store
        .create_classification_annotation(b.file_id, project.project_id, project.created_by, "dog")
        .unwrap();

    let dir = TempDir::new().unwrap();
    let path = export(
        &store,
        &project,
        ExportFormat::Classification,
        dir.path(),
        &ExportOptions::new(),
    )
    .unwrap();

    let mut archive = open_archive(&path);
    let mut names = entry_names(&mut archive);
    names.sort();
    assert_eq!(names, vec!["data/cat/a.png", "data/dog/b.png"]);
    assert_eq!(read_entry_bytes(&mut archive, "data/cat/a.png"), IMAGE_BYTES);
}

#[test]
fn test_filename_collision_disambiguated_by_file_id() {
    let store = MemoryStore::new();
    let project = image_project(&store);
    let first = upload_image(&store, &project, "photo.png", 64, 64);
    let second = upload_image(&store, &project, "photo.png", 64, 64);
    for file in [&first, &second] {
        store
            .create_classification_annotation(
                file.file_id,
                project.project_id,
                project.created_by,
                "cat",
            )
            .unwrap();
    }

    let dir = TempDir::new().unwrap();
    let path = export(
        &store,
        &project,
        ExportFormat::Classification,
        dir.path(),
        &ExportOptions::new(),
    )
    .unwrap();

    let mut archive = open_archive(&path);
    let names = entry_names(&mut archive);
    assert_eq!(names.len(), 2);
    assert!(names.contains(&"data/cat/photo.png".to_string()));
    assert!(names
        .iter()
        .any(|n| *n == format!("data/cat/photo_{}.png", second.file_id)));
}

#[test]
fn test_duplicate_annotation_written_once() {
    let store = MemoryStore::new();
    let project = image_project(&store);
    let file = upload_image(&store, &project, "a.png", 64, 64);
    for _ in 0..2 {
        store
            .create_classification_annotation(
                file.file_id,
                project.project_id,
                project.created_by,
                "cat",
            )
            .unwrap();
    }

    let dir = TempDir::new().unwrap();
    let path = export(
        &store,
        &project,
        ExportFormat::Classification,
        dir.path(),
        &ExportOptions::new(),
    )
    .unwrap();

    let mut archive = open_archive(&path);
    assert_eq!(entry_names(&mut archive), vec!["data/cat/a.png"]);
}

#[test]
fn test_label_whitespace_trimmed() {
    let store = MemoryStore::new();
    let project = image_project(&store);
    let file = upload_image(&store, &project, "a.png", 64, 64);
    store
        .create_classification_annotation(
            file.file_id,
            project.project_id,
            project.created_by,
            "  cat  ",
        )
        .unwrap();

    let dir = TempDir::new().unwrap();
    let path = export(
        &store,
        &project,
        ExportFormat::Classification,
        dir.path(),
        &ExportOptions::new(),
    )
    .unwrap();

    let mut archive = open_archive(&path);
    assert_eq!(entry_names(&mut archive), vec!["data/cat/a.png"]);
}

#[test]
fn test_other_annotation_kinds_ignored() {
    let store = MemoryStore::new();
    let project = image_project(&store);
    let file = upload_image(&store, &project, "a.png", 64, 64);
    let bbox = BoundingBox::new(0.1, 0.1, 0.2, 0.2).unwrap();
    store
        .create_object_detection_annotation(
            file.file_id,
            project.project_id,
            project.created_by,
            "cat",
            bbox,
        )
        .unwrap();

    let dir = TempDir::new().unwrap();
    let path = export(
        &store,
        &project,
        ExportFormat::Classification,
        dir.path(),
        &ExportOptions::new(),
    )
    .unwrap();

    // Valid archive with no entries: nothing was classified.
    let mut archive = open_archive(&path);
    assert!(entry_names(&mut archive).is_empty());
}
