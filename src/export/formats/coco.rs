//! COCO dataset export.
//!
//! Archive layout:
//!
//! ```text
//! /
//!   <fileId>.<ext>
//!   <fileId>.<ext>
//!   ...
//!   manifest.json
//! ```
//!
//! `manifest.json` follows the COCO object-detection schema: `info`,
//! `images`, `annotations`, `categories`. Only object-detection
//! annotations can be encoded; encountering any other kind aborts the
//! export.

use std::collections::HashMap;
use std::io::{self, Seek, Write};

use chrono::{Datelike, Utc};
use serde::Serialize;
use zip::ZipWriter;

use crate::export::formats::entry_options;
use crate::export::{ExportContext, ExportError, ExportOptions};
use crate::model::{AnnotationShape, DataType, FileId, Project};

const FORMAT: &str = "coco";

/// An image already written to the archive, keyed by file ID.
struct ExportedImage {
    image_id: u64,
    width: u32,
    height: u32,
}

pub(crate) fn populate<W: Write + Seek>(
    project: &Project,
    ctx: &ExportContext<'_>,
    zip: &mut ZipWriter<W>,
    options: &ExportOptions,
) -> Result<(), ExportError> {
    let mut manifest = CocoManifest {
        info: CocoInfo::for_project(project),
        images: Vec::new(),
        annotations: Vec::new(),
        categories: Vec::new(),
    };

    let image_map = export_images(project, ctx, zip, &mut manifest, options)?;
    export_annotations(project, ctx, &image_map, &mut manifest)?;

    let json = serde_json::to_string_pretty(&manifest)?;
    zip.start_file("manifest.json", entry_options())?;
    zip.write_all(json.as_bytes())?;
    Ok(())
}

/// Copy every image file into the archive and fill the manifest's
/// `images` section. Non-image files cannot appear in a COCO dataset
/// and are skipped.
fn export_images<W: Write + Seek>(
    project: &Project,
    ctx: &ExportContext<'_>,
    zip: &mut ZipWriter<W>,
    manifest: &mut CocoManifest,
    options: &ExportOptions,
) -> Result<HashMap<FileId, ExportedImage>, ExportError> {
    let files = ctx.repo.files_by_project(project.project_id)?;

    let mut image_map = HashMap::new();
    let mut image_id = 0u64;

    for file in files {
        options.cancel.check()?;

        if file.data_type != DataType::Image {
            log::warn!(
                "skipping file {} in {} export: {} is not an image",
                file.file_id,
                FORMAT,
                file.data_type.name()
            );
            continue;
        }

        let (width, height) = file.dimensions().ok_or(ExportError::MissingDimensions {
            format: FORMAT,
            file_id: file.file_id,
        })?;

        let entry_name = file.archive_name();
        manifest.images.push(CocoImage {
            id: image_id,
            file_name: entry_name.clone(),
            width,
            height,
            date_captured: file.created_at.to_rfc3339(),
        });

        let (mut blob, _) = ctx.blobs.open_blob(file.file_id)?;
        zip.start_file(entry_name, entry_options())?;
        io::copy(&mut blob, zip)?;

        image_map.insert(
            file.file_id,
            ExportedImage {
                image_id,
                width,
                height,
            },
        );
        image_id += 1;
    }

    Ok(image_map)
}

/// Fill the manifest's `annotations` and `categories` sections.
///
/// Category IDs are dense and assigned in first-seen order over the
/// annotation stream, so a label keeps the same ID for the whole run.
fn export_annotations(
    project: &Project,
    ctx: &ExportContext<'_>,
    image_map: &HashMap<FileId, ExportedImage>,
    manifest: &mut CocoManifest,
) -> Result<(), ExportError> {
    let annotations = ctx.repo.annotations_by_project(project.project_id)?;

    let mut category_ids: HashMap<String, u32> = HashMap::new();
    let mut annotation_id = 0u64;

    for annotation in &annotations {
        // Annotations on files that never made it into the archive
        // (non-images, files from a racing upload) have nothing to
        // reference.
        let Some(image) = image_map.get(&annotation.file_id) else {
            continue;
        };

        let category_id = match category_ids.get(&annotation.label) {
            Some(&id) => id,
            None => {
                let id = manifest.categories.len() as u32;
                category_ids.insert(annotation.label.clone(), id);
                manifest.categories.push(CocoCategory {
                    id,
                    name: annotation.label.clone(),
                });
                id
            }
        };

        let AnnotationShape::ObjectDetection { bbox } = &annotation.shape else {
            return Err(ExportError::UnsupportedAnnotation {
                format: FORMAT,
                kind: annotation.kind().name(),
            });
        };

        // Stored boxes are normalized top-left; COCO wants absolute
        // pixels anchored on the box center, rounded to integers.
        let pixel = bbox.to_pixels(image.width, image.height)?;
        let center = pixel.to_center();

        manifest.annotations.push(CocoAnnotation {
            id: annotation_id,
            image_id: image.image_id,
            category_id,
            area: pixel.width * pixel.height,
            bbox: [
                center.x.round() as i64,
                center.y.round() as i64,
                center.width.round() as i64,
                center.height.round() as i64,
            ],
        });
        annotation_id += 1;
    }

    Ok(())
}

// COCO wire structs.

#[derive(Debug, Serialize)]
struct CocoManifest {
    info: CocoInfo,
    images: Vec<CocoImage>,
    annotations: Vec<CocoAnnotation>,
    categories: Vec<CocoCategory>,
}

#[derive(Debug, Serialize)]
struct CocoInfo {
    year: i32,
    version: String,
    description: String,
    contributor: String,
    date_created: String,
}

impl CocoInfo {
    fn for_project(project: &Project) -> Self {
        let now = Utc::now();
        Self {
            year: now.year(),
            version: "1.0".to_string(),
            description: format!("labelkit export - {}", project.name),
            contributor: "labelkit".to_string(),
            date_created: now.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize)]
struct CocoImage {
    id: u64,
    file_name: String,
    width: u32,
    height: u32,
    date_captured: String,
}

#[derive(Debug, Serialize)]
struct CocoAnnotation {
    id: u64,
    image_id: u64,
    category_id: u32,
    area: f64,
    bbox: [i64; 4],
}

#[derive(Debug, Serialize)]
struct CocoCategory {
    id: u32,
    name: String,
}
