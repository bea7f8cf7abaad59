//! YOLO dataset export.
//!
//! Archive layout:
//!
//! ```text
//! /
//!   data.yaml
//!   images/
//!     train/
//!       <fileId>.<ext>
//!       ...
//!     val/
//!       <fileId>.<ext>
//!       ...
//!   labels/
//!     train/
//!       <fileId>.txt
//!       ...
//!     val/
//!       <fileId>.txt
//!       ...
//! ```
//!
//! Image files are split uniformly at random into `train` and `val` by
//! the configured validation ratio. Label files carry one line per
//! object-detection annotation; other kinds are skipped with a warning.

use std::collections::{BTreeMap, HashMap};
use std::io::{self, Seek, Write};

use rand::seq::SliceRandom;
use zip::ZipWriter;

use crate::export::formats::entry_options;
use crate::export::{ExportContext, ExportError, ExportOptions};
use crate::model::{AnnotationShape, DataType, FileId, Project};

const FORMAT: &str = "yolo";

/// Which half of the train/validation split a file landed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Subset {
    Train,
    Val,
}

impl Subset {
    fn dir_name(&self) -> &'static str {
        match self {
            Subset::Train => "train",
            Subset::Val => "val",
        }
    }
}

pub(crate) fn populate<W: Write + Seek>(
    project: &Project,
    ctx: &ExportContext<'_>,
    zip: &mut ZipWriter<W>,
    options: &ExportOptions,
) -> Result<(), ExportError> {
    let ratio = options.validation_ratio;
    if !(0.0..=1.0).contains(&ratio) {
        return Err(ExportError::InvalidOption(format!(
            "validation_ratio must be within [0, 1], got {ratio}"
        )));
    }

    let image_dirs = export_images(project, ctx, zip, ratio, options)?;
    let (lines_by_file, class_names) = collect_annotations(project, ctx)?;
    write_labels(zip, &lines_by_file, &image_dirs)?;
    write_manifest(zip, &class_names)?;
    Ok(())
}

/// Copy every image file into its split subdirectory.
///
/// The split shuffles the image list and takes the first
/// `ceil(ratio * N)` files as validation, so every image lands in
/// exactly one subset and the validation count is exact.
fn export_images<W: Write + Seek>(
    project: &Project,
    ctx: &ExportContext<'_>,
    zip: &mut ZipWriter<W>,
    ratio: f64,
    options: &ExportOptions,
) -> Result<HashMap<FileId, Subset>, ExportError> {
    let files = ctx.repo.files_by_project(project.project_id)?;

    let mut images = Vec::with_capacity(files.len());
    for file in files {
        if file.data_type != DataType::Image {
            log::warn!(
                "skipping file {} in {} export: {} is not an image",
                file.file_id,
                FORMAT,
                file.data_type.name()
            );
            continue;
        }
        images.push(file);
    }

    images.shuffle(&mut rand::rng());
    let val_count = (ratio * images.len() as f64).ceil() as usize;

    let mut image_dirs = HashMap::new();
    for (index, file) in images.iter().enumerate() {
        options.cancel.check()?;

        let subset = if index < val_count {
            Subset::Val
        } else {
            Subset::Train
        };

        let (mut blob, _) = ctx.blobs.open_blob(file.file_id)?;
        zip.start_file(
            format!("images/{}/{}", subset.dir_name(), file.archive_name()),
            entry_options(),
        )?;
        io::copy(&mut blob, zip)?;

        image_dirs.insert(file.file_id, subset);
    }

    Ok(image_dirs)
}

/// Group label lines by file and assign class indices.
///
/// Class indices are assigned in first-seen order over every
/// annotation, including kinds YOLO cannot encode, so the `names`
/// table is stable regardless of which annotations survive.
fn collect_annotations(
    project: &Project,
    ctx: &ExportContext<'_>,
) -> Result<(BTreeMap<FileId, Vec<String>>, Vec<String>), ExportError> {
    let annotations = ctx.repo.annotations_by_project(project.project_id)?;

    let mut class_indices: HashMap<String, usize> = HashMap::new();
    let mut class_names: Vec<String> = Vec::new();
    let mut lines: BTreeMap<FileId, Vec<String>> = BTreeMap::new();

    for annotation in &annotations {
        let class_index = match class_indices.get(&annotation.label) {
            Some(&index) => index,
            None => {
                let index = class_names.len();
                class_indices.insert(annotation.label.clone(), index);
                class_names.push(annotation.label.clone());
                index
            }
        };

        match &annotation.shape {
            AnnotationShape::ObjectDetection { bbox } => {
                // Boxes are stored in the normalized form YOLO label
                // files carry; emit the values unchanged.
                lines.entry(annotation.file_id).or_default().push(format!(
                    "{} {} {} {} {}",
                    class_index, bbox.x, bbox.y, bbox.width, bbox.height
                ));
            }
            other => {
                log::warn!(
                    "{} export does not support {} annotations; skipping {}",
                    FORMAT,
                    other.kind().name(),
                    annotation.annotation_id
                );
            }
        }
    }

    Ok((lines, class_names))
}

/// Write one `labels/{split}/{fileId}.txt` per annotated, exported file.
fn write_labels<W: Write + Seek>(
    zip: &mut ZipWriter<W>,
    lines_by_file: &BTreeMap<FileId, Vec<String>>,
    image_dirs: &HashMap<FileId, Subset>,
) -> Result<(), ExportError> {
    for (file_id, lines) in lines_by_file {
        let Some(subset) = image_dirs.get(file_id) else {
            log::warn!(
                "file {} has label lines but no exported image; skipping its labels",
                file_id
            );
            continue;
        };

        zip.start_file(
            format!("labels/{}/{}.txt", subset.dir_name(), file_id),
            entry_options(),
        )?;
        zip.write_all(lines.join("\n").as_bytes())?;
    }
    Ok(())
}

/// Write the top-level `data.yaml` describing the dataset.
///
/// The manifest is flat key/value lines plus an index-to-label map, so
/// it is emitted directly; label names are written verbatim.
fn write_manifest<W: Write + Seek>(
    zip: &mut ZipWriter<W>,
    class_names: &[String],
) -> Result<(), ExportError> {
    let mut yaml = String::from("path: .\ntrain: images/train\nval: images/val\n");
    if class_names.is_empty() {
        yaml.push_str("names: {}\n");
    } else {
        yaml.push_str("names:\n");
        for (index, name) in class_names.iter().enumerate() {
            yaml.push_str(&format!("  {index}: {name}\n"));
        }
    }

    zip.start_file("data.yaml", entry_options())?;
    zip.write_all(yaml.as_bytes())?;
    Ok(())
}
