//! Folder-per-label classification export.
//!
//! Archive layout:
//!
//! ```text
//! data/
//!   <label>/
//!     <original filename>
//!     ...
//!   <label>/
//!     ...
//! ```
//!
//! Every classification annotation contributes its file under the
//! annotation's label; other annotation kinds are ignored.

use std::collections::HashSet;
use std::io::{self, Seek, Write};
use std::path::Path;

use zip::ZipWriter;

use crate::export::formats::entry_options;
use crate::export::{ExportContext, ExportError, ExportOptions};
use crate::model::{AnnotationKind, FileMeta, Project};

pub(crate) fn populate<W: Write + Seek>(
    project: &Project,
    ctx: &ExportContext<'_>,
    zip: &mut ZipWriter<W>,
    options: &ExportOptions,
) -> Result<(), ExportError> {
    let annotations = ctx.repo.annotations_by_project(project.project_id)?;

    let mut written: HashSet<String> = HashSet::new();

    for annotation in &annotations {
        options.cancel.check()?;

        if annotation.kind() != AnnotationKind::Classification {
            log::debug!(
                "skipping {} annotation {} in classification export",
                annotation.kind().name(),
                annotation.annotation_id
            );
            continue;
        }

        let (mut blob, meta) = ctx.blobs.open_blob(annotation.file_id)?;
        let label = annotation.label.trim();

        let mut entry_name = format!("data/{}/{}", label, meta.filename);
        if !written.insert(entry_name.clone()) {
            // Another file under this label already claimed the name;
            // fall back to a file-ID-qualified one.
            let fallback = format!("data/{}/{}", label, disambiguated(&meta));
            if !written.insert(fallback.clone()) {
                // Same file labeled twice with the same label; the
                // content is already in the archive.
                log::debug!(
                    "duplicate classification entry for file {} under label '{}'; skipping",
                    annotation.file_id,
                    label
                );
                continue;
            }
            entry_name = fallback;
        }

        zip.start_file(entry_name, entry_options())?;
        io::copy(&mut blob, zip)?;
    }

    Ok(())
}

/// `{stem}_{fileId}.{ext}` for collision fallback.
fn disambiguated(meta: &FileMeta) -> String {
    let path = Path::new(&meta.filename);
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("file");
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => format!("{}_{}.{}", stem, meta.file_id, ext),
        None => format!("{}_{}", stem, meta.file_id),
    }
}
