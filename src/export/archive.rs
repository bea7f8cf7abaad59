//! Archive lifecycle for a single export run.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::Utc;
use rand::Rng;
use zip::ZipWriter;

use crate::export::{ExportContext, ExportError, ExportFormat, ExportOptions};
use crate::model::ProjectId;

/// Random characters appended to archive filenames so two exports of
/// the same project in the same second cannot collide.
const SUFFIX_LEN: usize = 6;

/// Owns the full lifecycle of one export: resolve the project, open the
/// archive, run the format strategy, and guarantee that a failed run
/// leaves no partial file on disk.
pub(crate) struct ArchiveBuilder {
    project_id: ProjectId,
    format: ExportFormat,
    dir: PathBuf,
}

impl ArchiveBuilder {
    pub(crate) fn new(project_id: ProjectId, format: ExportFormat, dir: &Path) -> Self {
        Self {
            project_id,
            format,
            dir: dir.to_path_buf(),
        }
    }

    /// Archive filename: `{projectId}_{format}_{timestamp}_{suffix}.zip`.
    fn archive_path(&self) -> PathBuf {
        let stamp = Utc::now().format("%Y%m%dT%H%M%S");
        let suffix: String = rand::rng()
            .sample_iter(&rand::distr::Alphanumeric)
            .take(SUFFIX_LEN)
            .map(char::from)
            .collect();
        self.dir.join(format!(
            "{}_{}_{}_{}.zip",
            self.project_id,
            self.format.name(),
            stamp,
            suffix
        ))
    }

    pub(crate) fn build(
        &self,
        ctx: &ExportContext<'_>,
        options: &ExportOptions,
    ) -> Result<PathBuf, ExportError> {
        let project = ctx
            .repo
            .project_by_id(self.project_id)?
            .ok_or_else(|| ExportError::NotFound(format!("project {}", self.project_id)))?;

        let path = self.archive_path();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        log::info!(
            "exporting project '{}' ({}) as {} to {:?}",
            project.name,
            project.project_id,
            self.format,
            path
        );

        let file = fs::File::create(&path)?;
        let mut zip = ZipWriter::new(file);

        let result = match self.format.populate(&project, ctx, &mut zip, options) {
            Ok(()) => zip.finish().map(|_| ()).map_err(ExportError::from),
            Err(err) => {
                drop(zip);
                Err(err)
            }
        };

        match result {
            Ok(()) => {
                log::info!("finished {} export of project {}", self.format, project.project_id);
                Ok(path)
            }
            Err(err) => {
                remove_partial(&path);
                Err(err)
            }
        }
    }
}

/// Best-effort removal of a partially-written archive. The file never
/// having been created is fine; anything else is logged and swallowed
/// so the original export error stays what the caller sees.
fn remove_partial(path: &Path) {
    if let Err(err) = fs::remove_file(path) {
        if err.kind() != io::ErrorKind::NotFound {
            log::warn!("failed to remove partial archive {:?}: {}", path, err);
        }
    }
}
