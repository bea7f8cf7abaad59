//! Metadata for uploaded data units.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{ModelError, ProjectId, UserId};

/// Unique identifier for an uploaded file.
pub type FileId = uuid::Uuid;

/// Broad data category of an uploaded file, derived from its MIME type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    Image,
    Text,
    Video,
}

impl DataType {
    /// Derive the data type from a MIME content type such as `image/png`.
    pub fn from_mime(content_type: &str) -> Result<Self, ModelError> {
        match content_type.split('/').next().unwrap_or("") {
            "image" => Ok(DataType::Image),
            "text" => Ok(DataType::Text),
            "video" => Ok(DataType::Video),
            _ => Err(ModelError::UnsupportedContentType(content_type.to_string())),
        }
    }

    /// Lowercase name of this data type.
    pub fn name(&self) -> &'static str {
        match self {
            DataType::Image => "image",
            DataType::Text => "text",
            DataType::Video => "video",
        }
    }
}

/// Whether a file has at least one annotation attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    Annotated,
    #[default]
    Unannotated,
}

/// Metadata for one uploaded data unit (image, text, or video).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileMeta {
    pub file_id: FileId,
    pub project_id: ProjectId,
    pub created_by: UserId,
    /// Original filename as uploaded.
    pub filename: String,
    /// MIME content type recorded at upload.
    pub content_type: String,
    pub data_type: DataType,
    /// Content size in bytes.
    pub size: u64,
    pub created_at: DateTime<Utc>,
    /// Pixel width; image and video files only.
    pub width: Option<u32>,
    /// Pixel height; image and video files only.
    pub height: Option<u32>,
    pub status: FileStatus,
}

impl FileMeta {
    /// Pixel dimensions as a pair, when both are known.
    pub fn dimensions(&self) -> Option<(u32, u32)> {
        self.width.zip(self.height)
    }

    /// Name used for this file's entry inside an export archive: the
    /// file ID plus the original filename's extension, if any.
    pub fn archive_name(&self) -> String {
        match Path::new(&self.filename).extension().and_then(|e| e.to_str()) {
            Some(ext) => format!("{}.{}", self.file_id, ext),
            None => self.file_id.to_string(),
        }
    }
}
