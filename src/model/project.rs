//! Projects: the unit of organization and export.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::{AnnotationKind, DataType, UserId};

/// Unique identifier for a project.
pub type ProjectId = Uuid;

/// Per-project settings fixed at creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectSettings {
    /// Data category this project accepts.
    pub data_type: DataType,
    /// Primary annotation style for the project.
    pub annotation_kind: AnnotationKind,
    pub is_public: bool,
    /// Label vocabulary offered to annotators.
    pub labels: Vec<String>,
}

/// A collection of files and annotations exported as one dataset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub project_id: ProjectId,
    pub name: String,
    pub description: String,
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub settings: ProjectSettings,
}

impl Project {
    /// Create a project with a fresh ID and matching timestamps.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        created_by: UserId,
        settings: ProjectSettings,
    ) -> Self {
        let now = Utc::now();
        Self {
            project_id: Uuid::new_v4(),
            name: name.into(),
            description: description.into(),
            created_by,
            created_at: now,
            updated_at: now,
            settings,
        }
    }
}
