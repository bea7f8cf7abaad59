//! Annotation records and their shape payloads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::geometry::{BoundingBox, Polygon};
use crate::model::{FileId, ModelError, ProjectId, UserId};

/// Unique identifier for an annotation.
pub type AnnotationId = Uuid;

/// Discriminator for the three supported annotation styles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnnotationKind {
    Classification,
    ObjectDetection,
    Segmentation,
}

impl AnnotationKind {
    /// Lowercase name of this annotation kind.
    pub fn name(&self) -> &'static str {
        match self {
            AnnotationKind::Classification => "classification",
            AnnotationKind::ObjectDetection => "object_detection",
            AnnotationKind::Segmentation => "segmentation",
        }
    }
}

/// Shape payload of an annotation.
///
/// The payload variant is the kind: a classification annotation cannot
/// carry stray box or polygon coordinates, and switching kinds replaces
/// the payload wholesale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AnnotationShape {
    /// Whole-file label with no geometry.
    Classification,
    /// Normalized bounding box around one object.
    ObjectDetection { bbox: BoundingBox },
    /// Normalized polygon outlining one region.
    Segmentation { points: Polygon },
}

impl AnnotationShape {
    /// The kind this payload belongs to.
    pub fn kind(&self) -> AnnotationKind {
        match self {
            AnnotationShape::Classification => AnnotationKind::Classification,
            AnnotationShape::ObjectDetection { .. } => AnnotationKind::ObjectDetection,
            AnnotationShape::Segmentation { .. } => AnnotationKind::Segmentation,
        }
    }
}

/// A label attached to exactly one file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub annotation_id: AnnotationId,
    pub file_id: FileId,
    pub project_id: ProjectId,
    pub created_by: UserId,
    pub label: String,
    /// Labeling confidence in [0, 1]; 1.0 for human annotations.
    pub confidence: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub shape: AnnotationShape,
}

impl Annotation {
    fn with_shape(
        file_id: FileId,
        project_id: ProjectId,
        created_by: UserId,
        label: impl Into<String>,
        shape: AnnotationShape,
    ) -> Self {
        let now = Utc::now();
        Self {
            annotation_id: Uuid::new_v4(),
            file_id,
            project_id,
            created_by,
            label: label.into(),
            confidence: 1.0,
            created_at: now,
            updated_at: now,
            shape,
        }
    }

    /// Create a whole-file classification annotation.
    pub fn classification(
        file_id: FileId,
        project_id: ProjectId,
        created_by: UserId,
        label: impl Into<String>,
    ) -> Self {
        Self::with_shape(
            file_id,
            project_id,
            created_by,
            label,
            AnnotationShape::Classification,
        )
    }

    /// Create an object-detection annotation around `bbox`.
    pub fn object_detection(
        file_id: FileId,
        project_id: ProjectId,
        created_by: UserId,
        label: impl Into<String>,
        bbox: BoundingBox,
    ) -> Self {
        Self::with_shape(
            file_id,
            project_id,
            created_by,
            label,
            AnnotationShape::ObjectDetection { bbox },
        )
    }

    /// Create a segmentation annotation outlining `points`.
    pub fn segmentation(
        file_id: FileId,
        project_id: ProjectId,
        created_by: UserId,
        label: impl Into<String>,
        points: Polygon,
    ) -> Self {
        Self::with_shape(
            file_id,
            project_id,
            created_by,
            label,
            AnnotationShape::Segmentation { points },
        )
    }

    /// The annotation's kind, derived from its payload.
    pub fn kind(&self) -> AnnotationKind {
        self.shape.kind()
    }

    /// Set the labeling confidence, rejecting values outside [0, 1].
    pub fn with_confidence(mut self, confidence: f64) -> Result<Self, ModelError> {
        if !(0.0..=1.0).contains(&confidence) {
            return Err(ModelError::InvalidConfidence(confidence));
        }
        self.confidence = confidence;
        Ok(self)
    }
}
