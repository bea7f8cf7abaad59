//! Dataset export core for an annotation platform backend.
//!
//! Projects collect uploaded files and their annotations
//! (classification labels, object-detection boxes, segmentation
//! polygons); this crate materializes a project as a downloadable ZIP
//! archive in one of several ML dataset layouts:
//!
//! - **COCO**: `manifest.json` plus image copies at the archive root
//! - **YOLO**: `data.yaml`, a shuffled train/val image split, and
//!   per-image label files
//! - **Classification**: one folder per label under `data/`
//!
//! Metadata and file content are reached through the
//! [`store::MetadataRepository`] and [`store::BlobStore`] traits, so
//! any document store and blob backend plug in; [`store::MemoryStore`]
//! implements both in-process for tests and embedding.
//!
//! Annotations store geometry as proportions of the image size
//! ([`geometry::BoundingBox`], [`geometry::Polygon`]); the export
//! strategies convert to each format's absolute or center-anchored
//! conventions on the way out.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use labelkit::config::ExportConfig;
//! use labelkit::export::{ExportFormat, ExportManager, ExportOptions};
//!
//! let manager = ExportManager::new(&repo, &blobs, ExportConfig::default());
//! let archive = manager.export_project(
//!     project_id,
//!     ExportFormat::Yolo,
//!     None,
//!     &ExportOptions::new().validation_ratio(0.2),
//! )?;
//! // Stream `archive` to the client, then delete it.
//! ```

pub mod config;
pub mod export;
pub mod geometry;
pub mod model;
pub mod store;
