//! Export format strategies.
//!
//! One module per target layout; each exposes a `populate` function
//! that writes the format's entries into an already-open archive. The
//! surrounding lifecycle (path allocation, cleanup on failure) lives in
//! the archive builder.

pub(crate) mod classification;
pub(crate) mod coco;
pub(crate) mod yolo;

#[cfg(test)]
mod tests;

use zip::CompressionMethod;
use zip::write::SimpleFileOptions;

/// Entry options shared by every strategy.
pub(crate) fn entry_options() -> SimpleFileOptions {
    SimpleFileOptions::default().compression_method(CompressionMethod::Deflated)
}
