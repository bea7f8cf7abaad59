//! Coordinate types for annotation geometry.
//!
//! Stored annotations use proportions of the image size (top-left
//! anchored), so the same shape applies to any pixel resolution of the
//! underlying image. Export formats want absolute pixels in either
//! corner or center form; this module provides the value types and the
//! conversions between them. Pure values, no I/O.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Minimum number of points required for a valid polygon.
pub const MIN_POLYGON_POINTS: usize = 3;

/// Errors produced when constructing or converting geometry values.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    /// A coordinate was NaN or infinite.
    #[error("coordinate values must be finite")]
    NonFinite,

    /// Box width or height was zero or negative.
    #[error("box width and height must be positive (got {width} x {height})")]
    EmptyBox {
        /// Offending width.
        width: f64,
        /// Offending height.
        height: f64,
    },

    /// Image dimensions used for scaling were zero.
    #[error("image dimensions must be positive (got {width} x {height})")]
    EmptyImage {
        /// Image width in pixels.
        width: u32,
        /// Image height in pixels.
        height: u32,
    },

    /// Fewer points than a polygon needs.
    #[error("a polygon requires at least 3 points (got {0})")]
    DegeneratePolygon(usize),
}

/// A single 2D point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    /// Create a point, rejecting non-finite coordinates.
    pub fn new(x: f64, y: f64) -> Result<Self, GeometryError> {
        if !x.is_finite() || !y.is_finite() {
            return Err(GeometryError::NonFinite);
        }
        Ok(Self { x, y })
    }
}

/// Axis-aligned box in normalized image coordinates.
///
/// `x`/`y` are the top-left corner; all four fields are proportions of
/// the image width/height in [0, 1]-ish space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    /// Create a normalized box, rejecting non-finite values and empty extents.
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Result<Self, GeometryError> {
        if !(x.is_finite() && y.is_finite() && width.is_finite() && height.is_finite()) {
            return Err(GeometryError::NonFinite);
        }
        if width <= 0.0 || height <= 0.0 {
            return Err(GeometryError::EmptyBox { width, height });
        }
        Ok(Self {
            x,
            y,
            width,
            height,
        })
    }

    /// Scale to absolute pixels for an image of the given size.
    pub fn to_pixels(&self, image_width: u32, image_height: u32) -> Result<PixelBox, GeometryError> {
        if image_width == 0 || image_height == 0 {
            return Err(GeometryError::EmptyImage {
                width: image_width,
                height: image_height,
            });
        }
        let w = f64::from(image_width);
        let h = f64::from(image_height);
        Ok(PixelBox {
            x: self.x * w,
            y: self.y * h,
            width: self.width * w,
            height: self.height * h,
        })
    }
}

/// Axis-aligned box in absolute pixels, top-left anchored.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PixelBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl PixelBox {
    /// Scale back to normalized proportions of the given image size.
    pub fn to_normalized(
        &self,
        image_width: u32,
        image_height: u32,
    ) -> Result<BoundingBox, GeometryError> {
        if image_width == 0 || image_height == 0 {
            return Err(GeometryError::EmptyImage {
                width: image_width,
                height: image_height,
            });
        }
        let w = f64::from(image_width);
        let h = f64::from(image_height);
        BoundingBox::new(self.x / w, self.y / h, self.width / w, self.height / h)
    }

    /// Re-anchor on the box center.
    pub fn to_center(&self) -> CenterBox {
        CenterBox {
            x: self.x + self.width / 2.0,
            y: self.y + self.height / 2.0,
            width: self.width,
            height: self.height,
        }
    }
}

/// Axis-aligned box in absolute pixels, anchored on its center.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CenterBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl CenterBox {
    /// Re-anchor on the top-left corner.
    pub fn to_corner(&self) -> PixelBox {
        PixelBox {
            x: self.x - self.width / 2.0,
            y: self.y - self.height / 2.0,
            width: self.width,
            height: self.height,
        }
    }
}

/// Closed polygon in normalized image coordinates.
///
/// Points follow the same proportion-of-image-size convention as
/// [`BoundingBox`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    points: Vec<Point>,
}

impl Polygon {
    /// Create a polygon, rejecting fewer than three points and
    /// non-finite coordinates.
    pub fn new(points: Vec<Point>) -> Result<Self, GeometryError> {
        if points.len() < MIN_POLYGON_POINTS {
            return Err(GeometryError::DegeneratePolygon(points.len()));
        }
        if points.iter().any(|p| !p.x.is_finite() || !p.y.is_finite()) {
            return Err(GeometryError::NonFinite);
        }
        Ok(Self { points })
    }

    /// The polygon's vertices in order.
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Scale every vertex to absolute pixels for the given image size.
    pub fn to_pixels(
        &self,
        image_width: u32,
        image_height: u32,
    ) -> Result<Vec<Point>, GeometryError> {
        if image_width == 0 || image_height == 0 {
            return Err(GeometryError::EmptyImage {
                width: image_width,
                height: image_height,
            });
        }
        let w = f64::from(image_width);
        let h = f64::from(image_height);
        Ok(self
            .points
            .iter()
            .map(|p| Point {
                x: p.x * w,
                y: p.y * h,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f64 = 1e-6;

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < TOLERANCE, "{a} != {b}");
    }

    #[test]
    fn test_pixel_roundtrip() {
        let boxes = [
            (0.1, 0.1, 0.2, 0.2),
            (0.0, 0.0, 1.0, 1.0),
            (0.333, 0.125, 0.0625, 0.55),
        ];
        for (x, y, w, h) in boxes {
            let bbox = BoundingBox::new(x, y, w, h).unwrap();
            let back = bbox.to_pixels(1920, 1080).unwrap().to_normalized(1920, 1080).unwrap();
            assert_close(back.x, x);
            assert_close(back.y, y);
            assert_close(back.width, w);
            assert_close(back.height, h);
        }
    }

    #[test]
    fn test_center_corner_roundtrip() {
        let pixel = PixelBox {
            x: 10.0,
            y: 20.0,
            width: 30.0,
            height: 40.0,
        };
        let back = pixel.to_center().to_corner();
        assert_close(back.x, pixel.x);
        assert_close(back.y, pixel.y);
        assert_close(back.width, pixel.width);
        assert_close(back.height, pixel.height);
    }

    #[test]
    fn test_center_conversion_values() {
        // {0.1, 0.1, 0.2, 0.2} on a 100x100 image is a 20x20 box whose
        // center sits at (20, 20).
        let bbox = BoundingBox::new(0.1, 0.1, 0.2, 0.2).unwrap();
        let center = bbox.to_pixels(100, 100).unwrap().to_center();
        assert_close(center.x, 20.0);
        assert_close(center.y, 20.0);
        assert_close(center.width, 20.0);
        assert_close(center.height, 20.0);
    }

    #[test]
    fn test_rejects_non_finite() {
        assert_eq!(
            BoundingBox::new(f64::NAN, 0.0, 0.5, 0.5),
            Err(GeometryError::NonFinite)
        );
        assert_eq!(Point::new(0.0, f64::INFINITY), Err(GeometryError::NonFinite));
    }

    #[test]
    fn test_rejects_empty_box() {
        assert!(matches!(
            BoundingBox::new(0.0, 0.0, 0.0, 0.5),
            Err(GeometryError::EmptyBox { .. })
        ));
        assert!(matches!(
            BoundingBox::new(0.0, 0.0, 0.5, -0.1),
            Err(GeometryError::EmptyBox { .. })
        ));
    }

    #[test]
    fn test_rejects_zero_image_dimensions() {
        let bbox = BoundingBox::new(0.1, 0.1, 0.2, 0.2).unwrap();
        assert!(matches!(
            bbox.to_pixels(0, 100),
            Err(GeometryError::EmptyImage { .. })
        ));
    }

    #[test]
    fn test_polygon_requires_three_points() {
        let two = vec![Point { x: 0.1, y: 0.1 }, Point { x: 0.2, y: 0.2 }];
        assert_eq!(
            Polygon::new(two),
            Err(GeometryError::DegeneratePolygon(2))
        );

        let three = vec![
            Point { x: 0.1, y: 0.1 },
            Point { x: 0.2, y: 0.2 },
            Point { x: 0.1, y: 0.3 },
        ];
        assert!(Polygon::new(three).is_ok());
    }

    #[test]
    fn test_polygon_to_pixels() {
        let polygon = Polygon::new(vec![
            Point { x: 0.0, y: 0.0 },
            Point { x: 0.5, y: 0.0 },
            Point { x: 0.5, y: 0.5 },
        ])
        .unwrap();
        let pixels = polygon.to_pixels(200, 100).unwrap();
        assert_close(pixels[1].x, 100.0);
        assert_close(pixels[2].y, 50.0);
    }
}
