//! DXF coordinate projection.
//!
//! Document space is image pixels with the origin top-left and y down.
//! DXF uses millimetres with the origin bottom-left and y up, so every
//! point is flipped about the image height and scaled:
//!
//! ```text
//! x_mm = x * mm_per_px / export_scale
//! y_mm = (image_height - y) * mm_per_px / export_scale
//! ```
//!
//! Each flattened polyline becomes one [`DxfPolyline`] (one LWPOLYLINE
//! entity for the writer), carrying its closed flag and a layer named
//! after its color tag.

use serde::{Deserialize, Serialize};

use emboss_edit::{ColorTag, FlatPolyline, Point};

use crate::types::{Dimensions, ExportError};

/// A point in DXF model space, in millimetres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DxfPoint {
    /// Millimetres right of the image's left edge.
    pub x: f64,
    /// Millimetres above the image's bottom edge.
    pub y: f64,
}

/// One polyline entity ready for a DXF writer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DxfPolyline {
    /// Vertices in millimetres.
    pub points: Vec<DxfPoint>,
    /// Maps to the entity's closed flag.
    pub closed: bool,
    /// Layer name, see [`layer_name`].
    pub layer: &'static str,
}

/// DXF layer for geometry with the given tag.
#[must_use]
pub const fn layer_name(tag: ColorTag) -> &'static str {
    match tag {
        ColorTag::AutoMain => "AUTO_MAIN",
        ColorTag::AutoMinor => "AUTO_MINOR",
        ColorTag::Manual => "MANUAL",
    }
}

/// Pixel-to-millimetre mapping for one export.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DxfProjection {
    mm_per_px: f64,
    export_scale: f64,
    image_height: f64,
}

impl DxfProjection {
    /// Default physical size of one image pixel.
    pub const DEFAULT_MM_PER_PX: f64 = 0.25;
    /// Default export scale (original size).
    pub const DEFAULT_EXPORT_SCALE: f64 = 1.0;
    /// Smallest accepted export scale.
    pub const MIN_EXPORT_SCALE: f64 = 0.1;
    /// Largest accepted export scale.
    pub const MAX_EXPORT_SCALE: f64 = 10.0;

    /// Create a projection.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::InvalidScale`] if `mm_per_px` is not finite
    /// and positive, if `export_scale` is outside
    /// [`MIN_EXPORT_SCALE`](Self::MIN_EXPORT_SCALE)..=[`MAX_EXPORT_SCALE`](Self::MAX_EXPORT_SCALE),
    /// or if `image_height` is not finite.
    pub fn new(mm_per_px: f64, export_scale: f64, image_height: f64) -> Result<Self, ExportError> {
        if !mm_per_px.is_finite() || mm_per_px <= 0.0 {
            return Err(ExportError::InvalidScale(format!(
                "mm_per_px must be finite and positive, got {mm_per_px}"
            )));
        }
        if !(Self::MIN_EXPORT_SCALE..=Self::MAX_EXPORT_SCALE).contains(&export_scale) {
            return Err(ExportError::InvalidScale(format!(
                "export_scale must be within {}..={}, got {export_scale}",
                Self::MIN_EXPORT_SCALE,
                Self::MAX_EXPORT_SCALE
            )));
        }
        if !image_height.is_finite() {
            return Err(ExportError::InvalidScale(format!(
                "image_height must be finite, got {image_height}"
            )));
        }
        Ok(Self {
            mm_per_px,
            export_scale,
            image_height,
        })
    }

    /// Projection with default scales for an image of `dimensions`.
    #[must_use]
    pub fn for_image(dimensions: Dimensions) -> Self {
        Self {
            mm_per_px: Self::DEFAULT_MM_PER_PX,
            export_scale: Self::DEFAULT_EXPORT_SCALE,
            image_height: f64::from(dimensions.height),
        }
    }

    /// Physical size of one image pixel, in millimetres.
    #[must_use]
    pub const fn mm_per_px(&self) -> f64 {
        self.mm_per_px
    }

    /// Divisor applied to the pixel size.
    #[must_use]
    pub const fn export_scale(&self) -> f64 {
        self.export_scale
    }

    /// Millimetres per document unit after applying the export scale.
    #[must_use]
    pub fn effective_mm_per_px(&self) -> f64 {
        self.mm_per_px / self.export_scale
    }

    /// Map one document point into DXF space.
    #[must_use]
    pub fn project_point(&self, p: Point) -> DxfPoint {
        let k = self.effective_mm_per_px();
        DxfPoint {
            x: p.x * k,
            y: (self.image_height - p.y) * k,
        }
    }

    /// Map every polyline, preserving order.
    #[must_use]
    pub fn project(&self, polylines: &[FlatPolyline]) -> Vec<DxfPolyline> {
        polylines
            .iter()
            .map(|flat| DxfPolyline {
                points: flat
                    .polyline
                    .points()
                    .iter()
                    .map(|&p| self.project_point(p))
                    .collect(),
                closed: flat.polyline.is_closed(),
                layer: layer_name(flat.tag),
            })
            .collect()
    }

    /// Pixel size reported next to the export control: the image size
    /// multiplied by the export scale, truncated.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn output_size(&self, dimensions: Dimensions) -> Dimensions {
        Dimensions {
            width: (f64::from(dimensions.width) * self.export_scale) as u32,
            height: (f64::from(dimensions.height) * self.export_scale) as u32,
        }
    }

    /// Suggested file name: `{stem}_{width}x{height}.dxf` using
    /// [`output_size`](Self::output_size).
    #[must_use]
    pub fn file_name(&self, stem: &str, dimensions: Dimensions) -> String {
        let size = self.output_size(dimensions);
        format!("{stem}_{}x{}.dxf", size.width, size.height)
    }
}

/// Axis-aligned extent of projected polylines as `(min, max)`, or `None`
/// when there are no points.
#[must_use]
pub fn extent(polylines: &[DxfPolyline]) -> Option<(DxfPoint, DxfPoint)> {
    let mut points = polylines.iter().flat_map(|pl| pl.points.iter());
    let first = *points.next()?;
    Some(points.fold((first, first), |(lo, hi), p| {
        (
            DxfPoint {
                x: lo.x.min(p.x),
                y: lo.y.min(p.y),
            },
            DxfPoint {
                x: hi.x.max(p.x),
                y: hi.y.max(p.y),
            },
        )
    }))
}
