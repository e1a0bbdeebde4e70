//! Stroke model: one atomic user edit.
//!
//! A [`Stroke`] is a closed set of variants (see [`StrokeKind`]) drawn by
//! the tool palette: freehand paint, straight line, rectangle, triangle,
//! ellipse, and erasure. Strokes are immutable once constructed. Every
//! constructor validates the geometry, so a `Stroke` value is always
//! well-formed; deserialization goes through the same validation.

use std::f64::consts::{PI, TAU};

use serde::{Deserialize, Serialize};

use crate::config::EditorConfig;
use crate::types::{BoundingBox, ColorTag, EditError, Point, Polyline};

/// Fewest segments used to approximate an ellipse.
const MIN_ELLIPSE_SEGMENTS: usize = 8;

/// Most segments used to approximate an ellipse, whatever its size.
const MAX_ELLIPSE_SEGMENTS: usize = 4096;

/// Raw geometry of a stroke.
///
/// Non-erasure variants carry a [`ColorTag`] for render and export
/// styling. Values of this type are unchecked; wrap them with
/// [`Stroke::try_from`] to validate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StrokeKind {
    /// Freehand paint: every pointer sample in order.
    FreehandPath {
        points: Vec<Point>,
        #[serde(default)]
        color_tag: ColorTag,
    },
    /// A single straight segment.
    StraightLine {
        start: Point,
        end: Point,
        #[serde(default)]
        color_tag: ColorTag,
    },
    /// Axis-aligned rectangle given by two opposite corners.
    Rectangle {
        corner1: Point,
        corner2: Point,
        #[serde(default)]
        color_tag: ColorTag,
    },
    /// Closed triangle.
    Triangle {
        p1: Point,
        p2: Point,
        p3: Point,
        #[serde(default)]
        color_tag: ColorTag,
    },
    /// Axis-aligned ellipse (a circle when both radii match).
    Ellipse {
        center: Point,
        radius_x: f64,
        radius_y: f64,
        #[serde(default)]
        color_tag: ColorTag,
    },
    /// A circle of `radius` swept along `points`; removes geometry it
    /// covers when the document is flattened.
    Erasure { points: Vec<Point>, radius: f64 },
}

/// A validated, immutable stroke.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "StrokeKind", into = "StrokeKind")]
pub struct Stroke {
    kind: StrokeKind,
}

impl Stroke {
    /// Freehand paint path.
    ///
    /// # Errors
    ///
    /// Returns [`EditError::DegenerateGeometry`] for fewer than two
    /// points, coincident points only, or non-finite coordinates.
    pub fn freehand(points: Vec<Point>, color_tag: ColorTag) -> Result<Self, EditError> {
        Self::try_from(StrokeKind::FreehandPath { points, color_tag })
    }

    /// Straight line from `start` to `end`.
    ///
    /// # Errors
    ///
    /// Returns [`EditError::DegenerateGeometry`] if the endpoints coincide
    /// or are not finite.
    pub fn line(start: Point, end: Point, color_tag: ColorTag) -> Result<Self, EditError> {
        Self::try_from(StrokeKind::StraightLine {
            start,
            end,
            color_tag,
        })
    }

    /// Rectangle spanning two opposite corners.
    ///
    /// # Errors
    ///
    /// Returns [`EditError::DegenerateGeometry`] if the rectangle has zero
    /// width or height.
    pub fn rectangle(corner1: Point, corner2: Point, color_tag: ColorTag) -> Result<Self, EditError> {
        Self::try_from(StrokeKind::Rectangle {
            corner1,
            corner2,
            color_tag,
        })
    }

    /// Triangle through three vertices.
    ///
    /// # Errors
    ///
    /// Returns [`EditError::DegenerateGeometry`] if the vertices are
    /// collinear (zero area).
    pub fn triangle(p1: Point, p2: Point, p3: Point, color_tag: ColorTag) -> Result<Self, EditError> {
        Self::try_from(StrokeKind::Triangle {
            p1,
            p2,
            p3,
            color_tag,
        })
    }

    /// Ellipse centred at `center`.
    ///
    /// # Errors
    ///
    /// Returns [`EditError::DegenerateGeometry`] unless both radii are
    /// finite and positive.
    pub fn ellipse(
        center: Point,
        radius_x: f64,
        radius_y: f64,
        color_tag: ColorTag,
    ) -> Result<Self, EditError> {
        Self::try_from(StrokeKind::Ellipse {
            center,
            radius_x,
            radius_y,
            color_tag,
        })
    }

    /// Erasure sweeping a circle of `radius` along `points`.
    ///
    /// The points may coincide (a single click of the eraser).
    ///
    /// # Errors
    ///
    /// Returns [`EditError::DegenerateGeometry`] for fewer than two points
    /// or a radius that is not finite and positive.
    pub fn erasure(points: Vec<Point>, radius: f64) -> Result<Self, EditError> {
        Self::try_from(StrokeKind::Erasure { points, radius })
    }

    /// Ellipse inscribed in the rectangle dragged from `anchor` to
    /// `pointer`.
    ///
    /// # Errors
    ///
    /// Returns [`EditError::DegenerateGeometry`] if the drag has zero width
    /// or height.
    pub fn ellipse_from_drag(
        anchor: Point,
        pointer: Point,
        color_tag: ColorTag,
    ) -> Result<Self, EditError> {
        Self::ellipse(
            anchor.midpoint(pointer),
            (pointer.x - anchor.x).abs() / 2.0,
            (pointer.y - anchor.y).abs() / 2.0,
            color_tag,
        )
    }

    /// Isosceles triangle inscribed in the rectangle dragged from `anchor`
    /// to `pointer`.
    ///
    /// Dragging upwards puts the base on the pointer's row and the apex on
    /// the anchor's row; dragging downwards puts the base on the anchor's
    /// row and the apex on the pointer's row.
    ///
    /// # Errors
    ///
    /// Returns [`EditError::DegenerateGeometry`] if the drag has zero width
    /// or height.
    pub fn triangle_from_drag(
        anchor: Point,
        pointer: Point,
        color_tag: ColorTag,
    ) -> Result<Self, EditError> {
        let apex_x = f64::midpoint(anchor.x, pointer.x);
        let (base_y, apex_y) = if pointer.y < anchor.y {
            (pointer.y, anchor.y)
        } else {
            (anchor.y, pointer.y)
        };
        Self::triangle(
            Point::new(anchor.x, base_y),
            Point::new(pointer.x, base_y),
            Point::new(apex_x, apex_y),
            color_tag,
        )
    }

    /// The stroke's geometry.
    #[must_use]
    pub const fn kind(&self) -> &StrokeKind {
        &self.kind
    }

    /// Styling tag, or `None` for an erasure.
    #[must_use]
    pub const fn color_tag(&self) -> Option<ColorTag> {
        match self.kind {
            StrokeKind::FreehandPath { color_tag, .. }
            | StrokeKind::StraightLine { color_tag, .. }
            | StrokeKind::Rectangle { color_tag, .. }
            | StrokeKind::Triangle { color_tag, .. }
            | StrokeKind::Ellipse { color_tag, .. } => Some(color_tag),
            StrokeKind::Erasure { .. } => None,
        }
    }

    /// Returns `true` for an erasure stroke.
    #[must_use]
    pub const fn is_erasure(&self) -> bool {
        matches!(self.kind, StrokeKind::Erasure { .. })
    }

    /// Axis-aligned bounds of the area the stroke covers.
    ///
    /// For an erasure this includes the swept radius.
    #[must_use]
    pub fn bounding_box(&self) -> BoundingBox {
        match &self.kind {
            StrokeKind::FreehandPath { points, .. } => bounds_of(points),
            StrokeKind::StraightLine { start, end, .. } => bounds_of(&[*start, *end]),
            StrokeKind::Rectangle {
                corner1, corner2, ..
            } => bounds_of(&[*corner1, *corner2]),
            StrokeKind::Triangle { p1, p2, p3, .. } => bounds_of(&[*p1, *p2, *p3]),
            StrokeKind::Ellipse {
                center,
                radius_x,
                radius_y,
                ..
            } => BoundingBox {
                min_x: center.x - radius_x,
                min_y: center.y - radius_y,
                max_x: center.x + radius_x,
                max_y: center.y + radius_y,
            },
            StrokeKind::Erasure { points, radius } => bounds_of(points).expand(*radius),
        }
    }

    /// Render the stroke as a polyline.
    ///
    /// Curved variants are approximated so that no point of the true
    /// curve lies further than `tolerance` from the polyline, up to a cap
    /// of 4096 segments per ellipse. Past the cap (a radius above roughly
    /// `tolerance * 3.4e6`, e.g. 3.4e5 units at 0.1) the deviation grows
    /// with the radius instead. A
    /// non-finite or non-positive tolerance falls back to
    /// [`EditorConfig::DEFAULT_FLATTEN_TOLERANCE`]. The output depends only
    /// on the stroke and the tolerance. An erasure renders as its
    /// (open) swept path.
    #[must_use]
    pub fn as_polyline(&self, tolerance: f64) -> Polyline {
        match &self.kind {
            StrokeKind::FreehandPath { points, .. } => {
                let mut deduped = points.clone();
                deduped.dedup();
                Polyline::new(deduped)
            }
            StrokeKind::StraightLine { start, end, .. } => Polyline::new(vec![*start, *end]),
            StrokeKind::Rectangle {
                corner1, corner2, ..
            } => {
                let b = bounds_of(&[*corner1, *corner2]);
                Polyline::closed(vec![
                    Point::new(b.min_x, b.min_y),
                    Point::new(b.max_x, b.min_y),
                    Point::new(b.max_x, b.max_y),
                    Point::new(b.min_x, b.max_y),
                ])
            }
            StrokeKind::Triangle { p1, p2, p3, .. } => Polyline::closed(vec![*p1, *p2, *p3]),
            StrokeKind::Ellipse {
                center,
                radius_x,
                radius_y,
                ..
            } => {
                let n = ellipse_segments(radius_x.max(*radius_y), tolerance);
                #[allow(clippy::cast_precision_loss)]
                let points = (0..n)
                    .map(|i| {
                        let theta = TAU * i as f64 / n as f64;
                        Point::new(
                            radius_x.mul_add(theta.cos(), center.x),
                            radius_y.mul_add(theta.sin(), center.y),
                        )
                    })
                    .collect();
                Polyline::closed(points)
            }
            StrokeKind::Erasure { points, .. } => Polyline::new(points.clone()),
        }
    }
}

impl TryFrom<StrokeKind> for Stroke {
    type Error = EditError;

    fn try_from(kind: StrokeKind) -> Result<Self, Self::Error> {
        validate(&kind)?;
        Ok(Self { kind })
    }
}

impl From<Stroke> for StrokeKind {
    fn from(stroke: Stroke) -> Self {
        stroke.kind
    }
}

/// Number of chords needed so a circle of `radius` deviates from its
/// inscribed polygon by at most `tolerance`.
///
/// The sagitta of a chord spanning `2π/n` is `r(1 - cos(π/n))`; solving
/// for `n` gives `π / acos(1 - tol/r)`. For an ellipse the larger radius
/// bounds the deviation of uniform-angle sampling.
fn ellipse_segments(radius: f64, tolerance: f64) -> usize {
    let tolerance = if tolerance.is_finite() && tolerance > 0.0 {
        tolerance
    } else {
        EditorConfig::DEFAULT_FLATTEN_TOLERANCE
    };
    let cos_half = (1.0 - tolerance / radius).clamp(-1.0, 1.0);
    let half_angle = cos_half.acos();
    if half_angle <= 0.0 {
        return MAX_ELLIPSE_SEGMENTS;
    }
    let needed = (PI / half_angle).ceil();
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let needed = needed.min(MAX_ELLIPSE_SEGMENTS as f64) as usize;
    needed.clamp(MIN_ELLIPSE_SEGMENTS, MAX_ELLIPSE_SEGMENTS)
}

fn bounds_of(points: &[Point]) -> BoundingBox {
    BoundingBox::from_points(points).unwrap_or(BoundingBox {
        min_x: 0.0,
        min_y: 0.0,
        max_x: 0.0,
        max_y: 0.0,
    })
}

fn degenerate(msg: impl Into<String>) -> EditError {
    EditError::DegenerateGeometry(msg.into())
}

fn require_finite(points: &[Point]) -> Result<(), EditError> {
    if points.iter().all(|p| p.is_finite()) {
        Ok(())
    } else {
        Err(degenerate("coordinates must be finite"))
    }
}

fn require_path(points: &[Point], what: &str) -> Result<(), EditError> {
    if points.len() < 2 {
        return Err(degenerate(format!(
            "{what} needs at least 2 points, got {}",
            points.len()
        )));
    }
    require_finite(points)
}

fn validate(kind: &StrokeKind) -> Result<(), EditError> {
    match kind {
        StrokeKind::FreehandPath { points, .. } => {
            require_path(points, "freehand path")?;
            let b = bounds_of(points);
            if b.width() == 0.0 && b.height() == 0.0 {
                return Err(degenerate("freehand path has zero extent"));
            }
        }
        StrokeKind::StraightLine { start, end, .. } => {
            require_finite(&[*start, *end])?;
            if start == end {
                return Err(degenerate("line endpoints coincide"));
            }
        }
        StrokeKind::Rectangle {
            corner1, corner2, ..
        } => {
            require_finite(&[*corner1, *corner2])?;
            if corner1.x == corner2.x || corner1.y == corner2.y {
                return Err(degenerate("rectangle has zero area"));
            }
        }
        StrokeKind::Triangle { p1, p2, p3, .. } => {
            require_finite(&[*p1, *p2, *p3])?;
            if Polyline::closed(vec![*p1, *p2, *p3]).area() == 0.0 {
                return Err(degenerate("triangle vertices are collinear"));
            }
        }
        StrokeKind::Ellipse {
            center,
            radius_x,
            radius_y,
            ..
        } => {
            require_finite(&[*center])?;
            for r in [radius_x, radius_y] {
                if !r.is_finite() || *r <= 0.0 {
                    return Err(degenerate(format!(
                        "ellipse radii must be finite and positive, got {r}"
                    )));
                }
            }
        }
        StrokeKind::Erasure { points, radius } => {
            require_path(points, "erasure")?;
            if !radius.is_finite() || *radius <= 0.0 {
                return Err(degenerate(format!(
                    "erasure radius must be finite and positive, got {radius}"
                )));
            }
        }
    }
    Ok(())
}
