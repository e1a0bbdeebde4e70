//! Shared value types for the contour correction model.

use serde::{Deserialize, Serialize};

/// A 2D point in document coordinates.
///
/// Document space is fixed: it does not move when the view is zoomed or
/// panned. For traced images one document unit is one source pixel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal position (document units from the left edge).
    pub x: f64,
    /// Vertical position (document units from the top edge).
    pub y: f64,
}

impl Point {
    /// Create a new point.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Squared Euclidean distance to another point.
    ///
    /// Avoids the square root for comparison purposes.
    #[must_use]
    pub fn distance_squared(self, other: Self) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx.mul_add(dx, dy * dy)
    }

    /// Euclidean distance to another point.
    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        self.distance_squared(other).sqrt()
    }

    /// Point halfway between `self` and `other`.
    #[must_use]
    pub fn midpoint(self, other: Self) -> Self {
        Self::new(f64::midpoint(self.x, other.x), f64::midpoint(self.y, other.y))
    }

    /// Returns `true` if both coordinates are finite.
    #[must_use]
    pub const fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// A 2D point in view (device pixel) coordinates.
///
/// Kept distinct from [`Point`] so a view-space position can never be
/// stored as document geometry without going through
/// [`crate::coords::to_document`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewPoint {
    /// Horizontal position in view pixels.
    pub x: f64,
    /// Vertical position in view pixels.
    pub y: f64,
}

impl ViewPoint {
    /// Create a new view-space point.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A sequence of connected points, optionally closed back to its start.
///
/// A closed polyline implicitly has a final segment from the last point
/// to the first; the first point is not repeated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polyline {
    points: Vec<Point>,
    #[serde(default)]
    closed: bool,
}

impl Polyline {
    /// Create a new open polyline.
    #[must_use]
    pub const fn new(points: Vec<Point>) -> Self {
        Self {
            points,
            closed: false,
        }
    }

    /// Create a new closed polyline.
    #[must_use]
    pub const fn closed(points: Vec<Point>) -> Self {
        Self {
            points,
            closed: true,
        }
    }

    /// Returns `true` if the polyline has no points.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Returns the number of points in the polyline.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns `true` if the last point connects back to the first.
    #[must_use]
    pub const fn is_closed(&self) -> bool {
        self.closed
    }

    /// Returns the first point, if any.
    #[must_use]
    pub fn first(&self) -> Option<&Point> {
        self.points.first()
    }

    /// Returns the last point, if any.
    #[must_use]
    pub fn last(&self) -> Option<&Point> {
        self.points.last()
    }

    /// Returns a slice of all points.
    #[must_use]
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Consumes the polyline and returns the underlying vector of points.
    #[must_use]
    pub fn into_points(self) -> Vec<Point> {
        self.points
    }

    /// Iterate over the segments of the polyline, including the closing
    /// segment of a closed polyline.
    pub fn segments(&self) -> impl Iterator<Item = (Point, Point)> + '_ {
        let closing = if self.closed && self.points.len() >= 2 {
            self.points.last().copied().zip(self.points.first().copied())
        } else {
            None
        };
        self.points
            .windows(2)
            .map(|w| (w[0], w[1]))
            .chain(closing)
    }

    /// Total length of all segments.
    #[must_use]
    pub fn length(&self) -> f64 {
        self.segments().map(|(a, b)| a.distance(b)).sum()
    }

    /// Absolute enclosed area via the shoelace formula.
    ///
    /// Open polylines are treated as if closed; fewer than three points
    /// enclose nothing.
    #[must_use]
    pub fn area(&self) -> f64 {
        if self.points.len() < 3 {
            return 0.0;
        }
        let n = self.points.len();
        let twice: f64 = (0..n)
            .map(|i| {
                let a = self.points[i];
                let b = self.points[(i + 1) % n];
                a.x.mul_add(b.y, -(b.x * a.y))
            })
            .sum();
        (twice / 2.0).abs()
    }

    /// Axis-aligned bounds, or `None` for an empty polyline.
    #[must_use]
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        BoundingBox::from_points(&self.points)
    }
}

/// An axis-aligned rectangle in document space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Smallest x.
    pub min_x: f64,
    /// Smallest y.
    pub min_y: f64,
    /// Largest x.
    pub max_x: f64,
    /// Largest y.
    pub max_y: f64,
}

impl BoundingBox {
    /// Bounds enclosing all `points`, or `None` when there are none.
    #[must_use]
    pub fn from_points(points: &[Point]) -> Option<Self> {
        let first = points.first()?;
        let init = Self {
            min_x: first.x,
            min_y: first.y,
            max_x: first.x,
            max_y: first.y,
        };
        Some(points.iter().fold(init, |b, p| Self {
            min_x: b.min_x.min(p.x),
            min_y: b.min_y.min(p.y),
            max_x: b.max_x.max(p.x),
            max_y: b.max_y.max(p.y),
        }))
    }

    /// Horizontal extent.
    #[must_use]
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    /// Vertical extent.
    #[must_use]
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// Grow the box on every side by `margin`.
    #[must_use]
    pub fn expand(self, margin: f64) -> Self {
        Self {
            min_x: self.min_x - margin,
            min_y: self.min_y - margin,
            max_x: self.max_x + margin,
            max_y: self.max_y + margin,
        }
    }

    /// Smallest box containing both `self` and `other`.
    #[must_use]
    pub fn union(self, other: Self) -> Self {
        Self {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }

    /// Returns `true` if the two boxes overlap or touch.
    #[must_use]
    pub fn intersects(&self, other: &Self) -> bool {
        self.min_x <= other.max_x
            && other.min_x <= self.max_x
            && self.min_y <= other.max_y
            && other.min_y <= self.max_y
    }
}

/// Styling class of a piece of geometry, used by renderers and exporters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ColorTag {
    /// Drawn by the user with a stroke tool.
    #[default]
    Manual,
    /// A detected contour enclosing more than the minor-area threshold.
    AutoMain,
    /// A detected contour at or below the minor-area threshold.
    AutoMinor,
}

/// Errors raised by the contour correction model.
///
/// All of them are local and recoverable: the rejected input is simply
/// not applied and the prior state is retained.
#[derive(Debug, Clone, PartialEq, thiserror::Error, Serialize, Deserialize)]
pub enum EditError {
    /// A stroke has zero extent, too few points, a non-positive radius or
    /// non-finite coordinates.
    #[error("degenerate geometry: {0}")]
    DegenerateGeometry(String),

    /// A view state with a non-positive or non-finite zoom, or a mapping
    /// whose result is not finite.
    #[error("invalid view state: {0}")]
    InvalidViewState(String),

    /// Editor configuration is invalid.
    #[error("invalid editor configuration: {0}")]
    InvalidConfig(String),
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn square() -> Polyline {
        Polyline::closed(vec![
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 10.0),
            Point::new(0.0, 10.0),
        ])
    }

    #[test]
    fn point_distance() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(3.0, 4.0);
        assert!((a.distance(b) - 5.0).abs() < f64::EPSILON);
        assert!((a.distance_squared(b) - 25.0).abs() < f64::EPSILON);
    }

    #[test]
    fn point_midpoint() {
        let m = Point::new(0.0, 2.0).midpoint(Point::new(4.0, 6.0));
        assert_eq!(m, Point::new(2.0, 4.0));
    }

    #[test]
    fn non_finite_point_detected() {
        assert!(Point::new(1.0, 2.0).is_finite());
        assert!(!Point::new(f64::NAN, 2.0).is_finite());
        assert!(!Point::new(1.0, f64::INFINITY).is_finite());
    }

    #[test]
    fn closed_polyline_includes_closing_segment() {
        let sq = square();
        assert_eq!(sq.segments().count(), 4);
        assert!((sq.length() - 40.0).abs() < 1e-12);
    }

    #[test]
    fn open_polyline_has_no_closing_segment() {
        let pl = Polyline::new(square().into_points());
        assert_eq!(pl.segments().count(), 3);
        assert!((pl.length() - 30.0).abs() < 1e-12);
    }

    #[test]
    fn shoelace_area_of_square() {
        assert!((square().area() - 100.0).abs() < 1e-12);
    }

    #[test]
    fn area_of_two_points_is_zero() {
        let pl = Polyline::new(vec![Point::new(0.0, 0.0), Point::new(5.0, 5.0)]);
        assert!(pl.area().abs() < f64::EPSILON);
    }

    #[test]
    fn bounding_box_of_square() {
        let bb = square().bounding_box();
        assert_eq!(
            bb,
            Some(BoundingBox {
                min_x: 0.0,
                min_y: 0.0,
                max_x: 10.0,
                max_y: 10.0,
            })
        );
    }

    #[test]
    fn empty_polyline_has_no_bounds() {
        assert!(Polyline::new(vec![]).bounding_box().is_none());
    }

    #[test]
    fn bounding_boxes_intersect_when_touching() {
        let a = BoundingBox {
            min_x: 0.0,
            min_y: 0.0,
            max_x: 1.0,
            max_y: 1.0,
        };
        let b = BoundingBox {
            min_x: 1.0,
            min_y: 1.0,
            max_x: 2.0,
            max_y: 2.0,
        };
        let c = b.expand(-0.5);
        assert!(a.intersects(&b));
        assert!(!a.intersects(&c));
        assert!((a.union(b).width() - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn polyline_serde_defaults_to_open() {
        let json = r#"{"points":[{"x":0.0,"y":0.0},{"x":1.0,"y":0.0}]}"#;
        let pl: Polyline = serde_json::from_str(json).unwrap();
        assert!(!pl.is_closed());
        assert_eq!(pl.len(), 2);
    }
}
