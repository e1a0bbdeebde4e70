//! Erasure resolver: removes geometry swept by an eraser stroke.
//!
//! An erasure is a circle of radius `r` dragged along a path. Every
//! segment of a candidate polyline is split wherever it enters or leaves
//! the swept area (the union of one capsule per path segment), and each
//! resulting piece is dropped if its midpoint lies within `r` of the
//! path. Surviving pieces are chained back into polylines:
//!
//! - an untouched polyline is returned as-is, closed flag included;
//! - a partly erased polyline yields one or more open polylines;
//! - for a closed polyline the gap becomes the new start and end.
//!
//! Pieces with fewer than two points or (near) zero length are dropped.

use geo::line_measures::Distance;
use geo::{Closest, ClosestPoint, Euclidean, Line};
use rstar::RTree;

use crate::types::{BoundingBox, Point, Polyline};

/// Cut parameters closer than this are treated as the same cut, and cuts
/// this close to a segment end are ignored.
const PARAM_EPSILON: f64 = 1e-9;

/// Fragments no longer than this are dropped.
const MIN_FRAGMENT_LENGTH: f64 = 1e-9;

/// Result of erasing one polyline.
#[derive(Debug, Clone, PartialEq)]
pub enum EraseOutcome {
    /// No part of the polyline was within the eraser radius.
    Untouched,
    /// Some part was removed.
    Erased {
        /// Surviving open polylines, in original traversal order.
        remainder: Vec<Polyline>,
        /// Degenerate fragments that were discarded.
        dropped: usize,
    },
}

/// A swept erasure path, indexed for distance queries.
#[derive(Debug)]
pub struct ErasurePath {
    tree: RTree<Line<f64>>,
    radius: f64,
    reach: Option<BoundingBox>,
}

const fn point_to_coord(p: Point) -> geo::Coord<f64> {
    geo::Coord { x: p.x, y: p.y }
}

const fn coord_to_point(c: geo::Coord<f64>) -> Point {
    Point::new(c.x, c.y)
}

fn closest_coord_on_line(line: &Line<f64>, query: &geo::Point<f64>) -> geo::Coord<f64> {
    match line.closest_point(query) {
        Closest::Intersection(p) | Closest::SinglePoint(p) => p.into(),
        Closest::Indeterminate => line.start,
    }
}

impl ErasurePath {
    /// Index the path `points` swept with `radius`.
    ///
    /// A single point (or a path of coincident points) erases a disc.
    #[must_use]
    pub fn new(points: &[Point], radius: f64) -> Self {
        let lines: Vec<Line<f64>> = match points {
            [] => Vec::new(),
            [only] => vec![Line::new(point_to_coord(*only), point_to_coord(*only))],
            _ => points
                .windows(2)
                .map(|w| Line::new(point_to_coord(w[0]), point_to_coord(w[1])))
                .collect(),
        };
        Self {
            tree: RTree::bulk_load(lines),
            radius,
            reach: BoundingBox::from_points(points).map(|b| b.expand(radius)),
        }
    }

    /// Eraser radius.
    #[must_use]
    pub const fn radius(&self) -> f64 {
        self.radius
    }

    /// Distance from `p` to the nearest point of the path, or infinity for
    /// an empty path.
    #[must_use]
    pub fn distance_to(&self, p: Point) -> f64 {
        let query = geo::Point::from(point_to_coord(p));
        self.tree.nearest_neighbor(&query).map_or(f64::INFINITY, |line| {
            let closest = closest_coord_on_line(line, &query);
            Euclidean.distance(&query, &geo::Point::from(closest))
        })
    }

    /// Whether `p` lies within the eraser radius of the path.
    #[must_use]
    pub fn covers(&self, p: Point) -> bool {
        self.distance_to(p) <= self.radius
    }

    /// Remove the part of `polyline` swept by this path.
    #[must_use]
    pub fn erase(&self, polyline: &Polyline) -> EraseOutcome {
        let Some(reach) = self.reach else {
            return EraseOutcome::Untouched;
        };
        if !polyline
            .bounding_box()
            .is_some_and(|b| b.intersects(&reach))
        {
            return EraseOutcome::Untouched;
        }

        let mut runs: Vec<Vec<Point>> = Vec::new();
        let mut current: Vec<Point> = Vec::new();
        let mut touched = false;
        let mut first_kept_from_start = false;

        for (i, (a, b)) in polyline.segments().enumerate() {
            let kept = self.kept_intervals(a, b);
            if i == 0 {
                first_kept_from_start = kept.first().is_some_and(|&(t0, _)| t0 == 0.0);
            }
            if kept == [(0.0, 1.0)] {
                if current.is_empty() {
                    current.push(a);
                }
                current.push(b);
                continue;
            }
            touched = true;
            for &(t0, t1) in &kept {
                if t0 > 0.0 && !current.is_empty() {
                    runs.push(std::mem::take(&mut current));
                }
                if current.is_empty() {
                    current.push(point_at(a, b, t0));
                }
                current.push(point_at(a, b, t1));
            }
            if kept.last().is_none_or(|&(_, t1)| t1 < 1.0) && !current.is_empty() {
                runs.push(std::mem::take(&mut current));
            }
        }

        if !touched {
            return EraseOutcome::Untouched;
        }

        if !current.is_empty() {
            // The tail reaches the polyline's final vertex. On a closed
            // polyline that is the first vertex, so it joins the head run.
            if polyline.is_closed() && first_kept_from_start && !runs.is_empty() {
                let head = runs.remove(0);
                current.extend(head.into_iter().skip(1));
            }
            runs.push(current);
        }

        let total = runs.len();
        let remainder: Vec<Polyline> = runs
            .into_iter()
            .map(Polyline::new)
            .filter(|pl| pl.len() >= 2 && pl.length() > MIN_FRAGMENT_LENGTH)
            .collect();
        let dropped = total - remainder.len();
        EraseOutcome::Erased { remainder, dropped }
    }

    /// Parameter intervals of segment `a`-`b` that survive the erasure,
    /// merged and in increasing order.
    fn kept_intervals(&self, a: Point, b: Point) -> Vec<(f64, f64)> {
        if a == b {
            return if self.covers(a) {
                Vec::new()
            } else {
                vec![(0.0, 1.0)]
            };
        }

        let mut cuts = vec![0.0, 1.0];
        for line in self.lines_near(a, b) {
            let c = coord_to_point(line.start);
            let d = coord_to_point(line.end);
            if let Some((t0, t1)) = capsule_interval(a, b, c, d, self.radius) {
                cuts.extend(
                    [t0, t1]
                        .into_iter()
                        .filter(|t| *t > PARAM_EPSILON && *t < 1.0 - PARAM_EPSILON),
                );
            }
        }
        cuts.sort_by(f64::total_cmp);
        cuts.dedup_by(|later, earlier| (*later - *earlier).abs() <= PARAM_EPSILON);

        let mut kept: Vec<(f64, f64)> = Vec::new();
        for w in cuts.windows(2) {
            let (t0, t1) = (w[0], w[1]);
            if self.covers(point_at(a, b, f64::midpoint(t0, t1))) {
                continue;
            }
            match kept.last_mut() {
                Some((_, end)) if *end == t0 => *end = t1,
                _ => kept.push((t0, t1)),
            }
        }
        kept
    }

    /// Path segments whose swept capsule can reach segment `a`-`b`.
    fn lines_near(&self, a: Point, b: Point) -> Vec<Line<f64>> {
        let mid = a.midpoint(b);
        let limit = a.distance(b).mul_add(0.5, self.radius);
        let query = geo::Point::from(point_to_coord(mid));
        self.tree
            .nearest_neighbor_iter(&query)
            .take_while(|line| {
                let closest = closest_coord_on_line(line, &query);
                Euclidean.distance(&query, &geo::Point::from(closest)) <= limit
            })
            .copied()
            .collect()
    }
}

/// Point at parameter `t` along `a`-`b`, exact at the endpoints.
fn point_at(a: Point, b: Point, t: f64) -> Point {
    if t <= 0.0 {
        a
    } else if t >= 1.0 {
        b
    } else {
        lerp(a, b, t)
    }
}

fn lerp(a: Point, b: Point, t: f64) -> Point {
    Point::new(t.mul_add(b.x - a.x, a.x), t.mul_add(b.y - a.y, a.y))
}

/// Parameters `t1 <= t2` where the infinite line through `a`-`b` meets
/// the circle, or `None` if it misses.
fn solve_line_circle(a: Point, b: Point, center: Point, radius: f64) -> Option<(f64, f64)> {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let fx = a.x - center.x;
    let fy = a.y - center.y;

    let a_coeff = dx.mul_add(dx, dy * dy);
    let b_coeff = 2.0 * dx.mul_add(fx, dy * fy);
    let c_coeff = radius.mul_add(-radius, fx.mul_add(fx, fy * fy));

    let discriminant = b_coeff.mul_add(b_coeff, -4.0 * a_coeff * c_coeff);

    if discriminant < 0.0 {
        return None;
    }

    let sqrt_disc = discriminant.sqrt();
    let t1 = (-b_coeff - sqrt_disc) / (2.0 * a_coeff);
    let t2 = (-b_coeff + sqrt_disc) / (2.0 * a_coeff);

    Some((t1, t2))
}

/// Restrict `range` to where `f0 + f1 * t` lies in `[lo, hi]`.
fn clip_linear(f0: f64, f1: f64, lo: f64, hi: f64, range: (f64, f64)) -> Option<(f64, f64)> {
    if f1 == 0.0 {
        return (lo..=hi).contains(&f0).then_some(range);
    }
    let ta = (lo - f0) / f1;
    let tb = (hi - f0) / f1;
    let t0 = range.0.max(ta.min(tb));
    let t1 = range.1.min(ta.max(tb));
    (t0 <= t1).then_some((t0, t1))
}

/// Parameters of segment `a`-`b` lying in the rectangular body of the
/// capsule around `c`-`d` (excluding the end caps).
fn slab_interval(a: Point, b: Point, c: Point, d: Point, radius: f64) -> Option<(f64, f64)> {
    let ex = d.x - c.x;
    let ey = d.y - c.y;
    let len_sq = ex.mul_add(ex, ey * ey);
    if len_sq == 0.0 {
        return None;
    }
    let len = len_sq.sqrt();
    let (ax, ay) = (a.x - c.x, a.y - c.y);
    let (vx, vy) = (b.x - a.x, b.y - a.y);

    // Projection onto the capsule axis, normalized to [0, 1].
    let s0 = ex.mul_add(ax, ey * ay) / len_sq;
    let s1 = ex.mul_add(vx, ey * vy) / len_sq;
    // Signed perpendicular distance from the axis.
    let h0 = ex.mul_add(ay, -(ey * ax)) / len;
    let h1 = ex.mul_add(vy, -(ey * vx)) / len;

    let range = clip_linear(s0, s1, 0.0, 1.0, (0.0, 1.0))?;
    clip_linear(h0, h1, -radius, radius, range)
}

/// Parameters of segment `a`-`b` inside the capsule of `radius` around
/// `c`-`d`. The capsule is convex, so this is a single interval.
fn capsule_interval(a: Point, b: Point, c: Point, d: Point, radius: f64) -> Option<(f64, f64)> {
    let mut lo = f64::INFINITY;
    let mut hi = f64::NEG_INFINITY;
    let caps = [
        solve_line_circle(a, b, c, radius),
        (c != d).then(|| solve_line_circle(a, b, d, radius)).flatten(),
        slab_interval(a, b, c, d, radius),
    ];
    for (t0, t1) in caps.into_iter().flatten() {
        let (t0, t1) = (t0.max(0.0), t1.min(1.0));
        if t0 <= t1 {
            lo = lo.min(t0);
            hi = hi.max(t1);
        }
    }
    (lo <= hi).then_some((lo, hi))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64) -> Point {
        Point::new(x, y)
    }

    fn remainder(outcome: EraseOutcome) -> Vec<Polyline> {
        match outcome {
            EraseOutcome::Erased { remainder, .. } => remainder,
            EraseOutcome::Untouched => panic!("expected erasure"),
        }
    }

    fn assert_point_near(actual: Point, expected: Point) {
        assert!(
            actual.distance(expected) < 1e-9,
            "expected {expected:?}, got {actual:?}"
        );
    }

    #[test]
    fn far_away_path_leaves_polyline_untouched() {
        let path = ErasurePath::new(&[p(100.0, 100.0), p(110.0, 100.0)], 2.0);
        let line = Polyline::new(vec![p(0.0, 0.0), p(10.0, 0.0)]);
        assert_eq!(path.erase(&line), EraseOutcome::Untouched);
    }

    #[test]
    fn nearby_but_not_touching_is_untouched() {
        let path = ErasurePath::new(&[p(0.0, 3.0), p(10.0, 3.0)], 2.0);
        let square = Polyline::closed(vec![p(0.0, 0.0), p(10.0, 0.0), p(10.0, -10.0), p(0.0, -10.0)]);
        assert_eq!(path.erase(&square), EraseOutcome::Untouched);
    }

    #[test]
    fn erasing_the_middle_splits_a_line() {
        let path = ErasurePath::new(&[p(5.0, 0.0), p(5.0, 0.0)], 0.5);
        let line = Polyline::new(vec![p(0.0, 0.0), p(10.0, 0.0)]);
        let pieces = remainder(path.erase(&line));
        assert_eq!(pieces.len(), 2);
        assert_eq!(pieces[0].points()[0], p(0.0, 0.0));
        assert_point_near(pieces[0].points()[1], p(4.5, 0.0));
        assert_point_near(pieces[1].points()[0], p(5.5, 0.0));
        assert_eq!(pieces[1].points()[1], p(10.0, 0.0));
        assert!(pieces.iter().all(|pl| !pl.is_closed()));
    }

    #[test]
    fn erasing_an_end_shortens_a_line() {
        let path = ErasurePath::new(&[p(10.0, -5.0), p(10.0, 5.0)], 2.0);
        let line = Polyline::new(vec![p(0.0, 0.0), p(10.0, 0.0)]);
        let pieces = remainder(path.erase(&line));
        assert_eq!(pieces.len(), 1);
        assert_point_near(*pieces[0].last().unwrap(), p(8.0, 0.0));
    }

    #[test]
    fn covering_everything_removes_polyline() {
        let path = ErasurePath::new(&[p(0.0, 5.0), p(10.0, 5.0)], 6.0);
        let square = Polyline::closed(vec![p(0.0, 0.0), p(10.0, 0.0), p(10.0, 10.0), p(0.0, 10.0)]);
        assert!(remainder(path.erase(&square)).is_empty());
    }

    #[test]
    fn erasing_a_closed_corner_opens_it_at_the_gap() {
        let path = ErasurePath::new(&[p(10.0, 10.0), p(10.0, 10.0)], 1.0);
        let square = Polyline::closed(vec![p(0.0, 0.0), p(10.0, 0.0), p(10.0, 10.0), p(0.0, 10.0)]);
        let pieces = remainder(path.erase(&square));
        assert_eq!(pieces.len(), 1);
        let pl = &pieces[0];
        assert!(!pl.is_closed());
        assert_point_near(pl.points()[0], p(9.0, 10.0));
        assert_point_near(*pl.last().unwrap(), p(10.0, 9.0));
        assert!((pl.length() - 38.0).abs() < 1e-9);
    }

    #[test]
    fn erasing_the_closing_segment_keeps_one_run() {
        let path = ErasurePath::new(&[p(0.0, 5.0), p(0.0, 5.0)], 1.0);
        let square = Polyline::closed(vec![p(0.0, 0.0), p(10.0, 0.0), p(10.0, 10.0), p(0.0, 10.0)]);
        let pieces = remainder(path.erase(&square));
        assert_eq!(pieces.len(), 1);
        assert_point_near(pieces[0].points()[0], p(0.0, 4.0));
        assert_point_near(*pieces[0].last().unwrap(), p(0.0, 6.0));
    }

    #[test]
    fn two_gaps_on_a_closed_polyline_yield_two_runs() {
        let path = ErasurePath::new(&[p(5.0, -5.0), p(5.0, 15.0)], 1.0);
        let square = Polyline::closed(vec![p(0.0, 0.0), p(10.0, 0.0), p(10.0, 10.0), p(0.0, 10.0)]);
        let pieces = remainder(path.erase(&square));
        assert_eq!(pieces.len(), 2);
        let total: f64 = pieces.iter().map(Polyline::length).sum();
        assert!((total - 36.0).abs() < 1e-9);
    }

    #[test]
    fn crossing_path_cuts_each_segment_it_crosses() {
        let path = ErasurePath::new(&[p(-1.0, 1.0), p(11.0, 1.0)], 0.25);
        let zigzag = Polyline::new(vec![p(0.0, 0.0), p(2.0, 2.0), p(4.0, 0.0)]);
        let pieces = remainder(path.erase(&zigzag));
        assert_eq!(pieces.len(), 3);
    }

    #[test]
    fn multi_segment_path_erases_along_its_length() {
        let path = ErasurePath::new(&[p(2.0, 0.0), p(4.0, 0.0), p(6.0, 0.0)], 0.5);
        let line = Polyline::new(vec![p(0.0, 0.0), p(10.0, 0.0)]);
        let pieces = remainder(path.erase(&line));
        assert_eq!(pieces.len(), 2);
        assert_point_near(*pieces[0].last().unwrap(), p(1.5, 0.0));
        assert_point_near(pieces[1].points()[0], p(6.5, 0.0));
    }

    #[test]
    fn interior_vertices_survive_outside_erasure() {
        let path = ErasurePath::new(&[p(10.0, 0.0), p(10.0, 0.0)], 1.0);
        let pl = Polyline::new(vec![p(0.0, 0.0), p(5.0, 0.0), p(10.0, 0.0)]);
        let pieces = remainder(path.erase(&pl));
        assert_eq!(pieces.len(), 1);
        assert_eq!(pieces[0].len(), 3);
        assert_eq!(pieces[0].points()[1], p(5.0, 0.0));
    }

    #[test]
    fn repeated_vertices_do_not_break_erasure() {
        let path = ErasurePath::new(&[p(5.0, 0.0), p(5.0, 0.0)], 1.0);
        let pl = Polyline::new(vec![p(0.0, 0.0), p(0.0, 0.0), p(10.0, 0.0)]);
        let pieces = remainder(path.erase(&pl));
        assert_eq!(pieces.len(), 2);
    }

    #[test]
    fn distance_to_path() {
        let path = ErasurePath::new(&[p(0.0, 0.0), p(10.0, 0.0)], 1.0);
        assert!((path.distance_to(p(5.0, 3.0)) - 3.0).abs() < 1e-12);
        assert!((path.distance_to(p(13.0, 4.0)) - 5.0).abs() < 1e-12);
        assert!(path.covers(p(-0.5, 0.5)));
        assert!(!path.covers(p(-1.0, 1.0)));
    }

    #[test]
    fn empty_path_erases_nothing() {
        let path = ErasurePath::new(&[], 5.0);
        let line = Polyline::new(vec![p(0.0, 0.0), p(10.0, 0.0)]);
        assert_eq!(path.erase(&line), EraseOutcome::Untouched);
        assert!(path.distance_to(p(0.0, 0.0)).is_infinite());
    }

    #[test]
    fn capsule_interval_spans_caps_and_body() {
        let (t0, t1) =
            capsule_interval(p(0.0, 0.0), p(10.0, 0.0), p(3.0, 0.0), p(6.0, 0.0), 1.0).unwrap();
        assert!((t0 - 0.2).abs() < 1e-12);
        assert!((t1 - 0.7).abs() < 1e-12);
    }

    #[test]
    fn capsule_interval_misses() {
        let hit = capsule_interval(p(0.0, 0.0), p(10.0, 0.0), p(3.0, 5.0), p(6.0, 5.0), 1.0);
        assert!(hit.is_none());
    }
}
