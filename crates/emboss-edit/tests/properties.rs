//! Property tests for the edit log, the coordinate mapper and flattening.

#![allow(clippy::unwrap_used)]

use emboss_edit::{
    BaseLayer, ColorTag, EditLog, Point, Polyline, Stroke, ViewPoint, ViewState, flatten,
    to_document, to_view,
};
use proptest::prelude::*;
use proptest::test_runner::Config as ProptestConfig;

fn proptest_config() -> ProptestConfig {
    let cases = std::env::var("PROPTEST_CASES")
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(64);
    ProptestConfig {
        cases,
        ..ProptestConfig::default()
    }
}

fn arb_point() -> impl Strategy<Value = Point> {
    (-100.0..100.0f64, -100.0..100.0f64).prop_map(|(x, y)| Point::new(x, y))
}

/// Drawn strokes and erasures with non-degenerate geometry.
fn arb_stroke() -> impl Strategy<Value = Stroke> {
    prop_oneof![
        (arb_point(), 1.0..40.0f64, 1.0..40.0f64).prop_map(|(a, dx, dy)| {
            Stroke::line(a, Point::new(a.x + dx, a.y - dy), ColorTag::Manual).unwrap()
        }),
        (arb_point(), 1.0..40.0f64, 1.0..40.0f64).prop_map(|(a, w, h)| {
            Stroke::rectangle(a, Point::new(a.x + w, a.y + h), ColorTag::Manual).unwrap()
        }),
        (arb_point(), 0.5..20.0f64, 0.5..20.0f64)
            .prop_map(|(c, rx, ry)| Stroke::ellipse(c, rx, ry, ColorTag::Manual).unwrap()),
        // Repeated samples exercise the dedup in `as_polyline`.
        (arb_point(), prop::collection::vec((0.5..10.0f64, -10.0..10.0f64, 1..3usize), 1..8))
            .prop_map(|(start, steps)| {
                let mut points = vec![start];
                let mut at = start;
                for (dx, dy, repeat) in steps {
                    at = Point::new(at.x + dx, at.y + dy);
                    points.extend(std::iter::repeat_n(at, repeat));
                }
                Stroke::freehand(points, ColorTag::Manual).unwrap()
            }),
        (arb_point(), 1.0..40.0f64, 1.0..40.0f64, -20.0..20.0f64).prop_map(|(a, w, h, skew)| {
            let apex = Point::new(a.x + w / 2.0 + skew, a.y + h);
            Stroke::triangle(a, Point::new(a.x + w, a.y), apex, ColorTag::Manual).unwrap()
        }),
        (prop::collection::vec(arb_point(), 2..6), 0.5..10.0f64).prop_map(|(points, radius)| {
            Stroke::erasure(points, radius).unwrap()
        }),
    ]
}

fn base_layer() -> BaseLayer {
    let mut base = BaseLayer::new();
    base.replace(
        vec![
            Polyline::closed(vec![
                Point::new(-50.0, -50.0),
                Point::new(50.0, -50.0),
                Point::new(50.0, 50.0),
                Point::new(-50.0, 50.0),
            ]),
            Polyline::new(vec![Point::new(-80.0, 0.0), Point::new(80.0, 0.0)]),
        ],
        100.0,
    );
    base
}

proptest! {
    #![proptest_config(proptest_config())]

    #[test]
    fn undo_all_then_redo_all_restores_active_entries(strokes in prop::collection::vec(arb_stroke(), 1..12)) {
        let mut log = EditLog::new();
        for stroke in strokes {
            log.push(stroke);
        }
        let before = log.active_entries().to_vec();
        let n = log.len();

        for _ in 0..n {
            prop_assert!(log.undo());
        }
        prop_assert!(log.active_entries().is_empty());
        prop_assert!(!log.undo());

        for _ in 0..n {
            prop_assert!(log.redo());
        }
        prop_assert!(!log.redo());
        prop_assert_eq!(log.active_entries(), before.as_slice());
    }

    #[test]
    fn cursor_stays_within_log(ops in prop::collection::vec(0u8..3, 0..40), stroke in arb_stroke()) {
        let mut log = EditLog::new();
        for op in ops {
            match op {
                0 => { log.push(stroke.clone()); }
                1 => { log.undo(); }
                _ => { log.redo(); }
            }
            prop_assert!(log.cursor() <= log.len());
            prop_assert_eq!(log.can_undo(), log.cursor() > 0);
            prop_assert_eq!(log.can_redo(), log.cursor() < log.len());
        }
    }

    #[test]
    fn flatten_is_deterministic(strokes in prop::collection::vec(arb_stroke(), 0..10)) {
        let base = base_layer();
        let mut log = EditLog::new();
        for stroke in strokes {
            log.push(stroke);
        }
        let first = flatten(&base, log.active_entries(), 0.1);
        let second = flatten(&base, log.active_entries(), 0.1);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn flatten_never_emits_short_polylines(strokes in prop::collection::vec(arb_stroke(), 0..10)) {
        let mut log = EditLog::new();
        for stroke in strokes {
            log.push(stroke);
        }
        for flat in flatten(&base_layer(), log.active_entries(), 0.1) {
            prop_assert!(flat.polyline.len() >= 2);
            prop_assert!(flat.polyline.points().iter().all(|p| p.is_finite()));
        }
    }

    #[test]
    fn undoing_an_erasure_restores_geometry(
        strokes in prop::collection::vec(arb_stroke(), 0..6),
        path in prop::collection::vec(arb_point(), 2..5),
        radius in 0.5..15.0f64,
    ) {
        let base = base_layer();
        let mut log = EditLog::new();
        for stroke in strokes {
            log.push(stroke);
        }
        let before = flatten(&base, log.active_entries(), 0.1);
        log.push(Stroke::erasure(path, radius).unwrap());
        log.undo();
        prop_assert_eq!(flatten(&base, log.active_entries(), 0.1), before);
    }

    #[test]
    fn coordinate_round_trip(points in prop::collection::vec((-5000.0..5000.0f64, -5000.0..5000.0f64), 100)) {
        for zoom in [0.1, 1.0, 5.0] {
            for pan in [ViewPoint::new(0.0, 0.0), ViewPoint::new(37.5, -12.2)] {
                let view = ViewState::new(zoom, pan).unwrap();
                for &(x, y) in &points {
                    let original = ViewPoint::new(x, y);
                    let back = to_view(to_document(original, &view).unwrap(), &view).unwrap();
                    prop_assert!((back.x - original.x).abs() < 1e-6);
                    prop_assert!((back.y - original.y).abs() < 1e-6);
                }
            }
        }
    }
}
