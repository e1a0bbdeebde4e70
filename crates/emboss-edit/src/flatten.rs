//! Flattening: base layer plus active edits into the exportable polyline
//! set.
//!
//! The working set starts as the base layer polylines. Active entries are
//! folded in log order: a drawn stroke appends its polyline, an erasure
//! cuts every polyline currently in the working set. Fragments keep the
//! tag and origin of the polyline they came from.

use serde::{Deserialize, Serialize};

use crate::base::BaseLayer;
use crate::erase::{EraseOutcome, ErasurePath};
use crate::history::EditLogEntry;
use crate::stroke::StrokeKind;
use crate::types::{ColorTag, Polyline};

/// Where a flattened polyline came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Origin {
    /// Index into the base layer.
    Base(usize),
    /// Sequence number of the edit log entry that drew it.
    Entry(u64),
}

/// One polyline of flattened output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlatPolyline {
    /// Geometry in document space.
    pub polyline: Polyline,
    /// Tag of the base polyline or stroke it came from.
    pub tag: ColorTag,
    /// The base polyline or log entry it came from.
    pub origin: Origin,
}

/// Counters collected while flattening.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlattenReport {
    /// Polylines taken from the base layer.
    pub base_polylines: usize,
    /// Non-erasure strokes appended.
    pub drawn_strokes: usize,
    /// Erasure strokes applied.
    pub erasures: usize,
    /// Degenerate erasure fragments discarded.
    pub fragments_dropped: usize,
    /// Polylines in the result.
    pub output_polylines: usize,
}

/// Combine `base` and the `active` log entries into the final polyline set.
///
/// Curved strokes are approximated within `tolerance`. Identical inputs
/// give identical output.
#[must_use]
pub fn flatten(base: &BaseLayer, active: &[EditLogEntry], tolerance: f64) -> Vec<FlatPolyline> {
    flatten_with_report(base, active, tolerance).0
}

/// [`flatten`], also returning a [`FlattenReport`].
#[must_use]
pub fn flatten_with_report(
    base: &BaseLayer,
    active: &[EditLogEntry],
    tolerance: f64,
) -> (Vec<FlatPolyline>, FlattenReport) {
    let mut report = FlattenReport {
        base_polylines: base.len(),
        ..FlattenReport::default()
    };
    let mut working: Vec<FlatPolyline> = base
        .polylines()
        .iter()
        .enumerate()
        .map(|(i, (polyline, tag))| FlatPolyline {
            polyline: polyline.clone(),
            tag: *tag,
            origin: Origin::Base(i),
        })
        .collect();

    for entry in active {
        match (entry.stroke.kind(), entry.stroke.color_tag()) {
            (StrokeKind::Erasure { points, radius }, _) => {
                report.erasures += 1;
                let path = ErasurePath::new(points, *radius);
                working = apply_erasure(working, &path, &mut report.fragments_dropped);
                tracing::trace!(seq = entry.seq, remaining = working.len(), "applied erasure");
            }
            (_, tag) => {
                report.drawn_strokes += 1;
                working.push(FlatPolyline {
                    polyline: entry.stroke.as_polyline(tolerance),
                    tag: tag.unwrap_or_default(),
                    origin: Origin::Entry(entry.seq),
                });
            }
        }
    }

    report.output_polylines = working.len();
    tracing::debug!(?report, "flattened");
    (working, report)
}

fn apply_erasure(
    working: Vec<FlatPolyline>,
    path: &ErasurePath,
    fragments_dropped: &mut usize,
) -> Vec<FlatPolyline> {
    let mut out = Vec::with_capacity(working.len());
    for item in working {
        match path.erase(&item.polyline) {
            EraseOutcome::Untouched => out.push(item),
            EraseOutcome::Erased { remainder, dropped } => {
                *fragments_dropped += dropped;
                out.extend(remainder.into_iter().map(|polyline| FlatPolyline {
                    polyline,
                    tag: item.tag,
                    origin: item.origin,
                }));
            }
        }
    }
    out
}
