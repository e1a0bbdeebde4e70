//! Base layer: contours delivered by the external detection pipeline.

use crate::types::{ColorTag, Polyline};

/// The detected contour set for the loaded image.
///
/// Replacement is wholesale. Each replacement bumps
/// [`generation`](Self::generation), which identifies the layer for
/// flatten caching.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BaseLayer {
    polylines: Vec<(Polyline, ColorTag)>,
    generation: u64,
}

impl BaseLayer {
    /// Empty layer at generation zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the layer with `polylines`, tagging each by its enclosed area.
    ///
    /// Area above `minor_area_threshold` is [`ColorTag::AutoMain`],
    /// anything else [`ColorTag::AutoMinor`].
    pub fn replace(&mut self, polylines: Vec<Polyline>, minor_area_threshold: f64) {
        let tagged = polylines
            .into_iter()
            .map(|pl| {
                let tag = classify(&pl, minor_area_threshold);
                (pl, tag)
            })
            .collect();
        self.replace_tagged(tagged);
    }

    /// Replace the layer with already tagged polylines.
    ///
    /// Polylines with fewer than two points or any non-finite coordinate
    /// are dropped.
    pub fn replace_tagged(&mut self, polylines: Vec<(Polyline, ColorTag)>) {
        let total = polylines.len();
        self.polylines = polylines
            .into_iter()
            .filter(|(pl, _)| pl.len() >= 2 && pl.points().iter().all(|p| p.is_finite()))
            .collect();
        let dropped = total - self.polylines.len();
        if dropped > 0 {
            tracing::warn!(
                dropped,
                "discarded base polylines with fewer than 2 points or non-finite coordinates"
            );
        }
        self.generation += 1;
        tracing::debug!(
            generation = self.generation,
            polylines = self.polylines.len(),
            "base layer replaced"
        );
    }

    /// Tagged polylines in delivery order.
    #[must_use]
    pub fn polylines(&self) -> &[(Polyline, ColorTag)] {
        &self.polylines
    }

    /// Number of polylines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.polylines.len()
    }

    /// Returns `true` if the layer holds no polylines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.polylines.is_empty()
    }

    /// Replacement counter, starting at zero for a fresh layer.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }
}

fn classify(polyline: &Polyline, minor_area_threshold: f64) -> ColorTag {
    if polyline.area() > minor_area_threshold {
        ColorTag::AutoMain
    } else {
        ColorTag::AutoMinor
    }
}
