//! Editor configuration.

use serde::{Deserialize, Serialize};

use crate::types::EditError;

/// Tunables for an editing session.
///
/// Missing fields deserialize to their defaults, so a partial JSON object
/// (e.g. `{"eraser_radius": 4.0}`) is a valid configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Maximum deviation, in document units, between a curved stroke and
    /// the polyline that approximates it.
    pub flatten_tolerance: f64,

    /// Smallest zoom factor the view may reach. Requests below it clamp.
    pub min_zoom: f64,

    /// Largest zoom factor the view may reach. Requests above it clamp.
    pub max_zoom: f64,

    /// Multiplicative factor for one zoom-in step (one wheel notch).
    pub zoom_step: f64,

    /// Radius of the eraser, in document units.
    pub eraser_radius: f64,

    /// Detected contours enclosing at most this area (square document
    /// units) are tagged [`ColorTag::AutoMinor`](crate::ColorTag::AutoMinor).
    pub minor_area_threshold: f64,

    /// Whether loading a new image also resets the zoom factor.
    /// The pan offset is always reset.
    pub reset_zoom_on_load: bool,
}

impl EditorConfig {
    /// Default for [`flatten_tolerance`](Self::flatten_tolerance).
    pub const DEFAULT_FLATTEN_TOLERANCE: f64 = 0.1;
    /// Default for [`min_zoom`](Self::min_zoom).
    pub const DEFAULT_MIN_ZOOM: f64 = 0.1;
    /// Default for [`max_zoom`](Self::max_zoom).
    pub const DEFAULT_MAX_ZOOM: f64 = 50.0;
    /// Default for [`zoom_step`](Self::zoom_step).
    pub const DEFAULT_ZOOM_STEP: f64 = 1.15;
    /// Default for [`eraser_radius`](Self::eraser_radius).
    pub const DEFAULT_ERASER_RADIUS: f64 = 15.0;
    /// Default for [`minor_area_threshold`](Self::minor_area_threshold).
    pub const DEFAULT_MINOR_AREA_THRESHOLD: f64 = 100.0;

    /// Check every field, returning the first problem found.
    ///
    /// # Errors
    ///
    /// Returns [`EditError::InvalidConfig`] if a length or factor is
    /// non-finite or non-positive, if `min_zoom > max_zoom`, or if
    /// `zoom_step` does not exceed 1.
    pub fn validate(&self) -> Result<(), EditError> {
        let positive = [
            ("flatten_tolerance", self.flatten_tolerance),
            ("min_zoom", self.min_zoom),
            ("max_zoom", self.max_zoom),
            ("eraser_radius", self.eraser_radius),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(EditError::InvalidConfig(format!(
                    "{name} must be finite and positive, got {value}"
                )));
            }
        }
        if !self.minor_area_threshold.is_finite() || self.minor_area_threshold < 0.0 {
            return Err(EditError::InvalidConfig(format!(
                "minor_area_threshold must be finite and non-negative, got {}",
                self.minor_area_threshold
            )));
        }
        if !self.zoom_step.is_finite() || self.zoom_step <= 1.0 {
            return Err(EditError::InvalidConfig(format!(
                "zoom_step must be finite and greater than 1, got {}",
                self.zoom_step
            )));
        }
        if self.min_zoom > self.max_zoom {
            return Err(EditError::InvalidConfig(format!(
                "min_zoom ({}) exceeds max_zoom ({})",
                self.min_zoom, self.max_zoom
            )));
        }
        Ok(())
    }
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            flatten_tolerance: Self::DEFAULT_FLATTEN_TOLERANCE,
            min_zoom: Self::DEFAULT_MIN_ZOOM,
            max_zoom: Self::DEFAULT_MAX_ZOOM,
            zoom_step: Self::DEFAULT_ZOOM_STEP,
            eraser_radius: Self::DEFAULT_ERASER_RADIUS,
            minor_area_threshold: Self::DEFAULT_MINOR_AREA_THRESHOLD,
            reset_zoom_on_load: true,
        }
    }
}
