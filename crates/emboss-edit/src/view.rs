//! View state: the zoom factor and pan offset of the editing canvas.
//!
//! The view never affects stored geometry. It only determines how view
//! (device pixel) coordinates map onto document coordinates, see
//! [`crate::coords`].

use crate::config::EditorConfig;
use crate::coords;
use crate::types::{EditError, ViewPoint};

/// Current zoom factor and pan offset.
///
/// The mapping is `view = document * zoom + pan`, so `pan` is measured in
/// view pixels. The zoom factor is kept within `[min_zoom, max_zoom]`;
/// requests outside that range clamp.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewState {
    zoom: f64,
    pan: ViewPoint,
    min_zoom: f64,
    max_zoom: f64,
}

impl ViewState {
    /// Create a view state with the default zoom range.
    ///
    /// # Errors
    ///
    /// Returns [`EditError::InvalidViewState`] if `zoom` is not finite and
    /// positive or `pan` is not finite.
    pub fn new(zoom: f64, pan: ViewPoint) -> Result<Self, EditError> {
        Self::with_range(
            zoom,
            pan,
            EditorConfig::DEFAULT_MIN_ZOOM,
            EditorConfig::DEFAULT_MAX_ZOOM,
        )
    }

    /// Create a view state with an explicit zoom range. `zoom` is clamped
    /// into the range.
    ///
    /// # Errors
    ///
    /// Returns [`EditError::InvalidViewState`] if `zoom` or either bound is
    /// not finite and positive, if `min_zoom > max_zoom`, or if `pan` is
    /// not finite.
    pub fn with_range(
        zoom: f64,
        pan: ViewPoint,
        min_zoom: f64,
        max_zoom: f64,
    ) -> Result<Self, EditError> {
        check_zoom(zoom)?;
        check_zoom(min_zoom)?;
        check_zoom(max_zoom)?;
        if min_zoom > max_zoom {
            return Err(EditError::InvalidViewState(format!(
                "zoom range is empty: [{min_zoom}, {max_zoom}]"
            )));
        }
        if !pan.x.is_finite() || !pan.y.is_finite() {
            return Err(EditError::InvalidViewState(format!(
                "pan offset must be finite, got ({}, {})",
                pan.x, pan.y
            )));
        }
        Ok(Self {
            zoom: zoom.clamp(min_zoom, max_zoom),
            pan,
            min_zoom,
            max_zoom,
        })
    }

    /// Identity view (zoom 1, no pan) using the zoom range of `config`.
    ///
    /// A config that has not been validated falls back to the default
    /// zoom range.
    #[must_use]
    pub fn from_config(config: &EditorConfig) -> Self {
        Self::with_range(1.0, ViewPoint::new(0.0, 0.0), config.min_zoom, config.max_zoom)
            .unwrap_or_default()
    }

    /// Current zoom factor.
    #[must_use]
    pub const fn zoom(&self) -> f64 {
        self.zoom
    }

    /// Current pan offset in view pixels.
    #[must_use]
    pub const fn pan(&self) -> ViewPoint {
        self.pan
    }

    /// Allowed zoom range as `(min, max)`.
    #[must_use]
    pub const fn zoom_range(&self) -> (f64, f64) {
        (self.min_zoom, self.max_zoom)
    }

    /// Set the zoom factor, clamped to the allowed range.
    ///
    /// # Errors
    ///
    /// Returns [`EditError::InvalidViewState`] for a non-finite or
    /// non-positive factor; the prior zoom is kept.
    pub fn set_zoom(&mut self, zoom: f64) -> Result<(), EditError> {
        check_zoom(zoom)?;
        self.zoom = zoom.clamp(self.min_zoom, self.max_zoom);
        Ok(())
    }

    /// Multiply the zoom factor by `factor`, clamped to the allowed range.
    ///
    /// The pan offset is unchanged, so zooming is about the view origin.
    ///
    /// # Errors
    ///
    /// Returns [`EditError::InvalidViewState`] for a non-finite or
    /// non-positive factor; the prior zoom is kept.
    pub fn zoom_by(&mut self, factor: f64) -> Result<(), EditError> {
        check_zoom(factor)?;
        self.set_zoom(self.zoom * factor)
    }

    /// One zoom-in step of `step` (e.g. [`EditorConfig::zoom_step`]).
    ///
    /// # Errors
    ///
    /// See [`zoom_by`](Self::zoom_by).
    pub fn zoom_in(&mut self, step: f64) -> Result<(), EditError> {
        self.zoom_by(step)
    }

    /// One zoom-out step of `step`, the inverse of [`zoom_in`](Self::zoom_in).
    ///
    /// # Errors
    ///
    /// See [`zoom_by`](Self::zoom_by).
    pub fn zoom_out(&mut self, step: f64) -> Result<(), EditError> {
        check_zoom(step)?;
        self.zoom_by(step.recip())
    }

    /// Zoom by `factor` while keeping the document point under `anchor`
    /// fixed on screen (mouse-wheel zoom).
    ///
    /// # Errors
    ///
    /// Returns [`EditError::InvalidViewState`] for an invalid factor or a
    /// non-finite anchor; the prior state is kept.
    pub fn zoom_at(&mut self, anchor: ViewPoint, factor: f64) -> Result<(), EditError> {
        let fixed = coords::to_document(anchor, self)?;
        let mut next = *self;
        next.zoom_by(factor)?;
        next.pan = ViewPoint::new(
            fixed.x.mul_add(-next.zoom, anchor.x),
            fixed.y.mul_add(-next.zoom, anchor.y),
        );
        *self = next;
        Ok(())
    }

    /// Shift the pan offset by `(dx, dy)` view pixels.
    ///
    /// Non-finite deltas are ignored.
    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        let next = ViewPoint::new(self.pan.x + dx, self.pan.y + dy);
        if next.x.is_finite() && next.y.is_finite() {
            self.pan = next;
        }
    }

    /// Reset the pan offset to the origin, keeping the zoom.
    pub const fn reset_pan(&mut self) {
        self.pan = ViewPoint::new(0.0, 0.0);
    }

    /// Reset to zoom 1 (clamped to the range) and no pan.
    pub fn reset(&mut self) {
        self.zoom = 1.0_f64.clamp(self.min_zoom, self.max_zoom);
        self.reset_pan();
    }
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            pan: ViewPoint::new(0.0, 0.0),
            min_zoom: EditorConfig::DEFAULT_MIN_ZOOM,
            max_zoom: EditorConfig::DEFAULT_MAX_ZOOM,
        }
    }
}

fn check_zoom(zoom: f64) -> Result<(), EditError> {
    if zoom.is_finite() && zoom > 0.0 {
        Ok(())
    } else {
        Err(EditError::InvalidViewState(format!(
            "zoom must be finite and positive, got {zoom}"
        )))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::Point;

    #[test]
    fn default_is_identity() {
        let view = ViewState::default();
        assert!((view.zoom() - 1.0).abs() < f64::EPSILON);
        assert_eq!(view.pan(), ViewPoint::new(0.0, 0.0));
    }

    #[test]
    fn non_positive_zoom_rejected() {
        assert!(matches!(
            ViewState::new(0.0, ViewPoint::new(0.0, 0.0)),
            Err(EditError::InvalidViewState(_))
        ));
        assert!(ViewState::new(-2.0, ViewPoint::new(0.0, 0.0)).is_err());
        assert!(ViewState::new(f64::NAN, ViewPoint::new(0.0, 0.0)).is_err());
    }

    #[test]
    fn zoom_by_clamps_to_range() {
        let mut view = ViewState::with_range(1.0, ViewPoint::new(0.0, 0.0), 0.5, 4.0).unwrap();
        view.zoom_by(100.0).unwrap();
        assert!((view.zoom() - 4.0).abs() < f64::EPSILON);
        view.zoom_by(0.0001).unwrap();
        assert!((view.zoom() - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn zoom_by_rejects_invalid_factor_and_keeps_state() {
        let mut view = ViewState::new(2.0, ViewPoint::new(3.0, 4.0)).unwrap();
        let before = view;
        assert!(view.zoom_by(0.0).is_err());
        assert!(view.zoom_by(f64::INFINITY).is_err());
        assert_eq!(view, before);
    }

    #[test]
    fn zoom_in_and_out_are_inverse() {
        let mut view = ViewState::new(2.0, ViewPoint::new(0.0, 0.0)).unwrap();
        view.zoom_in(1.15).unwrap();
        assert!((view.zoom() - 2.3).abs() < 1e-12);
        view.zoom_out(1.15).unwrap();
        assert!((view.zoom() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn zoom_at_keeps_anchor_fixed() {
        let mut view = ViewState::new(1.5, ViewPoint::new(10.0, -4.0)).unwrap();
        let anchor = ViewPoint::new(120.0, 80.0);
        let before = coords::to_document(anchor, &view).unwrap();
        view.zoom_at(anchor, 1.15).unwrap();
        let after = coords::to_document(anchor, &view).unwrap();
        assert!(before.distance(after) < 1e-9);
        assert!((view.zoom() - 1.5 * 1.15).abs() < 1e-12);
    }

    #[test]
    fn pan_by_accumulates_and_ignores_non_finite() {
        let mut view = ViewState::default();
        view.pan_by(5.0, -2.0);
        view.pan_by(1.0, 1.0);
        view.pan_by(f64::NAN, 1.0);
        assert_eq!(view.pan(), ViewPoint::new(6.0, -1.0));
    }

    #[test]
    fn reset_restores_identity() {
        let mut view = ViewState::new(3.0, ViewPoint::new(9.0, 9.0)).unwrap();
        view.reset();
        assert_eq!(view, ViewState::default());
        let origin = coords::to_document(ViewPoint::new(0.0, 0.0), &view).unwrap();
        assert_eq!(origin, Point::new(0.0, 0.0));
    }

    #[test]
    fn reset_clamps_identity_zoom_into_range() {
        let mut view = ViewState::with_range(4.0, ViewPoint::new(0.0, 0.0), 2.0, 8.0).unwrap();
        view.reset();
        assert!((view.zoom() - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn from_config_uses_configured_range() {
        let config = EditorConfig {
            min_zoom: 0.25,
            max_zoom: 2.0,
            ..EditorConfig::default()
        };
        let view = ViewState::from_config(&config);
        assert_eq!(view.zoom_range(), (0.25, 2.0));
    }
}
