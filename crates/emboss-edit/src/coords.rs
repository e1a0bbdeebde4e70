//! Conversion between view (device pixel) and document coordinates.
//!
//! Both directions are pure functions of the [`ViewState`]:
//!
//! ```text
//! view     = document * zoom + pan
//! document = (view - pan) / zoom
//! ```

use crate::types::{EditError, Point, ViewPoint};
use crate::view::ViewState;

/// Map a view-space point into document space.
///
/// # Errors
///
/// Returns [`EditError::InvalidViewState`] if the view's zoom is not
/// finite and positive, or if the result would not be finite.
pub fn to_document(view_point: ViewPoint, view: &ViewState) -> Result<Point, EditError> {
    let zoom = checked_zoom(view)?;
    let pan = view.pan();
    let point = Point::new((view_point.x - pan.x) / zoom, (view_point.y - pan.y) / zoom);
    if point.is_finite() {
        Ok(point)
    } else {
        Err(EditError::InvalidViewState(format!(
            "view point ({}, {}) does not map to a finite document point",
            view_point.x, view_point.y
        )))
    }
}

/// Map a document-space point into view space.
///
/// # Errors
///
/// Returns [`EditError::InvalidViewState`] if the view's zoom is not
/// finite and positive, or if the result would not be finite.
pub fn to_view(point: Point, view: &ViewState) -> Result<ViewPoint, EditError> {
    let zoom = checked_zoom(view)?;
    let pan = view.pan();
    let x = point.x.mul_add(zoom, pan.x);
    let y = point.y.mul_add(zoom, pan.y);
    if x.is_finite() && y.is_finite() {
        Ok(ViewPoint::new(x, y))
    } else {
        Err(EditError::InvalidViewState(format!(
            "document point ({}, {}) does not map to a finite view point",
            point.x, point.y
        )))
    }
}

fn checked_zoom(view: &ViewState) -> Result<f64, EditError> {
    let zoom = view.zoom();
    if zoom.is_finite() && zoom > 0.0 {
        Ok(zoom)
    } else {
        Err(EditError::InvalidViewState(format!(
            "zoom must be finite and positive, got {zoom}"
        )))
    }
}
