//! emboss-edit: Contour correction model (sans-IO).
//!
//! Holds the detected contours of one image (the base layer) and an
//! undoable log of user strokes drawn over them:
//! freehand paint, lines, rectangles, triangles, ellipses and erasures.
//! [`flatten`] folds the active strokes over the base layer into the
//! final polyline set handed to exporters and renderers.
//!
//! This crate has **no I/O dependencies**. Contour detection, entity
//! encoding and drawing all live outside it; [`Session`] is the entry
//! point a host application drives.

pub mod base;
pub mod config;
pub mod coords;
pub mod erase;
pub mod flatten;
pub mod history;
pub mod session;
pub mod stroke;
pub mod tool;
pub mod types;
pub mod view;

pub use base::BaseLayer;
pub use config::EditorConfig;
pub use coords::{to_document, to_view};
pub use erase::{EraseOutcome, ErasurePath};
pub use flatten::{FlatPolyline, FlattenReport, Origin, flatten, flatten_with_report};
pub use history::{EditLog, EditLogEntry};
pub use session::Session;
pub use stroke::{Stroke, StrokeKind};
pub use tool::{PointerEvent, PointerPhase, StrokeTool, Tool};
pub use types::{BoundingBox, ColorTag, EditError, Point, Polyline, ViewPoint};
pub use view::ViewState;
