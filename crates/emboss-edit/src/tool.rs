//! Stroke tools: turn pointer gestures into strokes.
//!
//! A gesture is `Begin`, any number of `Move`s, then `End`. Positions
//! arrive in view space and are mapped to document space with the view
//! state current at each event.

use serde::{Deserialize, Serialize};

use crate::config::EditorConfig;
use crate::coords;
use crate::stroke::Stroke;
use crate::types::{ColorTag, EditError, Point, Polyline, ViewPoint};
use crate::view::ViewState;

/// Drawing tool palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tool {
    /// Freehand paint.
    #[default]
    Paint,
    /// Straight line from the press point to the release point.
    Line,
    /// Axis-aligned rectangle spanning the drag.
    Rectangle,
    /// Isosceles triangle inscribed in the drag rectangle.
    Triangle,
    /// Ellipse inscribed in the drag rectangle.
    Ellipse,
    /// Erases geometry within the eraser radius of the dragged path.
    Eraser,
}

impl Tool {
    /// All tools, in palette order.
    pub const ALL: [Self; 6] = [
        Self::Paint,
        Self::Line,
        Self::Rectangle,
        Self::Triangle,
        Self::Ellipse,
        Self::Eraser,
    ];

    /// Whether the tool records every sample rather than just the drag
    /// endpoints.
    #[must_use]
    pub const fn records_path(self) -> bool {
        matches!(self, Self::Paint | Self::Eraser)
    }
}

/// Phase of a pointer interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointerPhase {
    /// Button pressed: starts a gesture.
    Begin,
    /// Pointer moved while pressed.
    Move,
    /// Button released: finishes the gesture.
    End,
}

/// A pointer sample in view space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerEvent {
    /// Pointer position in view pixels.
    pub position: ViewPoint,
    /// Where in the gesture this sample falls.
    pub phase: PointerPhase,
}

impl PointerEvent {
    /// Event at view position `(x, y)`.
    #[must_use]
    pub const fn new(x: f64, y: f64, phase: PointerPhase) -> Self {
        Self {
            position: ViewPoint::new(x, y),
            phase,
        }
    }
}

/// Gesture state for the active tool.
#[derive(Debug, Clone, PartialEq)]
pub struct StrokeTool {
    tool: Tool,
    eraser_radius: f64,
    samples: Vec<Point>,
    active: bool,
}

impl StrokeTool {
    /// Idle tool state.
    #[must_use]
    pub const fn new(tool: Tool, eraser_radius: f64) -> Self {
        Self {
            tool,
            eraser_radius,
            samples: Vec::new(),
            active: false,
        }
    }

    /// The paint tool with the configured eraser radius.
    #[must_use]
    pub const fn from_config(config: &EditorConfig) -> Self {
        Self::new(Tool::Paint, config.eraser_radius)
    }

    /// Selected tool.
    #[must_use]
    pub const fn tool(&self) -> Tool {
        self.tool
    }

    /// Select a tool. Any gesture in progress is discarded.
    pub fn set_tool(&mut self, tool: Tool) {
        if self.active && tool != self.tool {
            tracing::debug!(from = ?self.tool, to = ?tool, "tool switched mid-gesture");
        }
        self.tool = tool;
        self.cancel();
    }

    /// Radius given to new erasure strokes.
    #[must_use]
    pub const fn eraser_radius(&self) -> f64 {
        self.eraser_radius
    }

    /// Radius for the next erasure stroke. The current gesture, if any,
    /// picks it up when it finishes.
    pub const fn set_eraser_radius(&mut self, radius: f64) {
        self.eraser_radius = radius;
    }

    /// Whether a gesture is in progress.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Discard the gesture in progress, if any.
    pub fn cancel(&mut self) {
        self.samples.clear();
        self.active = false;
    }

    /// Feed one pointer event.
    ///
    /// Returns the finished stroke on `End`. `Move` and `End` with no
    /// gesture in progress are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`EditError::InvalidViewState`] if the position cannot be
    /// mapped to document space; the event is dropped. Returns
    /// [`EditError::DegenerateGeometry`] if the finished gesture does not
    /// make a valid stroke; the gesture is discarded.
    pub fn handle(
        &mut self,
        event: PointerEvent,
        view: &ViewState,
    ) -> Result<Option<Stroke>, EditError> {
        if event.phase != PointerPhase::Begin && !self.active {
            return Ok(None);
        }
        let point = coords::to_document(event.position, view)?;
        match event.phase {
            PointerPhase::Begin => {
                self.samples.clear();
                self.samples.push(point);
                self.active = true;
                Ok(None)
            }
            PointerPhase::Move => {
                self.record(point);
                Ok(None)
            }
            PointerPhase::End => {
                self.record(point);
                let result = self.build();
                self.cancel();
                match &result {
                    Ok(_) => tracing::debug!(tool = ?self.tool, "stroke finished"),
                    Err(e) => tracing::debug!(tool = ?self.tool, error = %e, "gesture discarded"),
                }
                result.map(Some)
            }
        }
    }

    /// In-progress geometry for on-screen feedback, or `None` when idle or
    /// when the gesture does not yet form a valid stroke.
    #[must_use]
    pub fn preview(&self, tolerance: f64) -> Option<Polyline> {
        if !self.active {
            return None;
        }
        self.build().ok().map(|s| s.as_polyline(tolerance))
    }

    fn record(&mut self, point: Point) {
        if !self.tool.records_path() {
            self.samples.truncate(1);
        }
        self.samples.push(point);
    }

    fn build(&self) -> Result<Stroke, EditError> {
        let (Some(&anchor), Some(&pointer)) = (self.samples.first(), self.samples.last()) else {
            return Err(EditError::DegenerateGeometry("empty gesture".into()));
        };
        let tag = ColorTag::Manual;
        match self.tool {
            Tool::Paint => Stroke::freehand(self.samples.clone(), tag),
            Tool::Eraser => Stroke::erasure(self.samples.clone(), self.eraser_radius),
            Tool::Line => Stroke::line(anchor, pointer, tag),
            Tool::Rectangle => Stroke::rectangle(anchor, pointer, tag),
            Tool::Triangle => Stroke::triangle_from_drag(anchor, pointer, tag),
            Tool::Ellipse => Stroke::ellipse_from_drag(anchor, pointer, tag),
        }
    }
}

impl Default for StrokeTool {
    fn default() -> Self {
        Self::from_config(&EditorConfig::default())
    }
}
