//! Session scripts: a base layer plus the editing actions to replay on it.
//!
//! ```json
//! {
//!   "base": [{ "points": [{"x": 0, "y": 0}, {"x": 10, "y": 0}] }],
//!   "actions": [
//!     { "tool": "eraser" },
//!     { "pointer": { "position": {"x": 5, "y": -5}, "phase": "begin" } },
//!     { "pointer": { "position": {"x": 5, "y": 5}, "phase": "end" } },
//!     "undo",
//!     "redo"
//!   ]
//! }
//! ```

use serde::{Deserialize, Serialize};

use emboss_edit::{EditError, Polyline, PointerEvent, Session, Stroke, Tool};

/// A recorded editing session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionScript {
    /// Detected contours, classified by area when loaded.
    #[serde(default)]
    pub base: Vec<Polyline>,

    /// Actions in the order they were performed.
    #[serde(default)]
    pub actions: Vec<Action>,
}

/// One user action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Record a finished stroke directly.
    Push(Stroke),
    /// Feed a pointer event to the active tool.
    Pointer(PointerEvent),
    /// Select a drawing tool.
    Tool(Tool),
    /// Undo the last applied stroke.
    Undo,
    /// Redo the next undone stroke.
    Redo,
    /// Zoom in one step about the view origin.
    ZoomIn,
    /// Zoom out one step about the view origin.
    ZoomOut,
}

/// Errors from reading or replaying a session script.
#[derive(Debug, thiserror::Error)]
pub enum ScriptError {
    /// The JSON is malformed or holds an invalid stroke.
    #[error("malformed session script: {0}")]
    Parse(#[from] serde_json::Error),

    /// An action at `index` was rejected.
    #[error("action {index}: {source}")]
    Action {
        index: usize,
        #[source]
        source: EditError,
    },
}

/// Outcome counters of a replay.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReplaySummary {
    /// Strokes added to the edit log.
    pub recorded: usize,
    /// Gestures whose stroke failed to construct and was discarded.
    pub discarded: usize,
    /// Undo or redo requests with nothing to act on.
    pub noops: usize,
}

impl SessionScript {
    /// Parse a script from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`ScriptError::Parse`] for malformed JSON or strokes that
    /// fail validation.
    pub fn from_json(text: &str) -> Result<Self, ScriptError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Load the base layer into `session` and replay every action.
    ///
    /// A gesture that ends in degenerate geometry is discarded the way an
    /// interactive editor would, and replay continues.
    ///
    /// # Errors
    ///
    /// Returns [`ScriptError::Action`] when a navigation action fails.
    pub fn replay(self, session: &mut Session) -> Result<ReplaySummary, ScriptError> {
        session.load_image(self.base);
        let mut summary = ReplaySummary::default();

        for (index, action) in self.actions.into_iter().enumerate() {
            match action {
                Action::Push(stroke) => {
                    session.push_stroke(stroke);
                    summary.recorded += 1;
                }
                Action::Pointer(event) => match session.pointer(event) {
                    Ok(Some(_)) => summary.recorded += 1,
                    Ok(None) => {}
                    Err(e) => {
                        tracing::warn!(index, error = %e, "gesture discarded");
                        summary.discarded += 1;
                    }
                },
                Action::Tool(tool) => session.set_tool(tool),
                Action::Undo => {
                    if !session.undo() {
                        summary.noops += 1;
                    }
                }
                Action::Redo => {
                    if !session.redo() {
                        summary.noops += 1;
                    }
                }
                Action::ZoomIn => session
                    .zoom_in()
                    .map_err(|source| ScriptError::Action { index, source })?,
                Action::ZoomOut => session
                    .zoom_out()
                    .map_err(|source| ScriptError::Action { index, source })?,
            }
        }

        tracing::debug!(?summary, "replay finished");
        Ok(summary)
    }
}
