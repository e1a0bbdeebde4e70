//! Editing session for one loaded image.

use crate::base::BaseLayer;
use crate::config::EditorConfig;
use crate::flatten::{self, FlatPolyline, FlattenReport};
use crate::history::EditLog;
use crate::stroke::Stroke;
use crate::tool::{PointerEvent, StrokeTool, Tool};
use crate::types::{ColorTag, EditError, Polyline, ViewPoint};
use crate::view::ViewState;

/// Identifies the inputs a cached flatten was computed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CacheKey {
    generation: u64,
    last_active_seq: Option<u64>,
}

#[derive(Debug, Clone)]
struct FlattenCache {
    key: CacheKey,
    output: Vec<FlatPolyline>,
    report: FlattenReport,
}

/// Base layer, edit log, view, tool and configuration for one image.
///
/// All mutation happens through `&mut self`; a host that detects
/// contours on another thread hands the finished polylines to
/// [`replace_base_layer`](Self::replace_base_layer).
#[derive(Debug, Clone)]
pub struct Session {
    config: EditorConfig,
    base: BaseLayer,
    log: EditLog,
    view: ViewState,
    tool: StrokeTool,
    cache: Option<FlattenCache>,
}

impl Session {
    /// Empty session.
    ///
    /// # Errors
    ///
    /// Returns [`EditError::InvalidConfig`] if `config` does not validate.
    pub fn new(config: EditorConfig) -> Result<Self, EditError> {
        config.validate()?;
        Ok(Self {
            base: BaseLayer::new(),
            log: EditLog::new(),
            view: ViewState::from_config(&config),
            tool: StrokeTool::from_config(&config),
            cache: None,
            config,
        })
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Swap the configuration.
    ///
    /// The eraser radius applies to the next gesture, the zoom range is
    /// applied to the current view, and the flatten cache is dropped.
    ///
    /// # Errors
    ///
    /// Returns [`EditError::InvalidConfig`] if `config` does not validate;
    /// the session is unchanged.
    pub fn set_config(&mut self, config: EditorConfig) -> Result<(), EditError> {
        config.validate()?;
        self.view = ViewState::with_range(
            self.view.zoom(),
            self.view.pan(),
            config.min_zoom,
            config.max_zoom,
        )?;
        self.tool.set_eraser_radius(config.eraser_radius);
        self.config = config;
        self.cache = None;
        Ok(())
    }

    /// Detected contours of the loaded image.
    #[must_use]
    pub const fn base(&self) -> &BaseLayer {
        &self.base
    }

    /// Edit history.
    #[must_use]
    pub const fn log(&self) -> &EditLog {
        &self.log
    }

    /// Current zoom and pan.
    #[must_use]
    pub const fn view(&self) -> &ViewState {
        &self.view
    }

    /// Mutable view for navigation. The view never affects flattening.
    pub const fn view_mut(&mut self) -> &mut ViewState {
        &mut self.view
    }

    /// Selected tool and any gesture in progress.
    #[must_use]
    pub const fn tool(&self) -> &StrokeTool {
        &self.tool
    }

    /// Select a drawing tool, discarding any gesture in progress.
    pub fn set_tool(&mut self, tool: Tool) {
        self.tool.set_tool(tool);
    }

    /// Replace the base layer, classifying polylines by area. The edit
    /// log is kept.
    pub fn replace_base_layer(&mut self, polylines: Vec<Polyline>) {
        self.base.replace(polylines, self.config.minor_area_threshold);
        self.cache = None;
    }

    /// Replace the base layer with pre-tagged polylines. The edit log is
    /// kept.
    pub fn replace_base_layer_tagged(&mut self, polylines: Vec<(Polyline, ColorTag)>) {
        self.base.replace_tagged(polylines);
        self.cache = None;
    }

    /// Start over with a newly loaded image.
    ///
    /// Replaces the base layer, clears the edit log and any gesture, and
    /// resets the pan (and the zoom, if configured).
    pub fn load_image(&mut self, polylines: Vec<Polyline>) {
        self.log.clear();
        self.tool.cancel();
        if self.config.reset_zoom_on_load {
            self.view.reset();
        } else {
            self.view.reset_pan();
        }
        self.replace_base_layer(polylines);
        tracing::info!(polylines = self.base.len(), "image loaded");
    }

    /// Record a finished stroke. Returns its sequence number.
    pub fn push_stroke(&mut self, stroke: Stroke) -> u64 {
        let seq = self.log.push(stroke);
        tracing::debug!(seq, cursor = self.log.cursor(), "stroke pushed");
        seq
    }

    /// Undo the last applied stroke. Returns `false` if there was none.
    pub fn undo(&mut self) -> bool {
        let undone = self.log.undo();
        tracing::debug!(undone, cursor = self.log.cursor(), "undo");
        undone
    }

    /// Redo the next undone stroke. Returns `false` if there was none.
    pub fn redo(&mut self) -> bool {
        let redone = self.log.redo();
        tracing::debug!(redone, cursor = self.log.cursor(), "redo");
        redone
    }

    /// Returns `true` if there is a stroke to undo.
    #[must_use]
    pub const fn can_undo(&self) -> bool {
        self.log.can_undo()
    }

    /// Returns `true` if there is an undone stroke to redo.
    #[must_use]
    pub const fn can_redo(&self) -> bool {
        self.log.can_redo()
    }

    /// Feed a pointer event to the active tool, recording the stroke when
    /// a gesture finishes.
    ///
    /// Returns the sequence number of the recorded stroke, if any.
    ///
    /// # Errors
    ///
    /// Propagates [`StrokeTool::handle`] errors; nothing is recorded.
    pub fn pointer(&mut self, event: PointerEvent) -> Result<Option<u64>, EditError> {
        let stroke = self.tool.handle(event, &self.view)?;
        Ok(stroke.map(|s| self.push_stroke(s)))
    }

    /// In-progress tool geometry.
    #[must_use]
    pub fn preview(&self) -> Option<Polyline> {
        self.tool.preview(self.config.flatten_tolerance)
    }

    /// Zoom in one step about the view origin.
    ///
    /// # Errors
    ///
    /// Returns [`EditError::InvalidViewState`] for an unusable zoom step.
    pub fn zoom_in(&mut self) -> Result<(), EditError> {
        self.view.zoom_in(self.config.zoom_step)
    }

    /// Zoom out one step about the view origin.
    ///
    /// # Errors
    ///
    /// Returns [`EditError::InvalidViewState`] for an unusable zoom step.
    pub fn zoom_out(&mut self) -> Result<(), EditError> {
        self.view.zoom_out(self.config.zoom_step)
    }

    /// Wheel zoom: `notches` steps in (positive) or out (negative), keeping
    /// the document point under `anchor` fixed.
    ///
    /// # Errors
    ///
    /// Returns [`EditError::InvalidViewState`] for a non-finite anchor.
    pub fn wheel_zoom(&mut self, anchor: ViewPoint, notches: i32) -> Result<(), EditError> {
        self.view.zoom_at(anchor, self.config.zoom_step.powi(notches))
    }

    /// Flattened output for the current base layer and active entries.
    pub fn flatten(&mut self) -> &[FlatPolyline] {
        &self.cached().output
    }

    /// [`flatten`](Self::flatten) plus the report for that computation.
    pub fn flatten_with_report(&mut self) -> (&[FlatPolyline], FlattenReport) {
        let cache = self.cached();
        (&cache.output, cache.report)
    }

    fn cached(&mut self) -> &FlattenCache {
        let key = CacheKey {
            generation: self.base.generation(),
            last_active_seq: self.log.last_active_seq(),
        };
        let cache = match self.cache.take() {
            Some(cache) if cache.key == key => {
                tracing::trace!(?key, "flatten cache hit");
                cache
            }
            _ => {
                let (output, report) = flatten::flatten_with_report(
                    &self.base,
                    self.log.active_entries(),
                    self.config.flatten_tolerance,
                );
                FlattenCache {
                    key,
                    output,
                    report,
                }
            }
        };
        self.cache.insert(cache)
    }
}

impl Default for Session {
    fn default() -> Self {
        let config = EditorConfig::default();
        Self {
            base: BaseLayer::new(),
            log: EditLog::new(),
            view: ViewState::from_config(&config),
            tool: StrokeTool::from_config(&config),
            cache: None,
            config,
        }
    }
}
