//! Shared types for the export projections.

use serde::{Deserialize, Serialize};

/// Image dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

/// Errors from building an export projection.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ExportError {
    /// The pixel size or export scale is out of range.
    #[error("invalid scale: {0}")]
    InvalidScale(String),
}
