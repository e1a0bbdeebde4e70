//! emboss-export: Output projections (sans-IO)
//!
//! Maps flattened polylines into the coordinate space and layer naming a
//! DXF entity writer expects, and renders an SVG preview. Entity encoding
//! and file writing stay with the caller.

pub mod dxf;
pub mod svg;
pub mod types;

pub use dxf::{DxfPoint, DxfPolyline, DxfProjection, extent, layer_name};
pub use svg::{SvgMetadata, build_path_data, stroke_color, to_svg};
pub use types::{Dimensions, ExportError};
