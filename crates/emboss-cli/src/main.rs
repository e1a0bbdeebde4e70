//! emboss: replay a contour correction session and report the result.
//!
//! Loads a JSON session script (detected contours plus the user's
//! strokes, pointer gestures and undo/redo steps), replays it against an
//! editing session and prints the flattened output: a per-tag summary
//! with the DXF extent in millimetres, or the full output as JSON.
//! Optionally writes an SVG preview.
//!
//! # Usage
//!
//! ```text
//! cargo run --bin emboss -- [OPTIONS] <SESSION_JSON>
//! ```

#![allow(clippy::print_stdout, clippy::print_stderr)]

mod report;
mod script;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use emboss_edit::{EditorConfig, FlatPolyline, Session};
use emboss_export::{Dimensions, DxfProjection, SvgMetadata};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

use crate::report::{ReportInput, SessionReport};
use crate::script::SessionScript;

/// Contour correction session replay for emboss.
///
/// Replays a recorded editing session over its detected contours and
/// prints what would be exported.
#[derive(Parser)]
#[command(name = "emboss", version)]
struct Cli {
    /// Path to the session script (JSON).
    session_json: PathBuf,

    /// Maximum deviation of flattened curves, in pixels.
    #[arg(long, default_value_t = EditorConfig::DEFAULT_FLATTEN_TOLERANCE)]
    flatten_tolerance: f64,

    /// Eraser radius, in pixels.
    #[arg(long, default_value_t = EditorConfig::DEFAULT_ERASER_RADIUS)]
    eraser_radius: f64,

    /// Full editor config as a JSON string.
    ///
    /// When provided, the individual editor flags are ignored. Missing
    /// fields take their defaults.
    #[arg(long)]
    config_json: Option<String>,

    /// Physical size of one pixel in millimetres.
    #[arg(long, default_value_t = DxfProjection::DEFAULT_MM_PER_PX)]
    mm_per_px: f64,

    /// Export scale (0.1-10.0).
    #[arg(long, default_value_t = DxfProjection::DEFAULT_EXPORT_SCALE)]
    export_scale: f64,

    /// Canvas width in pixels. Defaults to the extent of the output.
    #[arg(long)]
    width: Option<u32>,

    /// Canvas height in pixels. Defaults to the extent of the output.
    #[arg(long)]
    height: Option<u32>,

    /// Write an SVG preview to file.
    #[arg(long)]
    svg: Option<PathBuf>,

    /// Output the report and flattened polylines as JSON.
    #[arg(long)]
    json: bool,

    /// Log at debug level unless `RUST_LOG` says otherwise.
    #[arg(long, short)]
    verbose: bool,
}

/// Build an [`EditorConfig`] from CLI arguments.
///
/// If `--config-json` is provided, the JSON is parsed directly and the
/// individual flags are ignored.
fn config_from_cli(cli: &Cli) -> Result<EditorConfig, String> {
    if let Some(ref json) = cli.config_json {
        return serde_json::from_str(json).map_err(|e| format!("Error parsing --config-json: {e}"));
    }

    Ok(EditorConfig {
        flatten_tolerance: cli.flatten_tolerance,
        eraser_radius: cli.eraser_radius,
        ..EditorConfig::default()
    })
}

/// Install a stderr `fmt` subscriber filtered by `RUST_LOG`.
fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .init();
}

/// Canvas size: explicit flags, else the rounded-up extent of `polylines`
/// (at least one pixel each way).
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn canvas_size(cli: &Cli, polylines: &[FlatPolyline]) -> Dimensions {
    let bounds = polylines
        .iter()
        .filter_map(|f| f.polyline.bounding_box())
        .reduce(emboss_edit::BoundingBox::union);
    let (max_x, max_y) = bounds.map_or((1.0, 1.0), |b| (b.max_x, b.max_y));
    let fit = |v: f64| v.ceil().clamp(1.0, f64::from(u32::MAX)) as u32;
    Dimensions {
        width: cli.width.unwrap_or_else(|| fit(max_x)),
        height: cli.height.unwrap_or_else(|| fit(max_y)),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = match config_from_cli(&cli) {
        Ok(c) => c,
        Err(msg) => {
            eprintln!("{msg}");
            return ExitCode::FAILURE;
        }
    };

    let mut session = match Session::new(config) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let text = match std::fs::read_to_string(&cli.session_json) {
        Ok(text) => text,
        Err(e) => {
            eprintln!("Error reading {}: {e}", cli.session_json.display());
            return ExitCode::FAILURE;
        }
    };

    let replay = match SessionScript::from_json(&text).and_then(|s| s.replay(&mut session)) {
        Ok(summary) => summary,
        Err(e) => {
            eprintln!("Error in {}: {e}", cli.session_json.display());
            return ExitCode::FAILURE;
        }
    };

    let history_cursor = session.log().cursor();
    let history_len = session.log().len();
    let config_json = serde_json::to_string(session.config()).ok();
    let (polylines, flatten) = session.flatten_with_report();
    let dimensions = canvas_size(&cli, polylines);

    let projection = match DxfProjection::new(
        cli.mm_per_px,
        cli.export_scale,
        f64::from(dimensions.height),
    ) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let stem = cli
        .session_json
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("emboss");

    let report = SessionReport::build(ReportInput {
        replay,
        history_cursor,
        history_len,
        flatten,
        polylines,
        projection,
        dimensions,
        stem,
    });

    if cli.json {
        match serde_json::to_string_pretty(&report) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("Error serializing report: {e}");
                return ExitCode::FAILURE;
            }
        }
    } else {
        println!("{}", report.render());
    }

    if let Some(ref svg_path) = cli.svg {
        let metadata = SvgMetadata {
            title: Some(stem),
            description: None,
            config_json: config_json.as_deref(),
        };
        let svg = emboss_export::to_svg(polylines, dimensions, &metadata);
        match std::fs::write(svg_path, &svg) {
            Ok(()) => {
                eprintln!("SVG written to {} ({} bytes)", svg_path.display(), svg.len());
            }
            Err(e) => {
                eprintln!("Error writing SVG to {}: {e}", svg_path.display());
                return ExitCode::FAILURE;
            }
        }
    }

    ExitCode::SUCCESS
}
