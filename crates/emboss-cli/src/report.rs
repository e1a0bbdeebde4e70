//! Human-readable and JSON summaries of a replayed session.

use serde::Serialize;

use emboss_edit::{ColorTag, FlatPolyline, FlattenReport};
use emboss_export::{DxfPoint, DxfPolyline, DxfProjection, Dimensions, extent};

use crate::script::ReplaySummary;

/// Everything the `emboss` binary prints about one session.
#[derive(Debug, Serialize)]
pub struct SessionReport<'a> {
    /// Outcome of replaying the script's actions.
    pub replay: ReplaySummary,
    /// Number of active edit log entries.
    pub history_cursor: usize,
    /// Number of edit log entries, including undone ones.
    pub history_len: usize,
    /// Counters from flattening.
    pub flatten: FlattenReport,
    /// Output polylines per color tag.
    pub tag_counts: TagCounts,
    /// Suggested DXF file name.
    pub export_file: String,
    /// `(min, max)` corners of the projected output, in millimetres.
    pub dxf_extent_mm: Option<(DxfPoint, DxfPoint)>,
    /// Flattened output in document space.
    pub polylines: &'a [FlatPolyline],
    /// Flattened output projected for a DXF writer.
    pub dxf: Vec<DxfPolyline>,
}

/// Output polylines per color tag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TagCounts {
    /// Detected contours above the minor-area threshold.
    pub auto_main: usize,
    /// Detected contours at or below the threshold.
    pub auto_minor: usize,
    /// Geometry drawn with the stroke tools.
    pub manual: usize,
}

impl TagCounts {
    /// Tally `polylines` by tag.
    #[must_use]
    pub fn count(polylines: &[FlatPolyline]) -> Self {
        polylines.iter().fold(Self::default(), |mut c, flat| {
            match flat.tag {
                ColorTag::AutoMain => c.auto_main += 1,
                ColorTag::AutoMinor => c.auto_minor += 1,
                ColorTag::Manual => c.manual += 1,
            }
            c
        })
    }
}

/// Inputs gathered after replay.
///
/// The first five fields carry over to [`SessionReport`] unchanged.
pub struct ReportInput<'a> {
    pub replay: ReplaySummary,
    pub history_cursor: usize,
    pub history_len: usize,
    pub flatten: FlattenReport,
    pub polylines: &'a [FlatPolyline],
    /// Mapping used for the DXF extent and output size.
    pub projection: DxfProjection,
    /// Canvas size in pixels.
    pub dimensions: Dimensions,
    /// Base name for the suggested export file.
    pub stem: &'a str,
}

impl<'a> SessionReport<'a> {
    /// Project the output and collect the summary.
    #[must_use]
    pub fn build(input: ReportInput<'a>) -> Self {
        let dxf = input.projection.project(input.polylines);
        Self {
            replay: input.replay,
            history_cursor: input.history_cursor,
            history_len: input.history_len,
            flatten: input.flatten,
            tag_counts: TagCounts::count(input.polylines),
            export_file: input.projection.file_name(input.stem, input.dimensions),
            dxf_extent_mm: extent(&dxf),
            polylines: input.polylines,
            dxf,
        }
    }

    /// Plain-text report for the terminal.
    #[must_use]
    pub fn render(&self) -> String {
        let mut lines = Vec::new();
        let rule = "=".repeat(48);

        lines.push(format!("Session\n{rule}"));
        lines.push(format!(
            "{:<24} {}/{}",
            "History (cursor/len)", self.history_cursor, self.history_len
        ));
        lines.push(format!(
            "{:<24} {} recorded, {} discarded, {} no-op",
            "Actions", self.replay.recorded, self.replay.discarded, self.replay.noops
        ));
        lines.push(String::new());

        let f = &self.flatten;
        lines.push(format!("Flatten\n{rule}"));
        lines.push(format!("{:<24} {}", "Base polylines", f.base_polylines));
        lines.push(format!("{:<24} {}", "Drawn strokes", f.drawn_strokes));
        lines.push(format!("{:<24} {}", "Erasures", f.erasures));
        lines.push(format!("{:<24} {}", "Fragments dropped", f.fragments_dropped));
        lines.push(format!("{:<24} {}", "Output polylines", f.output_polylines));
        let t = &self.tag_counts;
        lines.push(format!("{:<24} {}", "  AUTO_MAIN", t.auto_main));
        lines.push(format!("{:<24} {}", "  AUTO_MINOR", t.auto_minor));
        lines.push(format!("{:<24} {}", "  MANUAL", t.manual));
        lines.push(String::new());

        lines.push(format!("DXF\n{rule}"));
        match self.dxf_extent_mm {
            Some((lo, hi)) => {
                lines.push(format!(
                    "{:<24} ({:.3}, {:.3}) .. ({:.3}, {:.3}) mm",
                    "Extent", lo.x, lo.y, hi.x, hi.y
                ));
                lines.push(format!(
                    "{:<24} {:.3} x {:.3} mm",
                    "Size",
                    hi.x - lo.x,
                    hi.y - lo.y
                ));
            }
            None => lines.push(format!("{:<24} (empty)", "Extent")),
        }
        lines.push(format!("{:<24} {}", "File name", self.export_file));

        lines.join("\n")
    }
}
