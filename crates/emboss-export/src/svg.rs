//! SVG preview serializer.
//!
//! Converts flattened polylines into an SVG string with `<path>` elements
//! using the [`svg`] crate for document construction, XML escaping, and
//! path data formatting. Each polyline becomes one `<path>` using `M`
//! (move to) and `L` (line to) commands, with `Z` when closed, stroked in
//! the color of its tag.
//!
//! This is a pure function with no I/O -- it returns a `String`.

use svg::Document;
use svg::node::element::path::Data;
use svg::node::element::{Description, Element, Path, Title};
use svg::node::{Node, Text, Value};

use emboss_edit::{ColorTag, FlatPolyline, Polyline};

use crate::types::Dimensions;

/// Metadata to embed in the SVG document.
///
/// When present, a `<title>` and/or `<desc>` element is emitted
/// immediately after the opening `<svg>` tag. Text values are XML-escaped
/// automatically by the `svg` crate.
#[derive(Debug, Clone, Default)]
pub struct SvgMetadata<'a> {
    /// Document title, emitted as `<title>`. Typically the image name.
    pub title: Option<&'a str>,

    /// Document description, emitted as `<desc>`.
    pub description: Option<&'a str>,

    /// Serialized editor configuration, emitted inside a `<metadata>`
    /// element wrapped in a namespaced `<emboss:config>` element.
    pub config_json: Option<&'a str>,
}

/// Stroke color for geometry with the given tag.
#[must_use]
pub const fn stroke_color(tag: ColorTag) -> &'static str {
    match tag {
        ColorTag::AutoMain => "rgb(0,100,0)",
        ColorTag::AutoMinor => "rgb(255,0,0)",
        ColorTag::Manual => "rgb(0,0,255)",
    }
}

/// Build an SVG path `d` attribute string from a polyline.
///
/// Uses `M` for the first point, `L` for subsequent points, and a final
/// `z` for closed polylines. Returns an empty string for polylines with
/// fewer than 2 points.
///
/// # Examples
///
/// ```
/// use emboss_edit::{Point, Polyline};
/// use emboss_export::build_path_data;
///
/// let polyline = Polyline::new(vec![
///     Point::new(10.0, 20.0),
///     Point::new(30.0, 40.0),
/// ]);
/// let d = build_path_data(&polyline);
/// assert_eq!(d, "M10,20 L30,40");
/// ```
#[must_use]
pub fn build_path_data(polyline: &Polyline) -> String {
    let points = polyline.points();
    if points.len() < 2 {
        return String::new();
    }

    let first = &points[0];
    let mut data = Data::new().move_to((first.x, first.y));
    for p in &points[1..] {
        data = data.line_to((p.x, p.y));
    }
    if polyline.is_closed() {
        data = data.close();
    }
    String::from(Value::from(data))
}

/// Serialize flattened polylines into an SVG preview.
///
/// The `viewBox` spans `dimensions` in document units so the preview
/// overlays the source image one-to-one.
#[must_use]
pub fn to_svg(
    polylines: &[FlatPolyline],
    dimensions: Dimensions,
    metadata: &SvgMetadata<'_>,
) -> String {
    let w = dimensions.width;
    let h = dimensions.height;
    let mut doc = Document::new()
        .set("width", w)
        .set("height", h)
        .set("viewBox", (0, 0, w, h));

    if let Some(title) = metadata.title {
        doc = doc.add(Title::new(title));
    }

    if let Some(description) = metadata.description {
        doc = doc.add(Description::new().add(Text::new(description)));
    }

    if let Some(config_json) = metadata.config_json {
        let mut config_el = Element::new("emboss:config");
        config_el.assign("xmlns:emboss", "https://emboss-rs.github.io/ns/1");
        config_el.append(Text::new(config_json));
        let mut metadata_el = Element::new("metadata");
        metadata_el.append(config_el);
        doc = doc.add(metadata_el);
    }

    for flat in polylines {
        let d = build_path_data(&flat.polyline);
        if d.is_empty() {
            continue;
        }

        let path = Path::new()
            .set("d", d)
            .set("fill", "none")
            .set("stroke", stroke_color(flat.tag))
            .set("stroke-width", 1);
        doc = doc.add(path);
    }

    // The svg crate omits the XML declaration, so we prepend it.
    format!("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n{doc}\n")
}

#[cfg(test)]
mod tests {
    use emboss_edit::{Origin, Point};

    use super::*;

    fn dims(width: u32, height: u32) -> Dimensions {
        Dimensions { width, height }
    }

    fn no_meta() -> SvgMetadata<'static> {
        SvgMetadata::default()
    }

    fn flat(polyline: Polyline, tag: ColorTag) -> FlatPolyline {
        FlatPolyline {
            polyline,
            tag,
            origin: Origin::Entry(0),
        }
    }

    // --- build_path_data ---

    #[test]
    fn build_path_data_empty_polyline() {
        assert_eq!(build_path_data(&Polyline::new(vec![])), "");
    }

    #[test]
    fn build_path_data_single_point() {
        let polyline = Polyline::new(vec![Point::new(5.0, 5.0)]);
        assert_eq!(build_path_data(&polyline), "");
    }

    #[test]
    fn build_path_data_three_points() {
        let polyline = Polyline::new(vec![
            Point::new(10.0, 15.0),
            Point::new(12.5, 18.3),
            Point::new(14.0, 20.1),
        ]);
        assert_eq!(build_path_data(&polyline), "M10,15 L12.5,18.3 L14,20.1");
    }

    #[test]
    fn build_path_data_closed_polyline_ends_with_close() {
        let polyline = Polyline::closed(vec![
            Point::new(0.0, 0.0),
            Point::new(4.0, 0.0),
            Point::new(4.0, 3.0),
        ]);
        let d = build_path_data(&polyline);
        assert!(d.starts_with("M0,0 L4,0 L4,3"));
        assert!(d.to_ascii_uppercase().ends_with('Z'), "{d}");
        let open = Polyline::new(polyline.into_points());
        assert!(!build_path_data(&open).to_ascii_uppercase().contains('Z'));
    }

    // --- Document structure ---

    #[test]
    fn empty_polylines_produces_valid_svg_with_no_paths() {
        let svg = to_svg(&[], dims(100, 50), &no_meta());
        assert!(svg.contains(r#"<?xml version="1.0" encoding="UTF-8"?>"#));
        assert!(svg.contains(r#"width="100""#));
        assert!(svg.contains(r#"height="50""#));
        assert!(svg.contains(r#"viewBox="0 0 100 50""#));
        assert!(!svg.contains("<path"));
    }

    #[test]
    fn one_path_per_polyline_colored_by_tag() {
        let line = Polyline::new(vec![Point::new(0.0, 0.0), Point::new(5.0, 5.0)]);
        let svg = to_svg(
            &[
                flat(line.clone(), ColorTag::AutoMain),
                flat(line.clone(), ColorTag::AutoMinor),
                flat(line, ColorTag::Manual),
            ],
            dims(10, 10),
            &no_meta(),
        );
        assert_eq!(svg.matches("<path").count(), 3);
        assert!(svg.contains("rgb(0,100,0)"));
        assert!(svg.contains("rgb(255,0,0)"));
        assert!(svg.contains("rgb(0,0,255)"));
        assert!(svg.contains(r#"fill="none""#));
    }

    #[test]
    fn degenerate_polyline_skipped() {
        let svg = to_svg(
            &[flat(Polyline::new(vec![Point::new(1.0, 1.0)]), ColorTag::Manual)],
            dims(10, 10),
            &no_meta(),
        );
        assert!(!svg.contains("<path"));
    }

    #[test]
    fn metadata_elements_emitted_when_present() {
        let meta = SvgMetadata {
            title: Some("owl"),
            description: Some("tolerance=0.1"),
            config_json: Some("{}"),
        };
        let svg = to_svg(&[], dims(10, 10), &meta);
        assert!(svg.contains("<title>owl</title>"));
        assert!(svg.contains("<desc>tolerance=0.1</desc>"));
        assert!(svg.contains("<metadata>"));
        assert!(svg.contains("<emboss:config"));
    }

    #[test]
    fn metadata_omitted_when_none() {
        let svg = to_svg(&[], dims(10, 10), &no_meta());
        assert!(!svg.contains("<title>"));
        assert!(!svg.contains("<desc>"));
        assert!(!svg.contains("<metadata>"));
    }
}
