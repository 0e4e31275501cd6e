//! SVG rendering of a finished template.
//!
//! Coordinates come straight from the pipeline, so the generated document
//! shares the source image's pixel frame: origin top-left, Y down, outline
//! vertices on half-integer positions.

use crate::color::lab_to_rgb;
use crate::pipeline::ProcessResult;
use std::fmt::Write;

/// How region interiors are painted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SvgFill {
    /// Fill each region with its palette color (a colored preview).
    Palette,

    /// Leave regions white (a printable template to paint in).
    Blank,
}

/// Render a result as a standalone SVG document: one path per region and
/// one text element per number.
pub fn to_svg(result: &ProcessResult, fill: SvgFill) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {} {}">"#,
        result.width, result.height
    );

    for region in &result.regions {
        let fill_color = match fill {
            SvgFill::Palette => {
                let [r, g, b] = lab_to_rgb(&result.palette[region.color_index]);
                format!("#{:02x}{:02x}{:02x}", r, g, b)
            }
            SvgFill::Blank => "#ffffff".to_string(),
        };
        let _ = writeln!(
            out,
            r##"  <path d="{}" fill="{}" fill-rule="evenodd" stroke="#888888" stroke-width="0.5"/>"##,
            region.polygon.path_data(),
            fill_color
        );
    }

    for number in &result.numbers {
        let _ = writeln!(
            out,
            r##"  <text x="{}" y="{}" font-size="10" text-anchor="middle" dominant-baseline="middle" fill="#444444">{}</text>"##,
            number.x, number.y, number.label
        );
    }

    out.push_str("</svg>\n");
    out
}
