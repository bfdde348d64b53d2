//! SVG emitter.
//!
//! One `<path>` element holds every traced curve as its own `M ... Z`
//! subpath; `fill-rule="evenodd"` lets hole contours cut out of their
//! outer boundaries without any explicit nesting bookkeeping.

use crate::error::TraceError;
use crate::path::{PathList, Segment};

use super::fmt3;

/// Render a path list as a standalone SVG document.
///
/// `scale` multiplies the pixel dimensions into the display size, tagged
/// with `unit` (e.g. `"px"`, `"mm"`). The view box stays in pixel
/// coordinates so path data is emitted untransformed. An empty path list
/// produces a valid document with an empty `d`.
pub fn render_svg(paths: &PathList, scale: f64, unit: &str) -> Result<String, TraceError> {
    if !(scale > 0.0) {
        return Err(TraceError::InvalidOptions(format!(
            "scale must be positive, got {}",
            scale
        )));
    }

    let mut d = String::new();
    for curve in &paths.curves {
        if curve.segments.is_empty() {
            continue;
        }
        if !d.is_empty() {
            d.push(' ');
        }
        let start = curve.start_point();
        d.push_str(&format!("M {} {}", fmt3(start.x), fmt3(start.y)));
        for seg in &curve.segments {
            match *seg {
                Segment::Corner { vertex } => {
                    d.push_str(&format!(" L {} {}", fmt3(vertex.x), fmt3(vertex.y)));
                }
                Segment::Curve { c1, c2, end } => {
                    d.push_str(&format!(
                        " C {} {} {} {} {} {}",
                        fmt3(c1.x),
                        fmt3(c1.y),
                        fmt3(c2.x),
                        fmt3(c2.y),
                        fmt3(end.x),
                        fmt3(end.y)
                    ));
                }
            }
        }
        d.push_str(" Z");
    }

    let display_w = paths.width as f64 * scale;
    let display_h = paths.height as f64 * scale;

    let mut out = String::new();
    out.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{}{}\" height=\"{}{}\" \
         viewBox=\"0 0 {} {}\">\n",
        fmt3(display_w),
        unit,
        fmt3(display_h),
        unit,
        paths.width,
        paths.height
    ));
    out.push_str(&format!(
        "<path d=\"{}\" fill=\"black\" fill-rule=\"evenodd\"/>\n",
        d
    ));
    out.push_str("</svg>\n");
    Ok(out)
}
