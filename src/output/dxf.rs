//! DXF R12 emitter.
//!
//! Flat group-code/value text: corners become LINE entities, Bezier
//! segments become POLYLINE approximations. One entity per traced
//! segment, all on layer 0.

use crate::geom::bezier;
use crate::path::{PathList, Segment};

use super::fmt6;

/// Sample count for flattening one cubic into a POLYLINE.
const BEZIER_STEPS: usize = 10;

/// Render a path list as a DXF R12 document.
pub fn render_dxf(paths: &PathList) -> String {
    let mut out = String::new();

    tag(&mut out, 0, "SECTION");
    tag(&mut out, 2, "HEADER");
    tag(&mut out, 0, "ENDSEC");

    tag(&mut out, 0, "SECTION");
    tag(&mut out, 2, "ENTITIES");

    for curve in &paths.curves {
        let mut prev = curve.start_point();
        for seg in &curve.segments {
            match *seg {
                Segment::Corner { vertex } => {
                    tag(&mut out, 0, "LINE");
                    tag(&mut out, 8, "0");
                    coord(&mut out, 10, prev.x);
                    coord(&mut out, 20, prev.y);
                    coord(&mut out, 11, vertex.x);
                    coord(&mut out, 21, vertex.y);
                }
                Segment::Curve { c1, c2, end } => {
                    tag(&mut out, 0, "POLYLINE");
                    tag(&mut out, 8, "0");
                    tag(&mut out, 66, "1");
                    for step in 0..=BEZIER_STEPS {
                        let t = step as f64 / BEZIER_STEPS as f64;
                        let p = bezier(t, prev, c1, c2, end);
                        tag(&mut out, 0, "VERTEX");
                        tag(&mut out, 8, "0");
                        coord(&mut out, 10, p.x);
                        coord(&mut out, 20, p.y);
                    }
                    tag(&mut out, 0, "SEQEND");
                }
            }
            prev = seg.end_point();
        }
    }

    tag(&mut out, 0, "ENDSEC");
    tag(&mut out, 0, "EOF");
    out
}

fn tag(out: &mut String, code: i32, value: &str) {
    out.push_str(&format!("{}\n{}\n", code, value));
}

fn coord(out: &mut String, code: i32, value: f64) {
    out.push_str(&format!("{}\n{}\n", code, fmt6(value)));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitmap::Bitmap;
    use crate::options::TraceOptions;
    use crate::vectorize::trace;

    fn count(haystack: &str, entity: &str) -> usize {
        haystack
            .lines()
            .filter(|line| *line == entity)
            .count()
    }

    #[test]
    fn square_emits_exactly_four_lines() {
        let mut bm = Bitmap::new(10, 10);
        for y in 0..10 {
            for x in 0..10 {
                bm.set(x, y, true);
            }
        }
        let paths = trace(&bm, &TraceOptions::default()).unwrap();
        let dxf = render_dxf(&paths);

        assert_eq!(count(&dxf, "LINE"), 4);
        assert_eq!(count(&dxf, "POLYLINE"), 0);
        assert_eq!(count(&dxf, "EOF"), 1);
        assert!(dxf.starts_with("0\nSECTION\n2\nHEADER\n"));
    }

    #[test]
    fn entity_count_matches_segment_count() {
        let mut bm = Bitmap::new(24, 24);
        for y in 0..24i32 {
            for x in 0..24i32 {
                let (dx, dy) = (x - 12, y - 12);
                if dx * dx + dy * dy <= 81 {
                    bm.set(x, y, true);
                }
            }
        }
        let paths = trace(&bm, &TraceOptions::default()).unwrap();
        let dxf = render_dxf(&paths);

        let entities = count(&dxf, "LINE") + count(&dxf, "POLYLINE");
        assert_eq!(entities, paths.segment_count());
        assert_eq!(count(&dxf, "SEQEND"), count(&dxf, "POLYLINE"));
        assert_eq!(
            count(&dxf, "VERTEX"),
            count(&dxf, "POLYLINE") * (BEZIER_STEPS + 1)
        );
    }

    #[test]
    fn empty_path_list_still_frames_sections() {
        let empty = PathList {
            width: 4,
            height: 4,
            curves: Vec::new(),
        };
        let dxf = render_dxf(&empty);
        assert_eq!(count(&dxf, "SECTION"), 2);
        assert_eq!(count(&dxf, "ENDSEC"), 2);
        assert!(dxf.ends_with("0\nEOF\n"));
    }
}
