//! rastervec: raster bitmap → SVG/DXF vector outlines.
//!
//! Thresholds an image into a binary bitmap, decomposes it into closed
//! pixel contours, reduces each contour to an optimal polygon, fits
//! corner and Bezier segments, and emits the result as SVG or DXF text.
//! Both emitters read the same structured path model.
//!
//! # Example
//!
//! ```
//! use rastervec::{trace, Bitmap, TraceOptions};
//!
//! let mut bitmap = Bitmap::new(10, 10);
//! for y in 0..10 {
//!     for x in 0..10 {
//!         bitmap.set(x, y, true);
//!     }
//! }
//! let paths = trace(&bitmap, &TraceOptions::default())?;
//! let svg = rastervec::output::svg::render_svg(&paths, 1.0, "px")?;
//! assert!(svg.contains("<path"));
//! # Ok::<(), rastervec::TraceError>(())
//! ```

#![forbid(unsafe_code)]

mod bitmap;
mod geom;
mod options;
mod path;

pub mod error;
pub mod output;
pub mod raster;
pub mod vectorize;

// Re-export kurbo so downstream users get the same version used by the
// path model's Point and BezPath types.
pub use kurbo;

pub use bitmap::Bitmap;
pub use error::TraceError;
pub use options::{TraceOptions, TurnPolicy};
pub use path::{Curve, PathList, Segment, Sign};
pub use vectorize::trace;

#[cfg(test)]
mod tests {
    use super::*;
    use output::{dxf, svg};

    fn filled(w: usize, h: usize) -> Bitmap {
        let mut bm = Bitmap::new(w, h);
        for y in 0..h as i32 {
            for x in 0..w as i32 {
                bm.set(x, y, true);
            }
        }
        bm
    }

    #[test]
    fn full_pipeline_on_a_filled_square() {
        let paths = trace(&filled(10, 10), &TraceOptions::default()).unwrap();
        assert_eq!(paths.curves.len(), 1);
        assert_eq!(paths.curves[0].segments.len(), 4);
        assert!((paths.curves[0].signed_area().abs() - 100.0).abs() < 5.0);

        let svg = svg::render_svg(&paths, 1.0, "px").unwrap();
        assert_eq!(svg.matches(" Z").count(), 1);

        let dxf = dxf::render_dxf(&paths);
        assert_eq!(dxf.lines().filter(|l| *l == "LINE").count(), 4);
    }

    #[test]
    fn hole_contour_follows_its_outer_boundary() {
        let mut bm = filled(8, 8);
        for y in 2..6 {
            for x in 2..6 {
                bm.set(x, y, false);
            }
        }
        let paths = trace(&bm, &TraceOptions::default()).unwrap();
        assert_eq!(paths.curves.len(), 2);
        assert_eq!(paths.curves[0].sign, Sign::Plus);
        assert_eq!(paths.curves[1].sign, Sign::Minus);
    }

    #[test]
    fn turdsize_controls_speck_survival() {
        let mut bm = Bitmap::new(10, 10);
        for y in 0..6 {
            for x in 0..6 {
                bm.set(x, y, true);
            }
        }
        bm.set(9, 9, true);

        let mut options = TraceOptions::default();
        options.turd_size = 0;
        assert_eq!(trace(&bm, &options).unwrap().curves.len(), 2);
        options.turd_size = 1;
        assert_eq!(trace(&bm, &options).unwrap().curves.len(), 1);
    }
}
