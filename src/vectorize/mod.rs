//! The tracing pipeline: bitmap -> contours -> polygons -> curves.

pub mod curve;
pub mod decompose;
pub mod polygon;

use crate::bitmap::Bitmap;
use crate::error::TraceError;
use crate::options::TraceOptions;
use crate::path::PathList;

/// Trace a binary bitmap into closed vector curves.
///
/// Contours are emitted in raster-scan order of their starting pixels, so
/// every hole follows the outer boundary that contains it. A blank bitmap
/// yields an empty path list, not an error.
pub fn trace(bitmap: &Bitmap, options: &TraceOptions) -> Result<PathList, TraceError> {
    if bitmap.width() == 0 || bitmap.height() == 0 {
        return Err(TraceError::InvalidBitmap);
    }
    options.validate()?;

    let contours = decompose::decompose(bitmap, options.turn_policy, options.turd_size)?;
    let curves = contours
        .iter()
        .map(|contour| curve::fit_curve(&polygon::optimal_polygon(contour), options))
        .collect();

    Ok(PathList {
        width: bitmap.width(),
        height: bitmap.height(),
        curves,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::Segment;

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
    fn zero_sized_bitmap_is_rejected() {
        let bm = Bitmap::new(0, 5);
        assert!(matches!(
            trace(&bm, &TraceOptions::default()),
            Err(TraceError::InvalidBitmap)
        ));
    }

    #[test]
    fn blank_bitmap_traces_to_empty_list() {
        let paths = trace(&Bitmap::new(8, 8), &TraceOptions::default()).unwrap();
        assert!(paths.is_empty());
        assert_eq!(paths.width, 8);
    }

    #[test]
    fn square_traces_to_one_curve_of_four_corners() {
        let paths = trace(&filled(10, 10), &TraceOptions::default()).unwrap();
        assert_eq!(paths.curves.len(), 1);
        let curve = &paths.curves[0];
        assert_eq!(curve.segments.len(), 4);
        assert!(curve
            .segments
            .iter()
            .all(|s| matches!(s, Segment::Corner { .. })));
        assert!((curve.signed_area().abs() - 100.0).abs() < 5.0);
    }

    #[test]
    fn retracing_rasterized_output_preserves_topology() {
        use kurbo::Shape;

        use crate::path::{Curve, Sign};

        let options = TraceOptions::default();

        // Trace a donut, rasterize its curves at 8x by even-odd sampling
        // of pixel centers, and trace the rasterization again.
        let mut bm = Bitmap::new(8, 8);
        for y in 0..8 {
            for x in 0..8 {
                bm.set(x, y, true);
            }
        }
        for y in 2..6 {
            for x in 2..6 {
                bm.set(x, y, false);
            }
        }
        let first = trace(&bm, &options).unwrap();
        assert_eq!(first.curves.len(), 2);

        let scale = 8.0;
        let outlines: Vec<kurbo::BezPath> =
            first.curves.iter().map(Curve::to_bezpath).collect();
        let mut big = Bitmap::new(64, 64);
        for y in 0..64i32 {
            for x in 0..64i32 {
                let p = kurbo::Point::new(
                    (x as f64 + 0.5) / scale,
                    (y as f64 + 0.5) / scale,
                );
                let crossings = outlines.iter().filter(|o| o.contains(p)).count();
                if crossings % 2 == 1 {
                    big.set(x, y, true);
                }
            }
        }
        let second = trace(&big, &options).unwrap();

        assert_eq!(second.curves.len(), first.curves.len());
        assert_eq!(second.curves[0].sign, Sign::Plus);
        assert_eq!(second.curves[1].sign, Sign::Minus);

        let corners = |c: &Curve| {
            c.segments
                .iter()
                .filter(|s| matches!(s, Segment::Corner { .. }))
                .count() as i64
        };
        for (a, b) in first.curves.iter().zip(&second.curves) {
            assert!((corners(a) - corners(b)).abs() <= 1);
        }
    }

    #[test]
    fn invalid_options_are_rejected_before_tracing() {
        let mut options = TraceOptions::default();
        options.turd_size = -1;
        assert!(matches!(
            trace(&filled(4, 4), &options),
            Err(TraceError::InvalidOptions(_))
        ));
    }
}
