//! Public vector model produced by tracing and consumed by both emitters.

use kurbo::{BezPath, Point};

/// Whether a contour adds foreground (outer boundary) or subtracts it (hole).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sign {
    Plus,
    Minus,
}

/// One drawable piece of a closed curve.
///
/// Every segment starts at the previous segment's end point; the loop is
/// closed, so the first segment starts at the last segment's end.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Segment {
    /// Straight line to `vertex` (a sharp corner of the shape).
    Corner { vertex: Point },
    /// Cubic Bezier with control points `c1`, `c2`, ending at `end`.
    Curve { c1: Point, c2: Point, end: Point },
}

impl Segment {
    /// The point where this segment ends (and the next one starts).
    pub fn end_point(&self) -> Point {
        match *self {
            Segment::Corner { vertex } => vertex,
            Segment::Curve { end, .. } => end,
        }
    }
}

/// A closed sequence of tagged segments traced from one contour.
#[derive(Debug, Clone, PartialEq)]
pub struct Curve {
    pub segments: Vec<Segment>,
    pub sign: Sign,
}

impl Curve {
    /// Start point of the loop: the last segment's end.
    pub fn start_point(&self) -> Point {
        self.segments
            .last()
            .map(Segment::end_point)
            .unwrap_or(Point::ZERO)
    }

    /// Signed area of the loop via the shoelace formula over segment end
    /// points (curve segments contribute their chords).
    pub fn signed_area(&self) -> f64 {
        let mut area = 0.0;
        let mut prev = self.start_point();
        for seg in &self.segments {
            let p = seg.end_point();
            area += prev.x * p.y - p.x * prev.y;
            prev = p;
        }
        area / 2.0
    }

    /// Bridge to kurbo for downstream consumers.
    pub fn to_bezpath(&self) -> BezPath {
        let mut path = BezPath::new();
        if self.segments.is_empty() {
            return path;
        }
        path.move_to(self.start_point());
        for seg in &self.segments {
            match *seg {
                Segment::Corner { vertex } => path.line_to(vertex),
                Segment::Curve { c1, c2, end } => path.curve_to(c1, c2, end),
            }
        }
        path.close_path();
        path
    }
}

/// The result of tracing one bitmap: all curves plus the source dimensions
/// (the SVG emitter sizes its viewport from these).
#[derive(Debug, Clone, PartialEq)]
pub struct PathList {
    pub width: usize,
    pub height: usize,
    pub curves: Vec<Curve>,
}

impl PathList {
    pub fn is_empty(&self) -> bool {
        self.curves.is_empty()
    }

    /// Total number of segments across all curves.
    pub fn segment_count(&self) -> usize {
        self.curves.iter().map(|c| c.segments.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_square() -> Curve {
        Curve {
            segments: vec![
                Segment::Corner { vertex: Point::new(0.0, 0.0) },
                Segment::Corner { vertex: Point::new(10.0, 0.0) },
                Segment::Corner { vertex: Point::new(10.0, 10.0) },
                Segment::Corner { vertex: Point::new(0.0, 10.0) },
            ],
            sign: Sign::Plus,
        }
    }

    #[test]
    fn start_point_is_last_segment_end() {
        let sq = unit_square();
        assert_eq!(sq.start_point(), Point::new(0.0, 10.0));
    }

    #[test]
    fn square_area() {
        assert_eq!(unit_square().signed_area().abs(), 100.0);
    }

    #[test]
    fn bezpath_round_trip_counts() {
        let bez = unit_square().to_bezpath();
        // MoveTo + 4 LineTo + ClosePath
        assert_eq!(bez.elements().len(), 6);
    }
}
