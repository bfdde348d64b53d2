//! Shared geometry helpers for the tracing pipeline.
//!
//! Small cross/dot-product predicates used by the polygon optimizer and
//! the curve fitter, plus cubic Bezier evaluation.

use kurbo::Point;

/// Sign function that maps exact zero to 0.0 (f64::signum does not).
pub fn fsign(x: f64) -> f64 {
    if x > 0.0 {
        1.0
    } else if x < 0.0 {
        -1.0
    } else {
        0.0
    }
}

/// Twice the signed area of triangle (p0, p1, p2).
pub fn dpara(p0: Point, p1: Point, p2: Point) -> f64 {
    (p1 - p0).cross(p2 - p0)
}

/// Cross product of the displacements p0->p1 and p2->p3.
pub fn cprod(p0: Point, p1: Point, p2: Point, p3: Point) -> f64 {
    (p1 - p0).cross(p3 - p2)
}

/// Dot product of the displacements p0->p1 and p0->p2.
pub fn iprod(p0: Point, p1: Point, p2: Point) -> f64 {
    (p1 - p0).dot(p2 - p0)
}

/// Dot product of the displacements p0->p1 and p2->p3.
pub fn iprod1(p0: Point, p1: Point, p2: Point, p3: Point) -> f64 {
    (p1 - p0).dot(p3 - p2)
}

/// Euclidean distance between two points.
pub fn ddist(p: Point, q: Point) -> f64 {
    (p - q).hypot()
}

/// Direction from p0 to p2, rotated 90 degrees CCW and snapped to the
/// nearest cardinal/diagonal unit step.
pub fn dorth_infty(p0: Point, p2: Point) -> (f64, f64) {
    (-fsign(p2.y - p0.y), fsign(p2.x - p0.x))
}

/// Denominator used to normalize the curvature indicator: the extent of
/// the chord p0->p2 measured along the snapped perpendicular.
pub fn ddenom(p0: Point, p2: Point) -> f64 {
    let (rx, ry) = dorth_infty(p0, p2);
    ry * (p2.x - p0.x) - rx * (p2.y - p0.y)
}

/// Linear interpolation: the point a fraction `t` of the way from a to b.
pub fn interval(t: f64, a: Point, b: Point) -> Point {
    a.lerp(b, t)
}

/// Evaluate the cubic Bezier (p0, p1, p2, p3) at parameter t.
pub fn bezier(t: f64, p0: Point, p1: Point, p2: Point, p3: Point) -> Point {
    let s = 1.0 - t;
    // s^3 p0 + 3 s^2 t p1 + 3 s t^2 p2 + t^3 p3
    let x = s * s * s * p0.x
        + 3.0 * s * s * t * p1.x
        + 3.0 * s * t * t * p2.x
        + t * t * t * p3.x;
    let y = s * s * s * p0.y
        + 3.0 * s * s * t * p1.y
        + 3.0 * s * t * t * p2.y
        + t * t * t * p3.y;
    Point::new(x, y)
}

/// Parameter t in [0, 1] where the Bezier's tangent is parallel to the
/// direction q0->q1, or -1.0 if no such parameter exists.
///
/// The cross product of the derivative with (q1 - q0) is quadratic in t;
/// solve and pick a root inside the unit interval.
pub fn tangent(p0: Point, p1: Point, p2: Point, p3: Point, q0: Point, q1: Point) -> f64 {
    let big_a = cprod(p0, p1, q0, q1);
    let big_b = cprod(p1, p2, q0, q1);
    let big_c = cprod(p2, p3, q0, q1);

    let a = big_a - 2.0 * big_b + big_c;
    let b = -2.0 * big_a + 2.0 * big_b;
    let c = big_a;

    let d = b * b - 4.0 * a * c;
    if a == 0.0 || d < 0.0 {
        return -1.0;
    }
    let s = d.sqrt();
    let r1 = (-b + s) / (2.0 * a);
    let r2 = (-b - s) / (2.0 * a);

    if (0.0..=1.0).contains(&r1) {
        r1
    } else if (0.0..=1.0).contains(&r2) {
        r2
    } else {
        -1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dpara_is_twice_triangle_area() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(4.0, 0.0);
        let c = Point::new(0.0, 3.0);
        assert_eq!(dpara(a, b, c), 12.0);
        assert_eq!(dpara(a, c, b), -12.0);
    }

    #[test]
    fn bezier_endpoints() {
        let p0 = Point::new(0.0, 0.0);
        let p1 = Point::new(1.0, 2.0);
        let p2 = Point::new(3.0, 2.0);
        let p3 = Point::new(4.0, 0.0);
        assert_eq!(bezier(0.0, p0, p1, p2, p3), p0);
        assert_eq!(bezier(1.0, p0, p1, p2, p3), p3);
        let mid = bezier(0.5, p0, p1, p2, p3);
        assert!((mid.x - 2.0).abs() < 1e-12);
        assert!((mid.y - 1.5).abs() < 1e-12);
    }

    #[test]
    fn tangent_finds_horizontal_apex() {
        // Symmetric arch: tangent is horizontal at t = 0.5.
        let p0 = Point::new(0.0, 0.0);
        let p1 = Point::new(1.0, 2.0);
        let p2 = Point::new(3.0, 2.0);
        let p3 = Point::new(4.0, 0.0);
        let t = tangent(p0, p1, p2, p3, Point::new(0.0, 0.0), Point::new(1.0, 0.0));
        assert!((t - 0.5).abs() < 1e-9);
    }
}
