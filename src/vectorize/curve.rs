//! Curve fitting: optimized polygon -> tagged segment curve.
//!
//! Two passes. Smoothing classifies each polygon vertex as a sharp corner
//! or a smooth point from a curvature indicator, emitting a line or a
//! cubic Bezier per vertex. The optional optimizer then merges runs of
//! consecutive Beziers with consistent convexity into single curves, as
//! long as the merged curve stays within the fit tolerance of the
//! originals.

use kurbo::Point;

use super::polygon::Polygon;
use crate::geom::{bezier, cprod, ddenom, ddist, dpara, fsign, interval, iprod, iprod1, tangent};
use crate::options::TraceOptions;
use crate::path::{Curve, Segment};

/// cos(179 degrees); bound on how far a merged span may bend back.
const COS_179: f64 = -0.999_847_695_156;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Tag {
    Corner,
    Curve,
}

/// Per-segment fitting state. Segment j covers the neighborhood of
/// polygon vertex j and ends where segment j+1 begins.
#[derive(Debug, Clone, Copy)]
struct FitSegment {
    tag: Tag,
    c1: Point,
    c2: Point,
    end: Point,
    vertex: Point,
    alpha: f64,
}

/// Fit a closed segment curve to an optimized polygon.
pub fn fit_curve(polygon: &Polygon, options: &TraceOptions) -> Curve {
    let mut segs = smooth(&polygon.vertices, options.alpha_max);
    if options.opt_curve && segs.len() >= 3 {
        segs = opti_curve(&segs, options.opt_tolerance);
    }
    Curve {
        segments: segs
            .iter()
            .map(|seg| match seg.tag {
                Tag::Corner => Segment::Corner { vertex: seg.vertex },
                Tag::Curve => Segment::Curve {
                    c1: seg.c1,
                    c2: seg.c2,
                    end: seg.end,
                },
            })
            .collect(),
        sign: polygon.sign,
    }
}

/// Classify each vertex and produce one segment per vertex.
///
/// The curvature indicator alpha compares the triangle spanned by a vertex
/// and its neighbors against the neighbor chord. Vertices at or above
/// `alpha_max` become corners (a straight line to the vertex); the rest
/// become Beziers whose control points sit a fraction 0.5 + alpha/2 along
/// the adjacent edges, ending at the outgoing edge's midpoint.
fn smooth(vertices: &[Point], alpha_max: f64) -> Vec<FitSegment> {
    let m = vertices.len();
    let mut segs = Vec::with_capacity(m);

    for j in 0..m {
        let i = (j + m - 1) % m;
        let k = (j + 1) % m;

        let denom = ddenom(vertices[i], vertices[k]);
        let alpha = if denom != 0.0 {
            let dd = (dpara(vertices[i], vertices[j], vertices[k]) / denom).abs();
            let a = if dd > 1.0 { 1.0 - 1.0 / dd } else { 0.0 };
            a / 0.75
        } else {
            4.0 / 3.0
        };

        if alpha >= alpha_max {
            segs.push(FitSegment {
                tag: Tag::Corner,
                c1: vertices[j],
                c2: vertices[j],
                end: vertices[j],
                vertex: vertices[j],
                alpha,
            });
        } else {
            let a = alpha.clamp(0.55, 1.0);
            segs.push(FitSegment {
                tag: Tag::Curve,
                c1: interval(0.5 + 0.5 * a, vertices[i], vertices[j]),
                c2: interval(0.5 + 0.5 * a, vertices[k], vertices[j]),
                end: interval(0.5, vertices[j], vertices[k]),
                vertex: vertices[j],
                alpha: a,
            });
        }
    }

    segs
}

/// Candidate replacement for the span of segments (i..=j]: one Bezier plus
/// the penalty it accrues against the originals.
#[derive(Debug, Clone, Copy)]
struct Opti {
    pen: f64,
    c1: Point,
    c2: Point,
    s: f64,
    alpha: f64,
}

/// Merge runs of compatible Bezier segments.
///
/// Dynamic programming over segment indices: among curves with the fewest
/// segments, pick the one with the smallest summed penalty. Corners are
/// never absorbed; they end every span.
fn opti_curve(segs: &[FitSegment], opt_tolerance: f64) -> Vec<FitSegment> {
    let m = segs.len();

    // Convexity of each smooth vertex; 0 marks corners as unmergeable.
    let mut convc = vec![0i32; m];
    for j in 0..m {
        if segs[j].tag == Tag::Curve {
            convc[j] = fsign(dpara(
                segs[(j + m - 1) % m].vertex,
                segs[j].vertex,
                segs[(j + 1) % m].vertex,
            )) as i32;
        }
    }

    // Prefix sums of the signed area swept by the smoothed curve relative
    // to a fixed origin, used to size the merged Bezier's bulge.
    let mut areac = vec![0.0f64; m + 1];
    let origin = segs[0].vertex;
    let mut area = 0.0;
    for i in 0..m {
        let i1 = (i + 1) % m;
        if segs[i1].tag == Tag::Curve {
            let alpha = segs[i1].alpha;
            area += 0.3 * alpha * (4.0 - alpha)
                * dpara(segs[i].end, segs[i1].vertex, segs[i1].end)
                / 2.0;
            area += dpara(origin, segs[i].end, segs[i1].end) / 2.0;
        }
        areac[i + 1] = area;
    }

    let mut pt = vec![0usize; m + 1];
    let mut pen = vec![0.0f64; m + 1];
    let mut len = vec![0usize; m + 1];
    let mut opt: Vec<Option<Opti>> = vec![None; m + 1];

    pt[0] = usize::MAX;
    for j in 1..=m {
        pt[j] = j - 1;
        pen[j] = pen[j - 1];
        len[j] = len[j - 1] + 1;
        opt[j] = None;

        if j < 2 {
            continue;
        }
        for i in (0..=j - 2).rev() {
            let Some(o) = opti_penalty(segs, i, j % m, opt_tolerance, &convc, &areac) else {
                break;
            };
            if len[j] > len[i] + 1 || (len[j] == len[i] + 1 && pen[j] > pen[i] + o.pen) {
                pt[j] = i;
                pen[j] = pen[i] + o.pen;
                len[j] = len[i] + 1;
                opt[j] = Some(o);
            }
        }
    }

    let om = len[m];
    let mut out = vec![segs[0]; om];
    let mut j = m;
    for i in (0..om).rev() {
        let jm = j % m;
        out[i] = match opt[j] {
            Some(o) if pt[j] != j - 1 => FitSegment {
                tag: Tag::Curve,
                c1: o.c1,
                c2: o.c2,
                end: segs[jm].end,
                vertex: interval(o.s, segs[jm].end, segs[jm].vertex),
                alpha: o.alpha,
            },
            _ => segs[jm],
        };
        j = pt[j];
    }

    out
}

/// Evaluate replacing segments (i..=j] with a single Bezier. Returns None
/// when the span is not mergeable or the fit exceeds `opt_tolerance`.
fn opti_penalty(
    segs: &[FitSegment],
    i: usize,
    j: usize,
    opt_tolerance: f64,
    convc: &[i32],
    areac: &[f64],
) -> Option<Opti> {
    let m = segs.len();
    if i == j {
        return None;
    }

    let i1 = (i + 1) % m;
    let conv = convc[i1];
    if conv == 0 {
        return None;
    }

    // The span must keep one convexity and never bend back on itself.
    let d = ddist(segs[i].vertex, segs[i1].vertex);
    let mut k = i1;
    while k != j {
        let k1 = (k + 1) % m;
        let k2 = (k + 2) % m;
        if convc[k1] != conv {
            return None;
        }
        if fsign(cprod(
            segs[i].vertex,
            segs[i1].vertex,
            segs[k1].vertex,
            segs[k2].vertex,
        )) as i32
            != conv
        {
            return None;
        }
        if iprod1(
            segs[i].vertex,
            segs[i1].vertex,
            segs[k1].vertex,
            segs[k2].vertex,
        ) < d * ddist(segs[k1].vertex, segs[k2].vertex) * COS_179
        {
            return None;
        }
        k = k1;
    }

    let p0 = segs[i].end;
    let mut p1 = segs[i1].vertex;
    let mut p2 = segs[j].vertex;
    let p3 = segs[j].end;

    // Signed area the replacement must reproduce.
    let mut area = areac[j] - areac[i];
    area -= dpara(segs[0].vertex, segs[i].end, segs[j].end) / 2.0;
    if i >= j {
        area += areac[m];
    }

    // Control points lie on the tangent lines at p0 and p3; their scale
    // along those lines is set so the Bezier sweeps the same area.
    let a1 = dpara(p0, p1, p2);
    let a2 = dpara(p0, p1, p3);
    let a3 = dpara(p0, p2, p3);
    let a4 = a1 + a3 - a2;
    if a2 == a1 {
        return None;
    }
    let t = a3 / (a3 - a4);
    let s = a2 / (a2 - a1);
    let a = a2 * t / 2.0;
    if a == 0.0 {
        return None;
    }
    let r = area / a;
    let alpha = 2.0 - (4.0 - r / 0.3).sqrt();

    let c1 = interval(t * alpha, p0, p1);
    let c2 = interval(s * alpha, p3, p2);
    p1 = c1;
    p2 = c2;

    let mut penalty = 0.0;

    // Every original vertex must project onto the new curve within
    // tolerance, on the correct side of its edge.
    let mut k = i1;
    while k != j {
        let k1 = (k + 1) % m;
        let tt = tangent(p0, p1, p2, p3, segs[k].vertex, segs[k1].vertex);
        if tt < -0.5 {
            return None;
        }
        let pos = bezier(tt, p0, p1, p2, p3);
        let d = ddist(segs[k].vertex, segs[k1].vertex);
        if d == 0.0 {
            return None;
        }
        let d1 = dpara(segs[k].vertex, segs[k1].vertex, pos) / d;
        if d1.abs() > opt_tolerance {
            return None;
        }
        if iprod(segs[k].vertex, segs[k1].vertex, pos) < 0.0
            || iprod(segs[k1].vertex, segs[k].vertex, pos) < 0.0
        {
            return None;
        }
        penalty += d1 * d1;
        k = k1;
    }

    // The new curve must not undercut any original segment's bulge.
    let mut k = i;
    while k != j {
        let k1 = (k + 1) % m;
        let tt = tangent(p0, p1, p2, p3, segs[k].end, segs[k1].end);
        if tt < -0.5 {
            return None;
        }
        let pos = bezier(tt, p0, p1, p2, p3);
        let d = ddist(segs[k].end, segs[k1].end);
        if d == 0.0 {
            return None;
        }
        let mut d1 = dpara(segs[k].end, segs[k1].end, pos) / d;
        let mut d2 = dpara(segs[k].end, segs[k1].end, segs[k1].vertex) / d;
        d2 *= 0.75 * segs[k1].alpha;
        if d2 < 0.0 {
            d1 = -d1;
            d2 = -d2;
        }
        if d1 < d2 - opt_tolerance {
            return None;
        }
        if d1 < d2 {
            penalty += (d1 - d2) * (d1 - d2);
        }
        k = k1;
    }

    Some(Opti {
        pen: penalty,
        c1,
        c2,
        s,
        alpha,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitmap::Bitmap;
    use crate::options::TurnPolicy;
    use crate::path::Sign;
    use crate::vectorize::decompose::decompose;
    use crate::vectorize::polygon::optimal_polygon;

    fn square_polygon(side: f64) -> Polygon {
        Polygon {
            vertices: vec![
                Point::new(0.0, 0.0),
                Point::new(side, 0.0),
                Point::new(side, side),
                Point::new(0.0, side),
            ],
            sign: Sign::Plus,
        }
    }

    fn disk_polygon(radius: i32) -> Polygon {
        let size = (2 * radius + 4) as usize;
        let c = radius + 2;
        let mut bm = Bitmap::new(size, size);
        for y in 0..size as i32 {
            for x in 0..size as i32 {
                let (dx, dy) = (x - c, y - c);
                if dx * dx + dy * dy <= radius * radius {
                    bm.set(x, y, true);
                }
            }
        }
        let contour = decompose(&bm, TurnPolicy::Minority, 2)
            .unwrap()
            .pop()
            .unwrap();
        optimal_polygon(&contour)
    }

    #[test]
    fn square_fits_as_four_corners() {
        let curve = fit_curve(&square_polygon(10.0), &TraceOptions::default());
        assert_eq!(curve.segments.len(), 4);
        for seg in &curve.segments {
            assert!(matches!(seg, Segment::Corner { .. }), "expected corner, got {:?}", seg);
        }
    }

    #[test]
    fn corner_segments_end_at_polygon_vertices() {
        let poly = square_polygon(10.0);
        let curve = fit_curve(&poly, &TraceOptions::default());
        let ends: Vec<Point> = curve.segments.iter().map(|s| s.end_point()).collect();
        for v in &poly.vertices {
            assert!(ends.contains(v), "vertex {:?} missing from segment ends", v);
        }
    }

    #[test]
    fn raised_alpha_max_turns_square_into_curves() {
        // Right angles score alpha just above 1; a threshold of 1.4 smooths them.
        let mut options = TraceOptions::default();
        options.alpha_max = 1.4;
        options.opt_curve = false;
        let curve = fit_curve(&square_polygon(10.0), &options);
        assert_eq!(curve.segments.len(), 4);
        for seg in &curve.segments {
            assert!(matches!(seg, Segment::Curve { .. }));
        }
    }

    #[test]
    fn disk_fits_smooth_without_corners() {
        let mut options = TraceOptions::default();
        options.opt_curve = false;
        let curve = fit_curve(&disk_polygon(8), &options);
        assert!(curve.segments.len() >= 4);
        assert!(curve
            .segments
            .iter()
            .all(|s| matches!(s, Segment::Curve { .. })));
    }

    #[test]
    fn optimizer_never_increases_segment_count() {
        let poly = disk_polygon(8);

        let mut plain = TraceOptions::default();
        plain.opt_curve = false;
        let unopt = fit_curve(&poly, &plain);

        let opt = fit_curve(&poly, &TraceOptions::default());
        assert!(!opt.segments.is_empty());
        assert!(opt.segments.len() <= unopt.segments.len());
    }
}
