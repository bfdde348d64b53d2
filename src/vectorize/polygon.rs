//! Optimal polygon approximation.
//!
//! Reduces a dense pixel contour to the polygon with the fewest vertices
//! whose segments each stay within half a pixel of the original path:
//!
//! 1. Prefix sums give O(1) line-fit statistics for any cyclic sub-range.
//! 2. For each vertex, constraint propagation finds the farthest vertex
//!    reachable by a single admissible straight segment.
//! 3. Dynamic programming picks, among minimum-segment-count polygons,
//!    the one minimizing the summed line-fit penalty.
//! 4. Each chosen vertex is shifted to the sub-pixel position minimizing
//!    squared distance to its two adjacent fitted lines, constrained to
//!    the ±0.5 box around the pixel corner.

use kurbo::Point;

use super::decompose::Contour;
use crate::path::Sign;

/// Optimized polygon: significant vertices of one contour, sub-pixel
/// adjusted, still a closed loop.
#[derive(Debug, Clone)]
pub struct Polygon {
    pub vertices: Vec<Point>,
    pub sign: Sign,
}

/// Compute the optimal polygon for a pixel contour.
///
/// Contours with fewer than 4 points are kept as-is.
pub fn optimal_polygon(contour: &Contour) -> Polygon {
    let pt = &contour.points;
    if pt.len() < 4 {
        return Polygon {
            vertices: pt.iter().map(|&(x, y)| Point::new(x as f64, y as f64)).collect(),
            sign: contour.sign,
        };
    }

    let sums = SumTable::new(pt);
    let lon = longest_straight(pt);
    let po = best_polygon(pt, &lon, &sums);
    let vertices = adjust_vertices(pt, &po, &sums);

    Polygon {
        vertices,
        sign: contour.sign,
    }
}

// ── Prefix sums ──────────────────────────────────────────

/// Accumulated x, y, x², xy, y² up to each index, relative to the first
/// contour point (which keeps the numbers small).
struct SumTable {
    sums: Vec<[f64; 5]>,
    x0: i32,
    y0: i32,
}

/// Line-fit statistics for one cyclic sub-range.
struct RangeStats {
    /// Number of points in the range (0 means a degenerate range).
    k: f64,
    x: f64,
    y: f64,
    x2: f64,
    xy: f64,
    y2: f64,
}

impl SumTable {
    fn new(pt: &[(i32, i32)]) -> Self {
        let n = pt.len();
        let (x0, y0) = pt[0];
        let mut sums = vec![[0.0f64; 5]; n + 1];
        for i in 0..n {
            let x = (pt[i].0 - x0) as f64;
            let y = (pt[i].1 - y0) as f64;
            let prev = sums[i];
            sums[i + 1] = [
                prev[0] + x,
                prev[1] + y,
                prev[2] + x * x,
                prev[3] + x * y,
                prev[4] + y * y,
            ];
        }
        SumTable { sums, x0, y0 }
    }

    /// Statistics over the cyclic range [i..j] (j may exceed n once).
    fn range(&self, i: usize, j: usize) -> RangeStats {
        let n = self.sums.len() - 1;
        let jn = j % n;
        let (wrap, k) = if jn >= i { (0.0, jn - i) } else { (1.0, jn + n - i) };
        let a = self.sums[jn + 1];
        let b = self.sums[i];
        let w = self.sums[n];
        RangeStats {
            k: k as f64,
            x: a[0] - b[0] + wrap * w[0],
            y: a[1] - b[1] + wrap * w[1],
            x2: a[2] - b[2] + wrap * w[2],
            xy: a[3] - b[3] + wrap * w[3],
            y2: a[4] - b[4] + wrap * w[4],
        }
    }
}

// ── Longest straight subpath ─────────────────────────────

/// For each vertex i, the farthest vertex reachable by a straight segment
/// that keeps every intermediate point within ±0.5 of the line.
///
/// Walks forward from each vertex maintaining two constraint vectors that
/// bound an angular corridor of admissible directions. A vertex outside
/// the corridor, or steps in all four cardinal directions, ends the walk.
fn longest_straight(pt: &[(i32, i32)]) -> Vec<usize> {
    let n = pt.len();
    let mut lon = vec![0usize; n];

    // nc[i]: next direction change at or after i+1.
    let mut nc = vec![0usize; n];
    {
        let mut k = 0usize;
        for i in (0..n).rev() {
            if pt[i].0 != pt[k % n].0 && pt[i].1 != pt[k % n].1 {
                k = i + 1;
            }
            nc[i] = k;
        }
    }

    let mut pivk = vec![0usize; n];

    for i in (0..n).rev() {
        let mut ct = [0i32; 4];
        let mut constraint = [(0i32, 0i32); 2];

        let i1 = (i + 1) % n;
        let dir0 = ((3 + 3 * (pt[i1].0 - pt[i].0) + (pt[i1].1 - pt[i].1)) / 2) as usize;
        ct[dir0] += 1;

        let mut k = nc[i];
        let mut k1 = i;

        loop {
            let dkx = (pt[k % n].0 - pt[k1 % n].0).signum();
            let dky = (pt[k % n].1 - pt[k1 % n].1).signum();
            let dir = ((3 + 3 * dkx + dky) / 2) as usize;
            ct[dir] += 1;

            // All four cardinal directions seen: no single line fits.
            if ct[0] != 0 && ct[1] != 0 && ct[2] != 0 && ct[3] != 0 {
                pivk[i] = k1 % n;
                break;
            }

            let cur = (pt[k % n].0 - pt[i].0, pt[k % n].1 - pt[i].1);

            if xprod(constraint[0], cur) < 0 || xprod(constraint[1], cur) > 0 {
                pivk[i] = pivot_at_violation(pt, &constraint, k, k1, i, n);
                break;
            }

            // Vertices within one pixel of the start impose no constraint.
            if !(cur.0.abs() <= 1 && cur.1.abs() <= 1) {
                let off0 = (
                    cur.0 + if cur.1 >= 0 && (cur.1 > 0 || cur.0 < 0) { 1 } else { -1 },
                    cur.1 + if cur.0 <= 0 && (cur.0 < 0 || cur.1 < 0) { 1 } else { -1 },
                );
                if xprod(constraint[0], off0) >= 0 {
                    constraint[0] = off0;
                }
                let off1 = (
                    cur.0 + if cur.1 <= 0 && (cur.1 < 0 || cur.0 < 0) { 1 } else { -1 },
                    cur.1 + if cur.0 >= 0 && (cur.0 > 0 || cur.1 < 0) { 1 } else { -1 },
                );
                if xprod(constraint[1], off1) <= 0 {
                    constraint[1] = off1;
                }
            }

            k1 = k;
            k = nc[k1 % n];

            if !cyclic(k % n, i, k1 % n) {
                pivk[i] = pivot_at_violation(pt, &constraint, k, k1, i, n);
                break;
            }
        }
    }

    // Propagate to lon[], keeping the reach monotone along the cycle.
    let mut j = pivk[n - 1];
    lon[n - 1] = j;
    for i in (0..n - 1).rev() {
        if cyclic(i + 1, pivk[i], j) {
            j = pivk[i];
        }
        lon[i] = j;
    }
    let mut i = n - 1;
    while cyclic((i + 1) % n, j, lon[i]) {
        lon[i] = j;
        if i == 0 {
            break;
        }
        i -= 1;
    }

    lon
}

/// Fractional index where the straight line from vertex i first exits the
/// ±0.5 envelope, given the violated constraint corridor.
fn pivot_at_violation(
    pt: &[(i32, i32)],
    constraint: &[(i32, i32); 2],
    k: usize,
    k1: usize,
    i: usize,
    n: usize,
) -> usize {
    let dk = (
        (pt[k % n].0 - pt[k1 % n].0).signum(),
        (pt[k % n].1 - pt[k1 % n].1).signum(),
    );
    let cur = (pt[k1 % n].0 - pt[i].0, pt[k1 % n].1 - pt[i].1);

    let a = xprod(constraint[0], cur);
    let b = xprod(constraint[0], dk);
    let c = xprod(constraint[1], cur);
    let d = xprod(constraint[1], dk);

    // Steps until each constraint line is crossed; take the earlier one.
    let mut j = 10_000_000i64;
    if b < 0 {
        j = floordiv(a, -b);
    }
    if d > 0 {
        j = j.min(floordiv(-c, d));
    }
    pmod((k1 % n) as i64 + j, n as i64)
}

// ── Dynamic programming ──────────────────────────────────

/// Choose polygon vertices: minimum segment count, ties broken by summed
/// line-fit penalty. Returns indices into the contour's point list.
fn best_polygon(pt: &[(i32, i32)], lon: &[usize], sums: &SumTable) -> Vec<usize> {
    let n = pt.len();

    // clip0[i]: farthest vertex reachable from i.
    let mut clip0 = vec![0usize; n];
    for i in 0..n {
        let prev_i = if i == 0 { n - 1 } else { i - 1 };
        let mut c = pmod(lon[prev_i] as i64 - 1, n as i64);
        if c == i {
            c = (i + 1) % n;
        }
        clip0[i] = if c < i { n } else { c };
    }

    // clip1[j]: earliest vertex from which j is reachable.
    let mut clip1 = vec![0usize; n + 1];
    {
        let mut j = 1usize;
        for i in 0..n {
            while j <= clip0[i] {
                clip1[j] = i;
                j += 1;
            }
        }
    }

    // Greedy forward walk gives the minimum segment count m.
    let mut seg0 = vec![0usize; n + 1];
    let m;
    {
        let mut i = 0usize;
        let mut j = 0usize;
        while i < n {
            seg0[j] = i;
            i = clip0[i];
            j += 1;
        }
        seg0[j] = n;
        m = j;
    }

    // Backward walk bounds the search window for each segment index.
    let mut seg1 = vec![0usize; m + 1];
    {
        let mut i = n;
        for j in (1..=m).rev() {
            seg1[j] = i;
            i = clip1[i];
        }
        seg1[0] = 0;
    }

    // pen[i]: best penalty reaching vertex i with the fixed segment count.
    let mut pen = vec![-1.0f64; n + 1];
    let mut prev = vec![0usize; n + 1];
    pen[0] = 0.0;

    for j in 1..=m {
        for i in seg1[j]..=seg0[j] {
            let mut best = -1.0f64;
            let k_start = seg0[j - 1];
            let k_end = clip1[i];
            if k_start >= k_end {
                let mut k = k_start;
                loop {
                    let this_pen = penalty(pt, sums, k, i) + pen[k];
                    if pen[k] >= 0.0 && (best < 0.0 || this_pen < best) {
                        prev[i] = k;
                        best = this_pen;
                    }
                    if k == k_end {
                        break;
                    }
                    k -= 1;
                }
            }
            pen[i] = best;
        }
    }

    let mut po = vec![0usize; m];
    {
        let mut i = n;
        for j in (0..m).rev() {
            i = prev[i];
            po[j] = i;
        }
    }
    po
}

/// RMS distance of contour points in [i..j] from the straight segment
/// connecting vertices i and j, in O(1) via the sum table.
fn penalty(pt: &[(i32, i32)], sums: &SumTable, i: usize, j: usize) -> f64 {
    let n = sums.sums.len() - 1;
    let jn = j % n;

    let r = sums.range(i, j);
    if r.k == 0.0 {
        return 0.0;
    }

    let px = (pt[i].0 + pt[jn].0) as f64 / 2.0 - sums.x0 as f64;
    let py = (pt[i].1 + pt[jn].1) as f64 / 2.0 - sums.y0 as f64;
    let ey = (pt[jn].0 - pt[i].0) as f64;
    let ex = -((pt[jn].1 - pt[i].1) as f64);

    let a = (r.x2 - 2.0 * r.x * px) / r.k + px * px;
    let b = (r.xy - r.x * py - r.y * px) / r.k + px * py;
    let c = (r.y2 - 2.0 * r.y * py) / r.k + py * py;

    let s = ex * ex * a + 2.0 * ex * ey * b + ey * ey * c;
    s.max(0.0).sqrt()
}

// ── Vertex adjustment ────────────────────────────────────

/// Shift each polygon vertex to the sub-pixel position minimizing squared
/// distance to the best-fit lines of its two adjacent segments.
///
/// Each line contributes a 3x3 quadratic form Q with
/// dist²(x, y) = [x, y, 1] · Q · [x, y, 1]ᵀ; the sum is minimized by a
/// 2x2 linear solve, falling back to a search over the ±0.5 box boundary
/// when the free minimum escapes the box.
fn adjust_vertices(pt: &[(i32, i32)], po: &[usize], sums: &SumTable) -> Vec<Point> {
    let m = po.len();
    let mut vertices = vec![Point::ZERO; m];

    for i in 0..m {
        let i_prev = if i == 0 { m - 1 } else { i - 1 };
        let (ctr_a, dir_a) = fit_line(pt, sums, po[i_prev], po[i]);
        let (ctr_b, dir_b) = fit_line(pt, sums, po[i], po[(i + 1) % m]);

        let q = add_quadform(&quadform(ctr_a, dir_a), &quadform(ctr_b, dir_b));
        let s = Point::new(pt[po[i]].0 as f64, pt[po[i]].1 as f64);

        let det = q[0][0] * q[1][1] - q[0][1] * q[1][0];
        if det.abs() < 1e-10 {
            vertices[i] = s;
            continue;
        }
        let wx = (-q[0][2] * q[1][1] + q[1][2] * q[0][1]) / det;
        let wy = (q[0][2] * q[1][0] - q[1][2] * q[0][0]) / det;

        vertices[i] = if (wx - s.x).abs() <= 0.5 && (wy - s.y).abs() <= 0.5 {
            Point::new(wx, wy)
        } else {
            constrain_to_box(&q, s)
        };
    }

    vertices
}

/// Best-fit line through the contour points in cyclic range [a..b]:
/// (centroid, unit direction of maximum variance).
fn fit_line(
    pt: &[(i32, i32)],
    sums: &SumTable,
    a: usize,
    b: usize,
) -> ((f64, f64), (f64, f64)) {
    let r = sums.range(a, b);
    if r.k == 0.0 {
        return ((pt[a].0 as f64, pt[a].1 as f64), (1.0, 0.0));
    }

    let ctr = (r.x / r.k + sums.x0 as f64, r.y / r.k + sums.y0 as f64);

    let a_cov = (r.x2 - r.x * r.x / r.k) / r.k;
    let b_cov = (r.xy - r.x * r.y / r.k) / r.k;
    let c_cov = (r.y2 - r.y * r.y / r.k) / r.k;

    // Eigenvector of the larger eigenvalue of the covariance matrix.
    let lambda2 =
        (a_cov + c_cov + ((a_cov - c_cov).powi(2) + 4.0 * b_cov * b_cov).sqrt()) / 2.0;
    let a2 = a_cov - lambda2;
    let c2 = c_cov - lambda2;

    let dir = if a2.abs() >= c2.abs() {
        let len = (b_cov * b_cov + a2 * a2).sqrt();
        if len > 1e-10 {
            (-b_cov / len, a2 / len)
        } else {
            (1.0, 0.0)
        }
    } else {
        let len = (c2 * c2 + b_cov * b_cov).sqrt();
        if len > 1e-10 {
            (-c2 / len, b_cov / len)
        } else {
            (1.0, 0.0)
        }
    };

    (ctr, dir)
}

/// 3x3 quadratic form measuring squared distance from the line through
/// `ctr` with direction `dir`.
fn quadform(ctr: (f64, f64), dir: (f64, f64)) -> [[f64; 3]; 3] {
    let v = [dir.1, -dir.0, -(dir.1 * ctr.0 - dir.0 * ctr.1)];
    let d = dir.0 * dir.0 + dir.1 * dir.1;
    let mut q = [[0.0f64; 3]; 3];
    if d < 1e-10 {
        return q;
    }
    for l in 0..3 {
        for k in 0..3 {
            q[l][k] = v[l] * v[k] / d;
        }
    }
    q
}

fn add_quadform(a: &[[f64; 3]; 3], b: &[[f64; 3]; 3]) -> [[f64; 3]; 3] {
    let mut q = [[0.0f64; 3]; 3];
    for l in 0..3 {
        for k in 0..3 {
            q[l][k] = a[l][k] + b[l][k];
        }
    }
    q
}

fn eval_quadform(q: &[[f64; 3]; 3], x: f64, y: f64) -> f64 {
    let p = [x, y, 1.0];
    let mut val = 0.0;
    for l in 0..3 {
        for k in 0..3 {
            val += p[l] * q[l][k] * p[k];
        }
    }
    val
}

/// Minimum of the quadratic form over the ±0.5 box around `center`.
fn constrain_to_box(q: &[[f64; 3]; 3], center: Point) -> Point {
    let lo_x = center.x - 0.5;
    let hi_x = center.x + 0.5;
    let lo_y = center.y - 0.5;
    let hi_y = center.y + 0.5;

    let mut best = center;
    let mut best_val = eval_quadform(q, center.x, center.y);
    let check = |x: f64, y: f64, best: &mut Point, best_val: &mut f64| {
        let v = eval_quadform(q, x, y);
        if v < *best_val {
            *best_val = v;
            *best = Point::new(x, y);
        }
    };

    for &x in &[lo_x, hi_x] {
        if q[1][1].abs() > 1e-10 {
            let y = (-(q[1][0] * x + q[1][2]) / q[1][1]).clamp(lo_y, hi_y);
            check(x, y, &mut best, &mut best_val);
        }
        check(x, lo_y, &mut best, &mut best_val);
        check(x, hi_y, &mut best, &mut best_val);
    }
    for &y in &[lo_y, hi_y] {
        if q[0][0].abs() > 1e-10 {
            let x = (-(q[0][1] * y + q[0][2]) / q[0][0]).clamp(lo_x, hi_x);
            check(x, y, &mut best, &mut best_val);
        }
    }

    best
}

// ── Helpers ──────────────────────────────────────────────

fn xprod(a: (i32, i32), b: (i32, i32)) -> i64 {
    a.0 as i64 * b.1 as i64 - a.1 as i64 * b.0 as i64
}

/// Proper modulo, non-negative for any signed input.
fn pmod(a: i64, n: i64) -> usize {
    (((a % n) + n) % n) as usize
}

/// Floor division (rounds toward negative infinity).
fn floordiv(a: i64, b: i64) -> i64 {
    if a >= 0 {
        a / b
    } else {
        -1 - (-1 - a) / b
    }
}

/// Whether b lies in the cyclic interval [a, c).
fn cyclic(a: usize, b: usize, c: usize) -> bool {
    if a <= c {
        a <= b && b < c
    } else {
        a <= b || b < c
    }
}
