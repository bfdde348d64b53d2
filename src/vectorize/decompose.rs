//! Contour extraction: binary bitmap -> closed pixel contours.
//!
//! The boundary walk happens on the pixel-corner grid (between pixels).
//! Traced interiors are XOR-filled in a working copy, which makes holes
//! surface as foreground on a later scan pass and keeps nesting
//! bookkeeping implicit.

use crate::bitmap::Bitmap;
use crate::error::TraceError;
use crate::options::TurnPolicy;
use crate::path::Sign;

/// A raw closed contour on the pixel-corner grid, in raster coordinates
/// (y down). Owned by the decomposer until handed to the polygon stage.
#[derive(Debug, Clone)]
pub struct Contour {
    /// Closed vertex loop; consecutive points differ by one unit step.
    pub points: Vec<(i32, i32)>,
    /// Area enclosed by the loop, accumulated during the walk. The walk
    /// orientation makes this non-negative for both outers and holes.
    pub area: i64,
    /// Outer boundary or hole, judged against the original bitmap.
    pub sign: Sign,
    /// Rightmost x reached, used by the XOR fill.
    pub(crate) max_x: i32,
}

/// Extract all contours whose area exceeds `turd_size`, in raster-scan
/// order of their starting pixels.
pub fn decompose(
    bitmap: &Bitmap,
    policy: TurnPolicy,
    turd_size: i32,
) -> Result<Vec<Contour>, TraceError> {
    let mut work = bitmap.clone();
    let mut contours = Vec::new();
    let mut from = 0usize;

    while let Some((x, y)) = work.find_next(from) {
        let sign = if bitmap.at(x, y) { Sign::Plus } else { Sign::Minus };
        let contour = find_path(&work, x, y, sign, policy)?;
        xor_fill(&mut work, &contour);

        if contour.area > turd_size as i64 {
            contours.push(contour);
        }
        // The start pixel is always flipped by the fill, so resuming the
        // scan at it cannot loop.
        from = work.index(x, y);
    }

    Ok(contours)
}

/// Trace one closed contour starting at the corner above pixel (x0, y0).
///
/// At every corner the walk probes the two pixels flanking the edge ahead:
/// one to the right of the travel direction, one to the left. Both set
/// forces a right turn, both unset a left turn; right-set-only is the
/// ambiguous diagonal crossing, resolved by the turn policy.
fn find_path(
    bm: &Bitmap,
    x0: i32,
    y0: i32,
    sign: Sign,
    policy: TurnPolicy,
) -> Result<Contour, TraceError> {
    let mut points = Vec::new();
    let mut area: i64 = 0;
    let mut max_x = x0;
    let (mut x, mut y) = (x0, y0);
    let (mut dx, mut dy) = (0i32, 1i32);

    // Every unit edge of the corner grid is traversed at most once per
    // direction, so a correct walk is bounded. Exceeding the bound is an
    // internal defect, not a recoverable condition.
    let max_steps = 4 * (bm.width() as i64 + 2) * (bm.height() as i64 + 2);
    let mut steps: i64 = 0;

    loop {
        points.push((x, y));
        max_x = max_x.max(x);

        x += dx;
        y += dy;
        area -= x as i64 * dy as i64;

        if x == x0 && y == y0 {
            break;
        }

        steps += 1;
        if steps > max_steps {
            return Err(TraceError::TraceFailure(format!(
                "contour walk from ({}, {}) did not close",
                x0, y0
            )));
        }

        // The offset formulas map each cardinal direction to the two
        // pixels sharing the edge ahead. Numerators are always even, so
        // truncating division is exact.
        let left = bm.at(x + (dx + dy - 1) / 2, y + (dy - dx - 1) / 2);
        let right = bm.at(x + (dx - dy - 1) / 2, y + (dy + dx - 1) / 2);

        if right && !left {
            if turn_right(bm, x, y, sign, policy) {
                let t = dx;
                dx = -dy;
                dy = t;
            } else {
                let t = dx;
                dx = dy;
                dy = -t;
            }
        } else if right {
            let t = dx;
            dx = -dy;
            dy = t;
        } else if !left {
            let t = dx;
            dx = dy;
            dy = -t;
        }
    }

    Ok(Contour {
        points,
        area,
        sign,
        max_x,
    })
}

/// Whether the ambiguous crossing at (x, y) should be resolved by a right
/// turn under the given policy.
fn turn_right(bm: &Bitmap, x: i32, y: i32, sign: Sign, policy: TurnPolicy) -> bool {
    match policy {
        TurnPolicy::Right => true,
        TurnPolicy::Left => false,
        TurnPolicy::Black => sign == Sign::Plus,
        TurnPolicy::White => sign == Sign::Minus,
        TurnPolicy::Majority => majority(bm, x, y),
        TurnPolicy::Minority => !majority(bm, x, y),
    }
}

/// XOR-fill the interior of a contour in the working bitmap.
///
/// Every vertical step toggles its row out to the contour's right edge.
/// Toggles outside the region pair up and cancel; the interior is flipped
/// exactly once.
fn xor_fill(bm: &mut Bitmap, contour: &Contour) {
    if contour.points.is_empty() {
        return;
    }
    let mut y_prev = contour.points[0].1;
    for &(x, y) in contour.points.iter().skip(1) {
        if y != y_prev {
            let row = y.min(y_prev);
            for xi in x..contour.max_x {
                bm.flip(xi, row);
            }
            y_prev = y;
        }
    }
}

/// Majority color around a corner: true if black wins.
///
/// Checks rings of radius 2, 3, 4 and returns as soon as one ring has a
/// clear majority.
fn majority(bm: &Bitmap, x: i32, y: i32) -> bool {
    for i in 2..5 {
        let mut ct = 0i32;
        for a in (-i + 1)..=(i - 1) {
            ct += if bm.at(x + a, y + i - 1) { 1 } else { -1 };
            ct += if bm.at(x + i - 1, y + a - 1) { 1 } else { -1 };
            ct += if bm.at(x + a - 1, y - i) { 1 } else { -1 };
            ct += if bm.at(x - i, y + a) { 1 } else { -1 };
        }
        if ct > 0 {
            return true;
        } else if ct < 0 {
            return false;
        }
    }
    false
}
