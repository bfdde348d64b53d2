//! Text emitters for traced paths.
//!
//! Both emitters walk the same `PathList`; neither re-parses the other's
//! output.

pub mod dxf;
pub mod svg;

/// Fixed-precision coordinate formatting shared by the emitters.
///
/// SVG coordinates carry three decimals, DXF group values six.
pub(crate) fn fmt3(v: f64) -> String {
    format!("{:.3}", v)
}

pub(crate) fn fmt6(v: f64) -> String {
    format!("{:.6}", v)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coordinate_precision() {
        assert_eq!(fmt3(1.0), "1.000");
        assert_eq!(fmt3(2.0 / 3.0), "0.667");
        assert_eq!(fmt6(2.0 / 3.0), "0.666667");
    }
}
