use std::fmt;
use std::str::FromStr;

use crate::error::TraceError;

/// Tie-break rule for ambiguous corners during boundary tracing.
///
/// When the boundary walk meets a diagonal crossing (both diagonal
/// neighbors set, both anti-diagonal neighbors unset), the contour could
/// locally turn either way. The policy decides, deterministically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TurnPolicy {
    /// Keep black on the turning side.
    Black,
    /// Keep white on the turning side.
    White,
    /// Always turn left.
    Left,
    /// Always turn right.
    Right,
    /// Turn toward the majority color in a local window.
    Majority,
    /// Turn toward the minority color in a local window.
    #[default]
    Minority,
}

impl FromStr for TurnPolicy {
    type Err = TraceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "black" => Ok(TurnPolicy::Black),
            "white" => Ok(TurnPolicy::White),
            "left" => Ok(TurnPolicy::Left),
            "right" => Ok(TurnPolicy::Right),
            "majority" => Ok(TurnPolicy::Majority),
            "minority" => Ok(TurnPolicy::Minority),
            other => Err(TraceError::InvalidOptions(format!(
                "unrecognized turn policy {:?}",
                other
            ))),
        }
    }
}

impl fmt::Display for TurnPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TurnPolicy::Black => "black",
            TurnPolicy::White => "white",
            TurnPolicy::Left => "left",
            TurnPolicy::Right => "right",
            TurnPolicy::Majority => "majority",
            TurnPolicy::Minority => "minority",
        };
        f.write_str(name)
    }
}

/// All tracing parameters in one struct.
///
/// Caller-owned: every `trace` call receives its options explicitly and
/// no state persists between calls.
#[derive(Debug, Clone)]
pub struct TraceOptions {
    /// Tie-break rule for ambiguous corners.
    pub turn_policy: TurnPolicy,
    /// Minimum contour area in pixels; smaller specks are dropped as noise.
    pub turd_size: i32,
    /// Enable merging of adjacent curve segments into longer cubics.
    pub opt_curve: bool,
    /// Corner threshold: vertices whose curvature indicator reaches this
    /// value become sharp corners. Lower = more corners.
    pub alpha_max: f64,
    /// Maximum allowed deviation when merging curve segments.
    pub opt_tolerance: f64,
}

impl Default for TraceOptions {
    fn default() -> Self {
        Self {
            turn_policy: TurnPolicy::Minority,
            turd_size: 2,
            opt_curve: true,
            alpha_max: 1.0,
            opt_tolerance: 0.2,
        }
    }
}

impl TraceOptions {
    /// Check option ranges. Called by `trace` before any work happens.
    pub fn validate(&self) -> Result<(), TraceError> {
        if self.turd_size < 0 {
            return Err(TraceError::InvalidOptions(format!(
                "turdsize must be >= 0, got {}",
                self.turd_size
            )));
        }
        if !self.alpha_max.is_finite() || self.alpha_max < 0.0 {
            return Err(TraceError::InvalidOptions(format!(
                "alphamax must be >= 0, got {}",
                self.alpha_max
            )));
        }
        if !self.opt_tolerance.is_finite() || self.opt_tolerance < 0.0 {
            return Err(TraceError::InvalidOptions(format!(
                "opttolerance must be >= 0, got {}",
                self.opt_tolerance
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_options_are_valid() {
        assert!(TraceOptions::default().validate().is_ok());
    }

    #[test]
    fn negative_ranges_are_rejected() {
        let mut opts = TraceOptions::default();
        opts.turd_size = -1;
        assert!(matches!(
            opts.validate(),
            Err(TraceError::InvalidOptions(_))
        ));

        let mut opts = TraceOptions::default();
        opts.opt_tolerance = -0.1;
        assert!(opts.validate().is_err());

        let mut opts = TraceOptions::default();
        opts.alpha_max = f64::NAN;
        assert!(opts.validate().is_err());
    }

    #[test]
    fn turn_policy_parses_known_names() {
        assert_eq!("minority".parse::<TurnPolicy>().unwrap(), TurnPolicy::Minority);
        assert_eq!("black".parse::<TurnPolicy>().unwrap(), TurnPolicy::Black);
        assert!("diagonal".parse::<TurnPolicy>().is_err());
    }
}
