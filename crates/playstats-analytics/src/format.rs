//! Conversion of minute magnitudes into presentation units.

use playstats_common::{round_to_hundredths, DisplayUnit};
use serde::Serialize;
use std::fmt;

/// Unit a magnitude is presented in.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum DisplayMode {
    /// Raw minutes, unchanged.
    Minutes,
    /// Minutes divided by 60.
    Hours,
    /// Percentage of the given total (in minutes).
    PercentageOf(f64),
}

impl DisplayMode {
    /// Builds a mode from a configured unit; `total` is the reference for
    /// percentages and ignored otherwise.
    pub fn from_unit(unit: DisplayUnit, total: f64) -> Self {
        match unit {
            DisplayUnit::Minutes => Self::Minutes,
            DisplayUnit::Hours => Self::Hours,
            DisplayUnit::Percentage => Self::PercentageOf(total),
        }
    }

    /// Unit label attached to formatted values.
    pub const fn unit_label(self) -> &'static str {
        match self {
            Self::Minutes => "minutes",
            Self::Hours => "hours",
            Self::PercentageOf(_) => "%",
        }
    }
}

/// A render-ready magnitude.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FormattedValue {
    /// Converted magnitude; hours and percentages carry two fractional digits.
    pub magnitude: f64,
    /// "minutes", "hours" or "%".
    pub unit_label: &'static str,
}

impl fmt::Display for FormattedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.unit_label {
            "minutes" => write!(f, "{} minutes", self.magnitude),
            "%" => write!(f, "{:.2}%", self.magnitude),
            unit => write!(f, "{:.2} {unit}", self.magnitude),
        }
    }
}

/// Converts `minutes` into `mode`.
///
/// Intermediate math runs in full `f64` precision; only the final
/// magnitude is rounded. A percentage of a zero total is `0`.
pub fn format(minutes: u64, mode: DisplayMode) -> FormattedValue {
    let minutes = minutes as f64;
    let magnitude = match mode {
        DisplayMode::Minutes => minutes,
        DisplayMode::Hours => round_to_hundredths(minutes / 60.0),
        DisplayMode::PercentageOf(total) if total == 0.0 => 0.0,
        DisplayMode::PercentageOf(total) => round_to_hundredths(minutes / total * 100.0),
    };

    FormattedValue {
        magnitude,
        unit_label: mode.unit_label(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use playstats_common::test_utils::assert_approx_eq;
    use proptest::prelude::*;

    #[test]
    fn test_minutes_passthrough() {
        let value = format(90, DisplayMode::Minutes);
        assert!((value.magnitude - 90.0).abs() < f64::EPSILON);
        assert_eq!(value.unit_label, "minutes");
        assert_eq!(value.to_string(), "90 minutes");
    }

    #[test]
    fn test_hours() {
        let value = format(90, DisplayMode::Hours);
        assert!((value.magnitude - 1.5).abs() < f64::EPSILON);
        assert_eq!(value.unit_label, "hours");
        assert_eq!(value.to_string(), "1.50 hours");

        assert_approx_eq(format(100, DisplayMode::Hours).magnitude, 1.67, 1e-9);
    }

    #[test]
    fn test_percentage() {
        let value = format(300, DisplayMode::PercentageOf(900.0));
        assert_approx_eq(value.magnitude, 33.33, 1e-9);
        assert_eq!(value.unit_label, "%");
        assert_eq!(value.to_string(), "33.33%");
    }

    #[test]
    fn test_percentage_of_zero_total() {
        let value = format(300, DisplayMode::PercentageOf(0.0));
        assert!(value.magnitude.abs() < f64::EPSILON);
        assert_eq!(value.unit_label, "%");
    }

    #[test]
    fn test_from_unit() {
        assert_eq!(DisplayMode::from_unit(DisplayUnit::Hours, 12.0), DisplayMode::Hours);
        assert_eq!(
            DisplayMode::from_unit(DisplayUnit::Percentage, 12.0),
            DisplayMode::PercentageOf(12.0)
        );
    }

    proptest! {
        #[test]
        fn prop_hours_match_division(m in 0u64..10_000_000) {
            let value = format(m, DisplayMode::Hours);
            prop_assert!((value.magnitude - m as f64 / 60.0).abs() <= 0.005 + 1e-9);
        }

        #[test]
        fn prop_zero_total_percentage_is_zero(m in any::<u64>()) {
            prop_assert_eq!(format(m, DisplayMode::PercentageOf(0.0)).magnitude, 0.0);
        }
    }
}
