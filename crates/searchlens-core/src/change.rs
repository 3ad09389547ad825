//! Period-over-period change arithmetic.
//!
//! Every function here is total: the output is always finite, and a
//! missing or zero previous period never produces `NaN`/`Infinity`.

use serde::{Deserialize, Serialize};

/// How a zero previous-period value is reported.
///
/// The snapshot-level metrics report a flat 0% in that situation; the
/// search-term tables report +100% when the current value is positive.
/// Both conventions are load-bearing for the rendered output, so the
/// rule is an explicit parameter rather than an implicit special case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZeroRule {
    /// `previous == 0` reports 0%.
    #[default]
    Flat,
    /// `previous == 0` reports 100% when `current > 0`, else 0%.
    FullGain,
}

/// Percentage change from `previous` to `current`.
pub fn pct_change(current: f64, previous: f64, rule: ZeroRule) -> f64 {
    if previous == 0.0 {
        return match rule {
            ZeroRule::Flat => 0.0,
            ZeroRule::FullGain => {
                if current > 0.0 {
                    100.0
                } else {
                    0.0
                }
            }
        };
    }
    ((current - previous) / previous) * 100.0
}

/// Average-position change, inverted so that a positive delta is an
/// improvement (a lower rank number is better).
pub fn position_delta(current: f64, previous: f64) -> f64 {
    previous - current
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordinary_change() {
        assert!((pct_change(120.0, 100.0, ZeroRule::Flat) - 20.0).abs() < 1e-9);
        assert!((pct_change(80.0, 100.0, ZeroRule::Flat) + 20.0).abs() < 1e-9);
    }

    #[test]
    fn flat_rule_reports_zero_for_zero_previous() {
        assert_eq!(pct_change(50.0, 0.0, ZeroRule::Flat), 0.0);
        assert_eq!(pct_change(0.0, 0.0, ZeroRule::Flat), 0.0);
    }

    #[test]
    fn full_gain_rule_reports_hundred_for_zero_previous() {
        assert_eq!(pct_change(50.0, 0.0, ZeroRule::FullGain), 100.0);
        assert_eq!(pct_change(0.0, 0.0, ZeroRule::FullGain), 0.0);
    }

    #[test]
    fn change_is_always_finite() {
        for rule in [ZeroRule::Flat, ZeroRule::FullGain] {
            for (current, previous) in [(0.0, 0.0), (1.0, 0.0), (0.0, 1.0), (1e12, 1e-12)] {
                assert!(pct_change(current, previous, rule).is_finite());
            }
        }
    }

    #[test]
    fn position_improvement_is_positive() {
        // Moving from rank 10 to rank 5 is a +5 improvement.
        assert_eq!(position_delta(5.0, 10.0), 5.0);
        assert_eq!(position_delta(10.0, 5.0), -5.0);
    }
}
