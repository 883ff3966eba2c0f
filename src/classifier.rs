//! Tolerance-band classification
//!
//! This module compares a single metric reading against its baseline with a
//! symmetric percentage tolerance band, producing a three-way verdict.

use crate::types::MetricVerdict;

/// Default tolerance band, as a percentage of the baseline
pub const DEFAULT_TOLERANCE_PCT: f64 = 5.0;

/// Classify one reading against its baseline band.
///
/// The band is `baseline ± baseline * tolerance_pct / 100`. Readings strictly
/// below the band are [`MetricVerdict::Lower`], strictly above are
/// [`MetricVerdict::Higher`]; values sitting exactly on either bound classify
/// as [`MetricVerdict::Within`].
///
/// An absent reading propagates: `None` in, `None` out. A negative
/// `tolerance_pct` inverts the band and is caller error; it is not validated
/// here.
pub fn classify(value: Option<f64>, baseline: f64, tolerance_pct: f64) -> Option<MetricVerdict> {
    let value = value?;

    let tolerance = baseline * tolerance_pct / 100.0;
    let lower_bound = baseline - tolerance;
    let upper_bound = baseline + tolerance;

    let verdict = if value < lower_bound {
        MetricVerdict::Lower
    } else if value > upper_bound {
        MetricVerdict::Higher
    } else {
        MetricVerdict::Within
    };

    Some(verdict)
}
