//! Baseline computation
//!
//! This module derives per-metric reference values from a trailing window of
//! daily records. Baselines enable relative interpretation of a single day's
//! readings against the wearer's own recent history.

use crate::error::EngineError;
use crate::types::{Baseline, DailyRecord};
use tracing::debug;

/// Default baseline window in days
pub const DEFAULT_BASELINE_WINDOW: usize = 14;

/// Compute a baseline from the trailing window of the supplied records.
///
/// The window covers the most recent `min(window, records.len())` records.
/// For each metric independently, the baseline is the statistical median of
/// the present readings inside the window: the middle element for an odd
/// count, the mean of the two central elements for an even count.
///
/// A metric with zero present readings across the entire window falls back
/// to a `0.0` baseline. This collapses its tolerance band to a point, so
/// every later non-null reading of that metric classifies as higher; callers
/// that want a different policy must filter such metrics upstream.
///
/// # Errors
/// Returns [`EngineError::EmptyDataset`] when `records` is empty.
pub fn compute_baseline(records: &[DailyRecord], window: usize) -> Result<Baseline, EngineError> {
    if records.is_empty() {
        return Err(EngineError::EmptyDataset);
    }

    let start = records.len().saturating_sub(window);
    let window_records = &records[start..];

    let baseline = Baseline {
        hrv: metric_baseline(window_records, |r| r.hrv),
        sleep_hours: metric_baseline(window_records, |r| r.sleep_hours),
        load: metric_baseline(window_records, |r| r.load),
    };

    debug!(
        records = records.len(),
        window_days = window_records.len(),
        hrv = baseline.hrv,
        sleep_hours = baseline.sleep_hours,
        load = baseline.load,
        "computed baseline"
    );

    Ok(baseline)
}

/// Median of the present readings for one metric, `0.0` when none exist
fn metric_baseline<F>(window: &[DailyRecord], metric: F) -> f64
where
    F: Fn(&DailyRecord) -> Option<f64>,
{
    let mut values: Vec<f64> = window.iter().filter_map(metric).collect();
    if values.is_empty() {
        return 0.0;
    }

    values.sort_by(f64::total_cmp);
    median_of_sorted(&values)
}

fn median_of_sorted(values: &[f64]) -> f64 {
    let mid = values.len() / 2;
    if values.len() % 2 == 1 {
        values[mid]
    } else {
        (values[mid - 1] + values[mid]) / 2.0
    }
}
