//! Decision orchestration
//!
//! This module owns the classify-then-decide computation: one baseline over
//! the supplied history, six classifications (three metrics for each of the
//! two most recent days), and the multi-day trend rule that resolves the
//! final phase and reason. There is no state carried across calls; every
//! invocation recomputes the trend purely from the supplied records.

use crate::baseline::{compute_baseline, DEFAULT_BASELINE_WINDOW};
use crate::classifier::{classify, DEFAULT_TOLERANCE_PCT};
use crate::error::EngineError;
use crate::types::{
    Baseline, DailyRecord, DecisionResult, MetricVerdict, MetricVerdicts, Phase, TrendDirection,
};
use tracing::debug;

/// Number of metrics that must agree on a direction across both days
/// before the phase flips to consider-adjustment
pub const TREND_METRIC_THRESHOLD: usize = 2;

/// Fixed reason emitted when no trend threshold is met
pub const OBSERVE_REASON: &str = "Observing current state.";

/// Engine tuning, passed explicitly so tests can override without touching
/// shared state
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineConfig {
    /// Trailing baseline window in days
    pub baseline_window: usize,
    /// Tolerance band as a percentage of the baseline
    pub tolerance_pct: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            baseline_window: DEFAULT_BASELINE_WINDOW,
            tolerance_pct: DEFAULT_TOLERANCE_PCT,
        }
    }
}

/// A decision together with the context it was computed from
#[derive(Debug, Clone, PartialEq)]
pub struct Assessment {
    pub result: DecisionResult,
    /// Baseline the verdicts were classified against
    pub baseline: Baseline,
    /// Number of records the baseline window actually covered
    pub window_days: usize,
    /// Number of records supplied by the caller
    pub record_count: usize,
    /// Date of the oldest supplied record
    pub first_date: chrono::NaiveDate,
    /// Date of the newest supplied record ("today")
    pub last_date: chrono::NaiveDate,
}

/// Stateless decision engine over ordered daily records
#[derive(Debug, Clone, Default)]
pub struct DecisionEngine {
    config: EngineConfig,
}

/// Decide with default configuration (14-day window, 5% tolerance)
pub fn decide(records: &[DailyRecord]) -> Result<DecisionResult, EngineError> {
    DecisionEngine::new().decide(records)
}

impl DecisionEngine {
    /// Create an engine with default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an engine with explicit configuration
    pub fn with_config(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Classify the two most recent days against the shared baseline and
    /// resolve the phase.
    ///
    /// The records must be ordered ascending by date; the last element is
    /// "today", the second-to-last "yesterday". The baseline window is drawn
    /// from the entire input, today and yesterday included.
    ///
    /// # Errors
    /// Returns [`EngineError::InsufficientHistory`] for fewer than 2 records.
    pub fn decide(&self, records: &[DailyRecord]) -> Result<DecisionResult, EngineError> {
        self.assess(records).map(|assessment| assessment.result)
    }

    /// Like [`DecisionEngine::decide`], but keeps the baseline and effective
    /// window length alongside the result for downstream encoding.
    pub fn assess(&self, records: &[DailyRecord]) -> Result<Assessment, EngineError> {
        if records.len() < 2 {
            return Err(EngineError::InsufficientHistory {
                got: records.len(),
            });
        }

        let baseline = compute_baseline(records, self.config.baseline_window)?;
        let window_days = records.len().min(self.config.baseline_window);

        let today = &records[records.len() - 1];
        let yesterday = &records[records.len() - 2];

        let today_verdicts = self.classify_record(today, &baseline);
        let yesterday_verdicts = self.classify_record(yesterday, &baseline);

        let lower_count = consecutive_count(today_verdicts, yesterday_verdicts, MetricVerdict::Lower);
        let higher_count =
            consecutive_count(today_verdicts, yesterday_verdicts, MetricVerdict::Higher);

        let (phase, reason) = phase_for_counts(lower_count, higher_count);

        debug!(
            date = %today.date,
            phase = phase.as_str(),
            lower_count,
            higher_count,
            "resolved phase"
        );

        Ok(Assessment {
            result: DecisionResult {
                phase,
                verdicts: today_verdicts,
                reason,
            },
            baseline,
            window_days,
            record_count: records.len(),
            first_date: records[0].date,
            last_date: today.date,
        })
    }

    fn classify_record(&self, record: &DailyRecord, baseline: &Baseline) -> MetricVerdicts {
        MetricVerdicts {
            hrv: classify(record.hrv, baseline.hrv, self.config.tolerance_pct),
            sleep: classify(record.sleep_hours, baseline.sleep_hours, self.config.tolerance_pct),
            load: classify(record.load, baseline.load, self.config.tolerance_pct),
        }
    }
}

/// Count metrics whose verdict is present on both days and equals
/// `direction` on both. A metric with an absent verdict on either day is
/// excluded from the count, never treated as agreeing by default.
fn consecutive_count(
    today: MetricVerdicts,
    yesterday: MetricVerdicts,
    direction: MetricVerdict,
) -> usize {
    today
        .iter()
        .zip(yesterday.iter())
        .filter(|(t, y)| *t == Some(direction) && *y == Some(direction))
        .count()
}

/// Resolve phase and reason from the two directional counts.
///
/// The lower direction is checked first: a fixed priority, not a magnitude
/// comparison. Reason wording is templated on direction and count only;
/// metric identity is never named.
fn phase_for_counts(lower_count: usize, higher_count: usize) -> (Phase, String) {
    if lower_count >= TREND_METRIC_THRESHOLD {
        (
            Phase::ConsiderAdjustment,
            trend_reason(TrendDirection::Lower, lower_count),
        )
    } else if higher_count >= TREND_METRIC_THRESHOLD {
        (
            Phase::ConsiderAdjustment,
            trend_reason(TrendDirection::Higher, higher_count),
        )
    } else {
        (Phase::Observe, OBSERVE_REASON.to_string())
    }
}

fn trend_reason(direction: TrendDirection, count: usize) -> String {
    match direction {
        TrendDirection::Lower => {
            format!("{count} recovery signals have been outside baseline for 2 consecutive days.")
        }
        TrendDirection::Higher => {
            format!("{count} load signals have been outside baseline for 2 consecutive days.")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn record(day: u32, hrv: Option<f64>, sleep: Option<f64>, load: Option<f64>) -> DailyRecord {
        DailyRecord {
            date: NaiveDate::from_ymd_opt(2024, 3, day).unwrap(),
            hrv,
            sleep_hours: sleep,
            load,
        }
    }

    fn full_record(day: u32, hrv: f64, sleep: f64, load: f64) -> DailyRecord {
        record(day, Some(hrv), Some(sleep), Some(load))
    }

    /// Ten steady days establishing a baseline of hrv 50, sleep 8, load 14
    fn steady_history() -> Vec<DailyRecord> {
        (1..=10)
            .map(|day| full_record(day, 50.0, 8.0, 14.0))
            .collect()
    }

    #[test]
    fn test_insufficient_history_for_zero_and_one_record() {
        let engine = DecisionEngine::new();

        assert_eq!(
            engine.decide(&[]),
            Err(EngineError::InsufficientHistory { got: 0 })
        );
        assert_eq!(
            engine.decide(&[full_record(1, 50.0, 8.0, 14.0)]),
            Err(EngineError::InsufficientHistory { got: 1 })
        );
    }

    #[test]
    fn test_exactly_two_records_is_enough() {
        let records = vec![full_record(1, 50.0, 8.0, 14.0), full_record(2, 50.0, 8.0, 14.0)];

        let result = DecisionEngine::new().decide(&records).unwrap();
        assert_eq!(result.phase, Phase::Observe);
        assert_eq!(result.reason, OBSERVE_REASON);
    }

    #[test]
    fn test_steady_state_observes() {
        let result = decide(&steady_history()).unwrap();

        assert_eq!(result.phase, Phase::Observe);
        assert_eq!(result.reason, "Observing current state.");
        assert_eq!(result.verdicts.hrv, Some(MetricVerdict::Within));
        assert_eq!(result.verdicts.sleep, Some(MetricVerdict::Within));
        assert_eq!(result.verdicts.load, Some(MetricVerdict::Within));
    }

    #[test]
    fn test_single_day_deviation_is_not_a_trend() {
        let mut records = steady_history();
        // Today collapses, but yesterday was still on baseline
        records.push(full_record(11, 30.0, 5.0, 20.0));

        let result = decide(&records).unwrap();
        assert_eq!(result.phase, Phase::Observe);
    }

    #[test]
    fn test_two_consecutive_lower_metrics_flip_the_phase() {
        let mut records = steady_history();
        records.push(full_record(11, 40.0, 6.0, 14.0));
        records.push(full_record(12, 41.0, 6.2, 14.0));

        let result = decide(&records).unwrap();
        assert_eq!(result.phase, Phase::ConsiderAdjustment);
        assert_eq!(
            result.reason,
            "2 recovery signals have been outside baseline for 2 consecutive days."
        );
    }

    #[test]
    fn test_two_consecutive_higher_metrics_flip_the_phase() {
        let mut records = steady_history();
        records.push(full_record(11, 50.0, 9.5, 17.0));
        records.push(full_record(12, 50.0, 9.4, 18.0));

        let result = decide(&records).unwrap();
        assert_eq!(result.phase, Phase::ConsiderAdjustment);
        assert_eq!(
            result.reason,
            "2 load signals have been outside baseline for 2 consecutive days."
        );
    }

    #[test]
    fn test_absent_verdict_on_either_day_never_counts() {
        let mut records = steady_history();
        // hrv reads low on both days, sleep is missing yesterday, load stays
        // within band: only one metric can count toward the lower trend.
        records.push(record(11, Some(40.0), None, Some(14.0)));
        records.push(record(12, Some(41.0), Some(6.0), Some(14.0)));

        let result = decide(&records).unwrap();
        assert_eq!(result.phase, Phase::Observe);
        // Today's triple is still fully classified
        assert_eq!(result.verdicts.hrv, Some(MetricVerdict::Lower));
        assert_eq!(result.verdicts.sleep, Some(MetricVerdict::Lower));
        assert_eq!(result.verdicts.load, Some(MetricVerdict::Within));
    }

    #[test]
    fn test_opposite_directions_on_the_two_days_never_count() {
        let mut records = steady_history();
        records.push(full_record(11, 60.0, 9.5, 14.0));
        records.push(full_record(12, 40.0, 6.0, 14.0));

        let result = decide(&records).unwrap();
        assert_eq!(result.phase, Phase::Observe);
    }

    #[test]
    fn test_lower_direction_takes_priority_over_higher() {
        // Three metrics cap either count at 3, so both counts reaching the
        // threshold is only constructible at the count level.
        let (phase, reason) = phase_for_counts(2, 2);

        assert_eq!(phase, Phase::ConsiderAdjustment);
        assert_eq!(
            reason,
            "2 recovery signals have been outside baseline for 2 consecutive days."
        );
    }

    #[test]
    fn test_mixed_directions_prefer_lower_when_it_meets_threshold() {
        let mut records = steady_history();
        // hrv and sleep run low on both days while load runs high on both
        records.push(full_record(11, 40.0, 6.0, 17.0));
        records.push(full_record(12, 41.0, 6.1, 18.0));

        let result = decide(&records).unwrap();
        assert_eq!(result.phase, Phase::ConsiderAdjustment);
        assert_eq!(
            result.reason,
            "2 recovery signals have been outside baseline for 2 consecutive days."
        );
    }

    #[test]
    fn test_all_three_metrics_lower_names_the_count() {
        let mut records = steady_history();
        records.push(full_record(11, 40.0, 6.0, 11.0));
        records.push(full_record(12, 41.0, 6.1, 11.5));

        let result = decide(&records).unwrap();
        assert_eq!(
            result.reason,
            "3 recovery signals have been outside baseline for 2 consecutive days."
        );
    }

    #[test]
    fn test_verdicts_reflect_today_not_yesterday() {
        let mut records = steady_history();
        records.push(full_record(11, 40.0, 6.0, 14.0));
        // Today recovers; yesterday's deviation alone is not a trend
        records.push(full_record(12, 50.0, 8.0, 14.0));

        let result = decide(&records).unwrap();
        assert_eq!(result.phase, Phase::Observe);
        assert_eq!(result.verdicts.hrv, Some(MetricVerdict::Within));
        assert_eq!(result.verdicts.sleep, Some(MetricVerdict::Within));
    }

    #[test]
    fn test_config_overrides_apply() {
        let engine = DecisionEngine::with_config(EngineConfig {
            baseline_window: 14,
            tolerance_pct: 50.0,
        });

        let mut records = steady_history();
        // 30% below baseline is still inside a 50% band
        records.push(full_record(11, 35.0, 5.6, 14.0));
        records.push(full_record(12, 35.0, 5.6, 14.0));

        let result = engine.decide(&records).unwrap();
        assert_eq!(result.phase, Phase::Observe);
    }

    #[test]
    fn test_assess_exposes_baseline_and_window() {
        let assessment = DecisionEngine::new().assess(&steady_history()).unwrap();

        assert_eq!(assessment.baseline.hrv, 50.0);
        assert_eq!(assessment.baseline.sleep_hours, 8.0);
        assert_eq!(assessment.baseline.load, 14.0);
        assert_eq!(assessment.window_days, 10);
        assert_eq!(assessment.record_count, 10);
        assert_eq!(assessment.first_date, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        assert_eq!(assessment.last_date, NaiveDate::from_ymd_opt(2024, 3, 10).unwrap());
    }

    #[test]
    fn test_thirteen_day_downturn_scenario() {
        let values = [
            (45.0, 7.5, 12.5),
            (48.0, 8.0, 14.2),
            (46.0, 7.8, 13.8),
            (50.0, 8.2, 11.5),
            (47.0, 7.9, 15.1),
            (49.0, 8.1, 13.2),
            (48.0, 8.0, 14.0),
            (46.0, 7.7, 12.8),
            (51.0, 8.3, 11.0),
            (47.0, 7.6, 14.5),
            (42.0, 7.2, 16.0),
            (40.0, 7.0, 16.5),
            (38.0, 6.8, 17.0),
        ];
        let records: Vec<DailyRecord> = values
            .iter()
            .enumerate()
            .map(|(i, &(hrv, sleep, load))| full_record(i as u32 + 1, hrv, sleep, load))
            .collect();

        let assessment = DecisionEngine::new().assess(&records).unwrap();

        assert_eq!(assessment.baseline.hrv, 47.0);
        assert_eq!(assessment.baseline.sleep_hours, 7.8);
        assert_eq!(assessment.baseline.load, 14.0);

        let result = assessment.result;
        assert_eq!(result.verdicts.hrv, Some(MetricVerdict::Lower));
        assert_eq!(result.verdicts.sleep, Some(MetricVerdict::Lower));
        assert_eq!(result.verdicts.load, Some(MetricVerdict::Higher));

        assert_eq!(result.phase, Phase::ConsiderAdjustment);
        assert_eq!(
            result.reason,
            "2 recovery signals have been outside baseline for 2 consecutive days."
        );
    }
}
