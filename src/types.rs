//! Core types for the trendgate decision engine
//!
//! This module defines the data structures that flow through a decision:
//! daily records, baselines, per-metric verdicts, and the final phase result.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One calendar day's readings.
///
/// Every metric is optional: absence means "no reading for this metric on
/// this day", never zero. Sequences handed to the engine must be ordered
/// ascending by date; the last element is treated as "today".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyRecord {
    /// Calendar date, used only for ordering
    pub date: NaiveDate,
    /// Heart-rate variability (ms, RMSSD)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hrv: Option<f64>,
    /// Sleep duration (hours)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sleep_hours: Option<f64>,
    /// Training load (unitless, vendor-comparable scale)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub load: Option<f64>,
}

impl DailyRecord {
    /// Create an empty record for the given date
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            hrv: None,
            sleep_hours: None,
            load: None,
        }
    }

    /// Check whether this record carries at least one reading
    pub fn has_readings(&self) -> bool {
        self.hrv.is_some() || self.sleep_hours.is_some() || self.load.is_some()
    }
}

/// Per-metric reference values derived from a trailing window of records.
///
/// Baselines are always present (a metric with no readings in the window
/// falls back to `0.0`), recomputed fresh on every decision call, and never
/// persisted.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Baseline {
    /// Baseline HRV (ms)
    pub hrv: f64,
    /// Baseline sleep duration (hours)
    pub sleep_hours: f64,
    /// Baseline training load
    pub load: f64,
}

/// Verdict for a single metric relative to its baseline band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricVerdict {
    /// Below the tolerance band
    Lower,
    /// Inside the band, boundaries included
    Within,
    /// Above the tolerance band
    Higher,
}

impl MetricVerdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricVerdict::Lower => "lower",
            MetricVerdict::Within => "within",
            MetricVerdict::Higher => "higher",
        }
    }
}

/// One day's verdict triple.
///
/// A `None` entry means the underlying reading was absent; consumers must
/// treat it as "no data", not as a fourth verdict value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MetricVerdicts {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hrv: Option<MetricVerdict>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sleep: Option<MetricVerdict>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub load: Option<MetricVerdict>,
}

impl MetricVerdicts {
    /// Iterate the triple in fixed metric order (hrv, sleep, load)
    pub fn iter(&self) -> impl Iterator<Item = Option<MetricVerdict>> {
        [self.hrv, self.sleep, self.load].into_iter()
    }
}

/// Two-valued phase label emitted by the decision engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Phase {
    Observe,
    ConsiderAdjustment,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Observe => "OBSERVE",
            Phase::ConsiderAdjustment => "CONSIDER_ADJUSTMENT",
        }
    }
}

/// Direction of a persistent multi-day deviation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Lower,
    Higher,
}

/// Final output of a decision call.
///
/// `verdicts` always reflects today's classification triple, regardless of
/// which day's data drove the trend detection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionResult {
    pub phase: Phase,
    pub verdicts: MetricVerdicts,
    pub reason: String,
}

/// Report producer metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportProducer {
    pub name: String,
    pub version: String,
    pub instance_id: String,
}

/// Provenance of the input window behind a decision report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportProvenance {
    /// Number of records supplied by the caller
    pub record_count: usize,
    /// Number of records the baseline window actually covered
    pub window_days: usize,
    /// Date of the oldest supplied record
    pub first_date: NaiveDate,
    /// Date of the newest supplied record ("today")
    pub last_date: NaiveDate,
    pub computed_at_utc: String,
}

/// Complete decision report payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionReport {
    pub report_version: String,
    pub producer: ReportProducer,
    pub provenance: ReportProvenance,
    pub decision: DecisionResult,
    pub baseline: Baseline,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn test_daily_record_optional_metrics() {
        let json = r#"{"date": "2024-01-15", "hrv": 47.0}"#;
        let record: DailyRecord = serde_json::from_str(json).unwrap();

        assert_eq!(record.date, date("2024-01-15"));
        assert_eq!(record.hrv, Some(47.0));
        assert_eq!(record.sleep_hours, None);
        assert_eq!(record.load, None);
        assert!(record.has_readings());
    }

    #[test]
    fn test_empty_record_has_no_readings() {
        let record = DailyRecord::new(date("2024-01-15"));
        assert!(!record.has_readings());
    }

    #[test]
    fn test_absent_metrics_omitted_from_json() {
        let record = DailyRecord {
            date: date("2024-01-15"),
            hrv: Some(47.0),
            sleep_hours: None,
            load: None,
        };

        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("hrv"));
        assert!(!json.contains("sleep_hours"));
        assert!(!json.contains("load"));
    }

    #[test]
    fn test_phase_wire_casing() {
        assert_eq!(
            serde_json::to_string(&Phase::ConsiderAdjustment).unwrap(),
            r#""CONSIDER_ADJUSTMENT""#
        );
        assert_eq!(
            serde_json::to_string(&Phase::Observe).unwrap(),
            r#""OBSERVE""#
        );
    }

    #[test]
    fn test_verdict_wire_casing() {
        assert_eq!(
            serde_json::to_string(&MetricVerdict::Lower).unwrap(),
            r#""lower""#
        );
        assert_eq!(MetricVerdict::Higher.as_str(), "higher");
    }

    #[test]
    fn test_verdicts_iteration_order() {
        let verdicts = MetricVerdicts {
            hrv: Some(MetricVerdict::Lower),
            sleep: None,
            load: Some(MetricVerdict::Higher),
        };

        let collected: Vec<_> = verdicts.iter().collect();
        assert_eq!(
            collected,
            vec![Some(MetricVerdict::Lower), None, Some(MetricVerdict::Higher)]
        );
    }
}
