//! Record ingestion
//!
//! This module is the interface boundary to the data-acquisition
//! collaborator: it parses daily-record payloads, validates readings, and
//! normalizes sequences into the ordered-ascending form the engine requires.
//! Vendor unit conversion and token handling live upstream and are not
//! represented here.

use crate::error::IngestError;
use crate::types::DailyRecord;
use tracing::warn;

/// Current input schema version
pub const SCHEMA_VERSION: &str = "readiness.daily_record.v1";

/// Outcome of validating one record in a batch
#[derive(Debug)]
pub struct RecordValidationFailure {
    /// Index of the record in the input batch
    pub index: usize,
    pub date: chrono::NaiveDate,
    pub error: IngestError,
}

/// Adapter for daily-record payloads
pub struct RecordAdapter;

impl RecordAdapter {
    /// Parse newline-delimited JSON, one record per line. Blank lines are
    /// skipped.
    pub fn parse_ndjson(input: &str) -> Result<Vec<DailyRecord>, IngestError> {
        let mut records = Vec::new();

        for (index, line) in input.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            let record: DailyRecord =
                serde_json::from_str(trimmed).map_err(|e| IngestError::ParseError {
                    line: index + 1,
                    message: e.to_string(),
                })?;
            records.push(record);
        }

        Ok(records)
    }

    /// Parse a JSON array of records
    pub fn parse_array(input: &str) -> Result<Vec<DailyRecord>, IngestError> {
        let records: Vec<DailyRecord> = serde_json::from_str(input)?;
        Ok(records)
    }

    /// Sort records ascending by date and collapse same-day duplicates, the
    /// later entry in the input winning. Upholds the engine's ordering
    /// invariant at the boundary.
    pub fn normalize(mut records: Vec<DailyRecord>) -> Vec<DailyRecord> {
        // Stable sort keeps input order within a date, so "last wins" below
        // matches the order the caller supplied.
        records.sort_by_key(|r| r.date);

        let mut normalized: Vec<DailyRecord> = Vec::with_capacity(records.len());
        for record in records {
            match normalized.last_mut() {
                Some(prev) if prev.date == record.date => {
                    warn!(date = %record.date, "dropping duplicate same-day record");
                    *prev = record;
                }
                _ => normalized.push(record),
            }
        }

        normalized
    }

    /// Validate one record: every present reading must be non-negative and
    /// finite.
    pub fn validate(record: &DailyRecord) -> Result<(), IngestError> {
        for (field, value) in [
            ("hrv", record.hrv),
            ("sleep_hours", record.sleep_hours),
            ("load", record.load),
        ] {
            if let Some(value) = value {
                if !value.is_finite() || value < 0.0 {
                    return Err(IngestError::InvalidReading {
                        field,
                        date: record.date,
                        value,
                    });
                }
            }
        }

        Ok(())
    }

    /// Validate a batch, returning one failure per offending record
    pub fn validate_records(records: &[DailyRecord]) -> Vec<RecordValidationFailure> {
        records
            .iter()
            .enumerate()
            .filter_map(|(index, record)| {
                Self::validate(record).err().map(|error| RecordValidationFailure {
                    index,
                    date: record.date,
                    error,
                })
            })
            .collect()
    }
}
