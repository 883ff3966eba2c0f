//! Decision report encoding
//!
//! This module wraps a decision in the versioned JSON envelope handed to
//! presentation collaborators: producer metadata, input provenance, the
//! decision itself, and the baseline it was classified against.

use crate::engine::Assessment;
use crate::types::{DecisionReport, ReportProducer, ReportProvenance};
use crate::{PRODUCER_NAME, TRENDGATE_VERSION};
use chrono::Utc;
use uuid::Uuid;

/// Current report schema version
pub const REPORT_VERSION: &str = "1.0.0";

/// Encoder for producing decision report payloads
pub struct ReportEncoder {
    instance_id: String,
}

impl Default for ReportEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportEncoder {
    /// Create a new encoder with a unique instance ID
    pub fn new() -> Self {
        Self {
            instance_id: Uuid::new_v4().to_string(),
        }
    }

    /// Create an encoder with a specific instance ID
    pub fn with_instance_id(instance_id: String) -> Self {
        Self { instance_id }
    }

    /// Encode an assessment into a report payload
    pub fn encode(&self, assessment: &Assessment) -> DecisionReport {
        let producer = ReportProducer {
            name: PRODUCER_NAME.to_string(),
            version: TRENDGATE_VERSION.to_string(),
            instance_id: self.instance_id.clone(),
        };

        let provenance = ReportProvenance {
            record_count: assessment.record_count,
            window_days: assessment.window_days,
            first_date: assessment.first_date,
            last_date: assessment.last_date,
            computed_at_utc: Utc::now().to_rfc3339(),
        };

        DecisionReport {
            report_version: REPORT_VERSION.to_string(),
            producer,
            provenance,
            decision: assessment.result.clone(),
            baseline: assessment.baseline,
        }
    }

    /// Encode to a pretty-printed JSON string
    pub fn encode_to_json(&self, assessment: &Assessment) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.encode(assessment))
    }
}
