//! Trendgate - On-device decision engine for baseline-relative readiness phases
//!
//! Trendgate ingests a time-ordered series of daily readings (heart-rate
//! variability, sleep duration, training load) and emits a two-valued phase
//! label with a one-line reason, classifying today's state relative to the
//! wearer's own recent history: ingestion → baseline → classification →
//! trend decision → report encoding.
//!
//! The core is a pure, synchronous computation: each call either returns a
//! result or fails fast with a typed error, and no call mutates state
//! reachable by another.

pub mod baseline;
pub mod classifier;
pub mod engine;
pub mod error;
pub mod ingest;
pub mod report;
pub mod types;

pub use engine::{decide, Assessment, DecisionEngine, EngineConfig};
pub use error::{EngineError, IngestError};
pub use ingest::{RecordAdapter, SCHEMA_VERSION};
pub use report::{ReportEncoder, REPORT_VERSION};
pub use types::{
    Baseline, DailyRecord, DecisionResult, MetricVerdict, MetricVerdicts, Phase,
};

/// Trendgate version embedded in all report payloads
pub const TRENDGATE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for report payloads
pub const PRODUCER_NAME: &str = "trendgate";
