//! Trendgate CLI - Command-line interface for the trendgate decision engine
//!
//! Commands:
//! - decide: Run the decision engine over a batch of daily records
//! - validate: Validate daily-record input
//! - schema: Print schema information
//! - doctor: Diagnose configuration and environment

use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use trendgate::engine::{DecisionEngine, EngineConfig};
use trendgate::ingest::{RecordAdapter, SCHEMA_VERSION};
use trendgate::report::{ReportEncoder, REPORT_VERSION};
use trendgate::types::DailyRecord;
use trendgate::{EngineError, IngestError, PRODUCER_NAME, TRENDGATE_VERSION};

/// Trendgate - decide whether today's readings warrant a closer look
#[derive(Parser)]
#[command(name = "trendgate")]
#[command(version = TRENDGATE_VERSION)]
#[command(about = "Classify daily readings against a personal baseline", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the decision engine over a batch of daily records
    Decide {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Output file path (use - for stdout)
        #[arg(short, long, default_value = "-")]
        output: PathBuf,

        /// Input format
        #[arg(long, default_value = "ndjson")]
        input_format: InputFormat,

        /// Output format
        #[arg(long, default_value = "json-pretty")]
        output_format: OutputFormat,

        /// Baseline window in days
        #[arg(long, default_value = "14")]
        window_days: usize,

        /// Tolerance band as a percentage of the baseline
        #[arg(long, default_value = "5.0")]
        tolerance_pct: f64,
    },

    /// Validate daily-record input
    Validate {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Input format
        #[arg(long, default_value = "ndjson")]
        input_format: InputFormat,

        /// Output validation report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print schema information
    Schema {
        /// Schema to print (input or output)
        #[arg(value_enum)]
        schema_type: SchemaType,

        /// Output as JSON schema
        #[arg(long)]
        json_schema: bool,
    },

    /// Diagnose configuration and environment
    Doctor {
        /// Check a records file
        #[arg(long)]
        records: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, ValueEnum)]
enum InputFormat {
    /// Newline-delimited JSON (one record per line)
    Ndjson,
    /// JSON array of records
    Json,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Single-line JSON
    Json,
    /// Pretty-printed JSON
    JsonPretty,
}

#[derive(Clone, ValueEnum)]
enum SchemaType {
    /// Input schema (readiness.daily_record.v1)
    Input,
    /// Output schema (decision report)
    Output,
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e))
                    .unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<(), TrendgateCliError> {
    match cli.command {
        Commands::Decide {
            input,
            output,
            input_format,
            output_format,
            window_days,
            tolerance_pct,
        } => cmd_decide(
            &input,
            &output,
            input_format,
            output_format,
            window_days,
            tolerance_pct,
        ),

        Commands::Validate {
            input,
            input_format,
            json,
        } => cmd_validate(&input, input_format, json),

        Commands::Schema {
            schema_type,
            json_schema,
        } => cmd_schema(schema_type, json_schema),

        Commands::Doctor { records, json } => cmd_doctor(records.as_deref(), json),
    }
}

fn cmd_decide(
    input: &Path,
    output: &Path,
    input_format: InputFormat,
    output_format: OutputFormat,
    window_days: usize,
    tolerance_pct: f64,
) -> Result<(), TrendgateCliError> {
    let input_data = read_input(input)?;

    let records = parse_records(&input_data, &input_format)?;
    if records.is_empty() {
        return Err(TrendgateCliError::NoRecords);
    }

    let failures = RecordAdapter::validate_records(&records);
    if !failures.is_empty() {
        return Err(TrendgateCliError::ValidationFailed(failures.len()));
    }

    let records = RecordAdapter::normalize(records);

    let engine = DecisionEngine::with_config(EngineConfig {
        baseline_window: window_days,
        tolerance_pct,
    });
    let assessment = engine.assess(&records)?;

    let encoder = ReportEncoder::new();
    let report = encoder.encode(&assessment);

    let output_data = match output_format {
        OutputFormat::Json => serde_json::to_string(&report)? + "\n",
        OutputFormat::JsonPretty => serde_json::to_string_pretty(&report)? + "\n",
    };

    if output.to_string_lossy() == "-" {
        print!("{}", output_data);
    } else {
        fs::write(output, output_data)?;
    }

    Ok(())
}

fn cmd_validate(
    input: &Path,
    input_format: InputFormat,
    json: bool,
) -> Result<(), TrendgateCliError> {
    let input_data = read_input(input)?;
    let records = parse_records(&input_data, &input_format)?;

    let failures = RecordAdapter::validate_records(&records);

    let report = ValidationReport {
        total_records: records.len(),
        valid_records: records.len() - failures.len(),
        invalid_records: failures.len(),
        errors: failures
            .iter()
            .map(|f| ValidationErrorDetail {
                index: f.index,
                date: f.date.to_string(),
                error: f.error.to_string(),
            })
            .collect(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Validation Report");
        println!("=================");
        println!("Total records:   {}", report.total_records);
        println!("Valid records:   {}", report.valid_records);
        println!("Invalid records: {}", report.invalid_records);

        if !report.errors.is_empty() {
            println!("\nErrors:");
            for err in &report.errors {
                println!("  - Record {} ({}): {}", err.index, err.date, err.error);
            }
        }
    }

    if report.invalid_records > 0 {
        Err(TrendgateCliError::ValidationFailed(report.invalid_records))
    } else {
        Ok(())
    }
}

fn cmd_schema(schema_type: SchemaType, json_schema: bool) -> Result<(), TrendgateCliError> {
    match schema_type {
        SchemaType::Input => {
            if json_schema {
                println!("{}", get_input_json_schema());
            } else {
                println!("Input Schema: {}", SCHEMA_VERSION);
                println!();
                println!("One JSON object per calendar day:");
                println!();
                println!("  date        - calendar date (YYYY-MM-DD), required");
                println!("  hrv         - heart-rate variability (ms, RMSSD), optional");
                println!("  sleep_hours - sleep duration (hours), optional");
                println!("  load        - training load (unitless scale), optional");
                println!();
                println!("A missing metric means no reading for that day, not zero.");
                println!("Records must cover distinct days; same-day duplicates are");
                println!("collapsed on ingest with the later entry winning.");
            }
        }
        SchemaType::Output => {
            if json_schema {
                println!("{}", get_output_json_schema());
            } else {
                println!("Output Schema: decision report v{}", REPORT_VERSION);
                println!();
                println!("- report_version: Schema version ({})", REPORT_VERSION);
                println!("- producer: {{ name, version, instance_id }}");
                println!("- provenance: {{ record_count, window_days, first_date, last_date, computed_at_utc }}");
                println!("- decision:");
                println!("    phase: OBSERVE | CONSIDER_ADJUSTMENT");
                println!("    verdicts: {{ hrv, sleep, load }} each lower | within | higher, omitted when no reading");
                println!("    reason: one-line justification");
                println!("- baseline: {{ hrv, sleep_hours, load }}");
            }
        }
    }

    Ok(())
}

fn cmd_doctor(records: Option<&Path>, json: bool) -> Result<(), TrendgateCliError> {
    let mut checks: Vec<DoctorCheck> = Vec::new();

    checks.push(DoctorCheck {
        name: "trendgate_version".to_string(),
        status: CheckStatus::Ok,
        message: format!("Trendgate version {}", TRENDGATE_VERSION),
    });

    checks.push(DoctorCheck {
        name: "schema_version".to_string(),
        status: CheckStatus::Ok,
        message: format!("Input schema: {}", SCHEMA_VERSION),
    });

    // Check records file if provided
    if let Some(records_path) = records {
        if records_path.exists() {
            match fs::read_to_string(records_path) {
                Ok(content) => match RecordAdapter::parse_ndjson(&content)
                    .or_else(|_| RecordAdapter::parse_array(&content))
                {
                    Ok(parsed) => {
                        checks.push(DoctorCheck {
                            name: "records".to_string(),
                            status: CheckStatus::Ok,
                            message: format!("Records file valid ({} records)", parsed.len()),
                        });
                    }
                    Err(e) => {
                        checks.push(DoctorCheck {
                            name: "records".to_string(),
                            status: CheckStatus::Error,
                            message: format!("Invalid records file: {}", e),
                        });
                    }
                },
                Err(e) => {
                    checks.push(DoctorCheck {
                        name: "records".to_string(),
                        status: CheckStatus::Error,
                        message: format!("Cannot read records file: {}", e),
                    });
                }
            }
        } else {
            checks.push(DoctorCheck {
                name: "records".to_string(),
                status: CheckStatus::Warning,
                message: "Records file does not exist".to_string(),
            });
        }
    }

    let stdin_check = if atty::is(atty::Stream::Stdin) {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a TTY (interactive mode)".to_string(),
        }
    } else {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a pipe (batch mode ready)".to_string(),
        }
    };
    checks.push(stdin_check);

    let report = DoctorReport {
        producer: PRODUCER_NAME.to_string(),
        version: TRENDGATE_VERSION.to_string(),
        checks,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Trendgate Doctor Report");
        println!("=======================");
        println!("Producer: {}", report.producer);
        println!("Version:  {}", report.version);
        println!("\nChecks:");

        for check in &report.checks {
            let status_icon = match check.status {
                CheckStatus::Ok => "[OK]",
                CheckStatus::Warning => "[WARN]",
                CheckStatus::Error => "[ERR]",
            };
            println!("  {} {}: {}", status_icon, check.name, check.message);
        }
    }

    let has_errors = report
        .checks
        .iter()
        .any(|c| matches!(c.status, CheckStatus::Error));
    if has_errors {
        Err(TrendgateCliError::DoctorFailed)
    } else {
        Ok(())
    }
}

// Helper functions

fn read_input(input: &Path) -> Result<String, TrendgateCliError> {
    if input.to_string_lossy() == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    } else {
        Ok(fs::read_to_string(input)?)
    }
}

fn parse_records(
    input_data: &str,
    input_format: &InputFormat,
) -> Result<Vec<DailyRecord>, TrendgateCliError> {
    let records = match input_format {
        InputFormat::Ndjson => RecordAdapter::parse_ndjson(input_data)?,
        InputFormat::Json => RecordAdapter::parse_array(input_data)?,
    };
    Ok(records)
}

fn get_input_json_schema() -> String {
    serde_json::json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "$id": "https://trendgate.dev/schemas/readiness.daily_record.v1.json",
        "title": SCHEMA_VERSION,
        "description": "One calendar day's readings",
        "type": "object",
        "required": ["date"],
        "properties": {
            "date": { "type": "string", "format": "date" },
            "hrv": { "type": "number", "minimum": 0 },
            "sleep_hours": { "type": "number", "minimum": 0 },
            "load": { "type": "number", "minimum": 0 }
        }
    })
    .to_string()
}

fn get_output_json_schema() -> String {
    serde_json::json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "$id": "https://trendgate.dev/schemas/decision_report.v1.json",
        "title": "decision_report.v1",
        "description": "Trendgate decision report",
        "type": "object",
        "required": ["report_version", "producer", "provenance", "decision", "baseline"],
        "properties": {
            "report_version": { "type": "string" },
            "producer": {
                "type": "object",
                "properties": {
                    "name": { "type": "string" },
                    "version": { "type": "string" },
                    "instance_id": { "type": "string" }
                }
            },
            "provenance": {
                "type": "object",
                "properties": {
                    "record_count": { "type": "integer" },
                    "window_days": { "type": "integer" },
                    "first_date": { "type": "string", "format": "date" },
                    "last_date": { "type": "string", "format": "date" },
                    "computed_at_utc": { "type": "string" }
                }
            },
            "decision": {
                "type": "object",
                "properties": {
                    "phase": { "type": "string", "enum": ["OBSERVE", "CONSIDER_ADJUSTMENT"] },
                    "verdicts": {
                        "type": "object",
                        "properties": {
                            "hrv": { "type": "string", "enum": ["lower", "within", "higher"] },
                            "sleep": { "type": "string", "enum": ["lower", "within", "higher"] },
                            "load": { "type": "string", "enum": ["lower", "within", "higher"] }
                        }
                    },
                    "reason": { "type": "string" }
                }
            },
            "baseline": {
                "type": "object",
                "properties": {
                    "hrv": { "type": "number" },
                    "sleep_hours": { "type": "number" },
                    "load": { "type": "number" }
                }
            }
        }
    })
    .to_string()
}

// Error types

#[derive(Debug)]
enum TrendgateCliError {
    Io(io::Error),
    Ingest(IngestError),
    Json(serde_json::Error),
    Engine(EngineError),
    NoRecords,
    ValidationFailed(usize),
    DoctorFailed,
}

impl From<io::Error> for TrendgateCliError {
    fn from(e: io::Error) -> Self {
        TrendgateCliError::Io(e)
    }
}

impl From<IngestError> for TrendgateCliError {
    fn from(e: IngestError) -> Self {
        TrendgateCliError::Ingest(e)
    }
}

impl From<serde_json::Error> for TrendgateCliError {
    fn from(e: serde_json::Error) -> Self {
        TrendgateCliError::Json(e)
    }
}

impl From<EngineError> for TrendgateCliError {
    fn from(e: EngineError) -> Self {
        TrendgateCliError::Engine(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<TrendgateCliError> for CliError {
    fn from(e: TrendgateCliError) -> Self {
        match e {
            TrendgateCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            TrendgateCliError::Ingest(e) => CliError {
                code: "PARSE_ERROR".to_string(),
                message: e.to_string(),
                hint: Some(format!("Ensure input matches the {} schema", SCHEMA_VERSION)),
            },
            TrendgateCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            TrendgateCliError::Engine(e) => CliError {
                code: "NOT_ENOUGH_DATA".to_string(),
                message: e.to_string(),
                hint: Some("Supply at least 2 daily records and retry".to_string()),
            },
            TrendgateCliError::NoRecords => CliError {
                code: "NO_RECORDS".to_string(),
                message: "No records found in input".to_string(),
                hint: Some("Ensure input file is not empty".to_string()),
            },
            TrendgateCliError::ValidationFailed(count) => CliError {
                code: "VALIDATION_FAILED".to_string(),
                message: format!("{} records failed validation", count),
                hint: Some("Run 'trendgate validate' for details".to_string()),
            },
            TrendgateCliError::DoctorFailed => CliError {
                code: "DOCTOR_FAILED".to_string(),
                message: "One or more health checks failed".to_string(),
                hint: Some("Review the doctor report for details".to_string()),
            },
        }
    }
}

// Report types

#[derive(serde::Serialize)]
struct ValidationReport {
    total_records: usize,
    valid_records: usize,
    invalid_records: usize,
    errors: Vec<ValidationErrorDetail>,
}

#[derive(serde::Serialize)]
struct ValidationErrorDetail {
    index: usize,
    date: String,
    error: String,
}

#[derive(serde::Serialize)]
struct DoctorReport {
    producer: String,
    version: String,
    checks: Vec<DoctorCheck>,
}

#[derive(serde::Serialize)]
struct DoctorCheck {
    name: String,
    status: CheckStatus,
    message: String,
}

#[derive(serde::Serialize)]
enum CheckStatus {
    Ok,
    Warning,
    Error,
}
