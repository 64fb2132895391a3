use std::path::PathBuf;
use std::process;

use clap::error::ErrorKind;
use clap::{Parser, Subcommand, ValueEnum};
use mapcheck::cmd::{hours, run};
use mapcheck::domain::report::{PipelineInput, PipelineInputSource, PipelineReport};
use mapcheck::engine::rules::FailurePolicy;
use mapcheck::io::mapping::DEFAULT_MAPPING_DIR;
use mapcheck::io::{self as mapcheck_io, Format};
use serde::Serialize;
use serde_json::{Value, json};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "mapcheck",
    version,
    about = "Mapping-driven source/target consistency checks"
)]
struct Cli {
    #[arg(long, global = true, default_value_t = false)]
    emit_pipeline: bool,

    #[arg(long, global = true, value_enum, default_value_t = LogLevel::Warn)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Compare a source and target document using a pipeline rules mapping.
    Run(RunArgs),
    /// Expand a compressed business-hours string into per-day records.
    Hours(HoursArgs),
}

#[derive(Debug, clap::Args)]
struct RunArgs {
    #[arg(long)]
    pipeline: String,

    #[arg(long)]
    source: PathBuf,

    #[arg(long)]
    target: PathBuf,

    #[arg(long, value_enum)]
    source_format: Option<CliInputFormat>,

    #[arg(long, value_enum)]
    target_format: Option<CliInputFormat>,

    #[arg(long, conflicts_with = "mapping")]
    mapping_dir: Option<PathBuf>,

    #[arg(long)]
    mapping: Option<PathBuf>,

    /// Record every value mismatch instead of stopping at the first one.
    #[arg(long, default_value_t = false)]
    collect: bool,
}

#[derive(Debug, clap::Args)]
struct HoursArgs {
    text: String,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliInputFormat {
    Json,
    Yaml,
    Csv,
    Jsonl,
}

impl From<CliInputFormat> for Format {
    fn from(value: CliInputFormat) -> Self {
        match value {
            CliInputFormat::Json => Self::Json,
            CliInputFormat::Yaml => Self::Yaml,
            CliInputFormat::Csv => Self::Csv,
            CliInputFormat::Jsonl => Self::Jsonl,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for tracing::Level {
    fn from(value: LogLevel) -> Self {
        match value {
            LogLevel::Error => Self::ERROR,
            LogLevel::Warn => Self::WARN,
            LogLevel::Info => Self::INFO,
            LogLevel::Debug => Self::DEBUG,
            LogLevel::Trace => Self::TRACE,
        }
    }
}

#[derive(Serialize)]
struct CliError<'a> {
    error: &'a str,
    message: String,
    code: i32,
    details: Value,
}

fn main() {
    process::exit(execute());
}

fn execute() -> i32 {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(error) => return handle_parse_error(error),
    };

    setup_logging(cli.log_level);
    let emit_pipeline = cli.emit_pipeline;
    match cli.command {
        Commands::Run(args) => run_compare(args, emit_pipeline),
        Commands::Hours(args) => run_hours(args, emit_pipeline),
    }
}

fn setup_logging(level: LogLevel) {
    let level: tracing::Level = level.into();
    // Logs share stderr with error payloads; stdout carries only JSON results.
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(false)
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .try_init();
}

fn handle_parse_error(error: clap::Error) -> i32 {
    match error.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
            print!("{error}");
            0
        }
        _ => {
            emit_error(
                "input_usage_error",
                error.to_string(),
                json!({"kind": "cli_parse_error"}),
                3,
            );
            3
        }
    }
}

fn run_compare(args: RunArgs, emit_pipeline: bool) -> i32 {
    let mapping = match (&args.mapping, &args.mapping_dir) {
        (Some(file), _) => run::MappingLocation::File(file.clone()),
        (None, Some(dir)) => run::MappingLocation::Dir(dir.clone()),
        (None, None) => run::MappingLocation::Dir(PathBuf::from(DEFAULT_MAPPING_DIR)),
    };
    let command_args = run::RunCommandArgs {
        pipeline: args.pipeline.clone(),
        source: args.source.clone(),
        target: args.target.clone(),
        source_format: args.source_format.map(Into::into),
        target_format: args.target_format.map(Into::into),
        mapping,
        failure_policy: if args.collect {
            FailurePolicy::CollectAll
        } else {
            FailurePolicy::FailFast
        },
    };
    let pipeline_report = build_run_pipeline_report(&command_args);

    let response = run::run(&command_args);
    let exit_code = emit_response("run", response.exit_code, &response.payload);

    if emit_pipeline {
        emit_pipeline_report(&pipeline_report);
    }
    exit_code
}

fn run_hours(args: HoursArgs, emit_pipeline: bool) -> i32 {
    let response = hours::run(&args.text);
    let exit_code = emit_response("hours", response.exit_code, &response.payload);

    if emit_pipeline {
        emit_pipeline_report(&PipelineReport::new(
            "hours",
            PipelineInput::new(vec![PipelineInputSource::argument("text")]),
            hours::pipeline_steps(),
            hours::deterministic_guards(),
        ));
    }
    exit_code
}

fn emit_response(command: &str, exit_code: i32, payload: &Value) -> i32 {
    let emitted = match exit_code {
        0 | 2 => emit_json_stdout(payload),
        3 | 1 => emit_json_stderr(payload),
        other => {
            emit_error(
                "internal_error",
                format!("unexpected {command} exit code: {other}"),
                json!({"command": command}),
                1,
            );
            return 1;
        }
    };
    if emitted {
        exit_code
    } else {
        emit_error(
            "internal_error",
            format!("failed to serialize {command} response"),
            json!({"command": command}),
            1,
        );
        1
    }
}

fn build_run_pipeline_report(args: &run::RunCommandArgs) -> PipelineReport {
    let mapping = match &args.mapping {
        run::MappingLocation::Dir(dir) => PipelineInputSource::path(
            "mapping_dir",
            dir.display().to_string(),
            None,
        ),
        run::MappingLocation::File(path) => PipelineInputSource::path(
            "mapping",
            path.display().to_string(),
            format_label(mapcheck_io::resolve_document_format(None, path, "mapping").ok()),
        ),
    };
    let document = |label: &'static str, path: &PathBuf, explicit: Option<Format>| {
        PipelineInputSource::path(
            label,
            path.display().to_string(),
            format_label(mapcheck_io::resolve_document_format(explicit, path, label).ok()),
        )
    };
    PipelineReport::new(
        "run",
        PipelineInput::new(vec![
            PipelineInputSource::argument("pipeline"),
            mapping,
            document("source", &args.source, args.source_format),
            document("target", &args.target, args.target_format),
        ]),
        run::pipeline_steps(),
        run::deterministic_guards(),
    )
}

fn format_label(format: Option<Format>) -> Option<&'static str> {
    format.map(Format::as_str)
}

fn emit_json_stdout(value: &Value) -> bool {
    match serde_json::to_string(value) {
        Ok(serialized) => {
            println!("{serialized}");
            true
        }
        Err(_) => false,
    }
}

fn emit_json_stderr(value: &Value) -> bool {
    match serde_json::to_string(value) {
        Ok(serialized) => {
            eprintln!("{serialized}");
            true
        }
        Err(_) => false,
    }
}

fn emit_pipeline_report(report: &PipelineReport) {
    match serde_json::to_string(report) {
        Ok(serialized) => eprintln!("{serialized}"),
        Err(error) => emit_error(
            "internal_error",
            format!("failed to serialize pipeline report: {error}"),
            json!({"command": "emit_pipeline"}),
            1,
        ),
    }
}

fn emit_error(error: &'static str, message: String, details: Value, code: i32) {
    let payload = CliError {
        error,
        message,
        code,
        details,
    };
    match serde_json::to_string(&payload) {
        Ok(serialized) => eprintln!("{serialized}"),
        Err(_) => eprintln!(
            "{{\"error\":\"internal_error\",\"message\":\"failed to serialize error\",\"code\":1}}"
        ),
    }
}
