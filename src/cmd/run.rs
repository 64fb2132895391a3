use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::{Value, json};

use crate::domain::error::{Failure, RuleEngineError};
use crate::domain::mapping::MappingSource;
use crate::domain::report::RunSummary;
use crate::engine::rules::{EngineOptions, FailurePolicy, RuleEngine};
use crate::io::mapping::{MappingDir, MappingFile};
use crate::io::{self, Format, IoError, reader};

/// Where the rules mapping comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MappingLocation {
    /// Fixed pipeline table inside a directory.
    Dir(PathBuf),
    /// One explicit mapping file.
    File(PathBuf),
}

/// Input arguments for the run command execution API.
#[derive(Debug, Clone)]
pub struct RunCommandArgs {
    pub pipeline: String,
    pub source: PathBuf,
    pub target: PathBuf,
    pub source_format: Option<Format>,
    pub target_format: Option<Format>,
    pub mapping: MappingLocation,
    pub failure_policy: FailurePolicy,
}

/// Structured command response that carries exit-code mapping and JSON payload.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RunCommandResponse {
    pub exit_code: i32,
    pub payload: Value,
}

pub fn run(args: &RunCommandArgs) -> RunCommandResponse {
    match execute(args) {
        Ok(summary) => summary_response(&summary),
        Err(CommandError::InputUsage(message)) => RunCommandResponse {
            exit_code: 3,
            payload: json!({
                "error": "input_usage_error",
                "message": message,
            }),
        },
        Err(CommandError::Failure(failure)) => failure_response(&args.pipeline, &failure),
    }
}

pub fn pipeline_steps() -> Vec<String> {
    vec![
        "load_source".to_string(),
        "load_target".to_string(),
        "resolve_mapping".to_string(),
        "extract_values".to_string(),
        "apply_transformations".to_string(),
        "compare_values".to_string(),
    ]
}

pub fn deterministic_guards() -> Vec<String> {
    vec![
        "mapping_read_per_run".to_string(),
        "directives_in_mapping_order".to_string(),
        "transforms_in_mapping_key_order".to_string(),
        "first_failure_reported".to_string(),
    ]
}

fn execute(args: &RunCommandArgs) -> Result<RunSummary, CommandError> {
    let source = load_document(&args.source, args.source_format, "source")?;
    let target = load_document(&args.target, args.target_format, "target")?;
    let options = EngineOptions {
        failure_policy: args.failure_policy,
    };
    let outcome = match &args.mapping {
        MappingLocation::Dir(dir) => evaluate(MappingDir::new(dir), options, args, &source, &target),
        MappingLocation::File(path) => {
            evaluate(MappingFile::new(path), options, args, &source, &target)
        }
    };
    outcome.map_err(CommandError::Failure)
}

fn evaluate<M: MappingSource>(
    mappings: M,
    options: EngineOptions,
    args: &RunCommandArgs,
    source: &Value,
    target: &Value,
) -> Result<RunSummary, Failure> {
    RuleEngine::with_options(mappings, options).evaluate(&args.pipeline, source, target)
}

fn load_document(
    path: &Path,
    explicit: Option<Format>,
    kind: &'static str,
) -> Result<Value, CommandError> {
    let format = io::resolve_document_format(explicit, path, kind).map_err(map_io_as_input_usage)?;
    reader::read_document_path(path, format, kind).map_err(map_io_as_input_usage)
}

fn summary_response(summary: &RunSummary) -> RunCommandResponse {
    match serde_json::to_value(summary) {
        Ok(payload) => RunCommandResponse {
            exit_code: 0,
            payload,
        },
        Err(_) => internal_error("failed to serialize run summary"),
    }
}

fn failure_response(pipeline: &str, failure: &Failure) -> RunCommandResponse {
    if let Failure::Aborted(error) = failure {
        if matches!(
            error,
            RuleEngineError::Configuration(_) | RuleEngineError::Extraction(_)
        ) {
            return RunCommandResponse {
                exit_code: 3,
                payload: json!({
                    "error": "input_usage_error",
                    "kind": error.kind(),
                    "message": error.to_string(),
                }),
            };
        }
    }

    let failures: Vec<Value> = failure
        .errors()
        .iter()
        .map(|error| {
            json!({
                "kind": error.kind(),
                "message": error.to_string(),
            })
        })
        .collect();
    RunCommandResponse {
        exit_code: 2,
        payload: json!({
            "pipeline": pipeline,
            "status": "failed",
            "aborted": matches!(failure, Failure::Aborted(_)),
            "failure_count": failures.len(),
            "failures": failures,
        }),
    }
}

fn internal_error(message: &str) -> RunCommandResponse {
    RunCommandResponse {
        exit_code: 1,
        payload: json!({
            "error": "internal_error",
            "message": message,
        }),
    }
}

fn map_io_as_input_usage(error: IoError) -> CommandError {
    CommandError::InputUsage(error.to_string())
}

enum CommandError {
    InputUsage(String),
    Failure(Failure),
}
