use std::fmt;

use serde_json::Value;
use thiserror::Error;

use crate::domain::value_path::PathSegment;
use crate::engine::extract::ExtractionError;
use crate::engine::hours::HoursError;
use crate::io::IoError;

/// Mapping resolution failures. Always fatal.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    /// Pipeline key has no entry in the mapping file table.
    #[error("unknown pipeline `{pipeline}`: no rules mapping file is registered for it")]
    UnknownPipeline { pipeline: String },

    /// Mapping file could not be opened or parsed in its format.
    #[error("failed to read rules mapping `{path}`: {source}")]
    ReadMapping {
        path: String,
        #[source]
        source: IoError,
    },

    /// Mapping file parsed but does not match the mapping schema.
    #[error("invalid rules mapping `{path}`: {source}")]
    InvalidMapping {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    /// Mapping was loaded but defines no directives for the pipeline.
    #[error("rules mapping does not define pipeline `{pipeline}`")]
    MissingPipeline { pipeline: String },

    /// A `pathbasedcompare` directive lacks one of its address strings.
    #[error("directive #{index} of pipeline `{pipeline}` is missing `{field}`")]
    IncompleteDirective {
        pipeline: String,
        index: usize,
        field: &'static str,
    },
}

/// A transform or stripped comparison received input it cannot handle.
#[derive(Debug, Error)]
pub enum TransformInputError {
    #[error("{operation} expects a string value, got {actual}")]
    NonString {
        operation: &'static str,
        actual: &'static str,
    },

    #[error("storeHoursTransformation failed: {0}")]
    Hours(#[from] HoursError),
}

/// Every failure the rule engine can produce.
#[derive(Debug, Error)]
pub enum RuleEngineError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(
        "mismatch in items size for {source_path}: source has {source_len} items, target has {target_len}"
    )]
    LengthMismatch {
        source_path: String,
        source_len: usize,
        target_len: usize,
    },

    #[error("no matching rule `{rule}` found to execute")]
    UnknownRule { rule: String },

    #[error(
        "mismatch in values of source and target at `{}`: source {source_value}, target {target_value}",
        .key.to_canonical()
    )]
    ValueMismatch {
        key: PathSegment,
        source_value: Value,
        target_value: Value,
    },

    #[error(transparent)]
    TransformInput(#[from] TransformInputError),

    #[error(transparent)]
    Extraction(#[from] ExtractionError),
}

impl RuleEngineError {
    /// Stable snake_case label used in CLI payloads.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "configuration_error",
            Self::LengthMismatch { .. } => "length_mismatch",
            Self::UnknownRule { .. } => "unknown_rule",
            Self::ValueMismatch { .. } => "value_mismatch",
            Self::TransformInput(_) => "transform_input_error",
            Self::Extraction(_) => "extraction_error",
        }
    }
}

impl From<HoursError> for RuleEngineError {
    fn from(error: HoursError) -> Self {
        Self::TransformInput(TransformInputError::Hours(error))
    }
}

/// Terminal failure of a run.
///
/// `Aborted` is the fail-fast path: processing stopped at the error. `Reported`
/// carries the failures that were recorded while evaluation continued; it is
/// never empty.
#[derive(Debug)]
pub enum Failure {
    Aborted(RuleEngineError),
    Reported(Vec<RuleEngineError>),
}

impl Failure {
    pub fn errors(&self) -> &[RuleEngineError] {
        match self {
            Self::Aborted(error) => std::slice::from_ref(error),
            Self::Reported(errors) => errors,
        }
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Aborted(error) => write!(f, "{error}"),
            Self::Reported(errors) => match errors.first() {
                Some(first) if errors.len() == 1 => write!(f, "{first}"),
                Some(first) => write!(f, "{} failures reported; first: {first}", errors.len()),
                None => f.write_str("failures reported"),
            },
        }
    }
}

impl std::error::Error for Failure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Aborted(error) => Some(error),
            Self::Reported(errors) => errors
                .first()
                .map(|error| error as &(dyn std::error::Error + 'static)),
        }
    }
}

impl From<RuleEngineError> for Failure {
    fn from(error: RuleEngineError) -> Self {
        Self::Aborted(error)
    }
}
