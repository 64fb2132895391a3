//! Directive loop: resolves a pipeline mapping and evaluates its comparison rules.

mod channel;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::domain::address::Address;
use crate::domain::error::{ConfigurationError, Failure, RuleEngineError};
use crate::domain::mapping::{ComparisonDirective, CompareMethod, MappingSource, RuleName};
use crate::domain::report::{RunStatus, RunSummary};
use crate::engine::{compare, extract};

pub use channel::{CollectingChannel, ResultChannel};

use channel::Reporter;

/// What happens when a value comparison fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Stop at the first value mismatch.
    #[default]
    FailFast,
    /// Record value mismatches and continue with the next rule.
    CollectAll,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineOptions {
    pub failure_policy: FailurePolicy,
}

/// Evaluates pipeline mappings loaded from `M`.
///
/// The engine holds no per-run state; one instance can serve concurrent runs.
#[derive(Debug, Clone)]
pub struct RuleEngine<M> {
    mappings: M,
    options: EngineOptions,
}

impl<M: MappingSource> RuleEngine<M> {
    pub fn new(mappings: M) -> Self {
        Self::with_options(mappings, EngineOptions::default())
    }

    pub fn with_options(mappings: M, options: EngineOptions) -> Self {
        Self { mappings, options }
    }

    /// Runs every directive of `pipeline` against the two documents.
    ///
    /// Fatal conditions (configuration, extraction, length and, under
    /// [`FailurePolicy::FailFast`], value mismatches) are returned as `Err` and
    /// nothing is sent to `channel`. Unknown rules are sent to `channel` as a
    /// failure and evaluation continues. `channel` receives at most one
    /// message: the first reported failure, or completion once every rule ran
    /// without one.
    pub fn execute_rules(
        &self,
        pipeline: &str,
        source: &Value,
        target: &Value,
        channel: &mut dyn ResultChannel,
    ) -> Result<RunSummary, RuleEngineError> {
        let mut reporter = Reporter::new(channel);
        let summary = self.run(pipeline, source, target, &mut reporter)?;
        Ok(summary)
    }

    /// Same run as [`execute_rules`](Self::execute_rules) behind a single `Result`.
    pub fn evaluate(&self, pipeline: &str, source: &Value, target: &Value) -> Result<RunSummary, Failure> {
        let mut channel = CollectingChannel::default();
        let mut reporter = Reporter::new(&mut channel);
        let summary = self
            .run(pipeline, source, target, &mut reporter)
            .map_err(Failure::Aborted)?;
        let reported = reporter.into_reported();
        if reported.is_empty() {
            Ok(summary)
        } else {
            Err(Failure::Reported(reported))
        }
    }

    fn run(
        &self,
        pipeline: &str,
        source: &Value,
        target: &Value,
        reporter: &mut Reporter<'_>,
    ) -> Result<RunSummary, RuleEngineError> {
        let mapping = self.mappings.load(pipeline)?;
        let directives = mapping
            .directives(pipeline)
            .ok_or_else(|| ConfigurationError::MissingPipeline {
                pipeline: pipeline.to_string(),
            })?;

        let mut summary = RunSummary::started(pipeline, directives.len());
        for (index, directive) in directives.iter().enumerate() {
            debug!(pipeline, directive = index, method = directive.method.as_str(), "evaluating directive");
            match directive.method {
                CompareMethod::PathBasedCompare => {
                    self.run_path_based(pipeline, index, directive, source, target, &mut summary, reporter)?
                }
                CompareMethod::SameFile => {
                    self.run_same_file(directive, source, target, &mut summary, reporter)?
                }
                CompareMethod::Unsupported => {
                    warn!(pipeline, directive = index, "skipping directive with unsupported method");
                    summary.skipped_directives += 1;
                }
            }
        }

        summary.reported_failures = reporter.reported_count();
        if summary.reported_failures == 0 {
            summary.status = RunStatus::Completed;
            info!(
                pipeline,
                rules = summary.rules_evaluated,
                values = summary.values_compared,
                "comparison completed"
            );
            reporter.complete(&summary);
        } else {
            summary.status = RunStatus::Failed;
        }
        Ok(summary)
    }

    #[allow(clippy::too_many_arguments)]
    fn run_path_based(
        &self,
        pipeline: &str,
        index: usize,
        directive: &ComparisonDirective,
        source: &Value,
        target: &Value,
        summary: &mut RunSummary,
        reporter: &mut Reporter<'_>,
    ) -> Result<(), RuleEngineError> {
        let source_path = required_address(&directive.source_path, pipeline, index, "source_path")?;
        let target_path = required_address(&directive.target_path, pipeline, index, "target_path")?;

        for rule in directive.rules.as_slice() {
            debug!(pipeline, directive = index, rule = %rule.rule_name, "executing rule");
            summary.rules_evaluated += 1;

            let source_values =
                extract::get_path_value(source_path, Some(&directive.transformation_rules), source)?;
            let target_values = extract::get_path_value(target_path, None, target)?;
            if source_values.len() != target_values.len() {
                return Err(RuleEngineError::LengthMismatch {
                    source_path: source_path.to_string(),
                    source_len: source_values.len(),
                    target_len: target_values.len(),
                });
            }

            let strip_spaces = match &rule.rule_name {
                RuleName::EqualValue => false,
                RuleName::EqualValueAfterStripSpaces => true,
                RuleName::Unrecognized(name) => {
                    reporter.fail(RuleEngineError::UnknownRule { rule: name.clone() });
                    continue;
                }
            };
            let outcome = compare::compare_sequences(&source_values, &target_values, strip_spaces);
            self.settle(outcome, summary, reporter)?;
        }
        Ok(())
    }

    fn run_same_file(
        &self,
        directive: &ComparisonDirective,
        source: &Value,
        target: &Value,
        summary: &mut RunSummary,
        reporter: &mut Reporter<'_>,
    ) -> Result<(), RuleEngineError> {
        for rule in directive.rules.as_slice() {
            summary.rules_evaluated += 1;
            match &rule.rule_name {
                RuleName::EqualValue => {
                    let outcome = compare::compare_documents(source, target, true);
                    self.settle(outcome, summary, reporter)?;
                }
                other => reporter.fail(RuleEngineError::UnknownRule {
                    rule: other.as_str().to_string(),
                }),
            }
        }
        Ok(())
    }

    fn settle(
        &self,
        outcome: Result<usize, RuleEngineError>,
        summary: &mut RunSummary,
        reporter: &mut Reporter<'_>,
    ) -> Result<(), RuleEngineError> {
        match outcome {
            Ok(compared) => {
                summary.values_compared += compared;
                Ok(())
            }
            Err(error @ RuleEngineError::ValueMismatch { .. })
                if self.options.failure_policy == FailurePolicy::CollectAll =>
            {
                reporter.fail(error);
                Ok(())
            }
            Err(error) => Err(error),
        }
    }
}

fn required_address<'a>(
    address: &'a Option<Address>,
    pipeline: &str,
    index: usize,
    field: &'static str,
) -> Result<&'a Address, ConfigurationError> {
    address
        .as_ref()
        .ok_or_else(|| ConfigurationError::IncompleteDirective {
            pipeline: pipeline.to_string(),
            index,
            field,
        })
}
