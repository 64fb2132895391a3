use tracing::warn;

use crate::domain::error::RuleEngineError;
use crate::domain::report::RunSummary;

/// Receives the terminal outcome of a directive loop.
pub trait ResultChannel {
    fn completed(&mut self, summary: &RunSummary);
    fn failed(&mut self, error: &RuleEngineError);
}

impl<F> ResultChannel for F
where
    F: FnMut(Result<&RunSummary, &RuleEngineError>),
{
    fn completed(&mut self, summary: &RunSummary) {
        self(Ok(summary));
    }

    fn failed(&mut self, error: &RuleEngineError) {
        self(Err(error));
    }
}

/// Channel that records what it receives.
#[derive(Debug, Default)]
pub struct CollectingChannel {
    pub completions: Vec<RunSummary>,
    pub failures: Vec<String>,
}

impl ResultChannel for CollectingChannel {
    fn completed(&mut self, summary: &RunSummary) {
        self.completions.push(summary.clone());
    }

    fn failed(&mut self, error: &RuleEngineError) {
        self.failures.push(error.to_string());
    }
}

/// Single-shot wrapper over a channel: forwards only the first terminal message
/// and keeps every reported failure for the run result.
pub(super) struct Reporter<'c> {
    channel: &'c mut dyn ResultChannel,
    settled: bool,
    reported: Vec<RuleEngineError>,
}

impl<'c> Reporter<'c> {
    pub(super) fn new(channel: &'c mut dyn ResultChannel) -> Self {
        Self {
            channel,
            settled: false,
            reported: Vec::new(),
        }
    }

    pub(super) fn fail(&mut self, error: RuleEngineError) {
        warn!(kind = error.kind(), %error, "rule failure reported");
        if !self.settled {
            self.channel.failed(&error);
            self.settled = true;
        }
        self.reported.push(error);
    }

    pub(super) fn complete(&mut self, summary: &RunSummary) {
        if !self.settled {
            self.channel.completed(summary);
            self.settled = true;
        }
    }

    pub(super) fn reported_count(&self) -> usize {
        self.reported.len()
    }

    pub(super) fn into_reported(self) -> Vec<RuleEngineError> {
        self.reported
    }
}
