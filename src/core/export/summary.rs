//! Dispatch summary and reporting

use super::exporter::ExportReceipt;
use crate::domain::ids::VariableName;
use crate::domain::{GridloadError, LoadStamp};
use std::time::Duration;

/// Overall result of one dispatch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchStatus {
    /// Every variable was exported
    Success,
    /// Some variables were exported, some failed
    Partial,
    /// No variable was exported
    Failed,
}

/// Outcome of one variable's export task
#[derive(Debug)]
pub struct VariableOutcome {
    pub variable: VariableName,
    pub result: Result<ExportReceipt, GridloadError>,
}

impl VariableOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Summary of one notification's dispatch
#[derive(Debug)]
pub struct DispatchSummary {
    /// Bucket of the source object
    pub source_bucket: String,

    /// Key of the source object
    pub source_key: String,

    /// Load stamp shared by every job
    pub stamp: LoadStamp,

    /// Whether uploads and registration were skipped
    pub dry_run: bool,

    /// One entry per configured variable, in configuration order
    pub outcomes: Vec<VariableOutcome>,

    /// Wall time of the whole dispatch
    pub duration: Duration,
}

impl DispatchSummary {
    pub fn new(source_bucket: String, source_key: String, stamp: LoadStamp, dry_run: bool) -> Self {
        Self {
            source_bucket,
            source_key,
            stamp,
            dry_run,
            outcomes: Vec::new(),
            duration: Duration::ZERO,
        }
    }

    /// Set the duration
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    pub fn add_outcome(&mut self, variable: VariableName, result: Result<ExportReceipt, GridloadError>) {
        self.outcomes.push(VariableOutcome { variable, result });
    }

    /// Number of variables exported
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    /// Number of variables that failed
    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }

    /// Receipts of the exported variables
    pub fn receipts(&self) -> impl Iterator<Item = &ExportReceipt> {
        self.outcomes.iter().filter_map(|o| o.result.as_ref().ok())
    }

    /// Failed variables with their errors
    pub fn failures(&self) -> impl Iterator<Item = (&VariableName, &GridloadError)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().err().map(|e| (&o.variable, e)))
    }

    /// Outcome of one variable
    pub fn outcome(&self, variable: &str) -> Option<&VariableOutcome> {
        self.outcomes.iter().find(|o| o.variable.as_str() == variable)
    }

    pub fn status(&self) -> DispatchStatus {
        match (self.succeeded(), self.failed()) {
            (_, 0) => DispatchStatus::Success,
            (0, _) => DispatchStatus::Failed,
            _ => DispatchStatus::Partial,
        }
    }

    /// Check if every variable was exported
    pub fn is_successful(&self) -> bool {
        self.status() == DispatchStatus::Success
    }

    /// Check if some, but not all, variables were exported
    pub fn is_partial(&self) -> bool {
        self.status() == DispatchStatus::Partial
    }

    /// Log the summary
    pub fn log_summary(&self) {
        tracing::info!(
            bucket = %self.source_bucket,
            key = %self.source_key,
            load_dt = %self.stamp.load_dt(),
            ts = %self.stamp.ts(),
            variables = self.outcomes.len(),
            succeeded = self.succeeded(),
            failed = self.failed(),
            dry_run = self.dry_run,
            duration_ms = self.duration.as_millis() as u64,
            "Dispatch completed"
        );

        for (variable, error) in self.failures() {
            crate::log_variable_failure!(variable, error);
        }
    }
}
