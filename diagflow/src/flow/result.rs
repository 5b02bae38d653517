//! Per-execution step and flow results.

use crate::core::{FlowStatus, StepState};
use crate::dispatch::ErrorBody;
use crate::errors::DispatchError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Outcome of one guided step within one flow execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepResult {
    /// The step's tool.
    pub tool_slug: String,
    /// Current state.
    pub state: StepState,
    /// Tool output, for succeeded steps.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<Value>,
    /// Formatted error, for failed steps.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
    /// Time spent in dispatch, for executed steps.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<f64>,
}

impl StepResult {
    /// Creates a pending result for `tool_slug`.
    #[must_use]
    pub fn pending(tool_slug: impl Into<String>) -> Self {
        Self {
            tool_slug: tool_slug.into(),
            state: StepState::Pending,
            output: None,
            error: None,
            duration_ms: None,
        }
    }

    pub(crate) fn start(&mut self) {
        debug_assert!(self.state.can_transition_to(StepState::Running));
        self.state = StepState::Running;
    }

    pub(crate) fn succeed(&mut self, output: Value, duration_ms: f64) {
        debug_assert!(self.state.can_transition_to(StepState::Succeeded));
        self.state = StepState::Succeeded;
        self.output = Some(output);
        self.duration_ms = Some(duration_ms);
    }

    pub(crate) fn fail(&mut self, error: &DispatchError, duration_ms: f64) {
        debug_assert!(self.state.can_transition_to(StepState::Failed));
        self.state = StepState::Failed;
        self.error = Some(ErrorBody::from(error));
        self.duration_ms = Some(duration_ms);
    }

    pub(crate) fn skip(&mut self) {
        debug_assert!(self.state.can_transition_to(StepState::Skipped));
        self.state = StepState::Skipped;
    }
}

/// Result of one flow execution. Not persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowExecutionResult {
    /// Unique id of this execution, for log correlation.
    pub run_id: Uuid,
    /// The executed problem.
    pub problem_slug: String,
    /// One result per declared step, in flow order.
    pub steps: Vec<StepResult>,
    /// Terminal classification.
    pub status: FlowStatus,
    /// When the execution started.
    pub started_at: DateTime<Utc>,
    /// Wall-clock duration of the whole execution.
    pub duration_ms: f64,
}

impl FlowExecutionResult {
    /// Returns the result of step `index`.
    #[must_use]
    pub fn step(&self, index: usize) -> Option<&StepResult> {
        self.steps.get(index)
    }

    /// Returns the states of all steps, in flow order.
    #[must_use]
    pub fn states(&self) -> Vec<StepState> {
        self.steps.iter().map(|s| s.state).collect()
    }

    /// Counts steps in `state`.
    #[must_use]
    pub fn count(&self, state: StepState) -> usize {
        self.steps.iter().filter(|s| s.state == state).count()
    }

    /// Returns true if the flow completed.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.status == FlowStatus::Completed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::NotFoundError;
    use serde_json::json;

    #[test]
    fn test_step_lifecycle_success() {
        let mut step = StepResult::pending("ping");
        assert_eq!(step.state, StepState::Pending);

        step.start();
        assert_eq!(step.state, StepState::Running);

        step.succeed(json!({"rtt": 12}), 3.5);
        assert_eq!(step.state, StepState::Succeeded);
        assert_eq!(step.output, Some(json!({"rtt": 12})));
        assert!(step.error.is_none());
    }

    #[test]
    fn test_step_lifecycle_failure_records_error_body() {
        let mut step = StepResult::pending("ghost");
        step.start();
        step.fail(&NotFoundError::tool("ghost").into(), 0.1);

        assert_eq!(step.state, StepState::Failed);
        let error = step.error.unwrap();
        assert_eq!(error.message, "Tool not found: ghost");
        assert!(step.output.is_none());
    }

    #[test]
    fn test_step_result_serializes_camel_case() {
        let mut step = StepResult::pending("dns-check");
        step.skip();

        let json = serde_json::to_value(&step).unwrap();
        assert_eq!(json, json!({"toolSlug": "dns-check", "state": "SKIPPED"}));
    }
}
