//! Test assertions for dispatch responses and flow results.

use crate::core::{FlowStatus, StepState};
use crate::dispatch::DispatchResponse;
use crate::errors::ErrorKind;
use crate::flow::FlowExecutionResult;

/// Asserts that the response carries a result envelope.
pub fn assert_dispatch_success(response: &DispatchResponse) {
    assert!(
        response.is_success(),
        "Expected success, got status {} with body {:?}",
        response.status,
        response.body
    );
}

/// Asserts that the response carries an error envelope of `kind`.
pub fn assert_dispatch_error(response: &DispatchResponse, kind: ErrorKind) {
    let actual = response.body.as_ref().and_then(|body| body.error()).map(|e| e.kind);
    assert_eq!(
        actual,
        Some(kind),
        "Expected {kind} error, got status {} with body {:?}",
        response.status,
        response.body
    );
}

/// Asserts the terminal status of a flow.
pub fn assert_flow_status(result: &FlowExecutionResult, expected: FlowStatus) {
    assert_eq!(
        result.status, expected,
        "Expected flow status {expected}, got {} (steps: {:?})",
        result.status,
        result.states()
    );
}

/// Asserts the per-step states of a flow, in order.
pub fn assert_step_states(result: &FlowExecutionResult, expected: &[StepState]) {
    assert_eq!(
        result.states(),
        expected,
        "Step states differ for flow '{}'",
        result.problem_slug
    );
}
