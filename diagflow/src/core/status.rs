//! Step and flow status enums.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The execution state of a single guided step.
///
/// Steps move `Pending -> Running -> {Succeeded, Failed, Skipped}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StepState {
    /// Step has not started.
    #[default]
    Pending,
    /// Step's tool is being invoked.
    Running,
    /// Step's tool returned a result.
    Succeeded,
    /// Step's dispatch produced an error.
    Failed,
    /// Step was never executed because an earlier required step failed.
    Skipped,
}

impl fmt::Display for StepState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "PENDING"),
            Self::Running => write!(f, "RUNNING"),
            Self::Succeeded => write!(f, "SUCCEEDED"),
            Self::Failed => write!(f, "FAILED"),
            Self::Skipped => write!(f, "SKIPPED"),
        }
    }
}

impl StepState {
    /// Returns true if the state is terminal.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed | Self::Skipped)
    }

    /// Returns true if a transition from `self` to `next` is legal.
    #[must_use]
    pub fn can_transition_to(&self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Running | Self::Skipped)
                | (Self::Running, Self::Succeeded | Self::Failed)
        )
    }
}

/// The terminal classification of a flow execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FlowStatus {
    /// Every step succeeded or was an optional failure.
    Completed,
    /// A required step failed; later steps were skipped.
    Aborted,
    /// The caller stopped supplying inputs before the end.
    Abandoned,
}

impl fmt::Display for FlowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Completed => write!(f, "COMPLETED"),
            Self::Aborted => write!(f, "ABORTED"),
            Self::Abandoned => write!(f, "ABANDONED"),
        }
    }
}

impl FlowStatus {
    /// Returns the event name emitted when a flow ends with this status.
    #[must_use]
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::Completed => "flow.completed",
            Self::Aborted => "flow.aborted",
            Self::Abandoned => "flow.abandoned",
        }
    }
}
