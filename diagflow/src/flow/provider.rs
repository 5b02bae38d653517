//! Step input providers.
//!
//! The engine never threads one step's output into the next step's input on
//! its own. Callers do that by implementing [`StepInputProvider`], which sees
//! the results of every step that already ran.

use super::{GuidedStep, StepResult};
use async_trait::async_trait;
use serde_json::Value;

/// What the caller wants to do at the next step.
#[derive(Debug, Clone, PartialEq)]
pub enum StepInput {
    /// Run the step with this raw input.
    Provide(Value),
    /// Stop the flow here; it ends as abandoned.
    Stop,
}

/// Supplies the raw input for each step, or stops the flow.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StepInputProvider: Send + Sync {
    /// Returns the input for step `index`. `completed` holds the results of
    /// steps `0..index`.
    async fn input_for(&self, index: usize, step: &GuidedStep, completed: &[StepResult]) -> StepInput;
}

/// Feeds a fixed list of inputs; stops once the list runs out.
#[derive(Debug, Clone, Default)]
pub struct SequenceInputs {
    inputs: Vec<Value>,
}

impl SequenceInputs {
    /// Creates a provider over `inputs`, one per step.
    #[must_use]
    pub fn new(inputs: Vec<Value>) -> Self {
        Self { inputs }
    }

    /// Creates a provider giving `input` to every one of `steps` steps.
    #[must_use]
    pub fn repeat(input: &Value, steps: usize) -> Self {
        Self {
            inputs: vec![input.clone(); steps],
        }
    }
}

#[async_trait]
impl StepInputProvider for SequenceInputs {
    async fn input_for(&self, index: usize, _step: &GuidedStep, _completed: &[StepResult]) -> StepInput {
        self.inputs
            .get(index)
            .cloned()
            .map_or(StepInput::Stop, StepInput::Provide)
    }
}

/// A provider backed by a closure.
pub struct FnInputProvider<F>
where
    F: Fn(usize, &GuidedStep, &[StepResult]) -> StepInput + Send + Sync,
{
    func: F,
}

impl<F> FnInputProvider<F>
where
    F: Fn(usize, &GuidedStep, &[StepResult]) -> StepInput + Send + Sync,
{
    /// Wraps `func`.
    pub fn new(func: F) -> Self {
        Self { func }
    }
}

impl<F> std::fmt::Debug for FnInputProvider<F>
where
    F: Fn(usize, &GuidedStep, &[StepResult]) -> StepInput + Send + Sync,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnInputProvider").finish_non_exhaustive()
    }
}

#[async_trait]
impl<F> StepInputProvider for FnInputProvider<F>
where
    F: Fn(usize, &GuidedStep, &[StepResult]) -> StepInput + Send + Sync,
{
    async fn input_for(&self, index: usize, step: &GuidedStep, completed: &[StepResult]) -> StepInput {
        (self.func)(index, step, completed)
    }
}
