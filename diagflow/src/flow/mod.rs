//! Guided flows: problem definitions, the catalog, and the flow engine.

mod catalog;
mod definition;
mod engine;
mod provider;
mod result;

pub use catalog::ProblemCatalog;
pub use definition::{GuidedStep, ProblemDefinition};
pub use engine::FlowEngine;
#[cfg(test)]
pub use provider::MockStepInputProvider;
pub use provider::{FnInputProvider, SequenceInputs, StepInput, StepInputProvider};
pub use result::{FlowExecutionResult, StepResult};
