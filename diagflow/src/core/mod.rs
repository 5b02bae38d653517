//! Core state types shared by the dispatcher and the flow engine.

mod status;

pub use status::{FlowStatus, StepState};
