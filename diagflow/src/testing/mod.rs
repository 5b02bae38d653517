//! Testing utilities for diagflow tools and flows.
//!
//! This module provides:
//! - Mock tool capabilities (recording, failing, panicking, slow)
//! - Assertions for dispatch responses and flow results
//! - Registry and problem fixtures

mod assertions;
mod fixtures;
mod mocks;

pub use assertions::{
    assert_dispatch_error, assert_dispatch_success, assert_flow_status, assert_step_states,
};
pub use fixtures::{linear_problem, registry_with};
pub use mocks::{FailingTool, MockTool, PanickingTool, SlowTool};
