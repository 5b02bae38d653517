//! Tools subsystem: capability contract, schemas and registry.
//!
//! This module provides:
//! - The [`ToolCapability`] trait every diagnostic tool implements
//! - Declarative config schemas and the input validator
//! - The immutable tool registry and its startup builder

pub mod builtin;
mod capability;
mod registry;
mod schema;
mod validator;

pub use capability::{FnTool, ToolCapability};
pub use registry::{validate_slug, ToolRegistry, ToolRegistryBuilder, RESERVED_TOOL_SLUGS};
pub use schema::{ConfigOption, ConfigSchema, OptionType};
pub use validator::{validate, INPUT_FIELD};
