//! # Diagflow
//!
//! Tool registry, dispatcher and guided flow engine for catalogs of
//! diagnostic tools.
//!
//! Diagflow provides:
//!
//! - **Tool registry**: slugs mapped to pluggable [`tools::ToolCapability`]
//!   implementations, frozen at startup
//! - **Config-schema validation**: declared `number` / `slider` / `select`
//!   options with defaults, rejected (never clamped) when out of range
//! - **Dispatch**: one entry point from slug and raw input to a uniform
//!   `{ result }` / `{ error }` envelope
//! - **Guided flows**: ordered tool sequences with required and optional
//!   steps, executed through the same dispatcher
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use diagflow::prelude::*;
//! use std::sync::Arc;
//!
//! let registry = ToolRegistry::builder()
//!     .with_tool("echo", Arc::new(EchoTool))?
//!     .build();
//! let dispatcher = Dispatcher::new(Arc::new(registry));
//!
//! let response = dispatcher.dispatch("echo", serde_json::json!({"ping": 1})).await;
//! assert_eq!(response.status, 200);
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod config;
pub mod core;
pub mod dispatch;
pub mod errors;
pub mod events;
pub mod flow;
pub mod observability;
pub mod testing;
pub mod tools;

#[cfg(feature = "server")]
pub mod server;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::{AppConfig, LogFormat};
    pub use crate::core::{FlowStatus, StepState};
    pub use crate::dispatch::{DispatchResponse, Dispatcher, Envelope, ErrorBody};
    pub use crate::errors::{
        ConfigurationError, DiagflowError, DispatchError, ErrorKind, NotFoundError,
        ToolExecutionError, ValidationError,
    };
    pub use crate::events::{CollectingEventSink, EventSink, LoggingEventSink, NoOpEventSink};
    pub use crate::flow::{
        FlowEngine, FlowExecutionResult, FnInputProvider, GuidedStep, ProblemCatalog,
        ProblemDefinition, SequenceInputs, StepInput, StepInputProvider, StepResult,
    };
    pub use crate::tools::builtin::EchoTool;
    pub use crate::tools::{
        ConfigOption, ConfigSchema, FnTool, OptionType, ToolCapability, ToolRegistry,
    };
}
