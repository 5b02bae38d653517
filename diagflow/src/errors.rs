//! Error types for the diagflow framework.
//!
//! The taxonomy has one startup-time kind ([`ConfigurationError`]) and three
//! request-time kinds ([`ValidationError`], [`NotFoundError`],
//! [`ToolExecutionError`]). Request-time errors are unified under
//! [`DispatchError`] and never escape the dispatcher unformatted.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// The main error type for diagflow operations.
#[derive(Debug, Error)]
pub enum DiagflowError {
    /// Startup configuration was invalid.
    #[error("{0}")]
    Configuration(#[from] ConfigurationError),

    /// A request-time dispatch error.
    #[error("{0}")]
    Dispatch(#[from] DispatchError),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration file could not be parsed.
    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Wire name of an error kind, as it appears in the `error.kind` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Startup-time registration or configuration problem.
    ConfigurationError,
    /// Input rejected by the config-schema validator.
    ValidationError,
    /// Unknown tool or problem slug.
    NotFoundError,
    /// Failure inside a tool capability.
    ToolExecutionError,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigurationError => write!(f, "ConfigurationError"),
            Self::ValidationError => write!(f, "ValidationError"),
            Self::NotFoundError => write!(f, "NotFoundError"),
            Self::ToolExecutionError => write!(f, "ToolExecutionError"),
        }
    }
}

/// Error raised while assembling the registry, catalog, or server config.
///
/// Always fatal: the process must not start serving with a bad registry.
#[derive(Debug, Clone, Error)]
pub enum ConfigurationError {
    /// A tool slug was registered twice.
    #[error("Tool '{slug}' is already registered")]
    DuplicateTool {
        /// The conflicting slug.
        slug: String,
    },

    /// A problem slug appears twice in the catalog.
    #[error("Problem '{slug}' is defined more than once")]
    DuplicateProblem {
        /// The conflicting slug.
        slug: String,
    },

    /// A slug is not usable as a path segment.
    #[error("Invalid slug '{slug}': {reason}")]
    InvalidSlug {
        /// The rejected slug.
        slug: String,
        /// Why it was rejected.
        reason: String,
    },

    /// A tool's declared config schema breaks one of its invariants.
    #[error("Invalid config schema for tool '{slug}', option '{option}': {reason}")]
    InvalidSchema {
        /// The tool being registered.
        slug: String,
        /// The offending option id.
        option: String,
        /// Which invariant failed.
        reason: String,
    },

    /// A guided step references a tool that is not registered.
    #[error("Problem '{problem}' step {index} references unregistered tool '{tool}'")]
    MissingTool {
        /// The problem slug.
        problem: String,
        /// Zero-based step index.
        index: usize,
        /// The unresolved tool slug.
        tool: String,
    },

    /// Any other invalid setting.
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

impl ConfigurationError {
    /// Creates an invalid schema error.
    #[must_use]
    pub fn invalid_schema(
        slug: impl Into<String>,
        option: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidSchema {
            slug: slug.into(),
            option: option.into(),
            reason: reason.into(),
        }
    }

    /// Creates an invalid slug error.
    #[must_use]
    pub fn invalid_slug(slug: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidSlug {
            slug: slug.into(),
            reason: reason.into(),
        }
    }
}

/// The constraint a field-level violation broke.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum Constraint {
    /// A number was required.
    NotNumeric,
    /// The value is below the option's lower bound.
    BelowMin {
        /// The lower bound.
        min: f64,
    },
    /// The value is above the option's upper bound.
    AboveMax {
        /// The upper bound.
        max: f64,
    },
    /// The value is not one of the allowed choices.
    NotAllowed {
        /// The allowed choices, in declaration order.
        allowed: Vec<String>,
    },
    /// The input as a whole was not a JSON object.
    NotAnObject,
    /// The request body could not be parsed as JSON.
    MalformedJson,
    /// The request body could not be read, e.g. because it exceeds the size
    /// limit.
    UnreadableBody,
}

/// A single field that failed validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldViolation {
    /// The option id (or `$input` for the whole body).
    pub field: String,
    /// Human-readable explanation.
    pub message: String,
    /// The violated constraint.
    #[serde(flatten)]
    pub constraint: Constraint,
}

impl FieldViolation {
    /// Creates a new field violation.
    #[must_use]
    pub fn new(field: impl Into<String>, message: impl Into<String>, constraint: Constraint) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            constraint,
        }
    }
}

/// Error raised when input fails config-schema validation.
///
/// Carries every violation found, not just the first.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("Invalid input for tool '{tool}': {}", summarize(.violations))]
pub struct ValidationError {
    /// The tool the input was meant for.
    pub tool: String,
    /// All field-level violations.
    pub violations: Vec<FieldViolation>,
}

fn summarize(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(|v| v.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

impl ValidationError {
    /// Creates a new validation error.
    #[must_use]
    pub fn new(tool: impl Into<String>, violations: Vec<FieldViolation>) -> Self {
        Self {
            tool: tool.into(),
            violations,
        }
    }

    /// Returns the violation for a given field, if any.
    #[must_use]
    pub fn violation(&self, field: &str) -> Option<&FieldViolation> {
        self.violations.iter().find(|v| v.field == field)
    }
}

/// What kind of slug could not be resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    /// A tool capability.
    Tool,
    /// A problem definition.
    Problem,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tool => write!(f, "Tool"),
            Self::Problem => write!(f, "Problem"),
        }
    }
}

/// Error raised when a slug does not resolve.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{resource} not found: {slug}")]
pub struct NotFoundError {
    /// What was looked up.
    pub resource: ResourceKind,
    /// The unresolved slug.
    pub slug: String,
}

impl NotFoundError {
    /// Creates a tool not found error.
    #[must_use]
    pub fn tool(slug: impl Into<String>) -> Self {
        Self {
            resource: ResourceKind::Tool,
            slug: slug.into(),
        }
    }

    /// Creates a problem not found error.
    #[must_use]
    pub fn problem(slug: impl Into<String>) -> Self {
        Self {
            resource: ResourceKind::Problem,
            slug: slug.into(),
        }
    }
}

/// Error raised when a tool capability fails while processing.
///
/// Only the tool's top-level message is kept; cause chains and panic
/// payloads are logged, not surfaced.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Tool '{tool}' failed: {reason}")]
pub struct ToolExecutionError {
    /// The failing tool.
    pub tool: String,
    /// The surfaced reason.
    pub reason: String,
}

impl ToolExecutionError {
    /// Creates a new tool execution error.
    #[must_use]
    pub fn new(tool: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            tool: tool.into(),
            reason: reason.into(),
        }
    }
}

/// Every error a single dispatch can produce.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DispatchError {
    /// Input rejected before invocation.
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// Slug did not resolve.
    #[error("{0}")]
    NotFound(#[from] NotFoundError),

    /// The capability failed.
    #[error("{0}")]
    ToolExecution(#[from] ToolExecutionError),
}

impl DispatchError {
    /// Returns the wire kind of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::ValidationError,
            Self::NotFound(_) => ErrorKind::NotFoundError,
            Self::ToolExecution(_) => ErrorKind::ToolExecutionError,
        }
    }

    /// Returns the HTTP status code this error maps to.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Validation(_) => 400,
            Self::NotFound(_) => 404,
            Self::ToolExecution(_) => 500,
        }
    }

    /// Returns structured details for the envelope, if the kind has any.
    #[must_use]
    pub fn details(&self) -> Option<serde_json::Value> {
        match self {
            Self::Validation(err) => Some(serde_json::json!({
                "violations": err.violations,
            })),
            Self::NotFound(err) => Some(serde_json::json!({
                "resource": err.resource,
                "slug": err.slug,
            })),
            Self::ToolExecution(_) => None,
        }
    }
}
