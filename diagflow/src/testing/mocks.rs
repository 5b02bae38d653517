//! Mock tool capabilities for testing.

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use std::time::Duration;

use crate::tools::{ConfigSchema, ToolCapability};

/// A mock tool that records its inputs.
///
/// Returns the configured output, or echoes its input when none is set.
#[derive(Debug, Default)]
pub struct MockTool {
    config: Option<ConfigSchema>,
    output: Mutex<Option<Value>>,
    inputs: Mutex<Vec<Value>>,
}

impl MockTool {
    /// Creates a mock that always returns `output`.
    #[must_use]
    pub fn returning(output: Value) -> Self {
        Self {
            output: Mutex::new(Some(output)),
            ..Self::default()
        }
    }

    /// Attaches a config schema.
    #[must_use]
    pub fn with_config(mut self, config: ConfigSchema) -> Self {
        self.config = Some(config);
        self
    }

    /// Sets the output to return.
    pub fn set_output(&self, output: Value) {
        *self.output.lock() = Some(output);
    }

    /// Returns the number of times the tool was invoked.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.inputs.lock().len()
    }

    /// Returns the (normalized) inputs from each call.
    #[must_use]
    pub fn recorded_inputs(&self) -> Vec<Value> {
        self.inputs.lock().clone()
    }

    /// Resets call tracking.
    pub fn reset(&self) {
        self.inputs.lock().clear();
    }
}

#[async_trait]
impl ToolCapability for MockTool {
    fn config(&self) -> Option<&ConfigSchema> {
        self.config.as_ref()
    }

    async fn process(&self, input: Value) -> anyhow::Result<Value> {
        self.inputs.lock().push(input.clone());
        Ok(self.output.lock().clone().unwrap_or(input))
    }
}

/// A tool that always fails.
#[derive(Debug)]
pub struct FailingTool {
    message: String,
    cause: Option<String>,
}

impl FailingTool {
    /// Creates a tool failing with `message`.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            cause: None,
        }
    }

    /// Wraps the failure around an underlying cause.
    #[must_use]
    pub fn with_cause(mut self, cause: impl Into<String>) -> Self {
        self.cause = Some(cause.into());
        self
    }
}

#[async_trait]
impl ToolCapability for FailingTool {
    async fn process(&self, _input: Value) -> anyhow::Result<Value> {
        match &self.cause {
            Some(cause) => Err(anyhow::anyhow!(cause.clone()).context(self.message.clone())),
            None => Err(anyhow::anyhow!(self.message.clone())),
        }
    }
}

/// A tool that panics when invoked.
#[derive(Debug)]
pub struct PanickingTool {
    message: String,
}

impl PanickingTool {
    /// Creates a tool panicking with `message`.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[async_trait]
impl ToolCapability for PanickingTool {
    async fn process(&self, _input: Value) -> anyhow::Result<Value> {
        panic!("{}", self.message);
    }
}

/// A tool that takes time to respond.
#[derive(Debug)]
pub struct SlowTool {
    delay: Duration,
}

impl SlowTool {
    /// Creates a tool that sleeps for `delay` and then returns `{}`.
    #[must_use]
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    /// Creates a slow tool with delay in milliseconds.
    #[must_use]
    pub fn with_delay_ms(ms: u64) -> Self {
        Self::new(Duration::from_millis(ms))
    }
}

#[async_trait]
impl ToolCapability for SlowTool {
    async fn process(&self, _input: Value) -> anyhow::Result<Value> {
        tokio::time::sleep(self.delay).await;
        Ok(serde_json::json!({}))
    }
}
