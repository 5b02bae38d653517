//! The tool capability contract.

use super::ConfigSchema;
use async_trait::async_trait;
use serde_json::Value;
use std::fmt::Debug;
use std::future::Future;
use std::marker::PhantomData;

/// A pluggable diagnostic computation.
///
/// Capabilities are pure: `process` may suspend, but must not have side
/// effects that would make a second invocation observable. Failures are
/// reported as [`anyhow::Error`]; the dispatcher surfaces only the top-level
/// message.
#[async_trait]
pub trait ToolCapability: Send + Sync + Debug {
    /// Returns the declared input schema, if the tool has one.
    ///
    /// Tools without a schema receive the raw request body verbatim.
    fn config(&self) -> Option<&ConfigSchema> {
        None
    }

    /// Processes a (normalized) input into a JSON result.
    async fn process(&self, input: Value) -> anyhow::Result<Value>;
}

/// A capability backed by an async closure.
pub struct FnTool<F, Fut>
where
    F: Fn(Value) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<Value>> + Send + 'static,
{
    label: String,
    config: Option<ConfigSchema>,
    func: F,
    _phantom: PhantomData<fn() -> Fut>,
}

impl<F, Fut> FnTool<F, Fut>
where
    F: Fn(Value) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<Value>> + Send + 'static,
{
    /// Creates a new closure-backed tool. `label` is only used for debugging.
    pub fn new(label: impl Into<String>, func: F) -> Self {
        Self {
            label: label.into(),
            config: None,
            func,
            _phantom: PhantomData,
        }
    }

    /// Attaches a config schema.
    #[must_use]
    pub fn with_config(mut self, config: ConfigSchema) -> Self {
        self.config = Some(config);
        self
    }
}

impl<F, Fut> Debug for FnTool<F, Fut>
where
    F: Fn(Value) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<Value>> + Send + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnTool")
            .field("label", &self.label)
            .field("has_config", &self.config.is_some())
            .finish()
    }
}

#[async_trait]
impl<F, Fut> ToolCapability for FnTool<F, Fut>
where
    F: Fn(Value) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<Value>> + Send + 'static,
{
    fn config(&self) -> Option<&ConfigSchema> {
        self.config.as_ref()
    }

    async fn process(&self, input: Value) -> anyhow::Result<Value> {
        (self.func)(input).await
    }
}
