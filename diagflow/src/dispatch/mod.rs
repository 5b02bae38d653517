//! Dispatcher: the single entry point from a slug and raw input to a
//! formatted response.
//!
//! A dispatch resolves the slug, validates the input against the tool's
//! schema, invokes the capability at most once, and formats the outcome.
//! Tools are never invoked when resolution or validation fails.

mod envelope;

pub use envelope::{DispatchResponse, Envelope, ErrorBody, RESPONSE_HEADERS};

use crate::errors::{DispatchError, ToolExecutionError};
use crate::events::{Event, EventSink, NoOpEventSink};
use crate::tools::{validate, ToolCapability, ToolRegistry};
use futures::FutureExt;
use serde_json::{json, Value};
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, warn};

/// Resolves, validates and invokes tools.
///
/// Cheap to clone; clones share the same registry and event sink.
#[derive(Clone)]
pub struct Dispatcher {
    registry: Arc<ToolRegistry>,
    events: Arc<dyn EventSink>,
    timeout: Option<Duration>,
}

impl Dispatcher {
    /// Creates a dispatcher over `registry`.
    #[must_use]
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self {
            registry,
            events: Arc::new(NoOpEventSink),
            timeout: None,
        }
    }

    /// Sets the event sink.
    #[must_use]
    pub fn with_event_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.events = sink;
        self
    }

    /// Bounds every tool invocation by `timeout`.
    ///
    /// An expired invocation is reported as a [`ToolExecutionError`]. The
    /// underlying future is dropped, not cancelled cooperatively.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Returns the registry.
    #[must_use]
    pub fn registry(&self) -> &Arc<ToolRegistry> {
        &self.registry
    }

    /// Returns the configured invocation timeout.
    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Dispatches a request and formats the outcome.
    pub async fn dispatch(&self, slug: &str, raw_input: Value) -> DispatchResponse {
        DispatchResponse::format(self.invoke(slug, raw_input).await)
    }

    /// Answers a pre-flight request. Independent of any tool.
    #[must_use]
    pub fn preflight(&self) -> DispatchResponse {
        DispatchResponse::preflight()
    }

    /// Resolves, validates and invokes a tool, returning the raw outcome.
    ///
    /// The flow engine uses this directly; HTTP callers go through
    /// [`Dispatcher::dispatch`].
    pub async fn invoke(&self, slug: &str, raw_input: Value) -> Result<Value, DispatchError> {
        let capability = self.registry.lookup(slug).map_err(|err| {
            debug!(tool = %slug, "Unknown tool");
            self.publish("tool.not_found", json!({ "tool": slug }));
            err
        })?;

        let input = validate(slug, capability.config(), raw_input).map_err(|err| {
            debug!(tool = %slug, violations = err.violations.len(), "Input rejected");
            self.publish(
                "tool.rejected",
                json!({ "tool": slug, "violations": err.violations.len() }),
            );
            err
        })?;

        self.publish("tool.invoked", json!({ "tool": slug }));
        let start = Instant::now();

        match self.run_capability(slug, capability, input).await {
            Ok(output) => {
                let duration_ms = start.elapsed().as_secs_f64() * 1000.0;
                debug!(tool = %slug, duration_ms, "Tool succeeded");
                self.publish(
                    "tool.succeeded",
                    json!({ "tool": slug, "duration_ms": duration_ms }),
                );
                Ok(output)
            }
            Err(err) => {
                self.publish(
                    "tool.failed",
                    json!({ "tool": slug, "reason": err.reason }),
                );
                Err(err.into())
            }
        }
    }

    async fn run_capability(
        &self,
        slug: &str,
        capability: &Arc<dyn ToolCapability>,
        input: Value,
    ) -> Result<Value, ToolExecutionError> {
        let call = AssertUnwindSafe(capability.process(input)).catch_unwind();

        let outcome = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, call).await {
                Ok(outcome) => outcome,
                Err(_) => {
                    warn!(tool = %slug, timeout = ?limit, "Tool timed out");
                    return Err(ToolExecutionError::new(
                        slug,
                        format!("timed out after {}ms", limit.as_millis()),
                    ));
                }
            },
            None => call.await,
        };

        match outcome {
            Ok(Ok(output)) => Ok(output),
            Ok(Err(err)) => {
                // Full chain goes to the log; only the top-level message is surfaced.
                warn!(tool = %slug, error = %format!("{err:#}"), "Tool failed");
                Err(ToolExecutionError::new(slug, err.to_string()))
            }
            Err(payload) => {
                error!(tool = %slug, panic = %panic_message(payload.as_ref()), "Tool panicked");
                Err(ToolExecutionError::new(slug, "tool panicked while processing input"))
            }
        }
    }

    fn publish(&self, event_type: &str, data: Value) {
        self.events.publish(Event::new(event_type, data));
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("registry", &self.registry)
            .field("timeout", &self.timeout)
            .finish()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{Constraint, ErrorKind};
    use crate::events::CollectingEventSink;
    use crate::testing::{
        assert_dispatch_error, assert_dispatch_success, FailingTool, MockTool, PanickingTool, SlowTool,
    };
    use crate::tools::{ConfigOption, ConfigSchema};
    use pretty_assertions::assert_eq;

    fn ping_schema() -> ConfigSchema {
        ConfigSchema::new()
            .option(ConfigOption::slider("count", "Ping count", 1.0, 20.0, 8.0))
            .option(ConfigOption::select("level", "Level", ["A", "B"], "A"))
    }

    fn dispatcher_with(tools: Vec<(&str, Arc<dyn ToolCapability>)>) -> Dispatcher {
        let mut builder = ToolRegistry::builder();
        for (slug, tool) in tools {
            builder.register(slug, tool).unwrap();
        }
        Dispatcher::new(Arc::new(builder.build()))
    }

    #[tokio::test]
    async fn test_success_passes_output_through() {
        let output = json!({"verdict": "healthy", "score": 97});
        let dispatcher = dispatcher_with(vec![("health", Arc::new(MockTool::returning(output.clone())))]);

        let response = dispatcher.dispatch("health", json!({"anything": true})).await;

        assert_dispatch_success(&response);
        assert_eq!(response.status, 200);
        assert_eq!(response.body.unwrap().result(), Some(&output));
    }

    #[tokio::test]
    async fn test_unknown_slug_is_404_regardless_of_body() {
        let dispatcher = dispatcher_with(vec![]);

        for body in [json!(null), json!({}), json!({"count": 25}), json!("text")] {
            let response = dispatcher.dispatch("missing", body).await;
            assert_eq!(response.status, 404);
            assert_dispatch_error(&response, ErrorKind::NotFoundError);
        }
    }

    #[tokio::test]
    async fn test_validation_failure_never_invokes_tool() {
        let tool = Arc::new(MockTool::returning(json!({})).with_config(ping_schema()));
        let dispatcher = dispatcher_with(vec![("ping", tool.clone())]);

        let response = dispatcher.dispatch("ping", json!({"count": 25})).await;

        assert_eq!(response.status, 400);
        assert_dispatch_error(&response, ErrorKind::ValidationError);
        let error = response.body.unwrap().error().cloned().unwrap();
        assert!(error.message.contains("'count'"));
        assert!(error.message.contains("20"));
        assert_eq!(error.details.unwrap()["violations"][0]["max"], json!(20.0));
        assert_eq!(tool.call_count(), 0);
    }

    #[tokio::test]
    async fn test_select_violation_lists_allowed_values() {
        let dispatcher = dispatcher_with(vec![(
            "ping",
            Arc::new(MockTool::default().with_config(ping_schema())),
        )]);

        let err = dispatcher.invoke("ping", json!({"level": "C"})).await.unwrap_err();
        let DispatchError::Validation(err) = err else {
            panic!("expected validation error, got {err:?}");
        };
        assert_eq!(
            err.violation("level").unwrap().constraint,
            Constraint::NotAllowed {
                allowed: vec!["A".to_string(), "B".to_string()]
            }
        );
    }

    #[tokio::test]
    async fn test_tool_receives_normalized_input() {
        let tool = Arc::new(MockTool::default().with_config(ping_schema()));
        let dispatcher = dispatcher_with(vec![("ping", tool.clone())]);

        let response = dispatcher.dispatch("ping", json!({"host": "example.org"})).await;

        assert_eq!(response.status, 200);
        assert_eq!(
            tool.recorded_inputs(),
            vec![json!({"host": "example.org", "count": 8, "level": "A"})]
        );
    }

    #[tokio::test]
    async fn test_tool_error_maps_to_500() {
        let dispatcher = dispatcher_with(vec![("broken", Arc::new(FailingTool::new("table missing")))]);

        let response = dispatcher.dispatch("broken", json!({})).await;

        assert_eq!(response.status, 500);
        assert_dispatch_error(&response, ErrorKind::ToolExecutionError);
        let error = response.body.unwrap().error().cloned().unwrap();
        assert_eq!(error.message, "Tool 'broken' failed: table missing");
        assert!(error.details.is_none());
    }

    #[tokio::test]
    async fn test_tool_error_hides_cause_chain() {
        let tool = FailingTool::new("lookup failed").with_cause("connection string postgres://secret");
        let dispatcher = dispatcher_with(vec![("leaky", Arc::new(tool))]);

        let response = dispatcher.dispatch("leaky", json!({})).await;
        let message = response.body.unwrap().error().unwrap().message.clone();
        assert!(message.contains("lookup failed"));
        assert!(!message.contains("secret"));
    }

    #[tokio::test]
    async fn test_panicking_tool_is_contained() {
        let dispatcher = dispatcher_with(vec![("panics", Arc::new(PanickingTool::new("index out of bounds")))]);

        let response = dispatcher.dispatch("panics", json!({})).await;

        assert_eq!(response.status, 500);
        assert_dispatch_error(&response, ErrorKind::ToolExecutionError);
        let message = response.body.unwrap().error().unwrap().message.clone();
        assert!(!message.contains("index out of bounds"));
    }

    #[tokio::test]
    async fn test_timeout_maps_to_tool_execution_error() {
        let dispatcher = dispatcher_with(vec![("slow", Arc::new(SlowTool::new(Duration::from_millis(500))))])
            .with_timeout(Duration::from_millis(10));

        let err = dispatcher.invoke("slow", json!({})).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ToolExecutionError);
        assert!(err.to_string().contains("timed out after 10ms"));
    }

    #[tokio::test]
    async fn test_events_published_per_path() {
        let sink = Arc::new(CollectingEventSink::new());
        let dispatcher = dispatcher_with(vec![
            ("ok", Arc::new(MockTool::default()) as Arc<dyn ToolCapability>),
            ("bad", Arc::new(FailingTool::new("nope"))),
        ])
        .with_event_sink(sink.clone());

        let _ = dispatcher.invoke("ok", json!({})).await;
        let _ = dispatcher.invoke("bad", json!({})).await;
        let _ = dispatcher.invoke("ghost", json!({})).await;

        assert_eq!(
            sink.event_types(),
            vec![
                "tool.invoked",
                "tool.succeeded",
                "tool.invoked",
                "tool.failed",
                "tool.not_found"
            ]
        );
    }

    #[tokio::test]
    async fn test_concurrent_dispatches_do_not_block_each_other() {
        let dispatcher = dispatcher_with(vec![
            ("slow", Arc::new(SlowTool::new(Duration::from_millis(200))) as Arc<dyn ToolCapability>),
            ("fast", Arc::new(MockTool::default())),
        ]);

        let slow = {
            let dispatcher = dispatcher.clone();
            tokio::spawn(async move { dispatcher.dispatch("slow", json!({})).await })
        };
        let fast = dispatcher.dispatch("fast", json!({})).await;

        assert_eq!(fast.status, 200);
        assert!(!slow.is_finished());
        assert_eq!(slow.await.unwrap().status, 200);
    }

    #[test]
    fn test_preflight_is_independent_of_tools() {
        let dispatcher = dispatcher_with(vec![]);
        let response = dispatcher.preflight();
        assert_eq!(response.status, 204);
        assert!(response.body.is_none());
    }
}
