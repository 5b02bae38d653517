//! Guided flow execution.
//!
//! A flow runs its steps strictly in order, one at a time, through the same
//! [`Dispatcher`] the HTTP surface uses. A required step that fails aborts the
//! flow and every later step is skipped; an optional step that fails is
//! recorded and the flow moves on. When the input provider stops early the
//! flow is abandoned and the unreached steps stay pending.

use super::{
    FlowExecutionResult, ProblemCatalog, ProblemDefinition, StepInput, StepInputProvider,
    StepResult,
};
use crate::core::FlowStatus;
use crate::dispatch::Dispatcher;
use crate::errors::NotFoundError;
use crate::events::{Event, EventSink, NoOpEventSink};
use chrono::Utc;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Executes guided flows.
#[derive(Clone)]
pub struct FlowEngine {
    dispatcher: Dispatcher,
    events: Arc<dyn EventSink>,
}

impl FlowEngine {
    /// Creates an engine running steps through `dispatcher`.
    #[must_use]
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self {
            dispatcher,
            events: Arc::new(NoOpEventSink),
        }
    }

    /// Sets the sink for flow lifecycle events.
    #[must_use]
    pub fn with_event_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.events = sink;
        self
    }

    /// Returns the dispatcher.
    #[must_use]
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Looks up `slug` in `catalog` and runs it.
    ///
    /// # Errors
    ///
    /// Returns a [`NotFoundError`] if the problem is not in the catalog.
    /// Step failures are reported inside the result, not as errors.
    pub async fn run_problem(
        &self,
        catalog: &ProblemCatalog,
        slug: &str,
        provider: &dyn StepInputProvider,
    ) -> Result<FlowExecutionResult, NotFoundError> {
        let problem = catalog.get(slug)?;
        Ok(self.run_flow(problem, provider).await)
    }

    /// Runs every step of `problem` in order.
    pub async fn run_flow(
        &self,
        problem: &ProblemDefinition,
        provider: &dyn StepInputProvider,
    ) -> FlowExecutionResult {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        let start = Instant::now();

        let mut steps: Vec<StepResult> = problem
            .flow
            .iter()
            .map(|step| StepResult::pending(&step.tool_slug))
            .collect();
        let mut status = FlowStatus::Completed;

        info!(%run_id, problem = %problem.slug, steps = steps.len(), "Flow started");
        self.publish(
            "flow.started",
            json!({ "run_id": run_id, "problem": problem.slug, "steps": steps.len() }),
        );

        for (index, step) in problem.flow.iter().enumerate() {
            let input = match provider.input_for(index, step, &steps[..index]).await {
                StepInput::Provide(input) => input,
                StepInput::Stop => {
                    info!(%run_id, index, "Flow abandoned by caller");
                    status = FlowStatus::Abandoned;
                    break;
                }
            };

            steps[index].start();
            debug!(%run_id, index, tool = %step.tool_slug, "Step started");
            self.publish_step("flow.step.started", run_id, index, &step.tool_slug, json!({}));

            let step_start = Instant::now();
            let outcome = self.dispatcher.invoke(&step.tool_slug, input).await;
            let duration_ms = step_start.elapsed().as_secs_f64() * 1000.0;

            match outcome {
                Ok(output) => {
                    steps[index].succeed(output, duration_ms);
                    self.publish_step(
                        "flow.step.succeeded",
                        run_id,
                        index,
                        &step.tool_slug,
                        json!({ "duration_ms": duration_ms }),
                    );
                }
                Err(err) => {
                    warn!(
                        %run_id,
                        index,
                        tool = %step.tool_slug,
                        optional = step.is_optional,
                        error = %err,
                        "Step failed"
                    );
                    steps[index].fail(&err, duration_ms);
                    self.publish_step(
                        "flow.step.failed",
                        run_id,
                        index,
                        &step.tool_slug,
                        json!({
                            "optional": step.is_optional,
                            "kind": err.kind().to_string(),
                            "duration_ms": duration_ms,
                        }),
                    );

                    if !step.is_optional {
                        status = FlowStatus::Aborted;
                        for (later, result) in steps.iter_mut().enumerate().skip(index + 1) {
                            result.skip();
                            self.publish_step(
                                "flow.step.skipped",
                                run_id,
                                later,
                                &result.tool_slug,
                                json!({}),
                            );
                        }
                        break;
                    }
                }
            }
        }

        let duration_ms = start.elapsed().as_secs_f64() * 1000.0;
        info!(%run_id, problem = %problem.slug, %status, duration_ms, "Flow finished");
        self.publish(
            status.event_type(),
            json!({ "run_id": run_id, "problem": problem.slug, "duration_ms": duration_ms }),
        );

        FlowExecutionResult {
            run_id,
            problem_slug: problem.slug.clone(),
            steps,
            status,
            started_at,
            duration_ms,
        }
    }

    fn publish_step(&self, event_type: &str, run_id: Uuid, index: usize, tool: &str, extra: Value) {
        let mut data = json!({ "run_id": run_id, "index": index, "tool": tool });
        if let (Value::Object(data), Value::Object(extra)) = (&mut data, extra) {
            data.extend(extra);
        }
        self.publish(event_type, data);
    }

    fn publish(&self, event_type: &str, data: Value) {
        self.events.publish(Event::new(event_type, data));
    }
}

impl std::fmt::Debug for FlowEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlowEngine")
            .field("dispatcher", &self.dispatcher)
            .finish_non_exhaustive()
    }
}
