//! Discovery and guided-flow endpoints under `/api`.

use super::dispatch::parse_body;
use super::AppState;
use crate::dispatch::DispatchResponse;
use crate::errors::{Constraint, FieldViolation, ValidationError};
use crate::flow::{FlowExecutionResult, ProblemDefinition, SequenceInputs};
use crate::tools::ConfigSchema;
use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Serialize)]
pub(super) struct ToolSummary {
    slug: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    config: Option<ConfigSchema>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct ProblemSummary {
    slug: String,
    title: String,
    description: String,
    category: String,
    icon: String,
    step_count: usize,
}

impl From<&ProblemDefinition> for ProblemSummary {
    fn from(problem: &ProblemDefinition) -> Self {
        Self {
            slug: problem.slug.clone(),
            title: problem.title.clone(),
            description: problem.description.clone(),
            category: problem.category.clone(),
            icon: problem.icon.clone(),
            step_count: problem.flow.len(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct ProblemQuery {
    category: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RunRequest {
    #[serde(default)]
    inputs: Vec<Value>,
}

pub(super) async fn health() -> &'static str {
    "ok"
}

pub(super) async fn list_tools(State(state): State<AppState>) -> Json<Vec<ToolSummary>> {
    let tools = state
        .dispatcher
        .registry()
        .iter()
        .map(|(slug, tool)| ToolSummary {
            slug: slug.to_string(),
            config: tool.config().cloned(),
        })
        .collect();
    Json(tools)
}

pub(super) async fn list_problems(
    State(state): State<AppState>,
    Query(query): Query<ProblemQuery>,
) -> Json<Vec<ProblemSummary>> {
    let problems = match query.category.as_deref() {
        Some(category) => state
            .catalog
            .by_category(category)
            .into_iter()
            .map(|p| ProblemSummary::from(&**p))
            .collect(),
        None => state
            .catalog
            .list()
            .map(|p| ProblemSummary::from(&**p))
            .collect(),
    };
    Json(problems)
}

pub(super) async fn get_problem(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<ProblemDefinition>, DispatchResponse> {
    state
        .catalog
        .get(&slug)
        .map(|problem| Json(ProblemDefinition::clone(problem)))
        .map_err(|err| DispatchResponse::format(Err(err.into())))
}

pub(super) async fn run_problem(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    body: Bytes,
) -> Result<Json<FlowExecutionResult>, DispatchResponse> {
    let problem = state
        .catalog
        .get(&slug)
        .map_err(|err| DispatchResponse::format(Err(err.into())))?;

    let request: RunRequest = match parse_body(&slug, &body) {
        Ok(Value::Null) => RunRequest::default(),
        Ok(raw) => serde_json::from_value(raw).map_err(|err| {
            let violation = FieldViolation::new(
                "inputs",
                format!("expected {{\"inputs\": [...]}}: {err}"),
                Constraint::MalformedJson,
            );
            DispatchResponse::format(Err(ValidationError::new(slug.as_str(), vec![violation]).into()))
        })?,
        Err(err) => return Err(DispatchResponse::format(Err(err))),
    };

    let provider = SequenceInputs::new(request.inputs);
    Ok(Json(state.engine.run_flow(problem, &provider).await))
}
