//! HTTP surface.
//!
//! `POST /:slug` and `OPTIONS /:slug` go straight to the [`Dispatcher`]; the
//! headers of those responses come from the dispatcher's formatting step, not
//! from middleware. Discovery and flow endpoints live under `/api` with a
//! permissive CORS layer.

mod api;
mod dispatch;

use crate::config::AppConfig;
use crate::dispatch::Dispatcher;
use crate::errors::DiagflowError;
use crate::flow::{FlowEngine, ProblemCatalog};
use axum::http::{header, Method};
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// Shared state of the HTTP handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    dispatcher: Dispatcher,
    engine: FlowEngine,
    catalog: Arc<ProblemCatalog>,
}

impl AppState {
    /// Creates the state. `engine` should run through `dispatcher`'s registry.
    #[must_use]
    pub fn new(dispatcher: Dispatcher, engine: FlowEngine, catalog: Arc<ProblemCatalog>) -> Self {
        Self {
            dispatcher,
            engine,
            catalog,
        }
    }

    /// Creates the state with an engine sharing `dispatcher`.
    #[must_use]
    pub fn from_dispatcher(dispatcher: Dispatcher, catalog: Arc<ProblemCatalog>) -> Self {
        let engine = FlowEngine::new(dispatcher.clone());
        Self::new(dispatcher, engine, catalog)
    }
}

/// Builds the application router.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    let api = Router::new()
        .route("/health", get(api::health))
        .route("/tools", get(api::list_tools))
        .route("/problems", get(api::list_problems))
        .route("/problems/:slug", get(api::get_problem))
        .route("/problems/:slug/run", post(api::run_problem))
        .layer(cors);

    Router::new()
        .nest("/api", api)
        .route(
            "/:slug",
            post(dispatch::dispatch_tool)
                .options(dispatch::preflight)
                .fallback(dispatch::method_not_allowed),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Binds the configured address and serves until Ctrl-C.
///
/// # Errors
///
/// Returns [`DiagflowError::Io`] if the address cannot be bound or the
/// server fails.
pub async fn serve(config: &AppConfig, state: AppState) -> Result<(), DiagflowError> {
    let listener = TcpListener::bind(config.socket_addr()).await?;
    info!(addr = %listener.local_addr()?, "Listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "Could not listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    info!("Shutdown requested");
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::flow::{GuidedStep, ProblemDefinition};
    use crate::testing::{FailingTool, MockTool};
    use crate::tools::builtin::{EchoTool, ECHO_SLUG};
    use crate::tools::{ConfigOption, ConfigSchema, ToolRegistry};
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, Response};
    use serde_json::Value;
    use tower::ServiceExt;

    pub(crate) fn app() -> Router {
        let registry = ToolRegistry::builder()
            .with_tool(ECHO_SLUG, Arc::new(EchoTool))
            .unwrap()
            .with_tool(
                "ping",
                Arc::new(MockTool::returning(serde_json::json!({"rtt": 12})).with_config(
                    ConfigSchema::new().option(ConfigOption::slider("count", "Ping count", 1.0, 20.0, 8.0)),
                )),
            )
            .unwrap()
            .with_tool("broken", Arc::new(FailingTool::new("sensor offline")))
            .unwrap()
            .build();

        let catalog = ProblemCatalog::new(
            vec![
                ProblemDefinition::new("slow-wifi", "Slow Wi-Fi")
                    .with_category("network")
                    .step(GuidedStep::required("echo", "Check connectivity"))
                    .step(GuidedStep::optional("broken", "Read the sensor"))
                    .step(GuidedStep::required("ping", "Ping the router")),
                ProblemDefinition::new("no-sound", "No sound")
                    .with_category("audio")
                    .step(GuidedStep::required("broken", "Read the sensor"))
                    .step(GuidedStep::required("echo", "Echo")),
            ],
            &registry,
        )
        .unwrap();

        let dispatcher = Dispatcher::new(Arc::new(registry));
        router(AppState::from_dispatcher(dispatcher, Arc::new(catalog)))
    }

    pub(crate) async fn send(method: &str, uri: &str, body: &str) -> Response<Body> {
        app()
            .oneshot(
                Request::builder()
                    .method(method)
                    .uri(uri)
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap()
    }

    pub(crate) async fn json_body(response: Response<Body>) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }
}
