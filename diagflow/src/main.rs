//! `diagflow` server binary.

use anyhow::Context;
use clap::Parser;
use diagflow::config::{AppConfig, LogFormat};
use diagflow::dispatch::Dispatcher;
use diagflow::events::LoggingEventSink;
use diagflow::flow::{FlowEngine, ProblemCatalog};
use diagflow::observability::init_tracing;
use diagflow::server::{self, AppState};
use diagflow::tools::builtin::{EchoTool, ECHO_SLUG};
use diagflow::tools::ToolRegistry;
use std::net::IpAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "diagflow", version, about = "Serve a catalog of diagnostic tools over HTTP")]
struct Args {
    /// TOML configuration file.
    #[arg(long, env = "DIAGFLOW_CONFIG")]
    config: Option<PathBuf>,

    /// Address to bind.
    #[arg(long, env = "DIAGFLOW_BIND")]
    bind: Option<IpAddr>,

    /// Port to listen on.
    #[arg(long, short, env = "DIAGFLOW_PORT")]
    port: Option<u16>,

    /// JSON file of problem definitions.
    #[arg(long, env = "DIAGFLOW_PROBLEMS")]
    problems: Option<PathBuf>,

    /// Per-invocation tool timeout in milliseconds.
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Log format: pretty or json.
    #[arg(long)]
    log_format: Option<LogFormat>,
}

impl Args {
    fn into_config(self) -> anyhow::Result<AppConfig> {
        let mut config = match &self.config {
            Some(path) => AppConfig::from_toml_file(path)
                .with_context(|| format!("loading config from {}", path.display()))?,
            None => AppConfig::default(),
        };

        if let Some(bind) = self.bind {
            config.bind = bind;
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(problems) = self.problems {
            config.problems_path = Some(problems);
        }
        if let Some(timeout_ms) = self.timeout_ms {
            config.dispatch_timeout_ms = Some(timeout_ms);
        }
        if let Some(log_format) = self.log_format {
            config.log_format = log_format;
        }

        config.validate()?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Args::parse().into_config()?;
    init_tracing(config.log_format);

    let registry = Arc::new(
        ToolRegistry::builder()
            .with_tool(ECHO_SLUG, Arc::new(EchoTool))?
            .build(),
    );
    info!(tools = registry.len(), "Tool registry ready");

    let catalog = match &config.problems_path {
        Some(path) => ProblemCatalog::from_json_file(path, &registry)
            .with_context(|| format!("loading problems from {}", path.display()))?,
        None => ProblemCatalog::empty(),
    };

    let events = Arc::new(LoggingEventSink::info());
    let mut dispatcher = Dispatcher::new(registry).with_event_sink(events.clone());
    if let Some(timeout) = config.dispatch_timeout() {
        dispatcher = dispatcher.with_timeout(timeout);
    }
    let engine = FlowEngine::new(dispatcher.clone()).with_event_sink(events);

    let state = AppState::new(dispatcher, engine, Arc::new(catalog));
    server::serve(&config, state).await?;
    Ok(())
}
