//! Forgeflow CLI entry point.
//!
//! This binary is the composition root for the workspace. Responsibilities:
//!
//! 1. **Parse arguments** with `clap`. `--token` and `--api-url` fall back to
//!    `GITHUB_TOKEN` and `GITHUB_API_URL`.
//! 2. **Wire observability**: `tracing-subscriber` writes text or JSON lines
//!    to stderr, and an OpenTelemetry OTLP exporter is added when
//!    `OTEL_EXPORTER_OTLP_ENDPOINT` is set.
//! 3. **Construct infrastructure**: a [`github::GithubConnector`] becomes the
//!    session factory handed to the Authorize component.
//! 4. **Run one component**: a two-node [`nodes::Workflow`] (Authorize, then
//!    the selected component) executes against a fresh
//!    [`pipeline::ExecutionContext`]. The component's output ports are printed
//!    to stdout as one JSON object.
//!
//! Any failure is reported on stderr and the process exits non-zero.

mod args;
mod telemetry;

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use github::{GithubConfig, GithubConnector};
use nodes::{Authorize, Workflow};
use pipeline::{ExecutionContext, NodeId, SessionFactory};
use serde_json::{Map, Value};
use tracing::info;

use crate::args::{Cli, Invocation};
use crate::telemetry::Telemetry;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let telemetry = Telemetry::init(cli.log_format)?;

    let result = run(cli).await;
    telemetry.shutdown();

    let output = result?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

async fn run(cli: Cli) -> anyhow::Result<Value> {
    let mut config = GithubConfig::from_env().context("invalid GitHub configuration")?;
    if let Some(url) = cli.api_url.as_deref() {
        config = config.with_api_url(url).context("invalid --api-url")?;
    }
    let factory: Arc<dyn SessionFactory> = Arc::new(GithubConnector::new(config, cli.token));

    match cli.command.invocation() {
        Some(invocation) => run_component(invocation, factory).await,
        None => Ok(serde_json::to_value(nodes::catalogue(&factory))?),
    }
}

/// Runs Authorize followed by the requested component and collects its outputs.
async fn run_component(
    invocation: Invocation,
    factory: Arc<dyn SessionFactory>,
) -> anyhow::Result<Value> {
    let auth_id = node_id("authorize")?;
    let target_id = node_id(invocation.kind)?;

    let mut target = nodes::instantiate(invocation.kind, target_id.clone(), &factory)?;
    for (port, value) in invocation.inputs {
        target.set_input(port, value)?;
    }

    let mut workflow = Workflow::new();
    workflow.push(Box::new(Authorize::new(auth_id, factory)))?;
    workflow.push(target)?;

    let mut ctx = ExecutionContext::new();
    info!(execution = %ctx.id(), kind = invocation.kind, "Running component");
    workflow
        .run(&mut ctx)
        .await
        .with_context(|| format!("{} failed", invocation.kind))?;

    let outputs = workflow
        .node(&target_id)
        .map(|node| node.outputs())
        .unwrap_or_default()
        .into_iter()
        .map(|(name, value)| (name.to_owned(), value.to_json()))
        .collect::<Map<_, _>>();
    Ok(Value::Object(outputs))
}

fn node_id(name: &str) -> anyhow::Result<NodeId> {
    NodeId::new(name).with_context(|| format!("invalid node id '{name}'"))
}
