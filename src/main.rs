//! Profile gateway - team-scoped Bedrock inference profiles over HTTP.

mod adapters;
mod api;
mod cassette;
mod cli;
mod config;
mod context;
mod conversation;
mod error;
mod model;
mod naming;
mod params;
mod ports;
mod registry;
mod service;

use std::path::Path;
use std::process;
use std::sync::Arc;
use std::time::Instant;

use clap::Parser;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use crate::cli::{CallArgs, Cli, Command};
use crate::config::Config;
use crate::context::{RecordingSession, ServiceContext};
use crate::error::GatewayError;
use crate::service::{Envelope, ProfileService};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

/// Install the global subscriber. `-v` forces debug, otherwise `RUST_LOG`
/// applies with `info` as the fallback.
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

async fn run(cli: Cli) -> Result<(), GatewayError> {
    let config_path = config::discover_config_path(cli.config.as_deref());
    let config = Arc::new(Config::load(&config_path)?);
    debug!(path = %config_path.display(), "configuration loaded");

    let (ctx, recording_session) = select_context(&config).await?;
    let service = Arc::new(ProfileService::new(Arc::clone(&config), &ctx));

    let result = match cli.command {
        Command::Serve { host, port } => {
            let host = host.unwrap_or_else(|| config.server.host.clone());
            let port = port.unwrap_or_else(|| config.listen_port());
            api::serve(Arc::clone(&service), &host, port).await
        }
        Command::Call(args) => call(&service, &args).await,
        Command::Health => health(&service).await,
    };

    if let Some(session) = recording_session {
        match session.finish() {
            Ok(path) => info!(path = %path.display(), "cassette saved"),
            Err(e) => warn!(error = %e, "failed to save cassette"),
        }
    }

    result
}

/// Pick adapters from the environment: replay, record, in-memory, or live.
async fn select_context(
    config: &Config,
) -> Result<(ServiceContext, Option<RecordingSession>), GatewayError> {
    let replay_path = std::env::var("PROFILE_GATEWAY_REPLAY").ok();
    let is_recording =
        std::env::var("PROFILE_GATEWAY_REC").is_ok_and(|v| v == "true" || v == "1");
    let is_memory = std::env::var("PROFILE_GATEWAY_BACKEND").is_ok_and(|v| v == "memory");

    if let Some(ref cassette_path) = replay_path {
        info!(cassette = %cassette_path, "replaying from cassette");
        Ok((ServiceContext::replaying(Path::new(cassette_path))?, None))
    } else if is_recording {
        info!("recording mode enabled");
        let (ctx, session) = ServiceContext::recording(config).await;
        Ok((ctx, Some(session)))
    } else if is_memory {
        info!("using in-memory backend");
        Ok((ServiceContext::memory(config), None))
    } else {
        Ok((ServiceContext::live(config).await, None))
    }
}

async fn call(service: &ProfileService, args: &CallArgs) -> Result<(), GatewayError> {
    let started = Instant::now();
    let outcome = service.handle_request(args.to_request()).await;
    let (envelope, result) = match outcome {
        Ok(data) => (Envelope::success(data, started.elapsed()), Ok(())),
        Err(e) => (Envelope::error(e.public_message()), Err(e)),
    };
    print_json(&envelope)?;
    result
}

async fn health(service: &ProfileService) -> Result<(), GatewayError> {
    let started = Instant::now();
    let data = service.provider_health().await?;
    print_json(&Envelope::success(data, started.elapsed()))
}

fn print_json(envelope: &Envelope) -> Result<(), GatewayError> {
    let json = serde_json::to_string_pretty(envelope)
        .map_err(|e| GatewayError::MalformedReply(format!("failed to encode response: {e}")))?;
    println!("{json}");
    Ok(())
}
