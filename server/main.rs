/// leafscan HTTP server
///
/// Serves plant disease predictions for uploaded leaf photos over a
/// synchronous tiny_http server.
///
/// Run with:
///   cargo run --bin leafscan-server --release -- --config leafscan.json
///
/// Routes:
///   GET  /              banner and endpoint list
///   GET  /health        liveness and model status
///   GET  /model/info    model shape and classes (503 until loaded)
///   POST /predict       one image, multipart or raw body
///   POST /batch_predict several images, multipart

mod state;
mod routes;
mod handlers;
mod util;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, Context};
use clap::Parser;
use tiny_http::Server;
use tracing::{info, warn};

use leafscan::{InferenceService, NetworkClassifier, ServiceConfig};
use state::AppState;

#[derive(Parser)]
#[command(name = "leafscan-server")]
#[command(about = "HTTP service for leaf disease classification")]
struct Args {
    /// JSON service config; built-in defaults when omitted
    #[arg(long, env = "LEAFSCAN_CONFIG", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Listen address, overrides bind_addr
    #[arg(long, value_name = "ADDR")]
    bind: Option<String>,

    /// Model artifact, overrides model_path
    #[arg(long, value_name = "PATH")]
    model: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    leafscan::telemetry::init();
    let args = Args::parse();

    let mut config = ServiceConfig::load_or_default(args.config.as_deref())
        .context("failed to load config")?;
    if let Some(bind) = args.bind {
        config.bind_addr = bind;
    }
    if let Some(model) = args.model {
        config.model_path = model;
    }

    let classifier = Arc::new(NetworkClassifier::load_at_startup(&config.model_path));
    let service = InferenceService::new(classifier, &config)?;
    if !service.is_ready() {
        warn!(path = %config.model_path.display(), "starting without a model");
    }
    let shared_state = Arc::new(AppState::new(service, config.max_upload_bytes));

    let server = Server::http(&config.bind_addr)
        .map_err(|e| anyhow!("failed to bind {}: {}", config.bind_addr, e))?;
    info!(addr = %config.bind_addr, "listening");

    // One thread per request; the service is shared read-only.
    for request in server.incoming_requests() {
        let state_clone = shared_state.clone();
        std::thread::spawn(move || {
            routes::dispatch(request, state_clone);
        });
    }
    Ok(())
}
