use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use serde_json::json;
use tracing::info;

use leafscan::pipeline::result::now_iso8601;
use leafscan::{InferenceService, NetworkClassifier, NetworkSpec, RawImageInput, ServiceConfig};

#[derive(Parser)]
#[command(name = "leafscan")]
#[command(about = "Classify plant diseases from leaf photos")]
struct Cli {
    /// JSON service config; built-in defaults when omitted
    #[arg(long, global = true, env = "LEAFSCAN_CONFIG", value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the pipeline on local image files and print the JSON report
    Predict {
        #[arg(value_name = "IMAGE", required = true)]
        images: Vec<PathBuf>,
    },

    /// Print health and model information
    Info,

    /// Write a randomly initialized model matching the config
    InitModel {
        /// Output path; defaults to the configured model_path
        #[arg(long, value_name = "PATH")]
        out: Option<PathBuf>,

        /// Hidden layer width, repeatable
        #[arg(long = "hidden", value_name = "N", default_values_t = [16])]
        hidden: Vec<usize>,
    },
}

fn main() -> anyhow::Result<()> {
    leafscan::telemetry::init();
    let cli = Cli::parse();

    let config = ServiceConfig::load_or_default(cli.config.as_deref())
        .context("failed to load config")?;

    match cli.command {
        Command::Predict { images } => predict(&config, images),
        Command::Info => print_info(&config),
        Command::InitModel { out, hidden } => init_model(&config, out, &hidden),
    }
}

fn build_service(config: &ServiceConfig) -> anyhow::Result<InferenceService> {
    let classifier = Arc::new(NetworkClassifier::load_at_startup(&config.model_path));
    Ok(InferenceService::new(classifier, config)?)
}

fn predict(config: &ServiceConfig, images: Vec<PathBuf>) -> anyhow::Result<()> {
    let service = build_service(config)?;

    let mut inputs = Vec::with_capacity(images.len());
    for path in &images {
        let input = RawImageInput::from_path(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        inputs.push(input);
    }

    let report = if inputs.len() == 1 {
        let input = inputs.remove(0);
        let result = service.predict(input)?;
        serde_json::to_value(result.report(&now_iso8601(), service.model_version()))?
    } else {
        let batch = service.predict_batch(inputs)?;
        serde_json::to_value(batch.report(&now_iso8601(), service.model_version()))?
    };

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn print_info(config: &ServiceConfig) -> anyhow::Result<()> {
    let service = build_service(config)?;
    let report = json!({
        "health": service.health(&now_iso8601()),
        "model": service.model_info(),
        "model_version": service.model_version(),
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn init_model(config: &ServiceConfig, out: Option<PathBuf>, hidden: &[usize]) -> anyhow::Result<()> {
    if hidden.contains(&0) {
        bail!("hidden layer widths must be non-zero");
    }
    let out = out.unwrap_or_else(|| config.model_path.clone());
    if let Some(dir) = out.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create {}", dir.display()))?;
    }

    let spec = NetworkSpec::image_classifier(
        config.target_size.width,
        config.target_size.height,
        hidden,
        config.catalog()?.iter().map(str::to_owned).collect(),
    );
    let network = spec.build();
    network.save_json(&out)
        .with_context(|| format!("failed to write {}", out.display()))?;

    info!(
        path = %out.display(),
        inputs = network.input_size(),
        outputs = network.output_size(),
        params = network.param_count(),
        "wrote untrained model"
    );
    Ok(())
}
