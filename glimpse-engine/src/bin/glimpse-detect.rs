//! Run the feature detector on a single image from the command line.
//!
//! Usage:
//!   cargo run -p glimpse-engine --bin glimpse-detect -- --image photo.jpg

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use clap::Parser;
use glimpse_core::{fingerprint, ServiceState};
use glimpse_engine::{DetectorConfig, EngineAdapter, FeatureDetector};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "glimpse-detect", about = "Manually run an image through the feature detector")]
struct Args {
    /// Path of the input image
    #[arg(long)]
    image: PathBuf,

    /// Analysis timeout in seconds
    #[arg(long, default_value_t = 60, env = "GLIMPSE_ANALYSIS_TIMEOUT_SECS")]
    timeout_secs: u64,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let data = match tokio::fs::read(&args.image).await {
        Ok(data) => data,
        Err(e) => {
            eprintln!("Failed to read {}: {}", args.image.display(), e);
            return ExitCode::FAILURE;
        }
    };

    let adapter = EngineAdapter::new(
        Arc::new(FeatureDetector::new(DetectorConfig::from_env())),
        Arc::new(ServiceState::new()),
        Duration::from_secs(args.timeout_secs),
    );

    eprintln!("Warming up");
    if let Err(e) = adapter.warmup().await {
        eprintln!("{}", e);
        return ExitCode::FAILURE;
    }

    eprintln!("Running image");
    let fp = fingerprint(&data);
    match adapter.analyze(Bytes::from(data)).await {
        Ok(result) => {
            let output = serde_json::json!({
                "fingerprint": fp,
                "result": result,
            });
            match serde_json::to_string_pretty(&output) {
                Ok(json) => {
                    println!("{}", json);
                    ExitCode::SUCCESS
                }
                Err(e) => {
                    eprintln!("Failed to serialize result: {}", e);
                    ExitCode::FAILURE
                }
            }
        }
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}
