//! SIRI-SX generator CLI
//!
//! Local execution entry point. For AWS Lambda, use
//! `siri-sx-generator-lambda`.

use chrono::Utc;
use clap::Parser;
use siri_sx_generator::{
    config::GeneratorConfig,
    error::Result,
    handler,
    storage::{DynamoStore, S3Sink},
};

/// SIRI-SX disruptions feed generator
#[derive(Parser, Debug)]
#[command(
    name = "siri-sx-generator",
    version,
    about = "Generates the SIRI-SX disruptions feed and JSON/CSV extracts"
)]
struct Cli {
    /// Response message identifier (default: a fresh UUID)
    #[arg(long)]
    message_id: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level)),
        )
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    tracing::info!("SIRI-SX generator starting...");

    let config = GeneratorConfig::from_env()?;

    let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    let store = DynamoStore::new(
        aws_sdk_dynamodb::Client::new(&aws_config),
        &config.disruptions_table,
        &config.organisations_table,
    );
    let sink = S3Sink::new(aws_sdk_s3::Client::new(&aws_config));

    let message_id = cli
        .message_id
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

    let summary = handler::run(&config, &store, &sink, Utc::now(), message_id).await?;

    tracing::info!(
        "Published {} situations ({} eligible, {} dropped)",
        summary.situation_count,
        summary.eligible_count,
        summary.dropped_count
    );

    Ok(())
}
