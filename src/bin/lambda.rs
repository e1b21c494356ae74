//! AWS Lambda entry point for the SIRI-SX generator
//!
//! Deploy with `cargo lambda build --release`.

use chrono::Utc;
use lambda_runtime::{Error as LambdaError, LambdaEvent, service_fn};
use serde_json::Value;
use siri_sx_generator::{
    config::GeneratorConfig,
    handler,
    storage::{DynamoStore, S3Sink},
};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), LambdaError> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    info!("SIRI-SX generator Lambda starting...");
    lambda_runtime::run(service_fn(lambda_handler)).await
}

/// Handler for scheduled invocations. Errors propagate so the scheduler
/// records the failure and retries.
async fn lambda_handler(event: LambdaEvent<Value>) -> Result<Value, LambdaError> {
    let config = GeneratorConfig::from_env()?;

    let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    let store = DynamoStore::new(
        aws_sdk_dynamodb::Client::new(&aws_config),
        &config.disruptions_table,
        &config.organisations_table,
    );
    let sink = S3Sink::new(aws_sdk_s3::Client::new(&aws_config));

    let message_id = if event.context.request_id.is_empty() {
        uuid::Uuid::new_v4().to_string()
    } else {
        event.context.request_id.clone()
    };

    match handler::run(&config, &store, &sink, Utc::now(), message_id).await {
        Ok(summary) => {
            info!(
                situation_count = summary.situation_count,
                eligible_count = summary.eligible_count,
                dropped_count = summary.dropped_count,
                "generator run complete"
            );
            Ok(serde_json::json!({
                "status": "success",
                "situations_published": summary.situation_count
            }))
        }
        Err(e) => {
            error!("generator run failed: {e}");
            Err(e.into())
        }
    }
}
