//! AWS Lambda entry point for study-scout
//!
//! Deploy with `cargo lambda build --release --features lambda`.
//! Trigger from an EventBridge cron rule; the payload is ignored.
//!
//! Environment variables:
//! - `CONNPASS_API_KEY` — connpass API key (required for authenticated search)
//! - `CONNPASS_API_BASE` — API base URL override
//! - `SEARCH_KEYWORD` / `SEARCH_COUNT` — search parameter overrides
//! - `STUDY_SESSIONS_TABLE` — DynamoDB table (default `study-sessions`)
//! - `NOTIFICATIONS_ENABLED` — set `false` to silence SNS
//! - `SNS_TOPIC_ARN` — moderation topic; notifications are skipped when unset

use lambda_runtime::{Error as LambdaError, service_fn};

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use study_scout::handler::handler;

/// Main entry point for the AWS Lambda function.
#[tokio::main]
async fn main() -> Result<(), LambdaError> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    info!("study-scout Lambda starting...");
    lambda_runtime::run(service_fn(handler)).await
}
