// src/handler.rs

//! AWS Lambda handler for scheduled discovery runs.
//!
//! Invoked by an EventBridge cron rule. One invocation performs one
//! discovery pass against DynamoDB and SNS and reports the summary in-band:
//! failures come back as a `status: "error"` payload instead of failing the
//! invocation, so the cron rule does not retry a run that already partially
//! completed.

use std::sync::Arc;

use lambda_runtime::{Error as LambdaError, LambdaEvent};

use serde::Serialize;
use serde_json::Value;
use tracing::{error, info, instrument};

use crate::error::Result;
use crate::models::Config;
use crate::notify::SnsNotifier;
use crate::services::{ConnpassClient, DiscoveryResult, DiscoveryService};
use crate::storage::DynamoStore;

/// Lambda response payload.
///
/// Field names match what the admin tooling already consumes.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveryResponse {
    /// `"success"` or `"error"`
    pub status: &'static str,

    /// Events returned by the search call
    pub total_found: usize,

    /// Sessions created this run
    pub new_registrations: usize,

    /// Events skipped as already registered
    pub duplicates_skipped: usize,

    /// Accumulated per-event errors, or the fatal error for `"error"` runs
    pub errors: Vec<String>,
}

impl DiscoveryResponse {
    fn success(result: &DiscoveryResult) -> Self {
        Self {
            status: "success",
            total_found: result.total_found,
            new_registrations: result.new_registrations,
            duplicates_skipped: result.duplicates_skipped,
            errors: result.errors.clone(),
        }
    }

    fn failure(message: String) -> Self {
        Self {
            status: "error",
            total_found: 0,
            new_registrations: 0,
            duplicates_skipped: 0,
            errors: vec![message],
        }
    }
}

/// Main Lambda handler function.
#[instrument(skip(event))]
pub async fn handler(event: LambdaEvent<Value>) -> std::result::Result<Value, LambdaError> {
    info!("Handling scheduled discovery event: {:?}", event.payload);

    let response = match run_discovery().await {
        Ok(result) => {
            info!(
                "Discovery run succeeded: {} found, {} new, {} duplicates, {} errors",
                result.total_found,
                result.new_registrations,
                result.duplicates_skipped,
                result.errors.len()
            );
            DiscoveryResponse::success(&result)
        }
        Err(e) => {
            error!("Discovery run failed: {}", e);
            DiscoveryResponse::failure(e.to_string())
        }
    };

    Ok(serde_json::to_value(response)?)
}

/// Internal discovery logic for the Lambda environment.
async fn run_discovery() -> Result<DiscoveryResult> {
    let config = Config::from_env();
    config.validate()?;

    let store = Arc::new(DynamoStore::from_env().await?);
    let notifier = Arc::new(SnsNotifier::from_env(config.notifications.clone()).await);
    let client = ConnpassClient::new(config.connpass.clone())?;

    let service = DiscoveryService::new(client, store, notifier, config.discovery.clone());
    service.run().await
}
