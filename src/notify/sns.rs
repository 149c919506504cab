//! AWS SNS notification publisher.
//!
//! Publishes the formatted message to the moderation topic, racing the SDK
//! call against a fixed timeout. Failures are logged and returned so the
//! discovery run can record them; they never abort anything.

use std::time::Duration;

use async_trait::async_trait;
use aws_sdk_sns::Client;
use tracing::{info, warn};

use crate::error::{AppError, Result};
use crate::models::{NotifyConfig, StudySession};
use crate::notify::{NOTIFICATION_SUBJECT, Notifier, delivery_target, format_message};

/// SNS-backed notifier for the moderation topic.
pub struct SnsNotifier {
    client: Client,
    config: NotifyConfig,
}

impl SnsNotifier {
    /// Create a new SNS notifier.
    pub fn new(client: Client, config: NotifyConfig) -> Self {
        Self { client, config }
    }

    /// Create an SNS notifier from environment configuration.
    pub async fn from_env(config: NotifyConfig) -> Self {
        let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        Self::new(Client::new(&aws_config), config)
    }
}

#[async_trait]
impl Notifier for SnsNotifier {
    async fn publish(&self, session: &StudySession) -> Result<()> {
        let Some(topic_arn) = delivery_target(&self.config) else {
            info!("Notifications disabled or no topic configured, skipping");
            return Ok(());
        };

        let request = self
            .client
            .publish()
            .topic_arn(topic_arn)
            .subject(NOTIFICATION_SUBJECT)
            .message(format_message(session))
            .send();

        let timeout = Duration::from_secs(self.config.publish_timeout_secs);
        match tokio::time::timeout(timeout, request).await {
            Ok(Ok(output)) => {
                info!(
                    "Published notification for {} (message id: {})",
                    session.id,
                    output.message_id().unwrap_or("-")
                );
                Ok(())
            }
            Ok(Err(e)) => {
                let e = e.into_service_error();
                warn!("SNS publish failed for {}: {}", session.id, e);
                Err(AppError::notification(e))
            }
            Err(_) => {
                warn!(
                    "SNS publish timed out after {}s for {}",
                    self.config.publish_timeout_secs, session.id
                );
                Err(AppError::notification(format!(
                    "publish timed out after {}s",
                    self.config.publish_timeout_secs
                )))
            }
        }
    }
}
