//! AWS DynamoDB storage implementation.
//!
//! Single-table layout shared with the website: attributes `id, title, url,
//! datetime, endDatetime, status, createdAt, updatedAt`. The existence probe
//! scans on the `url` attribute; there is no transactional guard against
//! concurrent discovery runs.

use std::collections::HashMap;

use aws_sdk_dynamodb::Client;
use aws_sdk_dynamodb::types::{AttributeValue, Select};
use tracing::{debug, info};

use crate::error::{AppError, Result};
use crate::models::{NewStudySession, StudySession};
use crate::storage::SessionStore;

/// DynamoDB-based session storage.
pub struct DynamoStore {
    client: Client,
    table: String,
}

impl DynamoStore {
    /// Create a new DynamoDB storage instance.
    pub fn new(client: Client, table: impl Into<String>) -> Self {
        Self {
            client,
            table: table.into(),
        }
    }

    /// Create DynamoDB storage from environment configuration.
    pub async fn from_env() -> Result<Self> {
        let config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        let client = Client::new(&config);

        let table = std::env::var("STUDY_SESSIONS_TABLE")
            .unwrap_or_else(|_| "study-sessions".to_string());

        Ok(Self::new(client, table))
    }

    /// Build the DynamoDB item for a session.
    fn session_item(session: &StudySession) -> HashMap<String, AttributeValue> {
        let mut item = HashMap::from([
            ("id".to_string(), AttributeValue::S(session.id.clone())),
            ("title".to_string(), AttributeValue::S(session.title.clone())),
            ("url".to_string(), AttributeValue::S(session.url.clone())),
            (
                "datetime".to_string(),
                AttributeValue::S(session.datetime.to_rfc3339()),
            ),
            (
                "status".to_string(),
                AttributeValue::S(session.status.as_str().to_string()),
            ),
            (
                "createdAt".to_string(),
                AttributeValue::S(session.created_at.to_rfc3339()),
            ),
            (
                "updatedAt".to_string(),
                AttributeValue::S(session.updated_at.to_rfc3339()),
            ),
        ]);

        if let Some(end) = &session.end_datetime {
            item.insert(
                "endDatetime".to_string(),
                AttributeValue::S(end.to_rfc3339()),
            );
        }

        item
    }
}

#[async_trait::async_trait]
impl SessionStore for DynamoStore {
    /// Scan the table for a matching `url` attribute.
    ///
    /// `url` is a DynamoDB reserved word, hence the expression attribute
    /// name. Follows `LastEvaluatedKey` until a match is found or the scan
    /// is exhausted.
    async fn exists_by_url(&self, url: &str) -> Result<bool> {
        let mut start_key: Option<HashMap<String, AttributeValue>> = None;

        loop {
            let page = self
                .client
                .scan()
                .table_name(&self.table)
                .filter_expression("#u = :url")
                .expression_attribute_names("#u", "url")
                .expression_attribute_values(":url", AttributeValue::S(url.to_string()))
                .select(Select::Count)
                .set_exclusive_start_key(start_key.take())
                .send()
                .await
                .map_err(|e| AppError::storage("check_exists", e.into_service_error()))?;

            if page.count() > 0 {
                debug!("URL already registered: {}", url);
                return Ok(true);
            }

            match page.last_evaluated_key() {
                Some(key) => start_key = Some(key.clone()),
                None => return Ok(false),
            }
        }
    }

    async fn create(&self, new_session: NewStudySession) -> Result<StudySession> {
        let session = new_session.into_session();

        self.client
            .put_item()
            .table_name(&self.table)
            .set_item(Some(Self::session_item(&session)))
            .send()
            .await
            .map_err(|e| AppError::storage("create", e.into_service_error()))?;

        info!(
            "Created study session {} in {} ({})",
            session.id, self.table, session.url
        );
        Ok(session)
    }
}
