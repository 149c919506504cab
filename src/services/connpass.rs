// src/services/connpass.rs

//! connpass API client.
//!
//! Keyword search against the connpass v2 events endpoint, with status-code
//! classification: 401 is an authentication error, 429 is retried exactly
//! once after a fixed delay, any other non-2xx status is a generic API
//! error. Network and body-parse failures propagate unclassified.

use std::time::Duration;

use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use url::Url;

use crate::error::{AppError, Result};
use crate::models::{ConnpassConfig, Event};
use crate::utils::http;

/// Raw body of the connpass search endpoint.
#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results_returned: usize,
    #[serde(default)]
    results_available: usize,
    #[serde(default)]
    events: Vec<Event>,
}

/// Outcome of one keyword search.
#[derive(Debug, Clone)]
pub struct EventSearch {
    /// Events in this response, bounded by the configured count
    pub events: Vec<Event>,

    /// Number of events the API returned
    pub returned: usize,

    /// Total matches available on the server
    pub available: usize,
}

/// Client for the connpass event search API.
pub struct ConnpassClient {
    config: ConnpassConfig,
    client: Client,
}

impl ConnpassClient {
    /// Create a client from connpass settings.
    pub fn new(config: ConnpassConfig) -> Result<Self> {
        let client = http::create_client(&config)?;
        Ok(Self { config, client })
    }

    /// Search events by the configured keyword.
    ///
    /// A 429 response is retried exactly once after `retry_delay_ms`; a
    /// second 429 becomes [`AppError::ApiRateLimited`]. The retry response
    /// is otherwise classified like a first response.
    pub async fn search(&self) -> Result<EventSearch> {
        let url = self.events_url()?;
        log::debug!("Searching connpass: {}", url);

        let mut response = self.get(url.clone()).await?;
        if response.status() == StatusCode::TOO_MANY_REQUESTS {
            log::warn!(
                "connpass rate limit hit, retrying once in {}ms",
                self.config.retry_delay_ms
            );
            tokio::time::sleep(Duration::from_millis(self.config.retry_delay_ms)).await;

            response = self.get(url).await?;
            if response.status() == StatusCode::TOO_MANY_REQUESTS {
                return Err(AppError::ApiRateLimited);
            }
        }

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(AppError::ApiAuth);
        }
        if !status.is_success() {
            return Err(AppError::ApiStatus {
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        let parsed: SearchResponse = serde_json::from_str(&body)?;

        log::debug!(
            "connpass returned {} of {} available events",
            parsed.results_returned,
            parsed.results_available
        );

        Ok(EventSearch {
            events: parsed.events,
            returned: parsed.results_returned,
            available: parsed.results_available,
        })
    }

    /// Build the search URL with keyword and count query parameters.
    fn events_url(&self) -> Result<Url> {
        let base = self.config.base_url.trim_end_matches('/');
        let mut url = Url::parse(&format!("{}/events/", base))?;
        url.query_pairs_mut()
            .append_pair("keyword", &self.config.keyword)
            .append_pair("count", &self.config.count.to_string());
        Ok(url)
    }

    async fn get(&self, url: Url) -> Result<Response> {
        let mut request = self.client.get(url);
        if let Some(key) = &self.config.api_key {
            request = request.header("X-API-Key", key);
        }
        Ok(request.send().await?)
    }
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn test_config(base_url: String) -> ConnpassConfig {
        ConnpassConfig {
            base_url,
            api_key: Some("test-key".to_string()),
            keyword: "広島".to_string(),
            count: 10,
            timeout_secs: 5,
            retry_delay_ms: 10,
            user_agent: "study-scout-test".to_string(),
        }
    }

    fn sample_body() -> serde_json::Value {
        serde_json::json!({
            "results_start": 1,
            "results_returned": 1,
            "results_available": 42,
            "events": [{
                "id": 364,
                "title": "広島IT勉強会 #12",
                "url": "https://hiroshima-it.connpass.com/event/364/",
                "started_at": "2026-03-14T19:00:00+09:00",
                "ended_at": "2026-03-14T21:00:00+09:00",
                "description": "LT大会"
            }]
        })
    }

    fn make_client(server: &MockServer) -> ConnpassClient {
        ConnpassClient::new(test_config(format!("{}/api/v2", server.uri()))).unwrap()
    }

    #[tokio::test]
    async fn search_returns_events_and_counts() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v2/events/"))
            .and(query_param("keyword", "広島"))
            .and(query_param("count", "10"))
            .and(header("X-API-Key", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(sample_body()))
            .mount(&server)
            .await;

        let search = make_client(&server).search().await.unwrap();
        assert_eq!(search.returned, 1);
        assert_eq!(search.available, 42);
        assert_eq!(search.events.len(), 1);
        assert_eq!(search.events[0].title, "広島IT勉強会 #12");
    }

    #[tokio::test]
    async fn rate_limit_then_success_recovers() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v2/events/"))
            .respond_with(ResponseTemplate::new(429))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/v2/events/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(sample_body()))
            .mount(&server)
            .await;

        let search = make_client(&server).search().await.unwrap();
        assert_eq!(search.events.len(), 1);
    }

    #[tokio::test]
    async fn second_rate_limit_is_fatal() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v2/events/"))
            .respond_with(ResponseTemplate::new(429))
            .expect(2)
            .mount(&server)
            .await;

        let err = make_client(&server).search().await.unwrap_err();
        assert!(matches!(err, AppError::ApiRateLimited));
    }

    #[tokio::test]
    async fn unauthorized_is_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v2/events/"))
            .respond_with(ResponseTemplate::new(401))
            .expect(1)
            .mount(&server)
            .await;

        let err = make_client(&server).search().await.unwrap_err();
        assert!(matches!(err, AppError::ApiAuth));
    }

    #[tokio::test]
    async fn unauthorized_after_rate_limit_classifies_as_auth() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v2/events/"))
            .respond_with(ResponseTemplate::new(429))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/v2/events/"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let err = make_client(&server).search().await.unwrap_err();
        assert!(matches!(err, AppError::ApiAuth));
    }

    #[tokio::test]
    async fn other_status_maps_to_api_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v2/events/"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let err = make_client(&server).search().await.unwrap_err();
        assert!(matches!(err, AppError::ApiStatus { status: 500 }));
    }

    #[tokio::test]
    async fn malformed_body_propagates_unclassified() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v2/events/"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let err = make_client(&server).search().await.unwrap_err();
        assert!(matches!(err, AppError::Json(_)));
        assert!(!err.is_classified_api());
    }

    #[tokio::test]
    async fn api_key_header_is_omitted_without_key() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v2/events/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(sample_body()))
            .mount(&server)
            .await;

        let mut config = test_config(format!("{}/api/v2", server.uri()));
        config.api_key = None;
        let client = ConnpassClient::new(config).unwrap();
        assert!(client.search().await.is_ok());

        let requests = server.received_requests().await.unwrap();
        assert!(!requests[0].headers.contains_key("X-API-Key"));
    }

    #[test]
    fn events_url_handles_trailing_slash() {
        let with_slash =
            ConnpassClient::new(test_config("https://connpass.com/api/v2/".to_string()))
                .unwrap()
                .events_url()
                .unwrap();
        let without =
            ConnpassClient::new(test_config("https://connpass.com/api/v2".to_string()))
                .unwrap()
                .events_url()
                .unwrap();

        assert_eq!(with_slash.path(), "/api/v2/events/");
        assert_eq!(with_slash, without);
        assert!(
            with_slash
                .query_pairs()
                .any(|(k, v)| k == "keyword" && v == "広島")
        );
        assert!(with_slash.query_pairs().any(|(k, v)| k == "count" && v == "10"));
    }
}
