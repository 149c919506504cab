// src/services/discovery.rs

//! Study-session discovery orchestration.
//!
//! One run performs a single keyword search, then walks the returned events
//! in fixed-size batches with a fixed delay between batches: duplicate
//! check, conditional create, best-effort notify. Partial failures
//! accumulate in the run summary instead of aborting the run.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::error::Result;
use crate::models::{DiscoveryConfig, Event, NewStudySession, StudySession};
use crate::notify::Notifier;
use crate::services::connpass::ConnpassClient;
use crate::storage::SessionStore;

/// Summary of one discovery run.
#[derive(Debug, Default, PartialEq)]
pub struct DiscoveryResult {
    /// Events returned by the search call
    pub total_found: usize,

    /// Sessions created this run
    pub new_registrations: usize,

    /// Events skipped because their URL is already stored
    pub duplicates_skipped: usize,

    /// Human-readable descriptions of everything that went wrong
    pub errors: Vec<String>,

    /// Every session created this run
    pub registered: Vec<StudySession>,
}

/// Orchestrates search → dedupe → create → notify.
pub struct DiscoveryService {
    client: ConnpassClient,
    store: Arc<dyn SessionStore>,
    notifier: Arc<dyn Notifier>,
    config: DiscoveryConfig,
}

impl DiscoveryService {
    /// Create a new discovery service.
    pub fn new(
        client: ConnpassClient,
        store: Arc<dyn SessionStore>,
        notifier: Arc<dyn Notifier>,
        config: DiscoveryConfig,
    ) -> Self {
        Self {
            client,
            store,
            notifier,
            config,
        }
    }

    /// Run one discovery pass.
    ///
    /// Classified API errors from the search fold into the returned result
    /// and end the run early; anything else (network, body parse)
    /// propagates to the caller.
    pub async fn run(&self) -> Result<DiscoveryResult> {
        let started = Instant::now();
        let mut result = DiscoveryResult::default();

        log::info!("Starting study-session discovery");

        let search = match self.client.search().await {
            Ok(search) => search,
            Err(e) if e.is_classified_api() => {
                log::error!("Event search failed: {}", e);
                result.errors.push(format!("Event search failed: {}", e));
                return Ok(result);
            }
            Err(e) => return Err(e),
        };

        result.total_found = search.events.len();
        log::info!(
            "Search returned {} events ({} available on connpass)",
            result.total_found,
            search.available
        );

        let batch_size = self.config.batch_size.max(1);
        let delay = Duration::from_millis(self.config.batch_delay_ms);

        for (index, batch) in search.events.chunks(batch_size).enumerate() {
            // Fixed pause between batches only, to respect the API rate limit
            if index > 0 && !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }

            for event in batch {
                self.process_event(event, &mut result).await;
            }
        }

        log::info!(
            "Discovery finished in {}ms: {} found, {} new, {} duplicates, {} errors",
            started.elapsed().as_millis(),
            result.total_found,
            result.new_registrations,
            result.duplicates_skipped,
            result.errors.len()
        );

        Ok(result)
    }

    /// Duplicate-check, create, and notify for a single event.
    ///
    /// Any failure is recorded in `result.errors`. Only a notification
    /// failure leaves the event counted as registered.
    async fn process_event(&self, event: &Event, result: &mut DiscoveryResult) {
        match self.store.exists_by_url(&event.url).await {
            Ok(true) => {
                log::debug!("Skipping duplicate: {} ({})", event.title, event.url);
                result.duplicates_skipped += 1;
                return;
            }
            Ok(false) => {}
            Err(e) => {
                log::warn!("Duplicate check failed for \"{}\": {}", event.title, e);
                result
                    .errors
                    .push(format!("Duplicate check failed for \"{}\": {}", event.title, e));
                return;
            }
        }

        let session = match self.store.create(NewStudySession::from(event)).await {
            Ok(session) => session,
            Err(e) => {
                log::warn!("Registration failed for \"{}\": {}", event.title, e);
                result
                    .errors
                    .push(format!("Registration failed for \"{}\": {}", event.title, e));
                return;
            }
        };

        result.new_registrations += 1;
        log::info!("Registered study session: {} ({})", session.title, session.url);

        if let Err(e) = self.notifier.publish(&session).await {
            log::warn!("Notification failed for \"{}\": {}", event.title, e);
            result
                .errors
                .push(format!("Notification failed for \"{}\": {}", event.title, e));
        }

        result.registered.push(session);
    }
}
