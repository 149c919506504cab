// src/models/mod.rs

//! Domain models for the discovery application.

mod config;
mod event;
mod session;

// Re-export all public types
pub use config::{Config, ConnpassConfig, DiscoveryConfig, NotifyConfig, StorageConfig};
pub use event::Event;
pub use session::{NewStudySession, SessionStatus, StudySession};
