//! Service layer for the discovery application.
//!
//! This module contains the business logic for:
//! - connpass keyword search (`ConnpassClient`)
//! - Discovery orchestration (`DiscoveryService`)

mod connpass;
mod discovery;

pub use connpass::{ConnpassClient, EventSearch};
pub use discovery::{DiscoveryResult, DiscoveryService};
