//! Storage abstractions for study-session persistence.
//!
//! Discovery needs exactly two operations: a URL existence probe for the
//! duplicate check and the creation of a new `pending` record. `LocalStore`
//! backs local CLI runs and tests; `DynamoStore` (feature `aws`) talks to
//! the production table the website reads.

#[cfg(feature = "aws")]
pub mod dynamo;
pub mod local;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{NewStudySession, StudySession};

// Re-export for convenience
#[cfg(feature = "aws")]
pub use dynamo::DynamoStore;
pub use local::LocalStore;

/// Trait for session storage backends.
///
/// Implementations wrap backend failures into
/// [`AppError::Storage`](crate::error::AppError::Storage) tagged with the
/// failing operation (`check_exists` or `create`).
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Whether a session with this URL is already stored.
    async fn exists_by_url(&self, url: &str) -> Result<bool>;

    /// Persist a new session and return the created record.
    async fn create(&self, new_session: NewStudySession) -> Result<StudySession>;
}
