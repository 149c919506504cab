//! Notification publishing for newly discovered sessions.
//!
//! Publishing is best-effort: the discovery run records failures in its
//! result, but a notification can never fail a registration or a run.
//! Local runs use `LogNotifier`; production uses `SnsNotifier`
//! (feature `aws`).

#[cfg(feature = "aws")]
pub mod sns;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{NotifyConfig, StudySession};

#[cfg(feature = "aws")]
pub use sns::SnsNotifier;

/// Subject line for new-session notifications.
pub const NOTIFICATION_SUBJECT: &str = "新しい勉強会が登録されました";

/// Trait for notification backends.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Publish a notification for a newly created session.
    async fn publish(&self, session: &StudySession) -> Result<()>;
}

/// Render the plain-text notification body for a session.
pub fn format_message(session: &StudySession) -> String {
    let mut message = format!(
        "新しい勉強会が自動登録されました。\n\
         \n\
         タイトル: {}\n\
         URL: {}\n\
         開催日時: {}\n",
        session.title,
        session.url,
        session.datetime.format("%Y-%m-%d %H:%M"),
    );

    if let Some(end) = &session.end_datetime {
        message.push_str(&format!("終了日時: {}\n", end.format("%Y-%m-%d %H:%M")));
    }

    message.push_str("\n承認待ちの状態です。管理画面から確認してください。");
    message
}

/// The topic to deliver to, or `None` when notifications are disabled or
/// no topic ARN is configured.
pub fn delivery_target(config: &NotifyConfig) -> Option<&str> {
    if !config.enabled {
        return None;
    }
    match config.topic_arn.as_deref() {
        Some(arn) if !arn.trim().is_empty() => Some(arn),
        _ => None,
    }
}

/// Notifier that logs instead of publishing. Used by the CLI, where no
/// topic exists.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn publish(&self, session: &StudySession) -> Result<()> {
        log::info!("{}: {}", NOTIFICATION_SUBJECT, session.title);
        log::debug!("{}", format_message(session));
        Ok(())
    }
}
