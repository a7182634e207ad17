//! Notification sink for user-facing acknowledgements.
//!
//! Fire-and-forget: the engine never waits on delivery outcomes and no
//! response is expected.

use async_trait::async_trait;

/// Delivers a toast/banner-style acknowledgement to the user.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn notify(&self, title: &str, body: &str);
}

/// Default sink that records notifications in the log.
pub struct LogNotificationSink;

#[async_trait]
impl NotificationSink for LogNotificationSink {
    async fn notify(&self, title: &str, body: &str) {
        tracing::info!(title = %title, body = %body, "Notification shown");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_log_sink_does_not_panic() {
        LogNotificationSink.notify("Thanks", "feedback recorded").await;
    }
}
