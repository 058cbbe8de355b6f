use async_trait::async_trait;

use call_filter_core::Notifier;

/// Notifier that drops every message
#[derive(Debug, Clone)]
pub struct DisabledNotifier {
    reason: String,
}

impl DisabledNotifier {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl Notifier for DisabledNotifier {
    async fn notify(&self, message: &str) -> bool {
        tracing::debug!(reason = %self.reason, message, "Notification skipped");
        false
    }

    fn channel(&self) -> &str {
        "disabled"
    }
}
