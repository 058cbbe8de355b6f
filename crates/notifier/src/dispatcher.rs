//! Fire-and-forget notification dispatch

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use uuid::Uuid;

use call_filter_config::NotifierConfig;
use call_filter_core::Notifier;

/// Handle to one spawned delivery
///
/// Dropping it detaches the delivery, which still runs to completion.
#[derive(Debug)]
pub struct DispatchHandle {
    pub id: Uuid,
    pub outcome: JoinHandle<bool>,
}

impl DispatchHandle {
    /// Wait for the delivery outcome
    pub async fn delivered(self) -> bool {
        self.outcome.await.unwrap_or(false)
    }
}

/// Runs deliveries on background tasks with bounded concurrency
#[derive(Clone)]
pub struct NotificationDispatcher {
    notifier: Arc<dyn Notifier>,
    permits: Arc<Semaphore>,
    timeout: Duration,
}

impl NotificationDispatcher {
    pub fn new(notifier: Arc<dyn Notifier>, max_concurrent: usize, timeout: Duration) -> Self {
        Self {
            notifier,
            permits: Arc::new(Semaphore::new(max_concurrent.max(1))),
            timeout,
        }
    }

    pub fn from_config(notifier: Arc<dyn Notifier>, config: &NotifierConfig) -> Self {
        Self::new(notifier, config.max_concurrent, config.timeout())
    }

    pub fn channel(&self) -> &str {
        self.notifier.channel()
    }

    /// Spawn delivery of `message` and return immediately
    ///
    /// Must be called from within a Tokio runtime. Deliveries beyond the
    /// concurrency limit queue for a slot; the timeout only covers the
    /// delivery itself.
    pub fn dispatch(&self, message: impl Into<String>) -> DispatchHandle {
        let id = Uuid::new_v4();
        let message = message.into();
        let notifier = Arc::clone(&self.notifier);
        let permits = Arc::clone(&self.permits);
        let timeout = self.timeout;

        let outcome = tokio::spawn(async move {
            let _permit = match permits.acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => return false,
            };

            let delivered = match tokio::time::timeout(timeout, notifier.notify(&message)).await {
                Ok(delivered) => delivered,
                Err(_) => {
                    tracing::warn!(notification_id = %id, "Notification timed out");
                    false
                }
            };

            let outcome = if delivered { "delivered" } else { "failed" };
            metrics::counter!(
                "call_filter_notifications_total",
                "channel" => notifier.channel().to_string(),
                "outcome" => outcome
            )
            .increment(1);
            tracing::debug!(notification_id = %id, outcome, "Notification finished");

            delivered
        });

        DispatchHandle { id, outcome }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DisabledNotifier;

    #[tokio::test]
    async fn test_disabled_notifier_outcome() {
        let notifier = Arc::new(DisabledNotifier::new("test"));
        let dispatcher = NotificationDispatcher::new(notifier, 1, Duration::from_secs(1));
        assert_eq!(dispatcher.channel(), "disabled");
        assert!(!dispatcher.dispatch("bonjour").delivered().await);
    }
}
