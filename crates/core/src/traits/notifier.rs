//! Operator notification trait

use async_trait::async_trait;

/// Best-effort delivery of a short status message to an operator channel
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver `message`; returns whether delivery succeeded
    ///
    /// Failures are logged by the implementation and reported as `false`.
    async fn notify(&self, message: &str) -> bool;

    /// Channel name for logs and metrics (e.g. "sms")
    fn channel(&self) -> &str;
}
