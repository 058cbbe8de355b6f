//! Urgency classifier trait

use async_trait::async_trait;

use crate::Classification;

/// Scores one utterance for urgency
///
/// Implementations are a hard failure-isolation boundary: `classify` always
/// yields a usable verdict. Degraded operation is reported through
/// `Classification::source`, never through an error.
#[async_trait]
pub trait UrgencyClassifier: Send + Sync {
    /// Classify `transcript`; `context` carries caller metadata and prior turns
    async fn classify(&self, transcript: &str, context: &str) -> Classification;

    /// Implementation name for logs
    fn name(&self) -> &str;
}
