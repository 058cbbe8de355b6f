//! Application State
//!
//! Shared, read-only state across all handlers. Nothing in here tracks
//! individual calls.

use std::sync::Arc;

use call_filter_agent::TriageMachine;
use call_filter_config::Settings;
use call_filter_core::{Notifier, UrgencyClassifier};
use call_filter_llm::LlmUrgencyClassifier;
use call_filter_notifier::{build_notifier, DispatchHandle, NotificationDispatcher};

use crate::ServerError;

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub machine: Arc<TriageMachine>,
    pub dispatcher: NotificationDispatcher,
}

impl AppState {
    /// Build the production components described by `settings`
    pub fn new(settings: Settings) -> Result<Self, ServerError> {
        let classifier = LlmUrgencyClassifier::from_config(&settings.classifier)?;
        let notifier = build_notifier(&settings.telephony, &settings.notifier);
        Ok(Self::with_components(settings, Arc::new(classifier), notifier))
    }

    /// Assemble state around explicit collaborators
    pub fn with_components(
        settings: Settings,
        classifier: Arc<dyn UrgencyClassifier>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let machine = TriageMachine::new(
            settings.triage.clone(),
            settings.notifier.templates.clone(),
            classifier,
        )
        .with_transfer_available(settings.telephony.forward_number().is_some());
        let dispatcher = NotificationDispatcher::from_config(notifier, &settings.notifier);

        Self {
            settings: Arc::new(settings),
            machine: Arc::new(machine),
            dispatcher,
        }
    }

    pub fn classifier(&self) -> &Arc<dyn UrgencyClassifier> {
        self.machine.classifier()
    }

    /// Hand a message to the dispatcher without waiting for delivery
    pub fn notify(&self, message: Option<String>) -> Option<DispatchHandle> {
        let message = message?;
        let handle = self.dispatcher.dispatch(message);
        tracing::debug!(
            notification_id = %handle.id,
            channel = self.dispatcher.channel(),
            "Notification dispatched"
        );
        Some(handle)
    }
}
