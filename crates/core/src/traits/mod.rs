//! Core traits for the call filter
//!
//! Both external collaborators sit behind a trait so the state machine and
//! the webhook adapter can be exercised with in-memory implementations.
//!
//! ```text
//! UrgencyClassifier: transcript + context → Classification (never fails)
//! Notifier:          message → delivered? (never fails)
//! ```

mod classifier;
mod notifier;

pub use classifier::UrgencyClassifier;
pub use notifier::Notifier;
