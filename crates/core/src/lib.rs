//! Core traits and types for the call filter
//!
//! This crate provides the foundational types shared by every other crate:
//! - Call stages and the per-request call context
//! - Urgency verdicts and the typed classification result
//! - Routing decisions handed to the webhook adapter
//! - Traits for the two external collaborators (classifier, notifier)
//! - Error types

pub mod call;
pub mod error;
pub mod routing;
pub mod traits;
pub mod verdict;

pub use call::{CallContext, Stage};
pub use error::{Error, Result};
pub use routing::{RoutingAction, RoutingDecision};
pub use verdict::{
    Classification, ClassificationVerdict, FallbackCause, UrgencyLabel, VerdictSource,
};

pub use traits::{Notifier, UrgencyClassifier};
