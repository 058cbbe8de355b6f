//! Call triage state machine
//!
//! Given the stage a call is in and what the caller just said, decide what
//! the caller hears next, what the carrier does with the call, and what the
//! operator is told.
//!
//! ```text
//! Greeting ──▶ AwaitingInitialSpeech ──▶ AwaitingClarification ──▶ Resolved
//!                        │                                            ▲
//!                        └────────────────────────────────────────────┘
//! ```
//!
//! `AwaitingClarification` is entered at most once per call.

pub mod machine;
pub mod resolution;

pub use machine::TriageMachine;
pub use resolution::{resolve, Resolution};
