//! Centralized default values
//!
//! Single source of truth for the defaults used by the config sections and
//! their tests.

/// External classification service
pub mod classifier {
    pub const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1";
    pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
    pub const DEFAULT_MAX_TOKENS: usize = 300;
    /// Deterministic decoding, no sampling randomness
    pub const DEFAULT_TEMPERATURE: f32 = 0.0;
    pub const DEFAULT_TIMEOUT_MS: u64 = 5_000;
    pub const DEFAULT_MAX_CONCURRENT: usize = 16;

    /// Urgency keywords for the fallback heuristic, matched in this order
    pub const DEFAULT_URGENCY_KEYWORDS: &[&str] = &[
        "urgence",
        "blessé",
        "incendie",
        "police",
        "ambulance",
        "mort",
        "danger",
    ];
}

/// Triage decision parameters
pub mod triage {
    /// Minimum confidence for a first-pass urgent verdict to transfer
    pub const DEFAULT_URGENT_THRESHOLD: f32 = 0.65;
    pub const DEFAULT_VOICE: &str = "alice";
    pub const DEFAULT_LANGUAGE: &str = "fr-FR";
    pub const DEFAULT_VOICEMAIL_MAX_LENGTH_SECS: u32 = 120;
}

/// Operator notifications
pub mod notifier {
    pub const DEFAULT_TIMEOUT_MS: u64 = 5_000;
    pub const DEFAULT_MAX_CONCURRENT: usize = 8;
}

/// Carrier endpoints
pub mod telephony {
    pub const DEFAULT_API_BASE: &str = "https://api.twilio.com/2010-04-01";
}

/// HTTP server
pub mod server {
    pub const DEFAULT_HOST: &str = "0.0.0.0";
    pub const DEFAULT_PORT: u16 = 3000;
    pub const DEFAULT_TIMEOUT_SECS: u64 = 15;
}
