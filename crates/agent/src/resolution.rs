//! Verdict-to-outcome table

use call_filter_core::{ClassificationVerdict, RoutingAction, Stage, UrgencyLabel};

/// Path by which a classified utterance is resolved
///
/// Each variant selects one caller prompt and one notification template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resolution {
    /// Ask the single clarifying question
    Clarify,
    Transfer,
    TransferAfterClarification,
    Voicemail,
    VoicemailAfterClarification,
    /// First-pass urgent verdict below the threshold
    VoicemailLowConfidence,
}

impl Resolution {
    pub fn action(&self) -> RoutingAction {
        match self {
            Resolution::Clarify => RoutingAction::AskClarifyingQuestion,
            Resolution::Transfer | Resolution::TransferAfterClarification => {
                RoutingAction::Transfer
            }
            Resolution::Voicemail
            | Resolution::VoicemailAfterClarification
            | Resolution::VoicemailLowConfidence => RoutingAction::RecordVoicemail,
        }
    }

    pub fn next_stage(&self) -> Stage {
        match self {
            Resolution::Clarify => Stage::AwaitingClarification,
            _ => Stage::Resolved,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Resolution::Clarify => "clarify",
            Resolution::Transfer => "transfer",
            Resolution::TransferAfterClarification => "transfer_after_clarification",
            Resolution::Voicemail => "voicemail",
            Resolution::VoicemailAfterClarification => "voicemail_after_clarification",
            Resolution::VoicemailLowConfidence => "voicemail_low_confidence",
        }
    }
}

/// Map a verdict in a classifying stage to its resolution
///
/// Returns `None` for stages that never classify speech. The threshold only
/// applies on the first pass; after clarification any urgent verdict
/// transfers and anything else goes to voicemail.
pub fn resolve(stage: Stage, verdict: &ClassificationVerdict, threshold: f32) -> Option<Resolution> {
    let resolution = match stage {
        Stage::AwaitingInitialSpeech => match verdict.label {
            UrgencyLabel::NeedsClarification => Resolution::Clarify,
            UrgencyLabel::Urgent if verdict.confidence >= threshold => Resolution::Transfer,
            UrgencyLabel::Urgent => Resolution::VoicemailLowConfidence,
            UrgencyLabel::NonUrgent => Resolution::Voicemail,
        },
        Stage::AwaitingClarification => match verdict.label {
            UrgencyLabel::Urgent => Resolution::TransferAfterClarification,
            UrgencyLabel::NonUrgent | UrgencyLabel::NeedsClarification => {
                Resolution::VoicemailAfterClarification
            }
        },
        Stage::Greeting | Stage::Resolved => return None,
    };
    Some(resolution)
}

#[cfg(test)]
mod tests {
    use super::*;

    const THRESHOLD: f32 = 0.65;

    fn verdict(label: UrgencyLabel, confidence: f32) -> ClassificationVerdict {
        ClassificationVerdict::new(label, confidence, "test")
    }

    #[test]
    fn test_initial_speech_table() {
        let stage = Stage::AwaitingInitialSpeech;
        let cases = [
            (UrgencyLabel::NeedsClarification, 0.9, Resolution::Clarify),
            (UrgencyLabel::Urgent, 0.65, Resolution::Transfer),
            (UrgencyLabel::Urgent, 0.95, Resolution::Transfer),
            (UrgencyLabel::Urgent, 0.64, Resolution::VoicemailLowConfidence),
            (UrgencyLabel::NonUrgent, 0.99, Resolution::Voicemail),
        ];
        for (label, confidence, expected) in cases {
            assert_eq!(
                resolve(stage, &verdict(label, confidence), THRESHOLD),
                Some(expected),
                "{:?} at {}",
                label,
                confidence
            );
        }
    }

    #[test]
    fn test_clarification_table() {
        let stage = Stage::AwaitingClarification;
        assert_eq!(
            resolve(stage, &verdict(UrgencyLabel::Urgent, 0.1), THRESHOLD),
            Some(Resolution::TransferAfterClarification)
        );
        assert_eq!(
            resolve(stage, &verdict(UrgencyLabel::NonUrgent, 0.9), THRESHOLD),
            Some(Resolution::VoicemailAfterClarification)
        );
        assert_eq!(
            resolve(stage, &verdict(UrgencyLabel::NeedsClarification, 0.9), THRESHOLD),
            Some(Resolution::VoicemailAfterClarification)
        );
    }

    #[test]
    fn test_clarification_never_asks_again() {
        let labels = [
            UrgencyLabel::Urgent,
            UrgencyLabel::NonUrgent,
            UrgencyLabel::NeedsClarification,
        ];
        for label in labels {
            for confidence in [0.0, 0.5, 0.65, 1.0] {
                let resolution =
                    resolve(Stage::AwaitingClarification, &verdict(label, confidence), THRESHOLD)
                        .unwrap();
                assert_ne!(resolution.action(), RoutingAction::AskClarifyingQuestion);
                assert_eq!(resolution.next_stage(), Stage::Resolved);
            }
        }
    }

    #[test]
    fn test_non_classifying_stages() {
        let v = verdict(UrgencyLabel::Urgent, 1.0);
        assert_eq!(resolve(Stage::Greeting, &v, THRESHOLD), None);
        assert_eq!(resolve(Stage::Resolved, &v, THRESHOLD), None);
    }

    #[test]
    fn test_threshold_is_configurable() {
        let v = verdict(UrgencyLabel::Urgent, 0.7);
        assert_eq!(
            resolve(Stage::AwaitingInitialSpeech, &v, 0.8),
            Some(Resolution::VoicemailLowConfidence)
        );
    }
}
