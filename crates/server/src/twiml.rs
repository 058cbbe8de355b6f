//! Carrier call-control markup (TwiML)
//!
//! `VoiceResponse` is a small builder for the subset of verbs the triage
//! flow emits. `render_decision` maps a routing decision onto it.

use axum::{
    http::header,
    response::{IntoResponse, Response},
};

use call_filter_config::{ServerConfig, TelephonyConfig, TriageConfig};
use call_filter_core::{RoutingAction, RoutingDecision, Stage};

pub const GATHER_PATH: &str = "/process_gather";
pub const CLARIFY_PATH: &str = "/process_clarify";
pub const VOICEMAIL_SAVED_PATH: &str = "/voicemail_saved";

/// Spoken text attributes
#[derive(Debug, Clone, PartialEq)]
pub struct Voice {
    pub voice: String,
    pub language: String,
}

impl Voice {
    pub fn from_config(config: &TriageConfig) -> Self {
        Self {
            voice: config.voice.clone(),
            language: config.language.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Verb {
    Say {
        voice: Voice,
        text: String,
    },
    Gather {
        action: String,
        prompt: Box<Verb>,
    },
    Dial {
        number: String,
    },
    Record {
        action: String,
        max_length: u32,
        play_beep: bool,
    },
    Hangup,
}

/// Call-control document
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VoiceResponse {
    verbs: Vec<Verb>,
}

impl VoiceResponse {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn say(mut self, voice: &Voice, text: impl Into<String>) -> Self {
        self.verbs.push(Verb::Say {
            voice: voice.clone(),
            text: text.into(),
        });
        self
    }

    /// Speech gather posting its result to `action`, prompting with `text`
    pub fn gather(
        mut self,
        action: impl Into<String>,
        voice: &Voice,
        text: impl Into<String>,
    ) -> Self {
        self.verbs.push(Verb::Gather {
            action: action.into(),
            prompt: Box::new(Verb::Say {
                voice: voice.clone(),
                text: text.into(),
            }),
        });
        self
    }

    pub fn dial(mut self, number: impl Into<String>) -> Self {
        self.verbs.push(Verb::Dial {
            number: number.into(),
        });
        self
    }

    pub fn record(mut self, action: impl Into<String>, max_length: u32, play_beep: bool) -> Self {
        self.verbs.push(Verb::Record {
            action: action.into(),
            max_length,
            play_beep,
        });
        self
    }

    pub fn hangup(mut self) -> Self {
        self.verbs.push(Verb::Hangup);
        self
    }

    pub fn to_xml(&self) -> String {
        let mut xml = String::from(r#"<?xml version="1.0" encoding="UTF-8"?><Response>"#);
        for verb in &self.verbs {
            write_verb(&mut xml, verb);
        }
        xml.push_str("</Response>");
        xml
    }
}

impl IntoResponse for VoiceResponse {
    fn into_response(self) -> Response {
        ([(header::CONTENT_TYPE, "text/xml")], self.to_xml()).into_response()
    }
}

fn write_verb(xml: &mut String, verb: &Verb) {
    match verb {
        Verb::Say { voice, text } => {
            xml.push_str(&format!(
                r#"<Say voice="{}" language="{}">{}</Say>"#,
                escape(&voice.voice),
                escape(&voice.language),
                escape(text)
            ));
        }
        Verb::Gather { action, prompt } => {
            xml.push_str(&format!(
                r#"<Gather input="speech" action="{}" method="POST" speechTimeout="auto" actionOnEmptyResult="true">"#,
                escape(action)
            ));
            write_verb(xml, prompt);
            xml.push_str("</Gather>");
        }
        Verb::Dial { number } => {
            xml.push_str(&format!("<Dial>{}</Dial>", escape(number)));
        }
        Verb::Record {
            action,
            max_length,
            play_beep,
        } => {
            xml.push_str(&format!(
                r#"<Record action="{}" maxLength="{}" playBeep="{}"/>"#,
                escape(action),
                max_length,
                play_beep
            ));
        }
        Verb::Hangup => xml.push_str("<Hangup/>"),
    }
}

/// Escape text for XML content and attribute values
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}

/// Callback path for the stage the next speech event belongs to
pub fn speech_callback_path(stage: Stage) -> &'static str {
    match stage {
        Stage::AwaitingClarification => CLARIFY_PATH,
        _ => GATHER_PATH,
    }
}

/// Render a routing decision into call-control instructions
///
/// Gathers post back even when nothing was heard, so silence reaches the
/// empty-transcript branch of the triage machine. A transfer without a
/// configured forward number is recorded as a voicemail instead, after the
/// apology prompt.
pub fn render_decision(
    decision: &RoutingDecision,
    triage: &TriageConfig,
    server: &ServerConfig,
    telephony: &TelephonyConfig,
) -> VoiceResponse {
    let voice = Voice::from_config(triage);
    let response = VoiceResponse::new();

    match decision.action {
        RoutingAction::GatherSpeech | RoutingAction::AskClarifyingQuestion => response
            .gather(
                server.callback_url(speech_callback_path(decision.next_stage)),
                &voice,
                &decision.caller_prompt,
            )
            .say(&voice, &triage.prompts.no_input),
        RoutingAction::Transfer => match telephony.forward_number() {
            Some(number) => response.say(&voice, &decision.caller_prompt).dial(number),
            None => {
                tracing::warn!("No forward number configured, recording voicemail instead");
                record_voicemail(response, &voice, &triage.prompts.apology, triage, server)
            }
        },
        RoutingAction::RecordVoicemail => {
            record_voicemail(response, &voice, &decision.caller_prompt, triage, server)
        }
        RoutingAction::Terminate => response.say(&voice, &decision.caller_prompt).hangup(),
    }
}

fn record_voicemail(
    response: VoiceResponse,
    voice: &Voice,
    prompt: &str,
    triage: &TriageConfig,
    server: &ServerConfig,
) -> VoiceResponse {
    response
        .say(voice, prompt)
        .record(
            server.callback_url(VOICEMAIL_SAVED_PATH),
            triage.voicemail_max_length_secs,
            triage.play_beep,
        )
        .hangup()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn voice() -> Voice {
        Voice::from_config(&TriageConfig::default())
    }

    fn telephony_with_forward() -> TelephonyConfig {
        TelephonyConfig {
            forward_number: Some("+33199999999".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape(r#"a<b>&"c'"#), "a&lt;b&gt;&amp;&quot;c&apos;");
    }

    #[test]
    fn test_gather_markup() {
        let xml = VoiceResponse::new()
            .gather("/process_gather", &voice(), "Bonjour")
            .to_xml();
        assert!(xml.contains(
            r#"<Gather input="speech" action="/process_gather" method="POST" speechTimeout="auto" actionOnEmptyResult="true"><Say voice="alice" language="fr-FR">Bonjour</Say></Gather>"#
        ));
    }

    #[test]
    fn test_render_greeting() {
        let decision = RoutingDecision::new(
            "Bonjour.",
            RoutingAction::GatherSpeech,
            Stage::AwaitingInitialSpeech,
        );
        let xml = render_decision(
            &decision,
            &TriageConfig::default(),
            &ServerConfig::default(),
            &TelephonyConfig::default(),
        )
        .to_xml();
        assert!(xml.contains(r#"action="/process_gather""#));
        assert!(xml.ends_with(
            r#"<Say voice="alice" language="fr-FR">Nous n&apos;avons pas reçu votre message. Au revoir.</Say></Response>"#
        ));
    }

    #[test]
    fn test_render_clarify_targets_clarify_endpoint() {
        let decision = RoutingDecision::new(
            "Quelqu'un est-il blessé ?",
            RoutingAction::AskClarifyingQuestion,
            Stage::AwaitingClarification,
        );
        let server = ServerConfig {
            public_base_url: Some("https://calls.example.test".to_string()),
            ..Default::default()
        };
        let xml = render_decision(
            &decision,
            &TriageConfig::default(),
            &server,
            &TelephonyConfig::default(),
        )
        .to_xml();
        assert!(xml.contains(r#"action="https://calls.example.test/process_clarify""#));
    }

    #[test]
    fn test_render_transfer() {
        let decision =
            RoutingDecision::new("Je vous transfère.", RoutingAction::Transfer, Stage::Resolved);
        let xml = render_decision(
            &decision,
            &TriageConfig::default(),
            &ServerConfig::default(),
            &telephony_with_forward(),
        )
        .to_xml();
        assert!(xml.contains("<Dial>+33199999999</Dial>"));
        assert!(!xml.contains("<Record"));
    }

    #[test]
    fn test_transfer_without_forward_number_records() {
        let decision =
            RoutingDecision::new("Je vous transfère.", RoutingAction::Transfer, Stage::Resolved);
        let xml = render_decision(
            &decision,
            &TriageConfig::default(),
            &ServerConfig::default(),
            &TelephonyConfig::default(),
        )
        .to_xml();
        assert!(!xml.contains("<Dial>"));
        assert!(xml.contains("Désolé"));
        assert!(xml.contains(
            r#"<Record action="/voicemail_saved" maxLength="120" playBeep="true"/><Hangup/>"#
        ));
    }

    #[test]
    fn test_render_terminate() {
        let decision = RoutingDecision::new("Au revoir.", RoutingAction::Terminate, Stage::Resolved);
        let xml = render_decision(
            &decision,
            &TriageConfig::default(),
            &ServerConfig::default(),
            &TelephonyConfig::default(),
        )
        .to_xml();
        assert!(xml.ends_with("Au revoir.</Say><Hangup/></Response>"));
    }
}
