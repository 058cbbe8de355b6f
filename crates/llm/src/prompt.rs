//! Chat messages and the urgency classification prompt

use serde::{Deserialize, Serialize};
use std::fmt;

/// Message role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Chat message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

const SYSTEM_PROMPT: &str = "Assistant: classification d'urgence (FR).";

const INSTRUCTIONS: &str = "Vous êtes un classifieur d'urgence et agent de clarification (français). \
Répondez STRICTEMENT en JSON:\n\
{ \"label\":\"urgent\"|\"non-urgent\"|\"clarify\", \"confidence\":0.00-1.00, \"reason\":\"...\", \"clarifyQuestion\":\"...\" }";

/// Caps the quoted caller text so one long utterance cannot blow up the prompt
const MAX_QUOTED_CHARS: usize = 1000;

/// Builds the two-message classification conversation
#[derive(Debug, Default, Clone)]
pub struct ClassificationPrompt;

impl ClassificationPrompt {
    pub fn new() -> Self {
        Self
    }

    /// Messages for one classification request
    pub fn build(&self, transcript: &str, context: &str) -> Vec<Message> {
        let user = format!(
            "{}\nTexte: \"{}\"\nContexte: \"{}\"",
            INSTRUCTIONS,
            quote(transcript),
            quote(context)
        );
        vec![Message::system(SYSTEM_PROMPT), Message::user(user)]
    }
}

/// Bound and neutralize text embedded between double quotes
fn quote(text: &str) -> String {
    text.chars()
        .take(MAX_QUOTED_CHARS)
        .map(|c| match c {
            '"' => '\'',
            '\n' | '\r' => ' ',
            other => other,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_messages() {
        let messages = ClassificationPrompt::new().build("au feu", "from:+33600000000");
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, Role::System);
        assert_eq!(messages[1].role, Role::User);
        assert!(messages[1].content.contains("Texte: \"au feu\""));
        assert!(messages[1].content.contains("Contexte: \"from:+33600000000\""));
        assert!(messages[1].content.contains("\"clarify\""));
    }

    #[test]
    fn test_quoted_text_is_bounded() {
        let long = "a".repeat(5000);
        let messages = ClassificationPrompt::new().build(&long, "");
        assert!(messages[1].content.len() < 2000);
    }

    #[test]
    fn test_quotes_do_not_escape() {
        let messages = ClassificationPrompt::new().build("il a dit \"urgent\"\n", "");
        assert!(messages[1].content.contains("Texte: \"il a dit 'urgent' \""));
    }
}
