use serde::{Deserialize, Serialize};

/// A conversation the backend has saved for the current identity.
///
/// The store sends its document id as `_id`; plain `id` is accepted too so
/// fixtures and alternative backends don't need the underscore.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SavedConversation {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub question: String,
    pub answer: String,
}

/// Display identity for the sidebar header.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    pub name: String,
    pub email: String,
}

impl UserProfile {
    pub const PLACEHOLDER_NAME: &'static str = "User";
    pub const PLACEHOLDER_EMAIL: &'static str = "No email";

    /// Shown whenever the profile can't be fetched.
    pub fn placeholder() -> Self {
        Self {
            name: Self::PLACEHOLDER_NAME.to_string(),
            email: Self::PLACEHOLDER_EMAIL.to_string(),
        }
    }
}

impl Default for UserProfile {
    fn default() -> Self {
        Self::placeholder()
    }
}

// ============================================================================
// Wire Types
// ============================================================================

/// Body of a question sent to the answering service.
#[derive(Serialize, Debug)]
pub(crate) struct AnswerRequest<'a> {
    #[serde(rename = "inputText")]
    pub input_text: &'a str,
}

/// Answering service response.
///
/// Either the flat `{text}` shape or the upstream model's candidate envelope,
/// which some deployments pass straight through.
#[derive(Deserialize, Debug)]
#[serde(untagged)]
pub(crate) enum AnswerEnvelope {
    Plain { text: String },
    Candidates { candidates: Vec<Candidate> },
}

#[derive(Deserialize, Debug)]
pub(crate) struct Candidate {
    pub content: CandidateContent,
}

#[derive(Deserialize, Debug)]
pub(crate) struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<CandidatePart>,
}

#[derive(Deserialize, Debug)]
pub(crate) struct CandidatePart {
    #[serde(default)]
    pub text: String,
}

impl AnswerEnvelope {
    /// Extracts the answer text. `None` when the envelope carries no candidate.
    pub fn into_text(self) -> Option<String> {
        match self {
            AnswerEnvelope::Plain { text } => Some(text),
            AnswerEnvelope::Candidates { candidates } => candidates
                .into_iter()
                .next()
                .and_then(|c| c.content.parts.into_iter().next())
                .map(|p| p.text),
        }
    }
}

/// `GET /userdata/{id}` response.
#[derive(Deserialize, Debug)]
pub(crate) struct UserDataResponse {
    #[serde(default)]
    pub success: bool,
    pub user: Option<UserRecord>,
}

#[derive(Deserialize, Debug)]
pub(crate) struct UserRecord {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

impl UserRecord {
    /// Missing or empty fields fall back to the placeholder values.
    pub fn into_profile(self) -> UserProfile {
        fn or_placeholder(value: Option<String>, placeholder: &str) -> String {
            value
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| placeholder.to_string())
        }
        UserProfile {
            name: or_placeholder(self.name, UserProfile::PLACEHOLDER_NAME),
            email: or_placeholder(self.email, UserProfile::PLACEHOLDER_EMAIL),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_saved_conversation_accepts_underscore_id() {
        let json = r#"[{"_id":"42","question":"Q","answer":"A"}]"#;
        let parsed: Vec<SavedConversation> = serde_json::from_str(json).unwrap();
        assert_eq!(parsed[0].id, "42");
        assert_eq!(parsed[0].question, "Q");
    }

    #[test]
    fn test_saved_conversation_accepts_plain_id() {
        let json = r#"{"id":"7","question":"Q","answer":"A"}"#;
        let parsed: SavedConversation = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.id, "7");
    }

    #[test]
    fn test_answer_request_uses_input_text_key() {
        let body = serde_json::to_value(AnswerRequest { input_text: "Hello" }).unwrap();
        assert_eq!(body, serde_json::json!({"inputText": "Hello"}));
    }

    #[test]
    fn test_plain_envelope() {
        let env: AnswerEnvelope = serde_json::from_str(r#"{"text":"Hi there"}"#).unwrap();
        assert_eq!(env.into_text().as_deref(), Some("Hi there"));
    }

    #[test]
    fn test_candidate_envelope_takes_first_part() {
        let json = r#"{"candidates":[{"content":{"parts":[{"text":"first"},{"text":"second"}]}}]}"#;
        let env: AnswerEnvelope = serde_json::from_str(json).unwrap();
        assert_eq!(env.into_text().as_deref(), Some("first"));
    }

    #[test]
    fn test_empty_candidates_yield_none() {
        let env: AnswerEnvelope = serde_json::from_str(r#"{"candidates":[]}"#).unwrap();
        assert!(env.into_text().is_none());
    }

    #[test]
    fn test_user_record_blank_fields_use_placeholder() {
        let record = UserRecord {
            name: Some("".to_string()),
            email: None,
        };
        assert_eq!(record.into_profile(), UserProfile::placeholder());
    }

    #[test]
    fn test_user_record_keeps_real_values() {
        let record = UserRecord {
            name: Some("Ada".to_string()),
            email: Some("ada@example.com".to_string()),
        };
        let profile = record.into_profile();
        assert_eq!(profile.name, "Ada");
        assert_eq!(profile.email, "ada@example.com");
    }
}
