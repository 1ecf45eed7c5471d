use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum OutputSpeech {
    #[serde(rename = "SSML")]
    Ssml { ssml: String },
    PlainText { text: String },
}

impl OutputSpeech {
    fn ssml(text: &str) -> Self {
        Self::Ssml {
            ssml: format!("<speak>{}</speak>", strip_speak_tags(text)),
        }
    }

    /// Spoken text without the surrounding `<speak>` element.
    pub fn text(&self) -> &str {
        match self {
            Self::Ssml { ssml } => strip_speak_tags(ssml),
            Self::PlainText { text } => text,
        }
    }
}

fn strip_speak_tags(text: &str) -> &str {
    let trimmed = text.trim();
    trimmed
        .strip_prefix("<speak>")
        .and_then(|rest| rest.strip_suffix("</speak>"))
        .unwrap_or(trimmed)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reprompt {
    pub output_speech: OutputSpeech,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Card {
    /// Durable card in the companion app asking the user to grant scopes.
    AskForPermissionsConsent { permissions: Vec<String> },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Directive {
    #[serde(rename = "Connections.SendRequest")]
    ConnectionsSendRequest {
        name: String,
        payload: serde_json::Value,
        token: String,
    },
}

impl Directive {
    /// Voice consent request for a single permission scope.
    pub fn ask_for_permissions_consent(scope: &str, token: &str) -> Self {
        Self::ConnectionsSendRequest {
            name: "AskFor".to_string(),
            payload: serde_json::json!({
                "@type": "AskForPermissionsConsentRequest",
                "@version": "1",
                "permissionScope": scope,
            }),
            token: token.to_string(),
        }
    }

    pub fn is_consent_request(&self) -> bool {
        match self {
            Self::ConnectionsSendRequest { name, payload, .. } => {
                name == "AskFor"
                    && payload.get("@type").and_then(|v| v.as_str())
                        == Some("AskForPermissionsConsentRequest")
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_speech: Option<OutputSpeech>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reprompt: Option<Reprompt>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card: Option<Card>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub directives: Vec<Directive>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub should_end_session: Option<bool>,
}

impl Response {
    pub fn speech_text(&self) -> Option<&str> {
        self.output_speech.as_ref().map(OutputSpeech::text)
    }

    pub fn reprompt_text(&self) -> Option<&str> {
        self.reprompt.as_ref().map(|r| r.output_speech.text())
    }

    pub fn consent_request(&self) -> Option<&Directive> {
        self.directives.iter().find(|d| d.is_consent_request())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseEnvelope {
    pub version: String,
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub session_attributes: serde_json::Map<String, serde_json::Value>,
    pub response: Response,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
}

impl ResponseEnvelope {
    pub fn new(
        response: Response,
        session_attributes: serde_json::Map<String, serde_json::Value>,
    ) -> Self {
        Self {
            version: "1.0".to_string(),
            session_attributes,
            response,
            user_agent: None,
        }
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }
}

/// Accumulates one response. Setters overwrite, except directives which are
/// appended; a second consent request within the same response is dropped.
#[derive(Debug, Clone, Default)]
pub struct ResponseBuilder {
    response: Response,
}

impl ResponseBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn speak(&mut self, text: impl AsRef<str>) -> &mut Self {
        self.response.output_speech = Some(OutputSpeech::ssml(text.as_ref()));
        self
    }

    /// Sets the reprompt; a reprompt keeps the session open.
    pub fn reprompt(&mut self, text: impl AsRef<str>) -> &mut Self {
        self.response.reprompt = Some(Reprompt {
            output_speech: OutputSpeech::ssml(text.as_ref()),
        });
        self.response.should_end_session = Some(false);
        self
    }

    pub fn with_should_end_session(&mut self, end: bool) -> &mut Self {
        self.response.should_end_session = Some(end);
        self
    }

    pub fn with_ask_for_permissions_consent_card(&mut self, permissions: &[&str]) -> &mut Self {
        self.response.card = Some(Card::AskForPermissionsConsent {
            permissions: permissions.iter().map(|p| p.to_string()).collect(),
        });
        self
    }

    pub fn add_directive(&mut self, directive: Directive) -> &mut Self {
        if directive.is_consent_request() && self.response.consent_request().is_some() {
            tracing::warn!("consent request already attached to response; dropping duplicate");
            return self;
        }
        self.response.directives.push(directive);
        self
    }

    pub fn get_response(&self) -> Response {
        self.response.clone()
    }
}
