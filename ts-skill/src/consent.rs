//! Voice permission consent.
//!
//! The timers API needs the user to grant [`TIMERS_PERMISSION`]. The skill
//! asks with a `Connections.SendRequest` directive named `AskFor`; the
//! platform answers later with a `Connections.Response` of the same name,
//! handled by [`AskForResponseHandler`].

use crate::error::Result;
use crate::input::{HandlerInput, join_speech};
use crate::traits::RequestHandler;
use async_trait::async_trait;
use ts_envelope::{Directive, RequestKind, Response};

pub const TIMERS_PERMISSION: &str = "alexa::alerts:timers:skill:readwrite";
pub const ASK_FOR: &str = "AskFor";
const CONSENT_TOKEN: &str = "verifier";

pub fn consent_directive() -> Directive {
    Directive::ask_for_permissions_consent(TIMERS_PERMISSION, CONSENT_TOKEN)
}

/// Response carrying only the consent request directive.
pub fn consent_request(input: &mut HandlerInput) -> Response {
    input
        .response_builder
        .add_directive(consent_directive())
        .get_response()
}

/// Returns a consent request when the user's permission record has no
/// consent token, `None` when the call may proceed.
pub fn verify_consent_token(input: &mut HandlerInput) -> Option<Response> {
    if input.envelope.consent_token().is_some() {
        return None;
    }
    tracing::info!("no consent token on request; asking for timers permission");
    Some(consent_request(input))
}

/// What the user answered, as reported in the connections payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsentOutcome {
    Accepted,
    Denied,
    NotAnswered,
    Unknown,
}

impl ConsentOutcome {
    fn parse(status: Option<&str>) -> Self {
        match status {
            Some("ACCEPTED") => Self::Accepted,
            Some("DENIED") => Self::Denied,
            Some("NOT_ANSWERED") => Self::NotAnswered,
            _ => Self::Unknown,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsentDecision {
    Accepted,
    /// Not accepted; `send_card` when no permissions card was shown yet.
    Declined {
        outcome: ConsentOutcome,
        send_card: bool,
    },
    /// The scope is missing from the skill manifest.
    ScopeNotDeclared,
    /// Platform-side failure; the user may try again.
    Retryable,
    Failed,
}

pub fn decide(code: &str, payload: &serde_json::Value) -> ConsentDecision {
    match code.trim() {
        "200" => {
            let outcome = ConsentOutcome::parse(payload.get("status").and_then(|v| v.as_str()));
            if outcome == ConsentOutcome::Accepted {
                return ConsentDecision::Accepted;
            }
            let card_thrown = payload
                .get("isCardThrown")
                .and_then(|v| v.as_bool())
                .unwrap_or(false);
            ConsentDecision::Declined {
                outcome,
                send_card: !card_thrown,
            }
        }
        "400" => ConsentDecision::ScopeNotDeclared,
        "500" => ConsentDecision::Retryable,
        _ => ConsentDecision::Failed,
    }
}

pub struct AskForResponseHandler;

#[async_trait]
impl RequestHandler for AskForResponseHandler {
    fn name(&self) -> &'static str {
        "ask_for_response"
    }

    fn can_handle(&self, input: &HandlerInput) -> bool {
        input.envelope.connections_name() == Some(ASK_FOR)
    }

    #[tracing::instrument(level = "info", skip_all)]
    async fn handle(&self, input: &mut HandlerInput) -> Result<Response> {
        let RequestKind::ConnectionsResponse {
            status, payload, ..
        } = &input.envelope.request.kind
        else {
            return Ok(input.response_builder.get_response());
        };
        let decision = decide(&status.code, payload);
        let status_message = status.message.clone().unwrap_or_default();
        tracing::info!(code = %status.code, ?decision, "consent response received");

        let response = match decision {
            ConsentDecision::Accepted => {
                let accepted = input.t("VOICE_PERMISSION_ACCEPTED");
                input.speak_and_reprompt(&accepted)
            }
            ConsentDecision::Declined { outcome, send_card } => {
                tracing::info!(?outcome, send_card, "timers permission not granted");
                let denied = input.t("VOICE_PERMISSION_DENIED");
                let goodbye = input.t("GOODBYE_MSG");
                let card = if send_card {
                    input.t("PERMISSIONS_CARD_MSG")
                } else {
                    String::new()
                };
                if send_card {
                    input
                        .response_builder
                        .with_ask_for_permissions_consent_card(&[TIMERS_PERMISSION]);
                }
                input
                    .response_builder
                    .speak(join_speech(&[denied.as_str(), goodbye.as_str(), card.as_str()]))
                    .with_should_end_session(true)
                    .get_response()
            }
            ConsentDecision::Retryable => {
                let error = input.t("VOICE_PERMISSION_ERROR");
                input.speak_and_reprompt(&error)
            }
            ConsentDecision::ScopeNotDeclared | ConsentDecision::Failed => {
                if decision == ConsentDecision::ScopeNotDeclared {
                    tracing::error!(
                        scope = TIMERS_PERMISSION,
                        "consent request rejected; the permission is not declared in the skill manifest"
                    );
                }
                tracing::warn!(message = %status_message, "consent request failed");
                let error = input.t("VOICE_PERMISSION_ERROR");
                let goodbye = input.t("GOODBYE_MSG");
                input
                    .response_builder
                    .speak(join_speech(&[error.as_str(), goodbye.as_str()]))
                    .with_should_end_session(true)
                    .get_response()
            }
        };
        Ok(response)
    }
}
