use super::is_intent;
use crate::error::Result;
use crate::input::HandlerInput;
use crate::traits::RequestHandler;
use async_trait::async_trait;
use ts_envelope::{RequestKind, Response};

pub struct LaunchRequestHandler;

#[async_trait]
impl RequestHandler for LaunchRequestHandler {
    fn name(&self) -> &'static str {
        "launch"
    }

    fn can_handle(&self, input: &HandlerInput) -> bool {
        matches!(input.envelope.request.kind, RequestKind::LaunchRequest)
    }

    async fn handle(&self, input: &mut HandlerInput) -> Result<Response> {
        let welcome = input.t("WELCOME_MSG");
        Ok(input
            .response_builder
            .speak(&welcome)
            .reprompt(&welcome)
            .get_response())
    }
}

pub struct HelpIntentHandler;

#[async_trait]
impl RequestHandler for HelpIntentHandler {
    fn name(&self) -> &'static str {
        "help"
    }

    fn can_handle(&self, input: &HandlerInput) -> bool {
        is_intent(input, "AMAZON.HelpIntent")
    }

    async fn handle(&self, input: &mut HandlerInput) -> Result<Response> {
        let help = input.t("HELP_MSG");
        Ok(input
            .response_builder
            .speak(&help)
            .reprompt(&help)
            .get_response())
    }
}

pub struct CancelAndStopIntentHandler;

#[async_trait]
impl RequestHandler for CancelAndStopIntentHandler {
    fn name(&self) -> &'static str {
        "cancel_and_stop"
    }

    fn can_handle(&self, input: &HandlerInput) -> bool {
        is_intent(input, "AMAZON.CancelIntent") || is_intent(input, "AMAZON.StopIntent")
    }

    async fn handle(&self, input: &mut HandlerInput) -> Result<Response> {
        let goodbye = input.t("GOODBYE_MSG");
        Ok(input
            .response_builder
            .speak(&goodbye)
            .with_should_end_session(true)
            .get_response())
    }
}

pub struct SessionEndedRequestHandler;

#[async_trait]
impl RequestHandler for SessionEndedRequestHandler {
    fn name(&self) -> &'static str {
        "session_ended"
    }

    fn can_handle(&self, input: &HandlerInput) -> bool {
        matches!(
            input.envelope.request.kind,
            RequestKind::SessionEndedRequest { .. }
        )
    }

    async fn handle(&self, input: &mut HandlerInput) -> Result<Response> {
        if let RequestKind::SessionEndedRequest { reason, error } = &input.envelope.request.kind {
            match error {
                Some(error) => tracing::warn!(
                    reason = reason.as_deref().unwrap_or_default(),
                    error_type = %error.error_type,
                    message = %error.message,
                    "session ended with error"
                ),
                None => tracing::info!(
                    reason = reason.as_deref().unwrap_or_default(),
                    "session ended"
                ),
            }
        }
        Ok(input.response_builder.get_response())
    }
}

/// Echoes any intent no other handler claimed.
pub struct IntentReflectorHandler;

#[async_trait]
impl RequestHandler for IntentReflectorHandler {
    fn name(&self) -> &'static str {
        "intent_reflector"
    }

    fn can_handle(&self, input: &HandlerInput) -> bool {
        input.envelope.intent().is_some()
    }

    async fn handle(&self, input: &mut HandlerInput) -> Result<Response> {
        let intent = input.envelope.intent_name().unwrap_or_default().to_string();
        let speech = input.t_with("REFLECTOR_MSG", &[("intent", intent.as_str())]);
        Ok(input.response_builder.speak(&speech).get_response())
    }
}

pub struct UnsupportedRequestHandler;

#[async_trait]
impl RequestHandler for UnsupportedRequestHandler {
    fn name(&self) -> &'static str {
        "unsupported"
    }

    fn can_handle(&self, input: &HandlerInput) -> bool {
        matches!(
            input.envelope.request.kind,
            RequestKind::Unsupported | RequestKind::ConnectionsResponse { .. }
        )
    }

    async fn handle(&self, input: &mut HandlerInput) -> Result<Response> {
        tracing::warn!(
            request_type = input.envelope.request_type(),
            connections_name = input.envelope.connections_name().unwrap_or_default(),
            "ignoring unsupported request"
        );
        Ok(input.response_builder.get_response())
    }
}
