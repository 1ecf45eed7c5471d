use crate::error::SkillError;
use crate::input::HandlerInput;
use crate::traits::ErrorHandler;
use async_trait::async_trait;
use ts_envelope::Response;

/// Catch-all: apologizes and keeps the session open.
pub struct GenericErrorHandler;

#[async_trait]
impl ErrorHandler for GenericErrorHandler {
    fn can_handle(&self, _input: &HandlerInput, _error: &SkillError) -> bool {
        true
    }

    async fn handle(&self, input: &mut HandlerInput, error: &SkillError) -> Response {
        tracing::error!(
            error = %error,
            request_type = input.envelope.request_type(),
            intent = input.envelope.intent_name().unwrap_or_default(),
            "request failed"
        );
        let apology = input.t("ERROR_MSG");
        input
            .response_builder
            .speak(&apology)
            .reprompt(&apology)
            .get_response()
    }
}
