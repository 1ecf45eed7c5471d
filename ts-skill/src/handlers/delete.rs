use super::is_intent;
use crate::error::Result;
use crate::input::HandlerInput;
use crate::operation::{OperationFailure, TimerOperation, recover};
use crate::traits::RequestHandler;
use async_trait::async_trait;
use ts_envelope::Response;

pub struct DeleteTimerIntentHandler;

impl DeleteTimerIntentHandler {
    async fn delete(&self, input: &HandlerInput) -> std::result::Result<&'static str, OperationFailure> {
        let service = input.timer_service()?;
        let list = service.list_timers().await?;
        if list.total_count == 0 {
            return Ok("NO_TIMER_MSG");
        }
        match input.attributes.last_timer_id() {
            Some(id) => service.delete_timer(&id).await?,
            None => {
                // Without a remembered id every timer of this skill goes.
                tracing::warn!(
                    total_count = list.total_count,
                    "no remembered timer; deleting all timers"
                );
                service.delete_all_timers().await?
            }
        }
        Ok("DELETE_TIMER_OK_MSG")
    }
}

#[async_trait]
impl RequestHandler for DeleteTimerIntentHandler {
    fn name(&self) -> &'static str {
        "delete_timer"
    }

    fn can_handle(&self, input: &HandlerInput) -> bool {
        is_intent(input, "DeleteTimerIntent")
    }

    #[tracing::instrument(level = "info", skip_all)]
    async fn handle(&self, input: &mut HandlerInput) -> Result<Response> {
        if let Some(response) = input.proactive_consent_request() {
            return Ok(response);
        }
        Ok(match self.delete(input).await {
            Ok(key) => {
                let speech = input.t(key);
                input.speak_and_reprompt(&speech)
            }
            Err(failure) => recover(input, TimerOperation::Delete, failure),
        })
    }
}
