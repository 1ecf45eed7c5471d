use super::is_intent;
use crate::error::Result;
use crate::input::HandlerInput;
use crate::operation::{OperationFailure, TimerOperation, recover};
use crate::traits::RequestHandler;
use async_trait::async_trait;
use ts_envelope::Response;
use ts_timers::{TemplateText, TimerStatus, TimerTemplate};

pub const DURATION_SLOT: &str = "duration";

pub struct SetTimerIntentHandler;

impl SetTimerIntentHandler {
    fn template_text(input: &HandlerInput, template: TimerTemplate) -> TemplateText {
        let (label, locale, text) = match template {
            TimerTemplate::Announcement => (
                "ANNOUNCEMENT_TIMER_TITLE_MSG",
                "ANNOUNCEMENT_LOCALE_MSG",
                "ANNOUNCEMENT_TEXT_MSG",
            ),
            TimerTemplate::CustomTask | TimerTemplate::PredefinedTask => {
                ("TASK_TIMER_TITLE_MSG", "TASK_LOCALE_MSG", "TASK_TEXT_MSG")
            }
        };
        TemplateText {
            label: input.t(label),
            locale: input.t(locale),
            text: input.t(text),
        }
    }

    async fn create(&self, input: &mut HandlerInput) -> std::result::Result<(), OperationFailure> {
        let service = input.timer_service()?;
        let existing = service.list_timers().await?;
        tracing::debug!(total_count = existing.total_count, "timers before create");

        let Some(duration) = input.envelope.slot_value(DURATION_SLOT) else {
            return Err(OperationFailure::PolicyRejected(
                "duration slot is missing".to_string(),
            ));
        };
        let settings = input.settings();
        let template = settings.timer_template;
        let spec = template
            .build(
                duration,
                Self::template_text(input, template),
                &settings.custom_task,
            )
            .map_err(|e| OperationFailure::PolicyRejected(e.to_string()))?;

        let timer = service.create_timer(&spec).await?;
        if timer.status != TimerStatus::On {
            return Err(OperationFailure::PolicyRejected(format!(
                "timer {} did not start (status {})",
                timer.id, timer.status
            )));
        }
        tracing::info!(timer_id = %timer.id, %template, "timer created");
        input.attributes.set_last_timer_id(&timer.id);
        Ok(())
    }
}

#[async_trait]
impl RequestHandler for SetTimerIntentHandler {
    fn name(&self) -> &'static str {
        "set_timer"
    }

    fn can_handle(&self, input: &HandlerInput) -> bool {
        is_intent(input, "SetTimerIntent")
    }

    #[tracing::instrument(level = "info", skip_all)]
    async fn handle(&self, input: &mut HandlerInput) -> Result<Response> {
        if let Some(response) = input.proactive_consent_request() {
            return Ok(response);
        }
        Ok(match self.create(input).await {
            Ok(()) => {
                let created = input.t("CREATE_TIMER_OK_MSG");
                input.speak_and_reprompt(&created)
            }
            Err(failure) => recover(input, TimerOperation::Create, failure),
        })
    }
}
