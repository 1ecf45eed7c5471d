//! Pause every running timer, or resume every paused one.

use super::is_intent;
use crate::error::Result;
use crate::input::HandlerInput;
use crate::operation::{OperationFailure, TimerOperation, recover};
use crate::traits::RequestHandler;
use async_trait::async_trait;
use ts_envelope::Response;
use ts_timers::TimerStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Transition {
    Pause,
    Resume,
}

impl Transition {
    fn operation(self) -> TimerOperation {
        match self {
            Self::Pause => TimerOperation::Pause,
            Self::Resume => TimerOperation::Resume,
        }
    }

    /// Timers in this state are the ones the transition applies to.
    fn from_status(self) -> TimerStatus {
        match self {
            Self::Pause => TimerStatus::On,
            Self::Resume => TimerStatus::Paused,
        }
    }

    fn ok_key(self) -> &'static str {
        match self {
            Self::Pause => "PAUSE_TIMER_OK_MSG",
            Self::Resume => "RESUME_TIMER_OK_MSG",
        }
    }
}

/// Applies `kind` to each listed timer it covers, one at a time.
/// Returns the message key to speak.
async fn transition(
    input: &HandlerInput,
    kind: Transition,
) -> std::result::Result<&'static str, OperationFailure> {
    let service = input.timer_service()?;
    let list = service.list_timers().await?;
    if list.total_count == 0 {
        return Ok("NO_TIMER_MSG");
    }
    let from = kind.from_status();
    for timer in list.timers.iter().filter(|t| t.status == from) {
        match kind {
            Transition::Pause => service.pause_timer(&timer.id).await?,
            Transition::Resume => service.resume_timer(&timer.id).await?,
        }
        tracing::debug!(
            timer_id = %timer.id,
            operation = kind.operation().as_str(),
            "timer updated"
        );
    }
    Ok(kind.ok_key())
}

async fn respond(input: &mut HandlerInput, kind: Transition) -> Response {
    if let Some(response) = input.proactive_consent_request() {
        return response;
    }
    match transition(input, kind).await {
        Ok(key) => {
            let speech = input.t(key);
            input.speak_and_reprompt(&speech)
        }
        Err(failure) => recover(input, kind.operation(), failure),
    }
}

pub struct PauseTimerIntentHandler;

#[async_trait]
impl RequestHandler for PauseTimerIntentHandler {
    fn name(&self) -> &'static str {
        "pause_timer"
    }

    fn can_handle(&self, input: &HandlerInput) -> bool {
        is_intent(input, "AMAZON.PauseIntent")
    }

    #[tracing::instrument(level = "info", skip_all)]
    async fn handle(&self, input: &mut HandlerInput) -> Result<Response> {
        Ok(respond(input, Transition::Pause).await)
    }
}

pub struct ResumeTimerIntentHandler;

#[async_trait]
impl RequestHandler for ResumeTimerIntentHandler {
    fn name(&self) -> &'static str {
        "resume_timer"
    }

    fn can_handle(&self, input: &HandlerInput) -> bool {
        is_intent(input, "AMAZON.ResumeIntent")
    }

    #[tracing::instrument(level = "info", skip_all)]
    async fn handle(&self, input: &mut HandlerInput) -> Result<Response> {
        Ok(respond(input, Transition::Resume).await)
    }
}

#[cfg(test)]
mod tests {
    use super::Transition;
    use crate::operation::TimerOperation;
    use crate::testing::{FakeTimerService, intent_envelope, test_skill};
    use ts_timers::TimerStatus;

    #[test]
    fn transitions_map_to_their_own_operation_and_state() {
        assert_eq!(Transition::Pause.operation(), TimerOperation::Pause);
        assert_eq!(Transition::Pause.from_status(), TimerStatus::On);
        assert_eq!(Transition::Pause.ok_key(), "PAUSE_TIMER_OK_MSG");
        assert_eq!(Transition::Resume.operation(), TimerOperation::Resume);
        assert_eq!(Transition::Resume.from_status(), TimerStatus::Paused);
        assert_eq!(Transition::Resume.ok_key(), "RESUME_TIMER_OK_MSG");
    }

    fn mixed() -> FakeTimerService {
        FakeTimerService::with_timers(&[("1", TimerStatus::On), ("2", TimerStatus::Paused)])
    }

    #[tokio::test]
    async fn pause_touches_only_running_timers() {
        let fake = mixed();
        let out = test_skill(fake.clone())
            .invoke(intent_envelope("AMAZON.PauseIntent", &[]))
            .await
            .expect("invoke");
        assert_eq!(fake.calls(), vec!["list", "pause:1"]);
        assert_eq!(
            out.response.speech_text(),
            Some("Your timer is paused. What else would you like to do?")
        );
    }

    #[tokio::test]
    async fn resume_touches_only_paused_timers() {
        let fake = mixed();
        let out = test_skill(fake.clone())
            .invoke(intent_envelope("AMAZON.ResumeIntent", &[]))
            .await
            .expect("invoke");
        assert_eq!(fake.calls(), vec!["list", "resume:2"]);
        assert_eq!(
            out.response.speech_text(),
            Some("Your timer is running again. What else would you like to do?")
        );
    }

    #[tokio::test]
    async fn no_timers_means_no_calls_beyond_list() {
        for intent in ["AMAZON.PauseIntent", "AMAZON.ResumeIntent"] {
            let fake = FakeTimerService::new();
            let out = test_skill(fake.clone())
                .invoke(intent_envelope(intent, &[]))
                .await
                .expect("invoke");
            assert_eq!(fake.calls(), vec!["list"]);
            assert_eq!(
                out.response.speech_text(),
                Some("You don't have any timers right now. What else would you like to do?")
            );
        }
    }

    #[tokio::test]
    async fn failures_speak_the_operation_error() {
        let out = test_skill(mixed().fail("pause", 500))
            .invoke(intent_envelope("AMAZON.PauseIntent", &[]))
            .await
            .expect("invoke");
        assert_eq!(
            out.response.speech_text(),
            Some("Sorry, I couldn't pause the timer. What else would you like to do?")
        );

        let out = test_skill(mixed().fail("resume", 500))
            .invoke(intent_envelope("AMAZON.ResumeIntent", &[]))
            .await
            .expect("invoke");
        assert_eq!(
            out.response.speech_text(),
            Some("Sorry, I couldn't resume the timer. What else would you like to do?")
        );
    }
}
