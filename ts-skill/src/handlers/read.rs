use super::is_intent;
use crate::error::Result;
use crate::input::{HandlerInput, join_speech};
use crate::operation::{OperationFailure, TimerOperation, recover};
use crate::traits::RequestHandler;
use async_trait::async_trait;
use ts_envelope::Response;

pub struct ReadTimerIntentHandler;

impl ReadTimerIntentHandler {
    /// Speech for the remembered timer, or the first listed one.
    async fn read(&self, input: &HandlerInput) -> std::result::Result<String, OperationFailure> {
        let service = input.timer_service()?;
        let list = service.list_timers().await?;
        let count = list.total_count;
        let preface = if count > 0 {
            input.t_with("TIMER_COUNT_MSG", &[("count", count.to_string().as_str())])
        } else {
            String::new()
        };

        let remembered = input.attributes.last_timer_id();
        if remembered.is_none() && count == 0 {
            return Ok(join_speech(&[preface.as_str(), input.t("NO_TIMER_MSG").as_str()]));
        }
        let id = match remembered {
            Some(id) => id,
            None => list.timers.first().map(|t| t.id.clone()).ok_or_else(|| {
                OperationFailure::PolicyRejected(format!(
                    "service reported {count} timers but listed none"
                ))
            })?,
        };

        let timer = service.get_timer(&id).await?;
        tracing::debug!(timer_id = %timer.id, status = %timer.status, "timer read");
        let status = input.t(&format!("{}_TIMER_STATUS_MSG", timer.status));
        let last = input.t_with("LAST_TIMER_MSG", &[("status", status.as_str())]);
        Ok(join_speech(&[preface.as_str(), last.as_str()]))
    }
}

#[async_trait]
impl RequestHandler for ReadTimerIntentHandler {
    fn name(&self) -> &'static str {
        "read_timer"
    }

    fn can_handle(&self, input: &HandlerInput) -> bool {
        is_intent(input, "ReadTimerIntent")
    }

    #[tracing::instrument(level = "info", skip_all)]
    async fn handle(&self, input: &mut HandlerInput) -> Result<Response> {
        if let Some(response) = input.proactive_consent_request() {
            return Ok(response);
        }
        Ok(match self.read(input).await {
            Ok(speech) => input.speak_and_reprompt(&speech),
            Err(failure) => recover(input, TimerOperation::Read, failure),
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::testing::{
        FakeTimerService, intent_envelope, intent_envelope_with_attributes, test_skill,
    };
    use serde_json::json;
    use ts_timers::TimerStatus;

    #[tokio::test]
    async fn reads_first_listed_timer_with_count_preface() {
        let fake = FakeTimerService::with_timers(&[("t2", TimerStatus::On)])
            .get_returns("t2", TimerStatus::Paused);
        let skill = test_skill(fake.clone());

        let out = skill
            .invoke(intent_envelope("ReadTimerIntent", &[]))
            .await
            .expect("invoke");

        assert_eq!(fake.calls(), vec!["list", "get:t2"]);
        assert_eq!(
            out.response.speech_text(),
            Some("You have 1 timers. Your timer is paused. What else would you like to do?")
        );
    }

    #[tokio::test]
    async fn remembered_id_wins_over_listing() {
        let fake = FakeTimerService::with_timers(&[
            ("t1", TimerStatus::On),
            ("t2", TimerStatus::Paused),
        ]);
        let skill = test_skill(fake.clone());

        let out = skill
            .invoke(intent_envelope_with_attributes(
                "ReadTimerIntent",
                &[],
                json!({ "lastTimerId": "t2" }),
            ))
            .await
            .expect("invoke");

        assert_eq!(fake.calls(), vec!["list", "get:t2"]);
        assert_eq!(out.session_attributes["lastTimerId"], "t2");
        assert!(
            out.response
                .speech_text()
                .expect("speech")
                .contains("Your timer is paused.")
        );
    }

    #[tokio::test]
    async fn empty_list_speaks_no_timer_without_preface() {
        let fake = FakeTimerService::new();
        let skill = test_skill(fake.clone());

        let out = skill
            .invoke(intent_envelope("ReadTimerIntent", &[]))
            .await
            .expect("invoke");

        assert_eq!(fake.calls(), vec!["list"]);
        assert_eq!(
            out.response.speech_text(),
            Some("You don't have any timers right now. What else would you like to do?")
        );
    }

    #[tokio::test]
    async fn reading_twice_speaks_the_same_status() {
        let fake = FakeTimerService::with_timers(&[("t1", TimerStatus::On)]);
        let skill = test_skill(fake);

        let first = skill
            .invoke(intent_envelope("ReadTimerIntent", &[]))
            .await
            .expect("first read");
        let second = skill
            .invoke(intent_envelope("ReadTimerIntent", &[]))
            .await
            .expect("second read");
        assert_eq!(first.response.speech_text(), second.response.speech_text());
    }

    #[tokio::test]
    async fn failures_speak_read_error_or_ask_for_consent() {
        let fake = FakeTimerService::with_timers(&[("t1", TimerStatus::On)]).fail("get", 500);
        let out = test_skill(fake)
            .invoke(intent_envelope("ReadTimerIntent", &[]))
            .await
            .expect("invoke");
        assert_eq!(
            out.response.speech_text(),
            Some("Sorry, I couldn't read your timers. What else would you like to do?")
        );
        assert!(out.response.consent_request().is_none());

        let fake = FakeTimerService::new().fail("list", 401);
        let out = test_skill(fake)
            .invoke(intent_envelope("ReadTimerIntent", &[]))
            .await
            .expect("invoke");
        assert!(out.response.consent_request().is_some());
    }

    #[tokio::test]
    async fn count_without_listed_timers_speaks_read_error() {
        let fake = FakeTimerService::new().report_total_count(2);
        let out = test_skill(fake.clone())
            .invoke(intent_envelope("ReadTimerIntent", &[]))
            .await
            .expect("invoke");

        assert_eq!(fake.calls(), vec!["list"]);
        assert_eq!(
            out.response.speech_text(),
            Some("Sorry, I couldn't read your timers. What else would you like to do?")
        );
        assert!(out.response.consent_request().is_none());
    }

    #[tokio::test]
    async fn remembered_id_is_read_even_when_list_is_empty() {
        let fake = FakeTimerService::new().get_returns("t9", TimerStatus::Off);
        let out = test_skill(fake.clone())
            .invoke(intent_envelope_with_attributes(
                "ReadTimerIntent",
                &[],
                json!({ "lastTimerId": "t9" }),
            ))
            .await
            .expect("invoke");

        assert_eq!(fake.calls(), vec!["list", "get:t9"]);
        assert_eq!(
            out.response.speech_text(),
            Some("Your timer is off. What else would you like to do?")
        );
    }
}
