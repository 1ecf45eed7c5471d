use crate::attributes::AttributesManager;
use crate::consent;
use crate::localizer::{LocaleCatalog, Localizer, VariantSelection};
use crate::service::TimerServiceFactory;
use crate::settings::SkillSettings;
use std::sync::Arc;
use ts_envelope::{RequestEnvelope, Response, ResponseBuilder};
use ts_timers::TimerService;

/// Collaborators shared by every invocation of a skill.
pub struct SkillContext {
    pub catalog: Arc<LocaleCatalog>,
    pub timer_services: Arc<dyn TimerServiceFactory>,
    pub settings: SkillSettings,
    pub variant_selection: VariantSelection,
}

/// Everything a handler sees for one request.
pub struct HandlerInput {
    pub envelope: RequestEnvelope,
    pub attributes: AttributesManager,
    pub response_builder: ResponseBuilder,
    localizer: Localizer,
    context: Arc<SkillContext>,
}

impl HandlerInput {
    pub fn new(envelope: RequestEnvelope, context: Arc<SkillContext>) -> Self {
        let attributes = AttributesManager::new(envelope.session_attributes());
        let default_locale = context.settings.default_locale.as_str();
        let localizer =
            context
                .catalog
                .localizer(default_locale, default_locale, context.variant_selection);
        Self {
            envelope,
            attributes,
            response_builder: ResponseBuilder::new(),
            localizer,
            context,
        }
    }

    pub fn settings(&self) -> &SkillSettings {
        &self.context.settings
    }

    pub fn context(&self) -> &SkillContext {
        &self.context
    }

    pub fn localizer(&self) -> &Localizer {
        &self.localizer
    }

    pub fn bind_localizer(&mut self, localizer: Localizer) {
        self.localizer = localizer;
    }

    pub fn t(&self, key: &str) -> String {
        self.localizer.t(key)
    }

    pub fn t_with(&self, key: &str, params: &[(&str, &str)]) -> String {
        self.localizer.t_with(key, params)
    }

    pub fn timer_service(&self) -> ts_timers::Result<Arc<dyn TimerService>> {
        self.context.timer_services.timer_service(&self.envelope)
    }

    /// Speaks `speech` followed by the reprompt message and keeps the
    /// session open on the reprompt.
    pub fn speak_and_reprompt(&mut self, speech: &str) -> Response {
        let reprompt = self.t("REPROMPT_MSG");
        self.response_builder
            .speak(join_speech(&[speech, reprompt.as_str()]))
            .reprompt(&reprompt)
            .get_response()
    }

    /// Consent request for requests without a consent token, when proactive
    /// checking is enabled.
    pub fn proactive_consent_request(&mut self) -> Option<Response> {
        if !self.context.settings.proactive_consent_check {
            return None;
        }
        consent::verify_consent_token(self)
    }
}

/// Joins speech fragments with single spaces, skipping empty ones.
pub fn join_speech(parts: &[&str]) -> String {
    parts
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::join_speech;

    #[test]
    fn join_speech_skips_blank_fragments() {
        assert_eq!(join_speech(&["", "Hello.", "  ", "Bye. "]), "Hello. Bye.");
        assert_eq!(join_speech(&[]), "");
    }
}
