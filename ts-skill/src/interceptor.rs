use crate::error::{Result, SkillError};
use crate::input::HandlerInput;
use crate::traits::RequestInterceptor;
use async_trait::async_trait;

/// Binds a localizer for the request locale, or the default locale when the
/// request carries none.
pub struct LocalizationInterceptor;

#[async_trait]
impl RequestInterceptor for LocalizationInterceptor {
    async fn process(&self, input: &mut HandlerInput) -> Result<()> {
        let context = input.context();
        let default_locale = context.settings.default_locale.as_str();
        let locale = input.envelope.locale().unwrap_or(default_locale);
        if !context.catalog.has_locale(locale) {
            tracing::debug!(locale, default_locale, "no resources for locale; falling back");
        }
        let localizer = context
            .catalog
            .localizer(locale, default_locale, context.variant_selection);
        input.bind_localizer(localizer);
        Ok(())
    }
}

pub struct LoggingInterceptor;

#[async_trait]
impl RequestInterceptor for LoggingInterceptor {
    async fn process(&self, input: &mut HandlerInput) -> Result<()> {
        let envelope = &input.envelope;
        tracing::info!(
            request_id = %envelope.request.request_id,
            request_type = envelope.request_type(),
            intent = envelope.intent_name().unwrap_or_default(),
            locale = input.localizer().locale(),
            new_session = envelope.session.as_ref().is_some_and(|s| s.new),
            "incoming request"
        );
        if tracing::enabled!(tracing::Level::DEBUG) {
            let raw = serde_json::to_string(envelope)
                .map_err(|e| SkillError::Handler(format!("serialize request envelope: {e}")))?;
            tracing::debug!(envelope = %raw, "request envelope");
        }
        Ok(())
    }
}
