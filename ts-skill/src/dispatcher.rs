use crate::error::{DispatchError, SkillError};
use crate::input::{HandlerInput, SkillContext};
use crate::localizer::{LocaleCatalog, VariantSelection};
use crate::service::TimerServiceFactory;
use crate::settings::SkillSettings;
use crate::traits::{ErrorHandler, RequestHandler, RequestInterceptor};
use std::sync::Arc;
use ts_envelope::{RequestEnvelope, Response, ResponseBuilder, ResponseEnvelope};

/// Ordered handler chain. The first handler whose predicate matches handles
/// the request; failures go to the first matching error handler.
pub struct Skill {
    interceptors: Vec<Box<dyn RequestInterceptor>>,
    handlers: Vec<Box<dyn RequestHandler>>,
    error_handlers: Vec<Box<dyn ErrorHandler>>,
    context: Arc<SkillContext>,
}

impl Skill {
    pub fn builder() -> SkillBuilder {
        SkillBuilder::default()
    }

    pub fn handler_names(&self) -> Vec<&'static str> {
        self.handlers.iter().map(|h| h.name()).collect()
    }

    pub fn settings(&self) -> &SkillSettings {
        &self.context.settings
    }

    #[tracing::instrument(
        level = "info",
        skip_all,
        fields(request_id = %envelope.request.request_id, request_type = envelope.request_type())
    )]
    pub async fn invoke(
        &self,
        envelope: RequestEnvelope,
    ) -> Result<ResponseEnvelope, DispatchError> {
        let mut input = HandlerInput::new(envelope, Arc::clone(&self.context));
        let response = match self.dispatch(&mut input).await? {
            Ok(response) => response,
            Err(error) => self.handle_error(&mut input, error).await?,
        };

        let mut out = ResponseEnvelope::new(response, input.attributes.into_session_attributes());
        if let Some(user_agent) = &self.context.settings.user_agent {
            out = out.with_user_agent(user_agent.clone());
        }
        Ok(out)
    }

    /// Outer error: nothing can handle the request. Inner error: an
    /// interceptor or the selected handler failed.
    async fn dispatch(
        &self,
        input: &mut HandlerInput,
    ) -> Result<Result<Response, SkillError>, DispatchError> {
        for interceptor in &self.interceptors {
            if let Err(e) = interceptor.process(input).await {
                return Ok(Err(e));
            }
        }

        let Some(handler) = self.handlers.iter().find(|h| h.can_handle(input)) else {
            let request_type = input.envelope.request_type().to_string();
            let intent = input.envelope.intent_name().unwrap_or("-").to_string();
            tracing::error!(%request_type, %intent, "no request handler matched");
            return Err(DispatchError::NoHandler {
                request_type,
                intent,
            });
        };
        tracing::debug!(handler = handler.name(), "handler selected");
        Ok(handler.handle(input).await)
    }

    async fn handle_error(
        &self,
        input: &mut HandlerInput,
        error: SkillError,
    ) -> Result<Response, DispatchError> {
        // Partial output of the failed handler is discarded.
        input.response_builder = ResponseBuilder::new();
        let Some(handler) = self
            .error_handlers
            .iter()
            .find(|h| h.can_handle(input, &error))
        else {
            return Err(DispatchError::UnhandledError(error.to_string()));
        };
        Ok(handler.handle(input, &error).await)
    }
}

#[derive(Default)]
pub struct SkillBuilder {
    interceptors: Vec<Box<dyn RequestInterceptor>>,
    handlers: Vec<Box<dyn RequestHandler>>,
    error_handlers: Vec<Box<dyn ErrorHandler>>,
    catalog: Option<Arc<LocaleCatalog>>,
    timer_services: Option<Arc<dyn TimerServiceFactory>>,
    settings: SkillSettings,
    variant_selection: VariantSelection,
}

impl SkillBuilder {
    pub fn add_request_interceptor(mut self, interceptor: impl RequestInterceptor + 'static) -> Self {
        self.interceptors.push(Box::new(interceptor));
        self
    }

    /// Handlers are tried in the order they are added.
    pub fn add_request_handler(mut self, handler: impl RequestHandler + 'static) -> Self {
        self.handlers.push(Box::new(handler));
        self
    }

    pub fn add_error_handler(mut self, handler: impl ErrorHandler + 'static) -> Self {
        self.error_handlers.push(Box::new(handler));
        self
    }

    pub fn with_catalog(mut self, catalog: Arc<LocaleCatalog>) -> Self {
        self.catalog = Some(catalog);
        self
    }

    pub fn with_timer_service_factory(mut self, factory: Arc<dyn TimerServiceFactory>) -> Self {
        self.timer_services = Some(factory);
        self
    }

    pub fn with_settings(mut self, settings: SkillSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_variant_selection(mut self, selection: VariantSelection) -> Self {
        self.variant_selection = selection;
        self
    }

    pub fn build(self) -> crate::error::Result<Skill> {
        let Some(timer_services) = self.timer_services else {
            return Err(SkillError::Config(
                "a timer service factory is required".to_string(),
            ));
        };
        let catalog = match self.catalog {
            Some(catalog) => catalog,
            None => Arc::new(LocaleCatalog::builtin()?),
        };
        if !catalog.has_locale(&self.settings.default_locale) {
            return Err(SkillError::Config(format!(
                "no localization resources for default locale {}",
                self.settings.default_locale
            )));
        }
        Ok(Skill {
            interceptors: self.interceptors,
            handlers: self.handlers,
            error_handlers: self.error_handlers,
            context: Arc::new(SkillContext {
                catalog,
                timer_services,
                settings: self.settings,
                variant_selection: self.variant_selection,
            }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::Skill;
    use crate::error::{DispatchError, Result, SkillError};
    use crate::input::HandlerInput;
    use crate::testing::{FakeFactory, FakeTimerService, intent_envelope, launch_envelope};
    use crate::traits::{ErrorHandler, RequestHandler, RequestInterceptor};
    use async_trait::async_trait;
    use std::sync::Arc;
    use ts_envelope::Response;

    struct Named {
        name: &'static str,
        intent: Option<&'static str>,
        fail: bool,
    }

    #[async_trait]
    impl RequestHandler for Named {
        fn name(&self) -> &'static str {
            self.name
        }

        fn can_handle(&self, input: &HandlerInput) -> bool {
            match self.intent {
                Some(intent) => input.envelope.intent_name() == Some(intent),
                None => input.envelope.intent().is_some(),
            }
        }

        async fn handle(&self, input: &mut HandlerInput) -> Result<Response> {
            if self.fail {
                input.response_builder.speak("partial");
                return Err(SkillError::Handler(format!("{} failed", self.name)));
            }
            Ok(input.response_builder.speak(self.name).get_response())
        }
    }

    fn named(name: &'static str, intent: Option<&'static str>) -> Named {
        Named {
            name,
            intent,
            fail: false,
        }
    }

    struct Apology;

    #[async_trait]
    impl ErrorHandler for Apology {
        fn can_handle(&self, _input: &HandlerInput, _error: &SkillError) -> bool {
            true
        }

        async fn handle(&self, input: &mut HandlerInput, error: &SkillError) -> Response {
            input
                .response_builder
                .speak(format!("sorry: {error}"))
                .get_response()
        }
    }

    struct FailingInterceptor;

    #[async_trait]
    impl RequestInterceptor for FailingInterceptor {
        async fn process(&self, _input: &mut HandlerInput) -> Result<()> {
            Err(SkillError::Handler("interceptor broke".to_string()))
        }
    }

    fn factory() -> Arc<FakeFactory> {
        Arc::new(FakeFactory::new(FakeTimerService::new()))
    }

    async fn speech(skill: &Skill, intent: &str) -> String {
        let out = skill
            .invoke(intent_envelope(intent, &[]))
            .await
            .expect("invoke");
        out.response.speech_text().expect("speech").to_string()
    }

    #[tokio::test]
    async fn first_matching_handler_wins() {
        let skill = Skill::builder()
            .add_request_handler(named("specific", Some("ReadTimerIntent")))
            .add_request_handler(named("catch_all", None))
            .with_timer_service_factory(factory())
            .build()
            .expect("build");
        assert_eq!(speech(&skill, "ReadTimerIntent").await, "specific");
        assert_eq!(speech(&skill, "OtherIntent").await, "catch_all");

        let shadowed = Skill::builder()
            .add_request_handler(named("catch_all", None))
            .add_request_handler(named("specific", Some("ReadTimerIntent")))
            .with_timer_service_factory(factory())
            .build()
            .expect("build");
        assert_eq!(speech(&shadowed, "ReadTimerIntent").await, "catch_all");
    }

    #[tokio::test]
    async fn disjoint_handlers_select_the_same_regardless_of_order() {
        let forward = Skill::builder()
            .add_request_handler(named("read", Some("ReadTimerIntent")))
            .add_request_handler(named("delete", Some("DeleteTimerIntent")))
            .with_timer_service_factory(factory())
            .build()
            .expect("build");
        let reversed = Skill::builder()
            .add_request_handler(named("delete", Some("DeleteTimerIntent")))
            .add_request_handler(named("read", Some("ReadTimerIntent")))
            .with_timer_service_factory(factory())
            .build()
            .expect("build");
        for intent in ["ReadTimerIntent", "DeleteTimerIntent"] {
            assert_eq!(speech(&forward, intent).await, speech(&reversed, intent).await);
        }
    }

    #[tokio::test]
    async fn unmatched_request_is_a_dispatch_error() {
        let skill = Skill::builder()
            .add_request_handler(named("read", Some("ReadTimerIntent")))
            .add_error_handler(Apology)
            .with_timer_service_factory(factory())
            .build()
            .expect("build");
        let err = skill
            .invoke(launch_envelope())
            .await
            .expect_err("no handler");
        assert!(matches!(err, DispatchError::NoHandler { ref request_type, .. } if request_type == "LaunchRequest"));
    }

    #[tokio::test]
    async fn handler_failure_goes_to_error_handler_with_fresh_response() {
        let skill = Skill::builder()
            .add_request_handler(Named {
                name: "broken",
                intent: None,
                fail: true,
            })
            .add_error_handler(Apology)
            .with_timer_service_factory(factory())
            .build()
            .expect("build");
        assert_eq!(
            speech(&skill, "AnyIntent").await,
            "sorry: handler failed: broken failed"
        );
    }

    #[tokio::test]
    async fn interceptor_failure_skips_handlers() {
        let skill = Skill::builder()
            .add_request_interceptor(FailingInterceptor)
            .add_request_handler(named("never", None))
            .add_error_handler(Apology)
            .with_timer_service_factory(factory())
            .build()
            .expect("build");
        assert_eq!(
            speech(&skill, "AnyIntent").await,
            "sorry: handler failed: interceptor broke"
        );
    }

    #[tokio::test]
    async fn failure_without_error_handler_escapes() {
        let skill = Skill::builder()
            .add_request_handler(Named {
                name: "broken",
                intent: None,
                fail: true,
            })
            .with_timer_service_factory(factory())
            .build()
            .expect("build");
        let err = skill
            .invoke(intent_envelope("AnyIntent", &[]))
            .await
            .expect_err("unhandled");
        assert!(matches!(err, DispatchError::UnhandledError(_)));
    }

    #[test]
    fn build_requires_a_timer_service_factory() {
        let err = Skill::builder().build().err().expect("missing factory");
        assert!(err.to_string().contains("timer service factory"));
    }
}
