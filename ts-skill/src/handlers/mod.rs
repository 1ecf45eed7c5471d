mod basic;
mod create;
mod delete;
mod error;
mod pause_resume;
mod read;

pub use basic::{
    CancelAndStopIntentHandler, HelpIntentHandler, IntentReflectorHandler, LaunchRequestHandler,
    SessionEndedRequestHandler, UnsupportedRequestHandler,
};
pub use create::SetTimerIntentHandler;
pub use delete::DeleteTimerIntentHandler;
pub use error::GenericErrorHandler;
pub use pause_resume::{PauseTimerIntentHandler, ResumeTimerIntentHandler};
pub use read::ReadTimerIntentHandler;

use crate::consent::AskForResponseHandler;
use crate::dispatcher::SkillBuilder;
use crate::input::HandlerInput;
use crate::interceptor::{LocalizationInterceptor, LoggingInterceptor};

/// Timer skill wiring. Specific predicates come before the intent reflector,
/// which matches any intent.
pub fn default_skill_builder() -> SkillBuilder {
    SkillBuilder::default()
        .add_request_interceptor(LocalizationInterceptor)
        .add_request_interceptor(LoggingInterceptor)
        .add_request_handler(LaunchRequestHandler)
        .add_request_handler(AskForResponseHandler)
        .add_request_handler(SetTimerIntentHandler)
        .add_request_handler(ReadTimerIntentHandler)
        .add_request_handler(DeleteTimerIntentHandler)
        .add_request_handler(PauseTimerIntentHandler)
        .add_request_handler(ResumeTimerIntentHandler)
        .add_request_handler(HelpIntentHandler)
        .add_request_handler(CancelAndStopIntentHandler)
        .add_request_handler(SessionEndedRequestHandler)
        .add_request_handler(IntentReflectorHandler)
        .add_request_handler(UnsupportedRequestHandler)
        .add_error_handler(GenericErrorHandler)
}

fn is_intent(input: &HandlerInput, name: &str) -> bool {
    input.envelope.intent_name() == Some(name)
}
