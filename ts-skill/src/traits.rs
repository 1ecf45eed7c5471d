use crate::error::{Result, SkillError};
use crate::input::HandlerInput;
use async_trait::async_trait;
use ts_envelope::Response;

#[async_trait]
pub trait RequestHandler: Send + Sync {
    fn name(&self) -> &'static str;
    fn can_handle(&self, input: &HandlerInput) -> bool;
    async fn handle(&self, input: &mut HandlerInput) -> Result<Response>;
}

/// Turns a failed invocation into a response. Must not fail itself.
#[async_trait]
pub trait ErrorHandler: Send + Sync {
    fn can_handle(&self, input: &HandlerInput, error: &SkillError) -> bool;
    async fn handle(&self, input: &mut HandlerInput, error: &SkillError) -> Response;
}

/// Runs before handler selection.
#[async_trait]
pub trait RequestInterceptor: Send + Sync {
    async fn process(&self, input: &mut HandlerInput) -> Result<()>;
}
