use thiserror::Error;

pub type Result<T> = std::result::Result<T, SkillError>;

#[derive(Debug, Error)]
pub enum SkillError {
    #[error("localization error: {0}")]
    Localization(String),

    #[error("invalid skill configuration: {0}")]
    Config(String),

    #[error("handler failed: {0}")]
    Handler(String),
}

impl From<toml::de::Error> for SkillError {
    fn from(e: toml::de::Error) -> Self {
        Self::Localization(e.to_string())
    }
}

/// Failures that escape the skill. Everything else is turned into a spoken
/// response by an error handler.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("no request handler can handle {request_type} (intent: {intent})")]
    NoHandler {
        request_type: String,
        intent: String,
    },

    #[error("no error handler accepted: {0}")]
    UnhandledError(String),
}
