use thiserror::Error;

pub type Result<T> = std::result::Result<T, TimerError>;

#[derive(Debug, Error)]
pub enum TimerError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The user has not granted (or has revoked) the timers permission.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("timer api returned status {code}: {body}")]
    Status { code: u16, body: String },

    #[error("http error: {0}")]
    Http(String),

    #[error("unexpected response format: {0}")]
    ResponseFormat(String),
}

impl TimerError {
    pub const UNAUTHORIZED: u16 = 401;

    /// HTTP status the service answered with, when there was one.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Unauthorized(_) => Some(Self::UNAUTHORIZED),
            Self::Status { code, .. } => Some(*code),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status_code() == Some(Self::UNAUTHORIZED)
    }

    pub(crate) fn from_status(code: u16, body: String) -> Self {
        if code == Self::UNAUTHORIZED {
            Self::Unauthorized(body)
        } else {
            Self::Status { code, body }
        }
    }
}

impl From<reqwest::Error> for TimerError {
    fn from(e: reqwest::Error) -> Self {
        match e.status() {
            Some(status) => Self::from_status(status.as_u16(), e.to_string()),
            None => Self::Http(e.to_string()),
        }
    }
}

impl From<serde_json::Error> for TimerError {
    fn from(e: serde_json::Error) -> Self {
        Self::ResponseFormat(e.to_string())
    }
}
