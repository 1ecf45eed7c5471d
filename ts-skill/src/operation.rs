use crate::consent;
use crate::input::HandlerInput;
use thiserror::Error;
use ts_envelope::Response;
use ts_timers::TimerError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerOperation {
    Create,
    Read,
    Delete,
    Pause,
    Resume,
}

impl TimerOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Read => "read",
            Self::Delete => "delete",
            Self::Pause => "pause",
            Self::Resume => "resume",
        }
    }

    pub fn error_key(&self) -> &'static str {
        match self {
            Self::Create => "CREATE_TIMER_ERROR_MSG",
            Self::Read => "READ_TIMER_ERROR_MSG",
            Self::Delete => "DELETE_TIMER_ERROR_MSG",
            Self::Pause => "PAUSE_TIMER_ERROR_MSG",
            Self::Resume => "RESUME_TIMER_ERROR_MSG",
        }
    }
}

/// Why a timer operation did not complete.
#[derive(Debug, Error)]
pub enum OperationFailure {
    /// The service answered, but not with something the skill accepts.
    #[error("rejected: {0}")]
    PolicyRejected(String),

    #[error(transparent)]
    Transport(#[from] TimerError),
}

impl OperationFailure {
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::PolicyRejected(_) => None,
            Self::Transport(e) => e.status_code(),
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Transport(e) if e.is_unauthorized())
    }
}

/// Maps a failed operation onto a response: a consent request when the
/// service refused the token, the operation's apology otherwise. Nothing is
/// retried.
pub fn recover(
    input: &mut HandlerInput,
    operation: TimerOperation,
    failure: OperationFailure,
) -> Response {
    if failure.is_unauthorized() {
        tracing::info!(
            operation = operation.as_str(),
            "timer api unauthorized; asking for consent"
        );
        return consent::consent_request(input);
    }
    tracing::warn!(
        operation = operation.as_str(),
        status = ?failure.status_code(),
        error = %failure,
        "timer operation failed"
    );
    let apology = input.t(operation.error_key());
    input.speak_and_reprompt(&apology)
}
