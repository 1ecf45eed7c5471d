use thiserror::Error;

pub type Result<T> = std::result::Result<T, EnvelopeError>;

#[derive(Debug, Error)]
pub enum EnvelopeError {
    #[error("malformed envelope: {0}")]
    Malformed(String),

    #[error("envelope serialization failed: {0}")]
    Serialize(String),
}

impl From<serde_json::Error> for EnvelopeError {
    fn from(e: serde_json::Error) -> Self {
        if e.is_data() || e.is_syntax() || e.is_eof() {
            Self::Malformed(e.to_string())
        } else {
            Self::Serialize(e.to_string())
        }
    }
}
