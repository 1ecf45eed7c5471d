//! Request and response envelopes for the timer skill.
//!
//! Pure data: envelopes are parsed from the hosting platform's JSON and
//! responses are assembled with [`ResponseBuilder`] before being serialized
//! back. Nothing in this crate performs I/O.

mod error;
mod request;
mod response;
mod types;

pub use error::{EnvelopeError, Result};
pub use request::{
    ConnectionsStatus, Intent, Request, RequestEnvelope, RequestKind, SessionEndedError, Slot,
};
pub use response::{
    Card, Directive, OutputSpeech, Reprompt, Response, ResponseBuilder, ResponseEnvelope,
};
pub use types::{
    Application, Context, Permissions, RequestId, Session, SessionId, SystemState, User, UserId,
};
