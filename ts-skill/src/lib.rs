//! Request dispatch and timer orchestration for the timer skill.
//!
//! A [`Skill`] runs its interceptors, hands the request to the first
//! matching [`RequestHandler`], and turns handler failures into a spoken
//! apology. Timer handlers talk to the timer API through a per-request
//! [`TimerService`](ts_timers::TimerService) and fall back to the voice
//! consent flow when the API answers 401.

pub mod attributes;
pub mod consent;
pub mod dispatcher;
pub mod error;
pub mod handlers;
pub mod input;
pub mod interceptor;
pub mod localizer;
pub mod operation;
pub mod service;
pub mod settings;
pub mod traits;

#[cfg(test)]
mod testing;

pub use attributes::{AttributesManager, LAST_TIMER_ID};
pub use consent::{AskForResponseHandler, ConsentDecision, ConsentOutcome, TIMERS_PERMISSION};
pub use dispatcher::{Skill, SkillBuilder};
pub use error::{DispatchError, Result, SkillError};
pub use handlers::default_skill_builder;
pub use input::{HandlerInput, SkillContext};
pub use localizer::{DEFAULT_LOCALE, LocaleCatalog, Localizer, VariantSelection};
pub use operation::{OperationFailure, TimerOperation};
pub use service::{HttpTimerServiceFactory, TimerServiceFactory};
pub use settings::SkillSettings;
pub use traits::{ErrorHandler, RequestHandler, RequestInterceptor};
