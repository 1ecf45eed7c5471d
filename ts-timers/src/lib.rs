pub mod client;
pub mod error;
pub mod spec;
pub mod traits;
pub mod types;

pub use client::{HttpTimerClient, HttpTimerConnector};
pub use error::{Result, TimerError};
pub use spec::{
    LocalizedText, Operation, TaskLaunch, TemplateText, TimerSpec, TimerTemplate, Visibility,
    validate_duration,
};
pub use traits::TimerService;
pub use types::{Timer, TimerId, TimerList, TimerStatus};
