use crate::localizer::DEFAULT_LOCALE;
use ts_timers::{TaskLaunch, TimerTemplate};

/// Behavior switches fixed at startup.
#[derive(Debug, Clone)]
pub struct SkillSettings {
    pub default_locale: String,
    pub timer_template: TimerTemplate,
    /// Ask for consent before calling the timer API when the request carries
    /// no consent token, instead of waiting for a 401.
    pub proactive_consent_check: bool,
    /// Task launched by `custom_task` timers.
    pub custom_task: TaskLaunch,
    pub user_agent: Option<String>,
}

impl Default for SkillSettings {
    fn default() -> Self {
        Self {
            default_locale: DEFAULT_LOCALE.to_string(),
            timer_template: TimerTemplate::default(),
            proactive_consent_check: false,
            custom_task: TaskLaunch {
                name: "<SKILL_ID>.<TASK_NAME>".to_string(),
                version: "1".to_string(),
                input: serde_json::json!({}),
            },
            user_agent: Some(concat!("timerskill/", env!("CARGO_PKG_VERSION")).to_string()),
        }
    }
}
