//! Timer creation payloads.
//!
//! A timer is created from a [`TimerSpec`]; which behavior it carries when it
//! fires (announce a text, or launch a task) is chosen by a fixed
//! [`TimerTemplate`].

use crate::error::{Result, TimerError};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

static ISO_8601_DURATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^P(?:\d+D)?(?:T(?:\d+H)?(?:\d+M)?(?:\d+(?:\.\d+)?S)?)?$")
        .unwrap_or_else(|e| unreachable!("duration pattern is valid: {e}"))
});

/// Validates an ISO-8601 duration such as `PT5M` or `P1DT2H`.
pub fn validate_duration(duration: &str) -> Result<()> {
    let d = duration.trim();
    let has_component = d.chars().any(|c| c.is_ascii_digit());
    if !has_component || d.ends_with('T') || !ISO_8601_DURATION.is_match(d) {
        return Err(TimerError::InvalidInput(format!(
            "duration must be an ISO-8601 duration, got {duration:?}"
        )));
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerTemplate {
    #[default]
    Announcement,
    CustomTask,
    PredefinedTask,
}

impl fmt::Display for TimerTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Announcement => write!(f, "announcement"),
            Self::CustomTask => write!(f, "custom_task"),
            Self::PredefinedTask => write!(f, "predefined_task"),
        }
    }
}

impl FromStr for TimerTemplate {
    type Err = TimerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "announcement" => Ok(Self::Announcement),
            "custom_task" => Ok(Self::CustomTask),
            "predefined_task" => Ok(Self::PredefinedTask),
            other => Err(TimerError::InvalidInput(format!(
                "unknown timer template {other:?}; expected announcement, custom_task or predefined_task"
            ))),
        }
    }
}

/// Localized strings a template needs. Announcement timers speak `text` when
/// they fire; task timers use it as the confirmation prompt.
#[derive(Debug, Clone)]
pub struct TemplateText {
    pub label: String,
    pub locale: String,
    pub text: String,
}

impl TimerTemplate {
    pub fn build(
        &self,
        duration: &str,
        text: TemplateText,
        custom_task: &TaskLaunch,
    ) -> Result<TimerSpec> {
        validate_duration(duration)?;
        let localized = vec![LocalizedText {
            locale: text.locale,
            text: text.text,
        }];
        let operation = match self {
            Self::Announcement => Operation::Announce {
                text_to_announce: localized,
            },
            Self::CustomTask => Operation::LaunchTask {
                text_to_confirm: localized,
                task: custom_task.clone(),
            },
            Self::PredefinedTask => Operation::LaunchTask {
                text_to_confirm: localized,
                task: TaskLaunch::schedule_taxi_reservation(),
            },
        };
        Ok(TimerSpec {
            duration: duration.trim().to_string(),
            timer_label: text.label,
            creation_behavior: CreationBehavior {
                display_experience: DisplayExperience {
                    visibility: Visibility::Visible,
                },
            },
            triggering_behavior: TriggeringBehavior {
                operation,
                notification_config: NotificationConfig { play_audible: true },
            },
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerSpec {
    pub duration: String,
    pub timer_label: String,
    pub creation_behavior: CreationBehavior,
    pub triggering_behavior: TriggeringBehavior,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreationBehavior {
    pub display_experience: DisplayExperience,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayExperience {
    pub visibility: Visibility,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Visibility {
    Visible,
    Hidden,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggeringBehavior {
    pub operation: Operation,
    pub notification_config: NotificationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Operation {
    Announce {
        #[serde(rename = "textToAnnounce")]
        text_to_announce: Vec<LocalizedText>,
    },
    LaunchTask {
        #[serde(rename = "textToConfirm")]
        text_to_confirm: Vec<LocalizedText>,
        task: TaskLaunch,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalizedText {
    pub locale: String,
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationConfig {
    pub play_audible: bool,
}

/// Task launched when a task timer fires.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskLaunch {
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub input: serde_json::Value,
}

impl TaskLaunch {
    /// Built-in task used by the predefined template.
    pub fn schedule_taxi_reservation() -> Self {
        Self {
            name: "AMAZON.ScheduleTaxiReservation".to_string(),
            version: "1".to_string(),
            input: serde_json::json!({
                "@type": "ScheduleTaxiReservationRequest",
                "@version": "1",
                "partySize": 4,
                "pickupLocation": {
                    "@type": "PostalAddress",
                    "@version": "1",
                    "streetAddress": "415 106th Ave NE",
                    "locality": "Bellevue",
                    "region": "WA",
                    "postalCode": "98004",
                    "country": "US"
                },
                "pickupTime": null,
                "dropoffLocation": {
                    "@type": "PostalAddress",
                    "@version": "1",
                    "streetAddress": "2031 6th Ave.",
                    "locality": "Seattle",
                    "region": "WA",
                    "postalCode": "98121",
                    "country": "US"
                }
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{TaskLaunch, TemplateText, TimerTemplate, validate_duration};

    fn text() -> TemplateText {
        TemplateText {
            label: "My Timer".to_string(),
            locale: "en-US".to_string(),
            text: "Time is up".to_string(),
        }
    }

    fn custom_task() -> TaskLaunch {
        TaskLaunch {
            name: "amzn1.ask.skill.1.CountDown".to_string(),
            version: "1".to_string(),
            input: serde_json::json!({ "mode": "quick" }),
        }
    }

    #[test]
    fn durations_are_validated() {
        for ok in ["PT5M", "PT1H30M", "P1D", "P1DT2H", "PT45S", "PT0.5S"] {
            validate_duration(ok).unwrap_or_else(|e| panic!("{ok} should be valid: {e}"));
        }
        for bad in ["", "P", "PT", "5 minutes", "PT5X", "P1DT"] {
            assert!(validate_duration(bad).is_err(), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn announcement_template_serializes_announce_operation() {
        let spec = TimerTemplate::Announcement
            .build("PT5M", text(), &custom_task())
            .expect("build spec");
        let value = serde_json::to_value(&spec).expect("serialize spec");

        assert_eq!(value["duration"], "PT5M");
        assert_eq!(value["timerLabel"], "My Timer");
        assert_eq!(
            value["creationBehavior"]["displayExperience"]["visibility"],
            "VISIBLE"
        );
        let operation = &value["triggeringBehavior"]["operation"];
        assert_eq!(operation["type"], "ANNOUNCE");
        assert_eq!(operation["textToAnnounce"][0]["locale"], "en-US");
        assert_eq!(operation["textToAnnounce"][0]["text"], "Time is up");
        assert_eq!(
            value["triggeringBehavior"]["notificationConfig"]["playAudible"],
            true
        );
    }

    #[test]
    fn task_templates_launch_configured_or_builtin_task() {
        let custom = TimerTemplate::CustomTask
            .build("PT10M", text(), &custom_task())
            .expect("custom spec");
        let value = serde_json::to_value(&custom).expect("serialize custom");
        let operation = &value["triggeringBehavior"]["operation"];
        assert_eq!(operation["type"], "LAUNCH_TASK");
        assert_eq!(operation["textToConfirm"][0]["text"], "Time is up");
        assert_eq!(operation["task"]["name"], "amzn1.ask.skill.1.CountDown");

        let predefined = TimerTemplate::PredefinedTask
            .build("PT10M", text(), &custom_task())
            .expect("predefined spec");
        let value = serde_json::to_value(&predefined).expect("serialize predefined");
        assert_eq!(
            value["triggeringBehavior"]["operation"]["task"]["name"],
            "AMAZON.ScheduleTaxiReservation"
        );
    }

    #[test]
    fn invalid_duration_fails_before_building() {
        let err = TimerTemplate::Announcement
            .build("soon", text(), &custom_task())
            .expect_err("must fail");
        assert!(err.to_string().contains("ISO-8601"));
    }

    #[test]
    fn template_names_parse_case_insensitively() {
        assert_eq!(
            "Custom_Task".parse::<TimerTemplate>().expect("parse"),
            TimerTemplate::CustomTask
        );
        assert!("reminder".parse::<TimerTemplate>().is_err());
    }
}
