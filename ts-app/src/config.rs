//! timerskill configuration loader.

use serde::Deserialize;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use ts_skill::{DEFAULT_LOCALE, SkillSettings};
use ts_timers::{TaskLaunch, TimerTemplate};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TimerSkillConfig {
    pub server: ServerConfig,
    pub skill: SkillConfig,
    pub timers: TimersConfig,
    pub localization: LocalizationConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub http_timeout_seconds: u64,
    pub http_max_in_flight: usize,
    /// Route that accepts request envelopes.
    pub path: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8787".to_string(),
            http_timeout_seconds: 30,
            http_max_in_flight: 64,
            path: "/skill".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SkillConfig {
    pub default_locale: String,
    pub timer_template: TimerTemplate,
    pub proactive_consent_check: bool,
    pub custom_task: Option<TaskLaunch>,
    pub user_agent: Option<String>,
}

impl Default for SkillConfig {
    fn default() -> Self {
        Self {
            default_locale: DEFAULT_LOCALE.to_string(),
            timer_template: TimerTemplate::default(),
            proactive_consent_check: false,
            custom_task: None,
            user_agent: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TimersConfig {
    pub request_timeout_seconds: u64,
    /// Base URL used instead of the API endpoint carried by each request.
    pub api_endpoint_override: Option<String>,
}

impl Default for TimersConfig {
    fn default() -> Self {
        Self {
            request_timeout_seconds: 8,
            api_endpoint_override: None,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LocalizationConfig {
    /// Extra string resources merged over the built-in ones.
    pub resources_file: Option<String>,
}

/// Where the effective configuration came from.
#[derive(Debug, Clone)]
pub struct ConfigSource {
    pub path: PathBuf,
    pub found: bool,
}

impl TimerSkillConfig {
    pub async fn load(path: Option<PathBuf>) -> anyhow::Result<Self> {
        Ok(Self::load_with_source(path).await?.0)
    }

    /// Loads `path` (or the default location). A missing file at the default
    /// location yields defaults; an explicitly named file must exist.
    pub async fn load_with_source(path: Option<PathBuf>) -> anyhow::Result<(Self, ConfigSource)> {
        let explicit = path.is_some();
        let path = path.unwrap_or_else(default_config_path);
        let (mut cfg, found) = match tokio::fs::read_to_string(&path).await {
            Ok(contents) => (Self::parse(&contents, &path)?, true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound && !explicit => {
                tracing::info!(config_path = %path.display(), "no config file; using defaults");
                (Self::default(), false)
            }
            Err(e) => return Err(anyhow::anyhow!("read config {}: {e}", path.display())),
        };

        cfg.apply_env_overrides()?;
        cfg.validate()?;
        Ok((cfg, ConfigSource { path, found }))
    }

    fn parse(contents: &str, path: &Path) -> anyhow::Result<Self> {
        toml::from_str(contents).map_err(|e| anyhow::anyhow!("parse config {}: {e}", path.display()))
    }

    fn apply_env_overrides(&mut self) -> anyhow::Result<()> {
        if let Some(v) = env_value("TIMERSKILL_BIND_ADDR") {
            self.server.bind_addr = v;
        }
        if let Some(v) = env_value("TIMERSKILL_DEFAULT_LOCALE") {
            self.skill.default_locale = v;
        }
        if let Some(v) = env_value("TIMERSKILL_TIMER_TEMPLATE") {
            self.skill.timer_template = v
                .parse()
                .map_err(|e| anyhow::anyhow!("TIMERSKILL_TIMER_TEMPLATE: {e}"))?;
        }
        if let Some(v) = env_value("TIMERSKILL_API_ENDPOINT") {
            self.timers.api_endpoint_override = Some(v);
        }
        Ok(())
    }

    fn validate(&self) -> anyhow::Result<()> {
        self.bind_addr()?;
        if self.server.http_timeout_seconds == 0 {
            return Err(anyhow::anyhow!("server.http_timeout_seconds must be > 0"));
        }
        if self.server.http_max_in_flight == 0 {
            return Err(anyhow::anyhow!("server.http_max_in_flight must be > 0"));
        }
        if !self.server.path.starts_with('/') || self.server.path == "/healthz" {
            return Err(anyhow::anyhow!(
                "server.path must start with '/' and must not be /healthz, got {:?}",
                self.server.path
            ));
        }
        if self.skill.default_locale.trim().is_empty() {
            return Err(anyhow::anyhow!("skill.default_locale is required"));
        }
        if self.timers.request_timeout_seconds == 0 {
            return Err(anyhow::anyhow!("timers.request_timeout_seconds must be > 0"));
        }
        if self.skill.timer_template == TimerTemplate::CustomTask {
            let Some(task) = &self.skill.custom_task else {
                return Err(anyhow::anyhow!(
                    "skill.custom_task is required when skill.timer_template = \"custom_task\""
                ));
            };
            if task.name.trim().is_empty() || task.version.trim().is_empty() {
                return Err(anyhow::anyhow!(
                    "skill.custom_task.name and skill.custom_task.version are required"
                ));
            }
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> anyhow::Result<SocketAddr> {
        self.server
            .bind_addr
            .parse()
            .map_err(|e| anyhow::anyhow!("invalid server.bind_addr {:?}: {e}", self.server.bind_addr))
    }

    pub fn skill_settings(&self) -> SkillSettings {
        let defaults = SkillSettings::default();
        SkillSettings {
            default_locale: self.skill.default_locale.trim().to_string(),
            timer_template: self.skill.timer_template,
            proactive_consent_check: self.skill.proactive_consent_check,
            custom_task: self.skill.custom_task.clone().unwrap_or(defaults.custom_task),
            user_agent: self.skill.user_agent.clone().or(defaults.user_agent),
        }
    }
}

fn env_value(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

pub fn default_config_path() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    Path::new(&home).join(".timerskill").join("config.toml")
}

pub fn expand_home(path: &str) -> anyhow::Result<PathBuf> {
    let trimmed = path.trim();
    let Some(rest) = trimmed.strip_prefix("~/") else {
        return Ok(PathBuf::from(trimmed));
    };
    let home = std::env::var("HOME").map_err(|_| anyhow::anyhow!("HOME is not set"))?;
    Ok(Path::new(&home).join(rest))
}
