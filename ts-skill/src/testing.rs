//! In-memory doubles and envelope builders for handler tests.

use crate::dispatcher::Skill;
use crate::handlers;
use crate::localizer::{LocaleCatalog, VariantSelection};
use crate::service::TimerServiceFactory;
use crate::settings::SkillSettings;
use async_trait::async_trait;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use ts_envelope::RequestEnvelope;
use ts_timers::{Result, Timer, TimerError, TimerId, TimerList, TimerService, TimerSpec, TimerStatus};

#[derive(Default)]
struct FakeState {
    timers: Vec<Timer>,
    /// Reported count, when it should differ from `timers.len()`.
    total_count: Option<usize>,
    created: Option<Timer>,
    get_overrides: HashMap<String, TimerStatus>,
    fail_on: HashMap<&'static str, u16>,
    calls: Vec<String>,
    specs: Vec<TimerSpec>,
}

/// Records every call; serves a fixed timer list.
#[derive(Clone, Default)]
pub struct FakeTimerService {
    state: Arc<Mutex<FakeState>>,
}

impl FakeTimerService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timers(timers: &[(&str, TimerStatus)]) -> Self {
        let fake = Self::new();
        fake.state().timers = timers
            .iter()
            .map(|(id, status)| Timer::new(*id, *status))
            .collect();
        fake
    }

    pub fn report_total_count(self, count: usize) -> Self {
        self.state().total_count = Some(count);
        self
    }

    pub fn creates(self, id: &str, status: TimerStatus) -> Self {
        self.state().created = Some(Timer::new(id, status));
        self
    }

    pub fn get_returns(self, id: &str, status: TimerStatus) -> Self {
        self.state().get_overrides.insert(id.to_string(), status);
        self
    }

    /// Makes `operation` ("list", "get", "create", ...) fail with `code`.
    pub fn fail(self, operation: &'static str, code: u16) -> Self {
        self.state().fail_on.insert(operation, code);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.state().calls.clone()
    }

    pub fn created_specs(&self) -> Vec<TimerSpec> {
        self.state().specs.clone()
    }

    fn state(&self) -> std::sync::MutexGuard<'_, FakeState> {
        self.state.lock().expect("fake state lock")
    }

    fn record(&self, operation: &'static str, call: String) -> Result<()> {
        let mut state = self.state();
        state.calls.push(call);
        match state.fail_on.get(operation) {
            Some(401) => Err(TimerError::Unauthorized("consent required".to_string())),
            Some(code) => Err(TimerError::Status {
                code: *code,
                body: format!("{operation} failed"),
            }),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl TimerService for FakeTimerService {
    async fn list_timers(&self) -> Result<TimerList> {
        self.record("list", "list".to_string())?;
        let state = self.state();
        let mut list = TimerList::new(state.timers.clone());
        if let Some(count) = state.total_count {
            list.total_count = count;
        }
        Ok(list)
    }

    async fn get_timer(&self, id: &TimerId) -> Result<Timer> {
        self.record("get", format!("get:{id}"))?;
        let state = self.state();
        if let Some(status) = state.get_overrides.get(id.as_str()) {
            return Ok(Timer::new(id.as_str(), *status));
        }
        state
            .timers
            .iter()
            .find(|t| &t.id == id)
            .cloned()
            .ok_or_else(|| TimerError::Status {
                code: 404,
                body: format!("timer {id} not found"),
            })
    }

    async fn create_timer(&self, spec: &TimerSpec) -> Result<Timer> {
        self.record("create", format!("create:{}", spec.duration))?;
        let mut state = self.state();
        state.specs.push(spec.clone());
        Ok(state
            .created
            .clone()
            .unwrap_or_else(|| Timer::new("created", TimerStatus::On)))
    }

    async fn delete_timer(&self, id: &TimerId) -> Result<()> {
        self.record("delete", format!("delete:{id}"))
    }

    async fn delete_all_timers(&self) -> Result<()> {
        self.record("delete_all", "delete_all".to_string())
    }

    async fn pause_timer(&self, id: &TimerId) -> Result<()> {
        self.record("pause", format!("pause:{id}"))
    }

    async fn resume_timer(&self, id: &TimerId) -> Result<()> {
        self.record("resume", format!("resume:{id}"))
    }
}

pub struct FakeFactory {
    service: FakeTimerService,
}

impl FakeFactory {
    pub fn new(service: FakeTimerService) -> Self {
        Self { service }
    }
}

impl TimerServiceFactory for FakeFactory {
    fn timer_service(&self, _envelope: &RequestEnvelope) -> Result<Arc<dyn TimerService>> {
        Ok(Arc::new(self.service.clone()))
    }
}

/// Default skill over `fake`, with reproducible strings.
pub fn test_skill(fake: FakeTimerService) -> Skill {
    test_skill_with(fake, |_| {})
}

pub fn test_skill_with(fake: FakeTimerService, configure: impl FnOnce(&mut SkillSettings)) -> Skill {
    let mut settings = SkillSettings::default();
    configure(&mut settings);
    handlers::default_skill_builder()
        .with_catalog(Arc::new(LocaleCatalog::builtin().expect("builtin catalog")))
        .with_timer_service_factory(Arc::new(FakeFactory::new(fake)))
        .with_settings(settings)
        .with_variant_selection(VariantSelection::First)
        .build()
        .expect("build test skill")
}

fn envelope(request: Value, attributes: Value) -> RequestEnvelope {
    RequestEnvelope::from_value(json!({
        "version": "1.0",
        "session": {
            "new": false,
            "sessionId": "amzn1.echo-api.session.test",
            "attributes": attributes,
            "user": { "userId": "amzn1.ask.account.test" }
        },
        "context": {
            "System": {
                "user": {
                    "userId": "amzn1.ask.account.test",
                    "permissions": { "consentToken": "consent-test" }
                },
                "apiEndpoint": "https://api.example.com",
                "apiAccessToken": "token-test"
            }
        },
        "request": request
    }))
    .expect("test envelope")
}

fn request(kind: Value) -> Value {
    let mut request = json!({
        "requestId": "amzn1.echo-api.request.test",
        "timestamp": "2026-01-01T10:00:00Z",
        "locale": "en-US"
    });
    if let (Some(target), Value::Object(fields)) = (request.as_object_mut(), kind) {
        target.extend(fields);
    }
    request
}

pub fn launch_envelope() -> RequestEnvelope {
    envelope(request(json!({ "type": "LaunchRequest" })), json!({}))
}

pub fn intent_envelope(name: &str, slots: &[(&str, &str)]) -> RequestEnvelope {
    intent_envelope_with_attributes(name, slots, json!({}))
}

pub fn intent_envelope_with_attributes(
    name: &str,
    slots: &[(&str, &str)],
    attributes: Value,
) -> RequestEnvelope {
    let slots: serde_json::Map<String, Value> = slots
        .iter()
        .map(|(slot, value)| {
            (
                slot.to_string(),
                json!({ "name": slot, "value": value }),
            )
        })
        .collect();
    envelope(
        request(json!({
            "type": "IntentRequest",
            "intent": { "name": name, "confirmationStatus": "NONE", "slots": slots }
        })),
        attributes,
    )
}

pub fn connections_response(code: &str, payload: Value) -> RequestEnvelope {
    envelope(
        request(json!({
            "type": "Connections.Response",
            "name": "AskFor",
            "status": { "code": code, "message": "test" },
            "payload": payload,
            "token": "verifier"
        })),
        json!({}),
    )
}

pub fn session_ended_envelope() -> RequestEnvelope {
    envelope(
        request(json!({
            "type": "SessionEndedRequest",
            "reason": "ERROR",
            "error": { "type": "INVALID_RESPONSE", "message": "bad ssml" }
        })),
        json!({}),
    )
}
