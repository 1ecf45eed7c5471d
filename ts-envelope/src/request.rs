use crate::error::Result;
use crate::types::{Context, RequestId, Session};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// One conversational turn as delivered by the hosting platform.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestEnvelope {
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session: Option<Session>,
    pub context: Context,
    pub request: Request,
}

fn default_version() -> String {
    "1.0".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Request {
    pub request_id: RequestId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
    #[serde(flatten)]
    pub kind: RequestKind,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum RequestKind {
    LaunchRequest,
    IntentRequest {
        intent: Intent,
        #[serde(rename = "dialogState", default, skip_serializing_if = "Option::is_none")]
        dialog_state: Option<String>,
    },
    /// Asynchronous answer to a `Connections.SendRequest` directive.
    #[serde(rename = "Connections.Response")]
    ConnectionsResponse {
        name: String,
        status: ConnectionsStatus,
        #[serde(default)]
        payload: serde_json::Value,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        token: Option<String>,
    },
    SessionEndedRequest {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error: Option<SessionEndedError>,
    },
    #[serde(other)]
    Unsupported,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Intent {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confirmation_status: Option<String>,
    #[serde(default)]
    pub slots: BTreeMap<String, Slot>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Slot {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

/// Delivery status of a connections response. The platform sends the code
/// as a string ("200"); numeric codes are accepted too.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionsStatus {
    #[serde(deserialize_with = "code_as_string")]
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionEndedError {
    #[serde(rename = "type")]
    pub error_type: String,
    #[serde(default)]
    pub message: String,
}

fn code_as_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Code {
        Text(String),
        Number(u64),
    }

    Ok(match Code::deserialize(deserializer)? {
        Code::Text(s) => s,
        Code::Number(n) => n.to_string(),
    })
}

impl RequestEnvelope {
    pub fn from_json(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        Ok(serde_json::from_value(value)?)
    }

    /// Wire name of the request type, e.g. `IntentRequest` or `Connections.Response`.
    pub fn request_type(&self) -> &str {
        match &self.request.kind {
            RequestKind::LaunchRequest => "LaunchRequest",
            RequestKind::IntentRequest { .. } => "IntentRequest",
            RequestKind::ConnectionsResponse { .. } => "Connections.Response",
            RequestKind::SessionEndedRequest { .. } => "SessionEndedRequest",
            RequestKind::Unsupported => "Unsupported",
        }
    }

    pub fn intent(&self) -> Option<&Intent> {
        match &self.request.kind {
            RequestKind::IntentRequest { intent, .. } => Some(intent),
            _ => None,
        }
    }

    pub fn intent_name(&self) -> Option<&str> {
        self.intent().map(|intent| intent.name.as_str())
    }

    pub fn slot_value(&self, slot: &str) -> Option<&str> {
        self.intent()?
            .slots
            .get(slot)?
            .value
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
    }

    /// Name of a connections response (`AskFor` for consent answers).
    pub fn connections_name(&self) -> Option<&str> {
        match &self.request.kind {
            RequestKind::ConnectionsResponse { name, .. } => Some(name.as_str()),
            _ => None,
        }
    }

    pub fn locale(&self) -> Option<&str> {
        self.request.locale.as_deref()
    }

    pub fn consent_token(&self) -> Option<&str> {
        self.context
            .system
            .user
            .permissions
            .as_ref()?
            .consent_token
            .as_deref()
            .filter(|t| !t.is_empty())
    }

    pub fn api_endpoint(&self) -> Option<&str> {
        self.context.system.api_endpoint.as_deref()
    }

    pub fn api_access_token(&self) -> Option<&str> {
        self.context.system.api_access_token.as_deref()
    }

    pub fn session_attributes(&self) -> serde_json::Map<String, serde_json::Value> {
        self.session
            .as_ref()
            .map(|s| s.attributes.clone())
            .unwrap_or_default()
    }
}
