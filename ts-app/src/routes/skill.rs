use crate::server::SkillState;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Extension, Json};
use std::sync::Arc;
use ts_envelope::RequestEnvelope;

pub fn router(path: &str) -> axum::Router {
    axum::Router::new().route(path, post(handle_envelope))
}

#[tracing::instrument(level = "info", skip_all)]
async fn handle_envelope(Extension(state): Extension<Arc<SkillState>>, body: String) -> Response {
    let envelope = match RequestEnvelope::from_json(&body) {
        Ok(envelope) => envelope,
        Err(e) => {
            tracing::warn!(error = %e, "rejecting malformed request envelope");
            return error_response(StatusCode::BAD_REQUEST, e.to_string());
        }
    };

    match state.skill.invoke(envelope).await {
        Ok(response) => Json(response).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "skill dispatch failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

fn error_response(status: StatusCode, error: String) -> Response {
    (
        status,
        Json(serde_json::json!({ "status": "error", "error": error })),
    )
        .into_response()
}
