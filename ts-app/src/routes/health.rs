use crate::server::SkillState;
use axum::routing::get;
use axum::{Extension, Json};
use chrono::Utc;
use std::sync::Arc;

pub fn router() -> axum::Router {
    axum::Router::new().route("/healthz", get(get_health))
}

#[tracing::instrument(level = "debug", skip_all)]
async fn get_health(Extension(state): Extension<Arc<SkillState>>) -> Json<serde_json::Value> {
    let settings = state.skill.settings();
    Json(serde_json::json!({
        "status": "ok",
        "checked_at": Utc::now(),
        "started_at": state.started_at,
        "version": env!("CARGO_PKG_VERSION"),
        "skill": {
            "default_locale": settings.default_locale,
            "timer_template": settings.timer_template,
            "handlers": state.skill.handler_names(),
        }
    }))
}
