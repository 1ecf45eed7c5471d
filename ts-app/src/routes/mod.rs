pub mod health;
pub mod skill;

use axum::Router;

/// `skill_path` is where request envelopes are posted.
pub fn router(skill_path: &str) -> Router {
    Router::new()
        .merge(health::router())
        .merge(skill::router(skill_path))
}
