//! timerskill server.
//!
//! Hosts the skill behind an HTTP endpoint and provides the one-shot
//! `doctor` and `invoke` commands.

use crate::config::{TimerSkillConfig, expand_home};
use crate::routes;
use anyhow::Result;
use axum::Extension;
use axum::http::{HeaderMap, Request, StatusCode};
use axum::response::Response;
use chrono::{DateTime, Utc};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tower::limit::GlobalConcurrencyLimitLayer;
use tower_http::classify::ServerErrorsFailureClass;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use ts_envelope::RequestEnvelope;
use ts_skill::{HttpTimerServiceFactory, LocaleCatalog, Skill, default_skill_builder};
use ts_timers::HttpTimerConnector;

pub struct SkillState {
    pub skill: Skill,
    pub started_at: DateTime<Utc>,
}

impl SkillState {
    pub fn new(skill: Skill) -> Self {
        Self {
            skill,
            started_at: Utc::now(),
        }
    }
}

pub async fn build_skill(cfg: &TimerSkillConfig) -> Result<Skill> {
    let mut catalog = LocaleCatalog::builtin()?;
    if let Some(file) = &cfg.localization.resources_file {
        let path = expand_home(file)?;
        let raw = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| anyhow::anyhow!("read localization resources {}: {e}", path.display()))?;
        catalog
            .merge_toml(&raw)
            .map_err(|e| anyhow::anyhow!("load localization resources {}: {e}", path.display()))?;
        tracing::info!(path = %path.display(), "localization resources merged");
    }

    let connector = HttpTimerConnector::new(Duration::from_secs(cfg.timers.request_timeout_seconds))?
        .with_endpoint_override(cfg.timers.api_endpoint_override.as_deref())?;

    let skill = default_skill_builder()
        .with_catalog(Arc::new(catalog))
        .with_timer_service_factory(Arc::new(HttpTimerServiceFactory::new(connector)))
        .with_settings(cfg.skill_settings())
        .build()?;
    Ok(skill)
}

pub async fn doctor(config_path: Option<PathBuf>) -> Result<()> {
    let (cfg, source) = TimerSkillConfig::load_with_source(config_path).await?;
    let skill = build_skill(&cfg).await?;
    let settings = skill.settings();
    tracing::info!(
        config_path = %source.path.display(),
        config_found = source.found,
        bind_addr = %cfg.server.bind_addr,
        skill_path = %cfg.server.path,
        default_locale = %settings.default_locale,
        timer_template = %settings.timer_template,
        proactive_consent_check = settings.proactive_consent_check,
        api_endpoint_override = ?cfg.timers.api_endpoint_override,
        handlers = ?skill.handler_names(),
        "config ok"
    );
    if !source.found {
        tracing::warn!(
            config_path = %source.path.display(),
            "config file not found; running with defaults"
        );
    }
    Ok(())
}

/// Runs one envelope from `file` through the skill and prints the response
/// envelope.
pub async fn invoke(config_path: Option<PathBuf>, file: &Path) -> Result<()> {
    let cfg = TimerSkillConfig::load(config_path).await?;
    let skill = build_skill(&cfg).await?;
    let raw = tokio::fs::read_to_string(file)
        .await
        .map_err(|e| anyhow::anyhow!("read envelope {}: {e}", file.display()))?;
    let envelope = RequestEnvelope::from_json(&raw)
        .map_err(|e| anyhow::anyhow!("parse envelope {}: {e}", file.display()))?;
    let response = skill.invoke(envelope).await?;
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}

pub async fn serve(config_path: Option<PathBuf>) -> Result<()> {
    let (cfg, source) = TimerSkillConfig::load_with_source(config_path).await?;
    tracing::info!(
        config_path = %source.path.display(),
        config_found = source.found,
        "config loaded"
    );
    let addr = cfg.bind_addr()?;
    let listener = preflight_bind_listener(addr).await?;

    let state = Arc::new(SkillState::new(build_skill(&cfg).await?));
    let app = app(state, &cfg);

    tracing::info!(%addr, path = %cfg.server.path, "timerskill serving");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("http server shutdown completed");
    Ok(())
}

pub fn app(state: Arc<SkillState>, cfg: &TimerSkillConfig) -> axum::Router {
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &Request<_>| {
            tracing::info_span!(
                "http.request",
                method = %request.method(),
                uri = %request.uri(),
                version = ?request.version(),
                request_id = %request_id_from_headers(request.headers())
            )
        })
        .on_request(|request: &Request<_>, _span: &tracing::Span| {
            tracing::info!(
                method = %request.method(),
                uri = %request.uri(),
                request_id = %request_id_from_headers(request.headers()),
                "http request started"
            );
        })
        .on_response(
            |response: &Response, latency: Duration, _span: &tracing::Span| {
                tracing::info!(
                    status = response.status().as_u16(),
                    latency_ms = latency.as_millis() as u64,
                    "http request completed"
                );
            },
        )
        .on_failure(
            |error: ServerErrorsFailureClass, latency: Duration, _span: &tracing::Span| {
                tracing::error!(
                    error_class = %error,
                    latency_ms = latency.as_millis() as u64,
                    "http request failed"
                );
            },
        );

    routes::router(&cfg.server.path)
        .layer(Extension(state))
        .layer(GlobalConcurrencyLimitLayer::new(cfg.server.http_max_in_flight))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(cfg.server.http_timeout_seconds),
        ))
        .layer(trace_layer)
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}

async fn preflight_bind_listener(addr: SocketAddr) -> Result<tokio::net::TcpListener> {
    tracing::info!(%addr, "preflight bind check starting");
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| anyhow::anyhow!("preflight bind failed for {addr}: {e}"))?;
    tracing::info!(%addr, "preflight bind check passed");
    Ok(listener)
}

fn request_id_from_headers(headers: &HeaderMap) -> String {
    headers
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_string())
        .unwrap_or_else(|| "missing".to_string())
}

/// Resolves on ctrl-c or SIGTERM.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};
        let mut terminate = match signal(SignalKind::terminate()) {
            Ok(sig) => sig,
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler; falling back to ctrl_c only");
                if let Err(ctrlc_err) = tokio::signal::ctrl_c().await {
                    tracing::error!(error = %ctrlc_err, "failed to await ctrl-c signal");
                }
                return;
            }
        };
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::warn!("received ctrl-c; beginning graceful shutdown");
            }
            _ = terminate.recv() => {
                tracing::warn!("received SIGTERM; beginning graceful shutdown");
            }
        }
    }
    #[cfg(not(unix))]
    {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to await ctrl-c signal");
        } else {
            tracing::warn!("received ctrl-c; beginning graceful shutdown");
        }
    }
}
