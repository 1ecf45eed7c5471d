use crate::error::{Result, TimerError};
use crate::spec::TimerSpec;
use crate::traits::TimerService;
use crate::types::{Timer, TimerId, TimerList};
use async_trait::async_trait;
use reqwest::Url;
use serde::de::DeserializeOwned;
use std::time::Duration;

const TIMERS_PATH: [&str; 3] = ["v1", "alerts", "timers"];

/// Shared HTTP pool; hands out per-request clients bound to the endpoint and
/// token found in each envelope.
#[derive(Clone)]
pub struct HttpTimerConnector {
    http: reqwest::Client,
    endpoint_override: Option<Url>,
}

impl HttpTimerConnector {
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn new(timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("timerskill/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            endpoint_override: None,
        })
    }

    /// Sends every request to `endpoint` instead of the envelope's API endpoint.
    pub fn with_endpoint_override(mut self, endpoint: Option<&str>) -> Result<Self> {
        self.endpoint_override = endpoint
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .map(parse_endpoint)
            .transpose()?;
        Ok(self)
    }

    pub fn connect(&self, api_endpoint: &str, access_token: &str) -> Result<HttpTimerClient> {
        let access_token = access_token.trim();
        if access_token.is_empty() {
            return Err(TimerError::InvalidInput(
                "api access token is required".to_string(),
            ));
        }
        let base = match &self.endpoint_override {
            Some(url) => url.clone(),
            None => parse_endpoint(api_endpoint)?,
        };
        Ok(HttpTimerClient {
            http: self.http.clone(),
            base,
            access_token: access_token.to_string(),
        })
    }
}

fn parse_endpoint(endpoint: &str) -> Result<Url> {
    let url = Url::parse(endpoint.trim())
        .map_err(|e| TimerError::InvalidInput(format!("invalid api endpoint {endpoint:?}: {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(TimerError::InvalidInput(format!(
            "api endpoint must use http or https, got {other}"
        ))),
    }
}

#[derive(Clone)]
pub struct HttpTimerClient {
    http: reqwest::Client,
    base: Url,
    access_token: String,
}

impl HttpTimerClient {
    fn url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| TimerError::InvalidInput(format!("api endpoint {} cannot be a base", self.base)))?
            .pop_if_empty()
            .extend(TIMERS_PATH)
            .extend(segments);
        Ok(url)
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response> {
        let response = request.bearer_auth(&self.access_token).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<failed to read response body>".to_string());
            tracing::debug!(status = status.as_u16(), %body, "timer api call rejected");
            return Err(TimerError::from_status(status.as_u16(), body));
        }
        Ok(response)
    }

    async fn json<T: DeserializeOwned>(&self, request: reqwest::RequestBuilder) -> Result<T> {
        let body = self.send(request).await?.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl TimerService for HttpTimerClient {
    #[tracing::instrument(level = "info", skip_all)]
    async fn list_timers(&self) -> Result<TimerList> {
        let url = self.url(&[])?;
        let list: TimerList = self.json(self.http.get(url)).await?;
        tracing::debug!(total_count = list.total_count, "timers listed");
        Ok(list)
    }

    #[tracing::instrument(level = "info", skip_all, fields(timer_id = %id))]
    async fn get_timer(&self, id: &TimerId) -> Result<Timer> {
        let url = self.url(&[id.as_str()])?;
        self.json(self.http.get(url)).await
    }

    #[tracing::instrument(level = "info", skip_all, fields(duration = %spec.duration))]
    async fn create_timer(&self, spec: &TimerSpec) -> Result<Timer> {
        let url = self.url(&[])?;
        let timer: Timer = self.json(self.http.post(url).json(spec)).await?;
        tracing::debug!(timer_id = %timer.id, status = %timer.status, "timer created");
        Ok(timer)
    }

    #[tracing::instrument(level = "info", skip_all, fields(timer_id = %id))]
    async fn delete_timer(&self, id: &TimerId) -> Result<()> {
        let url = self.url(&[id.as_str()])?;
        self.send(self.http.delete(url)).await?;
        Ok(())
    }

    #[tracing::instrument(level = "info", skip_all)]
    async fn delete_all_timers(&self) -> Result<()> {
        let url = self.url(&[])?;
        self.send(self.http.delete(url)).await?;
        Ok(())
    }

    #[tracing::instrument(level = "info", skip_all, fields(timer_id = %id))]
    async fn pause_timer(&self, id: &TimerId) -> Result<()> {
        let url = self.url(&[id.as_str(), "pause"])?;
        self.send(self.http.post(url)).await?;
        Ok(())
    }

    #[tracing::instrument(level = "info", skip_all, fields(timer_id = %id))]
    async fn resume_timer(&self, id: &TimerId) -> Result<()> {
        let url = self.url(&[id.as_str(), "resume"])?;
        self.send(self.http.post(url)).await?;
        Ok(())
    }
}
