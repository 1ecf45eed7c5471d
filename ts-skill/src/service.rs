use std::sync::Arc;
use ts_envelope::RequestEnvelope;
use ts_timers::{HttpTimerConnector, TimerService};

/// Produces a timer client scoped to the user and token of one request.
pub trait TimerServiceFactory: Send + Sync {
    fn timer_service(&self, envelope: &RequestEnvelope) -> ts_timers::Result<Arc<dyn TimerService>>;
}

pub struct HttpTimerServiceFactory {
    connector: HttpTimerConnector,
}

impl HttpTimerServiceFactory {
    pub fn new(connector: HttpTimerConnector) -> Self {
        Self { connector }
    }
}

impl TimerServiceFactory for HttpTimerServiceFactory {
    fn timer_service(&self, envelope: &RequestEnvelope) -> ts_timers::Result<Arc<dyn TimerService>> {
        let endpoint = envelope.api_endpoint().unwrap_or_default();
        let token = envelope.api_access_token().unwrap_or_default();
        let client = self.connector.connect(endpoint, token)?;
        Ok(Arc::new(client))
    }
}
