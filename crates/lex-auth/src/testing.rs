//! Scripted in-memory [`Transport`] for tests of this crate and its dependents.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;

use crate::error::TransportError;
use crate::transport::{ApiRequest, ApiResponse, Transport};

type Handler = dyn Fn(&ApiRequest) -> Result<ApiResponse, TransportError> + Send + Sync;

/// Answers every request with a caller-supplied closure and records what it saw.
pub struct ScriptedTransport {
    handler: Box<Handler>,
    delay: Option<Duration>,
    probe_error: Option<TransportError>,
    requests: Mutex<Vec<ApiRequest>>,
    probes: AtomicUsize,
}

impl ScriptedTransport {
    pub fn new(
        handler: impl Fn(&ApiRequest) -> Result<ApiResponse, TransportError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            handler: Box::new(handler),
            delay: None,
            probe_error: None,
            requests: Mutex::new(Vec::new()),
            probes: AtomicUsize::new(0),
        }
    }

    /// Sleep before answering, to hold requests in flight.
    #[must_use]
    pub const fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Make every reachability probe fail with `error`.
    #[must_use]
    pub fn with_failing_probe(mut self, error: TransportError) -> Self {
        self.probe_error = Some(error);
        self
    }

    /// Every request sent so far, in order.
    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Requests whose URL path ends with `suffix` (query string ignored).
    pub fn calls_to(&self, suffix: &str) -> usize {
        self.requests()
            .iter()
            .filter(|request| {
                let path = request.url.split('?').next().unwrap_or_default();
                path.ends_with(suffix)
            })
            .count()
    }

    pub fn probes(&self) -> usize {
        self.probes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request.clone());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        (self.handler)(&request)
    }

    async fn probe(&self, _url: &str, _timeout: Duration) -> Result<(), TransportError> {
        self.probes.fetch_add(1, Ordering::SeqCst);
        match &self.probe_error {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}

/// Response with `body` serialized as JSON.
pub fn json_response(status: u16, body: &impl Serialize) -> ApiResponse {
    ApiResponse::new(status, serde_json::to_vec(body).unwrap_or_default())
}
