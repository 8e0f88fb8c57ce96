//! Outbound delivery of webhook payloads.
//!
//! This module provides the [`Transport`] trait, the reqwest-backed
//! [`HttpTransport`] used in production and the in-memory
//! [`RecordingTransport`] used to exercise the trigger without a network.

use std::collections::VecDeque;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use reqwest::header::CONTENT_TYPE;
use serde::Serialize;
use tracing::debug;

use crate::config::TransportSettings;
use crate::error::DeliveryError;

/// A single JSON POST with a bounded timeout.
pub trait Transport: Send + Sync {
    /// POSTs `body` as JSON to `url`.
    ///
    /// # Errors
    ///
    /// Returns a `DeliveryError` on network failure, timeout or any
    /// non-2xx response.
    fn post_json<T>(
        &self,
        url: &str,
        body: &T,
        timeout: Duration,
    ) -> impl Future<Output = Result<(), DeliveryError>> + Send
    where
        T: Serialize + Sync;
}

impl<X: Transport> Transport for Arc<X> {
    fn post_json<T>(
        &self,
        url: &str,
        body: &T,
        timeout: Duration,
    ) -> impl Future<Output = Result<(), DeliveryError>> + Send
    where
        T: Serialize + Sync,
    {
        (**self).post_json(url, body, timeout)
    }
}

/// HTTP transport built on `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Builds a transport from TLS settings.
    ///
    /// # Errors
    ///
    /// Returns `DeliveryError::Client` if the root CA cannot be read or the
    /// client cannot be constructed.
    pub fn new(settings: &TransportSettings) -> Result<Self, DeliveryError> {
        let mut builder = reqwest::Client::builder()
            .user_agent(concat!("warden/", env!("CARGO_PKG_VERSION")))
            .danger_accept_invalid_certs(settings.tls_skip_verify);

        if let Some(path) = &settings.root_ca {
            let pem = std::fs::read(path).map_err(|e| DeliveryError::Client {
                reason: format!("reading root CA {}: {e}", path.display()),
            })?;
            let cert = reqwest::Certificate::from_pem(&pem).map_err(|e| DeliveryError::Client {
                reason: format!("parsing root CA {}: {e}", path.display()),
            })?;
            builder = builder.add_root_certificate(cert);
        }

        let client = builder.build().map_err(|e| DeliveryError::Client {
            reason: e.to_string(),
        })?;
        Ok(Self { client })
    }

    fn classify(url: &str, timeout: Duration, err: &reqwest::Error) -> DeliveryError {
        if err.is_timeout() {
            DeliveryError::Timeout {
                url: url.to_string(),
                timeout,
            }
        } else {
            DeliveryError::Request {
                url: url.to_string(),
                reason: err.to_string(),
            }
        }
    }
}

impl Transport for HttpTransport {
    async fn post_json<T>(&self, url: &str, body: &T, timeout: Duration) -> Result<(), DeliveryError>
    where
        T: Serialize + Sync,
    {
        let bytes =
            serde_json::to_vec(body).map_err(|e| DeliveryError::Serialization(e.to_string()))?;

        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .timeout(timeout)
            .body(bytes)
            .send()
            .await
            .map_err(|e| Self::classify(url, timeout, &e))?;

        let status = response.status();
        debug!(url = %url, status = status.as_u16(), "webhook response");
        if !status.is_success() {
            return Err(DeliveryError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(())
    }
}

/// A delivery captured by [`RecordingTransport`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedDelivery {
    /// Destination URL.
    pub url: String,
    /// The payload, as JSON.
    pub body: serde_json::Value,
    /// Timeout the caller asked for.
    pub timeout: Duration,
}

#[derive(Default)]
struct RecordingState {
    delivered: Vec<RecordedDelivery>,
    attempts: usize,
    scripted: VecDeque<Result<(), DeliveryError>>,
    fail_always: Option<DeliveryError>,
}

/// In-memory transport that records payloads instead of sending them.
///
/// Outcomes can be scripted per call with [`push_outcome`](Self::push_outcome)
/// or forced with [`fail_always`](Self::fail_always). Only successful
/// attempts are recorded as deliveries.
#[derive(Default)]
pub struct RecordingTransport {
    state: Mutex<RecordingState>,
}

impl RecordingTransport {
    /// Creates a transport where every delivery succeeds.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues the outcome of the next unscripted attempt.
    pub fn push_outcome(&self, outcome: Result<(), DeliveryError>) {
        self.state.lock().scripted.push_back(outcome);
    }

    /// Makes every attempt fail with `err` once scripted outcomes run out.
    pub fn fail_always(&self, err: DeliveryError) {
        self.state.lock().fail_always = Some(err);
    }

    /// Returns the successful deliveries, oldest first.
    #[must_use]
    pub fn deliveries(&self) -> Vec<RecordedDelivery> {
        self.state.lock().delivered.clone()
    }

    /// Returns the number of attempts, successful or not.
    #[must_use]
    pub fn attempts(&self) -> usize {
        self.state.lock().attempts
    }
}

impl fmt::Debug for RecordingTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("RecordingTransport")
            .field("attempts", &state.attempts)
            .field("delivered", &state.delivered.len())
            .finish_non_exhaustive()
    }
}

impl Transport for RecordingTransport {
    async fn post_json<T>(&self, url: &str, body: &T, timeout: Duration) -> Result<(), DeliveryError>
    where
        T: Serialize + Sync,
    {
        let body =
            serde_json::to_value(body).map_err(|e| DeliveryError::Serialization(e.to_string()))?;

        let mut state = self.state.lock();
        state.attempts += 1;
        let outcome = match state.scripted.pop_front() {
            Some(outcome) => outcome,
            None => state.fail_always.clone().map_or(Ok(()), Err),
        };
        if outcome.is_ok() {
            state.delivered.push(RecordedDelivery {
                url: url.to_string(),
                body,
                timeout,
            });
        }
        outcome
    }
}
