//! Scripted transport for tests.
//!
//! Responses are queued up front and handed out in order; every request the
//! client sends is recorded so tests can assert on URLs, methods, headers
//! and bodies.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde_json::Value;

use super::{HttpRequest, HttpResponse, Transport};
use crate::error::TransportError;

/// A [`Transport`] that replays queued responses.
#[derive(Debug, Default)]
pub struct MockTransport {
    responses: Mutex<VecDeque<Result<HttpResponse, TransportError>>>,
    requests: Mutex<Vec<HttpRequest>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MockTransport {
    /// Create a transport with nothing queued.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a JSON response.
    pub fn push_json(&self, status: u16, body: &Value) -> &Self {
        self.push_raw(status, body.to_string())
    }

    /// Queue a response with an arbitrary body.
    pub fn push_raw(&self, status: u16, body: impl Into<String>) -> &Self {
        lock(&self.responses).push_back(Ok(HttpResponse::new(status, body)));
        self
    }

    /// Queue a transport failure.
    pub fn push_error(&self, error: TransportError) -> &Self {
        lock(&self.responses).push_back(Err(error));
        self
    }

    /// Every request sent so far, oldest first.
    #[must_use]
    pub fn requests(&self) -> Vec<HttpRequest> {
        lock(&self.requests).clone()
    }

    /// The most recent request, if any.
    #[must_use]
    pub fn last_request(&self) -> Option<HttpRequest> {
        lock(&self.requests).last().cloned()
    }

    /// Number of requests sent so far.
    #[must_use]
    pub fn request_count(&self) -> usize {
        lock(&self.requests).len()
    }

    /// Number of queued responses not yet consumed.
    #[must_use]
    pub fn pending_responses(&self) -> usize {
        lock(&self.responses).len()
    }
}

impl Transport for MockTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let url = request.url.clone();
        lock(&self.requests).push(request);
        lock(&self.responses).pop_front().unwrap_or_else(|| {
            Err(TransportError::Network(format!(
                "no scripted response for {url}"
            )))
        })
    }
}
