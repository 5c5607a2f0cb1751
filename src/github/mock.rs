//! In-memory transport for tests and offline demos
//!
//! Replies are keyed by the target as written (path or absolute URL).
//! Unknown targets answer 404 like the real API. Every request is recorded,
//! and an optional latency lets tests observe fan-out concurrency.

use super::transport::{Target, Transport};
use crate::{InsightsError, Result};
use async_trait::async_trait;
use serde_json::json;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

#[derive(Debug, Clone)]
enum MockReply {
    Json(serde_json::Value),
    Status(u16, serde_json::Value),
}

#[derive(Debug, Default)]
pub struct MockTransport {
    replies: HashMap<String, MockReply>,
    latency: Option<Duration>,
    requests: Mutex<Vec<String>>,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `target` with a 200 and `body`
    pub fn with_json(mut self, target: impl Into<String>, body: serde_json::Value) -> Self {
        self.replies.insert(target.into(), MockReply::Json(body));
        self
    }

    /// Answer `target` with a failing status and `body`
    pub fn with_status(
        mut self,
        target: impl Into<String>,
        status: u16,
        body: serde_json::Value,
    ) -> Self {
        self.replies
            .insert(target.into(), MockReply::Status(status, body));
        self
    }

    /// Delay every reply, so concurrent requests overlap
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Targets requested so far, in order of arrival
    pub fn requests(&self) -> Vec<String> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }

    pub fn request_count(&self, target: &str) -> usize {
        self.requests().iter().filter(|r| *r == target).count()
    }

    /// Highest number of requests observed in flight at once
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn request(&self, target: &Target) -> Result<serde_json::Value> {
        let key = target.to_string();
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(key.clone());
        }

        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(current, Ordering::SeqCst);

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        match self.replies.get(&key) {
            Some(MockReply::Json(body)) => Ok(body.clone()),
            Some(MockReply::Status(status, body)) => {
                Err(InsightsError::from_status(*status, key, body.clone()))
            }
            None => Err(InsightsError::from_status(
                404,
                key,
                json!({"message": "Not Found"}),
            )),
        }
    }
}
