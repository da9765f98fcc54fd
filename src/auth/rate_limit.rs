//! Login attempt throttling

use std::collections::{HashMap, VecDeque};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    extract::{ConnectInfo, Request},
    http::HeaderMap,
};
use tokio::sync::Mutex;

/// Sliding-window limiter keyed by client address
#[derive(Clone)]
pub struct LoginLimiter {
    max_attempts: usize,
    window: Duration,
    attempts: Arc<Mutex<HashMap<String, VecDeque<Instant>>>>,
}

impl LoginLimiter {
    pub fn new(max_attempts: usize, window: Duration) -> Self {
        Self {
            max_attempts,
            window,
            attempts: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Record an attempt for `key`. Returns false once the limit is reached.
    pub async fn check(&self, key: &str) -> bool {
        self.check_at(key, Instant::now()).await
    }

    async fn check_at(&self, key: &str, now: Instant) -> bool {
        let mut attempts = self.attempts.lock().await;

        // Drop idle clients so the map does not grow without bound
        attempts.retain(|_, times| {
            times
                .back()
                .is_some_and(|last| now.duration_since(*last) < self.window)
        });

        let times = attempts.entry(key.to_string()).or_default();
        while times
            .front()
            .is_some_and(|first| now.duration_since(*first) >= self.window)
        {
            times.pop_front();
        }

        if times.len() >= self.max_attempts {
            return false;
        }
        times.push_back(now);
        true
    }

    /// Clients currently tracked
    pub async fn tracked_clients(&self) -> usize {
        self.attempts.lock().await.len()
    }
}

/// Identify the caller: connection address, then X-Forwarded-For, then "unknown"
pub fn client_key(req: &Request) -> String {
    if let Some(ConnectInfo(addr)) = req.extensions().get::<ConnectInfo<SocketAddr>>() {
        return addr.ip().to_string();
    }
    forwarded_for(req.headers()).unwrap_or_else(|| "unknown".to_string())
}

fn forwarded_for(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-forwarded-for")?
        .to_str()
        .ok()?
        .split(',')
        .next()
        .map(|ip| ip.trim().to_string())
        .filter(|ip| !ip.is_empty())
}
