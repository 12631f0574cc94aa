//! Per-client request limiting for `/api`.
//!
//! Each client keeps the instants of its recent requests. A request is
//! refused once `max_requests` instants fall inside the current window.
//! Stale clients are pruned opportunistically: each admitted request has a
//! small chance of sweeping the whole table. Pruning bounds memory only; the
//! limit itself never depends on it.

use crate::audit::{AuditEvent, AuditEventType, RequestContext};
use crate::error::ApiError;
use crate::state::AppState;
use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use masthead_core::RateLimitConfig;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Key used when a request carries no client address headers.
pub const ANONYMOUS_CLIENT: &str = "anonymous";

/// Outcome of a rate limit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allowed,
    Limited { retry_after_secs: u64 },
}

/// In-process request table.
pub struct RateLimiter {
    window: Duration,
    max_requests: usize,
    prune_probability: f64,
    retention: Duration,
    clients: Mutex<HashMap<String, Vec<Instant>>>,
}

impl RateLimiter {
    pub fn new(config: &RateLimitConfig) -> Self {
        let window = Duration::from_secs(config.window_secs.max(1));
        Self {
            window,
            max_requests: config.max_requests,
            prune_probability: config.prune_probability.clamp(0.0, 1.0),
            retention: window
                .checked_mul(config.retention_windows.max(1))
                .unwrap_or(Duration::MAX),
            clients: Mutex::new(HashMap::new()),
        }
    }

    /// Check and record a request for `client` now.
    pub fn check(&self, client: &str) -> Decision {
        let now = Instant::now();
        let decision = self.check_at(client, now);
        if decision == Decision::Allowed
            && self.prune_probability > 0.0
            && rand::random::<f64>() < self.prune_probability
        {
            self.prune_at(now);
        }
        decision
    }

    /// Check and record a request for `client` at `now`.
    pub fn check_at(&self, client: &str, now: Instant) -> Decision {
        let mut clients = self.lock();
        let recent = clients.entry(client.to_string()).or_default();
        recent.retain(|at| now.saturating_duration_since(*at) < self.window);

        if recent.len() >= self.max_requests {
            return Decision::Limited {
                retry_after_secs: self.window.as_secs(),
            };
        }

        recent.push(now);
        Decision::Allowed
    }

    /// Drop instants older than the retention period and forget idle clients.
    pub fn prune_at(&self, now: Instant) {
        let mut clients = self.lock();
        clients.retain(|_, instants| {
            instants.retain(|at| now.saturating_duration_since(*at) <= self.retention);
            !instants.is_empty()
        });
    }

    /// Number of clients currently tracked.
    pub fn tracked_clients(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Vec<Instant>>> {
        self.clients
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Client key: first `x-forwarded-for` entry, then `x-real-ip`, then
/// [`ANONYMOUS_CLIENT`].
pub fn client_key(headers: &HeaderMap) -> String {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty());
    let real_ip = headers
        .get("x-real-ip")
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty());

    forwarded
        .or(real_ip)
        .unwrap_or(ANONYMOUS_CLIENT)
        .to_string()
}

/// Axum middleware enforcing the limiter. A no-op when limiting is disabled.
pub async fn limit_requests(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(limiter) = state.limiter() else {
        return Ok(next.run(req).await);
    };

    let client = client_key(req.headers());
    if let Decision::Limited { retry_after_secs } = limiter.check(&client) {
        tracing::debug!(client = %client, "request rate limited");
        state.stats().record_rate_limited();
        state
            .audit()
            .record(AuditEvent::new(
                AuditEventType::RateLimited,
                None,
                &RequestContext::from_request(&req),
            ))
            .await;
        return Err(ApiError::RateLimited {
            retry_after: retry_after_secs,
        });
    }

    Ok(next.run(req).await)
}
