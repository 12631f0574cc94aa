//! Admin audit events.
//!
//! Every gated request produces one event naming the acting role (or the
//! failure), the action and the client. Events go to an [`AuditSink`]; the
//! default sink writes structured `tracing` records on the `audit` target.
//! Sink failures never fail the request.

use async_trait::async_trait;
use axum::extract::{OriginalUri, Request};
use axum::http::header;
use chrono::{DateTime, Utc};
use masthead_core::Role;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Mutex;
use uuid::Uuid;

use crate::middleware::rate_limit::client_key;

/// Type of audit event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditEventType {
    /// A resolved role reached a gated endpoint.
    AdminAccess,
    /// No role matched the presented token.
    AuthenticationFailed,
    /// The resolved role is not on the endpoint's allow-list.
    AuthorizationDenied,
    /// The client exceeded its request budget.
    RateLimited,
}

impl fmt::Display for AuditEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AdminAccess => write!(f, "ADMIN_ACCESS"),
            Self::AuthenticationFailed => write!(f, "AUTH_FAILED"),
            Self::AuthorizationDenied => write!(f, "AUTHZ_DENIED"),
            Self::RateLimited => write!(f, "RATE_LIMITED"),
        }
    }
}

/// An audit event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    pub event_id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub event_type: AuditEventType,
    pub role: Option<Role>,
    /// `<role>_admin`, or `unknown` before a role is resolved.
    pub admin_name: String,
    /// `METHOD /path`.
    pub action: String,
    pub client_ip: String,
    pub user_agent: String,
}

impl AuditEvent {
    pub fn new(event_type: AuditEventType, role: Option<Role>, ctx: &RequestContext) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            occurred_at: Utc::now(),
            event_type,
            role,
            admin_name: admin_name(role),
            action: ctx.action.clone(),
            client_ip: ctx.client_ip.clone(),
            user_agent: ctx.user_agent.clone(),
        }
    }
}

/// The parts of a request recorded in audit events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    /// `METHOD /path`, without the query string (it carries the token).
    pub action: String,
    pub client_ip: String,
    pub user_agent: String,
}

impl RequestContext {
    pub fn from_request(req: &Request) -> Self {
        let user_agent = req
            .headers()
            .get(header::USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("Unknown")
            .to_string();

        // Nested routers see a stripped URI.
        let path = req
            .extensions()
            .get::<OriginalUri>()
            .map(|original| original.0.path())
            .unwrap_or_else(|| req.uri().path());

        Self {
            action: format!("{} {}", req.method(), path),
            client_ip: client_key(req.headers()),
            user_agent,
        }
    }
}

/// Display name recorded for an acting role.
pub fn admin_name(role: Option<Role>) -> String {
    match role {
        Some(role) => format!("{role}_admin"),
        None => "unknown".to_string(),
    }
}

/// Destination for audit events.
#[async_trait]
pub trait AuditSink: Send + Sync {
    async fn record(&self, event: AuditEvent);
}

/// Writes events as structured tracing records.
pub struct TracingSink;

#[async_trait]
impl AuditSink for TracingSink {
    async fn record(&self, event: AuditEvent) {
        let role = event.role.map(|r| r.as_str()).unwrap_or("-");
        match event.event_type {
            AuditEventType::AdminAccess => tracing::info!(
                target: "audit",
                event_id = %event.event_id,
                event_type = %event.event_type,
                role,
                admin = %event.admin_name,
                action = %event.action,
                client_ip = %event.client_ip,
                "admin request"
            ),
            _ => tracing::warn!(
                target: "audit",
                event_id = %event.event_id,
                event_type = %event.event_type,
                role,
                action = %event.action,
                client_ip = %event.client_ip,
                user_agent = %event.user_agent,
                "admin request rejected"
            ),
        }
    }
}

/// Discards events (`audit.enabled = false`).
pub struct NullSink;

#[async_trait]
impl AuditSink for NullSink {
    async fn record(&self, _event: AuditEvent) {}
}

/// Keeps events in memory.
#[derive(Default)]
pub struct MemorySink {
    events: Mutex<Vec<AuditEvent>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of recorded events, oldest first.
    pub fn events(&self) -> Vec<AuditEvent> {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

#[async_trait]
impl AuditSink for MemorySink {
    async fn record(&self, event: AuditEvent) {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(event);
    }
}
