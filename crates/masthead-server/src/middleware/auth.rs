//! Token gate for admin routes.

use crate::audit::{AuditEvent, AuditEventType, RequestContext};
use crate::error::ApiError;
use crate::state::AppState;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use masthead_core::Role;

/// The acting identity of a request that passed the gate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AdminSession {
    pub role: Role,
}

/// First `token` value of a raw query string.
///
/// Repeated keys keep the first value. A value that does not decode reads
/// as absent, so malformed queries take the ordinary no-match path.
pub fn token_param(query: Option<&str>) -> Option<String> {
    let raw = query?.split('&').find_map(|pair| {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        (decode_component(key).as_deref() == Some("token")).then_some(value)
    })?;
    decode_component(raw)
}

fn decode_component(raw: &str) -> Option<String> {
    urlencoding::decode(&raw.replace('+', " "))
        .ok()
        .map(|decoded| decoded.into_owned())
}

/// Axum middleware resolving the `token` query parameter to a role.
///
/// A missing token and a wrong token get the same 401. On success the
/// request carries an [`AdminSession`] extension.
pub async fn require_admin(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let presented = token_param(req.uri().query()).unwrap_or_default();
    let ctx = RequestContext::from_request(&req);

    let role = state.engine().resolve_role(&presented).map_err(|err| {
        tracing::error!(error = %err, "token resolution failed");
        ApiError::Internal(err.into())
    })?;

    let Some(role) = role else {
        state.stats().record_rejected();
        state
            .audit()
            .record(AuditEvent::new(AuditEventType::AuthenticationFailed, None, &ctx))
            .await;
        return Err(ApiError::Unauthorized);
    };

    state.stats().record_admitted(role);
    state
        .audit()
        .record(AuditEvent::new(AuditEventType::AdminAccess, Some(role), &ctx))
        .await;

    req.extensions_mut().insert(AdminSession { role });
    Ok(next.run(req).await)
}

/// Check an already resolved role against an endpoint allow-list.
pub async fn authorize(
    state: &AppState,
    session: AdminSession,
    allowed: &[Role],
    ctx: &RequestContext,
) -> Result<(), ApiError> {
    if allowed.contains(&session.role) {
        return Ok(());
    }

    state.stats().record_denied();
    state
        .audit()
        .record(AuditEvent::new(
            AuditEventType::AuthorizationDenied,
            Some(session.role),
            ctx,
        ))
        .await;
    Err(ApiError::Forbidden)
}
