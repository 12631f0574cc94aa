//! Route handlers.

use crate::audit::{admin_name, RequestContext};
use crate::error::ApiError;
use crate::middleware::auth::{authorize, token_param, AdminSession};
use crate::state::AppState;
use axum::{
    extract::{Request, State},
    http::Uri,
    Extension, Json,
};
use chrono::{SecondsFormat, Utc};
use masthead_core::api::{DebugInfo, DebugResult, DebugTokenResponse};
use serde_json::{json, Value};

/// Liveness probe.
pub async fn healthz() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "masthead-server",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// The role bound to the presented token.
pub async fn session(Extension(session): Extension<AdminSession>) -> Json<Value> {
    Json(json!({
        "success": true,
        "adminRole": session.role,
        "adminName": admin_name(Some(session.role)),
        "timestamp": now_rfc3339(),
    }))
}

/// Gateway counters, restricted to the `authorization.stats` allow-list.
pub async fn stats(
    State(state): State<AppState>,
    Extension(session): Extension<AdminSession>,
    req: Request,
) -> Result<Json<Value>, ApiError> {
    let ctx = RequestContext::from_request(&req);
    authorize(&state, session, &state.authorization().stats, &ctx).await?;

    let tracked_clients = state.limiter().map(|l| l.tracked_clients()).unwrap_or(0);
    Ok(Json(json!({
        "success": true,
        "statistics": state.stats().snapshot(tracked_clients),
        "adminRole": session.role,
        "timestamp": now_rfc3339(),
    })))
}

/// Token diagnostics. Exposes live secrets, so development only.
pub async fn debug_token(
    State(state): State<AppState>,
    uri: Uri,
) -> Result<Json<DebugTokenResponse>, ApiError> {
    if !state.environment().is_development() {
        return Err(ApiError::DebugDisabled);
    }
    let token = token_param(uri.query())
        .filter(|t| !t.is_empty())
        .ok_or(ApiError::MissingToken)?;

    let report = state.engine().diagnose(&token).map_err(|err| {
        tracing::error!(error = %err, "token diagnostics failed");
        ApiError::Internal(err.into())
    })?;

    Ok(Json(DebugTokenResponse {
        success: true,
        debug: DebugInfo {
            received_token: report.received_token,
            current_date: report.day.to_string(),
            current_date_time: report
                .checked_at
                .to_rfc3339_opts(SecondsFormat::Millis, true),
            valid_role: report.role,
            is_valid: report.role.is_some(),
            expected_tokens: report.expected_tokens,
            token_ingredients: report.ingredients,
            environment_info: state.environment_info().clone(),
        },
        result: DebugResult::for_role(report.role),
    }))
}

fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
