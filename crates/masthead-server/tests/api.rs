//! End-to-end tests for the admin API router.

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use masthead_core::{Environment, MastheadConfig, Role, TeamRegistry};
use masthead_server::audit::{AuditEventType, MemorySink};
use masthead_server::{create_router, AppState};
use masthead_token::{DigestProvider, TokenEngine, TokenError};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use tower::ServiceExt;

struct Harness {
    state: AppState,
    audit: Arc<MemorySink>,
}

impl Harness {
    fn new(configure: impl FnOnce(&mut MastheadConfig)) -> Self {
        let mut config = MastheadConfig::default();
        config.rate_limit.prune_probability = 0.0;
        configure(&mut config);

        let team = config.team.resolve(|_| None);
        let audit = Arc::new(MemorySink::new());
        let state = AppState::with_audit_sink(&config, team, audit.clone());
        Self { state, audit }
    }

    fn production() -> Self {
        Self::new(|_| {})
    }

    fn development() -> Self {
        Self::new(|config| config.environment = Environment::Development)
    }

    fn router(&self) -> Router {
        create_router(self.state.clone())
    }

    fn token(&self, role: Role) -> String {
        self.state.engine().today_token(role).unwrap()
    }

    async fn get(&self, uri: &str) -> (StatusCode, Value) {
        let response = self
            .router()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }
}

#[tokio::test]
async fn test_healthz_is_open() {
    let harness = Harness::production();
    let (status, body) = harness.get("/healthz").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_missing_and_wrong_tokens_are_unauthorized() {
    let harness = Harness::production();

    let (status, body) = harness.get("/api/control/session").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Unauthorized");

    let (status, _) = harness
        .get("/api/control/session?token=00000000-0000-0000")
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let events = harness.audit.events();
    assert_eq!(events.len(), 2);
    assert!(events
        .iter()
        .all(|e| e.event_type == AuditEventType::AuthenticationFailed && e.role.is_none()));
}

#[tokio::test]
async fn test_session_resolves_every_role() {
    let harness = Harness::production();

    for role in Role::ALL {
        let uri = format!("/api/control/session?token={}", harness.token(role));
        let (status, body) = harness.get(&uri).await;
        assert_eq!(status, StatusCode::OK, "role {role}");
        assert_eq!(body["adminRole"], role.as_str());
        assert_eq!(body["adminName"], format!("{role}_admin"));
    }

    let events = harness.audit.events();
    assert_eq!(events.len(), Role::ALL.len());
    assert_eq!(events[0].event_type, AuditEventType::AdminAccess);
    assert_eq!(events[0].action, "GET /api/control/session");
}

#[tokio::test]
async fn test_stats_allow_list() {
    let harness = Harness::production();

    for role in [Role::Designer, Role::Marketing] {
        let uri = format!("/api/control/stats?token={}", harness.token(role));
        let (status, body) = harness.get(&uri).await;
        assert_eq!(status, StatusCode::FORBIDDEN, "role {role}");
        assert_eq!(body["error"], "Forbidden");
    }

    let uri = format!("/api/control/stats?token={}", harness.token(Role::Pm));
    let (status, body) = harness.get(&uri).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["adminRole"], "pm");
    assert_eq!(body["statistics"]["deniedAuthorizations"], 2);
    assert_eq!(body["statistics"]["admitted"]["pm"], 1);

    let denied: Vec<_> = harness
        .audit
        .events()
        .into_iter()
        .filter(|e| e.event_type == AuditEventType::AuthorizationDenied)
        .collect();
    assert_eq!(denied.len(), 2);
    assert_eq!(denied[0].role, Some(Role::Designer));
}

#[tokio::test]
async fn test_debug_endpoint_disabled_in_production() {
    let harness = Harness::production();
    let (status, body) = harness.get("/api/debug/token?token=anything").await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "This API is only available in development");
}

#[tokio::test]
async fn test_debug_endpoint_requires_token() {
    let harness = Harness::development();

    let (status, body) = harness.get("/api/debug/token").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Token parameter is required");

    let (status, _) = harness.get("/api/debug/token?token=").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_debug_endpoint_reports_expected_tokens() {
    let harness = Harness::development();
    let token = harness.token(Role::Marketing);

    let (status, body) = harness
        .get(&format!("/api/debug/token?token={token}"))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let debug = &body["debug"];
    assert_eq!(debug["receivedToken"], token.as_str());
    assert_eq!(debug["validRole"], "marketing");
    assert_eq!(debug["isValid"], true);
    assert_eq!(debug["currentDate"].as_str().unwrap().len(), 8);
    for role in Role::ALL {
        assert!(debug["expectedTokens"][role.as_str()].is_string());
        assert!(debug["tokenIngredients"][role.as_str()].is_string());
    }
    assert_eq!(debug["environmentInfo"]["PROJECT_SECRET"], false);
    assert_eq!(body["result"]["message"], "Valid token for role: marketing");

    let (status, body) = harness.get("/api/debug/token?token=nope").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["debug"]["isValid"], false);
    assert_eq!(body["result"]["message"], "Invalid token");
}

#[tokio::test]
async fn test_rate_limit_per_client() {
    let harness = Harness::new(|config| config.rate_limit.max_requests = 2);
    let router = harness.router();

    let request = |ip: &str| {
        Request::builder()
            .uri("/api/control/session")
            .header("x-forwarded-for", ip)
            .body(Body::empty())
            .unwrap()
    };

    for _ in 0..2 {
        let response = router.clone().oneshot(request("203.0.113.5")).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    let response = router.clone().oneshot(request("203.0.113.5")).await.unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(response.headers()[header::RETRY_AFTER], "60");
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["retryAfter"], 60);

    // Another client keeps its own budget.
    let response = router.oneshot(request("198.51.100.1")).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let limited = harness
        .audit
        .events()
        .into_iter()
        .filter(|e| e.event_type == AuditEventType::RateLimited)
        .count();
    assert_eq!(limited, 1);
}

#[tokio::test]
async fn test_healthz_is_not_rate_limited() {
    let harness = Harness::new(|config| config.rate_limit.max_requests = 1);
    for _ in 0..3 {
        let (status, _) = harness.get("/healthz").await;
        assert_eq!(status, StatusCode::OK);
    }
}

#[tokio::test]
async fn test_disabled_rate_limit() {
    let harness = Harness::new(|config| {
        config.rate_limit.enabled = false;
        config.rate_limit.max_requests = 1;
    });
    for _ in 0..3 {
        let (status, _) = harness.get("/api/control/session").await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}

#[tokio::test]
async fn test_repeated_token_keys_use_the_first_value() {
    let harness = Harness::production();

    let (status, body) = harness.get("/api/control/session?token=a&token=b").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Unauthorized");

    let pm = harness.token(Role::Pm);
    let (status, body) = harness
        .get(&format!("/api/control/session?token={pm}&token=garbage"))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["adminRole"], "pm");

    let (status, _) = harness
        .get(&format!("/api/control/session?token=garbage&token={pm}"))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let failed = harness
        .audit
        .events()
        .into_iter()
        .filter(|e| e.event_type == AuditEventType::AuthenticationFailed)
        .count();
    assert_eq!(failed, 2);
}

#[tokio::test]
async fn test_undecodable_token_is_unauthorized() {
    let harness = Harness::production();
    let (status, body) = harness.get("/api/control/session?token=%FF").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Unauthorized");
}

#[tokio::test]
async fn test_debug_endpoint_repeated_token_keys() {
    let harness = Harness::development();
    let pm = harness.token(Role::Pm);
    let (status, body) = harness
        .get(&format!("/api/debug/token?token={pm}&token=other"))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["debug"]["receivedToken"], pm.as_str());
    assert_eq!(body["debug"]["validRole"], "pm");
}

struct FailingDigest;

impl DigestProvider for FailingDigest {
    fn hex_digest(&self, _data: &[u8]) -> Result<String, TokenError> {
        Err(TokenError::DigestUnavailable("no backend".to_string()))
    }
}

#[tokio::test]
async fn test_digest_failure_is_an_internal_error() {
    let config = MastheadConfig::default();
    let engine = TokenEngine::new(TeamRegistry::development_defaults(), Arc::new(FailingDigest));
    let audit = Arc::new(MemorySink::new());
    let state = AppState::with_engine(&config, engine, BTreeMap::new(), audit.clone());

    let response = create_router(state)
        .oneshot(
            Request::builder()
                .uri("/api/control/session?token=anything")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Internal server error");
    assert!(audit.events().is_empty());
}
