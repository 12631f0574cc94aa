//! Router construction.

use crate::handlers;
use crate::middleware::{auth, rate_limit};
use crate::state::AppState;
use axum::{extract::Request, middleware, routing::get, Router};
use tower_http::trace::TraceLayer;
use tracing::Span;

/// Create the admin API router.
pub fn create_router(state: AppState) -> Router {
    let control = Router::new()
        .route("/session", get(handlers::session))
        .route("/stats", get(handlers::stats))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_admin,
        ));

    let api = Router::new()
        .nest("/control", control)
        .route("/debug/token", get(handlers::debug_token))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit::limit_requests,
        ));

    Router::new()
        .route("/healthz", get(handlers::healthz))
        .nest("/api", api)
        .layer(TraceLayer::new_for_http().make_span_with(request_span))
        .with_state(state)
}

/// Request span without the query string, which carries the token.
fn request_span(req: &Request) -> Span {
    tracing::debug_span!(
        "request",
        method = %req.method(),
        path = %req.uri().path(),
        version = ?req.version(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use std::io;
    use std::sync::{Arc, Mutex};
    use tracing::Level;

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_request_span_omits_query() {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(Level::DEBUG)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            let req = Request::builder()
                .uri("/api/control/session?token=1a2b3c4d-5e6f-7a8b")
                .body(Body::empty())
                .unwrap();
            let span = request_span(&req);
            let _entered = span.enter();
            tracing::debug!("handled");
        });

        let output = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains("/api/control/session"));
        assert!(!output.contains("1a2b3c4d"));
        assert!(!output.contains("token="));
    }
}
