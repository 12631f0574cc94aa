//! # masthead-server
//!
//! Admin API gate for the Masthead editorial backend.
//!
//! Every route under `/api/control` requires a `token` query parameter that
//! resolves to a role for the current UTC day. Resolution is a pure
//! recomputation (see `masthead-token`), so the gate keeps working when the
//! primary data store is unavailable.
//!
//! | Route | Access |
//! |-------|--------|
//! | `GET /healthz` | open |
//! | `GET /api/control/session` | any role |
//! | `GET /api/control/stats` | `authorization.stats` allow-list |
//! | `GET /api/debug/token` | development environment only |
//!
//! All `/api` routes sit behind a per-client sliding-window rate limiter.

pub mod audit;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod state;

pub use error::{ApiError, ServerError};
pub use routes::create_router;
pub use state::AppState;
