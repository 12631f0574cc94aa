//! Request middleware: token gate and rate limiting.

pub mod auth;
pub mod rate_limit;

pub use auth::{require_admin, AdminSession};
pub use rate_limit::{limit_requests, RateLimiter};
