//! # masthead-core
//!
//! Shared types for the Masthead admin gate.
//!
//! - [`Role`] and the [`TeamRegistry`] of Role Identity Records
//! - [`MastheadConfig`], loaded from `masthead.yaml` with environment overrides
//! - Wire types shared by the server's debug endpoint and the CLI ([`api`])
//!
//! The registry is resolved once at process start and is immutable afterwards.
//! Nothing in this crate reads the process environment except the explicit
//! `*_from_env` entry points used by the binaries.

pub mod api;
pub mod config;
pub mod error;
pub mod team;

pub use config::{
    AuditConfig, AuthorizationConfig, Environment, MastheadConfig, RateLimitConfig,
    ServerConfig, TeamConfig,
};
pub use error::ConfigError;
pub use team::{ProjectSecret, Role, RoleIdentity, TeamRegistry};
