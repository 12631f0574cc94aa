//! HTTP server, rate limiting and authorization configuration.

use crate::team::Role;
use serde::{Deserialize, Serialize};

/// HTTP listener settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerConfig {
    /// `host:port`, suitable for `TcpListener::bind`.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Per-client request limiting for `/api` routes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Whether the limiter is active.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Window length in seconds.
    #[serde(default = "default_window_secs")]
    pub window_secs: u64,

    /// Requests allowed per client within one window.
    #[serde(default = "default_max_requests")]
    pub max_requests: usize,

    /// Chance that an admitted request also prunes stale clients.
    #[serde(default = "default_prune_probability")]
    pub prune_probability: f64,

    /// Timestamps older than this many windows are dropped when pruning.
    #[serde(default = "default_retention_windows")]
    pub retention_windows: u32,
}

fn default_true() -> bool {
    true
}

fn default_window_secs() -> u64 {
    60
}

fn default_max_requests() -> usize {
    100
}

fn default_prune_probability() -> f64 {
    0.01
}

fn default_retention_windows() -> u32 {
    5
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            window_secs: default_window_secs(),
            max_requests: default_max_requests(),
            prune_probability: default_prune_probability(),
            retention_windows: default_retention_windows(),
        }
    }
}

/// Role allow-lists for endpoints that are narrower than "any admin".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorizationConfig {
    /// Roles allowed to read gateway statistics.
    #[serde(default = "default_stats_roles")]
    pub stats: Vec<Role>,
}

fn default_stats_roles() -> Vec<Role> {
    vec![Role::Developer, Role::Pm]
}

impl Default for AuthorizationConfig {
    fn default() -> Self {
        Self {
            stats: default_stats_roles(),
        }
    }
}
