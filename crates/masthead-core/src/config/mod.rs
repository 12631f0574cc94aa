//! Configuration types for Masthead.
//!
//! Configuration is read from a single YAML file (`masthead.yaml` by default,
//! or the path in `MASTHEAD_CONFIG`) and then overlaid with environment
//! variables. Every section has defaults, so an empty or missing default file
//! is a valid configuration.
//!
//! ```yaml
//! environment: development
//! server:
//!   host: 127.0.0.1
//!   port: 3000
//! team:
//!   project_secret: change-me
//!   members:
//!     developer: { birth_date: "19900101", phone: "01012345678" }
//! rate_limit:
//!   max_requests: 100
//!   window_secs: 60
//! authorization:
//!   stats: [developer, pm]
//! ```

pub mod audit;
pub mod server;
pub mod team;

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub use audit::AuditConfig;
pub use server::{AuthorizationConfig, RateLimitConfig, ServerConfig};
pub use team::{
    role_env_keys, secret_env_keys, MemberConfig, ResolvedTeam, SecretReport, SecretSource,
    TeamConfig, PROJECT_SECRET_ENV,
};

/// Environment variable holding the configuration file path.
pub const CONFIG_PATH_ENV: &str = "MASTHEAD_CONFIG";

/// Environment variable overriding [`MastheadConfig::environment`].
pub const ENVIRONMENT_ENV: &str = "MASTHEAD_ENV";

/// Default configuration file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "masthead.yaml";

/// Deployment environment. Development unlocks the debug endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    #[default]
    Production,
}

impl Environment {
    pub fn is_development(self) -> bool {
        self == Environment::Development
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Environment::Development => f.write_str("development"),
            Environment::Production => f.write_str("production"),
        }
    }
}

impl FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "production" | "prod" => Ok(Environment::Production),
            other => Err(ConfigError::UnknownEnvironment(other.to_string())),
        }
    }
}

/// Complete Masthead configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MastheadConfig {
    /// Deployment environment.
    #[serde(default)]
    pub environment: Environment,

    /// HTTP listener settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Team secrets. Environment variables take precedence.
    #[serde(default)]
    pub team: TeamConfig,

    /// Sliding-window rate limiting in front of `/api`.
    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    /// Per-endpoint role allow-lists.
    #[serde(default)]
    pub authorization: AuthorizationConfig,

    /// Admin audit events.
    #[serde(default)]
    pub audit: AuditConfig,
}

impl MastheadConfig {
    /// Parse configuration from a YAML string.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Load configuration from a YAML file.
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.display().to_string()));
        }
        let raw = fs::read_to_string(path)?;
        Self::from_yaml_str(&raw)
    }

    /// Locate and load configuration, then apply environment overrides.
    ///
    /// An explicit `MASTHEAD_CONFIG` path must exist; the default
    /// `masthead.yaml` is optional.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with(|key| std::env::var(key).ok())
    }

    /// [`MastheadConfig::load`] with an injected environment lookup.
    pub fn load_with<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config = match non_empty(lookup(CONFIG_PATH_ENV)) {
            Some(path) => Self::load_from_path(&PathBuf::from(path))?,
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    Self::load_from_path(&default_path)?
                } else {
                    tracing::debug!("no {DEFAULT_CONFIG_FILE} found, using defaults");
                    Self::default()
                }
            }
        };
        config.with_env_overrides(lookup)
    }

    /// Apply environment overrides that are not team secrets.
    pub fn with_env_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(env) = non_empty(lookup(ENVIRONMENT_ENV)) {
            self.environment = env.parse()?;
        }
        Ok(self)
    }
}

/// Treat empty environment values as unset.
pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
