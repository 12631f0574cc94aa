//! Team secret configuration and registry resolution.
//!
//! Each secret resolves with precedence *environment > file > built-in
//! default*. The built-in defaults exist for local development only.

use super::non_empty;
use crate::team::{ProjectSecret, Role, RoleIdentity, TeamRegistry, DEFAULT_PROJECT_SECRET};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Environment variable holding the project secret.
pub const PROJECT_SECRET_ENV: &str = "PROJECT_SECRET";

/// Environment variable names for a role's `(birth_date, phone)` pair.
pub fn role_env_keys(role: Role) -> (&'static str, &'static str) {
    match role {
        Role::Developer => ("DEV_BIRTH", "DEV_PHONE"),
        Role::Designer => ("DESIGN_BIRTH", "DESIGN_PHONE"),
        Role::Marketing => ("MARKETING_BIRTH", "MARKETING_PHONE"),
        Role::Pm => ("PM_BIRTH", "PM_PHONE"),
    }
}

/// Every secret environment variable, in a stable order.
pub fn secret_env_keys() -> Vec<&'static str> {
    let mut keys: Vec<_> = Role::ALL
        .into_iter()
        .flat_map(|role| {
            let (birth, phone) = role_env_keys(role);
            [birth, phone]
        })
        .collect();
    keys.push(PROJECT_SECRET_ENV);
    keys
}

/// File-level secret values for one role.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemberConfig {
    #[serde(default)]
    pub birth_date: Option<String>,

    #[serde(default)]
    pub phone: Option<String>,
}

/// Team section of `masthead.yaml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TeamConfig {
    /// Shared project secret.
    #[serde(default)]
    pub project_secret: Option<String>,

    /// Per-role secret pairs.
    #[serde(default)]
    pub members: BTreeMap<Role, MemberConfig>,
}

/// Where a resolved secret came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SecretSource {
    Environment,
    File,
    Default,
}

impl fmt::Display for SecretSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SecretSource::Environment => f.write_str("environment"),
            SecretSource::File => f.write_str("file"),
            SecretSource::Default => f.write_str("built-in default"),
        }
    }
}

/// Provenance of one secret, keyed by its environment variable name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecretReport {
    pub key: &'static str,
    pub source: SecretSource,
}

/// A resolved registry together with the provenance of each secret.
#[derive(Debug, Clone)]
pub struct ResolvedTeam {
    pub registry: TeamRegistry,
    pub sources: Vec<SecretReport>,
}

impl ResolvedTeam {
    /// Whether any secret fell back to the built-in default.
    pub fn uses_defaults(&self) -> bool {
        self.sources
            .iter()
            .any(|report| report.source == SecretSource::Default)
    }

    /// Per environment variable, whether it was set.
    pub fn environment_info(&self) -> BTreeMap<String, bool> {
        self.sources
            .iter()
            .map(|report| {
                (
                    report.key.to_string(),
                    report.source == SecretSource::Environment,
                )
            })
            .collect()
    }
}

impl TeamConfig {
    /// Resolve the registry against the process environment.
    pub fn resolve_from_env(&self) -> ResolvedTeam {
        self.resolve(|key| std::env::var(key).ok())
    }

    /// Resolve the registry with an injected environment lookup.
    pub fn resolve<F>(&self, lookup: F) -> ResolvedTeam
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut sources = Vec::new();
        let mut pick = |key: &'static str, file: Option<&String>, default: &str| {
            let (value, source) = if let Some(value) = non_empty(lookup(key)) {
                (value, SecretSource::Environment)
            } else if let Some(value) = non_empty(file.cloned()) {
                (value, SecretSource::File)
            } else {
                (default.to_string(), SecretSource::Default)
            };
            sources.push(SecretReport { key, source });
            value.trim().to_string()
        };

        let mut members = Vec::new();
        for role in Role::ALL {
            let (birth_key, phone_key) = role_env_keys(role);
            let file = self.members.get(&role);
            let default = role.default_identity();
            let birth_date = pick(
                birth_key,
                file.and_then(|m| m.birth_date.as_ref()),
                &default.birth_date,
            );
            let phone = pick(phone_key, file.and_then(|m| m.phone.as_ref()), &default.phone);
            members.push((role, RoleIdentity::new(birth_date, phone)));
        }
        let secret = pick(
            PROJECT_SECRET_ENV,
            self.project_secret.as_ref(),
            DEFAULT_PROJECT_SECRET,
        );

        let registry = members
            .into_iter()
            .fold(TeamRegistry::new(ProjectSecret::new(secret)), |registry, (role, identity)| {
                registry.with_member(role, identity)
            });

        if sources.iter().any(|r| r.source == SecretSource::Default) {
            tracing::warn!("team registry uses built-in development secrets");
        }

        ResolvedTeam { registry, sources }
    }
}
