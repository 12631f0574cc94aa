//! Token derivation and role resolution.

use crate::day::DayStamp;
use crate::digest::{DigestProvider, Sha256Digest};
use crate::error::TokenError;
use chrono::{DateTime, Utc};
use masthead_core::{Role, TeamRegistry};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Length of a formatted token: `xxxxxxxx-xxxx-xxxx`.
pub const TOKEN_LEN: usize = 18;

const INGREDIENT_SEPARATOR: &str = "|";

/// Derives and verifies daily role tokens.
///
/// Holds only immutable configuration; every call is a pure function of its
/// inputs and the wall clock.
#[derive(Clone)]
pub struct TokenEngine {
    registry: TeamRegistry,
    digest: Arc<dyn DigestProvider>,
}

impl TokenEngine {
    /// Create an engine with an explicit digest provider.
    pub fn new(registry: TeamRegistry, digest: Arc<dyn DigestProvider>) -> Self {
        Self { registry, digest }
    }

    /// Create an engine backed by SHA-256.
    pub fn sha256(registry: TeamRegistry) -> Self {
        Self::new(registry, Arc::new(Sha256Digest))
    }

    pub fn registry(&self) -> &TeamRegistry {
        &self.registry
    }

    /// The pipe-joined derivation input for `role` on `day`.
    ///
    /// Contains the role's secrets and the project secret.
    pub fn ingredients(&self, day: &DayStamp, role: Role) -> Result<String, TokenError> {
        let identity = self
            .registry
            .identity(role)
            .ok_or_else(|| TokenError::UnknownRole(role.to_string()))?;
        let secret = self.registry.project_secret().expose();
        if !identity.is_complete() || secret.is_empty() {
            return Err(TokenError::IncompleteIdentity(role));
        }

        Ok([
            day.as_str(),
            identity.birth_date.as_str(),
            identity.phone.as_str(),
            role.as_str(),
            secret,
        ]
        .join(INGREDIENT_SEPARATOR))
    }

    /// The token for `role` on `day`.
    pub fn derive_token(&self, day: &DayStamp, role: Role) -> Result<String, TokenError> {
        let ingredients = self.ingredients(day, role)?;
        let hex = self.digest.hex_digest(ingredients.as_bytes())?;
        format_token(&hex)
    }

    /// The token for `role` today (UTC).
    pub fn today_token(&self, role: Role) -> Result<String, TokenError> {
        self.derive_token(&DayStamp::today(), role)
    }

    /// Resolve a presented token to the role it was issued for today.
    pub fn resolve_role(&self, presented: &str) -> Result<Option<Role>, TokenError> {
        self.resolve_role_on(&DayStamp::today(), presented)
    }

    /// Resolve a presented token against `day`.
    ///
    /// Every role is evaluated. Malformed input is a plain non-match, and a
    /// role whose identity is unusable fails closed. Only a digest failure is
    /// returned as an error.
    pub fn resolve_role_on(
        &self,
        day: &DayStamp,
        presented: &str,
    ) -> Result<Option<Role>, TokenError> {
        let mut matched = None;
        for role in Role::ALL {
            match self.derive_token(day, role) {
                Ok(expected) => {
                    if matched.is_none() && expected == presented {
                        matched = Some(role);
                    }
                }
                Err(err) if err.is_role_local() => {
                    tracing::warn!(role = %role, error = %err, "role skipped during token resolution");
                }
                Err(err) => return Err(err),
            }
        }
        Ok(matched)
    }

    /// Expected token of every role for `day`, with per-role failures.
    pub fn expected_tokens(&self, day: &DayStamp) -> Vec<(Role, Result<String, TokenError>)> {
        Role::ALL
            .into_iter()
            .map(|role| (role, self.derive_token(day, role)))
            .collect()
    }

    /// Full diagnostic sweep for a presented token, as of now.
    pub fn diagnose(&self, presented: &str) -> Result<TokenDiagnostics, TokenError> {
        self.diagnose_at(Utc::now(), presented)
    }

    /// Full diagnostic sweep for a presented token, as of `checked_at`.
    pub fn diagnose_at(
        &self,
        checked_at: DateTime<Utc>,
        presented: &str,
    ) -> Result<TokenDiagnostics, TokenError> {
        let day = DayStamp::at(checked_at);
        let role = self.resolve_role_on(&day, presented)?;

        let mut expected_tokens = BTreeMap::new();
        for (role, result) in self.expected_tokens(&day) {
            let rendered = match result {
                Ok(token) => token,
                Err(err) if err.is_role_local() => format!("Error: {err}"),
                Err(err) => return Err(err),
            };
            expected_tokens.insert(role, rendered);
        }

        let ingredients = Role::ALL
            .into_iter()
            .map(|role| {
                let rendered = self
                    .ingredients(&day, role)
                    .unwrap_or_else(|err| format!("Error: {err}"));
                (role, rendered)
            })
            .collect();

        Ok(TokenDiagnostics {
            received_token: presented.to_string(),
            day,
            checked_at,
            role,
            expected_tokens,
            ingredients,
        })
    }
}

/// Outcome of [`TokenEngine::diagnose`]. Leaks live secrets.
#[derive(Debug, Clone)]
pub struct TokenDiagnostics {
    pub received_token: String,
    pub day: DayStamp,
    pub checked_at: DateTime<Utc>,
    pub role: Option<Role>,
    pub expected_tokens: BTreeMap<Role, String>,
    pub ingredients: BTreeMap<Role, String>,
}

/// `hex[0..8]-hex[8..12]-hex[12..16]`; the rest of the digest is dropped.
fn format_token(hex: &str) -> Result<String, TokenError> {
    let usable = hex.len() >= 16 && hex.is_char_boundary(16);
    if !usable {
        return Err(TokenError::DigestUnavailable(format!(
            "digest too short: {} characters",
            hex.len()
        )));
    }
    Ok(format!("{}-{}-{}", &hex[0..8], &hex[8..12], &hex[12..16]))
}
