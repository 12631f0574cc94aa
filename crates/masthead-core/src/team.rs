//! Roles, Role Identity Records and the team registry.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Project secret used when nothing else is configured.
pub const DEFAULT_PROJECT_SECRET: &str = "vinscent_naver_give_up_secret_key";

/// An admin identity. The set is closed and known at deploy time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Developer,
    Designer,
    Marketing,
    Pm,
}

impl Role {
    /// Every role, in resolution order.
    pub const ALL: [Role; 4] = [Role::Developer, Role::Designer, Role::Marketing, Role::Pm];

    /// Wire name of the role, as mixed into token ingredients.
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Developer => "developer",
            Role::Designer => "designer",
            Role::Marketing => "marketing",
            Role::Pm => "pm",
        }
    }

    /// Built-in development identity for this role.
    pub fn default_identity(self) -> RoleIdentity {
        let (birth_date, phone) = match self {
            Role::Developer => ("20020317", "01092034239"),
            Role::Designer => ("00000000", "00000000000"),
            Role::Marketing => ("20030408", "01025127854"),
            Role::Pm => ("20011121", "01071489971"),
        };
        RoleIdentity::new(birth_date, phone)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| ConfigError::UnknownRole(s.to_string()))
    }
}

/// The static secret pair owned by one role.
#[derive(Clone, PartialEq, Eq)]
pub struct RoleIdentity {
    /// `YYYYMMDD`.
    pub birth_date: String,
    /// Phone number digits. Historically named "phone last four".
    pub phone: String,
}

impl RoleIdentity {
    pub fn new(birth_date: impl Into<String>, phone: impl Into<String>) -> Self {
        Self {
            birth_date: birth_date.into(),
            phone: phone.into(),
        }
    }

    /// Whether both secret components are present.
    pub fn is_complete(&self) -> bool {
        !self.birth_date.is_empty() && !self.phone.is_empty()
    }
}

impl fmt::Debug for RoleIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RoleIdentity")
            .field("birth_date", &"<redacted>")
            .field("phone", &"<redacted>")
            .finish()
    }
}

/// The process-wide secret mixed into every token.
#[derive(Clone, PartialEq, Eq)]
pub struct ProjectSecret(String);

impl ProjectSecret {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    /// The raw secret, for token derivation only.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl Default for ProjectSecret {
    fn default() -> Self {
        Self::new(DEFAULT_PROJECT_SECRET)
    }
}

impl fmt::Debug for ProjectSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ProjectSecret(<redacted>)")
    }
}

/// Immutable registry of Role Identity Records plus the project secret.
#[derive(Debug, Clone)]
pub struct TeamRegistry {
    members: BTreeMap<Role, RoleIdentity>,
    secret: ProjectSecret,
}

impl TeamRegistry {
    /// An empty registry. Roles without a record never authenticate.
    pub fn new(secret: ProjectSecret) -> Self {
        Self {
            members: BTreeMap::new(),
            secret,
        }
    }

    /// The built-in development registry. Never acceptable in production.
    pub fn development_defaults() -> Self {
        Role::ALL
            .into_iter()
            .fold(Self::new(ProjectSecret::default()), |registry, role| {
                registry.with_member(role, role.default_identity())
            })
    }

    /// Add or replace a role's identity record.
    pub fn with_member(mut self, role: Role, identity: RoleIdentity) -> Self {
        self.members.insert(role, identity);
        self
    }

    /// A copy of this registry with a rotated project secret.
    pub fn with_project_secret(&self, secret: ProjectSecret) -> Self {
        Self {
            members: self.members.clone(),
            secret,
        }
    }

    pub fn identity(&self, role: Role) -> Option<&RoleIdentity> {
        self.members.get(&role)
    }

    pub fn project_secret(&self) -> &ProjectSecret {
        &self.secret
    }

    /// Roles that have an identity record, in resolution order.
    pub fn roles(&self) -> impl Iterator<Item = Role> + '_ {
        self.members.keys().copied()
    }

    /// Find the role owning exactly this secret pair.
    pub fn find_role(&self, birth_date: &str, phone: &str) -> Option<Role> {
        self.members
            .iter()
            .find(|(_, identity)| identity.birth_date == birth_date && identity.phone == phone)
            .map(|(role, _)| *role)
    }

    /// Pairs of roles configured with identical secret pairs.
    ///
    /// Tokens still differ because the role name is hashed in, but
    /// [`TeamRegistry::find_role`] can only ever return the first of them.
    pub fn duplicate_pairs(&self) -> Vec<(Role, Role)> {
        let entries: Vec<_> = self.members.iter().collect();
        let mut duplicates = Vec::new();
        for (i, (role_a, identity_a)) in entries.iter().enumerate() {
            for (role_b, identity_b) in &entries[i + 1..] {
                if identity_a == identity_b {
                    duplicates.push((**role_a, **role_b));
                }
            }
        }
        duplicates
    }
}
