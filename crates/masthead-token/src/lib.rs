//! # masthead-token
//!
//! Stateless daily tokens for the Masthead admin API.
//!
//! A token is a pure function of the UTC calendar day, a role's identity
//! record and the project secret:
//!
//! ```text
//! sha256("YYYYMMDD|birth_date|phone|role|secret") -> "xxxxxxxx-xxxx-xxxx"
//! ```
//!
//! The CLI and the server compute it independently and agree without any
//! shared state. Verification recomputes the expected token of every role for
//! today and compares; nothing is stored, so a token lapses at UTC midnight
//! and the only revocation is rotating a secret.
//!
//! ```rust
//! use masthead_core::{Role, TeamRegistry};
//! use masthead_token::{DayStamp, TokenEngine};
//!
//! let engine = TokenEngine::sha256(TeamRegistry::development_defaults());
//! let day = DayStamp::parse("20250101").unwrap();
//! let token = engine.derive_token(&day, Role::Developer).unwrap();
//! assert_eq!(token, "f9f7c244-f193-fcee");
//! assert_eq!(engine.resolve_role_on(&day, &token).unwrap(), Some(Role::Developer));
//! ```

pub mod day;
pub mod digest;
pub mod engine;
pub mod error;

pub use day::DayStamp;
pub use digest::{DigestProvider, Sha256Digest};
pub use engine::{TokenDiagnostics, TokenEngine, TOKEN_LEN};
pub use error::TokenError;
