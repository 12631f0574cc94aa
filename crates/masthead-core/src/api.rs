//! JSON payloads shared by the server and the CLI.
//!
//! Field names are camelCase on the wire.

use crate::team::Role;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Response of `GET /api/debug/token`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DebugTokenResponse {
    pub success: bool,
    pub debug: DebugInfo,
    pub result: DebugResult,
}

/// Diagnostic details. Contains live secrets; development only.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DebugInfo {
    pub received_token: String,
    /// `YYYYMMDD` as computed by the server.
    pub current_date: String,
    /// RFC 3339 timestamp of the check.
    pub current_date_time: String,
    pub valid_role: Option<Role>,
    pub is_valid: bool,
    /// Expected token per role, or `Error: ...` when the role cannot derive one.
    pub expected_tokens: BTreeMap<Role, String>,
    /// Concatenated derivation input per role.
    pub token_ingredients: BTreeMap<Role, String>,
    /// Per secret environment variable, whether it is set.
    pub environment_info: BTreeMap<String, bool>,
}

/// Verdict section of the debug response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DebugResult {
    pub valid: bool,
    pub role: Option<Role>,
    pub message: String,
}

impl DebugResult {
    pub fn for_role(role: Option<Role>) -> Self {
        match role {
            Some(role) => Self {
                valid: true,
                role: Some(role),
                message: format!("Valid token for role: {role}"),
            },
            None => Self {
                valid: false,
                role: None,
                message: "Invalid token".to_string(),
            },
        }
    }
}

/// Body of every error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub success: bool,
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry_after: Option<u64>,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
            retry_after: None,
        }
    }
}
