//! Roles and tolerant role ingestion
//!
//! The server reports roles in several shapes depending on the endpoint and
//! API revision: a JSON array, a single string, or a string rendering of an
//! array such as `"[ROLE_USER, ROLE_ADMIN]"`. Everything funnels through
//! [`parse_roles`], which only ever yields members of [`Role`].

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// The fixed set of roles the client understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "ROLE_USER")]
    User,
    #[serde(rename = "ROLE_ADMIN")]
    Admin,
}

/// Normalised set of roles held by a user
pub type RoleSet = BTreeSet<Role>;

/// Returned when a string does not name a known role
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown role: {0}")]
pub struct UnknownRole(pub String);

impl Role {
    pub const ALL: [Self; 2] = [Self::User, Self::Admin];

    /// Wire name of the role
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "ROLE_USER",
            Self::Admin => "ROLE_ADMIN",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = UnknownRole;

    /// Case-insensitive and whitespace tolerant
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_uppercase();
        Self::ALL
            .into_iter()
            .find(|role| role.as_str() == normalized)
            .ok_or_else(|| UnknownRole(s.to_string()))
    }
}

/// Parse any accepted server-side roles shape into a validated role set.
///
/// Unknown entries are dropped. This never fails; malformed input yields an
/// empty (or partial) set.
pub fn parse_roles(raw: &Value) -> RoleSet {
    match raw {
        Value::Null => RoleSet::new(),
        Value::Array(items) => collect_valid(items.iter().filter_map(Value::as_str)),
        Value::String(s) => parse_role_string(s),
        other => {
            tracing::warn!(roles = %other, "Unexpected roles format, ignoring");
            RoleSet::new()
        }
    }
}

/// Parse a role string: either a single role or a bracketed list.
pub fn parse_role_string(raw: &str) -> RoleSet {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return RoleSet::new();
    }

    if trimmed.starts_with('[') || trimmed.ends_with(']') {
        if let Ok(Value::Array(items)) = serde_json::from_str::<Value>(trimmed) {
            return collect_valid(items.iter().filter_map(Value::as_str));
        }
        return parse_bracketed_fallback(trimmed);
    }

    collect_valid(std::iter::once(trimmed))
}

/// Manual split for bracketed strings that are not valid JSON, e.g.
/// `[ROLE_USER, ROLE_ADMIN]` or `['ROLE_USER'` with a missing bracket.
fn parse_bracketed_fallback(raw: &str) -> RoleSet {
    let inner = raw.strip_prefix('[').unwrap_or(raw);
    let inner = inner.strip_suffix(']').unwrap_or(inner);

    collect_valid(
        inner
            .split(',')
            .map(|entry| entry.trim().trim_matches(|c| c == '"' || c == '\''))
            .filter(|entry| !entry.is_empty()),
    )
}

fn collect_valid<'a>(entries: impl Iterator<Item = &'a str>) -> RoleSet {
    let mut roles = RoleSet::new();
    for entry in entries {
        match entry.parse::<Role>() {
            Ok(role) => {
                roles.insert(role);
            }
            Err(err) => tracing::warn!(%err, "Discarding role outside the known set"),
        }
    }
    roles
}
