//! Actors and roles
//!
//! The identity provider hands roles over either as a single name or as a list
//! of names. [`RoleClaim`] captures that raw shape; it is normalized into one
//! canonical [`Role`] before anything reaches the engines.

use serde::{Deserialize, Serialize};

use crate::errors::{DomainError, DomainResult};
use crate::value_objects::ActorId;

/// Canonical organizational role, ordered by privilege
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Member,
    Lead,
    Manager,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Member => "member",
            Role::Lead => "lead",
            Role::Manager => "manager",
            Role::Admin => "admin",
        }
    }

    /// Parse a role name, accepting the legacy aliases still issued upstream
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "member" | "employee" | "user" => Some(Role::Member),
            "lead" | "team_lead" | "teamlead" => Some(Role::Lead),
            "manager" => Some(Role::Manager),
            "admin" | "administrator" => Some(Role::Admin),
            _ => None,
        }
    }

    /// Whether this role is at least as privileged as `other`
    pub fn at_least(&self, other: Role) -> bool {
        *self >= other
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw role claim as received at the system boundary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RoleClaim {
    Single(String),
    Many(Vec<String>),
}

impl RoleClaim {
    /// Normalize to the single most privileged role named by the claim
    pub fn normalize(&self) -> DomainResult<Role> {
        let names: Vec<&str> = match self {
            RoleClaim::Single(name) => vec![name.as_str()],
            RoleClaim::Many(names) => names.iter().map(String::as_str).collect(),
        };

        if names.is_empty() {
            return Err(DomainError::validation("role", "role claim is empty"));
        }

        let mut best: Option<Role> = None;
        for name in names {
            let role = Role::parse(name).ok_or_else(|| {
                DomainError::validation("role", format!("unknown role '{}'", name))
            })?;
            best = Some(best.map_or(role, |b| b.max(role)));
        }

        best.ok_or_else(|| DomainError::validation("role", "role claim is empty"))
    }
}

impl TryFrom<RoleClaim> for Role {
    type Error = DomainError;

    fn try_from(claim: RoleClaim) -> DomainResult<Self> {
        claim.normalize()
    }
}

/// An already-authenticated caller, used for attribution only
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: ActorId,
    pub role: Role,
}

impl Actor {
    pub fn new(id: impl Into<ActorId>, role: Role) -> Self {
        Self {
            id: id.into(),
            role,
        }
    }

    /// Build an actor from an identity-provider claim
    pub fn from_claim(id: ActorId, claim: &RoleClaim) -> DomainResult<Self> {
        if id.is_empty() {
            return Err(DomainError::validation("actor", "actor id cannot be empty"));
        }
        Ok(Self {
            id,
            role: claim.normalize()?,
        })
    }
}
