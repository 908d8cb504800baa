//! # Core Identity Entities
//!
//! Defines the principal model handed to the ledger by the identity
//! collaborator.
//!
//! ## Clusters
//!
//! - **Primitives**: `Hash`, `Timestamp`
//! - **Identity**: `PrincipalId`, `Role`, `Principal`

use crate::errors::IdentityError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// =============================================================================
// PRIMITIVES
// =============================================================================

/// A 32-byte hash (SHA-256 output).
pub type Hash = [u8; 32];

/// Unix timestamp in seconds since epoch.
pub type Timestamp = u64;

// =============================================================================
// IDENTITY
// =============================================================================

/// Stable identifier of an authenticated principal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub struct PrincipalId(pub String);

impl PrincipalId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// An empty id marks an unauthenticated caller.
    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for PrincipalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PrincipalId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Role assigned by the identity provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Ordinary submitter.
    #[default]
    User,
    /// Institution acting as an authorized reviewer.
    Institute,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Institute => "institute",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = IdentityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "user" => Ok(Role::User),
            "institute" | "institution" | "reviewer" => Ok(Role::Institute),
            other => Err(IdentityError::UnknownRole(other.to_string())),
        }
    }
}

/// An authenticated actor, as supplied by the identity collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    /// Stable principal id.
    pub id: PrincipalId,
    /// Role granted by the identity provider.
    pub role: Role,
    /// Human readable name.
    pub display_name: String,
    /// Institution name, present for institute principals.
    pub institute_name: Option<String>,
}

impl Principal {
    /// Build an ordinary submitting user.
    pub fn user(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id: PrincipalId::new(id),
            role: Role::User,
            display_name: display_name.into(),
            institute_name: None,
        }
    }

    /// Build an institute (reviewer) principal.
    pub fn institute(
        id: impl Into<String>,
        display_name: impl Into<String>,
        institute_name: impl Into<String>,
    ) -> Self {
        Self {
            id: PrincipalId::new(id),
            role: Role::Institute,
            display_name: display_name.into(),
            institute_name: Some(institute_name.into()),
        }
    }

    /// Check the identity payload is internally consistent.
    pub fn validate(&self) -> Result<(), IdentityError> {
        if self.role == Role::Institute
            && self
                .institute_name
                .as_deref()
                .map_or(true, |name| name.trim().is_empty())
        {
            return Err(IdentityError::MissingInstituteName {
                principal_id: self.id.to_string(),
            });
        }
        Ok(())
    }

    pub fn is_authenticated(&self) -> bool {
        !self.id.is_empty()
    }
}
