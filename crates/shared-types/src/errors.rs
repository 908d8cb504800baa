//! # Error Types
//!
//! Errors raised while decoding identity input.

use thiserror::Error;

/// Errors produced when building identity types from untyped input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentityError {
    /// Role string is not one of the known roles.
    #[error("Unknown role: {0} (expected 'user' or 'institute')")]
    UnknownRole(String),

    /// Institute principals must carry an institute name.
    #[error("Institute principal {principal_id} has no institute name")]
    MissingInstituteName { principal_id: String },
}
