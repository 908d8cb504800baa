//! # Shared Types Crate
//!
//! Types supplied by the identity collaborator and shared by every crate in
//! the workspace.
//!
//! ## Design Principles
//!
//! - **Trusted Input**: A `Principal` arrives already authenticated. The ledger
//!   core only decides what that principal may do, never who it is.
//! - **Single Source of Truth**: Role and identity types are defined once here.

pub mod entities;
pub mod errors;

pub use entities::*;
pub use errors::*;
