//! # Ports Layer
//!
//! Defines the port traits for the Document Ledger subsystem.
//!
//! ## Hexagonal Architecture
//!
//! - `inbound.rs` - Driving ports (store API and principal-facing API)
//! - `outbound.rs` - Driven ports (dependencies required by the service)

pub mod inbound;
pub mod outbound;
