//! Core domain concepts shared across all subdomains.
//!
//! - [`error::DomainError`] - domain-level errors
//! - [`identifier::SessionId`] - validated session ids, plus identifier quoting
//! - [`string`] - preview helpers

pub mod error;
pub mod identifier;
pub mod string;
