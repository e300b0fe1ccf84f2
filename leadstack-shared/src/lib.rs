//! # LeadStack Shared Library
//!
//! This crate contains the domain layer shared by the LeadStack API server:
//! database models, authentication primitives, and the lead filter compiler.
//!
//! ## Module Organization
//!
//! - `models`: Database models and data structures
//! - `auth`: Password hashing and JWT utilities
//! - `filter`: Filter specification → predicate compiler
//! - `db`: Connection pool and migration runner

pub mod auth;
pub mod db;
pub mod filter;
pub mod models;

/// Current version of the LeadStack shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
