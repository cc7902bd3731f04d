//! # folio_core
//!
//! Core domain logic for Folio.
//!
//! Everything here is transport-agnostic: identity and project models,
//! field validation, password hashing, bearer tokens, the authorization
//! predicates, and the persistence contracts with their PostgreSQL and
//! in-memory implementations.

pub mod auth;
pub mod migrate;
pub mod models;
pub mod store;
pub mod uuid;
pub mod validation;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_is_not_empty() {
        assert!(!version().is_empty());
    }
}
