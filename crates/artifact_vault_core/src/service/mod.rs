//! Vault use-case services.
//!
//! # Responsibility
//! - Expose the store API consumed by presentation callers.
//! - Keep business invariants above the snapshot repository.

pub mod record_index;
pub mod vault_service;
