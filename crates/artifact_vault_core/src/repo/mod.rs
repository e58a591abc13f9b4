//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the snapshot persistence contract used by the vault service.
//! - Isolate SQLite and JSON encoding details from store orchestration.
//!
//! # Invariants
//! - Repositories persist whole snapshots only.
//! - Repository APIs return semantic errors (`InvalidData`) in addition to DB
//!   transport errors.

pub mod snapshot_repo;
