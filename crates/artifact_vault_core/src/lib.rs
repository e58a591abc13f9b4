//! Core data layer for the artifact vault.
//! This crate is the single source of truth for vault invariants.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod view;

pub use config::{ConfigError, VaultConfig};
pub use logging::{default_log_level, init_logging, init_logging_from_config, logging_status};
pub use model::hash::{content_hash, CONTAINER_HASH_PREFIX};
pub use model::record::{
    Record, RecordBody, RecordId, RecordKind, RecordState, RecordValidationError, UNKNOWN_LABEL,
};
pub use repo::snapshot_repo::{
    MemorySnapshotRepository, RepoError, RepoResult, SnapshotChange, SnapshotRepository,
    SqliteSnapshotRepository, DEFAULT_STORAGE_KEY,
};
pub use service::vault_service::{
    AddOutcome, MembershipOutcome, MembershipRejection, VaultService,
};
pub use view::navigation::{NavigationState, ViewMode};
pub use view::projection::{
    container_contents, filed_ids, project_index, snippet, IndexView, DEFAULT_SNIPPET_CHARS,
};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
