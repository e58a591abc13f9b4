//! FFI use-case API for UI-host calls.
//!
//! # Responsibility
//! - Expose the vault store API to a UI host via FRB.
//! - Flatten store results into plain envelopes keyed by stable reason codes.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Ids cross the boundary as strings; unparsable ids behave as unknown ids.
//! - Storage failures become `ok=false` envelopes with a diagnostic message.

use artifact_vault_core::db::open_db;
use artifact_vault_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    MembershipOutcome, Record, RecordId, RepoResult, SqliteSnapshotRepository, VaultConfig,
    VaultService,
};
use log::warn;
use std::sync::OnceLock;
use uuid::Uuid;

static VAULT_CONFIG: OnceLock<VaultConfig> = OnceLock::new();

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Flat record view for UI rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VaultRecordItem {
    pub id: String,
    /// `ARTIFACT` or `CONTAINER`.
    pub kind: String,
    pub created_at: String,
    pub state: String,
    /// Display label (`UNKNOWN` when blank).
    pub spine_label: String,
    pub hash: String,
    /// Empty for containers.
    pub raw: String,
    /// Member ids; empty for artifacts.
    pub contains: Vec<String>,
}

/// Envelope for `vault_list`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VaultListResponse {
    pub ok: bool,
    pub items: Vec<VaultRecordItem>,
    pub message: String,
}

/// Envelope for intake and folder creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VaultRecordResponse {
    pub ok: bool,
    pub record: Option<VaultRecordItem>,
    /// Intake only: another record already had the same content hash.
    pub duplicate: bool,
    pub message: String,
}

/// Envelope for membership, state and label calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VaultActionResponse {
    pub ok: bool,
    /// Rejection code such as `ALREADY_PRESENT`.
    pub reason: Option<String>,
    pub already_present: bool,
    pub message: String,
}

impl VaultActionResponse {
    fn success(message: impl Into<String>) -> Self {
        Self {
            ok: true,
            reason: None,
            already_present: false,
            message: message.into(),
        }
    }

    fn failure(reason: Option<String>, message: impl Into<String>) -> Self {
        Self {
            ok: false,
            reason,
            already_present: false,
            message: message.into(),
        }
    }
}

/// Lists every record in insertion order.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn vault_list() -> VaultListResponse {
    match with_vault(|service| service.list()) {
        Ok(records) => VaultListResponse {
            ok: true,
            message: format!("{} record(s).", records.len()),
            items: records.iter().map(to_item).collect(),
        },
        Err(err) => VaultListResponse {
            ok: false,
            items: Vec::new(),
            message: format!("vault_list failed: {err}"),
        },
    }
}

/// Stores `raw` as a new artifact. Duplicates are stored and flagged.
#[flutter_rust_bridge::frb(sync)]
pub fn vault_add(raw: String) -> VaultRecordResponse {
    match with_vault(|service| service.add(raw)) {
        Ok(outcome) => VaultRecordResponse {
            ok: true,
            record: Some(to_item(&outcome.record)),
            duplicate: outcome.duplicate,
            message: if outcome.duplicate {
                "Duplicate detected. Stored anyway.".to_string()
            } else {
                "Artifact stored.".to_string()
            },
        },
        Err(err) => record_failure(format!("vault_add failed: {err}")),
    }
}

/// Creates a folder; blank labels are rejected with `ok=false`.
#[flutter_rust_bridge::frb(sync)]
pub fn vault_create_container(spine_label: String) -> VaultRecordResponse {
    match with_vault(|service| service.create_container(&spine_label)) {
        Ok(Some(record)) => VaultRecordResponse {
            ok: true,
            record: Some(to_item(&record)),
            duplicate: false,
            message: "Folder created.".to_string(),
        },
        Ok(None) => record_failure("Folder label cannot be empty."),
        Err(err) => record_failure(format!("vault_create_container failed: {err}")),
    }
}

/// Files an artifact into a folder; already-present is a rejection.
#[flutter_rust_bridge::frb(sync)]
pub fn vault_add_to_container(container_id: String, artifact_id: String) -> VaultActionResponse {
    let container_id = parse_id(&container_id);
    let artifact_id = parse_id(&artifact_id);
    membership_response(
        "vault_add_to_container",
        with_vault(|service| service.add_to_container(container_id, artifact_id)),
    )
}

/// Moves an artifact into a folder, removing it from any other folder.
#[flutter_rust_bridge::frb(sync)]
pub fn vault_move_to_container(container_id: String, artifact_id: String) -> VaultActionResponse {
    let container_id = parse_id(&container_id);
    let artifact_id = parse_id(&artifact_id);
    membership_response(
        "vault_move_to_container",
        with_vault(|service| service.move_to_container(container_id, artifact_id)),
    )
}

/// Overwrites a record's state. Unknown ids succeed as a no-op.
#[flutter_rust_bridge::frb(sync)]
pub fn vault_update_state(id: String, state: String) -> VaultActionResponse {
    let id = parse_id(&id);
    match with_vault(|service| service.update_state(id, state.as_str())) {
        Ok(()) => VaultActionResponse::success("State updated."),
        Err(err) => VaultActionResponse::failure(None, format!("vault_update_state failed: {err}")),
    }
}

/// Renames a record. Blank labels and unknown ids return `ok=false`.
#[flutter_rust_bridge::frb(sync)]
pub fn vault_update_spine_label(id: String, spine_label: String) -> VaultActionResponse {
    let id = parse_id(&id);
    match with_vault(|service| service.update_spine_label(id, &spine_label)) {
        Ok(true) => VaultActionResponse::success("Label updated."),
        Ok(false) => VaultActionResponse::failure(None, "Rename failed."),
        Err(err) => VaultActionResponse::failure(
            None,
            format!("vault_update_spine_label failed: {err}"),
        ),
    }
}

fn membership_response(
    operation: &str,
    result: Result<MembershipOutcome, String>,
) -> VaultActionResponse {
    match result {
        Ok(MembershipOutcome::Rejected(reason)) => VaultActionResponse::failure(
            Some(reason.as_code().to_string()),
            format!("{operation} rejected: {reason}"),
        ),
        Ok(outcome) => VaultActionResponse {
            ok: true,
            reason: None,
            already_present: outcome.already_present(),
            message: if outcome.already_present() {
                "Already in that folder.".to_string()
            } else {
                "Filed.".to_string()
            },
        },
        Err(err) => VaultActionResponse::failure(None, format!("{operation} failed: {err}")),
    }
}

fn record_failure(message: impl Into<String>) -> VaultRecordResponse {
    VaultRecordResponse {
        ok: false,
        record: None,
        duplicate: false,
        message: message.into(),
    }
}

/// Nil never resolves: stored records always carry a non-nil id.
fn parse_id(value: &str) -> RecordId {
    Uuid::parse_str(value.trim()).unwrap_or_else(|_| {
        warn!("event=ffi_parse_id module=ffi status=rejected reason=invalid_uuid");
        Uuid::nil()
    })
}

fn resolve_config() -> &'static VaultConfig {
    VAULT_CONFIG.get_or_init(|| {
        VaultConfig::from_env().unwrap_or_else(|err| {
            warn!("event=ffi_config module=ffi status=fallback error={err}");
            VaultConfig::default()
        })
    })
}

fn with_vault<T>(
    f: impl FnOnce(&VaultService<SqliteSnapshotRepository<'_>>) -> RepoResult<T>,
) -> Result<T, String> {
    let config = resolve_config();
    let conn = open_db(&config.db_path).map_err(|err| format!("vault DB open failed: {err}"))?;
    let repo = SqliteSnapshotRepository::try_new(&conn, config.storage_key.as_str())
        .map_err(|err| format!("vault repo init failed: {err}"))?;
    let service = VaultService::new(repo);
    f(&service).map_err(|err| err.to_string())
}

fn to_item(record: &Record) -> VaultRecordItem {
    VaultRecordItem {
        id: record.id.to_string(),
        kind: record.kind().as_str().to_string(),
        created_at: record.created_at.clone(),
        state: record.state.to_string(),
        spine_label: record.display_label().to_string(),
        hash: record.hash.clone(),
        raw: record.raw().unwrap_or_default().to_string(),
        contains: record
            .contains()
            .unwrap_or_default()
            .iter()
            .map(ToString::to_string)
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::{
        core_version, init_logging, ping, vault_add, vault_add_to_container,
        vault_create_container, vault_list, vault_move_to_container, vault_update_spine_label,
        vault_update_state,
    };
    use std::time::{SystemTime, UNIX_EPOCH};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn init_logging_rejects_empty_log_dir() {
        let error = init_logging("info".to_string(), String::new());
        assert!(!error.is_empty());
    }

    #[test]
    fn init_logging_rejects_unsupported_level() {
        let error = init_logging("verbose".to_string(), "tmp/logs".to_string());
        assert!(!error.is_empty());
    }

    #[test]
    fn vault_add_twice_flags_duplicate() {
        let text = unique_token("ffi-duplicate");
        let first = vault_add(text.clone());
        assert!(first.ok, "{}", first.message);
        let second = vault_add(text);
        assert!(second.ok, "{}", second.message);

        assert!(second.duplicate);
        let (first, second) = (first.record.unwrap(), second.record.unwrap());
        assert_eq!(first.hash, second.hash);
        assert_ne!(first.id, second.id);
        assert_eq!(first.spine_label, "UNKNOWN");
    }

    #[test]
    fn vault_membership_round_trip_reports_reason_codes() {
        let artifact = vault_add(unique_token("ffi-member")).record.unwrap();
        let folder = vault_create_container("Taxes".to_string()).record.unwrap();
        assert_eq!(folder.kind, "CONTAINER");

        let added = vault_add_to_container(folder.id.clone(), artifact.id.clone());
        assert!(added.ok, "{}", added.message);

        let again = vault_add_to_container(folder.id.clone(), artifact.id.clone());
        assert!(!again.ok);
        assert_eq!(again.reason.as_deref(), Some("ALREADY_PRESENT"));

        let moved = vault_move_to_container(folder.id.clone(), artifact.id.clone());
        assert!(moved.ok);
        assert!(moved.already_present);

        let nested = vault_move_to_container(folder.id.clone(), folder.id.clone());
        assert_eq!(nested.reason.as_deref(), Some("NO_NESTED_CONTAINERS"));

        let listed = vault_list();
        assert!(listed.ok, "{}", listed.message);
        let stored = listed
            .items
            .iter()
            .find(|item| item.id == folder.id)
            .expect("folder should be listed");
        assert_eq!(stored.contains, vec![artifact.id]);
    }

    #[test]
    fn invalid_ids_behave_as_unknown_records() {
        let folder = vault_create_container("Inbox".to_string()).record.unwrap();

        let bad_target = vault_move_to_container("not-a-uuid".to_string(), folder.id.clone());
        assert_eq!(bad_target.reason.as_deref(), Some("NOT_A_CONTAINER"));

        let bad_item = vault_move_to_container(folder.id, "not-a-uuid".to_string());
        assert_eq!(bad_item.reason.as_deref(), Some("MISSING_ITEM"));

        assert!(vault_update_state("not-a-uuid".to_string(), "FROZEN".to_string()).ok);
        assert!(!vault_update_spine_label("not-a-uuid".to_string(), "Name".to_string()).ok);
    }

    #[test]
    fn blank_labels_are_rejected() {
        assert!(!vault_create_container("   ".to_string()).ok);

        let artifact = vault_add(unique_token("ffi-label")).record.unwrap();
        assert!(!vault_update_spine_label(artifact.id.clone(), " ".to_string()).ok);
        assert!(vault_update_spine_label(artifact.id, "Lease".to_string()).ok);
    }

    fn unique_token(prefix: &str) -> String {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("time went backwards")
            .as_nanos();
        format!("{prefix}-{nanos}")
    }
}
