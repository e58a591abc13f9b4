//! Snapshot repository contracts and implementations.
//!
//! # Responsibility
//! - Persist the whole record collection as one JSON document under a fixed
//!   storage key.
//! - Run load → mutate → save as one unit.
//!
//! # Invariants
//! - A snapshot is always written whole; there are no partial writes.
//! - Insertion order of records is preserved across load/save.
//! - Read paths reject duplicate ids instead of masking them.

use crate::db::{ensure_schema_ready, DbError};
use crate::model::record::{Record, RecordId};
use log::debug;
use rusqlite::{params, Connection, OptionalExtension, Transaction, TransactionBehavior};
use std::cell::RefCell;
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Storage key used when the caller does not configure one.
pub const DEFAULT_STORAGE_KEY: &str = "artifactVault.v1";

pub type RepoResult<T> = Result<T, RepoError>;

/// Errors from snapshot persistence.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    /// Snapshot could not be encoded or decoded as JSON.
    Serialization(serde_json::Error),
    /// Snapshot decoded but violates collection invariants.
    InvalidData(String),
    /// Storage key is blank after trim.
    InvalidStorageKey,
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Serialization(err) => write!(f, "invalid vault snapshot: {err}"),
            Self::InvalidData(message) => write!(f, "invalid vault snapshot data: {message}"),
            Self::InvalidStorageKey => write!(f, "storage key must not be blank"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Serialization(err) => Some(err),
            Self::InvalidData(_) => None,
            Self::InvalidStorageKey => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<serde_json::Error> for RepoError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization(value)
    }
}

/// Result of one snapshot mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnapshotChange<T> {
    /// Collection changed; write it back.
    Persist(T),
    /// Nothing to write.
    Unchanged(T),
}

/// Repository interface over one persisted record collection.
pub trait SnapshotRepository {
    /// Loads the full collection. A missing snapshot is an empty collection.
    fn load_snapshot(&self) -> RepoResult<Vec<Record>>;

    /// Replaces the full collection.
    fn save_snapshot(&self, records: &[Record]) -> RepoResult<()>;

    /// Loads, applies `mutate`, and saves when it reports a change.
    ///
    /// Backends that can isolate the cycle override this.
    fn update_snapshot<T, F>(&self, mutate: F) -> RepoResult<T>
    where
        F: FnOnce(&mut Vec<Record>) -> SnapshotChange<T>,
    {
        let mut records = self.load_snapshot()?;
        match mutate(&mut records) {
            SnapshotChange::Persist(value) => {
                self.save_snapshot(&records)?;
                Ok(value)
            }
            SnapshotChange::Unchanged(value) => Ok(value),
        }
    }
}

/// Encodes a collection as the persisted JSON document.
pub fn encode_snapshot(records: &[Record]) -> RepoResult<String> {
    Ok(serde_json::to_string(records)?)
}

/// Decodes a persisted JSON document.
///
/// A blank payload decodes as an empty collection.
pub fn decode_snapshot(payload: &str) -> RepoResult<Vec<Record>> {
    if payload.trim().is_empty() {
        return Ok(Vec::new());
    }

    let records: Vec<Record> = serde_json::from_str(payload)?;
    let mut seen: HashSet<RecordId> = HashSet::with_capacity(records.len());
    for record in &records {
        if !seen.insert(record.id) {
            return Err(RepoError::InvalidData(format!(
                "duplicate record id `{}`",
                record.id
            )));
        }
    }
    Ok(records)
}

/// SQLite-backed snapshot repository keyed by storage key.
pub struct SqliteSnapshotRepository<'conn> {
    conn: &'conn Connection,
    storage_key: String,
}

impl<'conn> SqliteSnapshotRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection, storage_key: impl Into<String>) -> RepoResult<Self> {
        let storage_key = storage_key.into().trim().to_string();
        if storage_key.is_empty() {
            return Err(RepoError::InvalidStorageKey);
        }
        ensure_schema_ready(conn)?;
        Ok(Self { conn, storage_key })
    }

    /// Creates repository under `DEFAULT_STORAGE_KEY`.
    pub fn with_default_key(conn: &'conn Connection) -> RepoResult<Self> {
        Self::try_new(conn, DEFAULT_STORAGE_KEY)
    }

    pub fn storage_key(&self) -> &str {
        &self.storage_key
    }
}

impl SnapshotRepository for SqliteSnapshotRepository<'_> {
    fn load_snapshot(&self) -> RepoResult<Vec<Record>> {
        read_records(self.conn, &self.storage_key)
    }

    fn save_snapshot(&self, records: &[Record]) -> RepoResult<()> {
        write_records(self.conn, &self.storage_key, records)
    }

    fn update_snapshot<T, F>(&self, mutate: F) -> RepoResult<T>
    where
        F: FnOnce(&mut Vec<Record>) -> SnapshotChange<T>,
    {
        // IMMEDIATE takes the write lock up front so a concurrent process
        // cannot save between our load and our save.
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let mut records = read_records(&tx, &self.storage_key)?;
        let value = match mutate(&mut records) {
            SnapshotChange::Persist(value) => {
                write_records(&tx, &self.storage_key, &records)?;
                value
            }
            SnapshotChange::Unchanged(value) => value,
        };
        tx.commit()?;
        Ok(value)
    }
}

fn read_records(conn: &Connection, storage_key: &str) -> RepoResult<Vec<Record>> {
    let payload: Option<String> = conn
        .query_row(
            "SELECT payload
             FROM vault_snapshots
             WHERE storage_key = ?1;",
            [storage_key],
            |row| row.get(0),
        )
        .optional()?;

    match payload {
        Some(payload) => {
            let records = decode_snapshot(&payload)?;
            debug!(
                "event=snapshot_load module=repo status=ok records={} bytes={}",
                records.len(),
                payload.len()
            );
            Ok(records)
        }
        None => Ok(Vec::new()),
    }
}

fn write_records(conn: &Connection, storage_key: &str, records: &[Record]) -> RepoResult<()> {
    let payload = encode_snapshot(records)?;
    conn.execute(
        "INSERT INTO vault_snapshots (storage_key, payload, updated_at)
         VALUES (?1, ?2, (strftime('%s', 'now') * 1000))
         ON CONFLICT(storage_key) DO UPDATE SET
            payload = excluded.payload,
            updated_at = excluded.updated_at;",
        params![storage_key, payload],
    )?;
    debug!(
        "event=snapshot_save module=repo status=ok records={} bytes={}",
        records.len(),
        payload.len()
    );
    Ok(())
}

/// In-process snapshot repository holding the serialized document.
///
/// Keeps the same encode/decode path as durable storage, so it is suitable
/// for tests and for hosts that own persistence themselves.
#[derive(Debug, Default)]
pub struct MemorySnapshotRepository {
    payload: RefCell<Option<String>>,
}

impl MemorySnapshotRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from an existing serialized snapshot.
    pub fn with_payload(payload: impl Into<String>) -> Self {
        Self {
            payload: RefCell::new(Some(payload.into())),
        }
    }

    /// Current serialized snapshot, if anything was saved.
    pub fn payload(&self) -> Option<String> {
        self.payload.borrow().clone()
    }
}

impl SnapshotRepository for MemorySnapshotRepository {
    fn load_snapshot(&self) -> RepoResult<Vec<Record>> {
        match self.payload.borrow().as_deref() {
            Some(payload) => decode_snapshot(payload),
            None => Ok(Vec::new()),
        }
    }

    fn save_snapshot(&self, records: &[Record]) -> RepoResult<()> {
        let payload = encode_snapshot(records)?;
        *self.payload.borrow_mut() = Some(payload);
        Ok(())
    }
}
