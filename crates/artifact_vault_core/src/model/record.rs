//! Vault record domain model.
//!
//! # Responsibility
//! - Define the artifact/container record shared by the store and its callers.
//! - Own the persisted wire shape, including lenient decoding of older data.
//!
//! # Invariants
//! - `id` is stable, never nil, and never reused for another record.
//! - `id`, `created_at`, `hash` and an artifact's `raw` never change after
//!   creation.
//! - A container never lists its own id in `contains`.
//! - Fields this build does not know are carried in `extra` and written back
//!   unchanged.

use crate::model::hash::{container_hash, content_hash};
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::hash::{Hash, Hasher};
use uuid::Uuid;

/// Stable identifier shared by artifacts and containers.
pub type RecordId = Uuid;

/// Label shown for records whose stored label is blank.
pub const UNKNOWN_LABEL: &str = "UNKNOWN";

/// Record variant discriminator, serialized as `type`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecordKind {
    /// Raw text intake. Older snapshots without `type` decode as this.
    #[default]
    Artifact,
    /// Single-level folder of artifact ids.
    Container,
}

impl RecordKind {
    /// Wire name of this kind.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Artifact => "ARTIFACT",
            Self::Container => "CONTAINER",
        }
    }
}

/// Lifecycle value of a record.
///
/// The store writes any value it is given, so unknown strings survive a
/// load/save cycle through `Other`. Build values with `parse` or `From`;
/// equality and hashing compare wire values, so `Other("FROZEN")` equals
/// `Frozen`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RecordState {
    /// Initial state of every new record.
    #[default]
    Accepted,
    /// Kept as-is by user decision.
    Frozen,
    /// Dismissed by user decision.
    Abandoned,
    /// Any other caller-provided value.
    Other(String),
}

impl RecordState {
    /// Parses a state string. Never fails.
    pub fn parse(value: &str) -> Self {
        match value {
            "ACCEPTED" => Self::Accepted,
            "FROZEN" => Self::Frozen,
            "ABANDONED" => Self::Abandoned,
            other => Self::Other(other.to_string()),
        }
    }

    /// Wire value of this state.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Accepted => "ACCEPTED",
            Self::Frozen => "FROZEN",
            Self::Abandoned => "ABANDONED",
            Self::Other(value) => value.as_str(),
        }
    }
}

impl PartialEq for RecordState {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Eq for RecordState {}

impl Hash for RecordState {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_str().hash(state);
    }
}

impl Display for RecordState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for RecordState {
    fn from(value: String) -> Self {
        match value.as_str() {
            "ACCEPTED" => Self::Accepted,
            "FROZEN" => Self::Frozen,
            "ABANDONED" => Self::Abandoned,
            _ => Self::Other(value),
        }
    }
}

impl From<&str> for RecordState {
    fn from(value: &str) -> Self {
        Self::parse(value)
    }
}

impl From<RecordState> for String {
    fn from(value: RecordState) -> Self {
        match value {
            RecordState::Other(value) => value,
            known => known.as_str().to_string(),
        }
    }
}

/// Variant-specific payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordBody {
    /// Opaque text payload, immutable after intake.
    Artifact { raw: String },
    /// Ordered artifact ids filed in this container.
    Container { contains: Vec<RecordId> },
}

/// Model-level validation failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordValidationError {
    /// Nil UUID is never a valid record id.
    NilId,
    /// A container lists itself in `contains`.
    ContainerContainsItself(RecordId),
}

impl Display for RecordValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NilId => write!(f, "record id must not be nil"),
            Self::ContainerContainsItself(id) => {
                write!(f, "container {id} must not contain itself")
            }
        }
    }
}

impl Error for RecordValidationError {}

/// One vault entry: an artifact or a container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RecordWire", into = "RecordWire")]
pub struct Record {
    pub id: RecordId,
    /// ISO-8601 UTC creation time, e.g. `2026-02-13T10:00:00.000Z`.
    pub created_at: String,
    pub state: RecordState,
    /// Stored label. May be blank before the user names the record.
    pub spine_label: String,
    /// Content hash for artifacts, synthetic `container:<uuid>` for containers.
    pub hash: String,
    pub body: RecordBody,
    /// Unrecognized wire fields, kept verbatim. Empty for new records.
    pub extra: Map<String, Value>,
}

impl Record {
    /// Creates an accepted artifact for `raw` with a fresh id and timestamp.
    pub fn new_artifact(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        Self {
            id: Uuid::new_v4(),
            created_at: timestamp_now(),
            state: RecordState::Accepted,
            spine_label: UNKNOWN_LABEL.to_string(),
            hash: content_hash(&raw),
            body: RecordBody::Artifact { raw },
            extra: Map::new(),
        }
    }

    /// Creates an empty accepted container.
    ///
    /// The caller is responsible for label normalization.
    pub fn new_container(spine_label: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: timestamp_now(),
            state: RecordState::Accepted,
            spine_label: spine_label.into(),
            hash: container_hash(),
            body: RecordBody::Container {
                contains: Vec::new(),
            },
            extra: Map::new(),
        }
    }

    pub fn kind(&self) -> RecordKind {
        match self.body {
            RecordBody::Artifact { .. } => RecordKind::Artifact,
            RecordBody::Container { .. } => RecordKind::Container,
        }
    }

    pub fn is_container(&self) -> bool {
        matches!(self.body, RecordBody::Container { .. })
    }

    /// Artifact payload, `None` for containers.
    pub fn raw(&self) -> Option<&str> {
        match &self.body {
            RecordBody::Artifact { raw } => Some(raw.as_str()),
            RecordBody::Container { .. } => None,
        }
    }

    /// Filed artifact ids, `None` for artifacts.
    pub fn contains(&self) -> Option<&[RecordId]> {
        match &self.body {
            RecordBody::Artifact { .. } => None,
            RecordBody::Container { contains } => Some(contains.as_slice()),
        }
    }

    pub fn contains_mut(&mut self) -> Option<&mut Vec<RecordId>> {
        match &mut self.body {
            RecordBody::Artifact { .. } => None,
            RecordBody::Container { contains } => Some(contains),
        }
    }

    /// Label to display: trimmed stored label, or `UNKNOWN` when blank.
    pub fn display_label(&self) -> &str {
        let trimmed = trim_label(&self.spine_label);
        if trimmed.is_empty() {
            UNKNOWN_LABEL
        } else {
            trimmed
        }
    }

    /// Validates record-local invariants.
    pub fn validate(&self) -> Result<(), RecordValidationError> {
        if self.id.is_nil() {
            return Err(RecordValidationError::NilId);
        }
        if let RecordBody::Container { contains } = &self.body {
            if contains.contains(&self.id) {
                return Err(RecordValidationError::ContainerContainsItself(self.id));
            }
        }
        Ok(())
    }
}

/// Persisted shape. Every variant carries `raw` so the document stays uniform.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RecordWire {
    id: RecordId,
    created_at: String,
    #[serde(default)]
    state: RecordState,
    #[serde(rename = "type", default)]
    kind: RecordKind,
    hash: String,
    #[serde(default)]
    raw: String,
    #[serde(default)]
    spine_label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    contains: Option<Vec<RecordId>>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl TryFrom<RecordWire> for Record {
    type Error = RecordValidationError;

    fn try_from(wire: RecordWire) -> Result<Self, Self::Error> {
        let body = match wire.kind {
            RecordKind::Artifact => RecordBody::Artifact { raw: wire.raw },
            RecordKind::Container => RecordBody::Container {
                contains: wire.contains.unwrap_or_default(),
            },
        };
        let record = Self {
            id: wire.id,
            created_at: wire.created_at,
            state: wire.state,
            spine_label: wire.spine_label,
            hash: wire.hash,
            body,
            extra: wire.extra,
        };
        record.validate()?;
        Ok(record)
    }
}

impl From<Record> for RecordWire {
    fn from(record: Record) -> Self {
        let kind = record.kind();
        let (raw, contains) = match record.body {
            RecordBody::Artifact { raw } => (raw, None),
            RecordBody::Container { contains } => (String::new(), Some(contains)),
        };
        Self {
            id: record.id,
            created_at: record.created_at,
            state: record.state,
            kind,
            hash: record.hash,
            raw,
            spine_label: record.spine_label,
            contains,
            extra: record.extra,
        }
    }
}

/// Trims label whitespace the way the UI host's string trim does: Unicode
/// spaces, line terminators and U+FEFF, but not U+0085.
pub(crate) fn trim_label(value: &str) -> &str {
    value.trim_matches(|c: char| (c.is_whitespace() && c != '\u{85}') || c == '\u{FEFF}')
}

fn timestamp_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
