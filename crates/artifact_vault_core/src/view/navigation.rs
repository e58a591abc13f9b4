//! Caller-owned navigation state for a vault browser.
//!
//! # Responsibility
//! - Track which record is open and which folder is browsed.
//! - Decide which record actions are armed.
//!
//! # Invariants
//! - State is never persisted; rebuild it with `reconcile` after each reload.
//! - `ViewMode::Container` always names a container id.

use crate::model::record::{Record, RecordId};

/// Which list the index shows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ViewMode {
    /// Folders plus unfiled artifacts.
    #[default]
    All,
    /// Members of one folder.
    Container(RecordId),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NavigationState {
    mode: ViewMode,
    open: Option<RecordId>,
}

impl NavigationState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> ViewMode {
        self.mode
    }

    /// Record whose actions are armed, if any.
    pub fn open_id(&self) -> Option<RecordId> {
        self.open
    }

    /// Opens `record`. Opening a container also browses into it.
    pub fn open_record(&mut self, record: &Record) {
        self.open = Some(record.id);
        if record.is_container() {
            self.mode = ViewMode::Container(record.id);
        }
    }

    /// Previewing disarms actions until a record is opened again.
    pub fn preview(&mut self) {
        self.open = None;
    }

    pub fn back_to_all(&mut self) {
        self.mode = ViewMode::All;
        self.open = None;
    }

    /// Rename, freeze and abandon need an open record.
    pub fn can_edit(&self) -> bool {
        self.open.is_some()
    }

    /// Filing needs an open artifact.
    pub fn can_file(&self, records: &[Record]) -> bool {
        self.open_in(records)
            .is_some_and(|record| !record.is_container())
    }

    /// Drops references that no longer resolve in a fresh snapshot.
    pub fn reconcile(&mut self, records: &[Record]) {
        if self.open_in(records).is_none() {
            self.open = None;
        }
        if let ViewMode::Container(id) = self.mode {
            let still_container = records
                .iter()
                .any(|record| record.id == id && record.is_container());
            if !still_container {
                self.mode = ViewMode::All;
            }
        }
    }

    fn open_in<'a>(&self, records: &'a [Record]) -> Option<&'a Record> {
        let id = self.open?;
        records.iter().find(|record| record.id == id)
    }
}
