//! Vault use-case service.
//!
//! # Responsibility
//! - Own every mutation of the record collection and its invariants.
//! - Report validation failures as values; only storage failures are `Err`.
//!
//! # Invariants
//! - Every operation is one load → validate/mutate → save cycle.
//! - Containers never contain containers.
//! - After any membership operation the artifact is listed by exactly one
//!   container (single-home).
//! - Duplicate content is flagged, never rejected.

use crate::model::record::{trim_label, Record, RecordId, RecordState};
use crate::repo::snapshot_repo::{RepoError, RepoResult, SnapshotChange, SnapshotRepository};
use crate::service::record_index::RecordIndex;
use log::{error, info};
use serde::Serialize;
use std::fmt::{Display, Formatter};

/// Why a membership operation was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MembershipRejection {
    /// Target id is unknown or not a container.
    NotAContainer,
    /// Item id is unknown.
    MissingItem,
    /// Item is itself a container.
    NoNestedContainers,
    /// Container and item are the same record.
    SelfReference,
    /// Item is already filed in the target (`add_to_container` only).
    AlreadyPresent,
}

impl MembershipRejection {
    /// Stable reason code for callers keying messages off it.
    pub fn as_code(self) -> &'static str {
        match self {
            Self::NotAContainer => "NOT_A_CONTAINER",
            Self::MissingItem => "MISSING_ITEM",
            Self::NoNestedContainers => "NO_NESTED_CONTAINERS",
            Self::SelfReference => "SELF_REFERENCE",
            Self::AlreadyPresent => "ALREADY_PRESENT",
        }
    }
}

impl Display for MembershipRejection {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_code())
    }
}

/// Result of filing an artifact into a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MembershipOutcome {
    /// Artifact was appended to the target.
    Filed,
    /// Artifact was already in the target; nothing appended.
    AlreadyPresent,
    Rejected(MembershipRejection),
}

impl MembershipOutcome {
    pub fn is_ok(&self) -> bool {
        !matches!(self, Self::Rejected(_))
    }

    pub fn reason(&self) -> Option<MembershipRejection> {
        match self {
            Self::Rejected(reason) => Some(*reason),
            _ => None,
        }
    }

    pub fn already_present(&self) -> bool {
        matches!(self, Self::AlreadyPresent)
    }
}

/// Result of `VaultService::add`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddOutcome {
    /// The stored artifact.
    pub record: Record,
    /// Another record already carried the same hash. Advisory only.
    pub duplicate: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FilingPolicy {
    /// Refuse when the artifact is already in the target.
    RejectPresent,
    /// Treat presence in the target as success.
    AcceptPresent,
}

/// Store facade over one snapshot repository.
pub struct VaultService<R: SnapshotRepository> {
    repo: R,
}

impl<R: SnapshotRepository> VaultService<R> {
    /// Creates service from repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    /// Returns the full collection in insertion order, unfiltered.
    pub fn list(&self) -> RepoResult<Vec<Record>> {
        self.repo
            .load_snapshot()
            .inspect_err(|err| log_failure("vault_list", err))
    }

    /// Loads one record by id.
    pub fn get(&self, id: RecordId) -> RepoResult<Option<Record>> {
        Ok(self.list()?.into_iter().find(|record| record.id == id))
    }

    /// Stores `raw` as a new accepted artifact.
    ///
    /// # Contract
    /// - Always appends, even when the content hash is already known.
    /// - `duplicate` reports whether any earlier record shares the hash.
    pub fn add(&self, raw: impl Into<String>) -> RepoResult<AddOutcome> {
        let record = Record::new_artifact(raw);
        let outcome = self
            .repo
            .update_snapshot(|records| {
                let duplicate = records.iter().any(|existing| existing.hash == record.hash);
                records.push(record.clone());
                SnapshotChange::Persist(AddOutcome { record, duplicate })
            })
            .inspect_err(|err| log_failure("vault_add", err))?;

        info!(
            "event=vault_add module=service status=ok record_id={} duplicate={}",
            outcome.record.id, outcome.duplicate
        );
        Ok(outcome)
    }

    /// Creates an empty folder.
    ///
    /// Returns `None` when `spine_label` is blank after trim.
    pub fn create_container(&self, spine_label: &str) -> RepoResult<Option<Record>> {
        let Some(label) = normalize_label(spine_label) else {
            info!("event=vault_create_container module=service status=rejected reason=EMPTY_LABEL");
            return Ok(None);
        };

        let record = Record::new_container(label);
        self.repo
            .update_snapshot(|records| {
                records.push(record.clone());
                SnapshotChange::Persist(())
            })
            .inspect_err(|err| log_failure("vault_create_container", err))?;

        info!(
            "event=vault_create_container module=service status=ok record_id={}",
            record.id
        );
        Ok(Some(record))
    }

    /// Files `artifact_id` into `container_id`.
    ///
    /// Rejects with `AlreadyPresent` when the artifact is already in the
    /// target. Otherwise removes it from any other container first.
    pub fn add_to_container(
        &self,
        container_id: RecordId,
        artifact_id: RecordId,
    ) -> RepoResult<MembershipOutcome> {
        self.file_artifact(
            "vault_add_to_container",
            container_id,
            artifact_id,
            FilingPolicy::RejectPresent,
        )
    }

    /// Moves `artifact_id` into `container_id`, removing it from every other
    /// container.
    ///
    /// Presence in the target is reported as `MembershipOutcome::AlreadyPresent`.
    pub fn move_to_container(
        &self,
        container_id: RecordId,
        artifact_id: RecordId,
    ) -> RepoResult<MembershipOutcome> {
        self.file_artifact(
            "vault_move_to_container",
            container_id,
            artifact_id,
            FilingPolicy::AcceptPresent,
        )
    }

    /// Overwrites the lifecycle state of `id`.
    ///
    /// No transition rules apply. Unknown ids are a silent no-op.
    pub fn update_state(&self, id: RecordId, state: impl Into<RecordState>) -> RepoResult<()> {
        let state = state.into();
        let state_label = state.to_string();
        let updated = self
            .repo
            .update_snapshot(|records| match records.iter_mut().find(|r| r.id == id) {
                Some(record) => {
                    record.state = state;
                    SnapshotChange::Persist(true)
                }
                None => SnapshotChange::Unchanged(false),
            })
            .inspect_err(|err| log_failure("vault_update_state", err))?;

        if updated {
            info!(
                "event=vault_update_state module=service status=ok record_id={id} state={state_label}"
            );
        } else {
            info!("event=vault_update_state module=service status=skipped record_id={id}");
        }
        Ok(())
    }

    /// Replaces the stored label of `id` with the trimmed `spine_label`.
    ///
    /// Returns `false` without writing when the label is blank or the id is
    /// unknown.
    pub fn update_spine_label(&self, id: RecordId, spine_label: &str) -> RepoResult<bool> {
        let Some(label) = normalize_label(spine_label) else {
            info!(
                "event=vault_update_spine_label module=service status=rejected record_id={id} reason=EMPTY_LABEL"
            );
            return Ok(false);
        };

        let updated = self
            .repo
            .update_snapshot(|records| match records.iter_mut().find(|r| r.id == id) {
                Some(record) => {
                    record.spine_label = label;
                    SnapshotChange::Persist(true)
                }
                None => SnapshotChange::Unchanged(false),
            })
            .inspect_err(|err| log_failure("vault_update_spine_label", err))?;

        if updated {
            info!("event=vault_update_spine_label module=service status=ok record_id={id}");
        } else {
            info!(
                "event=vault_update_spine_label module=service status=rejected record_id={id} reason=MISSING_ITEM"
            );
        }
        Ok(updated)
    }

    fn file_artifact(
        &self,
        event: &'static str,
        container_id: RecordId,
        artifact_id: RecordId,
        policy: FilingPolicy,
    ) -> RepoResult<MembershipOutcome> {
        let (outcome, released) = self
            .repo
            .update_snapshot(|records| {
                let index = RecordIndex::build(records);
                let target = match resolve_membership(records, &index, container_id, artifact_id)
                {
                    Ok(target) => target,
                    Err(reason) => {
                        return SnapshotChange::Unchanged((
                            MembershipOutcome::Rejected(reason),
                            0,
                        ))
                    }
                };

                let already_present = index.homes_of(artifact_id).contains(&target);
                if already_present && policy == FilingPolicy::RejectPresent {
                    return SnapshotChange::Unchanged((
                        MembershipOutcome::Rejected(MembershipRejection::AlreadyPresent),
                        0,
                    ));
                }

                let mut released = 0_usize;
                for &home in index.homes_of(artifact_id) {
                    if home == target {
                        continue;
                    }
                    if let Some(contains) = records[home].contains_mut() {
                        contains.retain(|member| *member != artifact_id);
                        released += 1;
                    }
                }

                if already_present {
                    let outcome = (MembershipOutcome::AlreadyPresent, released);
                    return if released == 0 {
                        SnapshotChange::Unchanged(outcome)
                    } else {
                        SnapshotChange::Persist(outcome)
                    };
                }

                if let Some(contains) = records[target].contains_mut() {
                    contains.push(artifact_id);
                }
                SnapshotChange::Persist((MembershipOutcome::Filed, released))
            })
            .inspect_err(|err| log_failure(event, err))?;

        match outcome {
            MembershipOutcome::Rejected(reason) => info!(
                "event={event} module=service status=rejected container_id={container_id} record_id={artifact_id} reason={reason}"
            ),
            _ => info!(
                "event={event} module=service status=ok container_id={container_id} record_id={artifact_id} already_present={} released={released}",
                outcome.already_present()
            ),
        }
        Ok(outcome)
    }
}

/// Validates a membership request and returns the target position.
///
/// Check order is part of the contract: target, item, nesting, self.
fn resolve_membership(
    records: &[Record],
    index: &RecordIndex,
    container_id: RecordId,
    artifact_id: RecordId,
) -> Result<usize, MembershipRejection> {
    let target = index
        .position(container_id)
        .filter(|&position| records[position].is_container())
        .ok_or(MembershipRejection::NotAContainer)?;
    let item = index
        .position(artifact_id)
        .ok_or(MembershipRejection::MissingItem)?;
    if records[item].is_container() {
        return Err(MembershipRejection::NoNestedContainers);
    }
    if container_id == artifact_id {
        return Err(MembershipRejection::SelfReference);
    }
    Ok(target)
}

fn normalize_label(value: &str) -> Option<String> {
    let trimmed = trim_label(value);
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.to_string())
}

fn log_failure(event: &str, err: &RepoError) {
    error!("event={event} module=service status=error error={err}");
}
