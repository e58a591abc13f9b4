//! Property tests for snapshot persistence and membership invariants.

use artifact_vault_core::db::open_db_in_memory;
use artifact_vault_core::repo::snapshot_repo::{decode_snapshot, encode_snapshot};
use artifact_vault_core::{
    content_hash, filed_ids, project_index, MemorySnapshotRepository, Record, RecordBody,
    RecordId, RecordState, SnapshotRepository, SqliteSnapshotRepository, VaultService,
};
use proptest::prelude::*;
use std::collections::HashSet;
use uuid::Uuid;

fn arb_state() -> impl Strategy<Value = RecordState> {
    prop_oneof![
        Just(RecordState::Accepted),
        Just(RecordState::Frozen),
        Just(RecordState::Abandoned),
        "[A-Z_]{1,12}".prop_map(RecordState::from),
    ]
}

fn arb_artifact() -> impl Strategy<Value = Record> {
    (any::<u128>(), ".{0,64}", ".{0,16}", arb_state()).prop_map(|(seed, raw, label, state)| {
        Record {
            id: Uuid::from_u128(seed | 1),
            created_at: "2026-01-01T00:00:00.000Z".to_string(),
            state,
            spine_label: label,
            hash: content_hash(&raw),
            body: RecordBody::Artifact { raw },
            extra: Default::default(),
        }
    })
}

/// Builds a collection of artifacts plus containers filing a subset of them.
fn arb_collection() -> impl Strategy<Value = Vec<Record>> {
    (
        prop::collection::vec(arb_artifact(), 0..24),
        prop::collection::vec(prop::collection::vec(any::<prop::sample::Index>(), 0..6), 0..4),
    )
        .prop_map(|(artifacts, folders)| {
            let mut seen = HashSet::new();
            let mut records: Vec<Record> = artifacts
                .into_iter()
                .filter(|record| seen.insert(record.id))
                .collect();
            let artifact_ids: Vec<RecordId> = records.iter().map(|record| record.id).collect();

            for (position, picks) in folders.into_iter().enumerate() {
                let mut folder = Record::new_container(format!("Folder {position}"));
                if !artifact_ids.is_empty() {
                    let members = folder.contains_mut().expect("container");
                    for pick in picks {
                        members.push(*pick.get(&artifact_ids));
                    }
                }
                records.push(folder);
            }
            records
        })
}

proptest! {
    #[test]
    fn encode_then_decode_is_field_for_field_equal(records in arb_collection()) {
        let payload = encode_snapshot(&records).unwrap();
        prop_assert_eq!(decode_snapshot(&payload).unwrap(), records);
    }

    #[test]
    fn memory_repository_round_trips(records in arb_collection()) {
        let repo = MemorySnapshotRepository::new();
        repo.save_snapshot(&records).unwrap();
        prop_assert_eq!(repo.load_snapshot().unwrap(), records);
    }

    #[test]
    fn moves_leave_every_artifact_with_at_most_one_home(
        records in arb_collection(),
        moves in prop::collection::vec((any::<prop::sample::Index>(), any::<prop::sample::Index>()), 0..16),
    ) {
        let artifact_ids: Vec<RecordId> = records
            .iter()
            .filter(|record| !record.is_container())
            .map(|record| record.id)
            .collect();
        let folder_ids: Vec<RecordId> = records
            .iter()
            .filter(|record| record.is_container())
            .map(|record| record.id)
            .collect();
        prop_assume!(!artifact_ids.is_empty() && !folder_ids.is_empty());

        let repo = MemorySnapshotRepository::new();
        repo.save_snapshot(&records).unwrap();
        let service = VaultService::new(repo);

        let mut moved = HashSet::new();
        for (folder_pick, artifact_pick) in moves {
            let folder_id = *folder_pick.get(&folder_ids);
            let artifact_id = *artifact_pick.get(&artifact_ids);
            let outcome = service.move_to_container(folder_id, artifact_id).unwrap();
            prop_assert!(outcome.is_ok());
            moved.insert(artifact_id);
        }

        let after = service.list().unwrap();
        for artifact_id in moved {
            let homes = after
                .iter()
                .filter(|record| record.contains().is_some_and(|c| c.contains(&artifact_id)))
                .count();
            prop_assert_eq!(homes, 1);
        }
        for record in &after {
            if let Some(contains) = record.contains() {
                prop_assert!(contains.iter().all(|id| !folder_ids.contains(id)));
            }
        }
    }
}

#[test]
fn thousand_record_vault_stays_consistent() {
    let conn = open_db_in_memory().unwrap();
    let service = VaultService::new(SqliteSnapshotRepository::with_default_key(&conn).unwrap());

    // Seed in one write; per-call intake would rewrite the snapshot 1000 times.
    let seeded: Vec<Record> = (0..1000)
        .map(|n| Record::new_artifact(format!("artifact {}", n % 250)))
        .collect();
    service.repository().save_snapshot(&seeded).unwrap();

    let folder_a = service.create_container("A").unwrap().unwrap();
    let folder_b = service.create_container("B").unwrap().unwrap();
    for record in seeded.iter().step_by(10) {
        assert!(service.move_to_container(folder_a.id, record.id).unwrap().is_ok());
    }
    for record in seeded.iter().step_by(20) {
        assert!(service.move_to_container(folder_b.id, record.id).unwrap().is_ok());
    }

    let outcome = service.add("artifact 7").unwrap();
    assert!(outcome.duplicate);

    let records = service.list().unwrap();
    assert_eq!(records.len(), 1003);

    let a_members = records[1000].contains().unwrap();
    let b_members = records[1001].contains().unwrap();
    assert_eq!(a_members.len(), 50);
    assert_eq!(b_members.len(), 50);
    assert!(a_members.iter().all(|id| !b_members.contains(id)));

    assert_eq!(filed_ids(&records).len(), 100);
    let view = project_index(&records);
    assert_eq!(view.folders.len(), 2);
    assert_eq!(view.unfiled.len(), 901);
}
