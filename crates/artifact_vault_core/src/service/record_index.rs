//! Per-operation lookup index over a loaded snapshot.
//!
//! # Responsibility
//! - Resolve record ids to snapshot positions in O(1).
//! - Track which containers currently list each artifact ("homes").
//!
//! # Invariants
//! - Positions refer to the slice the index was built from; rebuild after
//!   inserting or removing records.
//! - `homes_of` lists container positions in snapshot order.

use crate::model::record::{Record, RecordId};
use std::collections::HashMap;

/// Id → position map plus artifact → container positions.
#[derive(Debug, Default)]
pub struct RecordIndex {
    positions: HashMap<RecordId, usize>,
    homes: HashMap<RecordId, Vec<usize>>,
}

impl RecordIndex {
    /// Builds the index in one pass over `records`.
    pub fn build(records: &[Record]) -> Self {
        let mut positions = HashMap::with_capacity(records.len());
        let mut homes: HashMap<RecordId, Vec<usize>> = HashMap::new();

        for (position, record) in records.iter().enumerate() {
            positions.insert(record.id, position);
            if let Some(contains) = record.contains() {
                for member in contains {
                    let entry = homes.entry(*member).or_default();
                    if entry.last() != Some(&position) {
                        entry.push(position);
                    }
                }
            }
        }

        Self { positions, homes }
    }

    pub fn position(&self, id: RecordId) -> Option<usize> {
        self.positions.get(&id).copied()
    }

    /// Positions of containers whose `contains` lists `id`.
    pub fn homes_of(&self, id: RecordId) -> &[usize] {
        self.homes.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::RecordIndex;
    use crate::model::record::Record;

    #[test]
    fn build_tracks_positions_and_homes() {
        let artifact = Record::new_artifact("a");
        let mut first = Record::new_container("First");
        let mut second = Record::new_container("Second");
        first.contains_mut().unwrap().push(artifact.id);
        second.contains_mut().unwrap().push(artifact.id);
        let records = vec![artifact.clone(), first, second];

        let index = RecordIndex::build(&records);
        assert_eq!(index.len(), 3);
        assert_eq!(index.position(artifact.id), Some(0));
        assert_eq!(index.homes_of(artifact.id), &[1, 2]);
        assert!(index.homes_of(records[1].id).is_empty());
    }

    #[test]
    fn repeated_member_in_one_container_is_one_home() {
        let artifact = Record::new_artifact("a");
        let mut folder = Record::new_container("Folder");
        folder
            .contains_mut()
            .unwrap()
            .extend([artifact.id, artifact.id]);
        let records = vec![artifact.clone(), folder];

        let index = RecordIndex::build(&records);
        assert_eq!(index.homes_of(artifact.id), &[1]);
    }
}
