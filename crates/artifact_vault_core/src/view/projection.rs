//! Read-model projections over a loaded snapshot.
//!
//! # Responsibility
//! - Derive the index and folder views a presentation layer renders.
//! - Derive short payload snippets for previews.
//!
//! # Invariants
//! - Projections never mutate or reorder the snapshot.
//! - Folder contents skip ids that do not resolve to an artifact.

use crate::model::record::{Record, RecordId};
use std::collections::{HashMap, HashSet};

/// Default preview length in characters.
pub const DEFAULT_SNIPPET_CHARS: usize = 240;

const ELLIPSIS: char = '\u{2026}';

/// The top-level "All" view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexView<'a> {
    /// Every container, in insertion order.
    pub folders: Vec<&'a Record>,
    /// Artifacts not filed in any container, in insertion order.
    pub unfiled: Vec<&'a Record>,
}

/// Builds the top-level view: folders first, then unfiled artifacts.
pub fn project_index(records: &[Record]) -> IndexView<'_> {
    let filed = filed_ids(records);
    let (folders, artifacts): (Vec<&Record>, Vec<&Record>) =
        records.iter().partition(|record| record.is_container());
    let unfiled = artifacts
        .into_iter()
        .filter(|record| !filed.contains(&record.id))
        .collect();

    IndexView { folders, unfiled }
}

/// Resolves a container's members in `contains` order.
///
/// Returns `None` when `container_id` is unknown or not a container.
pub fn container_contents(records: &[Record], container_id: RecordId) -> Option<Vec<&Record>> {
    let container = records
        .iter()
        .find(|record| record.id == container_id && record.is_container())?;
    let by_id: HashMap<RecordId, &Record> =
        records.iter().map(|record| (record.id, record)).collect();

    let members = container
        .contains()
        .unwrap_or_default()
        .iter()
        .filter_map(|id| by_id.get(id).copied())
        .filter(|record| !record.is_container())
        .collect();
    Some(members)
}

/// Ids of every record listed by any container.
pub fn filed_ids(records: &[Record]) -> HashSet<RecordId> {
    records
        .iter()
        .filter_map(Record::contains)
        .flatten()
        .copied()
        .collect()
}

/// First `max_chars` characters of `raw`, with `…` when truncated.
///
/// Characters are Unicode scalar values, so a character outside the BMP
/// counts once and is never split into half a surrogate pair.
pub fn snippet(raw: &str, max_chars: usize) -> String {
    match raw.char_indices().nth(max_chars) {
        Some((cut, _)) => {
            let mut out = String::with_capacity(cut + ELLIPSIS.len_utf8());
            out.push_str(&raw[..cut]);
            out.push(ELLIPSIS);
            out
        }
        None => raw.to_string(),
    }
}
