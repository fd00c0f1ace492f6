//! Footnote numbering
//!
//! Display numbers are a pure function of the active footnote set: sort by
//! character position, break ties by creation order, assign 1..N. The pass
//! runs after create, trash, and restore; pure offset shifts from typing
//! preserve relative order and only need offset adjustment.

use crate::{store::position_order, AnnotationStore, VersionId};

/// Recompute display numbers for the active footnotes of one version
///
/// Returns the count of active footnotes numbered. Trashed footnotes are
/// excluded and keep their last-known number.
pub fn renumber(store: &mut AnnotationStore, version: VersionId) -> usize {
    let mut ordered: Vec<_> = store
        .active_for_version(version)
        .into_iter()
        .filter(|record| record.is_footnote())
        .map(|record| record.id())
        .collect();
    // active_for_version already sorts, but resorting here keeps this pass
    // correct even if the query's ordering guarantee ever changes.
    ordered.sort_by(|a, b| {
        let ra = store.get(*a).expect("record listed by query");
        let rb = store.get(*b).expect("record listed by query");
        position_order(ra, rb)
    });

    let count = ordered.len();
    for (index, id) in ordered.into_iter().enumerate() {
        if let Some(record) = store.get_mut(id) {
            record.set_number(index as u32 + 1);
        }
    }
    count
}

/// Provisional number for a footnote being created at `position`
///
/// One more than the count of active footnotes strictly before the new
/// position; the full renumbering pass confirms it afterwards.
pub fn insertion_number(store: &AnnotationStore, version: VersionId, position: usize) -> u32 {
    let before = store
        .active_for_version(version)
        .into_iter()
        .filter(|record| record.is_footnote() && record.position < position)
        .count();
    before as u32 + 1
}

// =============================================================================
// Tests
// =============================================================================
