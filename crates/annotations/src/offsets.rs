//! Offset adjustment - keeping annotation anchors in step with text edits
//!
//! Every edit to the host document is described as (position, length delta).
//! Records anchored at or after the edit point shift by the delta; records
//! before it are untouched. A deletion can never push an anchor to a
//! position earlier than the edit point — the result is clamped there, so
//! an anchor is never attributed to content that was not edited.

use crate::AnnotationRecord;

/// Shift the positions of `records` for one edit, returning how many moved
///
/// The whole record set is updated in a single pass; callers must not read
/// positions (for numbering or rendering) until it returns.
pub fn adjust_offsets<'a>(
    records: impl IntoIterator<Item = &'a mut AnnotationRecord>,
    edit_position: usize,
    length_delta: isize,
) -> usize {
    let mut moved = 0;
    for record in records {
        // An anchor exactly at the edit point moves with the content after it.
        if record.position >= edit_position {
            let shifted = record.position as isize + length_delta;
            record.position = shifted.max(edit_position as isize) as usize;
            moved += 1;
        }
    }
    moved
}

// =============================================================================
// Tests
// =============================================================================
