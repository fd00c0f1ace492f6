//! Annotation lifecycle manager
//!
//! One manager is constructed per open document session and is the only
//! component that mutates the version's text and record set together. Every
//! lifecycle operation keeps the two in step: a marker character in the text
//! for every record in the store, and vice versa.
//!
//! Operations take an explicit `recordable` flag. Only user-initiated
//! operations are recorded for undo; programmatic and cascading mutations
//! (an annotation removed because its marker was deleted with a text
//! selection, for example) leave the undo and redo stacks untouched.

use crate::{
    adjust_offsets, insertion_number, renumber, AnnotationError, AnnotationId, AnnotationRecord,
    AnnotationStore, InMemoryPersistence, LifecycleOp, RecordPersistence, Result, UndoEntry,
    UndoManager, VersionId,
};
use rich_text::{InlineMarker, MarkerId, RichText};
use std::collections::HashSet;
use std::ops::Range;
use tracing::debug;

/// Lifecycle coordinator for one document version's annotations
#[derive(Debug)]
pub struct AnnotationManager<P: RecordPersistence> {
    version: VersionId,
    text: RichText,
    store: AnnotationStore,
    persistence: P,
    undo: UndoManager,
}

impl AnnotationManager<InMemoryPersistence> {
    /// Create a manager backed by in-memory persistence
    pub fn in_memory(version: VersionId, text: RichText) -> Self {
        Self::new(version, text, InMemoryPersistence::new())
    }
}

impl<P: RecordPersistence> AnnotationManager<P> {
    /// Create a manager for one document session
    pub fn new(version: VersionId, text: RichText, persistence: P) -> Self {
        Self {
            version,
            text,
            store: AnnotationStore::new(),
            persistence,
            undo: UndoManager::new(),
        }
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    /// The owning document version
    pub fn version(&self) -> VersionId {
        self.version
    }

    /// The version's text
    pub fn text(&self) -> &RichText {
        &self.text
    }

    /// The version's record set
    pub fn store(&self) -> &AnnotationStore {
        &self.store
    }

    /// The persistence backend
    pub fn persistence_mut(&mut self) -> &mut P {
        &mut self.persistence
    }

    /// Check if undo is available
    pub fn can_undo(&self) -> bool {
        self.undo.can_undo()
    }

    /// Check if redo is available
    pub fn can_redo(&self) -> bool {
        self.undo.can_redo()
    }

    /// Number of redoable entries
    pub fn redo_depth(&self) -> usize {
        self.undo.redo_depth()
    }

    // -------------------------------------------------------------------------
    // Creation
    // -------------------------------------------------------------------------

    /// Insert a footnote at a cursor position
    ///
    /// The text gains exactly one marker character; the record's position is
    /// that character's offset. All-or-nothing: a persistence failure leaves
    /// neither the marker nor the record behind.
    pub fn create_footnote(
        &mut self,
        position: usize,
        body: impl Into<String>,
        recordable: bool,
    ) -> Result<AnnotationId> {
        let marker = InlineMarker::footnote();
        let record = AnnotationRecord::footnote(self.version, position, marker.id, body);
        self.create_record(marker, record, recordable)
    }

    /// Insert a comment at a cursor position
    pub fn create_comment(
        &mut self,
        position: usize,
        author: impl Into<String>,
        body: impl Into<String>,
        recordable: bool,
    ) -> Result<AnnotationId> {
        let marker = InlineMarker::comment();
        let record = AnnotationRecord::comment(self.version, position, marker.id, author, body);
        self.create_record(marker, record, recordable)
    }

    fn create_record(
        &mut self,
        marker: InlineMarker,
        mut record: AnnotationRecord,
        recordable: bool,
    ) -> Result<AnnotationId> {
        if !self.persistence.is_available() {
            return Err(AnnotationError::PersistenceUnavailable);
        }
        let position = record.position;
        if position > self.text.len() {
            return Err(AnnotationError::PositionOutOfBounds {
                position,
                len: self.text.len(),
            });
        }

        self.text.insert_marker(position, marker)?;
        adjust_offsets(self.store.records_for_version_mut(self.version), position, 1);

        if record.is_footnote() {
            record.set_number(insertion_number(&self.store, self.version, position));
        }
        let id = self.store.insert(record);

        let snapshot = self.store.get(id).expect("record just inserted").clone();
        if let Err(err) = self.persistence.persist(&snapshot) {
            self.store.remove(id);
            self.text.remove_marker(marker.id);
            adjust_offsets(self.store.records_for_version_mut(self.version), position, -1);
            return Err(err);
        }

        renumber(&mut self.store, self.version);
        debug!(annotation = %id, position, "created annotation");

        if recordable {
            let snapshot = self.store.get(id).expect("record exists").clone();
            self.undo.record(UndoEntry {
                op: LifecycleOp::Insert { record: snapshot },
                inverse: LifecycleOp::Remove { id },
            });
        }
        Ok(id)
    }

    // -------------------------------------------------------------------------
    // Trash / restore / permanent deletion
    // -------------------------------------------------------------------------

    /// Soft-delete a record
    ///
    /// The inline marker stays in the text (it renders in a deleted visual
    /// state); the remaining active footnotes are renumbered.
    pub fn move_to_trash(&mut self, id: AnnotationId, recordable: bool) -> Result<()> {
        if !self.persistence.is_available() {
            return Err(AnnotationError::PersistenceUnavailable);
        }
        if self.trash_internal(id)? && recordable {
            self.undo.record(UndoEntry {
                op: LifecycleOp::Trash { id },
                inverse: LifecycleOp::Restore { id },
            });
        }
        Ok(())
    }

    /// Bring a record back from the trash
    ///
    /// Renumbering re-inserts it into the active ordering by its stored
    /// position, not by recency.
    pub fn restore(&mut self, id: AnnotationId, recordable: bool) -> Result<()> {
        if !self.persistence.is_available() {
            return Err(AnnotationError::PersistenceUnavailable);
        }
        if self.restore_internal(id)? && recordable {
            self.undo.record(UndoEntry {
                op: LifecycleOp::Restore { id },
                inverse: LifecycleOp::Trash { id },
            });
        }
        Ok(())
    }

    /// Remove a record irreversibly
    ///
    /// The caller must already have removed the inline marker from the text;
    /// this operation never touches the text. Not undoable.
    pub fn permanently_delete(&mut self, id: AnnotationId) -> Result<AnnotationRecord> {
        if !self.persistence.is_available() {
            return Err(AnnotationError::PersistenceUnavailable);
        }
        let record = self
            .store
            .get(id)
            .ok_or(AnnotationError::NotFound(id))?;
        if self.text.find_marker(record.marker_id).is_some() {
            return Err(AnnotationError::InvariantViolation(format!(
                "record {id} still has its marker in the text"
            )));
        }

        self.persistence.remove(id)?;
        let record = self.store.remove(id).expect("record looked up above");
        renumber(&mut self.store, self.version);
        debug!(annotation = %id, "permanently deleted annotation");
        Ok(record)
    }

    fn trash_internal(&mut self, id: AnnotationId) -> Result<bool> {
        let record = self
            .store
            .get_mut(id)
            .ok_or(AnnotationError::NotFound(id))?;
        if record.is_deleted() {
            return Ok(false);
        }
        record.mark_trashed();
        let snapshot = record.clone();
        self.persistence.persist(&snapshot)?;
        renumber(&mut self.store, self.version);
        debug!(annotation = %id, "moved annotation to trash");
        Ok(true)
    }

    fn restore_internal(&mut self, id: AnnotationId) -> Result<bool> {
        let record = self
            .store
            .get_mut(id)
            .ok_or(AnnotationError::NotFound(id))?;
        if !record.is_deleted() {
            return Ok(false);
        }
        record.restore_from_trash();
        let snapshot = record.clone();
        self.persistence.persist(&snapshot)?;
        renumber(&mut self.store, self.version);
        debug!(annotation = %id, "restored annotation from trash");
        Ok(true)
    }

    // -------------------------------------------------------------------------
    // Field updates
    // -------------------------------------------------------------------------

    /// Replace a record's body text
    pub fn update_body(
        &mut self,
        id: AnnotationId,
        body: impl Into<String>,
        recordable: bool,
    ) -> Result<()> {
        if !self.persistence.is_available() {
            return Err(AnnotationError::PersistenceUnavailable);
        }
        let body = body.into();
        let previous = self
            .store
            .get(id)
            .ok_or(AnnotationError::NotFound(id))?
            .body
            .clone();
        self.set_body_internal(id, body.clone())?;

        if recordable {
            self.undo.record(UndoEntry {
                op: LifecycleOp::SetBody { id, body },
                inverse: LifecycleOp::SetBody { id, body: previous },
            });
        }
        Ok(())
    }

    /// Move a record to a new character position
    ///
    /// Does not renumber: a bulk adjustment touching many records should pay
    /// for one renumbering pass, not one per record. Call [`Self::renumber`]
    /// afterwards if the relative order may have changed.
    pub fn update_position(&mut self, id: AnnotationId, position: usize) -> Result<()> {
        if !self.persistence.is_available() {
            return Err(AnnotationError::PersistenceUnavailable);
        }
        if position > self.text.len() {
            return Err(AnnotationError::PositionOutOfBounds {
                position,
                len: self.text.len(),
            });
        }
        let record = self
            .store
            .get_mut(id)
            .ok_or(AnnotationError::NotFound(id))?;
        record.position = position;
        record.touch();
        let snapshot = record.clone();
        self.persistence.persist(&snapshot)?;
        Ok(())
    }

    fn set_body_internal(&mut self, id: AnnotationId, body: String) -> Result<()> {
        let record = self
            .store
            .get_mut(id)
            .ok_or(AnnotationError::NotFound(id))?;
        record.set_body(body);
        let snapshot = record.clone();
        self.persistence.persist(&snapshot)?;
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Comment resolution
    // -------------------------------------------------------------------------

    /// Resolve a comment, returning whether anything changed
    ///
    /// An unknown id (or a footnote id) is a silent no-op.
    pub fn resolve_comment(&mut self, id: AnnotationId) -> Result<bool> {
        self.set_resolution(id, true)
    }

    /// Reopen a resolved comment, returning whether anything changed
    pub fn reopen_comment(&mut self, id: AnnotationId) -> Result<bool> {
        self.set_resolution(id, false)
    }

    fn set_resolution(&mut self, id: AnnotationId, resolved: bool) -> Result<bool> {
        if !self.persistence.is_available() {
            return Err(AnnotationError::PersistenceUnavailable);
        }
        let record = match self.store.get_mut(id) {
            Some(record) if record.is_comment() && record.is_resolved() != resolved => record,
            _ => return Ok(false),
        };
        if resolved {
            record.resolve();
        } else {
            record.reopen();
        }
        let snapshot = record.clone();
        self.persistence.persist(&snapshot)?;
        Ok(true)
    }

    // -------------------------------------------------------------------------
    // Host text edits
    // -------------------------------------------------------------------------

    /// Insert plain text into the host document, shifting anchors after it
    pub fn insert_text(&mut self, position: usize, content: &str) -> Result<()> {
        self.text.insert(position, content)?;
        let delta = content.chars().count() as isize;
        self.adjust_for_edit(position, delta);
        Ok(())
    }

    /// Delete a range from the host document
    ///
    /// Markers inside the range disappear with the text; their records are
    /// removed as a cascade. Cascade removals are programmatic and are never
    /// recorded for undo, so a pending redo stack survives them.
    pub fn delete_text(&mut self, range: Range<usize>) -> Result<()> {
        let cascade: Vec<MarkerId> = self
            .text
            .markers()
            .into_iter()
            .filter(|(position, _)| range.contains(position))
            .map(|(_, marker)| marker.id)
            .collect();
        if !cascade.is_empty() && !self.persistence.is_available() {
            return Err(AnnotationError::PersistenceUnavailable);
        }

        let removed = range.end.saturating_sub(range.start);
        self.text.delete(range.clone())?;
        self.adjust_for_edit(range.start, -(removed as isize));

        for marker_id in &cascade {
            if let Some(id) = self.store.get_by_marker(*marker_id).map(|record| record.id()) {
                self.persistence.remove(id)?;
                self.store.remove(id);
                debug!(annotation = %id, "removed annotation with deleted text");
            }
        }
        if !cascade.is_empty() {
            renumber(&mut self.store, self.version);
        }
        Ok(())
    }

    /// Shift every anchor of this version for one edit
    ///
    /// Runs before any renumbering or rendering reads positions. Pure offset
    /// shifts preserve relative order, so no renumbering pass follows.
    pub fn adjust_for_edit(&mut self, edit_position: usize, length_delta: isize) -> usize {
        adjust_offsets(
            self.store.records_for_version_mut(self.version),
            edit_position,
            length_delta,
        )
    }

    /// Recompute footnote numbers for this version
    pub fn renumber(&mut self) -> usize {
        renumber(&mut self.store, self.version)
    }

    // -------------------------------------------------------------------------
    // Undo / redo
    // -------------------------------------------------------------------------

    /// Undo the most recent recordable operation
    pub fn undo(&mut self) -> Result<()> {
        let entry = self.undo.pop_undo()?;
        self.apply_op(entry.inverse)
    }

    /// Redo the most recently undone operation
    pub fn redo(&mut self) -> Result<()> {
        let entry = self.undo.pop_redo()?;
        self.apply_op(entry.op)
    }

    fn apply_op(&mut self, op: LifecycleOp) -> Result<()> {
        if !self.persistence.is_available() {
            return Err(AnnotationError::PersistenceUnavailable);
        }
        match op {
            LifecycleOp::Insert { record } => {
                let marker = InlineMarker::with_id(record.marker_id, record.kind());
                self.text.insert_marker(record.position, marker)?;
                adjust_offsets(
                    self.store.records_for_version_mut(self.version),
                    record.position,
                    1,
                );
                self.persistence.persist(&record)?;
                self.store.reinsert(record);
                renumber(&mut self.store, self.version);
                Ok(())
            }
            LifecycleOp::Remove { id } => {
                let marker_id = self
                    .store
                    .get(id)
                    .ok_or(AnnotationError::NotFound(id))?
                    .marker_id;
                self.persistence.remove(id)?;
                self.store.remove(id);
                if let Some(position) = self.text.remove_marker(marker_id) {
                    adjust_offsets(
                        self.store.records_for_version_mut(self.version),
                        position,
                        -1,
                    );
                }
                renumber(&mut self.store, self.version);
                Ok(())
            }
            LifecycleOp::Trash { id } => self.trash_internal(id).map(|_| ()),
            LifecycleOp::Restore { id } => self.restore_internal(id).map(|_| ()),
            LifecycleOp::SetBody { id, body } => self.set_body_internal(id, body),
        }
    }

    // -------------------------------------------------------------------------
    // Consistency
    // -------------------------------------------------------------------------

    /// Verify that markers in the text and records in the store agree
    ///
    /// Every record must have its marker in the text and every marker must
    /// have its record. Violations indicate a programming error and fail
    /// loudly rather than being tolerated.
    pub fn check_consistency(&self) -> Result<()> {
        let text_markers: HashSet<MarkerId> = self
            .text
            .markers()
            .into_iter()
            .map(|(_, marker)| marker.id)
            .collect();
        let records = self.store.all_for_version(self.version);

        if text_markers.len() != records.len() {
            return Err(AnnotationError::InvariantViolation(format!(
                "{} markers in text, {} records in store",
                text_markers.len(),
                records.len()
            )));
        }
        for record in records {
            if !text_markers.contains(&record.marker_id) {
                return Err(AnnotationError::InvariantViolation(format!(
                    "record {} has no marker in the text",
                    record.id()
                )));
            }
        }
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn manager_with_text(text: &str) -> AnnotationManager<InMemoryPersistence> {
        AnnotationManager::in_memory(VersionId::new(), RichText::with_text(text))
    }

    #[test]
    fn test_create_footnote_inserts_marker_and_record() {
        let mut manager = manager_with_text("hello world");

        let id = manager.create_footnote(5, "a note", true).unwrap();

        assert_eq!(manager.text().len(), 12);
        assert_eq!(manager.text().marker_count(), 1);
        let record = manager.store().get(id).unwrap();
        assert_eq!(record.position, 5);
        assert_eq!(record.number(), Some(1));
        assert_eq!(manager.text().find_marker(record.marker_id), Some(5));
        manager.check_consistency().unwrap();
    }

    #[test]
    fn test_create_out_of_bounds() {
        let mut manager = manager_with_text("ab");
        let err = manager.create_footnote(10, "note", true).unwrap_err();
        assert!(matches!(
            err,
            AnnotationError::PositionOutOfBounds { position: 10, len: 2 }
        ));
    }

    #[test]
    fn test_create_shifts_later_anchors() {
        let mut manager = manager_with_text("0123456789");
        let late = manager.create_footnote(8, "late", true).unwrap();

        manager.create_footnote(2, "early", true).unwrap();

        assert_eq!(manager.store().get(late).unwrap().position, 9);
        manager.check_consistency().unwrap();
    }

    #[test]
    fn test_persistence_failure_applies_nothing() {
        let mut manager = manager_with_text("hello");
        manager.persistence_mut().set_available(false);

        let err = manager.create_footnote(2, "note", true).unwrap_err();

        assert!(matches!(err, AnnotationError::PersistenceUnavailable));
        assert_eq!(manager.text().len(), 5);
        assert_eq!(manager.text().marker_count(), 0);
        assert!(manager.store().is_empty());
        assert!(!manager.can_undo());
    }

    #[test]
    fn test_trash_keeps_marker_and_renumbers() {
        let mut manager = manager_with_text("some longer text body");
        let first = manager.create_footnote(3, "one", true).unwrap();
        let second = manager.create_footnote(9, "two", true).unwrap();
        let third = manager.create_footnote(15, "three", true).unwrap();

        manager.move_to_trash(second, true).unwrap();

        // Marker stays in the text; numbering closes the gap.
        assert_eq!(manager.text().marker_count(), 3);
        assert_eq!(manager.store().get(first).unwrap().number(), Some(1));
        assert_eq!(manager.store().get(third).unwrap().number(), Some(2));
        assert!(manager.store().get(second).unwrap().is_deleted());
        manager.check_consistency().unwrap();
    }

    #[test]
    fn test_restore_orders_by_position() {
        let mut manager = manager_with_text("some longer text body");
        let first = manager.create_footnote(3, "one", true).unwrap();
        let second = manager.create_footnote(9, "two", true).unwrap();
        let third = manager.create_footnote(15, "three", true).unwrap();

        manager.move_to_trash(second, true).unwrap();
        manager.restore(second, true).unwrap();

        assert_eq!(manager.store().get(first).unwrap().number(), Some(1));
        assert_eq!(manager.store().get(second).unwrap().number(), Some(2));
        assert_eq!(manager.store().get(third).unwrap().number(), Some(3));
    }

    #[test]
    fn test_permanent_delete_requires_marker_removed() {
        let mut manager = manager_with_text("hello");
        let id = manager.create_footnote(2, "note", true).unwrap();

        let err = manager.permanently_delete(id).unwrap_err();
        assert!(matches!(err, AnnotationError::InvariantViolation(_)));

        // Removing the marker (as a text deletion) cascades the record away.
        manager.delete_text(2..3).unwrap();
        assert!(manager.store().get(id).is_none());
        assert_eq!(manager.text().plain_text(), "hello");
    }

    #[test]
    fn test_permanent_delete_of_detached_record() {
        let mut manager = manager_with_text("hello");
        let id = manager.create_footnote(2, "note", true).unwrap();
        let marker_id = manager.store().get(id).unwrap().marker_id;

        // Trash it, then drop the marker with its text.
        manager.move_to_trash(id, true).unwrap();
        let before_len = manager.text().len();
        let marker_position = manager.text().find_marker(marker_id).unwrap();
        manager.delete_text(marker_position..marker_position + 1).unwrap();

        // The cascade already removed the record; text only lost the marker.
        assert_eq!(manager.text().len(), before_len - 1);
        assert!(matches!(
            manager.permanently_delete(id),
            Err(AnnotationError::NotFound(_))
        ));
    }

    #[test]
    fn test_update_body_and_undo() {
        let mut manager = manager_with_text("hello");
        let id = manager.create_footnote(1, "first", true).unwrap();

        manager.update_body(id, "second", true).unwrap();
        assert_eq!(manager.store().get(id).unwrap().body, "second");

        manager.undo().unwrap();
        assert_eq!(manager.store().get(id).unwrap().body, "first");

        manager.redo().unwrap();
        assert_eq!(manager.store().get(id).unwrap().body, "second");
    }

    #[test]
    fn test_resolve_unknown_comment_is_silent_noop() {
        let mut manager = manager_with_text("hello");
        let changed = manager.resolve_comment(AnnotationId::new()).unwrap();
        assert!(!changed);
    }

    #[test]
    fn test_resolve_and_reopen_comment() {
        let mut manager = manager_with_text("hello");
        let id = manager.create_comment(3, "Alice", "look here", true).unwrap();

        assert!(manager.resolve_comment(id).unwrap());
        assert!(manager.store().get(id).unwrap().is_resolved());
        // Resolving again changes nothing.
        assert!(!manager.resolve_comment(id).unwrap());

        assert!(manager.reopen_comment(id).unwrap());
        assert!(!manager.store().get(id).unwrap().is_resolved());
    }

    #[test]
    fn test_resolve_footnote_is_noop() {
        let mut manager = manager_with_text("hello");
        let id = manager.create_footnote(0, "note", true).unwrap();
        assert!(!manager.resolve_comment(id).unwrap());
    }

    #[test]
    fn test_undo_create_removes_marker_and_record() {
        let mut manager = manager_with_text("hello");
        let id = manager.create_footnote(2, "note", true).unwrap();

        manager.undo().unwrap();

        assert_eq!(manager.text().len(), 5);
        assert!(manager.store().get(id).is_none());
        manager.check_consistency().unwrap();

        manager.redo().unwrap();
        assert_eq!(manager.text().len(), 6);
        let record = manager.store().get(id).unwrap();
        assert_eq!(record.position, 2);
        assert_eq!(record.number(), Some(1));
        manager.check_consistency().unwrap();
    }

    #[test]
    fn test_update_position_does_not_renumber() {
        let mut manager = manager_with_text("a somewhat longer body");
        let first = manager.create_footnote(2, "one", true).unwrap();
        let second = manager.create_footnote(10, "two", true).unwrap();

        // Swap the order without an explicit renumbering pass.
        manager.update_position(first, 15).unwrap();
        assert_eq!(manager.store().get(first).unwrap().number(), Some(1));

        manager.renumber();
        assert_eq!(manager.store().get(first).unwrap().number(), Some(2));
        assert_eq!(manager.store().get(second).unwrap().number(), Some(1));
    }
}
