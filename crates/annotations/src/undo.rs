//! Undo/redo bookkeeping for annotation lifecycle operations
//!
//! Each recorded entry pairs a forward operation with its inverse, in the
//! style of command/inverse pairs. Only user-initiated (recordable)
//! operations are pushed here; programmatic and cascading mutations bypass
//! this manager entirely, so a pending redo stack survives them.

use crate::{AnnotationError, AnnotationId, AnnotationRecord, Result};

/// A replayable lifecycle operation
#[derive(Debug, Clone)]
pub enum LifecycleOp {
    /// Re-insert a marker and its record (the snapshot carries both)
    Insert { record: AnnotationRecord },
    /// Remove a record and its marker entirely
    Remove { id: AnnotationId },
    /// Soft-delete a record
    Trash { id: AnnotationId },
    /// Bring a record back from the trash
    Restore { id: AnnotationId },
    /// Replace a record's body text
    SetBody { id: AnnotationId, body: String },
}

/// A forward operation paired with its inverse
#[derive(Debug, Clone)]
pub struct UndoEntry {
    /// The operation as originally applied (replayed on redo)
    pub op: LifecycleOp,
    /// The operation that reverses it (applied on undo)
    pub inverse: LifecycleOp,
}

/// Manages the undo and redo stacks
#[derive(Debug)]
pub struct UndoManager {
    undo_stack: Vec<UndoEntry>,
    redo_stack: Vec<UndoEntry>,
    max_entries: usize,
}

impl UndoManager {
    const DEFAULT_MAX_ENTRIES: usize = 100;

    /// Create a new undo manager
    pub fn new() -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_entries: Self::DEFAULT_MAX_ENTRIES,
        }
    }

    /// Create with a custom history limit
    pub fn with_limit(max_entries: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_entries,
        }
    }

    /// Record a user-initiated operation
    ///
    /// A fresh user action invalidates anything that was redoable.
    pub fn record(&mut self, entry: UndoEntry) {
        self.redo_stack.clear();
        self.undo_stack.push(entry);

        while self.undo_stack.len() > self.max_entries {
            self.undo_stack.remove(0);
        }
    }

    /// Pop the most recent entry for undo, moving it onto the redo stack
    pub fn pop_undo(&mut self) -> Result<UndoEntry> {
        let entry = self
            .undo_stack
            .pop()
            .ok_or(AnnotationError::UndoStackEmpty)?;
        self.redo_stack.push(entry.clone());
        Ok(entry)
    }

    /// Pop the most recent entry for redo, moving it back to the undo stack
    ///
    /// Redo never clears the redo stack: remaining entries stay redoable.
    pub fn pop_redo(&mut self) -> Result<UndoEntry> {
        let entry = self
            .redo_stack
            .pop()
            .ok_or(AnnotationError::RedoStackEmpty)?;
        self.undo_stack.push(entry.clone());
        Ok(entry)
    }

    /// Check if undo is available
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Check if redo is available
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Number of redoable entries
    pub fn redo_depth(&self) -> usize {
        self.redo_stack.len()
    }

    /// Clear all history
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}

impl Default for UndoManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: AnnotationId) -> UndoEntry {
        UndoEntry {
            op: LifecycleOp::Trash { id },
            inverse: LifecycleOp::Restore { id },
        }
    }

    #[test]
    fn test_record_clears_redo() {
        let mut manager = UndoManager::new();
        let id = AnnotationId::new();

        manager.record(entry(id));
        manager.pop_undo().unwrap();
        assert!(manager.can_redo());

        manager.record(entry(id));
        assert!(!manager.can_redo());
    }

    #[test]
    fn test_undo_then_redo_round_trip() {
        let mut manager = UndoManager::new();
        let id = AnnotationId::new();

        manager.record(entry(id));
        assert!(manager.can_undo());
        assert!(!manager.can_redo());

        manager.pop_undo().unwrap();
        assert!(!manager.can_undo());
        assert!(manager.can_redo());

        manager.pop_redo().unwrap();
        assert!(manager.can_undo());
        assert!(!manager.can_redo());
    }

    #[test]
    fn test_empty_stacks_error() {
        let mut manager = UndoManager::new();
        assert!(matches!(
            manager.pop_undo(),
            Err(AnnotationError::UndoStackEmpty)
        ));
        assert!(matches!(
            manager.pop_redo(),
            Err(AnnotationError::RedoStackEmpty)
        ));
    }

    #[test]
    fn test_history_limit() {
        let mut manager = UndoManager::with_limit(2);
        for _ in 0..5 {
            manager.record(entry(AnnotationId::new()));
        }

        manager.pop_undo().unwrap();
        manager.pop_undo().unwrap();
        assert!(!manager.can_undo());
    }
}
