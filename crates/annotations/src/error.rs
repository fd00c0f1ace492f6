//! Error types for annotation operations

use crate::AnnotationId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnnotationError {
    #[error("persistence is unavailable")]
    PersistenceUnavailable,

    #[error("annotation not found: {0}")]
    NotFound(AnnotationId),

    #[error("position {position} is out of bounds (text length {len})")]
    PositionOutOfBounds { position: usize, len: usize },

    #[error("annotation state is inconsistent: {0}")]
    InvariantViolation(String),

    #[error("rich text error: {0}")]
    RichText(#[from] rich_text::RichTextError),

    #[error("undo stack is empty")]
    UndoStackEmpty,

    #[error("redo stack is empty")]
    RedoStackEmpty,
}

pub type Result<T> = std::result::Result<T, AnnotationError>;
