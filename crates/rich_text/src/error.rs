//! Error types for rich text operations

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RichTextError {
    #[error("position {position} is out of bounds (text length {len})")]
    PositionOutOfBounds { position: usize, len: usize },

    #[error("range {start}..{end} is out of bounds (text length {len})")]
    RangeOutOfBounds {
        start: usize,
        end: usize,
        len: usize,
    },

    #[error("attribute runs do not partition the text: {0}")]
    MalformedRuns(String),
}

pub type Result<T> = std::result::Result<T, RichTextError>;
