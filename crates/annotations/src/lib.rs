//! Annotations - position-anchored footnotes and comments
//!
//! This crate keeps a document version's annotation records consistent with
//! its text as both are edited: offset adjustment for every text edit,
//! deterministic footnote numbering, soft-delete/restore lifecycle, and
//! undo/redo bookkeeping that distinguishes user actions from programmatic
//! mutations.

mod error;
mod lifecycle;
mod numbering;
mod offsets;
mod persistence;
mod record;
mod store;
mod undo;

pub use error::*;
pub use lifecycle::*;
pub use numbering::*;
pub use offsets::*;
pub use persistence::*;
pub use record::*;
pub use store::*;
pub use undo::*;

// The marker types live with the text model; re-export them so callers of
// this crate see one coherent annotation API.
pub use rich_text::{AnnotationKind, InlineMarker, MarkerId};
