//! Inline annotation markers
//!
//! A marker is the single-character placeholder that anchors a footnote or
//! comment inside the text. The character itself is a sentinel codepoint;
//! the marker's identity and kind travel as an attribute on that one
//! character, so markers can be located by scanning the text and survive
//! run re-splicing during edits.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The sentinel character that stands in for an annotation marker
/// (U+FFFC OBJECT REPLACEMENT CHARACTER)
pub const MARKER_CHAR: char = '\u{FFFC}';

// =============================================================================
// Marker ID
// =============================================================================

/// Unique identifier for an inline marker
///
/// Distinct from the annotation record's own id: the marker id is what links
/// a character in the text to its record in the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MarkerId(Uuid);

impl MarkerId {
    /// Create a new random MarkerId
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a MarkerId from an existing UUID
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the underlying UUID
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }

    /// Create a MarkerId from a string representation
    pub fn from_string(s: &str) -> Option<Self> {
        Uuid::parse_str(s).ok().map(Self)
    }
}

impl Default for MarkerId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for MarkerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for MarkerId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl From<MarkerId> for Uuid {
    fn from(id: MarkerId) -> Self {
        id.0
    }
}

// =============================================================================
// Annotation Kind
// =============================================================================

/// Kind of annotation a marker anchors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnnotationKind {
    /// Numbered footnote rendered at the bottom of the page
    Footnote,
    /// Review comment attached to a point in the text
    Comment,
}

// =============================================================================
// Inline Marker
// =============================================================================

/// The value attached to a marker character in the text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineMarker {
    /// Identity linking this character to its annotation record
    pub id: MarkerId,
    /// Kind of annotation anchored here
    pub kind: AnnotationKind,
}

impl InlineMarker {
    /// Create a marker of the given kind with a fresh id
    pub fn new(kind: AnnotationKind) -> Self {
        Self {
            id: MarkerId::new(),
            kind,
        }
    }

    /// Create a footnote marker with a fresh id
    pub fn footnote() -> Self {
        Self::new(AnnotationKind::Footnote)
    }

    /// Create a comment marker with a fresh id
    pub fn comment() -> Self {
        Self::new(AnnotationKind::Comment)
    }

    /// Create a marker with a specific id (for rehydration from storage)
    pub fn with_id(id: MarkerId, kind: AnnotationKind) -> Self {
        Self { id, kind }
    }

    /// Check if this marker anchors a footnote
    pub fn is_footnote(&self) -> bool {
        self.kind == AnnotationKind::Footnote
    }

    /// Check if this marker anchors a comment
    pub fn is_comment(&self) -> bool {
        self.kind == AnnotationKind::Comment
    }
}
