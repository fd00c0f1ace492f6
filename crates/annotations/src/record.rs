//! Annotation records - footnotes and comments anchored to character offsets
//!
//! A record lives in the [`crate::AnnotationStore`] of one document version
//! and is linked to the text by its marker id. Footnotes carry a display
//! number assigned by position order among active records; comments carry an
//! author and a resolution state.

use chrono::{DateTime, Utc};
use rich_text::{AnnotationKind, MarkerId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// =============================================================================
// Annotation ID
// =============================================================================

/// Unique identifier for an annotation record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AnnotationId(Uuid);

impl AnnotationId {
    /// Create a new random AnnotationId
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create an AnnotationId from an existing UUID
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the underlying UUID
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }

    /// Create an AnnotationId from a string representation
    pub fn from_string(s: &str) -> Option<Self> {
        Uuid::parse_str(s).ok().map(Self)
    }
}

impl Default for AnnotationId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for AnnotationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for AnnotationId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl From<AnnotationId> for Uuid {
    fn from(id: AnnotationId) -> Self {
        id.0
    }
}

// =============================================================================
// Version ID
// =============================================================================

/// Identifier of the document version owning a set of annotations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VersionId(Uuid);

impl VersionId {
    /// Create a new random VersionId
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a VersionId from an existing UUID
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the underlying UUID
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for VersionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for VersionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// Annotation Detail
// =============================================================================

/// Kind-specific fields of an annotation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AnnotationDetail {
    /// A numbered footnote
    Footnote {
        /// Display number, contiguous from 1 among active footnotes;
        /// None until the first numbering pass runs
        number: Option<u32>,
    },
    /// A review comment
    Comment {
        /// Who wrote the comment
        author: String,
        /// Whether the comment has been resolved
        resolved: bool,
        /// When the comment was resolved, if it was
        resolved_at: Option<DateTime<Utc>>,
    },
}

// =============================================================================
// Annotation Record
// =============================================================================

/// A footnote or comment anchored to a character offset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotationRecord {
    /// Unique ID for this record
    id: AnnotationId,
    /// Document version owning this record
    pub version: VersionId,
    /// Identity of the inline marker character in the text
    pub marker_id: MarkerId,
    /// Character offset of the marker in the text
    pub position: usize,
    /// Free-text body
    pub body: String,
    /// When the record was created
    pub created_at: DateTime<Utc>,
    /// When the record was last modified
    pub modified_at: DateTime<Utc>,
    /// Soft-delete flag
    pub deleted: bool,
    /// When the record was soft-deleted, nil unless deleted
    pub deleted_at: Option<DateTime<Utc>>,
    /// Creation order within the store, used to break position ties
    pub(crate) created_seq: u64,
    /// Kind-specific fields
    pub detail: AnnotationDetail,
}

impl AnnotationRecord {
    /// Create a new footnote record
    pub fn footnote(
        version: VersionId,
        position: usize,
        marker_id: MarkerId,
        body: impl Into<String>,
    ) -> Self {
        Self::new(version, position, marker_id, body, AnnotationDetail::Footnote { number: None })
    }

    /// Create a new comment record
    pub fn comment(
        version: VersionId,
        position: usize,
        marker_id: MarkerId,
        author: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self::new(
            version,
            position,
            marker_id,
            body,
            AnnotationDetail::Comment {
                author: author.into(),
                resolved: false,
                resolved_at: None,
            },
        )
    }

    fn new(
        version: VersionId,
        position: usize,
        marker_id: MarkerId,
        body: impl Into<String>,
        detail: AnnotationDetail,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: AnnotationId::new(),
            version,
            marker_id,
            position,
            body: body.into(),
            created_at: now,
            modified_at: now,
            deleted: false,
            deleted_at: None,
            created_seq: 0,
            detail,
        }
    }

    /// Get the record ID
    pub fn id(&self) -> AnnotationId {
        self.id
    }

    /// Kind of annotation this record represents
    pub fn kind(&self) -> AnnotationKind {
        match self.detail {
            AnnotationDetail::Footnote { .. } => AnnotationKind::Footnote,
            AnnotationDetail::Comment { .. } => AnnotationKind::Comment,
        }
    }

    /// Check if this is a footnote
    pub fn is_footnote(&self) -> bool {
        self.kind() == AnnotationKind::Footnote
    }

    /// Check if this is a comment
    pub fn is_comment(&self) -> bool {
        self.kind() == AnnotationKind::Comment
    }

    /// Check if this record is soft-deleted
    pub fn is_deleted(&self) -> bool {
        self.deleted
    }

    /// Creation order within the store
    pub fn created_seq(&self) -> u64 {
        self.created_seq
    }

    /// Display number, for footnotes that have been numbered
    pub fn number(&self) -> Option<u32> {
        match self.detail {
            AnnotationDetail::Footnote { number } => number,
            AnnotationDetail::Comment { .. } => None,
        }
    }

    /// Set the display number (footnotes only; no-op for comments)
    pub fn set_number(&mut self, value: u32) {
        if let AnnotationDetail::Footnote { number } = &mut self.detail {
            *number = Some(value);
        }
    }

    /// Comment author, if this is a comment
    pub fn author(&self) -> Option<&str> {
        match &self.detail {
            AnnotationDetail::Comment { author, .. } => Some(author),
            AnnotationDetail::Footnote { .. } => None,
        }
    }

    /// Check if this comment has been resolved
    pub fn is_resolved(&self) -> bool {
        matches!(self.detail, AnnotationDetail::Comment { resolved: true, .. })
    }

    /// Resolve this comment
    pub fn resolve(&mut self) {
        if let AnnotationDetail::Comment {
            resolved,
            resolved_at,
            ..
        } = &mut self.detail
        {
            *resolved = true;
            *resolved_at = Some(Utc::now());
            self.modified_at = Utc::now();
        }
    }

    /// Reopen this comment
    pub fn reopen(&mut self) {
        if let AnnotationDetail::Comment {
            resolved,
            resolved_at,
            ..
        } = &mut self.detail
        {
            *resolved = false;
            *resolved_at = None;
            self.modified_at = Utc::now();
        }
    }

    /// Replace the body text, bumping `modified_at`
    pub fn set_body(&mut self, body: impl Into<String>) {
        self.body = body.into();
        self.modified_at = Utc::now();
    }

    /// Bump `modified_at` after a direct field mutation
    pub fn touch(&mut self) {
        self.modified_at = Utc::now();
    }

    /// Soft-delete this record
    ///
    /// `deleted_at` and `modified_at` both reflect the soft-delete moment.
    /// The last-known number and position are retained for restore.
    pub fn mark_trashed(&mut self) {
        let now = Utc::now();
        self.deleted = true;
        self.deleted_at = Some(now);
        self.modified_at = now;
    }

    /// Bring this record back from the trash
    pub fn restore_from_trash(&mut self) {
        self.deleted = false;
        self.deleted_at = None;
        self.modified_at = Utc::now();
    }
}

// =============================================================================
// Tests
// =============================================================================
