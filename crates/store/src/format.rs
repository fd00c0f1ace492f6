//! Archive format specification
//!
//! The archive is a JSON container: a header for format identification plus
//! the plain text and its attribute runs. Grayscale colors are never written
//! to a valid archive — a run without an explicit color takes the platform's
//! adaptive foreground on load.

use chrono::Utc;
use rich_text::{AnnotationKind, ParagraphStyle};
use serde::{Deserialize, Serialize};

/// Current archive format version
pub const FORMAT_VERSION: u32 = 2;

/// Last version that still wrote explicit grayscale colors; archives at this
/// version are normalized on decode
pub const LEGACY_COLOR_VERSION: u32 = 1;

/// File extension for the archive format
pub const FILE_EXTENSION: &str = "wsd";

/// Archive header for format identification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchiveHeader {
    /// Magic string for format identification
    pub magic: String,
    /// Format version
    pub version: u32,
    /// Creation timestamp (ISO 8601)
    pub created: String,
    /// Last modified timestamp (ISO 8601)
    pub modified: String,
}

impl ArchiveHeader {
    pub const MAGIC: &'static str = "WSHED-TEXT";

    pub fn new() -> Self {
        let now = Utc::now().to_rfc3339();
        Self {
            magic: Self::MAGIC.to_string(),
            version: FORMAT_VERSION,
            created: now.clone(),
            modified: now,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.magic == Self::MAGIC && self.version >= 1 && self.version <= FORMAT_VERSION
    }
}

impl Default for ArchiveHeader {
    fn default() -> Self {
        Self::new()
    }
}

/// One serialized attribute run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchivedRun {
    /// Start of the half-open character range
    pub start: usize,
    /// End of the half-open character range
    pub end: usize,
    #[serde(default, skip_serializing_if = "is_false")]
    pub bold: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub italic: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub underline: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub strikethrough: bool,
    /// Explicit foreground color as a CSS hex string
    ///
    /// Absent for the adaptive foreground; grayscale values only appear in
    /// legacy archives and are stripped on decode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "is_default_paragraph")]
    pub paragraph: ParagraphStyle,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marker: Option<ArchivedMarker>,
}

/// Serialized form of an inline annotation marker
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchivedMarker {
    /// Marker identity as a UUID string
    pub id: String,
    /// Kind of annotation anchored by the marker
    pub kind: AnnotationKind,
}

/// Complete archive
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentArchive {
    pub header: ArchiveHeader,
    /// The plain character content, marker sentinels included
    pub text: String,
    /// Attribute runs partitioning the text
    pub runs: Vec<ArchivedRun>,
}

fn is_false(value: &bool) -> bool {
    !*value
}

fn is_default_paragraph(style: &ParagraphStyle) -> bool {
    *style == ParagraphStyle::default()
}
