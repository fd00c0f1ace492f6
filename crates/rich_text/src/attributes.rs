//! Typed text attributes
//!
//! Formatting is a closed set of typed properties rather than an open
//! attribute dictionary: style flags, a text color, and paragraph layout.
//! Every character in a [`crate::RichText`] has a well-defined attribute
//! set, possibly the default one.

use crate::{Color, InlineMarker};
use serde::{Deserialize, Serialize};

// =============================================================================
// Text Color
// =============================================================================

/// Foreground color of a run
///
/// `Adaptive` is the semantic label meaning "use the platform's adaptive
/// foreground color" — it follows light/dark appearance and is what every
/// grayscale color normalizes to. Only `Fixed` colors with distinct channels
/// survive serialization.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum TextColor {
    /// The platform's adaptive foreground color
    Adaptive,
    /// An explicit fixed color
    Fixed(Color),
}

impl TextColor {
    /// Check if this is the adaptive label
    pub fn is_adaptive(&self) -> bool {
        matches!(self, TextColor::Adaptive)
    }

    /// Get the fixed color, if any
    pub fn fixed(&self) -> Option<Color> {
        match self {
            TextColor::Adaptive => None,
            TextColor::Fixed(color) => Some(*color),
        }
    }

    /// Collapse fixed grayscale colors to the adaptive label
    ///
    /// Idempotent: a color that already normalized stays put.
    pub fn normalized(self) -> Self {
        match self {
            TextColor::Fixed(color) if color.is_adaptive_gray() => TextColor::Adaptive,
            other => other,
        }
    }
}

impl Default for TextColor {
    fn default() -> Self {
        TextColor::Adaptive
    }
}

// =============================================================================
// Paragraph Style
// =============================================================================

/// Horizontal paragraph alignment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Alignment {
    Left,
    Center,
    Right,
    Justified,
}

impl Default for Alignment {
    fn default() -> Self {
        Alignment::Left
    }
}

/// Paragraph layout properties
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParagraphStyle {
    /// Horizontal alignment
    pub alignment: Alignment,
    /// Line spacing multiple (1.0 = single)
    pub line_spacing: f32,
    /// Space before the paragraph in points
    pub space_before: f32,
    /// Space after the paragraph in points
    pub space_after: f32,
    /// First-line indent in points
    pub first_line_indent: f32,
    /// Indent applied to every line in points
    pub head_indent: f32,
}

impl Default for ParagraphStyle {
    fn default() -> Self {
        Self {
            alignment: Alignment::Left,
            line_spacing: 1.0,
            space_before: 0.0,
            space_after: 0.0,
            first_line_indent: 0.0,
            head_indent: 0.0,
        }
    }
}

impl ParagraphStyle {
    /// Create a style with the given alignment and defaults elsewhere
    pub fn aligned(alignment: Alignment) -> Self {
        Self {
            alignment,
            ..Default::default()
        }
    }
}

// =============================================================================
// Text Attributes
// =============================================================================

/// The full attribute set for a run of text
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TextAttributes {
    /// Bold formatting
    pub bold: bool,
    /// Italic formatting
    pub italic: bool,
    /// Underline formatting
    pub underline: bool,
    /// Strikethrough formatting
    pub strikethrough: bool,
    /// Foreground color
    pub color: TextColor,
    /// Paragraph layout
    pub paragraph: ParagraphStyle,
    /// Inline annotation marker, present only on a marker character
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marker: Option<InlineMarker>,
}

impl TextAttributes {
    /// Create the default attribute set
    pub fn new() -> Self {
        Self::default()
    }

    /// Set bold
    pub fn with_bold(mut self, bold: bool) -> Self {
        self.bold = bold;
        self
    }

    /// Set italic
    pub fn with_italic(mut self, italic: bool) -> Self {
        self.italic = italic;
        self
    }

    /// Set underline
    pub fn with_underline(mut self, underline: bool) -> Self {
        self.underline = underline;
        self
    }

    /// Set strikethrough
    pub fn with_strikethrough(mut self, strikethrough: bool) -> Self {
        self.strikethrough = strikethrough;
        self
    }

    /// Set an explicit fixed color
    pub fn with_color(mut self, color: Color) -> Self {
        self.color = TextColor::Fixed(color);
        self
    }

    /// Set the paragraph style
    pub fn with_paragraph(mut self, paragraph: ParagraphStyle) -> Self {
        self.paragraph = paragraph;
        self
    }

    /// Return these attributes with any grayscale color collapsed to adaptive
    pub fn normalized(mut self) -> Self {
        self.color = self.color.normalized();
        self
    }

    /// Check if every property is at its default
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }

    /// These attributes as they would apply to newly typed text
    ///
    /// Markers belong to exactly one character and are never inherited.
    pub fn for_inheritance(mut self) -> Self {
        self.marker = None;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_color_is_adaptive() {
        let attrs = TextAttributes::default();
        assert!(attrs.color.is_adaptive());
        assert!(attrs.is_default());
    }

    #[test]
    fn test_normalize_gray_color() {
        let attrs = TextAttributes::new().with_color(Color::gray(0.3));
        let normalized = attrs.normalized();
        assert!(normalized.color.is_adaptive());
    }

    #[test]
    fn test_normalize_preserves_custom_color() {
        let teal = Color::rgb(0.0, 0.5, 0.5);
        let attrs = TextAttributes::new().with_color(teal);
        let normalized = attrs.normalized();
        assert_eq!(normalized.color.fixed(), Some(teal));
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let attrs = TextAttributes::new()
            .with_bold(true)
            .with_color(Color::BLACK);
        let once = attrs.normalized();
        let twice = once.normalized();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_inheritance_drops_marker() {
        let mut attrs = TextAttributes::new().with_italic(true);
        attrs.marker = Some(InlineMarker::footnote());

        let inherited = attrs.for_inheritance();
        assert!(inherited.marker.is_none());
        assert!(inherited.italic);
    }
}
