//! Attributed text value
//!
//! A [`RichText`] is a character sequence plus an ordered list of attribute
//! runs. The runs partition the full text length with no gaps and no
//! overlaps, so every character has a well-defined attribute set. All
//! positions and ranges are character offsets, not byte offsets.

use crate::{InlineMarker, MarkerId, RichTextError, Result, TextAttributes, MARKER_CHAR};
use serde::{Deserialize, Serialize};
use std::ops::Range;
use unicode_segmentation::UnicodeSegmentation;

// =============================================================================
// Attribute Run
// =============================================================================

/// A half-open character range with one attribute set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeRun {
    /// Character range covered by this run
    pub range: Range<usize>,
    /// Attributes applied to every character in the range
    pub attributes: TextAttributes,
}

impl AttributeRun {
    /// Create a new run
    pub fn new(range: Range<usize>, attributes: TextAttributes) -> Self {
        Self { range, attributes }
    }

    /// Number of characters covered
    pub fn len(&self) -> usize {
        self.range.end - self.range.start
    }

    /// Check if the run covers no characters
    pub fn is_empty(&self) -> bool {
        self.range.is_empty()
    }
}

// =============================================================================
// Rich Text
// =============================================================================

/// Character content plus partitioning attribute runs
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RichText {
    text: String,
    /// Character count, kept in step with `text`
    len: usize,
    runs: Vec<AttributeRun>,
}

impl RichText {
    /// Create an empty text
    pub fn new() -> Self {
        Self::default()
    }

    /// Create from plain text with default attributes throughout
    pub fn with_text(text: impl Into<String>) -> Self {
        Self::with_attributed_text(text, TextAttributes::default())
    }

    /// Create from plain text with one attribute set throughout
    pub fn with_attributed_text(text: impl Into<String>, attributes: TextAttributes) -> Self {
        let text = text.into();
        let len = text.chars().count();
        let runs = if len > 0 {
            vec![AttributeRun::new(0..len, attributes)]
        } else {
            Vec::new()
        };
        Self { text, len, runs }
    }

    /// Reassemble a text from content and runs, validating the partition
    ///
    /// The runs must be sorted, non-empty, contiguous from zero, and cover
    /// the whole character length.
    pub fn from_parts(text: String, runs: Vec<AttributeRun>) -> Result<Self> {
        let len = text.chars().count();

        let mut expected_start = 0;
        for run in &runs {
            if run.range.start != expected_start {
                return Err(RichTextError::MalformedRuns(format!(
                    "run starts at {} but {} was expected",
                    run.range.start, expected_start
                )));
            }
            if run.is_empty() {
                return Err(RichTextError::MalformedRuns(format!(
                    "empty run at {}",
                    run.range.start
                )));
            }
            expected_start = run.range.end;
        }
        if expected_start != len {
            return Err(RichTextError::MalformedRuns(format!(
                "runs cover {expected_start} of {len} characters"
            )));
        }

        let mut rich = Self { text, len, runs };
        rich.coalesce();
        Ok(rich)
    }

    // -------------------------------------------------------------------------
    // Inspection
    // -------------------------------------------------------------------------

    /// Character count
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if the text is empty
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The character content with all attributes dropped
    pub fn plain_text(&self) -> &str {
        &self.text
    }

    /// The attribute runs, sorted and gap-free
    pub fn runs(&self) -> &[AttributeRun] {
        &self.runs
    }

    /// Attributes of the character at `position`
    pub fn attributes_at(&self, position: usize) -> Option<&TextAttributes> {
        self.runs
            .iter()
            .find(|run| run.range.contains(&position))
            .map(|run| &run.attributes)
    }

    /// Number of grapheme clusters
    pub fn grapheme_count(&self) -> usize {
        self.text.graphemes(true).count()
    }

    /// Number of words
    pub fn word_count(&self) -> usize {
        self.text.unicode_words().count()
    }

    /// Find every occurrence of `needle`, as character ranges
    pub fn find(&self, needle: &str) -> Vec<Range<usize>> {
        if needle.is_empty() {
            return Vec::new();
        }
        let needle_len = needle.chars().count();
        self.text
            .match_indices(needle)
            .map(|(byte_index, _)| {
                let start = self.text[..byte_index].chars().count();
                start..start + needle_len
            })
            .collect()
    }

    // -------------------------------------------------------------------------
    // Editing
    // -------------------------------------------------------------------------

    /// Insert plain text, inheriting attributes from the preceding character
    pub fn insert(&mut self, position: usize, content: &str) -> Result<()> {
        let attributes = self.inherited_attributes(position);
        self.insert_attributed(position, content, attributes)
    }

    /// Insert text carrying an explicit attribute set
    pub fn insert_attributed(
        &mut self,
        position: usize,
        content: &str,
        attributes: TextAttributes,
    ) -> Result<()> {
        if position > self.len {
            return Err(RichTextError::PositionOutOfBounds {
                position,
                len: self.len,
            });
        }
        let added = content.chars().count();
        if added == 0 {
            return Ok(());
        }

        let byte_index = self.byte_index(position);
        self.text.insert_str(byte_index, content);

        self.split_run_at(position);
        let index = self
            .runs
            .partition_point(|run| run.range.start < position);
        for run in &mut self.runs[index..] {
            run.range.start += added;
            run.range.end += added;
        }
        self.runs
            .insert(index, AttributeRun::new(position..position + added, attributes));

        self.len += added;
        self.coalesce();
        Ok(())
    }

    /// Delete a character range
    pub fn delete(&mut self, range: Range<usize>) -> Result<()> {
        if range.start > range.end || range.end > self.len {
            return Err(RichTextError::RangeOutOfBounds {
                start: range.start,
                end: range.end,
                len: self.len,
            });
        }
        let removed = range.end - range.start;
        if removed == 0 {
            return Ok(());
        }

        let byte_range = self.byte_index(range.start)..self.byte_index(range.end);
        self.text.replace_range(byte_range, "");

        self.split_run_at(range.start);
        self.split_run_at(range.end);
        let first = self.runs.partition_point(|run| run.range.end <= range.start);
        let last = self.runs.partition_point(|run| run.range.start < range.end);
        self.runs.drain(first..last);
        for run in &mut self.runs[first..] {
            run.range.start -= removed;
            run.range.end -= removed;
        }

        self.len -= removed;
        self.coalesce();
        Ok(())
    }

    /// Apply a mutation to the attributes of every character in `range`
    ///
    /// Markers are pinned to their characters and survive the mutation
    /// untouched.
    pub fn set_attributes(
        &mut self,
        range: Range<usize>,
        mutate: impl Fn(&mut TextAttributes),
    ) -> Result<()> {
        if range.start > range.end || range.end > self.len {
            return Err(RichTextError::RangeOutOfBounds {
                start: range.start,
                end: range.end,
                len: self.len,
            });
        }
        if range.is_empty() {
            return Ok(());
        }

        self.split_run_at(range.start);
        self.split_run_at(range.end);
        for run in &mut self.runs {
            if run.range.start >= range.start && run.range.end <= range.end {
                let marker = run.attributes.marker;
                mutate(&mut run.attributes);
                run.attributes.marker = marker;
            }
        }
        self.coalesce();
        Ok(())
    }

    /// Replace every grayscale fixed color with the adaptive label
    ///
    /// Idempotent; text content and all other attributes are unchanged.
    pub fn strip_adaptive_colors(&mut self) {
        for run in &mut self.runs {
            run.attributes.color = run.attributes.color.normalized();
        }
        self.coalesce();
    }

    // -------------------------------------------------------------------------
    // Markers
    // -------------------------------------------------------------------------

    /// Insert a marker character at `position`
    ///
    /// Grows the text by exactly one character. The marker value rides as an
    /// attribute on the sentinel character.
    pub fn insert_marker(&mut self, position: usize, marker: InlineMarker) -> Result<()> {
        let mut attributes = self.inherited_attributes(position);
        attributes.marker = Some(marker);
        self.insert_attributed(position, &MARKER_CHAR.to_string(), attributes)
    }

    /// Remove the marker character carrying `id`, returning its position
    pub fn remove_marker(&mut self, id: MarkerId) -> Option<usize> {
        let position = self.find_marker(id)?;
        self.delete(position..position + 1).ok()?;
        Some(position)
    }

    /// Position of the marker carrying `id`
    pub fn find_marker(&self, id: MarkerId) -> Option<usize> {
        self.marker_runs()
            .find(|(_, marker)| marker.id == id)
            .map(|(position, _)| position)
    }

    /// The marker at `position`, if that character is a marker
    pub fn marker_at(&self, position: usize) -> Option<InlineMarker> {
        self.attributes_at(position).and_then(|attrs| attrs.marker)
    }

    /// All markers with their positions, in text order
    pub fn markers(&self) -> Vec<(usize, InlineMarker)> {
        self.marker_runs().collect()
    }

    /// Number of markers in the text
    pub fn marker_count(&self) -> usize {
        self.marker_runs().count()
    }

    fn marker_runs(&self) -> impl Iterator<Item = (usize, InlineMarker)> + '_ {
        self.runs.iter().filter_map(|run| {
            run.attributes
                .marker
                .map(|marker| (run.range.start, marker))
        })
    }

    // -------------------------------------------------------------------------
    // Internals
    // -------------------------------------------------------------------------

    /// Byte offset of the character at `position` (or the end of the text)
    fn byte_index(&self, position: usize) -> usize {
        self.text
            .char_indices()
            .nth(position)
            .map(|(index, _)| index)
            .unwrap_or(self.text.len())
    }

    /// Attributes newly typed text at `position` would take on
    fn inherited_attributes(&self, position: usize) -> TextAttributes {
        let source = if position > 0 {
            self.attributes_at(position - 1)
        } else {
            self.attributes_at(0)
        };
        source
            .copied()
            .unwrap_or_default()
            .for_inheritance()
    }

    /// Ensure a run boundary exists at `position`
    fn split_run_at(&mut self, position: usize) {
        if position == 0 || position >= self.len {
            return;
        }
        if let Some(index) = self.runs.iter().position(|run| {
            run.range.start < position && position < run.range.end
        }) {
            let tail_end = self.runs[index].range.end;
            let attributes = self.runs[index].attributes;
            self.runs[index].range.end = position;
            self.runs
                .insert(index + 1, AttributeRun::new(position..tail_end, attributes));
        }
    }

    /// Merge adjacent runs with equal attributes and drop empty runs
    fn coalesce(&mut self) {
        self.runs.retain(|run| !run.is_empty());

        let mut merged: Vec<AttributeRun> = Vec::with_capacity(self.runs.len());
        for run in self.runs.drain(..) {
            match merged.last_mut() {
                Some(last)
                    if last.range.end == run.range.start
                        && last.attributes == run.attributes =>
                {
                    last.range.end = run.range.end;
                }
                _ => merged.push(run),
            }
        }
        self.runs = merged;

        debug_assert!(self.partition_holds(), "runs must partition the text");
    }

    fn partition_holds(&self) -> bool {
        if self.len == 0 {
            return self.runs.is_empty();
        }
        let mut expected = 0;
        for run in &self.runs {
            if run.range.start != expected || run.is_empty() {
                return false;
            }
            expected = run.range.end;
        }
        expected == self.len
    }
}

// =============================================================================
// Tests
// =============================================================================
