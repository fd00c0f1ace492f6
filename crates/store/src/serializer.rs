//! Attributed-text serialization
//!
//! Encoding is lossless for character content and all attributes except
//! adaptive grays, which are deliberately elided: a valid archive never
//! carries a grayscale color. Decoding reattaches the adaptive label to
//! every range without an explicit color, and strips explicit grays found
//! in archives saved before the elision rule existed.

use crate::{ArchiveHeader, ArchivedMarker, ArchivedRun, DocumentArchive, Result, StoreError};
use rich_text::{
    AttributeRun, Color, InlineMarker, MarkerId, RichText, TextAttributes, TextColor, MARKER_CHAR,
};

/// Encode a rich text value into archive bytes
///
/// Fails with `EncodingFailed` when the content cannot be represented: a
/// marker attribute off its sentinel character, or a sentinel character
/// without a marker.
pub fn encode(text: &RichText) -> Result<Vec<u8>> {
    validate_markers(text)?;

    let runs: Vec<ArchivedRun> = text.runs().iter().map(archive_run).collect();
    let archive = DocumentArchive {
        header: ArchiveHeader::new(),
        text: text.plain_text().to_string(),
        runs,
    };

    serde_json::to_vec_pretty(&archive).map_err(|err| StoreError::EncodingFailed(err.to_string()))
}

/// Decode archive bytes back into a rich text value
///
/// When `expected_plain_text` is given, the decoded content must match it
/// exactly. The input bytes are never mutated; a failed decode leaves the
/// caller's data untouched.
pub fn decode(bytes: &[u8], expected_plain_text: Option<&str>) -> Result<RichText> {
    let archive: DocumentArchive = serde_json::from_slice(bytes)
        .map_err(|err| StoreError::DecodingFailed(err.to_string()))?;

    if !archive.header.is_valid() {
        return Err(StoreError::InvalidFormat(format!(
            "unrecognized magic or unsupported version {}",
            archive.header.version
        )));
    }

    let runs: Vec<AttributeRun> = archive
        .runs
        .iter()
        .map(restore_run)
        .collect::<Result<_>>()?;

    let text = RichText::from_parts(archive.text, runs)
        .map_err(|err| StoreError::DecodingFailed(err.to_string()))?;

    if let Some(expected) = expected_plain_text {
        if text.plain_text() != expected {
            return Err(StoreError::DecodingFailed(
                "decoded content does not match the expected plain text".to_string(),
            ));
        }
    }

    Ok(text)
}

fn archive_run(run: &AttributeRun) -> ArchivedRun {
    let attrs = &run.attributes;

    // The elision rule: adaptive labels write nothing, and a fixed gray is
    // treated as if it were the label. Grayscale never reaches the archive.
    let color = match attrs.color {
        TextColor::Adaptive => None,
        TextColor::Fixed(color) if color.is_adaptive_gray() => None,
        TextColor::Fixed(color) => Some(color.to_hex()),
    };

    ArchivedRun {
        start: run.range.start,
        end: run.range.end,
        bold: attrs.bold,
        italic: attrs.italic,
        underline: attrs.underline,
        strikethrough: attrs.strikethrough,
        color,
        paragraph: attrs.paragraph,
        marker: attrs.marker.map(|marker| ArchivedMarker {
            id: marker.id.to_string(),
            kind: marker.kind,
        }),
    }
}

fn restore_run(archived: &ArchivedRun) -> Result<AttributeRun> {
    let color = match &archived.color {
        None => TextColor::Adaptive,
        Some(hex) => {
            let parsed = Color::from_hex(hex).ok_or_else(|| {
                StoreError::DecodingFailed(format!("unparseable color value {hex:?}"))
            })?;
            // Legacy archives carry baked-in blacks and grays; classify and
            // strip them exactly as the strip-on-encode path would.
            TextColor::Fixed(parsed).normalized()
        }
    };

    let marker = match &archived.marker {
        None => None,
        Some(archived_marker) => {
            let id = MarkerId::from_string(&archived_marker.id).ok_or_else(|| {
                StoreError::DecodingFailed(format!(
                    "unparseable marker id {:?}",
                    archived_marker.id
                ))
            })?;
            Some(InlineMarker::with_id(id, archived_marker.kind))
        }
    };

    let attributes = TextAttributes {
        bold: archived.bold,
        italic: archived.italic,
        underline: archived.underline,
        strikethrough: archived.strikethrough,
        color,
        paragraph: archived.paragraph,
        marker,
    };

    Ok(AttributeRun::new(archived.start..archived.end, attributes))
}

fn validate_markers(text: &RichText) -> Result<()> {
    for run in text.runs() {
        if run.attributes.marker.is_some() {
            let is_sentinel = run.len() == 1
                && text.plain_text().chars().nth(run.range.start) == Some(MARKER_CHAR);
            if !is_sentinel {
                return Err(StoreError::EncodingFailed(format!(
                    "marker attribute at {}..{} is not on a sentinel character",
                    run.range.start, run.range.end
                )));
            }
        }
    }
    for (index, ch) in text.plain_text().chars().enumerate() {
        if ch == MARKER_CHAR && text.marker_at(index).is_none() {
            return Err(StoreError::EncodingFailed(format!(
                "sentinel character at {index} has no marker attribute"
            )));
        }
    }
    Ok(())
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ArchiveHeader, FORMAT_VERSION, LEGACY_COLOR_VERSION};
    use rich_text::{Alignment, AnnotationKind, ParagraphStyle};

    fn styled_sample() -> RichText {
        let mut text = RichText::with_text("The quick brown fox jumps over the lazy dog");
        text.set_attributes(0..3, |attrs| attrs.bold = true).unwrap();
        text.set_attributes(4..9, |attrs| attrs.italic = true).unwrap();
        text.set_attributes(10..15, |attrs| {
            attrs.underline = true;
            attrs.strikethrough = true;
        })
        .unwrap();
        text.set_attributes(16..19, |attrs| {
            attrs.color = TextColor::Fixed(Color::rgb(0.8, 0.2, 0.1))
        })
        .unwrap();
        text.set_attributes(20..25, |attrs| {
            attrs.paragraph = ParagraphStyle::aligned(Alignment::Center)
        })
        .unwrap();
        text
    }

    #[test]
    fn test_round_trip_preserves_text_and_attributes() {
        let original = styled_sample();

        let bytes = encode(&original).unwrap();
        let decoded = decode(&bytes, Some(original.plain_text())).unwrap();

        assert_eq!(decoded, original);
    }

    #[test]
    fn test_gray_colors_are_elided() {
        let mut text = RichText::with_text("black and gray");
        text.set_attributes(0..5, |attrs| attrs.color = TextColor::Fixed(Color::BLACK))
            .unwrap();
        text.set_attributes(6..9, |attrs| attrs.color = TextColor::Fixed(Color::gray(0.4)))
            .unwrap();

        let bytes = encode(&text).unwrap();
        let json = String::from_utf8(bytes.clone()).unwrap();
        assert!(!json.contains("\"color\""));

        // On decode the elided ranges come back as the adaptive label.
        let decoded = decode(&bytes, None).unwrap();
        assert!(decoded.attributes_at(0).unwrap().color.is_adaptive());
        assert!(decoded.attributes_at(6).unwrap().color.is_adaptive());
    }

    #[test]
    fn test_custom_colors_survive() {
        let plum = Color::rgb(0.56, 0.27, 0.68);
        let mut text = RichText::with_text("colorful");
        text.set_attributes(0..4, |attrs| attrs.color = TextColor::Fixed(plum))
            .unwrap();

        let decoded = decode(&encode(&text).unwrap(), None).unwrap();
        let restored = decoded.attributes_at(0).unwrap().color.fixed().unwrap();

        assert!((restored.red - plum.red).abs() <= rich_text::CHANNEL_EPSILON);
        assert!((restored.green - plum.green).abs() <= rich_text::CHANNEL_EPSILON);
        assert!((restored.blue - plum.blue).abs() <= rich_text::CHANNEL_EPSILON);
    }

    #[test]
    fn test_legacy_archive_with_baked_in_black_is_normalized() {
        let archive = DocumentArchive {
            header: ArchiveHeader {
                magic: ArchiveHeader::MAGIC.to_string(),
                version: LEGACY_COLOR_VERSION,
                created: "2019-06-01T00:00:00Z".to_string(),
                modified: "2019-06-01T00:00:00Z".to_string(),
            },
            text: "legacy body".to_string(),
            runs: vec![
                ArchivedRun {
                    start: 0,
                    end: 6,
                    bold: true,
                    italic: false,
                    underline: false,
                    strikethrough: false,
                    color: Some("#000000".to_string()),
                    paragraph: ParagraphStyle::default(),
                    marker: None,
                },
                ArchivedRun {
                    start: 6,
                    end: 11,
                    bold: false,
                    italic: false,
                    underline: false,
                    strikethrough: false,
                    color: Some("#666666".to_string()),
                    paragraph: ParagraphStyle::default(),
                    marker: None,
                },
            ],
        };
        let bytes = serde_json::to_vec(&archive).unwrap();

        let decoded = decode(&bytes, Some("legacy body")).unwrap();

        assert!(decoded.attributes_at(0).unwrap().color.is_adaptive());
        assert!(decoded.attributes_at(0).unwrap().bold);
        assert!(decoded.attributes_at(6).unwrap().color.is_adaptive());
    }

    #[test]
    fn test_markers_round_trip() {
        let mut text = RichText::with_text("noted text");
        let marker = InlineMarker::footnote();
        text.insert_marker(5, marker).unwrap();

        let decoded = decode(&encode(&text).unwrap(), None).unwrap();

        assert_eq!(decoded.marker_count(), 1);
        assert_eq!(decoded.find_marker(marker.id), Some(5));
        assert_eq!(
            decoded.marker_at(5).map(|m| m.kind),
            Some(AnnotationKind::Footnote)
        );
    }

    #[test]
    fn test_orphan_sentinel_fails_encoding() {
        // A sentinel character typed without a marker attribute cannot be
        // represented.
        let text = RichText::with_text(format!("bad {MARKER_CHAR} char"));
        let result = encode(&text);
        assert!(matches!(result, Err(StoreError::EncodingFailed(_))));
    }

    #[test]
    fn test_garbage_bytes_fail_decoding() {
        let result = decode(b"definitely not an archive", None);
        assert!(matches!(result, Err(StoreError::DecodingFailed(_))));
    }

    #[test]
    fn test_unknown_magic_fails_as_invalid_format() {
        let mut archive = DocumentArchive {
            header: ArchiveHeader::new(),
            text: String::new(),
            runs: Vec::new(),
        };
        archive.header.magic = "NOT-THIS".to_string();
        let bytes = serde_json::to_vec(&archive).unwrap();

        assert!(matches!(
            decode(&bytes, None),
            Err(StoreError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_future_version_fails_as_invalid_format() {
        let mut archive = DocumentArchive {
            header: ArchiveHeader::new(),
            text: String::new(),
            runs: Vec::new(),
        };
        archive.header.version = FORMAT_VERSION + 1;
        let bytes = serde_json::to_vec(&archive).unwrap();

        assert!(matches!(
            decode(&bytes, None),
            Err(StoreError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_plain_text_mismatch_fails_decoding() {
        let text = RichText::with_text("actual content");
        let bytes = encode(&text).unwrap();

        let result = decode(&bytes, Some("expected content"));
        assert!(matches!(result, Err(StoreError::DecodingFailed(_))));
    }

    #[test]
    fn test_malformed_runs_fail_decoding() {
        let archive = DocumentArchive {
            header: ArchiveHeader::new(),
            text: "abcdef".to_string(),
            runs: vec![ArchivedRun {
                start: 0,
                end: 3,
                bold: false,
                italic: false,
                underline: false,
                strikethrough: false,
                color: None,
                paragraph: ParagraphStyle::default(),
                marker: None,
            }],
        };
        let bytes = serde_json::to_vec(&archive).unwrap();

        assert!(matches!(
            decode(&bytes, None),
            Err(StoreError::DecodingFailed(_))
        ));
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        fn arb_color() -> impl Strategy<Value = TextColor> {
            prop_oneof![
                Just(TextColor::Adaptive),
                (0u8..=255, 0u8..=255, 0u8..=255).prop_map(|(r, g, b)| TextColor::Fixed(
                    Color::rgb(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0)
                )),
                (0u8..=255).prop_map(|v| TextColor::Fixed(Color::gray(v as f32 / 255.0))),
            ]
        }

        fn arb_attributes() -> impl Strategy<Value = TextAttributes> {
            (
                any::<bool>(),
                any::<bool>(),
                any::<bool>(),
                any::<bool>(),
                arb_color(),
            )
                .prop_map(|(bold, italic, underline, strikethrough, color)| TextAttributes {
                    bold,
                    italic,
                    underline,
                    strikethrough,
                    color,
                    ..Default::default()
                })
        }

        proptest! {
            #[test]
            fn round_trip_equals_stripped_original(
                segments in proptest::collection::vec(("[a-zA-Z ]{1,8}", arb_attributes()), 1..8)
            ) {
                let mut text = RichText::new();
                for (content, attributes) in &segments {
                    let at = text.len();
                    text.insert_attributed(at, content, *attributes).unwrap();
                }

                let decoded = decode(&encode(&text).unwrap(), Some(text.plain_text())).unwrap();

                let mut expected = text.clone();
                expected.strip_adaptive_colors();
                prop_assert_eq!(decoded, expected);
            }
        }
    }
}
