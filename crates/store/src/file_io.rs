//! File operations for document archives

use crate::{decode, encode, Result};
use rich_text::RichText;
use std::fs;
use std::path::Path;

/// Encode a document and write it to disk
pub fn save_document(path: impl AsRef<Path>, text: &RichText) -> Result<()> {
    let path = path.as_ref();
    let bytes = encode(text)?;
    fs::write(path, bytes)?;
    tracing::debug!(path = %path.display(), "saved document archive");
    Ok(())
}

/// Read a document archive from disk and decode it
///
/// The file is left untouched whether or not decoding succeeds.
pub fn load_document(path: impl AsRef<Path>, expected_plain_text: Option<&str>) -> Result<RichText> {
    let path = path.as_ref();
    let bytes = fs::read(path)?;
    match decode(&bytes, expected_plain_text) {
        Ok(text) => {
            tracing::debug!(path = %path.display(), chars = text.len(), "loaded document archive");
            Ok(text)
        }
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "failed to decode document archive");
            Err(err)
        }
    }
}
