// Copyright 2024, Blog Creator Contributors
// For licensing, see licenses/COPYRIGHT.md

use eyre::Result;

/// Decodes hex text, with or without a leading `0x`. Surrounding whitespace is ignored
/// so keys can be read straight from files.
pub fn decode0x<T: AsRef<str>>(text: T) -> Result<Vec<u8>> {
    let text = text.as_ref().trim();
    let text = text.strip_prefix("0x").unwrap_or(text);
    Ok(hex::decode(text)?)
}
