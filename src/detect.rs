//! Input detection: zipped card or bare text entry.

use crate::error::Result;
use std::io::Read;
use std::path::Path;

/// Magic bytes of a ZIP local file header
const ZIP_MAGIC: [u8; 4] = [0x50, 0x4B, 0x03, 0x04];

/// Magic bytes of an empty ZIP archive (end of central directory only)
const ZIP_EMPTY_MAGIC: [u8; 4] = [0x50, 0x4B, 0x05, 0x06];

/// Kinds of input accepted by the tooling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatType {
    /// ZIP archive holding `.txt` entries
    Zip,
    /// A single Shift_JIS text file
    Text,
}

impl std::fmt::Display for FormatType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FormatType::Zip => write!(f, "ZIP archive"),
            FormatType::Text => write!(f, "plain text"),
        }
    }
}

/// Detect input format from a file path.
pub fn detect_format_from_path(path: impl AsRef<Path>) -> Result<FormatType> {
    let mut file = std::fs::File::open(path)?;
    let mut buffer = [0u8; 4];
    let bytes_read = file.read(&mut buffer)?;
    Ok(detect_format_from_bytes(&buffer[..bytes_read]))
}

/// Detect input format from the leading bytes.
///
/// Text has no signature, so anything that is not a ZIP is treated as text.
pub fn detect_format_from_bytes(data: &[u8]) -> FormatType {
    if data.starts_with(&ZIP_MAGIC) || data.starts_with(&ZIP_EMPTY_MAGIC) {
        FormatType::Zip
    } else {
        FormatType::Text
    }
}
