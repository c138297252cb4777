//! Input checks run before any codec sees the bytes.
//!
//! Parsers report an empty or mislabelled upload with messages about xref
//! tables or zip central directories. Checking the two cheap cases up front
//! turns them into errors that name the actual problem.

use crate::error::ConvertError;
use tracing::debug;

/// PDF readers accept the header anywhere in the first kilobyte.
const PDF_HEADER_WINDOW: usize = 1024;

/// Reject zero-length input.
pub fn ensure_non_empty(bytes: &[u8], filename: &str) -> Result<(), ConvertError> {
    if bytes.is_empty() {
        return Err(ConvertError::EmptyInput {
            filename: filename.to_string(),
        });
    }
    Ok(())
}

/// Verify the `%PDF` magic appears within the header window.
pub fn ensure_pdf(bytes: &[u8], filename: &str) -> Result<(), ConvertError> {
    let window = &bytes[..bytes.len().min(PDF_HEADER_WINDOW)];
    if window.windows(4).any(|w| w == b"%PDF") {
        debug!("'{}' has a PDF header", filename);
        return Ok(());
    }
    Err(ConvertError::NotAPdf {
        filename: filename.to_string(),
        magic: bytes.iter().take(4).copied().collect(),
    })
}
