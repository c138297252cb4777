//! Output types returned by the dispatcher.

use crate::error::ConvertError;
use serde::Serialize;
use std::fmt;

pub const MIME_PDF: &str = "application/pdf";
pub const MIME_DOCX: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
pub const MIME_PNG: &str = "image/png";
pub const MIME_ZIP: &str = "application/zip";

/// One downloadable blob produced by a conversion.
#[derive(Clone, PartialEq, Eq)]
pub struct OutputFile {
    pub filename: String,
    pub bytes: Vec<u8>,
    pub media_type: &'static str,
}

impl OutputFile {
    pub fn new(filename: impl Into<String>, bytes: Vec<u8>, media_type: &'static str) -> Self {
        Self {
            filename: filename.into(),
            bytes,
            media_type,
        }
    }

    /// Size in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Byte-free description, suitable for logs and JSON manifests.
    pub fn summary(&self) -> OutputSummary {
        OutputSummary {
            filename: self.filename.clone(),
            media_type: self.media_type.to_string(),
            size: self.bytes.len(),
        }
    }
}

impl fmt::Debug for OutputFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutputFile")
            .field("filename", &self.filename)
            .field("media_type", &self.media_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Metadata of an [`OutputFile`] without its bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputSummary {
    pub filename: String,
    pub media_type: String,
    pub size: usize,
}

/// Outcome of a single conversion attempt.
///
/// There is no partial success: either every output was produced, or none
/// is returned and `message` says why.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversionResult {
    Success { outputs: Vec<OutputFile> },
    Failure { message: String },
}

impl ConversionResult {
    pub fn is_success(&self) -> bool {
        matches!(self, ConversionResult::Success { .. })
    }

    /// Outputs on success, empty on failure.
    pub fn outputs(&self) -> &[OutputFile] {
        match self {
            ConversionResult::Success { outputs } => outputs,
            ConversionResult::Failure { .. } => &[],
        }
    }

    /// Failure message, if any.
    pub fn message(&self) -> Option<&str> {
        match self {
            ConversionResult::Success { .. } => None,
            ConversionResult::Failure { message } => Some(message),
        }
    }
}

impl From<Result<Vec<OutputFile>, ConvertError>> for ConversionResult {
    fn from(result: Result<Vec<OutputFile>, ConvertError>) -> Self {
        match result {
            Ok(outputs) => ConversionResult::Success { outputs },
            Err(e) => {
                let mut message = e.to_string();
                if message.trim().is_empty() {
                    message = format!("{e:?}");
                }
                ConversionResult::Failure { message }
            }
        }
    }
}
