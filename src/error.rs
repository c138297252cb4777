//! Error types for the edgequake-fileconv library.
//!
//! Every stage of every conversion returns `Result<_, ConvertError>`. The
//! dispatcher catches the error at the top of a single conversion attempt and
//! turns it into [`crate::output::ConversionResult::Failure`], carrying the
//! `Display` text of the variant. Variants stay fine-grained so library
//! callers using [`crate::convert::try_convert`] can still match on the cause.

use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the edgequake-fileconv library.
#[derive(Debug, Error)]
pub enum ConvertError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("Input file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// Reading the input file failed for another reason.
    #[error("Failed to read '{path}': {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The uploaded file contains no bytes.
    #[error("Input '{filename}' is empty")]
    EmptyInput { filename: String },

    /// A conversion kind string did not match any known kind.
    #[error("Unknown conversion kind '{value}'\nExpected one of: word-to-pdf, pdf-to-word, pdf-to-images, image-to-pdf")]
    UnknownKind { value: String },

    /// The input was handed to a PDF conversion but is not a PDF.
    #[error("File is not a valid PDF: '{filename}'\nFirst bytes: {magic:?}")]
    NotAPdf { filename: String, magic: Vec<u8> },

    // ── Document errors ───────────────────────────────────────────────────
    /// The Word document container or its XML body could not be read.
    #[error("'{filename}' is not a readable Word document: {detail}")]
    InvalidDocx { filename: String, detail: String },

    /// PDF header/trailer/xref is corrupt and cannot be parsed.
    #[error("PDF '{filename}' is corrupt: {detail}")]
    CorruptPdf { filename: String, detail: String },

    /// PDF requires a password but none was provided.
    #[error("PDF '{filename}' is encrypted and requires a password.\nProvide it with --password <PASSWORD>.")]
    PasswordRequired { filename: String },

    /// Text extraction does not decrypt documents.
    #[error("PDF '{filename}' is encrypted; text cannot be extracted from encrypted PDFs")]
    EncryptedPdf { filename: String },

    /// A password was provided but it is wrong.
    #[error("Wrong password for PDF '{filename}'")]
    WrongPassword { filename: String },

    /// The page selection matched none of the document's pages.
    #[error("No pages selected (document has {total} pages)")]
    NoPagesSelected { total: usize },

    /// Text could not be extracted from a page.
    #[error("Text extraction failed for page {page}: {detail}")]
    TextExtractionFailed { page: usize, detail: String },

    /// pdfium-render returned an error for a specific page.
    #[error("Rasterisation failed for page {page}: {detail}")]
    RasterisationFailed { page: usize, detail: String },

    /// The source image could not be decoded.
    #[error("Cannot decode image '{filename}': {detail}")]
    ImageDecodeFailed { filename: String, detail: String },

    /// A rendered page could not be encoded as PNG.
    #[error("PNG encoding failed for page {page}: {detail}")]
    ImageEncodeFailed { page: usize, detail: String },

    /// Building an output container (zip bundle, docx package) failed.
    #[error("Failed to build archive '{name}': {detail}")]
    ArchiveFailed { name: String, detail: String },

    // ── Environment errors ────────────────────────────────────────────────
    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
PDF → image conversion needs the PDFium shared library. You can:\n\
  • Set PDFIUM_LIB_PATH=/path/to/libpdfium (file or directory).\n\
  • Pass --pdfium-lib /path/to/libpdfium on the command line.\n\
  • Install libpdfium system-wide or place it in the working directory.\n"
    )]
    PdfiumBindingFailed(String),

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write an output file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The conversion exceeded the configured boundary timeout.
    #[error("Conversion timed out after {secs}s")]
    Timeout { secs: u64 },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}
