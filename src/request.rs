//! Request types: what to convert and how to interpret it.
//!
//! A [`ConversionRequest`] is an immutable value built once per conversion.
//! It replaces the upload-widget/dropdown session state of an interactive
//! form: the caller constructs the request, hands it to
//! [`crate::convert::convert`], and receives a
//! [`crate::output::ConversionResult`] back.

use crate::error::ConvertError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::debug;

/// Label of the "nothing selected yet" entry in the conversion menu.
pub const UNSELECTED_LABEL: &str = "Select";

/// The four supported conversions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConversionKind {
    /// `.docx` → `converted.pdf` (plain paragraph text).
    WordToPdf,
    /// `.pdf` → `converted.docx` (one paragraph per page).
    PdfToWord,
    /// `.pdf` → `page_N.png` per page, optionally zipped.
    PdfToImages,
    /// `.jpg`/`.png` → single-page `converted.pdf`.
    ImageToPdf,
}

impl ConversionKind {
    /// All kinds in menu order.
    pub const ALL: [ConversionKind; 4] = [
        ConversionKind::WordToPdf,
        ConversionKind::PdfToWord,
        ConversionKind::PdfToImages,
        ConversionKind::ImageToPdf,
    ];

    /// Stable identifier used on the command line and in JSON.
    pub fn id(self) -> &'static str {
        match self {
            ConversionKind::WordToPdf => "word-to-pdf",
            ConversionKind::PdfToWord => "pdf-to-word",
            ConversionKind::PdfToImages => "pdf-to-images",
            ConversionKind::ImageToPdf => "image-to-pdf",
        }
    }

    /// Human-facing menu label.
    pub fn label(self) -> &'static str {
        match self {
            ConversionKind::WordToPdf => "Word ➜ PDF",
            ConversionKind::PdfToWord => "PDF ➜ Word",
            ConversionKind::PdfToImages => "PDF ➜ Image",
            ConversionKind::ImageToPdf => "Image ➜ PDF",
        }
    }

    /// Source file extensions offered for upload with this kind (lowercase, no dot).
    pub fn accepted_extensions(self) -> &'static [&'static str] {
        match self {
            ConversionKind::WordToPdf => &["docx"],
            ConversionKind::PdfToWord | ConversionKind::PdfToImages => &["pdf"],
            ConversionKind::ImageToPdf => &["jpg", "jpeg", "png"],
        }
    }

    /// True when `filename` carries one of [`Self::accepted_extensions`].
    pub fn accepts_filename(self, filename: &str) -> bool {
        Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .map(|ext| {
                let ext = ext.to_ascii_lowercase();
                self.accepted_extensions().iter().any(|a| *a == ext)
            })
            .unwrap_or(false)
    }

    /// Whether the source of this kind is a PDF document.
    pub fn reads_pdf(self) -> bool {
        matches!(self, ConversionKind::PdfToWord | ConversionKind::PdfToImages)
    }

    /// Parse a menu selection: an id or a label, case-insensitive.
    ///
    /// The unselected sentinel (`"Select"`) and the empty string mean no
    /// conversion has been chosen yet and yield `Ok(None)`.
    pub fn from_selection(selection: &str) -> Result<Option<Self>, ConvertError> {
        let s = selection.trim();
        if s.is_empty() || s.eq_ignore_ascii_case(UNSELECTED_LABEL) {
            return Ok(None);
        }
        s.parse().map(Some)
    }
}

impl fmt::Display for ConversionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for ConversionKind {
    type Err = ConvertError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        ConversionKind::ALL
            .into_iter()
            .find(|k| {
                k.id().eq_ignore_ascii_case(needle) || k.label().eq_ignore_ascii_case(needle)
            })
            .ok_or_else(|| ConvertError::UnknownKind {
                value: needle.to_string(),
            })
    }
}

/// One file to convert, with the conversion to apply.
#[derive(Clone, PartialEq, Eq)]
pub struct ConversionRequest {
    source_bytes: Vec<u8>,
    source_filename: String,
    kind: ConversionKind,
}

impl ConversionRequest {
    pub fn new(
        source_bytes: impl Into<Vec<u8>>,
        source_filename: impl Into<String>,
        kind: ConversionKind,
    ) -> Self {
        Self {
            source_bytes: source_bytes.into(),
            source_filename: source_filename.into(),
            kind,
        }
    }

    /// Read a local file into a request.
    ///
    /// The filename is the last path component; the path itself is not
    /// retained.
    pub fn from_path(path: impl AsRef<Path>, kind: ConversionKind) -> Result<Self, ConvertError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|e| read_error(path, e))?;
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        debug!("Read {} bytes from {}", bytes.len(), path.display());
        Ok(Self::new(bytes, filename, kind))
    }

    pub fn source_bytes(&self) -> &[u8] {
        &self.source_bytes
    }

    pub fn source_filename(&self) -> &str {
        &self.source_filename
    }

    pub fn kind(&self) -> ConversionKind {
        self.kind
    }
}

impl fmt::Debug for ConversionRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionRequest")
            .field("source_filename", &self.source_filename)
            .field("source_len", &self.source_bytes.len())
            .field("kind", &self.kind)
            .finish()
    }
}

fn read_error(path: &Path, e: std::io::Error) -> ConvertError {
    let path: PathBuf = path.to_path_buf();
    match e.kind() {
        std::io::ErrorKind::NotFound => ConvertError::FileNotFound { path },
        std::io::ErrorKind::PermissionDenied => ConvertError::PermissionDenied { path },
        _ => ConvertError::ReadFailed { path, source: e },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_ids_and_labels() {
        assert_eq!(
            "pdf-to-images".parse::<ConversionKind>().unwrap(),
            ConversionKind::PdfToImages
        );
        assert_eq!(
            "Word ➜ PDF".parse::<ConversionKind>().unwrap(),
            ConversionKind::WordToPdf
        );
        assert_eq!(
            " IMAGE-TO-PDF ".parse::<ConversionKind>().unwrap(),
            ConversionKind::ImageToPdf
        );
        assert!("pdf-to-excel".parse::<ConversionKind>().is_err());
    }

    #[test]
    fn sentinel_means_unselected() {
        assert_eq!(ConversionKind::from_selection("Select").unwrap(), None);
        assert_eq!(ConversionKind::from_selection("").unwrap(), None);
        assert_eq!(
            ConversionKind::from_selection("PDF ➜ Word").unwrap(),
            Some(ConversionKind::PdfToWord)
        );
        assert!(ConversionKind::from_selection("Excel ➜ PDF").is_err());
    }

    #[test]
    fn id_round_trips_through_display() {
        for kind in ConversionKind::ALL {
            assert_eq!(kind.to_string().parse::<ConversionKind>().unwrap(), kind);
        }
    }

    #[test]
    fn accepted_extensions_are_case_insensitive() {
        assert!(ConversionKind::ImageToPdf.accepts_filename("photo.JPG"));
        assert!(ConversionKind::WordToPdf.accepts_filename("report.docx"));
        assert!(!ConversionKind::WordToPdf.accepts_filename("report.doc"));
        assert!(!ConversionKind::PdfToWord.accepts_filename("README"));
    }

    #[test]
    fn serde_uses_kebab_case_ids() {
        let json = serde_json::to_string(&ConversionKind::PdfToWord).unwrap();
        assert_eq!(json, "\"pdf-to-word\"");
    }

    #[test]
    fn from_path_reports_missing_file() {
        let err = ConversionRequest::from_path(
            "/definitely/not/a/real/file.pdf",
            ConversionKind::PdfToWord,
        )
        .unwrap_err();
        assert!(matches!(err, ConvertError::FileNotFound { .. }));
    }

    #[test]
    fn from_path_keeps_file_name_only() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scan.png");
        std::fs::write(&path, b"\x89PNG").unwrap();
        let req = ConversionRequest::from_path(&path, ConversionKind::ImageToPdf).unwrap();
        assert_eq!(req.source_filename(), "scan.png");
        assert_eq!(req.source_bytes(), b"\x89PNG");
    }
}
