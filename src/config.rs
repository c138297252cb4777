//! Configuration types for file conversion.
//!
//! Every tunable of every conversion kind lives in [`ConversionConfig`],
//! built via its [`ConversionConfigBuilder`]. Fields that do not apply to the
//! requested kind are ignored, so one config can be shared across a batch of
//! mixed conversions.

use crate::error::ConvertError;
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Configuration for a conversion.
///
/// # Example
/// ```rust
/// use edgequake_fileconv::{ConversionConfig, PageSelection};
///
/// let config = ConversionConfig::builder()
///     .dpi(150)
///     .pages(PageSelection::Range(1, 3))
///     .bundle_images(true)
///     .build()
///     .unwrap();
/// assert_eq!(config.dpi, 150);
/// ```
#[derive(Clone)]
pub struct ConversionConfig {
    /// Rasterisation DPI for PDF → images. Range: 72–600. Default: 200.
    pub dpi: u32,

    /// Upper bound on rendered width and height in pixels. Default: 10 000.
    ///
    /// Guards against very large page boxes at high DPI; the page is scaled
    /// down proportionally when either edge would exceed it.
    pub max_rendered_pixels: u32,

    /// Pages converted by PDF → images and PDF → Word. Default: all.
    pub pages: PageSelection,

    /// Package PDF → images output as a single `pdf_images.zip`. Default: false.
    pub bundle_images: bool,

    /// Word → PDF text size in points. Range: 4–72. Default: 12.
    pub font_size: f32,

    /// Word → PDF leading as a multiple of `font_size`. Default: 1.2.
    pub line_spacing: f32,

    /// Image → PDF resolution: pixels per inch of the output page. Default: 72,
    /// so one pixel maps to one point.
    pub image_dpi: u32,

    /// PDF user password for encrypted documents.
    pub password: Option<String>,

    /// Explicit PDFium library file or directory. Falls back to
    /// `PDFIUM_LIB_PATH`, then the system library search path.
    pub pdfium_lib_path: Option<PathBuf>,

    /// Boundary timeout for [`crate::convert::convert_async`]. Default: none.
    pub timeout_secs: Option<u64>,

    /// Optional per-page progress events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            dpi: 200,
            max_rendered_pixels: 10_000,
            pages: PageSelection::default(),
            bundle_images: false,
            font_size: 12.0,
            line_spacing: 1.2,
            image_dpi: 72,
            password: None,
            pdfium_lib_path: None,
            timeout_secs: None,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ConversionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionConfig")
            .field("dpi", &self.dpi)
            .field("max_rendered_pixels", &self.max_rendered_pixels)
            .field("pages", &self.pages)
            .field("bundle_images", &self.bundle_images)
            .field("font_size", &self.font_size)
            .field("line_spacing", &self.line_spacing)
            .field("image_dpi", &self.image_dpi)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("pdfium_lib_path", &self.pdfium_lib_path)
            .field("timeout_secs", &self.timeout_secs)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn ConversionProgressCallback>"),
            )
            .finish()
    }
}

impl ConversionConfig {
    /// Create a new builder for `ConversionConfig`.
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ConversionConfig`].
#[derive(Debug)]
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
}

impl ConversionConfigBuilder {
    pub fn dpi(mut self, dpi: u32) -> Self {
        self.config.dpi = dpi.clamp(72, 600);
        self
    }

    pub fn max_rendered_pixels(mut self, px: u32) -> Self {
        self.config.max_rendered_pixels = px.max(100);
        self
    }

    pub fn pages(mut self, selection: PageSelection) -> Self {
        self.config.pages = selection;
        self
    }

    pub fn bundle_images(mut self, v: bool) -> Self {
        self.config.bundle_images = v;
        self
    }

    pub fn font_size(mut self, pt: f32) -> Self {
        self.config.font_size = pt.clamp(4.0, 72.0);
        self
    }

    pub fn line_spacing(mut self, factor: f32) -> Self {
        self.config.line_spacing = factor;
        self
    }

    pub fn image_dpi(mut self, dpi: u32) -> Self {
        self.config.image_dpi = dpi;
        self
    }

    pub fn password(mut self, pwd: impl Into<String>) -> Self {
        self.config.password = Some(pwd.into());
        self
    }

    pub fn pdfium_lib_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.pdfium_lib_path = Some(path.into());
        self
    }

    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.config.timeout_secs = Some(secs);
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ConversionConfig, ConvertError> {
        let c = &self.config;
        if c.dpi < 72 || c.dpi > 600 {
            return Err(ConvertError::InvalidConfig(format!(
                "DPI must be 72–600, got {}",
                c.dpi
            )));
        }
        // Range checks also reject NaN, which `clamp` passes through.
        if !(4.0..=72.0).contains(&c.font_size) {
            return Err(ConvertError::InvalidConfig(format!(
                "Font size must be 4–72 pt, got {}",
                c.font_size
            )));
        }
        if !(0.5..=4.0).contains(&c.line_spacing) {
            return Err(ConvertError::InvalidConfig(format!(
                "Line spacing must be 0.5–4.0, got {}",
                c.line_spacing
            )));
        }
        if c.image_dpi == 0 {
            return Err(ConvertError::InvalidConfig(
                "Image DPI must be ≥ 1".into(),
            ));
        }
        if c.timeout_secs == Some(0) {
            return Err(ConvertError::InvalidConfig(
                "Timeout must be ≥ 1 second".into(),
            ));
        }
        if let PageSelection::Range(start, end) = c.pages {
            if start == 0 || start > end {
                return Err(ConvertError::InvalidConfig(format!(
                    "Invalid page range {start}-{end}: pages are 1-indexed and start must be <= end"
                )));
            }
        }
        Ok(self.config)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// Specifies which pages of a PDF to convert.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PageSelection {
    /// Convert all pages (default).
    #[default]
    All,
    /// Convert a single page (1-indexed).
    Single(usize),
    /// Convert a contiguous range of pages (1-indexed, inclusive).
    Range(usize, usize),
    /// Convert specific pages (1-indexed, deduplicated).
    Set(Vec<usize>),
}

impl PageSelection {
    /// Expand the selection into a sorted, deduplicated list of 0-indexed page numbers.
    ///
    /// Pages past `total_pages` are dropped silently.
    pub fn to_indices(&self, total_pages: usize) -> Vec<usize> {
        let mut indices: Vec<usize> = match self {
            PageSelection::All => (0..total_pages).collect(),
            PageSelection::Single(p) if (1..=total_pages).contains(p) => vec![p - 1],
            PageSelection::Single(_) => Vec::new(),
            PageSelection::Range(start, end) => {
                let s = (*start).max(1) - 1;
                let e = (*end).min(total_pages);
                (s..e).collect()
            }
            PageSelection::Set(pages) => pages
                .iter()
                .filter(|p| (1..=total_pages).contains(*p))
                .map(|p| p - 1)
                .collect(),
        };
        indices.sort_unstable();
        indices.dedup();
        indices
    }

    /// Like [`Self::to_indices`] but an empty result is an error.
    pub fn resolve(&self, total_pages: usize) -> Result<Vec<usize>, ConvertError> {
        let indices = self.to_indices(total_pages);
        if indices.is_empty() {
            return Err(ConvertError::NoPagesSelected { total: total_pages });
        }
        Ok(indices)
    }
}

impl std::str::FromStr for PageSelection {
    type Err = ConvertError;

    /// Parse `all`, `5`, `3-15` or `1,3,5`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_lowercase();
        let invalid = |detail: String| ConvertError::InvalidConfig(detail);
        let page = |p: &str| -> Result<usize, ConvertError> {
            let n: usize = p
                .trim()
                .parse()
                .map_err(|_| invalid(format!("Invalid page number: '{}'", p.trim())))?;
            if n < 1 {
                return Err(invalid(format!("Pages are 1-indexed, minimum is 1 (got {n})")));
            }
            Ok(n)
        };

        if s == "all" {
            return Ok(PageSelection::All);
        }
        if let Some((start, end)) = s.split_once('-') {
            let (start, end) = (page(start)?, page(end)?);
            if start > end {
                return Err(invalid(format!(
                    "Invalid page range '{start}-{end}': start must be <= end"
                )));
            }
            return Ok(PageSelection::Range(start, end));
        }
        if s.contains(',') {
            let pages = s.split(',').map(|p| page(p)).collect::<Result<Vec<_>, _>>()?;
            return Ok(PageSelection::Set(pages));
        }
        Ok(PageSelection::Single(page(s.as_str())?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let c = ConversionConfig::default();
        assert_eq!(c.dpi, 200);
        assert_eq!(c.font_size, 12.0);
        assert_eq!(c.image_dpi, 72);
        assert!(!c.bundle_images);
        assert_eq!(c.pages, PageSelection::All);
    }

    #[test]
    fn builder_clamps_dpi_and_font() {
        let c = ConversionConfig::builder()
            .dpi(5000)
            .font_size(1.0)
            .build()
            .unwrap();
        assert_eq!(c.dpi, 600);
        assert_eq!(c.font_size, 4.0);
    }

    #[test]
    fn builder_rejects_bad_values() {
        assert!(ConversionConfig::builder().line_spacing(10.0).build().is_err());
        assert!(ConversionConfig::builder().image_dpi(0).build().is_err());
        assert!(ConversionConfig::builder().timeout_secs(0).build().is_err());
        assert!(ConversionConfig::builder()
            .pages(PageSelection::Range(4, 2))
            .build()
            .is_err());
    }

    #[test]
    fn builder_rejects_non_finite_font_metrics() {
        let err = ConversionConfig::builder()
            .font_size(f32::NAN)
            .build()
            .unwrap_err();
        assert!(matches!(err, ConvertError::InvalidConfig(_)));
        assert!(err.to_string().contains("Font size"));
        assert!(ConversionConfig::builder().font_size(f32::INFINITY).build().is_ok());
        assert!(ConversionConfig::builder()
            .line_spacing(f32::NAN)
            .build()
            .is_err());
    }

    #[test]
    fn debug_redacts_password() {
        let c = ConversionConfig::builder().password("hunter2").build().unwrap();
        let dbg = format!("{c:?}");
        assert!(!dbg.contains("hunter2"));
        assert!(dbg.contains("redacted"));
    }

    #[test]
    fn page_selection_to_indices() {
        assert_eq!(PageSelection::All.to_indices(3), vec![0, 1, 2]);
        assert_eq!(PageSelection::Single(3).to_indices(5), vec![2]);
        assert_eq!(PageSelection::Single(6).to_indices(5), Vec::<usize>::new());
        assert_eq!(PageSelection::Range(3, 10).to_indices(4), vec![2, 3]);
        assert_eq!(PageSelection::Set(vec![3, 1, 3, 9]).to_indices(5), vec![0, 2]);
    }

    #[test]
    fn resolve_rejects_empty_selection() {
        let err = PageSelection::Single(9).resolve(2).unwrap_err();
        assert!(matches!(err, ConvertError::NoPagesSelected { total: 2 }));
    }

    #[test]
    fn page_selection_parses_cli_forms() {
        assert_eq!("all".parse::<PageSelection>().unwrap(), PageSelection::All);
        assert_eq!("5".parse::<PageSelection>().unwrap(), PageSelection::Single(5));
        assert_eq!(
            "3-15".parse::<PageSelection>().unwrap(),
            PageSelection::Range(3, 15)
        );
        assert_eq!(
            "1, 3,5".parse::<PageSelection>().unwrap(),
            PageSelection::Set(vec![1, 3, 5])
        );
        assert!("0".parse::<PageSelection>().is_err());
        assert!("7-2".parse::<PageSelection>().is_err());
        assert!("x".parse::<PageSelection>().is_err());
    }
}
