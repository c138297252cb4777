//! PDF rasterisation: render pages to `DynamicImage` via pdfium.
//!
//! Pages are rendered one at a time and handed back to the caller, which
//! encodes each to PNG before asking for the next. At most one full-size
//! bitmap is alive at once.
//!
//! ## Why cap pixels as well as DPI?
//!
//! Page sizes vary wildly: an A0 poster at 200 DPI would produce a
//! 6,600 × 9,400 px image. `max_rendered_pixels` caps the longest edge
//! regardless of physical size, keeping memory bounded.

use crate::error::ConvertError;
use image::DynamicImage;
use pdfium_render::prelude::*;
use tracing::{debug, info};

/// PDF user space is 72 units per inch.
const POINTS_PER_INCH: f32 = 72.0;

/// An opened PDF document ready for page rendering.
pub struct PdfRaster<'a> {
    document: PdfDocument<'a>,
    filename: String,
}

impl<'a> PdfRaster<'a> {
    /// Load `bytes` with the given pdfium instance.
    pub fn open(
        pdfium: &'a Pdfium,
        bytes: &'a [u8],
        password: Option<&'a str>,
        filename: &str,
    ) -> Result<Self, ConvertError> {
        let document = pdfium
            .load_pdf_from_byte_slice(bytes, password)
            .map_err(|e| {
                let err_str = format!("{:?}", e);
                if err_str.contains("Password") || err_str.contains("password") {
                    if password.is_some() {
                        ConvertError::WrongPassword {
                            filename: filename.to_string(),
                        }
                    } else {
                        ConvertError::PasswordRequired {
                            filename: filename.to_string(),
                        }
                    }
                } else {
                    ConvertError::CorruptPdf {
                        filename: filename.to_string(),
                        detail: err_str,
                    }
                }
            })?;

        info!("PDF loaded for rendering: {} pages", document.pages().len());
        Ok(Self {
            document,
            filename: filename.to_string(),
        })
    }

    pub fn page_count(&self) -> usize {
        self.document.pages().len() as usize
    }

    /// Render the page at 0-based `index` at `dpi`, limited to `max_pixels`
    /// on the longest edge.
    pub fn render_page(
        &self,
        index: usize,
        dpi: u32,
        max_pixels: u32,
    ) -> Result<DynamicImage, ConvertError> {
        let page_num = index + 1;
        let total = self.page_count();
        if index >= total {
            return Err(ConvertError::RasterisationFailed {
                page: page_num,
                detail: format!("'{}' has only {} pages", self.filename, total),
            });
        }

        let page = self
            .document
            .pages()
            .get(index as u16)
            .map_err(|e| ConvertError::RasterisationFailed {
                page: page_num,
                detail: format!("{:?}", e),
            })?;

        let render_config = render_config(dpi, max_pixels);
        let bitmap = page.render_with_config(&render_config).map_err(|e| {
            ConvertError::RasterisationFailed {
                page: page_num,
                detail: format!("{:?}", e),
            }
        })?;

        let image = bitmap.as_image();
        debug!(
            "Rendered page {} → {}x{} px",
            page_num,
            image.width(),
            image.height()
        );
        Ok(image)
    }
}

fn render_config(dpi: u32, max_pixels: u32) -> PdfRenderConfig {
    PdfRenderConfig::new()
        .scale_page_by_factor(dpi as f32 / POINTS_PER_INCH)
        .set_maximum_width(max_pixels as i32)
        .set_maximum_height(max_pixels as i32)
        .render_form_data(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine;
    use pdf_writer::{Pdf, Rect, Ref};

    fn blank_pdf(pages: usize, width: f32, height: f32) -> Vec<u8> {
        let mut pdf = Pdf::new();
        let catalog = Ref::new(1);
        let tree = Ref::new(2);
        let ids: Vec<Ref> = (0..pages as i32).map(|i| Ref::new(3 + i)).collect();
        pdf.catalog(catalog).pages(tree);
        pdf.pages(tree).kids(ids.iter().copied()).count(ids.len() as i32);
        for &id in &ids {
            pdf.page(id)
                .media_box(Rect::new(0.0, 0.0, width, height))
                .parent(tree);
        }
        pdf.finish()
    }

    macro_rules! pdfium_or_skip {
        () => {
            match engine::pdfium(None) {
                Ok(p) => p,
                Err(_) => {
                    eprintln!("SKIP: pdfium library not available");
                    return;
                }
            }
        };
    }

    #[test]
    fn renders_letter_page_at_requested_dpi() {
        let pdfium = pdfium_or_skip!();
        let bytes = blank_pdf(2, 612.0, 792.0);
        let raster = PdfRaster::open(&pdfium, &bytes, None, "blank.pdf").unwrap();
        assert_eq!(raster.page_count(), 2);

        let image = raster.render_page(0, 144, 10_000).unwrap();
        assert_eq!(image.width(), 1224);
        assert_eq!(image.height(), 1584);
    }

    #[test]
    fn longest_edge_is_capped() {
        let pdfium = pdfium_or_skip!();
        let bytes = blank_pdf(1, 612.0, 792.0);
        let raster = PdfRaster::open(&pdfium, &bytes, None, "blank.pdf").unwrap();
        let image = raster.render_page(0, 600, 1000).unwrap();
        assert!(image.width() <= 1000 && image.height() <= 1000);
    }

    #[test]
    fn out_of_range_page_is_rasterisation_error() {
        let pdfium = pdfium_or_skip!();
        let bytes = blank_pdf(1, 100.0, 100.0);
        let raster = PdfRaster::open(&pdfium, &bytes, None, "blank.pdf").unwrap();
        let err = raster.render_page(3, 72, 1000).err().unwrap();
        assert!(matches!(err, ConvertError::RasterisationFailed { page: 4, .. }));
    }

    #[test]
    fn garbage_is_corrupt_pdf() {
        let pdfium = pdfium_or_skip!();
        let err = PdfRaster::open(&pdfium, b"%PDF-1.7 garbage", None, "bad.pdf")
            .err()
            .unwrap();
        assert!(matches!(err, ConvertError::CorruptPdf { .. }));
    }
}
