//! Wrapping a single raster image in a one-page PDF.
//!
//! The image is decoded, flattened to 8-bit RGB (alpha is dropped, palette
//! and greyscale are expanded) and embedded as a Flate-compressed image
//! XObject. The page is exactly the size of the image at `image_dpi`, so one
//! pixel is one point at the default 72 DPI.

use crate::error::ConvertError;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use pdf_writer::{Content, Filter, Finish, Name, Pdf, Rect, Ref};
use std::io::Write;
use tracing::debug;

const IMAGE_NAME: Name<'static> = Name(b"Im1");

/// Decode `bytes` as an image and return a single-page PDF showing it.
///
/// `image_dpi` must be finite and positive.
pub fn image_to_pdf(bytes: &[u8], filename: &str, image_dpi: f32) -> Result<Vec<u8>, ConvertError> {
    if !(image_dpi.is_finite() && image_dpi > 0.0) {
        return Err(ConvertError::InvalidConfig(format!(
            "Image DPI must be a positive number, got {image_dpi}"
        )));
    }

    let decoded = image::load_from_memory(bytes).map_err(|e| ConvertError::ImageDecodeFailed {
        filename: filename.to_string(),
        detail: e.to_string(),
    })?;

    let rgb = decoded.to_rgb8();
    let (width, height) = rgb.dimensions();
    if width == 0 || height == 0 {
        return Err(ConvertError::ImageDecodeFailed {
            filename: filename.to_string(),
            detail: format!("image has no pixels ({width}x{height})"),
        });
    }

    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(rgb.as_raw())
        .map_err(|e| ConvertError::Internal(format!("compressing image data: {e}")))?;
    let compressed = encoder
        .finish()
        .map_err(|e| ConvertError::Internal(format!("compressing image data: {e}")))?;

    let scale = 72.0 / image_dpi;
    let page_width = width as f32 * scale;
    let page_height = height as f32 * scale;

    let catalog_id = Ref::new(1);
    let tree_id = Ref::new(2);
    let page_id = Ref::new(3);
    let content_id = Ref::new(4);
    let image_id = Ref::new(5);

    let mut pdf = Pdf::new();
    pdf.catalog(catalog_id).pages(tree_id);
    pdf.pages(tree_id).kids([page_id]).count(1);

    let mut page = pdf.page(page_id);
    page.media_box(Rect::new(0.0, 0.0, page_width, page_height));
    page.parent(tree_id);
    page.contents(content_id);
    page.resources().x_objects().pair(IMAGE_NAME, image_id);
    page.finish();

    let mut image = pdf.image_xobject(image_id, &compressed);
    image.filter(Filter::FlateDecode);
    image.width(width as i32);
    image.height(height as i32);
    image.bits_per_component(8);
    image.color_space().device_rgb();
    image.finish();

    let mut content = Content::new();
    content.save_state();
    content.transform([page_width, 0.0, 0.0, page_height, 0.0, 0.0]);
    content.x_object(IMAGE_NAME);
    content.restore_state();
    pdf.stream(content_id, &content.finish());

    let out = pdf.finish();
    debug!(
        "Embedded {}x{} image on a {:.1}x{:.1} pt page ({} bytes)",
        width,
        height,
        page_width,
        page_height,
        out.len()
    );
    Ok(out)
}
