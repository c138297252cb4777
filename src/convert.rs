//! Conversion entry points.
//!
//! [`convert`] is the dispatcher: one request in, one [`ConversionResult`]
//! out, with every error folded into `Failure { message }`. [`try_convert`]
//! is the same call with the typed error left intact. [`convert_async`] moves
//! the CPU-bound work onto tokio's blocking pool, and [`convert_to_dir`]
//! writes the outputs to disk atomically.

use crate::config::ConversionConfig;
use crate::engine;
use crate::error::ConvertError;
use crate::output::{ConversionResult, OutputFile, MIME_DOCX, MIME_PDF, MIME_PNG, MIME_ZIP};
use crate::pipeline::{bundle, docx, encode, extract, image_pdf, input, render, typeset};
use crate::request::{ConversionKind, ConversionRequest};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Output name for Word → PDF and image → PDF.
pub const CONVERTED_PDF: &str = "converted.pdf";
/// Output name for PDF → Word.
pub const CONVERTED_DOCX: &str = "converted.docx";
/// Output name for bundled PDF → images.
pub const IMAGES_ZIP: &str = "pdf_images.zip";

/// Convert one file.
///
/// This is the primary entry point for the library. It never panics on bad
/// input and never returns partial output: any failure is reported as
/// [`ConversionResult::Failure`] carrying the error's message.
///
/// # Example
/// ```rust,no_run
/// use edgequake_fileconv::{convert, ConversionConfig, ConversionKind, ConversionRequest};
///
/// let request = ConversionRequest::from_path("photo.jpg", ConversionKind::ImageToPdf).unwrap();
/// let result = convert(&request, &ConversionConfig::default());
/// for file in result.outputs() {
///     std::fs::write(&file.filename, &file.bytes).unwrap();
/// }
/// ```
pub fn convert(request: &ConversionRequest, config: &ConversionConfig) -> ConversionResult {
    ConversionResult::from(try_convert(request, config))
}

/// Like [`convert`], but returns the typed error.
pub fn try_convert(
    request: &ConversionRequest,
    config: &ConversionConfig,
) -> Result<Vec<OutputFile>, ConvertError> {
    let start = Instant::now();
    let kind = request.kind();
    info!(
        "Starting {} conversion of '{}' ({} bytes)",
        kind,
        request.source_filename(),
        request.source_bytes().len()
    );

    let result = input::ensure_non_empty(request.source_bytes(), request.source_filename())
        .and_then(|_| match kind {
            ConversionKind::WordToPdf => word_to_pdf(request, config),
            ConversionKind::PdfToWord => pdf_to_word(request, config),
            ConversionKind::PdfToImages => pdf_to_images(request, config),
            ConversionKind::ImageToPdf => image_to_pdf(request, config),
        });

    match &result {
        Ok(outputs) => {
            info!(
                "{} conversion complete: {} output(s), {} bytes, {}ms",
                kind,
                outputs.len(),
                outputs.iter().map(OutputFile::len).sum::<usize>(),
                start.elapsed().as_millis()
            );
            if let Some(ref cb) = config.progress_callback {
                cb.on_conversion_complete(kind, outputs);
            }
        }
        Err(e) => {
            warn!("{} conversion of '{}' failed: {}", kind, request.source_filename(), e);
            if let Some(ref cb) = config.progress_callback {
                cb.on_conversion_error(kind, &e.to_string());
            }
        }
    }
    result
}

/// Run [`try_convert`] on tokio's blocking pool.
///
/// When `config.timeout_secs` is set, the wait is bounded and
/// [`ConvertError::Timeout`] is returned once it elapses. The blocking task
/// itself is not interrupted; its result is discarded.
pub async fn convert_async(
    request: ConversionRequest,
    config: &ConversionConfig,
) -> Result<Vec<OutputFile>, ConvertError> {
    let task_config = config.clone();
    let handle = tokio::task::spawn_blocking(move || try_convert(&request, &task_config));

    let joined = match config.timeout_secs {
        Some(secs) => tokio::time::timeout(Duration::from_secs(secs), handle)
            .await
            .map_err(|_| ConvertError::Timeout { secs })?,
        None => handle.await,
    };

    joined.map_err(|e| ConvertError::Internal(format!("Conversion task panicked: {}", e)))?
}

/// Convert and write every output into `dir`, returning the written paths in
/// output order.
///
/// Each file is written to a temp file in `dir` and then renamed into place,
/// so a reader never sees a partial file.
pub fn convert_to_dir(
    request: &ConversionRequest,
    dir: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<Vec<PathBuf>, ConvertError> {
    let outputs = try_convert(request, config)?;
    write_outputs(&outputs, dir)
}

/// Atomically write `outputs` into `dir`, creating it if needed.
pub fn write_outputs(outputs: &[OutputFile], dir: impl AsRef<Path>) -> Result<Vec<PathBuf>, ConvertError> {
    let dir = dir.as_ref();
    std::fs::create_dir_all(dir).map_err(|e| ConvertError::OutputWriteFailed {
        path: dir.to_path_buf(),
        source: e,
    })?;

    let mut written = Vec::with_capacity(outputs.len());
    for output in outputs {
        let path = dir.join(&output.filename);
        let write_err = |source: std::io::Error| ConvertError::OutputWriteFailed {
            path: path.clone(),
            source,
        };

        // Dropping `tmp` on an early return deletes it.
        let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(write_err)?;
        tmp.write_all(&output.bytes).map_err(write_err)?;
        tmp.as_file().sync_all().map_err(write_err)?;
        tmp.persist(&path).map_err(|e| write_err(e.error))?;

        debug!("Wrote {} ({} bytes)", path.display(), output.len());
        written.push(path);
    }
    Ok(written)
}

// ── Per-kind conversions ─────────────────────────────────────────────────

fn word_to_pdf(
    request: &ConversionRequest,
    config: &ConversionConfig,
) -> Result<Vec<OutputFile>, ConvertError> {
    if let Some(ref cb) = config.progress_callback {
        cb.on_conversion_start(ConversionKind::WordToPdf, 1);
    }

    let paragraphs = docx::read_paragraphs(request.source_bytes(), request.source_filename())?;
    debug!("Read {} paragraphs", paragraphs.len());

    let layout = typeset::TextLayout::from_config(config)?;
    let pdf = typeset::paragraphs_to_pdf(&paragraphs, &layout);
    Ok(vec![OutputFile::new(CONVERTED_PDF, pdf, MIME_PDF)])
}

fn pdf_to_word(
    request: &ConversionRequest,
    config: &ConversionConfig,
) -> Result<Vec<OutputFile>, ConvertError> {
    let filename = request.source_filename();
    input::ensure_pdf(request.source_bytes(), filename)?;

    let source = extract::TextSource::open(request.source_bytes(), filename)?;
    let indices = config.pages.resolve(source.page_count())?;
    debug!("Selected {} of {} pages", indices.len(), source.page_count());

    if let Some(ref cb) = config.progress_callback {
        cb.on_conversion_start(ConversionKind::PdfToWord, indices.len());
    }

    let mut paragraphs = Vec::with_capacity(indices.len());
    for &idx in &indices {
        let text = source.page_text(idx)?;
        if let Some(ref cb) = config.progress_callback {
            cb.on_page_complete(idx + 1, indices.len(), text.chars().count());
        }
        paragraphs.push(text);
    }

    let docx = docx::write_paragraphs(&paragraphs)?;
    Ok(vec![OutputFile::new(CONVERTED_DOCX, docx, MIME_DOCX)])
}

fn pdf_to_images(
    request: &ConversionRequest,
    config: &ConversionConfig,
) -> Result<Vec<OutputFile>, ConvertError> {
    let filename = request.source_filename();
    input::ensure_pdf(request.source_bytes(), filename)?;

    // Bound here, on the thread that renders; the handle never leaves it.
    let pdfium = engine::pdfium(config.pdfium_lib_path.as_deref())?;
    let raster = render::PdfRaster::open(
        &pdfium,
        request.source_bytes(),
        config.password.as_deref(),
        filename,
    )?;
    let indices = config.pages.resolve(raster.page_count())?;
    debug!("Selected {} of {} pages", indices.len(), raster.page_count());

    if let Some(ref cb) = config.progress_callback {
        cb.on_conversion_start(ConversionKind::PdfToImages, indices.len());
    }

    // One page at a time: render, encode, drop the bitmap.
    let mut pngs = Vec::with_capacity(indices.len());
    for &idx in &indices {
        let page_num = idx + 1;
        let image = raster.render_page(idx, config.dpi, config.max_rendered_pixels)?;
        let png = encode::encode_png(&image).map_err(|e| ConvertError::ImageEncodeFailed {
            page: page_num,
            detail: e.to_string(),
        })?;
        if let Some(ref cb) = config.progress_callback {
            cb.on_page_complete(page_num, indices.len(), png.len());
        }
        pngs.push(OutputFile::new(format!("page_{}.png", page_num), png, MIME_PNG));
    }

    if config.bundle_images {
        let zip = bundle::bundle(&pngs, IMAGES_ZIP)?;
        return Ok(vec![OutputFile::new(IMAGES_ZIP, zip, MIME_ZIP)]);
    }
    Ok(pngs)
}

fn image_to_pdf(
    request: &ConversionRequest,
    config: &ConversionConfig,
) -> Result<Vec<OutputFile>, ConvertError> {
    if let Some(ref cb) = config.progress_callback {
        cb.on_conversion_start(ConversionKind::ImageToPdf, 1);
    }

    let pdf = image_pdf::image_to_pdf(
        request.source_bytes(),
        request.source_filename(),
        config.image_dpi as f32,
    )?;
    Ok(vec![OutputFile::new(CONVERTED_PDF, pdf, MIME_PDF)])
}
