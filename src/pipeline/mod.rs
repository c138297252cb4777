//! Pipeline stages used by the conversion dispatcher.
//!
//! Each submodule implements exactly one transformation step against one
//! external library, so a codec can be swapped without touching the others.
//!
//! ## Stages per conversion kind
//!
//! ```text
//! Word → PDF     docx::read_paragraphs ──▶ typeset::paragraphs_to_pdf
//! PDF  → Word    input::ensure_pdf ──▶ extract (pdf-extract) ──▶ text::sanitise ──▶ docx::write_paragraphs
//! PDF  → Images  input::ensure_pdf ──▶ render (pdfium) ──▶ encode (PNG) ──▶ [bundle (zip)]
//! Image → PDF    image_pdf::image_to_pdf
//! ```
//!
//! 1. [`input`]    : reject empty uploads and non-PDF bytes before parsing
//! 2. [`docx`]     : WordprocessingML in and out via `zip` + `quick-xml`
//! 3. [`typeset`]  : lay paragraph lines onto Letter pages with `pdf-writer`
//! 4. [`extract`]  : per-page plain text with `lopdf` + `pdf-extract`
//! 5. [`text`]     : strip characters a `.docx` cannot carry
//! 6. [`render`]   : rasterise pages via pdfium
//! 7. [`encode`]   : PNG-encode rendered pages
//! 8. [`image_pdf`]: wrap one decoded image in a single-page PDF
//! 9. [`bundle`]   : zip several outputs into one archive

pub mod bundle;
pub mod docx;
pub mod encode;
pub mod extract;
pub mod image_pdf;
pub mod input;
pub mod render;
pub mod text;
pub mod typeset;
