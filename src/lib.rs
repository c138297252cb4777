//! # edgequake-fileconv
//!
//! Convert files between Word, PDF and image formats, entirely in memory.
//!
//! One request (source bytes, a filename and a [`ConversionKind`]) goes in;
//! either a list of output blobs with suggested filenames and media types, or
//! a single failure message, comes out.
//!
//! ## Conversions
//!
//! ```text
//! Word ➜ PDF    .docx body paragraphs  ──▶ Helvetica text lines on Letter pages
//! PDF ➜ Word    per-page plain text    ──▶ one .docx paragraph per page
//! PDF ➜ Image   pdfium rasterisation   ──▶ page_N.png (optionally zipped)
//! Image ➜ PDF   any decodable image    ──▶ one page sized to the image
//! ```
//!
//! Only PDF ➜ Image needs the PDFium shared library (see [`engine`]); the
//! other three are pure Rust.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use edgequake_fileconv::{convert, ConversionConfig, ConversionKind, ConversionRequest};
//!
//! let request = ConversionRequest::from_path("report.docx", ConversionKind::WordToPdf)?;
//! let result = convert(&request, &ConversionConfig::default());
//! match result.message() {
//!     None => {
//!         for file in result.outputs() {
//!             std::fs::write(&file.filename, &file.bytes)?;
//!         }
//!     }
//!     Some(msg) => eprintln!("Conversion failed: {msg}"),
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `fileconv` binary (clap + anyhow + indicatif + tracing-subscriber) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! edgequake-fileconv = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod engine;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod request;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ConversionConfig, ConversionConfigBuilder, PageSelection};
pub use convert::{convert, convert_async, convert_to_dir, try_convert, write_outputs};
pub use error::ConvertError;
pub use output::{ConversionResult, OutputFile, OutputSummary};
pub use progress::{ConversionProgressCallback, NoopProgressCallback, ProgressCallback};
pub use request::{ConversionKind, ConversionRequest};
