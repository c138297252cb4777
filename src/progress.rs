//! Progress-callback trait for conversion events.
//!
//! Inject an [`Arc<dyn ConversionProgressCallback>`] via
//! [`crate::config::ConversionConfigBuilder::progress_callback`] to receive
//! events while a conversion runs. Page events fire for the PDF-sourced kinds
//! (PDF → images, PDF → Word), where work is naturally per page; the
//! start/complete/error events fire for every kind.
//!
//! # Example
//!
//! ```rust
//! use edgequake_fileconv::{ConversionConfig, ConversionProgressCallback};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     pages: AtomicUsize,
//! }
//!
//! impl ConversionProgressCallback for CountingCallback {
//!     fn on_page_complete(&self, page_num: usize, total_pages: usize, output_len: usize) {
//!         self.pages.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("Page {}/{} done ({} bytes)", page_num, total_pages, output_len);
//!     }
//! }
//!
//! let counter = Arc::new(CountingCallback { pages: AtomicUsize::new(0) });
//!
//! let config = ConversionConfig::builder()
//!     .progress_callback(counter as Arc<dyn ConversionProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use crate::output::OutputFile;
use crate::request::ConversionKind;
use std::sync::Arc;

/// Called by the dispatcher as a conversion proceeds.
///
/// Implementations must be `Send + Sync`: [`crate::convert::convert_async`]
/// runs conversions on tokio's blocking pool, and a batch may share one
/// callback across concurrent conversions. All methods default to no-ops.
pub trait ConversionProgressCallback: Send + Sync {
    /// Called once before any work starts.
    ///
    /// `total_units` is the number of selected pages for PDF sources and 1
    /// otherwise.
    fn on_conversion_start(&self, kind: ConversionKind, total_units: usize) {
        let _ = (kind, total_units);
    }

    /// Called after a page has been converted.
    ///
    /// # Arguments
    /// * `page_num`   : 1-indexed page number in the source document
    /// * `total_pages`: number of selected pages
    /// * `output_len` : bytes of PNG (images) or characters of text (Word)
    fn on_page_complete(&self, page_num: usize, total_pages: usize, output_len: usize) {
        let _ = (page_num, total_pages, output_len);
    }

    /// Called once when every output has been produced.
    fn on_conversion_complete(&self, kind: ConversionKind, outputs: &[OutputFile]) {
        let _ = (kind, outputs);
    }

    /// Called once when the conversion failed; no outputs follow.
    fn on_conversion_error(&self, kind: ConversionKind, message: &str) {
        let _ = (kind, message);
    }
}

/// Shared, thread-safe progress callback handle.
pub type ProgressCallback = Arc<dyn ConversionProgressCallback>;

/// A no-op callback, handy as a placeholder.
pub struct NoopProgressCallback;

impl ConversionProgressCallback for NoopProgressCallback {}
