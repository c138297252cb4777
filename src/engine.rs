//! PDFium binding.
//!
//! pdfium-render is a thin wrapper over the PDFium C++ library, loaded at
//! runtime. A `Pdfium` handle is not `Send`, so each conversion binds its own
//! inside the blocking task that renders. What is shared across the process is
//! only *where* the library was found: the first successful lookup is cached
//! and every later bind goes straight to it.
//!
//! PDFium's init and teardown calls are process-global: dropping one
//! instance tears the library down under any other. A [`PdfiumSession`]
//! therefore holds a process-wide lock, and at most one is alive at a time.
//!
//! ## Lookup order
//!
//! 1. `ConversionConfig::pdfium_lib_path` (library file or directory)
//! 2. `PDFIUM_LIB_PATH` environment variable (file or directory)
//! 3. The system library search path
//! 4. The current working directory
//!
//! Only PDF → images needs PDFium; the other conversions never bind it.

use crate::error::ConvertError;
use pdfium_render::prelude::*;
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, OnceLock};
use tracing::{debug, info};

/// Environment variable naming a PDFium library file or directory.
pub const PDFIUM_LIB_PATH_ENV: &str = "PDFIUM_LIB_PATH";

/// Where a working PDFium library was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LibrarySource {
    /// A library file loaded by path.
    File(PathBuf),
    /// Whatever the platform loader finds on its search path.
    System,
}

// ── Process-wide state ───────────────────────────────────────────────────────

static RESOLVED: OnceLock<LibrarySource> = OnceLock::new();
static IN_USE: Mutex<()> = Mutex::new(());

/// A bound PDFium instance, exclusive for as long as it is alive.
pub struct PdfiumSession {
    // Field order matters: the library is torn down before the lock is released.
    pdfium: Pdfium,
    _exclusive: MutexGuard<'static, ()>,
}

impl Deref for PdfiumSession {
    type Target = Pdfium;

    fn deref(&self) -> &Pdfium {
        &self.pdfium
    }
}

/// Bind a fresh PDFium instance for one conversion, waiting for any other
/// live session to end first.
///
/// The first successful call fixes the library location for the rest of the
/// process; `lib_path` is only consulted until then.
pub fn pdfium(lib_path: Option<&Path>) -> Result<PdfiumSession, ConvertError> {
    let exclusive = IN_USE.lock().unwrap_or_else(|e| e.into_inner());

    // Fast path: already resolved in this process.
    let bindings = match RESOLVED.get() {
        Some(source) => bind_source(source)
            .map_err(|e| ConvertError::PdfiumBindingFailed(format!("{}: {:?}", source, e)))?,
        None => {
            let (source, bindings) = resolve(lib_path)?;
            let _ = RESOLVED.set(source);
            bindings
        }
    };

    Ok(PdfiumSession {
        pdfium: Pdfium::new(bindings),
        _exclusive: exclusive,
    })
}

/// The library location fixed by the first successful [`pdfium`] call.
pub fn resolved_source() -> Option<&'static LibrarySource> {
    RESOLVED.get()
}

/// Whether PDFium can be bound in this environment.
pub fn is_available(lib_path: Option<&Path>) -> bool {
    pdfium(lib_path).is_ok()
}

impl std::fmt::Display for LibrarySource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LibrarySource::File(path) => write!(f, "{}", path.display()),
            LibrarySource::System => f.write_str("system library"),
        }
    }
}

fn bind_source(source: &LibrarySource) -> Result<Box<dyn PdfiumLibraryBindings>, PdfiumError> {
    match source {
        LibrarySource::File(path) => Pdfium::bind_to_library(path),
        LibrarySource::System => Pdfium::bind_to_system_library(),
    }
}

fn resolve(
    lib_path: Option<&Path>,
) -> Result<(LibrarySource, Box<dyn PdfiumLibraryBindings>), ConvertError> {
    let explicit = lib_path
        .map(Path::to_path_buf)
        .into_iter()
        .chain(std::env::var_os(PDFIUM_LIB_PATH_ENV).map(PathBuf::from))
        .map(|candidate| LibrarySource::File(library_file(&candidate)));

    let candidates = explicit
        .chain(std::iter::once(LibrarySource::System))
        .chain(std::iter::once(LibrarySource::File(
            Pdfium::pdfium_platform_library_name_at_path("./"),
        )));

    let mut attempts: Vec<String> = Vec::new();
    for source in candidates {
        match bind_source(&source) {
            Ok(bindings) => {
                info!("Bound PDFium from {}", source);
                return Ok((source, bindings));
            }
            Err(e) => {
                debug!("PDFium not loadable from {}: {:?}", source, e);
                attempts.push(format!("{}: {:?}", source, e));
            }
        }
    }
    Err(ConvertError::PdfiumBindingFailed(attempts.join("; ")))
}

/// A directory means "the platform library name inside it".
fn library_file(path: &Path) -> PathBuf {
    if path.is_dir() {
        Pdfium::pdfium_platform_library_name_at_path(path)
    } else {
        path.to_path_buf()
    }
}
