//! CLI binary for edgequake-fileconv.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `ConversionConfig`, converts every input and writes the outputs to disk.

use anyhow::{Context, Result};
use clap::Parser;
use edgequake_fileconv::{
    convert_async, write_outputs, ConversionConfig, ConversionKind, ConversionProgressCallback,
    ConversionRequest, OutputFile, PageSelection,
};
use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::warn;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Per-input progress callback printing above the shared file bar.
///
/// Files convert concurrently, so every line carries the input name.
struct FileProgress {
    bar: ProgressBar,
    name: String,
}

impl ConversionProgressCallback for FileProgress {
    fn on_conversion_start(&self, kind: ConversionKind, total_units: usize) {
        self.bar.set_message(format!("{} ({})", self.name, kind.label()));
        if total_units > 1 {
            self.bar.println(format!(
                "  {} {}  {}",
                dim("◆"),
                self.name,
                dim(&format!("{total_units} pages"))
            ));
        }
    }

    fn on_page_complete(&self, page_num: usize, total_pages: usize, output_len: usize) {
        self.bar.println(format!(
            "    {} {}  page {:>3}/{:<3}  {}",
            green("✓"),
            dim(&self.name),
            page_num,
            total_pages,
            dim(&format!("{output_len:>8}")),
        ));
    }

    fn on_conversion_error(&self, _kind: ConversionKind, message: &str) {
        // Keep the per-file line short; the full message is in the summary.
        let first = message.lines().next().unwrap_or(message);
        self.bar
            .println(format!("  {} {}  {}", red("✗"), self.name, red(first)));
    }
}

fn file_bar(total: usize) -> ProgressBar {
    let bar = ProgressBar::new(total as u64);
    let style = ProgressStyle::with_template(
        "{spinner:.cyan} {prefix:.bold}  \
         [{bar:42.green/238}] {pos:>3}/{len} files  \
         ⏱ {elapsed_precise}  {msg}",
    )
    .unwrap_or_else(|_| ProgressStyle::default_bar())
    .progress_chars("█▉▊▋▌▍▎▏  ")
    .tick_strings(TICKS);
    bar.set_style(style);
    bar.set_prefix("Converting");
    bar.enable_steady_tick(Duration::from_millis(80));
    bar
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Word document to PDF (writes ./converted.pdf)
  fileconv word-to-pdf report.docx

  # PDF to Word into a directory
  fileconv pdf-to-word paper.pdf -o out/

  # Render pages 1-5 at 300 DPI and zip them
  fileconv pdf-to-images --dpi 300 --pages 1-5 --zip slides.pdf

  # Several photos at once; each lands in out/<name>/converted.pdf
  fileconv image-to-pdf -o out/ a.jpg b.png c.jpeg

  # Machine-readable list of written files
  fileconv pdf-to-images --json scan.pdf > manifest.json

CONVERSIONS:
  word-to-pdf     .docx                 → converted.pdf
  pdf-to-word     .pdf                  → converted.docx
  pdf-to-images   .pdf                  → page_N.png (or pdf_images.zip with --zip)
  image-to-pdf    .png .jpg .jpeg       → converted.pdf

ENVIRONMENT VARIABLES:
  PDFIUM_LIB_PATH   Path to libpdfium (file or directory), needed by pdf-to-images
  FILECONV_*        Defaults for the matching flags (e.g. FILECONV_DPI=300)
  RUST_LOG          Overrides the log filter
"#;

/// Convert files between Word, PDF and image formats.
#[derive(Parser, Debug)]
#[command(
    name = "fileconv",
    version,
    about = "Convert files between Word, PDF and image formats",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Conversion: word-to-pdf, pdf-to-word, pdf-to-images, image-to-pdf.
    #[arg(value_parser = parse_kind)]
    kind: ConversionKind,

    /// Input files.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Directory for output files. With several inputs, each gets a
    /// subdirectory named after its file stem.
    #[arg(short, long, env = "FILECONV_OUTPUT_DIR", default_value = ".")]
    output_dir: PathBuf,

    /// Rendering DPI for pdf-to-images (72–600).
    #[arg(long, env = "FILECONV_DPI", default_value_t = 200,
          value_parser = clap::value_parser!(u32).range(72..=600))]
    dpi: u32,

    /// Page selection for PDF inputs: all, 5, 3-15, or 1,3,5,7.
    #[arg(long, env = "FILECONV_PAGES", default_value = "all")]
    pages: String,

    /// Bundle rendered pages into pdf_images.zip.
    #[arg(long = "zip", env = "FILECONV_ZIP")]
    bundle: bool,

    /// Text size in points for word-to-pdf.
    #[arg(long, env = "FILECONV_FONT_SIZE", default_value_t = 12.0,
          value_parser = parse_font_size)]
    font_size: f32,

    /// Image resolution for image-to-pdf; 72 makes one pixel one point.
    #[arg(long, env = "FILECONV_IMAGE_DPI", default_value_t = 72)]
    image_dpi: u32,

    /// PDF user password for encrypted documents.
    #[arg(long, env = "FILECONV_PASSWORD")]
    password: Option<String>,

    /// Path to libpdfium (file or directory).
    #[arg(long, env = "FILECONV_PDFIUM_LIB")]
    pdfium_lib: Option<PathBuf>,

    /// Per-file timeout in seconds.
    #[arg(long, env = "FILECONV_TIMEOUT")]
    timeout: Option<u64>,

    /// Number of files converted concurrently.
    #[arg(short, long, env = "FILECONV_CONCURRENCY", default_value_t = 4)]
    concurrency: usize,

    /// Print a JSON manifest of written files to stdout.
    #[arg(long, env = "FILECONV_JSON")]
    json: bool,

    /// Disable progress bar.
    #[arg(long, env = "FILECONV_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "FILECONV_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "FILECONV_QUIET")]
    quiet: bool,
}

fn parse_kind(s: &str) -> Result<ConversionKind, String> {
    s.parse().map_err(|e: edgequake_fileconv::ConvertError| e.to_string())
}

fn parse_font_size(s: &str) -> Result<f32, String> {
    let pt: f32 = s.trim().parse().map_err(|e| format!("{e}"))?;
    if !pt.is_finite() {
        return Err(format!("font size must be a finite number, got '{s}'"));
    }
    Ok(pt)
}

/// One entry of the `--json` manifest.
#[derive(Debug, Serialize)]
struct ManifestEntry {
    input: PathBuf,
    success: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    outputs: Vec<WrittenFile>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Debug, Serialize)]
struct WrittenFile {
    path: PathBuf,
    media_type: String,
    size: usize,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Suppress INFO-level library logs when the progress bar is active.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let config = build_config(&cli)?;

    for input in &cli.inputs {
        let name = input.file_name().map(|n| n.to_string_lossy()).unwrap_or_default();
        if !cli.kind.accepts_filename(&name) {
            warn!(
                "'{}' does not look like a {} input (expected {})",
                input.display(),
                cli.kind.label(),
                cli.kind.accepted_extensions().join(", ")
            );
        }
    }

    let bar = if show_progress {
        file_bar(cli.inputs.len())
    } else {
        ProgressBar::hidden()
    };

    // ── Run conversions ──────────────────────────────────────────────────
    let start = Instant::now();
    let multiple = cli.inputs.len() > 1;
    let entries: Vec<ManifestEntry> = stream::iter(cli.inputs.iter().map(|input| {
        let mut config = config.clone();
        if show_progress {
            config.progress_callback = Some(Arc::new(FileProgress {
                bar: bar.clone(),
                name: display_name(input),
            }));
        }
        let out_dir = output_dir_for(&cli.output_dir, input, multiple);
        let kind = cli.kind;
        let bar = bar.clone();
        async move {
            let entry = match convert_one(input, kind, &out_dir, &config).await {
                Ok(outputs) => ManifestEntry {
                    input: input.clone(),
                    success: true,
                    outputs,
                    error: None,
                },
                Err(e) => ManifestEntry {
                    input: input.clone(),
                    success: false,
                    outputs: Vec::new(),
                    error: Some(format!("{e:#}")),
                },
            };
            bar.inc(1);
            entry
        }
    }))
    .buffer_unordered(cli.concurrency.max(1))
    .collect()
    .await;
    bar.finish_and_clear();

    // ── Report ───────────────────────────────────────────────────────────
    let failed = entries.iter().filter(|e| !e.success).count();

    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&entries).context("Failed to serialise manifest")?
        );
    } else if !cli.quiet {
        for entry in &entries {
            match &entry.error {
                None => {
                    for file in &entry.outputs {
                        eprintln!(
                            "{} {}  {}",
                            green("✔"),
                            bold(&file.path.display().to_string()),
                            dim(&format!("{} bytes", file.size))
                        );
                    }
                }
                Some(msg) => eprintln!(
                    "{} {}  Conversion failed: {}",
                    red("✘"),
                    bold(&entry.input.display().to_string()),
                    msg
                ),
            }
        }
        eprintln!(
            "{}/{} files converted in {}ms",
            entries.len() - failed,
            entries.len(),
            start.elapsed().as_millis()
        );
    }

    if failed > 0 {
        anyhow::bail!("{} of {} conversions failed", failed, entries.len());
    }
    Ok(())
}

/// Read, convert and write one input.
async fn convert_one(
    input: &Path,
    kind: ConversionKind,
    out_dir: &Path,
    config: &ConversionConfig,
) -> Result<Vec<WrittenFile>> {
    let request = ConversionRequest::from_path(input, kind)
        .with_context(|| format!("Failed to read {}", input.display()))?;
    let outputs: Vec<OutputFile> = convert_async(request, config)
        .await
        .context("Conversion failed")?;
    let paths = write_outputs(&outputs, out_dir)
        .with_context(|| format!("Failed to write outputs to {}", out_dir.display()))?;

    Ok(paths
        .into_iter()
        .zip(&outputs)
        .map(|(path, file)| WrittenFile {
            path,
            media_type: file.media_type.to_string(),
            size: file.len(),
        })
        .collect())
}

/// Map CLI args to `ConversionConfig`.
fn build_config(cli: &Cli) -> Result<ConversionConfig> {
    let pages: PageSelection = cli.pages.parse().context("Invalid --pages")?;

    let mut builder = ConversionConfig::builder()
        .dpi(cli.dpi)
        .pages(pages)
        .bundle_images(cli.bundle)
        .font_size(cli.font_size)
        .image_dpi(cli.image_dpi);

    if let Some(ref pwd) = cli.password {
        builder = builder.password(pwd.clone());
    }
    if let Some(ref lib) = cli.pdfium_lib {
        builder = builder.pdfium_lib_path(lib.clone());
    }
    if let Some(secs) = cli.timeout {
        builder = builder.timeout_secs(secs);
    }

    builder.build().context("Invalid configuration")
}

fn display_name(input: &Path) -> String {
    input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| input.display().to_string())
}

/// `<output-dir>/<stem>/` when converting several inputs, else `<output-dir>`.
fn output_dir_for(base: &Path, input: &Path, multiple: bool) -> PathBuf {
    match input.file_stem() {
        Some(stem) if multiple => base.join(stem),
        _ => base.to_path_buf(),
    }
}
