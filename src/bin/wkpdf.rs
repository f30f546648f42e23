//! CLI binary for wkpdf.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `PdfConfig` and writes the produced PDF bytes.

use anyhow::{bail, Context, Result};
use clap::Parser;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use wkpdf::{
    generate_pdf, get_extended_help, get_help, get_version, Orientation, PdfConfig,
};

const AFTER_HELP: &str = r#"EXAMPLES:
  # Render a file to out.pdf
  wkpdf page.html -o out.pdf

  # Render stdin to stdout
  cat page.html | wkpdf - > out.pdf

  # A4 landscape with uniform margins and document metadata
  wkpdf --page-size A4 --orientation landscape --margin 15mm \
        --title "Q3 Report" --author "Finance" report.html -o report.pdf

  # Pass exotic wkhtmltopdf flags straight through
  wkpdf --set quiet --set zoom=1.25 --set disable-smart-shrinking page.html -o out.pdf

  # Query the underlying binary
  wkpdf --wk-version
  wkpdf --wk-help

ENVIRONMENT VARIABLES:
  WKHTMLTOPDF_BIN   Path to the wkhtmltopdf binary (default: wkhtmltopdf on PATH)

SETUP:
  wkhtmltopdf must be installed separately — https://wkhtmltopdf.org/downloads.html
  This tool only drives it; no rendering happens in-process.
"#;

/// Generate PDF documents from HTML using wkhtmltopdf.
#[derive(Parser, Debug)]
#[command(
    name = "wkpdf",
    version,
    about = "Generate PDF documents from HTML using wkhtmltopdf",
    long_about = "Render an HTML file (or stdin) to PDF by driving the wkhtmltopdf binary. \
HTML is fed on the child's stdin and the PDF is read back from its stdout; \
nothing is written to disk except the requested output file.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// HTML input file, or `-` to read from stdin.
    #[arg(required_unless_present_any = ["wk_version", "wk_help", "wk_extended_help"])]
    input: Option<String>,

    /// Write the PDF to this file instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// PDF Title metadata.
    #[arg(long)]
    title: Option<String>,

    /// PDF Author metadata.
    #[arg(long)]
    author: Option<String>,

    /// PDF Subject metadata.
    #[arg(long)]
    subject: Option<String>,

    /// PDF Creator metadata.
    #[arg(long)]
    creator: Option<String>,

    /// PDF Producer metadata.
    #[arg(long)]
    producer: Option<String>,

    /// Page size: A4, Letter, …
    #[arg(long, env = "WKPDF_PAGE_SIZE")]
    page_size: Option<String>,

    /// Page orientation.
    #[arg(long, value_enum)]
    orientation: Option<OrientationArg>,

    /// All four margins at once, e.g. 10mm. Overridden by the specific flags.
    #[arg(long)]
    margin: Option<String>,

    /// Top margin, e.g. 10mm.
    #[arg(long)]
    margin_top: Option<String>,

    /// Bottom margin, e.g. 10mm.
    #[arg(long)]
    margin_bottom: Option<String>,

    /// Left margin, e.g. 10mm.
    #[arg(long)]
    margin_left: Option<String>,

    /// Right margin, e.g. 10mm.
    #[arg(long)]
    margin_right: Option<String>,

    /// Explicit page height, e.g. 297mm.
    #[arg(long)]
    page_height: Option<String>,

    /// Explicit page width, e.g. 210mm.
    #[arg(long)]
    page_width: Option<String>,

    /// Render in grayscale.
    #[arg(long)]
    grayscale: bool,

    /// Low-quality mode (smaller files).
    #[arg(long)]
    lowquality: bool,

    /// DPI for embedded images.
    #[arg(long)]
    image_dpi: Option<u32>,

    /// JPEG quality (0-100) for embedded images.
    #[arg(long)]
    image_quality: Option<u32>,

    /// Web cache directory handed to wkhtmltopdf.
    #[arg(long)]
    cache_dir: Option<PathBuf>,

    /// Extra wkhtmltopdf option, KEY or KEY=VALUE. Repeatable; passed
    /// through verbatim with `--` prepended and `_` mapped to `-`.
    #[arg(long = "set", value_name = "KEY[=VALUE]")]
    set: Vec<String>,

    /// Path to the wkhtmltopdf binary.
    #[arg(long, env = "WKHTMLTOPDF_BIN")]
    binary: Option<PathBuf>,

    /// Print wkpdf and wkhtmltopdf versions, then exit.
    #[arg(long)]
    wk_version: bool,

    /// Print wkhtmltopdf's help text (-h), then exit.
    #[arg(long)]
    wk_help: bool,

    /// Print wkhtmltopdf's extended help text (-H), then exit.
    #[arg(long)]
    wk_extended_help: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "WKPDF_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "WKPDF_QUIET")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum OrientationArg {
    Portrait,
    Landscape,
}

impl From<OrientationArg> for Orientation {
    fn from(v: OrientationArg) -> Self {
        match v {
            OrientationArg::Portrait => Orientation::Portrait,
            OrientationArg::Landscape => Orientation::Landscape,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let filter = if cli.quiet {
        "error"
    } else if cli.verbose {
        "debug"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Binary queries: print and exit ───────────────────────────────────
    if cli.wk_version {
        println!("{}", get_version());
        return Ok(());
    }
    if cli.wk_help {
        println!("{}", get_help().context("querying wkhtmltopdf help")?);
        return Ok(());
    }
    if cli.wk_extended_help {
        println!(
            "{}",
            get_extended_help().context("querying wkhtmltopdf extended help")?
        );
        return Ok(());
    }

    // ── Read HTML input ──────────────────────────────────────────────────
    let input = cli.input.as_deref().unwrap_or("-");
    let html = if input == "-" {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .context("reading HTML from stdin")?;
        buf
    } else {
        std::fs::read_to_string(input).with_context(|| format!("reading '{input}'"))?
    };

    // ── Build config and convert ─────────────────────────────────────────
    let config = build_config(&cli)?;
    let pdf = generate_pdf(&html, &config)?;

    // ── Write output ─────────────────────────────────────────────────────
    match &cli.output {
        Some(path) => {
            std::fs::write(path, &pdf)
                .with_context(|| format!("writing '{}'", path.display()))?;
            if !cli.quiet {
                eprintln!("wrote {} bytes to {}", pdf.len(), path.display());
            }
        }
        None => {
            io::stdout()
                .write_all(&pdf)
                .context("writing PDF to stdout")?;
        }
    }

    Ok(())
}

/// Map CLI flags onto a `PdfConfig`.
fn build_config(cli: &Cli) -> Result<PdfConfig> {
    let mut b = PdfConfig::builder();

    if let Some(v) = &cli.title {
        b = b.title(v);
    }
    if let Some(v) = &cli.author {
        b = b.author(v);
    }
    if let Some(v) = &cli.subject {
        b = b.subject(v);
    }
    if let Some(v) = &cli.creator {
        b = b.creator(v);
    }
    if let Some(v) = &cli.producer {
        b = b.producer(v);
    }

    if let Some(v) = &cli.page_size {
        b = b.page_size(v);
    }
    if let Some(o) = cli.orientation {
        b = b.orientation(o.into());
    }

    // --margin fills any side the specific flags left unset.
    if let Some(v) = cli.margin_top.as_ref().or(cli.margin.as_ref()) {
        b = b.margin_top(v);
    }
    if let Some(v) = cli.margin_bottom.as_ref().or(cli.margin.as_ref()) {
        b = b.margin_bottom(v);
    }
    if let Some(v) = cli.margin_left.as_ref().or(cli.margin.as_ref()) {
        b = b.margin_left(v);
    }
    if let Some(v) = cli.margin_right.as_ref().or(cli.margin.as_ref()) {
        b = b.margin_right(v);
    }

    if let Some(v) = &cli.page_height {
        b = b.page_height(v);
    }
    if let Some(v) = &cli.page_width {
        b = b.page_width(v);
    }
    b = b.grayscale(cli.grayscale).lowquality(cli.lowquality);
    if let Some(dpi) = cli.image_dpi {
        b = b.image_dpi(dpi);
    }
    if let Some(q) = cli.image_quality {
        b = b.image_quality(q);
    }
    if let Some(dir) = &cli.cache_dir {
        b = b.cache_dir(dir);
    }

    for entry in &cli.set {
        match entry.split_once('=') {
            Some((key, _)) if key.is_empty() => bail!("--set needs a key: '{entry}'"),
            Some((key, value)) => b = b.option(key, value),
            None if entry.is_empty() => bail!("--set needs a key"),
            None => b = b.flag(entry),
        }
    }

    if let Some(binary) = &cli.binary {
        b = b.binary(binary);
    }

    Ok(b.build())
}
