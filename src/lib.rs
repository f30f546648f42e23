//! # wkpdf
//!
//! Generate PDF documents from HTML by driving the `wkhtmltopdf` binary as a
//! subprocess.
//!
//! ## Why this crate?
//!
//! wkhtmltopdf renders real-world HTML/CSS through a full WebKit engine, but
//! driving it correctly is fiddly: its exit codes lie (nonzero exits on
//! perfectly valid output), its stdin/stdout piping deadlocks naive callers,
//! and a fleet of unbounded instances will eat a host alive. This crate wraps
//! all of that behind two calls: a blocking one-shot [`generate_pdf`] and a
//! semaphore-bounded async [`PdfPool`] for batch workloads, with back-pressure
//! instead of process storms. The rendering engine itself stays an opaque
//! external collaborator — this crate never parses HTML or PDF structure
//! beyond a four-byte signature sniff and a bounded metadata patch.
//!
//! ## Pipeline Overview
//!
//! ```text
//! HTML
//!  │
//!  ├─ 1. Args      render PdfConfig options to command-line tokens (`- -` last)
//!  ├─ 2. Spawn     wkhtmltopdf child, HTML fed on stdin, streams drained
//!  ├─ 3. Classify  %PDF signature sniff first, exit status second
//!  └─ 4. Metadata  best-effort Info-dictionary rewrite in the output bytes
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use wkpdf::{generate_pdf, PdfConfig};
//!
//! let config = PdfConfig::builder()
//!     .title("Monthly Report")
//!     .page_size("A4")
//!     .margin_top("10mm")
//!     .build();
//! let pdf = generate_pdf("<h1>March</h1>", &config)?;
//! assert!(pdf.starts_with(b"%PDF"));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! Batch use with bounded concurrency:
//!
//! ```rust,no_run
//! use wkpdf::{PdfConfig, PdfPool};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = PdfPool::builder().max_processes(8).build()?;
//! let config = PdfConfig::default();
//! let results = pool
//!     .generate_many([("<p>one</p>", &config), ("<p>two</p>", &config)])
//!     .await;
//! # Ok(())
//! # }
//! ```
//!
//! ## Locating the binary
//!
//! Resolution order: [`PdfConfig::binary`] / [`PdfPool`] builder override →
//! the `WKHTMLTOPDF_BIN` environment variable → `wkhtmltopdf` on `PATH`.
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `wkpdf` binary (clap + anyhow + tracing-subscriber) |
//!
//! Disable `cli` when using only the library to avoid pulling in CLI-only deps:
//! ```toml
//! wkpdf = { version = "0.2", default-features = false }
//! ```
//!
//! ## Known gap: no timeouts
//!
//! Child-process waits are unbounded by design; a hung wkhtmltopdf occupies
//! its pool slot until it exits. Wrap calls in `tokio::time::timeout` (pool)
//! or run the blocking call on a watchdog-equipped worker if you need one.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod error;
pub(crate) mod pipeline;
pub mod pool;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{Orientation, OptionValue, PdfConfig, PdfConfigBuilder};
pub use convert::{generate_pdf, get_extended_help, get_help, get_version};
pub use error::WkPdfError;
pub use pool::{PdfPool, PdfPoolBuilder};
