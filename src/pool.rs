//! Concurrency-bounded asynchronous generation pool.
//!
//! ## Why a pool?
//!
//! Every conversion is a whole wkhtmltopdf process: tens of megabytes of
//! resident memory and a burst of CPU. A batch endpoint that spawned one per
//! incoming request would fall over under load. [`PdfPool`] bounds the number
//! of simultaneously running children with a counting semaphore — calls
//! beyond the ceiling suspend cooperatively (no spinning, no polling) until a
//! slot frees — and owns one shared web-cache directory that every child
//! reuses across calls.
//!
//! The permit is held via an RAII guard strictly around one child's
//! spawn-to-exit window and is released on every exit path, including error
//! returns and panics, so capacity cannot leak.

use crate::config::{resolve_binary, PdfConfig};
use crate::convert::reject_url_input;
use crate::error::WkPdfError;
use crate::pipeline::{args, metadata, spawn};
use futures::future;
use std::path::{Path, PathBuf};
use tokio::sync::Semaphore;
use tracing::{debug, info};

/// Default ceiling on simultaneously running wkhtmltopdf instances.
const DEFAULT_MAX_PROCESSES: usize = 20;

/// A reusable, concurrency-bounded HTML-to-PDF generator.
///
/// Construct once via [`PdfPool::builder()`] and share across tasks (the
/// generation methods take `&self`). Per-call semantics — argument
/// translation, the dual-signal success classification, the metadata
/// rewrite — are identical to [`crate::generate_pdf`]; the pool adds the
/// admission bound and injects its cache directory as a default option.
///
/// # Known gap: no timeout
///
/// The pool does not time out child processes; a hung wkhtmltopdf blocks its
/// slot indefinitely. Callers that need a bound wrap individual calls, e.g.
/// `tokio::time::timeout(dur, pool.generate_pdf(..))` (the permit is released
/// when the timed-out future is dropped, though the child itself keeps
/// running to completion).
///
/// # Example
/// ```rust,no_run
/// use wkpdf::{PdfConfig, PdfPool};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = PdfPool::builder().max_processes(4).build()?;
/// let config = PdfConfig::builder().page_size("A4").build();
/// let pdf = pool.generate_pdf("<h1>Report</h1>", &config).await?;
/// # Ok(())
/// # }
/// ```
pub struct PdfPool {
    semaphore: Semaphore,
    max_processes: usize,
    cache_dir: PathBuf,
    binary: Option<PathBuf>,
}

impl PdfPool {
    /// Create a pool with default settings (ceiling 20, cache directory
    /// `wkpdf_cache` under the system temp directory).
    pub fn new() -> Result<Self, WkPdfError> {
        Self::builder().build()
    }

    /// Create a new builder for `PdfPool`.
    pub fn builder() -> PdfPoolBuilder {
        PdfPoolBuilder::default()
    }

    /// Generate a PDF from an HTML string, waiting for a free slot first.
    ///
    /// The pool's shared cache directory is passed to wkhtmltopdf as
    /// `--cache-dir` unless the caller's config already carries one (typed
    /// field or pass-through key).
    ///
    /// # Errors
    /// Same as [`crate::generate_pdf`].
    pub async fn generate_pdf(
        &self,
        html: &str,
        config: &PdfConfig,
    ) -> Result<Vec<u8>, WkPdfError> {
        reject_url_input(html)?;

        let binary = resolve_binary(config.binary.as_deref().or(self.binary.as_deref()));
        let cmd_args = args::build_args(&config.command_options(Some(&self.cache_dir)));

        let mut command = Vec::with_capacity(cmd_args.len() + 1);
        command.push(binary.display().to_string());
        command.extend(cmd_args.iter().cloned());

        // Held for the child's full lifecycle; dropped on every exit path.
        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|_| WkPdfError::Internal("pool semaphore closed".into()))?;
        debug!(
            idle_slots = self.semaphore.available_permits(),
            "pool slot acquired"
        );

        let output = spawn::run(&binary, &cmd_args, html.as_bytes()).await?;
        let pdf = spawn::classify_output(command, output)?;
        Ok(metadata::apply_metadata(pdf, config))
    }

    /// Generate many PDFs concurrently, bounded by the pool ceiling.
    ///
    /// All jobs are started at once; the semaphore provides the actual
    /// concurrency bound. Results come back in input order, one per job,
    /// each independently successful or failed.
    pub async fn generate_many<'a, I>(&self, jobs: I) -> Vec<Result<Vec<u8>, WkPdfError>>
    where
        I: IntoIterator<Item = (&'a str, &'a PdfConfig)>,
    {
        let futures: Vec<_> = jobs
            .into_iter()
            .map(|(html, config)| self.generate_pdf(html, config))
            .collect();
        info!(jobs = futures.len(), "running PDF batch");
        future::join_all(futures).await
    }

    /// The shared cache directory owned by this pool.
    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// The configured concurrency ceiling.
    pub fn max_processes(&self) -> usize {
        self.max_processes
    }
}

/// Builder for [`PdfPool`].
#[derive(Debug)]
pub struct PdfPoolBuilder {
    max_processes: usize,
    cache_dir: Option<PathBuf>,
    binary: Option<PathBuf>,
}

impl Default for PdfPoolBuilder {
    fn default() -> Self {
        Self {
            max_processes: DEFAULT_MAX_PROCESSES,
            cache_dir: None,
            binary: None,
        }
    }
}

impl PdfPoolBuilder {
    /// Ceiling on simultaneously running wkhtmltopdf instances.
    /// Default: 20. Clamped to ≥ 1.
    pub fn max_processes(mut self, n: usize) -> Self {
        self.max_processes = n.max(1);
        self
    }

    /// Override the shared cache directory.
    /// Default: `wkpdf_cache` under the system temp directory.
    pub fn cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = Some(dir.into());
        self
    }

    /// Pool-wide override of the wkhtmltopdf binary. A per-call
    /// [`PdfConfig::binary`] still takes precedence.
    pub fn binary(mut self, path: impl Into<PathBuf>) -> Self {
        self.binary = Some(path.into());
        self
    }

    /// Build the pool, creating the cache directory if it does not exist.
    ///
    /// Creation is idempotent; a pre-existing directory is reused as-is.
    ///
    /// # Errors
    /// [`WkPdfError::CacheDir`] when the directory cannot be created.
    pub fn build(self) -> Result<PdfPool, WkPdfError> {
        let cache_dir = self
            .cache_dir
            .unwrap_or_else(|| std::env::temp_dir().join("wkpdf_cache"));
        std::fs::create_dir_all(&cache_dir).map_err(|source| WkPdfError::CacheDir {
            path: cache_dir.clone(),
            source,
        })?;
        info!(
            cache_dir = %cache_dir.display(),
            max_processes = self.max_processes,
            "PDF pool ready"
        );
        Ok(PdfPool {
            semaphore: Semaphore::new(self.max_processes),
            max_processes: self.max_processes,
            cache_dir,
            binary: self.binary,
        })
    }
}
