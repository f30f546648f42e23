//! Error types for the wkpdf library.
//!
//! One enum covers the whole crate. The variants fall into three groups:
//!
//! * **Rejected before spawn** — [`WkPdfError::UrlInput`]: the caller's input
//!   was refused before any child process existed.
//!
//! * **The tool itself failed** — [`WkPdfError::GenerationFailed`]: the child
//!   ran, exited nonzero, *and* produced no PDF signature. Carries the full
//!   resolved command tokens and the trimmed stderr text so the failure can
//!   be reproduced from a shell.
//!
//! * **Environment faults** — spawn, stream-I/O and cache-directory errors
//!   propagate unmodified with their `io::Error` source attached. The crate
//!   adds no retry, backoff or suppression on top of them.
//!
//! wkhtmltopdf is known to exit nonzero on perfectly valid output, so a
//! nonzero exit status alone never produces an error here — see
//! `pipeline::spawn` for the dual-signal classification.

use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the wkpdf library.
#[derive(Debug, Error)]
pub enum WkPdfError {
    /// The input looks like a URL, which wkhtmltopdf would fetch over the
    /// network. Only HTML source text is supported; the call is rejected
    /// before any process is spawned.
    #[error("PDF generation from URLs is not supported (input begins with {prefix:?}); pass HTML source text instead")]
    UrlInput { prefix: String },

    /// wkhtmltopdf exited nonzero and its output carried no PDF signature.
    #[error("error running wkhtmltopdf\ncommand: {command:?}\nresponse: \"{stderr}\"")]
    GenerationFailed {
        command: Vec<String>,
        stderr: String,
    },

    /// The wkhtmltopdf binary could not be executed at all.
    #[error("failed to spawn wkhtmltopdf binary '{binary}': {source}\nInstall wkhtmltopdf or set WKHTMLTOPDF_BIN to its location.")]
    SpawnFailed {
        binary: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// I/O fault on the child's stdin/stdout/stderr streams or while
    /// awaiting its exit.
    #[error("I/O error while driving wkhtmltopdf: {source}")]
    ProcessIo {
        #[source]
        source: std::io::Error,
    },

    /// The pool's shared cache directory could not be created.
    #[error("failed to create cache directory '{path}': {source}")]
    CacheDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Unexpected internal error.
    #[error("internal error: {0}")]
    Internal(String),
}
