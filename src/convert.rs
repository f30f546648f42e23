//! Synchronous entry points: one-shot conversion and binary queries.
//!
//! ## Why a blocking API at all?
//!
//! Most callers convert one document and want the bytes back — a web handler
//! rendering an invoice, a script producing a report. [`generate_pdf`] blocks
//! the calling thread for the full child-process lifecycle (spawn, stdin
//! feed, stream drain, exit) with no runtime required. Batch workloads that
//! need back-pressure use [`crate::pool::PdfPool`] instead; the per-call
//! semantics are identical.

use crate::config::{resolve_binary, PdfConfig};
use crate::error::WkPdfError;
use crate::pipeline::{args, metadata, spawn};
use std::path::Path;
use tracing::{debug, info};

/// Generate a PDF from an HTML string.
///
/// This is the primary synchronous entry point. The HTML is piped to
/// wkhtmltopdf's stdin and the rendered document is read back from its
/// stdout; nothing touches the filesystem.
///
/// # Arguments
/// * `html`   — HTML source text. URL-like input (leading `http`/`www` after
///   whitespace) is rejected: wkhtmltopdf would treat it as an address to
///   fetch, which this crate does not support.
/// * `config` — per-call options and metadata, see [`PdfConfig`].
///
/// # Errors
/// * [`WkPdfError::UrlInput`] — URL-like input, rejected before any spawn.
/// * [`WkPdfError::GenerationFailed`] — the tool exited nonzero and produced
///   no PDF signature.
/// * [`WkPdfError::SpawnFailed`] / [`WkPdfError::ProcessIo`] — environment
///   faults, propagated unmodified.
///
/// # Example
/// ```rust,no_run
/// use wkpdf::{generate_pdf, PdfConfig};
///
/// let config = PdfConfig::builder().title("Hello").page_size("A4").build();
/// let pdf = generate_pdf("<h1>Hello</h1>", &config)?;
/// std::fs::write("hello.pdf", pdf)?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn generate_pdf(html: &str, config: &PdfConfig) -> Result<Vec<u8>, WkPdfError> {
    reject_url_input(html)?;

    let binary = resolve_binary(config.binary.as_deref());
    let cmd_args = args::build_args(&config.command_options(None));

    let mut command = Vec::with_capacity(cmd_args.len() + 1);
    command.push(binary.display().to_string());
    command.extend(cmd_args.iter().cloned());

    let output = spawn::run_blocking(&binary, &cmd_args, html.as_bytes())?;
    let pdf = spawn::classify_output(command, output)?;
    info!(bytes = pdf.len(), "PDF generated");

    Ok(metadata::apply_metadata(pdf, config))
}

/// Get the version of wkpdf and of the wkhtmltopdf binary.
///
/// Returns a two-line composite string. This call never fails: any error
/// during the binary query (missing binary, I/O fault) is rendered into the
/// second line instead of propagated — version strings end up in logs and
/// diagnostics pages, where an `Err` helps nobody.
pub fn get_version() -> String {
    version_with_binary(&resolve_binary(None))
}

/// Get the help text from the wkhtmltopdf binary (`-h`).
pub fn get_help() -> Result<String, WkPdfError> {
    query(&resolve_binary(None), "-h")
}

/// Get the extended help text from the wkhtmltopdf binary (`-H`).
pub fn get_extended_help() -> Result<String, WkPdfError> {
    query(&resolve_binary(None), "-H")
}

// ── Internal helpers ─────────────────────────────────────────────────────

/// Reject input that wkhtmltopdf would interpret as an address to fetch.
/// Shared with the pool path, which has the same calling contract.
pub(crate) fn reject_url_input(html: &str) -> Result<(), WkPdfError> {
    let head = html.trim_start();
    if head.starts_with("http") || head.starts_with("www") {
        let prefix: String = head.chars().take(24).collect();
        debug!(%prefix, "rejecting URL-like input");
        return Err(WkPdfError::UrlInput { prefix });
    }
    Ok(())
}

/// Run the binary with a single flag and return its trimmed stdout.
///
/// Like the upstream tool's own `-V`/`-h` handling, the exit status is not
/// inspected — these queries have no output-format contract to classify.
fn query(binary: &Path, flag: &str) -> Result<String, WkPdfError> {
    let output = spawn::run_blocking(binary, &[flag.to_string()], b"")?;
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

pub(crate) fn version_with_binary(binary: &Path) -> String {
    let wk_version = match query(binary, "-V") {
        Ok(v) => v,
        Err(e) => e.to_string(),
    };
    format!(
        "wkpdf version: {}\nwkhtmltopdf version: {}",
        env!("CARGO_PKG_VERSION"),
        wk_version
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn url_like_input_is_rejected() {
        assert!(reject_url_input("http://example.com").is_err());
        assert!(reject_url_input("https://example.com/doc").is_err());
        assert!(reject_url_input("  \n\twww.example.com").is_err());
    }

    #[test]
    fn html_mentioning_urls_is_not_rejected() {
        assert!(reject_url_input("<a href=\"http://example.com\">x</a>").is_ok());
        assert!(reject_url_input("plain text about www sites").is_ok());
        assert!(reject_url_input("").is_ok());
    }

    #[test]
    fn rejection_happens_before_any_spawn() {
        // A binary that cannot exist: if a spawn were attempted first, the
        // error would be SpawnFailed rather than UrlInput.
        let config = PdfConfig::builder()
            .binary("/definitely/not/a/real/wkhtmltopdf")
            .build();
        let err = generate_pdf(" http://example.com", &config).unwrap_err();
        assert!(matches!(err, WkPdfError::UrlInput { .. }), "got: {err}");
    }

    #[test]
    fn version_query_never_fails() {
        let missing = PathBuf::from("/definitely/not/a/real/wkhtmltopdf");
        let v = version_with_binary(&missing);
        assert!(
            v.starts_with(&format!("wkpdf version: {}", env!("CARGO_PKG_VERSION"))),
            "got: {v}"
        );
        assert!(
            v.contains("failed to spawn"),
            "second line should describe the failure, got: {v}"
        );
    }
}
