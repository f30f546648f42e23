//! Child-process invocation and success classification.
//!
//! ## Why signature-sniffing beats the exit status
//!
//! wkhtmltopdf is known to exit nonzero — and not even deterministically —
//! after writing a perfectly valid document (network hiccups on subresources,
//! JavaScript console noise). Trusting the exit code alone would fail
//! conversions that actually worked. The authoritative success signal is
//! therefore the `%PDF` signature on the first four bytes of stdout; the exit
//! status is only a hint. Both runners below share one pure classifier over
//! `(exit status, output prefix)`.
//!
//! Classification happens only after the child has fully exited and both
//! output streams are drained, so it never races a partially-written
//! document.

use crate::error::WkPdfError;
use std::io::Write;
use std::path::Path;
use std::process::{Output, Stdio};
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

/// The 4-byte signature every well-formed output document starts with.
pub(crate) const PDF_MAGIC: &[u8; 4] = b"%PDF";

/// Signature sniff on the first four bytes of captured stdout.
pub(crate) fn pdf_signature_ok(bytes: &[u8]) -> bool {
    bytes.len() >= PDF_MAGIC.len() && &bytes[..PDF_MAGIC.len()] == PDF_MAGIC
}

/// The dual-signal classifier: a run succeeded if the exit status was zero
/// OR — independent of exit status — stdout carries the PDF signature.
pub(crate) fn succeeded(exit_ok: bool, stdout: &[u8]) -> bool {
    exit_ok || pdf_signature_ok(stdout)
}

/// Turn a finished child into document bytes or a diagnostic error.
///
/// `command` is the full resolved token sequence (binary first) so a failure
/// can be reproduced from a shell; stderr is decoded lossily and trimmed.
pub(crate) fn classify_output(command: Vec<String>, output: Output) -> Result<Vec<u8>, WkPdfError> {
    if succeeded(output.status.success(), &output.stdout) {
        if !output.status.success() {
            warn!(
                status = %output.status,
                "wkhtmltopdf exited nonzero but produced a PDF; trusting the signature"
            );
        }
        Ok(output.stdout)
    } else {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        Err(WkPdfError::GenerationFailed { command, stderr })
    }
}

/// Run the binary to completion on the calling thread.
///
/// stdin is fed from a separate writer thread: `std::process` offers no
/// concurrent drain, and a child that interleaves reading input with writing
/// output would deadlock against a single-threaded feeder once a pipe buffer
/// fills.
pub(crate) fn run_blocking(
    binary: &Path,
    args: &[String],
    input: &[u8],
) -> Result<Output, WkPdfError> {
    debug!(binary = %binary.display(), ?args, "spawning wkhtmltopdf (blocking)");
    let mut child = std::process::Command::new(binary)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|source| WkPdfError::SpawnFailed {
            binary: binary.to_path_buf(),
            source,
        })?;

    let mut stdin = child
        .stdin
        .take()
        .ok_or_else(|| WkPdfError::Internal("child stdin was not captured".into()))?;
    let input = input.to_vec();
    let writer = std::thread::spawn(move || {
        // A child that exits before consuming all input closes the pipe;
        // that run is judged from its exit status and output, not from the
        // resulting broken-pipe write error.
        if let Err(e) = stdin.write_all(&input) {
            debug!("stdin write ended early: {e}");
        }
    });

    let output = child
        .wait_with_output()
        .map_err(|source| WkPdfError::ProcessIo { source })?;
    let _ = writer.join();
    Ok(output)
}

/// Run the binary to completion on the tokio runtime.
///
/// stdin is written fully and explicitly shut down to signal end-of-input
/// before the exit status is awaited; stdout and stderr are drained as part
/// of the same wait.
pub(crate) async fn run(
    binary: &Path,
    args: &[String],
    input: &[u8],
) -> Result<Output, WkPdfError> {
    debug!(binary = %binary.display(), ?args, "spawning wkhtmltopdf (async)");
    let mut child = tokio::process::Command::new(binary)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|source| WkPdfError::SpawnFailed {
            binary: binary.to_path_buf(),
            source,
        })?;

    let mut stdin = child
        .stdin
        .take()
        .ok_or_else(|| WkPdfError::Internal("child stdin was not captured".into()))?;
    if let Err(e) = stdin.write_all(input).await {
        debug!("stdin write ended early: {e}");
    }
    if let Err(e) = stdin.shutdown().await {
        debug!("stdin shutdown failed: {e}");
    }
    drop(stdin);

    child
        .wait_with_output()
        .await
        .map_err(|source| WkPdfError::ProcessIo { source })
}
