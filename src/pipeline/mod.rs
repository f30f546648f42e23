//! Pipeline stages for HTML-to-PDF conversion.
//!
//! Each submodule implements exactly one transformation step.
//! Keeping stages separate makes each independently testable: the argument
//! translator and the metadata rewriter are pure functions, and the spawn
//! stage is the only one that touches the operating system.
//!
//! ## Data Flow
//!
//! ```text
//! options ──▶ args ──▶ spawn ──▶ classify ──▶ metadata
//! (PdfConfig) (tokens) (child)  (%PDF sniff)  (Info patch)
//! ```
//!
//! 1. [`args`]     — render the ordered option list to command-line tokens,
//!    ending with the `- -` stdin/stdout markers
//! 2. [`spawn`]    — run the wkhtmltopdf child (blocking or tokio), feed it
//!    HTML on stdin, drain both output streams, classify success via the
//!    `%PDF` signature plus exit status
//! 3. [`metadata`] — best-effort rewrite of the Info-dictionary text block
//!    inside the produced bytes

pub(crate) mod args;
pub(crate) mod metadata;
pub(crate) mod spawn;
