//! Argument translation: ordered options to wkhtmltopdf command-line tokens.
//!
//! The naming convention is fixed: option names use underscores on the Rust
//! side and come out as `--dash-separated` long flags. A [`OptionValue::Flag`]
//! yields the flag alone, a [`OptionValue::Value`] yields the flag followed by
//! one argument token. Nothing is validated here — wkhtmltopdf's flag surface
//! is versioned and open-ended, and it reports unknown flags far better than
//! a stale allowlist in this crate ever could.
//!
//! The final two tokens are always the literal `-` markers telling
//! wkhtmltopdf to read the document source from stdin and write the rendered
//! PDF to stdout, regardless of how many options precede them.

use crate::config::OptionValue;

/// Marker token for both "read from stdin" and "write to stdout".
const STDIO_MARKER: &str = "-";

/// Render the ordered option list into command-line tokens.
pub(crate) fn build_args(options: &[(String, OptionValue)]) -> Vec<String> {
    let mut args = Vec::with_capacity(options.len() * 2 + 2);
    for (name, value) in options {
        let flag = format!("--{}", name.replace('_', "-"));
        match value {
            OptionValue::Flag => args.push(flag),
            OptionValue::Value(v) => {
                args.push(flag);
                args.push(v.clone());
            }
        }
    }
    args.push(STDIO_MARKER.to_string());
    args.push(STDIO_MARKER.to_string());
    args
}
