//! Best-effort rewrite of the PDF Info-dictionary text block.
//!
//! wkhtmltopdf stamps its own Title/Producer lines into the documents it
//! emits. Rather than parse the PDF object graph, this stage patches the
//! textual Info block in place: it looks for the first occurrence of a
//! two-line anchor running from a `/Title` line to a `/Producer` line and
//! substitutes the caller's fields.
//!
//! The rewrite is a cosmetic enhancement, not a correctness requirement.
//! A PDF without the anchor (different wkhtmltopdf build, compressed
//! metadata stream) is returned byte-for-byte unchanged, and the stage never
//! produces an error.

use crate::config::PdfConfig;
use once_cell::sync::Lazy;
use regex::bytes::{NoExpand, Regex};
use tracing::debug;

/// The Info-block span eligible for rewriting: a `/Title` line, exactly one
/// intervening line, then a `/Producer` line. `(?-u)` drops the pattern to
/// raw-byte matching (Info strings may hold UTF-16 data that is not valid
/// UTF-8), and `[^\n]` keeps each `…` from crossing a line boundary, so the
/// match is bounded.
static RE_INFO_ANCHOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?-u)/Title[^\n]*\n[^\n]*\n/Producer[^\n]*").unwrap());

/// Patch the caller's metadata fields into the produced PDF bytes.
///
/// Builds one `/<Field> (<value>)` line per non-empty field, in the fixed
/// order Title, Author, Subject, Creator, Producer, and substitutes the block
/// for the first Info anchor found. With no fields set, or no anchor present,
/// the input is returned unchanged.
pub(crate) fn apply_metadata(pdf: Vec<u8>, config: &PdfConfig) -> Vec<u8> {
    if !config.has_metadata() {
        return pdf;
    }

    let fields = [
        ("Title", &config.title),
        ("Author", &config.author),
        ("Subject", &config.subject),
        ("Creator", &config.creator),
        ("Producer", &config.producer),
    ];
    let block: Vec<String> = fields
        .iter()
        .filter_map(|(name, value)| {
            value
                .as_deref()
                .filter(|v| !v.is_empty())
                .map(|v| format!("/{name} ({v})"))
        })
        .collect();
    let replacement = block.join("\n").into_bytes();

    if !RE_INFO_ANCHOR.is_match(&pdf) {
        debug!("no Info-dictionary anchor found; leaving PDF bytes untouched");
        return pdf;
    }
    RE_INFO_ANCHOR
        .replacen(&pdf, 1, NoExpand(&replacement))
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    const PDF_WITH_ANCHOR: &[u8] = b"%PDF-1.4\n1 0 obj\n\
/Title (\xfe\xff old)\n/Creator (wkhtmltopdf 0.12.6)\n/Producer (Qt 4.8.7)\n\
endobj\ntrailer\n%%EOF\n";

    fn config_all_fields() -> PdfConfig {
        PdfConfig::builder()
            .title("T")
            .author("A")
            .subject("S")
            .creator("C")
            .producer("P")
            .build()
    }

    #[test]
    fn no_fields_is_identity() {
        let pdf = PDF_WITH_ANCHOR.to_vec();
        let out = apply_metadata(pdf.clone(), &PdfConfig::default());
        assert_eq!(out, pdf);
    }

    #[test]
    fn empty_string_fields_count_as_unset() {
        let pdf = PDF_WITH_ANCHOR.to_vec();
        let config = PdfConfig::builder().title("").build();
        assert_eq!(apply_metadata(pdf.clone(), &config), pdf);
    }

    #[test]
    fn all_fields_replace_the_anchor_in_fixed_order() {
        let out = apply_metadata(PDF_WITH_ANCHOR.to_vec(), &config_all_fields());
        let expected: &[u8] = b"/Title (T)\n/Author (A)\n/Subject (S)\n/Creator (C)\n/Producer (P)";
        let pos = out
            .windows(expected.len())
            .position(|w| w == expected)
            .expect("replacement block present");
        // Surroundings survive untouched.
        assert!(out.starts_with(b"%PDF-1.4\n1 0 obj\n"));
        assert!(out.ends_with(b"\nendobj\ntrailer\n%%EOF\n"));
        // Old values are gone.
        assert!(!out.windows(4).any(|w| w == b" old"));
        assert_eq!(pos, b"%PDF-1.4\n1 0 obj\n".len());
    }

    #[test]
    fn partial_fields_include_only_those_set() {
        let config = PdfConfig::builder().author("Jane").producer("wkpdf").build();
        let out = apply_metadata(PDF_WITH_ANCHOR.to_vec(), &config);
        let expected: &[u8] = b"/Author (Jane)\n/Producer (wkpdf)";
        assert!(out.windows(expected.len()).any(|w| w == expected));
        assert!(!out.windows(7).any(|w| w == b"/Title "));
    }

    #[test]
    fn missing_anchor_is_identity() {
        let pdf = b"%PDF-1.4\nno info block here\n%%EOF\n".to_vec();
        let out = apply_metadata(pdf.clone(), &config_all_fields());
        assert_eq!(out, pdf);
    }

    #[test]
    fn only_first_anchor_is_replaced() {
        let mut pdf = PDF_WITH_ANCHOR.to_vec();
        pdf.extend_from_slice(b"/Title (second)\nmiddle\n/Producer (second)\n");
        let out = apply_metadata(pdf, &config_all_fields());
        let second: &[u8] = b"/Title (second)\nmiddle\n/Producer (second)";
        assert!(out.windows(second.len()).any(|w| w == second));
    }

    #[test]
    fn anchor_must_span_exactly_two_lines() {
        // Three lines between Title and Producer: no match, identity.
        let pdf = b"/Title (x)\none\ntwo\n/Producer (y)\n".to_vec();
        let out = apply_metadata(pdf.clone(), &config_all_fields());
        assert_eq!(out, pdf);
    }
}
