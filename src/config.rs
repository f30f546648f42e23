//! Configuration types for HTML-to-PDF conversion.
//!
//! All per-call behaviour is controlled through [`PdfConfig`], built via its
//! [`PdfConfigBuilder`]. Keeping every knob in one struct makes it trivial to
//! share a config across batch jobs and to diff two runs to understand why
//! their outputs differ.
//!
//! # Design choice: builder over constructor
//! The original wkhtmltopdf surface has dozens of flags and grows with every
//! release. The builder lets callers set only what they care about, and the
//! open-ended [`PdfConfigBuilder::flag`]/[`PdfConfigBuilder::option`] methods
//! pass anything this crate has never heard of straight through to the
//! binary — correctness checking for those is wkhtmltopdf's job, not ours.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Value of a single wkhtmltopdf command-line option.
///
/// Absent and `false` options are represented by *omission* from the option
/// list, so only the two present shapes need a tag: a bare flag
/// (`--grayscale`) or a flag with one argument (`--page-size A4`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum OptionValue {
    /// A boolean flag passed with no value, e.g. `--quiet`.
    Flag,
    /// A flag followed by its stringified argument, e.g. `--zoom 1.2`.
    Value(String),
}

/// Page orientation, passed to wkhtmltopdf as `--orientation`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Orientation {
    Portrait,
    Landscape,
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Orientation::Portrait => f.write_str("Portrait"),
            Orientation::Landscape => f.write_str("Landscape"),
        }
    }
}

/// Configuration for one HTML-to-PDF conversion.
///
/// Built via [`PdfConfig::builder()`] or [`PdfConfig::default()`].
///
/// The metadata fields (`title` … `producer`) are never passed to
/// wkhtmltopdf; they are patched into the produced PDF bytes afterwards.
/// Everything else becomes a command-line flag.
///
/// # Example
/// ```rust
/// use wkpdf::{Orientation, PdfConfig};
///
/// let config = PdfConfig::builder()
///     .title("Invoice 0042")
///     .page_size("A4")
///     .orientation(Orientation::Landscape)
///     .margin_top("10mm")
///     .flag("quiet")
///     .option("zoom", "1.25")
///     .build();
/// ```
#[derive(Debug, Clone, Default)]
pub struct PdfConfig {
    /// PDF Info-dictionary Title, applied after generation succeeds.
    pub title: Option<String>,
    /// PDF Info-dictionary Author.
    pub author: Option<String>,
    /// PDF Info-dictionary Subject.
    pub subject: Option<String>,
    /// PDF Info-dictionary Creator.
    pub creator: Option<String>,
    /// PDF Info-dictionary Producer.
    pub producer: Option<String>,

    /// Web cache directory handed to wkhtmltopdf. The async pool injects its
    /// own shared directory here when the caller leaves this unset.
    pub cache_dir: Option<PathBuf>,
    /// Render in grayscale (`--grayscale`).
    pub grayscale: bool,
    /// Low-quality mode, smaller output (`--lowquality`).
    pub lowquality: bool,
    /// Bottom margin, e.g. `10mm`.
    pub margin_bottom: Option<String>,
    /// Left margin, e.g. `10mm`.
    pub margin_left: Option<String>,
    /// Right margin, e.g. `10mm`.
    pub margin_right: Option<String>,
    /// Top margin, e.g. `10mm`.
    pub margin_top: Option<String>,
    /// Page orientation.
    pub orientation: Option<Orientation>,
    /// Explicit page height, e.g. `297mm`. Overrides `page_size`.
    pub page_height: Option<String>,
    /// Explicit page width, e.g. `210mm`. Overrides `page_size`.
    pub page_width: Option<String>,
    /// Named page size: `A4`, `Letter`, …
    pub page_size: Option<String>,
    /// DPI for embedded images (wkhtmltopdf default: 600).
    pub image_dpi: Option<u32>,
    /// JPEG quality 0–100 for embedded images (wkhtmltopdf default: 94).
    pub image_quality: Option<u32>,

    /// Exotic extra options, in insertion order, passed through verbatim.
    /// Populated via [`PdfConfigBuilder::flag`] and
    /// [`PdfConfigBuilder::option`].
    pub extra: Vec<(String, OptionValue)>,

    /// Override of the wkhtmltopdf binary location for this call.
    /// When `None`, resolution falls back to the `WKHTMLTOPDF_BIN`
    /// environment variable, then to `wkhtmltopdf` on `PATH`.
    pub binary: Option<PathBuf>,
}

impl PdfConfig {
    /// Create a new builder for `PdfConfig`.
    pub fn builder() -> PdfConfigBuilder {
        PdfConfigBuilder {
            config: Self::default(),
        }
    }

    /// True when any of the five metadata fields carries a non-empty value.
    pub(crate) fn has_metadata(&self) -> bool {
        [
            &self.title,
            &self.author,
            &self.subject,
            &self.creator,
            &self.producer,
        ]
        .iter()
        .any(|f| f.as_deref().is_some_and(|v| !v.is_empty()))
    }

    /// Assemble the ordered option list consumed by the argument translator.
    ///
    /// Recognized options come first in a fixed order, then the pass-through
    /// extras in insertion order. Absent and `false` options are omitted
    /// entirely. `default_cache_dir` is the pool's shared directory; it is
    /// used only when the caller set neither the typed `cache_dir` field nor
    /// a pass-through `cache_dir` key.
    pub(crate) fn command_options(
        &self,
        default_cache_dir: Option<&Path>,
    ) -> Vec<(String, OptionValue)> {
        let mut opts: Vec<(String, OptionValue)> = Vec::new();

        let cache_dir = self.cache_dir.as_deref().or_else(|| {
            if self.extra.iter().any(|(name, _)| name == "cache_dir") {
                None
            } else {
                default_cache_dir
            }
        });
        if let Some(dir) = cache_dir {
            opts.push((
                "cache_dir".into(),
                OptionValue::Value(dir.display().to_string()),
            ));
        }
        if self.grayscale {
            opts.push(("grayscale".into(), OptionValue::Flag));
        }
        if self.lowquality {
            opts.push(("lowquality".into(), OptionValue::Flag));
        }
        let valued = [
            ("margin_bottom", &self.margin_bottom),
            ("margin_left", &self.margin_left),
            ("margin_right", &self.margin_right),
            ("margin_top", &self.margin_top),
        ];
        for (name, value) in valued {
            if let Some(v) = value {
                opts.push((name.into(), OptionValue::Value(v.clone())));
            }
        }
        if let Some(o) = self.orientation {
            opts.push(("orientation".into(), OptionValue::Value(o.to_string())));
        }
        let sized = [
            ("page_height", &self.page_height),
            ("page_width", &self.page_width),
            ("page_size", &self.page_size),
        ];
        for (name, value) in sized {
            if let Some(v) = value {
                opts.push((name.into(), OptionValue::Value(v.clone())));
            }
        }
        if let Some(dpi) = self.image_dpi {
            opts.push(("image_dpi".into(), OptionValue::Value(dpi.to_string())));
        }
        if let Some(q) = self.image_quality {
            opts.push(("image_quality".into(), OptionValue::Value(q.to_string())));
        }

        opts.extend(self.extra.iter().cloned());
        opts
    }
}

/// Builder for [`PdfConfig`].
#[derive(Debug, Default)]
pub struct PdfConfigBuilder {
    config: PdfConfig,
}

impl PdfConfigBuilder {
    pub fn title(mut self, v: impl Into<String>) -> Self {
        self.config.title = Some(v.into());
        self
    }

    pub fn author(mut self, v: impl Into<String>) -> Self {
        self.config.author = Some(v.into());
        self
    }

    pub fn subject(mut self, v: impl Into<String>) -> Self {
        self.config.subject = Some(v.into());
        self
    }

    pub fn creator(mut self, v: impl Into<String>) -> Self {
        self.config.creator = Some(v.into());
        self
    }

    pub fn producer(mut self, v: impl Into<String>) -> Self {
        self.config.producer = Some(v.into());
        self
    }

    pub fn cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.cache_dir = Some(dir.into());
        self
    }

    pub fn grayscale(mut self, v: bool) -> Self {
        self.config.grayscale = v;
        self
    }

    pub fn lowquality(mut self, v: bool) -> Self {
        self.config.lowquality = v;
        self
    }

    pub fn margin_bottom(mut self, v: impl Into<String>) -> Self {
        self.config.margin_bottom = Some(v.into());
        self
    }

    pub fn margin_left(mut self, v: impl Into<String>) -> Self {
        self.config.margin_left = Some(v.into());
        self
    }

    pub fn margin_right(mut self, v: impl Into<String>) -> Self {
        self.config.margin_right = Some(v.into());
        self
    }

    pub fn margin_top(mut self, v: impl Into<String>) -> Self {
        self.config.margin_top = Some(v.into());
        self
    }

    pub fn orientation(mut self, o: Orientation) -> Self {
        self.config.orientation = Some(o);
        self
    }

    pub fn page_height(mut self, v: impl Into<String>) -> Self {
        self.config.page_height = Some(v.into());
        self
    }

    pub fn page_width(mut self, v: impl Into<String>) -> Self {
        self.config.page_width = Some(v.into());
        self
    }

    pub fn page_size(mut self, v: impl Into<String>) -> Self {
        self.config.page_size = Some(v.into());
        self
    }

    pub fn image_dpi(mut self, dpi: u32) -> Self {
        self.config.image_dpi = Some(dpi);
        self
    }

    pub fn image_quality(mut self, q: u32) -> Self {
        self.config.image_quality = Some(q);
        self
    }

    /// Pass an arbitrary boolean flag through to wkhtmltopdf, e.g.
    /// `.flag("quiet")` becomes `--quiet`.
    pub fn flag(mut self, name: impl Into<String>) -> Self {
        self.config.extra.push((name.into(), OptionValue::Flag));
        self
    }

    /// Pass an arbitrary valued option through to wkhtmltopdf, e.g.
    /// `.option("zoom", "1.25")` becomes `--zoom 1.25`. The value is
    /// stringified; no validation is performed on either part.
    pub fn option(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.config
            .extra
            .push((name.into(), OptionValue::Value(value.to_string())));
        self
    }

    /// Override the wkhtmltopdf binary used for this call.
    pub fn binary(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.binary = Some(path.into());
        self
    }

    /// Build the configuration. Infallible: anything this layer cannot
    /// judge is deferred to wkhtmltopdf itself.
    pub fn build(self) -> PdfConfig {
        self.config
    }
}

/// Locate the wkhtmltopdf binary for a call.
///
/// Resolution order: explicit override, `WKHTMLTOPDF_BIN` environment
/// variable, bare `wkhtmltopdf` resolved through `PATH` at spawn time.
pub(crate) fn resolve_binary(overridden: Option<&Path>) -> PathBuf {
    if let Some(p) = overridden {
        return p.to_path_buf();
    }
    if let Ok(p) = std::env::var("WKHTMLTOPDF_BIN") {
        if !p.is_empty() {
            return PathBuf::from(p);
        }
    }
    PathBuf::from("wkhtmltopdf")
}
