//! Format compatibility matrix for the convert tool.
//!
//! The matrix is the declared list of legal `(from, to)` pairs. Lookups keep
//! declaration order wherever order is visible to the user: the first pair
//! declared for a source is its default target, and target lists come back
//! in the order they were declared.
//!
//! The standard table is built once per process and shared read-only via
//! [`CompatibilityMatrix::standard`].

use crate::error::{NoSuchSource, SwiftConvertError};
use crate::format::{Format, FormatFamily};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// A declared legal conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConversionPair {
    pub from: Format,
    pub to: Format,
}

impl ConversionPair {
    pub const fn new(from: Format, to: Format) -> Self {
        Self { from, to }
    }
}

impl Default for ConversionPair {
    fn default() -> Self {
        Self::new(Format::Docx, Format::Pdf)
    }
}

impl fmt::Display for ConversionPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} → {}", self.from, self.to)
    }
}

/// The conversions the service accepts, in declaration order.
pub const STANDARD_PAIRS: [ConversionPair; 14] = [
    ConversionPair::new(Format::Docx, Format::Pdf),
    ConversionPair::new(Format::Pdf, Format::Docx),
    ConversionPair::new(Format::Txt, Format::Pdf),
    ConversionPair::new(Format::Pdf, Format::Txt),
    ConversionPair::new(Format::Html, Format::Pdf),
    ConversionPair::new(Format::Md, Format::Pdf),
    ConversionPair::new(Format::Ppt, Format::Pdf),
    ConversionPair::new(Format::Xlsx, Format::Pdf),
    ConversionPair::new(Format::Csv, Format::Pdf),
    ConversionPair::new(Format::Epub, Format::Pdf),
    ConversionPair::new(Format::Jpg, Format::Pdf),
    ConversionPair::new(Format::Png, Format::Pdf),
    ConversionPair::new(Format::Pdf, Format::Jpg),
    ConversionPair::new(Format::Pdf, Format::Png),
];

static STANDARD: Lazy<CompatibilityMatrix> = Lazy::new(|| CompatibilityMatrix {
    pairs: STANDARD_PAIRS.to_vec(),
});

/// Immutable table of legal conversions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompatibilityMatrix {
    pairs: Vec<ConversionPair>,
}

impl CompatibilityMatrix {
    /// The process-wide matrix built from [`STANDARD_PAIRS`].
    pub fn standard() -> &'static CompatibilityMatrix {
        &STANDARD
    }

    /// Build a matrix from a custom declaration. An empty table is rejected.
    pub fn from_pairs(
        pairs: impl IntoIterator<Item = ConversionPair>,
    ) -> Result<Self, SwiftConvertError> {
        let pairs: Vec<ConversionPair> = pairs.into_iter().collect();
        if pairs.is_empty() {
            return Err(SwiftConvertError::InvalidConfig(
                "compatibility matrix needs at least one conversion pair".into(),
            ));
        }
        Ok(Self { pairs })
    }

    /// Declared pairs in declaration order.
    pub fn pairs(&self) -> impl Iterator<Item = &ConversionPair> {
        self.pairs.iter()
    }

    /// Every format that appears as a `from`, deduplicated and sorted.
    pub fn source_formats(&self) -> BTreeSet<Format> {
        self.pairs.iter().map(|p| p.from).collect()
    }

    /// Targets declared for `source`, in declaration order.
    pub fn target_formats(&self, source: Format) -> Vec<Format> {
        self.pairs
            .iter()
            .filter(|p| p.from == source)
            .map(|p| p.to)
            .collect()
    }

    /// The first declared target for `source`.
    pub fn default_target(&self, source: Format) -> Result<Format, NoSuchSource> {
        self.pairs
            .iter()
            .find(|p| p.from == source)
            .map(|p| p.to)
            .ok_or(NoSuchSource { format: source })
    }

    pub fn is_valid_pair(&self, source: Format, target: Format) -> bool {
        self.pairs
            .iter()
            .any(|p| p.from == source && p.to == target)
    }

    /// Guess the source format of a file from its extension.
    ///
    /// Returns `None` unless the upper-cased extension names a declared
    /// source format. A name without a dot is treated as all extension.
    /// The extension is matched as-is: surrounding whitespace defeats it.
    pub fn infer_format_from_filename(&self, name: &str) -> Option<Format> {
        let ext = name.rsplit('.').next().unwrap_or(name).to_ascii_uppercase();
        let format = Format::ALL.into_iter().find(|f| f.name() == ext)?;
        self.pairs.iter().any(|p| p.from == format).then_some(format)
    }

    /// Source formats belonging to `family`, sorted.
    pub fn sources_in(&self, family: FormatFamily) -> BTreeSet<Format> {
        self.source_formats()
            .into_iter()
            .filter(|f| family.formats().contains(f))
            .collect()
    }
}

impl Default for CompatibilityMatrix {
    fn default() -> Self {
        Self::standard().clone()
    }
}
