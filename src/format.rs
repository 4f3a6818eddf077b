//! Document and image formats known to the remote service.
//!
//! A [`Format`] is displayed upper-case (`DOCX`), travels on the wire
//! lower-case (`docx`) and parses case-insensitively from either.

use crate::error::SwiftConvertError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A file type identifier from the fixed set the service understands.
///
/// Variants are declared alphabetically so that the derived `Ord` sorts by
/// upper-case name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Format {
    Csv,
    Docx,
    Epub,
    Html,
    Jpg,
    Md,
    Pdf,
    Png,
    Ppt,
    Txt,
    Xlsx,
}

impl Format {
    /// Every format, in sorted order.
    pub const ALL: [Format; 11] = [
        Format::Csv,
        Format::Docx,
        Format::Epub,
        Format::Html,
        Format::Jpg,
        Format::Md,
        Format::Pdf,
        Format::Png,
        Format::Ppt,
        Format::Txt,
        Format::Xlsx,
    ];

    /// Upper-case display name, e.g. `"DOCX"`.
    pub fn name(self) -> &'static str {
        match self {
            Format::Csv => "CSV",
            Format::Docx => "DOCX",
            Format::Epub => "EPUB",
            Format::Html => "HTML",
            Format::Jpg => "JPG",
            Format::Md => "MD",
            Format::Pdf => "PDF",
            Format::Png => "PNG",
            Format::Ppt => "PPT",
            Format::Txt => "TXT",
            Format::Xlsx => "XLSX",
        }
    }

    /// Lower-case wire value, e.g. `"docx"`. Also the file extension.
    pub fn wire_name(self) -> String {
        self.name().to_ascii_lowercase()
    }

    /// The families this format is listed under. PDF is in both.
    pub fn families(self) -> Vec<FormatFamily> {
        FormatFamily::ALL
            .into_iter()
            .filter(|family| family.formats().contains(&self))
            .collect()
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Format {
    type Err = SwiftConvertError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        Format::ALL
            .into_iter()
            .find(|f| f.name() == upper)
            .ok_or_else(|| SwiftConvertError::UnknownFormat(s.to_string()))
    }
}

/// Grouping used when presenting formats to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormatFamily {
    Document,
    Image,
}

impl FormatFamily {
    pub const ALL: [FormatFamily; 2] = [FormatFamily::Document, FormatFamily::Image];

    /// Members of the family in presentation order.
    pub fn formats(self) -> &'static [Format] {
        match self {
            FormatFamily::Document => &[
                Format::Pdf,
                Format::Docx,
                Format::Txt,
                Format::Html,
                Format::Md,
                Format::Ppt,
                Format::Xlsx,
                Format::Csv,
                Format::Epub,
            ],
            FormatFamily::Image => &[Format::Pdf, Format::Jpg, Format::Png],
        }
    }
}
