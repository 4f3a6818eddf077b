//! The fixed catalogue of document tools offered by the remote service.

use crate::error::SwiftConvertError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One user-invokable document transformation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Operation {
    #[default]
    Convert,
    Merge,
    Split,
    Compress,
    ExtractText,
    ExtractImages,
    Rotate,
    Reorder,
}

impl Operation {
    /// Every operation, in tab order.
    pub const ALL: [Operation; 8] = [
        Operation::Convert,
        Operation::Merge,
        Operation::Split,
        Operation::Compress,
        Operation::ExtractText,
        Operation::ExtractImages,
        Operation::Rotate,
        Operation::Reorder,
    ];

    /// Stable identifier, also the prefix of saved artifact names.
    pub fn id(self) -> &'static str {
        match self {
            Operation::Convert => "convert",
            Operation::Merge => "merge",
            Operation::Split => "split",
            Operation::Compress => "compress",
            Operation::ExtractText => "extract-text",
            Operation::ExtractImages => "extract-images",
            Operation::Rotate => "rotate",
            Operation::Reorder => "reorder",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Operation::Convert => "Convert",
            Operation::Merge => "Merge",
            Operation::Split => "Split",
            Operation::Compress => "Compress",
            Operation::ExtractText => "Extract Text",
            Operation::ExtractImages => "Extract Images",
            Operation::Rotate => "Rotate",
            Operation::Reorder => "Reorder",
        }
    }

    /// Path of the service endpoint, relative to the base URL.
    pub fn endpoint(self) -> &'static str {
        match self {
            Operation::Convert => "/api/convert",
            Operation::Merge => "/api/merge",
            Operation::Split => "/api/split",
            Operation::Compress => "/api/compress",
            Operation::ExtractText => "/api/extract/text",
            Operation::ExtractImages => "/api/extract/images",
            Operation::Rotate => "/api/rotate",
            Operation::Reorder => "/api/reorder",
        }
    }

    /// Only merge takes more than one input file.
    pub fn accepts_multiple(self) -> bool {
        self == Operation::Merge
    }

    /// Split and image extraction answer with a zip archive.
    pub fn produces_archive(self) -> bool {
        matches!(self, Operation::Split | Operation::ExtractImages)
    }

    /// Hint shown on the empty upload area.
    pub fn upload_hint(self) -> &'static str {
        if self.accepts_multiple() {
            "Select multiple files to merge"
        } else {
            "Click to upload or drag & drop"
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Operation {
    type Err = SwiftConvertError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('_', "-");
        Operation::ALL
            .into_iter()
            .find(|op| op.id() == wanted)
            .ok_or_else(|| SwiftConvertError::UnknownOperation(s.to_string()))
    }
}
