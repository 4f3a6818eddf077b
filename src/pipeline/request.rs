//! Request building: turn a tool, its parameters and a file set into the
//! multipart payload the service expects.
//!
//! The payload is plain data. Nothing here touches the network, so the
//! field layout of every tool can be asserted directly in unit tests; the
//! client converts it into a real multipart body only when sending.

use crate::config::OperationParameters;
use crate::files::FileSet;
use crate::operation::Operation;
use bytes::Bytes;

/// Value of one multipart field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    File { filename: String, data: Bytes },
}

/// One named multipart field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormField {
    pub name: &'static str,
    pub value: FieldValue,
}

/// Everything needed to send one operation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestPayload {
    /// Endpoint path, e.g. `/api/convert`.
    pub endpoint: &'static str,
    /// Fields in the order they are appended to the form.
    pub fields: Vec<FormField>,
}

impl RequestPayload {
    /// Value of the first text field called `name`.
    pub fn text_field(&self, name: &str) -> Option<&str> {
        self.fields.iter().find_map(|f| match &f.value {
            FieldValue::Text(v) if f.name == name => Some(v.as_str()),
            _ => None,
        })
    }

    /// Filenames of every file field called `name`, in order.
    pub fn file_fields(&self, name: &str) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|f| f.name == name)
            .filter_map(|f| match &f.value {
                FieldValue::File { filename, .. } => Some(filename.as_str()),
                FieldValue::Text(_) => None,
            })
            .collect()
    }

    pub fn field_names(&self) -> Vec<&'static str> {
        self.fields.iter().map(|f| f.name).collect()
    }

    /// Total bytes of attached files.
    pub fn upload_size(&self) -> u64 {
        self.fields
            .iter()
            .map(|f| match &f.value {
                FieldValue::File { data, .. } => data.len() as u64,
                FieldValue::Text(_) => 0,
            })
            .sum()
    }
}

/// Build the payload for `operation`.
///
/// * merge sends every file as a repeated `files` field;
///   all other tools send the first file as `file`
/// * convert adds lower-case `from` / `to`
/// * rotate adds `angle` in degrees
/// * reorder adds `order` verbatim
pub fn build(
    operation: Operation,
    file_set: &FileSet,
    parameters: &OperationParameters,
) -> RequestPayload {
    let mut fields = Vec::with_capacity(file_set.len() + 2);

    if operation.accepts_multiple() {
        for file in file_set {
            fields.push(file_field("files", file));
        }
    } else {
        fields.push(file_field("file", file_set.first()));
    }

    match operation {
        Operation::Convert => {
            fields.push(text_field("from", parameters.conversion.from.wire_name()));
            fields.push(text_field("to", parameters.conversion.to.wire_name()));
        }
        Operation::Rotate => {
            fields.push(text_field("angle", parameters.angle.degrees().to_string()));
        }
        Operation::Reorder => {
            fields.push(text_field("order", parameters.page_order.clone()));
        }
        Operation::Merge
        | Operation::Split
        | Operation::Compress
        | Operation::ExtractText
        | Operation::ExtractImages => {}
    }

    RequestPayload {
        endpoint: operation.endpoint(),
        fields,
    }
}

fn file_field(name: &'static str, file: &crate::files::CandidateFile) -> FormField {
    FormField {
        name,
        value: FieldValue::File {
            filename: file.name().to_string(),
            data: file.data(),
        },
    }
}

fn text_field(name: &'static str, value: String) -> FormField {
    FormField {
        name,
        value: FieldValue::Text(value),
    }
}
