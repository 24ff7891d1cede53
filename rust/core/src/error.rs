// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for patch document decoding.

use serde::Serialize;

/// Result type alias for document-level decoding.
pub type Result<T> = std::result::Result<T, Error>;

/// Where in the submitted text a parse failure happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Position {
    /// Byte offset into the whitespace-compacted text.
    pub offset: usize,
    /// 1-based line in the text as submitted.
    pub line: usize,
    /// 1-based column (in characters) in the text as submitted.
    pub column: usize,
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "offset {} (line {}, column {})",
            self.offset, self.line, self.column
        )
    }
}

/// Errors that prevent a patch document from being decoded at all.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    /// The text is not valid JSON.
    #[error("parse error at {position}: {message}")]
    Parse { position: Position, message: String },

    /// The text is JSON, but not an object of sections.
    #[error("invalid patch document: {0}")]
    InvalidDocument(String),
}

impl Error {
    pub fn position(&self) -> Option<Position> {
        match self {
            Error::Parse { position, .. } => Some(*position),
            Error::InvalidDocument(_) => None,
        }
    }
}

/// Why a single record inside a section was skipped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "kind", content = "detail", rename_all = "camelCase")]
pub enum RecordError {
    #[error("record is not an object")]
    NotAnObject,

    #[error("missing field `{0}`")]
    MissingField(&'static str),

    #[error("field `{field}` {reason}")]
    InvalidField { field: String, reason: String },

    /// An attribute record carried only `nodeId`.
    #[error("record names no attribute")]
    NoAttribute,

    #[error("malformed record: {0}")]
    Malformed(String),
}

impl RecordError {
    pub(crate) fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        RecordError::InvalidField {
            field: field.into(),
            reason: reason.into(),
        }
    }
}
