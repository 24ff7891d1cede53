// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Insignificant whitespace removal.

use crate::error::Position;

/// Text with insignificant whitespace removed, remembering where each kept
/// byte came from.
#[derive(Debug, Clone)]
pub struct Compacted<'a> {
    source: &'a str,
    text: String,
    /// Source byte offset of every byte of `text`.
    origin: Vec<usize>,
}

impl<'a> Compacted<'a> {
    /// Strip JSON whitespace outside string literals.
    ///
    /// Escapes inside strings are honored, so `"a\" b"` keeps its space.
    pub fn new(source: &'a str) -> Self {
        let mut text = String::with_capacity(source.len());
        let mut origin = Vec::with_capacity(source.len());
        let mut in_string = false;
        let mut escaped = false;

        for (offset, c) in source.char_indices() {
            if in_string {
                if escaped {
                    escaped = false;
                } else if c == '\\' {
                    escaped = true;
                } else if c == '"' {
                    in_string = false;
                }
            } else if matches!(c, ' ' | '\t' | '\n' | '\r') {
                continue;
            } else if c == '"' {
                in_string = true;
            }
            text.push(c);
            origin.extend(std::iter::repeat(offset).take(c.len_utf8()));
        }

        Self {
            source,
            text,
            origin,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Position of a byte offset into the compacted text, with line and
    /// column resolved against the source.
    pub fn position(&self, offset: usize) -> Position {
        let source_offset = match self.origin.get(offset) {
            Some(&o) => o,
            None => self.source.len(),
        };
        let before = &self.source[..source_offset];
        let line = before.matches('\n').count() + 1;
        let line_start = before.rfind('\n').map(|i| i + 1).unwrap_or(0);
        let column = before[line_start..].chars().count() + 1;
        Position {
            offset,
            line,
            column,
        }
    }

    /// Byte offset into the compacted text for a serde_json line/column.
    ///
    /// serde_json reports 1-based lines and the column of the last byte read,
    /// 0 when the error is at the start of a line.
    pub fn offset_of(&self, line: usize, column: usize) -> usize {
        let mut start = 0;
        for _ in 1..line {
            match self.text[start..].find('\n') {
                Some(i) => start += i + 1,
                None => return self.text.len(),
            }
        }
        (start + column.saturating_sub(1)).min(self.text.len())
    }
}
