// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Null-terminated key/value blob.
//!
//! Layout: `key\0value\0key\0value\0...\0`. The trailing zero marks the end
//! of the table for the firmware reader.

use super::PackError;
use serde_json::Value;
use std::path::Path;

/// Render a JSON value the way it is stored in the blob.
///
/// Strings are stored without quotes. Numbers keep their source text.
/// Booleans and null use the `True` / `False` / `None` spelling the firmware
/// settings reader expects, and arrays and objects use the matching literal
/// form (`[1, 'a']`, `{'k': True}`).
#[must_use]
pub fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        _ => {
            let mut out = String::new();
            write_literal(&mut out, value);
            out
        }
    }
}

fn write_literal(out: &mut String, value: &Value) {
    match value {
        Value::String(s) => write_quoted(out, s),
        Value::Number(n) => out.push_str(&n.to_string()),
        Value::Bool(true) => out.push_str("True"),
        Value::Bool(false) => out.push_str("False"),
        Value::Null => out.push_str("None"),
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_literal(out, item);
            }
            out.push(']');
        }
        Value::Object(map) => {
            out.push('{');
            for (i, (key, item)) in map.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_quoted(out, key);
                out.push_str(": ");
                write_literal(out, item);
            }
            out.push('}');
        }
    }
}

/// Single quotes unless the text holds a single quote and no double quote.
fn write_quoted(out: &mut String, s: &str) {
    let quote = if s.contains('\'') && !s.contains('"') {
        '"'
    } else {
        '\''
    };
    out.push(quote);
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c if (c as u32) < 0x20 || c as u32 == 0x7f => {
                out.push_str(&format!("\\x{:02x}", c as u32));
            }
            c => out.push(c),
        }
    }
    out.push(quote);
}

/// Size-bounded blob accumulator.
#[derive(Debug)]
pub struct BlobBuilder {
    buf: Vec<u8>,
    max_size: usize,
    pairs: usize,
}

impl BlobBuilder {
    pub fn new(max_size: usize) -> Self {
        Self {
            buf: Vec::new(),
            max_size,
            pairs: 0,
        }
    }

    /// Bytes accumulated so far.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Append one pair, keeping room for the final terminator.
    pub fn push_pair(&mut self, key: &str, value: &str) -> Result<(), PackError> {
        let needed = key.len() + 1 + value.len() + 1;
        if self.buf.len() + needed + 1 > self.max_size {
            return Err(PackError::PairExceedsLimit {
                key: key.to_string(),
                max_size: self.max_size,
            });
        }

        self.buf.extend_from_slice(key.as_bytes());
        self.buf.push(0);
        self.buf.extend_from_slice(value.as_bytes());
        self.buf.push(0);
        self.pairs += 1;
        Ok(())
    }

    /// Append the final terminator.
    pub fn finish(mut self) -> Result<PackedBlob, PackError> {
        if self.buf.len() + 1 > self.max_size {
            return Err(PackError::TerminatorExceedsLimit {
                max_size: self.max_size,
            });
        }
        self.buf.push(0);
        Ok(PackedBlob {
            bytes: self.buf,
            pairs: self.pairs,
        })
    }
}

/// A finished blob, terminator included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackedBlob {
    bytes: Vec<u8>,
    pairs: usize,
}

impl PackedBlob {
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Number of key/value pairs.
    pub fn pairs(&self) -> usize {
        self.pairs
    }

    /// True when the blob holds only the terminator.
    pub fn is_empty(&self) -> bool {
        self.bytes.len() == 1
    }

    /// Write the blob with a single write call.
    pub fn write_to(&self, path: &Path) -> Result<(), PackError> {
        std::fs::write(path, &self.bytes).map_err(|source| PackError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Decode back into key/value pairs.
    pub fn entries(&self) -> Vec<(String, String)> {
        let body = self.bytes.strip_suffix(&[0u8]).unwrap_or(&self.bytes);
        let mut fields = body
            .split(|b| *b == 0)
            .map(|s| String::from_utf8_lossy(s).into_owned());
        let mut out = Vec::with_capacity(self.pairs);
        while let (Some(k), Some(v)) = (fields.next(), fields.next()) {
            out.push((k, v));
        }
        out
    }
}
