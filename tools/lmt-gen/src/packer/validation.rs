// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

use super::config::PackerConfig;
use regex::Regex;
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::fmt;
use std::sync::OnceLock;

/// A required field that is present but unusable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldIssue {
    pub field: String,
    pub reason: String,
}

impl fmt::Display for FieldIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.field, self.reason)
    }
}

/// Outcome of required field validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldCheck {
    Missing(Vec<String>),
    Invalid(Vec<FieldIssue>),
}

#[allow(clippy::expect_used)] // constant pattern
fn key_pattern() -> &'static Regex {
    static KEY_RE: OnceLock<Regex> = OnceLock::new();
    KEY_RE.get_or_init(|| Regex::new(r#"["']([^"']+)["']\s*:"#).expect("valid key regex"))
}

/// Scan raw JSON text for quoted keys that appear more than once.
///
/// This runs on the text, not on a parsed document, so it sees repeats a
/// parser would collapse. Each duplicated key is listed once, in order of
/// its first repeat.
#[must_use]
pub fn find_duplicate_keys(raw: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut duplicates: Vec<String> = Vec::new();

    for caps in key_pattern().captures_iter(raw) {
        let key = &caps[1];
        if !seen.insert(key.to_string()) && !duplicates.iter().any(|d| d == key) {
            duplicates.push(key.to_string());
        }
    }

    duplicates
}

/// Interpret a JSON value as a TCP/UDP port (1-65535).
///
/// Integers, integral-looking strings and floats (truncated) are accepted.
pub fn parse_port(value: &Value) -> Result<u16, String> {
    let shown = super::blob::render_value(value);
    let number = match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        // `true` would otherwise pass as port 1; a boolean port is a config typo.
        _ => None,
    };

    let Some(number) = number else {
        return Err(format!("must be a valid integer port, got: {shown}"));
    };

    match u16::try_from(number) {
        Ok(port) if port >= 1 => Ok(port),
        _ => Err(format!("must be valid port 1-65535, got: {shown}")),
    }
}

/// Check the mandatory document against the required field list.
///
/// Missing fields take precedence over invalid ones.
pub fn check_required_fields(
    doc: &Map<String, Value>,
    config: &PackerConfig,
) -> Result<(), FieldCheck> {
    let mut missing = Vec::new();
    let mut invalid = Vec::new();

    for field in &config.required_fields {
        let Some(value) = doc.get(field) else {
            missing.push(field.clone());
            continue;
        };

        if *field == config.port_field {
            if let Err(reason) = parse_port(value) {
                invalid.push(FieldIssue {
                    field: field.clone(),
                    reason,
                });
            }
        } else if !matches!(value, Value::String(s) if !s.trim().is_empty()) {
            invalid.push(FieldIssue {
                field: field.clone(),
                reason: "empty or invalid string".to_string(),
            });
        }
    }

    if !missing.is_empty() {
        return Err(FieldCheck::Missing(missing));
    }
    if !invalid.is_empty() {
        return Err(FieldCheck::Invalid(invalid));
    }
    Ok(())
}
