// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! JSON configuration packer.
//!
//! Reads `COAP.json` (mandatory), `Settings.json` and `Application.json`
//! (optional) from one directory and packs every key/value pair into a
//! [`PackedBlob`] bounded by a maximum size.
//!
//! Processing order per file:
//! 1. mandatory file only: raw-text duplicate key scan
//! 2. JSON parse (fatal for the mandatory file, skipped otherwise)
//! 3. mandatory file only: required field validation
//! 4. pairs appended under the size ceiling, keys tracked across files
//!
//! Cross-file key collisions are reported once every file has been read.

mod blob;
mod config;
mod validation;

pub use blob::{render_value, BlobBuilder, PackedBlob};
pub use config::{empty_blob_is_fatal, ConfigError, PackerConfig, DOCKER_ENV_FLAG};
pub use validation::{check_required_fields, find_duplicate_keys, parse_port, FieldCheck, FieldIssue};

use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// A key defined by two different files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyCollision {
    pub key: String,
    pub first_file: String,
    pub second_file: String,
}

impl fmt::Display for KeyCollision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "'{}' found in both {} and {}",
            self.key, self.first_file, self.second_file
        )
    }
}

/// Packer errors. Every variant aborts the run.
#[derive(Debug, Error)]
pub enum PackError {
    #[error("required file {file} not found in {}", .dir.display())]
    MandatoryFileMissing { file: String, dir: PathBuf },

    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("duplicate keys found in {file}: {}", .keys.join(", "))]
    DuplicateKeys { file: String, keys: Vec<String> },

    #[error("{file} is required and must be valid JSON: {message}")]
    InvalidJson { file: String, message: String },

    #[error("missing required fields in {file}: {}", .fields.join(", "))]
    MissingFields { file: String, fields: Vec<String> },

    #[error("invalid field values in {file}: {}", join_display(.issues))]
    InvalidFields {
        file: String,
        issues: Vec<FieldIssue>,
    },

    #[error("adding '{key}' would exceed {max_size} bytes")]
    PairExceedsLimit { key: String, max_size: usize },

    #[error("final null byte would exceed {max_size} bytes")]
    TerminatorExceedsLimit { max_size: usize },

    #[error("duplicate keys found across JSON files: {}", join_display(.collisions))]
    KeyCollisions { collisions: Vec<KeyCollision> },

    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

fn join_display<T: fmt::Display>(items: &[T]) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Result of a successful pack.
#[derive(Debug, Clone)]
pub struct PackReport {
    pub blob: PackedBlob,
    /// Files that were found, in processing order.
    pub files: Vec<String>,
    pub unique_keys: usize,
}

/// Packs a configuration directory into a blob.
#[derive(Debug, Clone)]
pub struct JsonPacker {
    config: PackerConfig,
    max_size: usize,
}

impl JsonPacker {
    pub fn new(config: PackerConfig, max_size: usize) -> Self {
        Self { config, max_size }
    }

    /// Packer with the standard file set.
    pub fn with_defaults(max_size: usize) -> Self {
        Self::new(PackerConfig::default(), max_size)
    }

    pub fn config(&self) -> &PackerConfig {
        &self.config
    }

    /// Pack `input_dir`. Nothing is written.
    pub fn pack(&self, input_dir: &Path) -> Result<PackReport, PackError> {
        let mut builder = BlobBuilder::new(self.max_size);
        let mut owners: HashMap<String, String> = HashMap::new();
        let mut collisions = Vec::new();
        let mut files = Vec::new();

        for fname in self.config.files() {
            let mandatory = fname == self.config.mandatory_file;
            let path = input_dir.join(fname);

            if !path.is_file() {
                if mandatory {
                    return Err(PackError::MandatoryFileMissing {
                        file: fname.to_string(),
                        dir: input_dir.to_path_buf(),
                    });
                }
                tracing::info!("Optional file {} not found - skipping", fname);
                continue;
            }

            tracing::info!("File: {}", path.display());
            let raw = std::fs::read_to_string(&path).map_err(|source| PackError::Read {
                path: path.clone(),
                source,
            })?;

            let doc = if mandatory {
                self.load_mandatory(fname, &raw)?
            } else {
                match parse_object(&raw) {
                    Ok(doc) => doc,
                    Err(message) => {
                        tracing::warn!("Skipping {}: Invalid JSON. Error: {}", fname, message);
                        continue;
                    }
                }
            };
            files.push(fname.to_string());

            for (key, value) in &doc {
                match owners.get(key) {
                    Some(first) => collisions.push(KeyCollision {
                        key: key.clone(),
                        first_file: first.clone(),
                        second_file: fname.to_string(),
                    }),
                    None => {
                        owners.insert(key.clone(), fname.to_string());
                    }
                }

                let rendered = render_value(value);
                tracing::debug!("{} = {}", key, rendered);
                builder.push_pair(key, &rendered)?;
            }
        }

        if !collisions.is_empty() {
            return Err(PackError::KeyCollisions { collisions });
        }

        let blob = builder.finish()?;
        Ok(PackReport {
            blob,
            files,
            unique_keys: owners.len(),
        })
    }

    /// Pack `input_dir` and write the blob to `output`.
    pub fn pack_to_file(&self, input_dir: &Path, output: &Path) -> Result<PackReport, PackError> {
        let report = self.pack(input_dir)?;
        report.blob.write_to(output)?;
        Ok(report)
    }

    fn load_mandatory(&self, fname: &str, raw: &str) -> Result<Map<String, Value>, PackError> {
        let duplicates = find_duplicate_keys(raw);
        if !duplicates.is_empty() {
            return Err(PackError::DuplicateKeys {
                file: fname.to_string(),
                keys: duplicates,
            });
        }

        let doc = parse_object(raw).map_err(|message| PackError::InvalidJson {
            file: fname.to_string(),
            message,
        })?;

        match check_required_fields(&doc, &self.config) {
            Ok(()) => {}
            Err(FieldCheck::Missing(fields)) => {
                return Err(PackError::MissingFields {
                    file: fname.to_string(),
                    fields,
                })
            }
            Err(FieldCheck::Invalid(issues)) => {
                return Err(PackError::InvalidFields {
                    file: fname.to_string(),
                    issues,
                })
            }
        }

        tracing::info!(
            "{} validation PASSED - all required fields present and no duplicates",
            fname
        );
        Ok(doc)
    }
}

fn parse_object(raw: &str) -> Result<Map<String, Value>, String> {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err("top-level value is not an object".to_string()),
        Err(e) => Err(e.to_string()),
    }
}

#[cfg(test)]
mod tests;
