// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Partition macro lookup in a partition-manager header.
//!
//! The partition manager emits lines such as:
//!
//! ```text
//! #define PM_LITTLEFS_STORAGE_ADDRESS 0xf8000
//! #define PM_LITTLEFS_STORAGE_SIZE 0x6000
//! #define PM_LITTLEFS_STORAGE_ID 7
//! ```
//!
//! [`find_partition_macros`] collects the three values for one partition.

use regex::Regex;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Macro suffix following `PM_<PARTITION>_`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MacroSuffix {
    Address,
    Size,
    Id,
}

impl MacroSuffix {
    /// All suffixes, in reporting order.
    pub const ALL: [MacroSuffix; 3] = [MacroSuffix::Address, MacroSuffix::Size, MacroSuffix::Id];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            MacroSuffix::Address => "ADDRESS",
            MacroSuffix::Size => "SIZE",
            MacroSuffix::Id => "ID",
        }
    }

    fn from_capture(s: &str) -> Option<Self> {
        match s {
            "ADDRESS" => Some(MacroSuffix::Address),
            "SIZE" => Some(MacroSuffix::Size),
            "ID" => Some(MacroSuffix::Id),
            _ => None,
        }
    }
}

impl fmt::Display for MacroSuffix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lookup errors.
#[derive(Debug, Error)]
pub enum PartitionError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("partition '{partition}' missing macros: {} in {header}", join_suffixes(.missing))]
    MissingMacros {
        partition: String,
        header: String,
        missing: Vec<MacroSuffix>,
    },

    #[error("invalid macro pattern for partition '{partition}': {source}")]
    Pattern {
        partition: String,
        #[source]
        source: regex::Error,
    },
}

fn join_suffixes(suffixes: &[MacroSuffix]) -> String {
    suffixes
        .iter()
        .map(|s| s.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Literal values of the `PM_<PARTITION>_{ADDRESS,SIZE,ID}` macros.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionMacros {
    pub partition: String,
    values: BTreeMap<MacroSuffix, String>,
}

impl PartitionMacros {
    #[must_use]
    pub fn get(&self, suffix: MacroSuffix) -> &str {
        // Construction guarantees all three entries.
        self.values.get(&suffix).map_or("", String::as_str)
    }

    #[must_use]
    pub fn address(&self) -> &str {
        self.get(MacroSuffix::Address)
    }

    #[must_use]
    pub fn size(&self) -> &str {
        self.get(MacroSuffix::Size)
    }

    #[must_use]
    pub fn id(&self) -> &str {
        self.get(MacroSuffix::Id)
    }

    /// Suffix to value mapping, in `ADDRESS, SIZE, ID` order.
    pub fn iter(&self) -> impl Iterator<Item = (MacroSuffix, &str)> {
        self.values.iter().map(|(k, v)| (*k, v.as_str()))
    }
}

/// Macro name prefix used in emitted C code: `PM_<PARTITION>` uppercased.
///
/// Unlike the lookup pattern, this is not escaped.
#[must_use]
pub fn macro_prefix(partition: &str) -> String {
    format!("PM_{}", partition.to_uppercase())
}

fn macro_pattern(partition: &str) -> Result<Regex, PartitionError> {
    let pattern = format!(
        r"^#define\s+PM_{}_(ADDRESS|SIZE|ID)\s+(\S+)",
        regex::escape(&partition.to_uppercase())
    );
    Regex::new(&pattern).map_err(|source| PartitionError::Pattern {
        partition: partition.to_string(),
        source,
    })
}

/// Extract the partition macros from header text.
///
/// `origin` names the header in error messages. A macro defined more than
/// once keeps its last value.
pub fn parse_partition_macros(
    header: &str,
    partition: &str,
    origin: &str,
) -> Result<PartitionMacros, PartitionError> {
    let re = macro_pattern(partition)?;
    let mut values = BTreeMap::new();

    for line in header.lines() {
        let Some(caps) = re.captures(line) else {
            continue;
        };
        if let Some(suffix) = MacroSuffix::from_capture(&caps[1]) {
            tracing::debug!("{}_{} = {}", macro_prefix(partition), suffix, &caps[2]);
            values.insert(suffix, caps[2].to_string());
        }
    }

    let missing: Vec<MacroSuffix> = MacroSuffix::ALL
        .into_iter()
        .filter(|s| !values.contains_key(s))
        .collect();

    if !missing.is_empty() {
        return Err(PartitionError::MissingMacros {
            partition: partition.to_string(),
            header: origin.to_string(),
            missing,
        });
    }

    Ok(PartitionMacros {
        partition: partition.to_string(),
        values,
    })
}

/// Read `pm_config` and extract the macros for `partition`.
pub fn find_partition_macros(
    pm_config: &Path,
    partition: &str,
) -> Result<PartitionMacros, PartitionError> {
    let header = std::fs::read_to_string(pm_config).map_err(|source| PartitionError::Io {
        path: pm_config.to_path_buf(),
        source,
    })?;
    parse_partition_macros(&header, partition, &pm_config.display().to_string())
}
