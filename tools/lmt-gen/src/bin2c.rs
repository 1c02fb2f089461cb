// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Binary file to C array converter.
//!
//! Produces a `<var>_array.c` / `<var>_array.h` pair declaring a `uint8_t`
//! array holding the input bytes and an `unsigned int` length symbol.

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Number of byte values per initializer line.
pub const BYTES_PER_LINE: usize = 12;

/// Converter errors.
#[derive(Debug, Error)]
pub enum Bin2cError {
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Files written by [`write_array_pair`].
#[derive(Debug, Clone)]
pub struct GeneratedPair {
    pub source: PathBuf,
    pub header: PathBuf,
    pub len: usize,
}

/// Render bytes as the body of a C array initializer.
///
/// Values are `0xNN` (uppercase), twelve per line, each line indented by
/// four spaces, lines joined with `,\n`. Empty input renders as an empty
/// string.
#[must_use]
pub fn render_c_array(data: &[u8]) -> String {
    data.chunks(BYTES_PER_LINE)
        .map(|chunk| {
            let values = chunk
                .iter()
                .map(|b| format!("0x{b:02X}"))
                .collect::<Vec<_>>()
                .join(", ");
            format!("    {values}")
        })
        .collect::<Vec<_>>()
        .join(",\n")
}

fn base_name(var_name: &str) -> String {
    format!("{var_name}_array")
}

/// Render the `.c` file defining `var_name` and `var_name_len`.
#[must_use]
pub fn render_source(var_name: &str, data: &[u8]) -> String {
    let base = base_name(var_name);
    let len = data.len();
    format!(
        "#include <stdint.h>\n#include \"{base}.h\"\n\nconst uint8_t {var_name}[{len}] = {{\n{}\n}};\n\nconst unsigned int {var_name}_len = {len};\n",
        render_c_array(data)
    )
}

/// Render the `.h` file declaring both symbols as `extern`.
#[must_use]
pub fn render_header(var_name: &str) -> String {
    let guard = format!("{}_H", base_name(var_name).to_uppercase());
    format!(
        "#ifndef {guard}\n#define {guard}\n\n#include <stdint.h>\n\nextern const uint8_t {var_name}[];\nextern const unsigned int {var_name}_len;\n\n#endif\n"
    )
}

/// Read `input` and write `<var_name>_array.{c,h}` into `output_dir`.
///
/// The output directory is created if missing.
pub fn write_array_pair(
    input: &Path,
    var_name: &str,
    output_dir: &Path,
) -> Result<GeneratedPair, Bin2cError> {
    let data = fs::read(input).map_err(|source| Bin2cError::Read {
        path: input.to_path_buf(),
        source,
    })?;

    fs::create_dir_all(output_dir).map_err(|source| Bin2cError::Write {
        path: output_dir.to_path_buf(),
        source,
    })?;

    let base = base_name(var_name);
    let source_path = output_dir.join(format!("{base}.c"));
    let header_path = output_dir.join(format!("{base}.h"));

    tracing::debug!("Converting {} ({} bytes)", input.display(), data.len());

    fs::write(&source_path, render_source(var_name, &data)).map_err(|source| {
        Bin2cError::Write {
            path: source_path.clone(),
            source,
        }
    })?;
    fs::write(&header_path, render_header(var_name)).map_err(|source| Bin2cError::Write {
        path: header_path.clone(),
        source,
    })?;

    Ok(GeneratedPair {
        source: source_path,
        header: header_path,
        len: data.len(),
    })
}
