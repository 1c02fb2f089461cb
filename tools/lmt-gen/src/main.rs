// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! LMT firmware build generators CLI
//!
//! Each subcommand is one build step, invoked by the firmware build system.
//!
//! # Usage
//!
//! ```bash
//! # Embed a binary as a C array
//! lmt-gen bin2c certs/root_ca.der root_ca -o build/generated
//!
//! # Pack JSON configuration for the settings partition
//! lmt-gen json-bin --input-dir etc --output-file build/config.bin --max-size 4096
//!
//! # Filesystem definitions, in order
//! lmt-gen fs-start build/generated
//! lmt-gen fs-littlefs build/generated pm_config.h littlefs_storage lfs_data lfs_mnt /lfs
//! lmt-gen fs-nvs build/generated pm_config.h nvs_storage nvs_fs
//! ```

use anyhow::Context;
use clap::{Parser, Subcommand};
use lmt_gen::ddt_fs::{DdtFsSource, LittleFsMount, NvsStore};
use lmt_gen::packer::{self, JsonPacker, PackerConfig};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Exit status when the packed configuration holds no keys.
const EXIT_NO_DATA: u8 = 2;

/// LMT firmware build generators
#[derive(Parser, Debug)]
#[command(name = "lmt-gen")]
#[command(about = "Build-time code generators for LMT firmware images")]
#[command(version)]
struct Args {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Convert a binary file to C array source and header files
    Bin2c {
        /// Path to input binary file
        #[arg(value_name = "INPUT_FILE")]
        input: PathBuf,

        /// Name of the generated C array variable
        var_name: String,

        /// Output directory for generated .c and .h files
        #[arg(short, long, default_value = ".")]
        output_dir: PathBuf,
    },

    /// Pack COAP, Settings and Application JSON key/value pairs into a
    /// binary file of C strings (key\0value\0...)
    JsonBin {
        /// Directory containing COAP.json, Settings.json and Application.json
        #[arg(long)]
        input_dir: PathBuf,

        /// Path to output binary file
        #[arg(long)]
        output_file: PathBuf,

        /// Maximum allowed size of the output file in bytes
        #[arg(long)]
        max_size: usize,

        /// Packer configuration (TOML) overriding file names and required fields
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Start lmt_ddt_fs.c with its includes
    FsStart {
        /// Directory where lmt_ddt_fs.c is generated
        output_dir: PathBuf,
    },

    /// Append LittleFS config structs for a partition
    FsLittlefs {
        /// Directory where lmt_ddt_fs.c is generated
        output_dir: PathBuf,

        /// Path to generated pm_config.h
        pm_config_h: PathBuf,

        /// Partition name (e.g. littlefs_storage)
        partition: String,

        /// C variable name for the fs_littlefs struct
        config_var: String,

        /// C variable name for the fs_mount_t struct
        mount_var: String,

        /// Filesystem mount point (e.g. /lfs)
        mount_point: String,
    },

    /// Append an NVS filesystem struct for a partition
    FsNvs {
        /// Directory where lmt_ddt_fs.c is generated
        output_dir: PathBuf,

        /// Path to generated pm_config.h
        pm_config_h: PathBuf,

        /// Partition name (e.g. nvs_storage)
        partition: String,

        /// C variable name for the nvs_fs struct
        nvs_fs_name: String,
    },
}

fn main() -> ExitCode {
    let args = Args::parse();

    let filter = EnvFilter::try_new(&args.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    match run(args.command) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("[ERROR] {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(command: Commands) -> anyhow::Result<ExitCode> {
    match command {
        Commands::Bin2c {
            input,
            var_name,
            output_dir,
        } => cmd_bin2c(&input, &var_name, &output_dir)?,
        Commands::JsonBin {
            input_dir,
            output_file,
            max_size,
            config,
        } => return cmd_json_bin(&input_dir, &output_file, max_size, config.as_deref()),
        Commands::FsStart { output_dir } => cmd_fs_start(&output_dir)?,
        Commands::FsLittlefs {
            output_dir,
            pm_config_h,
            partition,
            config_var,
            mount_var,
            mount_point,
        } => {
            let mount = LittleFsMount {
                partition,
                config_var,
                mount_var,
                mount_point,
            };
            cmd_fs_littlefs(&output_dir, &pm_config_h, &mount)?;
        }
        Commands::FsNvs {
            output_dir,
            pm_config_h,
            partition,
            nvs_fs_name,
        } => {
            let store = NvsStore {
                partition,
                fs_name: nvs_fs_name,
            };
            cmd_fs_nvs(&output_dir, &pm_config_h, &store)?;
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn cmd_bin2c(input: &Path, var_name: &str, output_dir: &Path) -> anyhow::Result<()> {
    let pair = lmt_gen::write_array_pair(input, var_name, output_dir)?;
    println!(
        "[OK] Generated {} and {} ({} bytes)",
        pair.source.display(),
        pair.header.display(),
        pair.len
    );
    Ok(())
}

fn cmd_json_bin(
    input_dir: &Path,
    output_file: &Path,
    max_size: usize,
    config: Option<&Path>,
) -> anyhow::Result<ExitCode> {
    let config = match config {
        Some(path) => PackerConfig::from_file(path)
            .with_context(|| format!("failed to load packer config {}", path.display()))?,
        None => PackerConfig::default(),
    };

    let packer = JsonPacker::new(config, max_size);
    let report = packer.pack_to_file(input_dir, output_file)?;

    if report.blob.is_empty() {
        println!(
            "[WARN] No valid configuration settings in {}/*.json!",
            input_dir.display()
        );
        let flag = std::env::var(packer::DOCKER_ENV_FLAG).ok();
        if packer::empty_blob_is_fatal(flag.as_deref()) {
            return Ok(ExitCode::from(EXIT_NO_DATA));
        }
    }

    println!(
        "[OK] Successfully written to {} ({} bytes).",
        output_file.display(),
        report.blob.len()
    );
    println!(
        "[OK] Processed {} unique keys from {} files.",
        report.unique_keys,
        report.files.len()
    );
    Ok(ExitCode::SUCCESS)
}

fn cmd_fs_start(output_dir: &Path) -> anyhow::Result<()> {
    let source = DdtFsSource::create(output_dir)?;
    println!("[OK] Generated start of C file: {}", source.path().display());
    Ok(())
}

fn cmd_fs_littlefs(output_dir: &Path, pm_config: &Path, mount: &LittleFsMount) -> anyhow::Result<()> {
    let source = DdtFsSource::open(output_dir)?;
    source.append_littlefs(pm_config, mount)?;
    println!(
        "[OK] Appended LittleFS structs for partition '{}' to {}",
        mount.partition,
        source.path().display()
    );
    Ok(())
}

fn cmd_fs_nvs(output_dir: &Path, pm_config: &Path, store: &NvsStore) -> anyhow::Result<()> {
    let source = DdtFsSource::open(output_dir)?;
    let macros = source.append_nvs(pm_config, store)?;
    tracing::debug!(
        "NVS partition {} at {} ({} bytes)",
        macros.id(),
        macros.address(),
        macros.size()
    );
    println!(
        "[OK] Appended NVS FS struct '{}' for partition '{}' to {}",
        store.fs_name,
        store.partition,
        source.path().display()
    );
    Ok(())
}
