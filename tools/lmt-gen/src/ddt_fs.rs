// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Filesystem definition source (`lmt_ddt_fs.c`).
//!
//! The file is built in steps: [`DdtFsSource::create`] writes the preamble,
//! then one append per partition. The build system decides the order; a
//! step only appends after the partition macros were found in
//! `pm_config.h`.
//!
//! ```no_run
//! use lmt_gen::ddt_fs::{DdtFsSource, LittleFsMount, NvsStore};
//! use std::path::Path;
//!
//! # fn main() -> Result<(), lmt_gen::ddt_fs::DdtFsError> {
//! let pm_config = Path::new("build/zephyr/include/generated/pm_config.h");
//! let source = DdtFsSource::create(Path::new("build/generated"))?;
//! source.append_littlefs(pm_config, &LittleFsMount {
//!     partition: "littlefs_storage".into(),
//!     config_var: "lfs_data".into(),
//!     mount_var: "lfs_mnt".into(),
//!     mount_point: "/lfs".into(),
//! })?;
//! source.append_nvs(pm_config, &NvsStore {
//!     partition: "nvs_storage".into(),
//!     fs_name: "nvs_fs".into(),
//! })?;
//! # Ok(())
//! # }
//! ```

use crate::partition::{self, PartitionError, PartitionMacros};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the generated file inside the output directory.
pub const SOURCE_FILE_NAME: &str = "lmt_ddt_fs.c";

/// Flash sector size assumed for NVS partitions.
pub const NVS_SECTOR_SIZE: u32 = 4096;

const PREAMBLE: &str = "\
/*
 * LMT DDT FS definitions
 */

#include <zephyr/fs/fs.h>
#include <zephyr/fs/nvs.h>
#include <zephyr/fs/littlefs.h>

";

/// Emitter errors.
#[derive(Debug, Error)]
pub enum DdtFsError {
    #[error(transparent)]
    Partition(#[from] PartitionError),

    #[error("failed to write {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// LittleFS mount to declare.
#[derive(Debug, Clone)]
pub struct LittleFsMount {
    pub partition: String,
    /// Variable for the `fs_littlefs` config.
    pub config_var: String,
    /// Variable for the `fs_mount_t`.
    pub mount_var: String,
    pub mount_point: String,
}

impl LittleFsMount {
    /// Render the fragment appended for this mount.
    #[must_use]
    pub fn render(&self) -> String {
        let Self {
            partition,
            config_var,
            mount_var,
            mount_point,
        } = self;
        format!(
            "
// Partition '{partition}' LittleFS config
FS_LITTLEFS_DECLARE_DEFAULT_CONFIG({config_var});

struct fs_mount_t {mount_var} = {{
    .type = FS_LITTLEFS,
    .fs_data = &{config_var},
    .storage_dev = (void *)FIXED_PARTITION_ID({partition}),
    .mnt_point = \"{mount_point}\",
}};
"
        )
    }
}

/// NVS filesystem to declare.
#[derive(Debug, Clone)]
pub struct NvsStore {
    pub partition: String,
    /// Variable for the `nvs_fs`.
    pub fs_name: String,
}

impl NvsStore {
    /// Render the fragment appended for this store.
    #[must_use]
    pub fn render(&self) -> String {
        let partition = &self.partition;
        let fs_name = &self.fs_name;
        let pm = partition::macro_prefix(partition);
        format!(
            "
// Partition '{partition}' NVS FS definition
#define NVS_PARTITION {partition}
#define NVS_PARTITION_DEVICE FIXED_PARTITION_DEVICE(NVS_PARTITION)
#define NVS_PARTITION_OFFSET FIXED_PARTITION_OFFSET(NVS_PARTITION)
#define NVS_PARTITION_SECTOR_SIZE {NVS_SECTOR_SIZE}

struct nvs_fs {fs_name} = {{
    .flash_device = NVS_PARTITION_DEVICE,
//    .offset = {pm}_ADDRESS,
    .offset = NVS_PARTITION_OFFSET,
    .sector_size = NVS_PARTITION_SECTOR_SIZE,
    .sector_count = {pm}_SIZE / NVS_PARTITION_SECTOR_SIZE,
}};
"
        )
    }
}

/// Handle to the generated source file.
#[derive(Debug, Clone)]
pub struct DdtFsSource {
    path: PathBuf,
}

impl DdtFsSource {
    /// Start a fresh file in `output_dir`, replacing any previous one.
    pub fn create(output_dir: &Path) -> Result<Self, DdtFsError> {
        let source = Self::open(output_dir)?;
        fs::write(&source.path, PREAMBLE).map_err(|e| source.io_error(e))?;
        tracing::debug!("Wrote preamble to {}", source.path.display());
        Ok(source)
    }

    /// Handle to the file in `output_dir` for appending.
    ///
    /// The directory is created if needed; the file itself is created by the
    /// first append if [`create`](Self::create) has not run.
    pub fn open(output_dir: &Path) -> Result<Self, DdtFsError> {
        fs::create_dir_all(output_dir).map_err(|source| DdtFsError::Io {
            path: output_dir.to_path_buf(),
            source,
        })?;
        Ok(Self {
            path: output_dir.join(SOURCE_FILE_NAME),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append the LittleFS config and mount structs for `mount`.
    ///
    /// Only the presence of the partition macros is checked; their values
    /// are not used.
    pub fn append_littlefs(
        &self,
        pm_config: &Path,
        mount: &LittleFsMount,
    ) -> Result<PartitionMacros, DdtFsError> {
        let macros = partition::find_partition_macros(pm_config, &mount.partition)?;
        self.append(&mount.render())?;
        Ok(macros)
    }

    /// Append the NVS struct for `store`.
    pub fn append_nvs(
        &self,
        pm_config: &Path,
        store: &NvsStore,
    ) -> Result<PartitionMacros, DdtFsError> {
        let macros = partition::find_partition_macros(pm_config, &store.partition)?;
        self.append(&store.render())?;
        Ok(macros)
    }

    fn append(&self, fragment: &str) -> Result<(), DdtFsError> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| self.io_error(e))?;
        file.write_all(fragment.as_bytes())
            .map_err(|e| self.io_error(e))
    }

    fn io_error(&self, source: std::io::Error) -> DdtFsError {
        DdtFsError::Io {
            path: self.path.clone(),
            source,
        }
    }
}
