// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Build-time generators for LMT firmware images.
//!
//! # Generators
//!
//! - [`bin2c`]: binary file to `uint8_t` C array source/header pair
//! - [`packer`]: `COAP.json` / `Settings.json` / `Application.json` to a
//!   null-terminated key/value blob
//! - [`partition`]: `PM_<PARTITION>_{ADDRESS,SIZE,ID}` lookup in `pm_config.h`
//! - [`ddt_fs`]: LittleFS and NVS struct definitions in `lmt_ddt_fs.c`
//!
//! # Usage
//!
//! ```bash
//! lmt-gen bin2c certs/root_ca.der root_ca -o build/generated
//! lmt-gen json-bin --input-dir etc --output-file build/config.bin --max-size 4096
//! lmt-gen fs-start build/generated
//! lmt-gen fs-littlefs build/generated pm_config.h littlefs_storage lfs_data lfs_mnt /lfs
//! lmt-gen fs-nvs build/generated pm_config.h nvs_storage nvs_fs
//! ```

pub mod bin2c;
pub mod ddt_fs;
pub mod packer;
pub mod partition;

pub use bin2c::{write_array_pair, Bin2cError, GeneratedPair};
pub use ddt_fs::{DdtFsError, DdtFsSource, LittleFsMount, NvsStore};
pub use packer::{JsonPacker, PackError, PackReport, PackedBlob, PackerConfig};
pub use partition::{find_partition_macros, MacroSuffix, PartitionError, PartitionMacros};
