// Copyright (c) 2022 Huawei Technologies Co.,Ltd. All rights reserved.
//
// sysMaster is licensed under Mulan PSL v2.
// You can use this software according to the terms and conditions of the Mulan
// PSL v2.
// You may obtain a copy of Mulan PSL v2 at:
//         http://license.coscl.org.cn/MulanPSL2
// THIS SOFTWARE IS PROVIDED ON AN "AS IS" BASIS, WITHOUT WARRANTIES OF ANY
// KIND, EITHER EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO
// NON-INFRINGEMENT, MERCHANTABILITY OR FIT FOR A PARTICULAR PURPOSE.
// See the Mulan PSL v2 for more details.

//! Error define. Conversion errors describe one source file and never stop
//! the batch; generator errors carry the file or directory they concern.
use snafu::prelude::*;
#[allow(unused_imports)]
pub use snafu::ResultExt;
use std::path::PathBuf;

/// Why a single quadlet file could not be converted.
#[allow(missing_docs)]
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ConvertError {
    #[snafu(display("unsupported key '{}' in group '{}'", key, group))]
    UnsupportedKey { key: String, group: String },

    #[snafu(display("no {} key specified", key))]
    MissingKey { key: String },

    #[snafu(display("invalid {} '{}': {}", key, value, reason))]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },

    #[snafu(display("{} is not supported", what))]
    Unsupported { what: String },

    #[snafu(display("failed to resolve path '{}': {}", path, source))]
    ResolvePath {
        path: String,
        source: std::io::Error,
    },
}

/// Generator level errors.
#[allow(missing_docs)]
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
#[non_exhaustive]
pub enum Error {
    #[snafu(display("Missing output directory argument"))]
    MissingOutputDir,

    #[snafu(display("Can't create dir {}: {}", path.display(), source))]
    CreateOutputDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[snafu(display("Error loading '{}', ignoring: {}", path.display(), source))]
    Load {
        path: PathBuf,
        source: unit_parser::Error,
    },

    #[snafu(display("Error converting '{}', ignoring: {}", name, source))]
    Convert { name: String, source: ConvertError },

    #[snafu(display("Error writing '{}', ignoring: {}", path.display(), source))]
    WriteUnit {
        path: PathBuf,
        source: std::io::Error,
    },

    #[snafu(display("Error printing '{}': {}", name, source))]
    Render {
        name: String,
        source: std::io::Error,
    },

    #[snafu(display("Can't create dir {}: {}", path.display(), source))]
    SymlinkDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[snafu(display("Failed creating symlink {}: {}", link.display(), source))]
    Symlink { link: PathBuf, source: nix::Error },
}

/// Result of the conversion functions.
pub type ConvertResult<T, E = ConvertError> = std::result::Result<T, E>;

/// Result of the generator functions.
pub type Result<T, E = Error> = std::result::Result<T, E>;
