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

//! Definitions for all possible errors used in this crate.
use snafu::Snafu;
use std::{io, path::PathBuf};

/// Errors used in crate.
#[derive(Debug, Snafu)]
#[allow(missing_docs)]
#[snafu(visibility(pub))]
pub enum Error {
    #[snafu(display("Failed to read file {}: {}.", path.display(), source))]
    ReadFile { source: io::Error, path: PathBuf },

    #[snafu(display("Invalid filename {}.", path.display()))]
    InvalidFilename { path: PathBuf },

    #[snafu(display("Line {}: {}.", line, msg))]
    Parse { line: usize, msg: String },
}

/// Result of the unit file operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;
