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

//! Crate for reading, querying and writing systemd-style unit files.
//!
//! A [`UnitFile`] keeps groups and entries in file order, including repeated
//! keys and comments, so that a parsed file can be written back without losing
//! information. Values are stored raw; [`split`] turns them into words using
//! the systemd quoting rules and [`split::escape_words`] goes the other way.

pub mod error;
mod parser;
pub mod split;
mod unit_file;
mod writer;

pub use error::{Error, Result};
pub use split::{escape_words, split_words, SplitError, SplitFlags};
pub use unit_file::{Group, KeyValues, Line, UnitFile};
