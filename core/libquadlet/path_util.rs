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

//! the utils of the path operation
//!
use crate::error::*;
use std::path::{Path, PathBuf};

/// Lexically clean a path: collapse repeated slashes, drop `.` components
/// and resolve `..` against the preceding component.
/// e.g., //foo//.//bar/../baz/ becomes /foo/baz
/// a/../../b becomes ../b
pub fn path_clean(s: &str) -> String {
    let rooted = s.starts_with('/');
    let mut parts: Vec<&str> = Vec::new();

    for com in s.split('/') {
        match com {
            "" | "." => {}
            ".." => match parts.last() {
                Some(&last) if last != ".." => {
                    parts.pop();
                }
                /* ".." at the root stays at the root */
                _ if rooted => {}
                _ => parts.push(".."),
            },
            _ => parts.push(com),
        }
    }

    let joined = parts.join("/");
    match (rooted, joined.is_empty()) {
        (true, _) => format!("/{}", joined),
        (false, true) => ".".to_string(),
        (false, false) => joined,
    }
}

/// Resolve a path given in a quadlet file. Relative paths are taken relative
/// to the directory of `source`, or the working directory when the source has
/// no path. Values starting with `%` are systemd specifiers and kept as is.
pub fn absolute_path(source: Option<&Path>, value: &str) -> ConvertResult<String> {
    if value.starts_with('%') {
        return Ok(value.to_string());
    }

    let mut path = PathBuf::from(value);
    if path.is_relative() {
        if let Some(dir) = source.and_then(Path::parent) {
            path = dir.join(path);
        }
    }
    if path.is_relative() {
        let cwd = std::env::current_dir().context(ResolvePathSnafu { path: value })?;
        path = cwd.join(path);
    }

    Ok(path_clean(&path.to_string_lossy()))
}
