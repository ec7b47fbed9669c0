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

//! Image name checks.
//!
//! Short names like `fedora` or `library/fedora` are resolved through
//! registries.conf at pull time, fully qualified ones are not:
//!
//! * short names: `image:tag`, `library/fedora`
//! * fully qualified: `quay.io/image`, `localhost/image:tag`,
//!   `server.org:5000/lib/image`, `sha256:...`

/// Whether `name` is a full image id, `sha256:...` or 64 hex digits.
pub fn is_image_id(name: &str) -> bool {
    if name.starts_with("sha256:") {
        return true;
    }

    name.len() == 64 && name.chars().all(|c| c.is_ascii_hexdigit())
}

/// Whether `name` needs no registry search to be resolved.
pub fn is_unambiguous_name(name: &str) -> bool {
    if is_image_id(name) {
        return true;
    }

    let domain = match name.split_once('/') {
        Some((domain, _)) => domain,
        None => return false,
    };

    domain.contains(['.', ':']) || domain == "localhost"
}
