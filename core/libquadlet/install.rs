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

//! Enabling generated services.
//!
//! `systemctl enable` does not work for generated units, so the `[Install]`
//! group is applied here by creating the symlinks it describes in the
//! output directory.
use crate::constants::INSTALL_GROUP;
use crate::error::*;
use crate::path_util::path_clean;
use nix::unistd::{self, UnlinkatFlags};
use pathdiff::diff_paths;
use std::fs;
use std::path::{Path, PathBuf};
use unit_parser::UnitFile;

/// A symlink relative to the output directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symlink {
    /// the link, relative to the output directory
    pub link: PathBuf,
    /// what the link points to, relative to the link's directory
    pub target: PathBuf,
}

/// The symlinks requested by the `[Install]` group of `service`.
pub fn plan_symlinks(service: &UnitFile) -> Vec<Symlink> {
    let mut links: Vec<String> = service
        .lookup_all_strv(INSTALL_GROUP, "Alias")
        .iter()
        .map(|alias| path_clean(alias))
        .collect();

    // only unit names are allowed, not paths
    for (key, dir_suffix) in [("WantedBy", "wants"), ("RequiredBy", "requires")] {
        for unit in service.lookup_all_strv(INSTALL_GROUP, key) {
            if unit.contains('/') {
                log::debug!("Ignoring {}={} in {}", key, unit, service.filename);
                continue;
            }
            links.push(format!("{}.{}/{}", unit, dir_suffix, service.filename));
        }
    }

    let mut symlinks = Vec::with_capacity(links.len());
    for link in links {
        let link = PathBuf::from(link);
        let link_dir = link.parent().unwrap_or_else(|| Path::new(""));
        match diff_paths(&service.filename, link_dir) {
            Some(target) => symlinks.push(Symlink { link, target }),
            None => log::error!(
                "Can't create symlink {}: no relative path to {}",
                link.display(),
                service.filename
            ),
        }
    }
    symlinks
}

/// Create the symlinks of `service` below `output_dir`. Existing links are
/// replaced. Every failed link is returned and the others are still created.
pub fn install_symlinks(output_dir: &Path, service: &UnitFile) -> Vec<Error> {
    let mut errors = Vec::new();

    for symlink in plan_symlinks(service) {
        let link_path = output_dir.join(&symlink.link);

        if let Some(link_dir) = link_path.parent() {
            if let Err(e) = fs::create_dir_all(link_dir) {
                errors.push(Error::SymlinkDir {
                    path: link_dir.to_path_buf(),
                    source: e,
                });
                continue;
            }
        }

        log::debug!(
            "Creating symlink {} -> {}",
            link_path.display(),
            symlink.target.display()
        );
        let _ = unistd::unlinkat(None, &link_path, UnlinkatFlags::NoRemoveDir);
        if let Err(e) = unistd::symlinkat(&symlink.target, None, &link_path) {
            errors.push(Error::Symlink {
                link: link_path,
                source: e,
            });
        }
    }

    errors
}
