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

//! The kinds of quadlet files, keyed by extension.
use crate::constants::*;
use std::fmt;
use std::path::Path;

/// The type of a quadlet source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum UnitKind {
    /// `.container`
    Container,
    /// `.volume`
    Volume,
    /// `.kube`
    Kube,
    /// `.network`
    Network,
}

impl UnitKind {
    /// All supported kinds.
    pub const ALL: [UnitKind; 4] = [
        UnitKind::Container,
        UnitKind::Volume,
        UnitKind::Kube,
        UnitKind::Network,
    ];

    /// The kind of `filename`, `None` for unsupported extensions.
    pub fn from_filename(filename: &str) -> Option<UnitKind> {
        let ext = Path::new(filename).extension()?.to_str()?;
        UnitKind::ALL.into_iter().find(|kind| kind.extension() == ext)
    }

    /// The file extension without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            UnitKind::Container => "container",
            UnitKind::Volume => "volume",
            UnitKind::Kube => "kube",
            UnitKind::Network => "network",
        }
    }

    /// The group holding the quadlet specific keys.
    pub fn group(self) -> &'static str {
        match self {
            UnitKind::Container => CONTAINER_GROUP,
            UnitKind::Volume => VOLUME_GROUP,
            UnitKind::Kube => KUBE_GROUP,
            UnitKind::Network => NETWORK_GROUP,
        }
    }

    /// The name the group is renamed to in the generated service.
    pub fn x_group(self) -> &'static str {
        match self {
            UnitKind::Container => X_CONTAINER_GROUP,
            UnitKind::Volume => X_VOLUME_GROUP,
            UnitKind::Kube => X_KUBE_GROUP,
            UnitKind::Network => X_NETWORK_GROUP,
        }
    }

    /// The keys allowed in [`UnitKind::group`].
    pub fn supported_keys(self) -> &'static [&'static str] {
        match self {
            UnitKind::Container => SUPPORTED_CONTAINER_KEYS,
            UnitKind::Volume => SUPPORTED_VOLUME_KEYS,
            UnitKind::Kube => SUPPORTED_KUBE_KEYS,
            UnitKind::Network => SUPPORTED_NETWORK_KEYS,
        }
    }

    /// The suffix added to the base name of the generated service.
    pub fn service_suffix(self) -> &'static str {
        match self {
            UnitKind::Container | UnitKind::Kube => "",
            UnitKind::Volume => "-volume",
            UnitKind::Network => "-network",
        }
    }
}

impl fmt::Display for UnitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// `name` without its last extension, surrounded by `prefix` and `suffix`,
/// followed by `ext`. A leading dot is not taken as an extension.
pub fn replace_extension(name: &str, ext: &str, prefix: &str, suffix: &str) -> String {
    let base = match name.rfind('.') {
        Some(dot) if dot > 0 => &name[..dot],
        _ => name,
    };
    format!("{}{}{}{}", prefix, base, suffix, ext)
}

/// The service file generated for `filename`.
pub fn service_name(kind: UnitKind, filename: &str) -> String {
    replace_extension(filename, ".service", "", kind.service_suffix())
}

/// The podman object name of a `.volume` or `.network` file.
pub fn podman_object_name(filename: &str) -> String {
    replace_extension(filename, "", "systemd-", "")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_filename() {
        assert_eq!(
            UnitKind::from_filename("web.container"),
            Some(UnitKind::Container)
        );
        assert_eq!(UnitKind::from_filename("data.volume"), Some(UnitKind::Volume));
        assert_eq!(UnitKind::from_filename("app.kube"), Some(UnitKind::Kube));
        assert_eq!(UnitKind::from_filename("a.b.network"), Some(UnitKind::Network));
        assert_eq!(UnitKind::from_filename("web.service"), None);
        assert_eq!(UnitKind::from_filename("container"), None);
        assert_eq!(UnitKind::from_filename(".container"), None);
    }

    #[test]
    fn test_replace_extension() {
        assert_eq!(replace_extension("foo.container", ".service", "", ""), "foo.service");
        assert_eq!(
            replace_extension("foo.volume", ".service", "", "-volume"),
            "foo-volume.service"
        );
        assert_eq!(replace_extension("foo.volume", "", "systemd-", ""), "systemd-foo");
        assert_eq!(replace_extension("noext", ".service", "", ""), "noext.service");
        assert_eq!(replace_extension(".hidden", "", "p-", ""), "p-.hidden");
    }

    #[test]
    fn test_service_name() {
        assert_eq!(service_name(UnitKind::Container, "web.container"), "web.service");
        assert_eq!(service_name(UnitKind::Kube, "app.kube"), "app.service");
        assert_eq!(
            service_name(UnitKind::Network, "net.network"),
            "net-network.service"
        );
        assert_eq!(podman_object_name("net.network"), "systemd-net");
    }
}
