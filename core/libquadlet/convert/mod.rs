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

//! Conversion of quadlet files into systemd services.
//!
//! Every converter starts from a copy of the source file, so the `[Unit]`,
//! `[Service]` and `[Install]` groups written by the user are carried over.
//! The quadlet group is renamed to `X-<Group>` which systemd ignores, and the
//! podman command line built from it becomes `ExecStart=`.
mod container;
mod kube;
mod network;
mod volume;

use crate::constants::*;
use crate::error::*;
use crate::kind::{self, UnitKind};
use crate::podman::PodmanCmdline;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use unit_parser::UnitFile;

/// Settings shared by all conversions of one generator run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertContext {
    /// generating user services
    pub rootless: bool,
    /// the podman binary written into the commands
    pub podman: String,
}

impl Default for ConvertContext {
    fn default() -> Self {
        ConvertContext {
            rootless: false,
            podman: DEFAULT_PODMAN.to_string(),
        }
    }
}

/// Something worth telling the administrator that does not stop the
/// conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    /// the image is a short name
    AmbiguousImage { filename: String, image: String },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::AmbiguousImage { filename, image } => write!(
                f,
                "Warning: {} specifies the image \"{}\" which is not a fully qualified image name. \
                 This is not ideal for performance and security reasons. See the podman-pull \
                 manpage discussion of short-name-aliases.conf for details.",
                filename, image
            ),
        }
    }
}

/// A generated service.
#[derive(Debug, Clone)]
pub struct Conversion {
    pub service: UnitFile,
    pub warnings: Vec<Warning>,
}

/// Convert `source` of the given kind.
pub fn convert(
    kind: UnitKind,
    source: &UnitFile,
    ctx: &ConvertContext,
) -> ConvertResult<Conversion> {
    let mut warnings = Vec::new();
    let service = match kind {
        UnitKind::Container => container::convert_container(source, ctx, &mut warnings)?,
        UnitKind::Volume => volume::convert_volume(source, ctx)?,
        UnitKind::Kube => kube::convert_kube(source, ctx)?,
        UnitKind::Network => network::convert_network(source, ctx)?,
    };
    Ok(Conversion { service, warnings })
}

/// The copy of `source` every service starts from: renamed, checked for
/// unknown keys, with the quadlet group moved out of systemd's way.
fn init_service(source: &UnitFile, kind: UnitKind) -> ConvertResult<UnitFile> {
    check_unknown_keys(source, kind.group(), kind.supported_keys())?;

    let mut service = source.clone();
    service.filename = kind::service_name(kind, &source.filename);
    service.rename_group(kind.group(), kind.x_group());

    if matches!(kind, UnitKind::Container | UnitKind::Kube) {
        if let Some(path) = &source.path {
            service.add(UNIT_GROUP, "SourcePath", &path.to_string_lossy());
        }
    }

    Ok(service)
}

fn check_unknown_keys(unit: &UnitFile, group: &str, supported: &[&str]) -> ConvertResult<()> {
    match unit
        .list_keys(group)
        .into_iter()
        .find(|key| !supported.contains(&key.as_str()))
    {
        Some(key) => UnsupportedKeySnafu { key, group }.fail(),
        None => Ok(()),
    }
}

/// The value of `key` unless it is missing or empty.
fn lookup_non_empty<'a>(unit: &'a UnitFile, group: &str, key: &str) -> Option<&'a str> {
    unit.lookup_last(group, key).filter(|v| !v.is_empty())
}

/// Only `mixed` and `control-group` stop conmon together with the container.
fn check_kill_mode(service: &mut UnitFile) -> ConvertResult<()> {
    match service.lookup_last(SERVICE_GROUP, "KillMode") {
        None => {
            service.set(SERVICE_GROUP, "KillMode", "mixed");
            Ok(())
        }
        Some("mixed") | Some("control-group") => Ok(()),
        Some(mode) => InvalidValueSnafu {
            key: "KillMode",
            value: mode,
            reason: "only 'mixed' and 'control-group' are allowed",
        }
        .fail(),
    }
}

fn set_syslog_identifier(source: &UnitFile, service: &mut UnitFile) {
    if !source.has_key(SERVICE_GROUP, "SyslogIdentifier") {
        service.set(SERVICE_GROUP, "SyslogIdentifier", "%N");
    }
}

fn handle_log_driver(unit: &UnitFile, group: &str, podman: &mut PodmanCmdline) {
    if let Some(driver) = unit.lookup_last(group, KEY_LOG_DRIVER) {
        podman.add("--log-driver");
        podman.add(driver);
    }
}

/// `Network=` values; `.network` references become `systemd-<name>` and pull
/// in the network service.
fn add_networks(unit: &UnitFile, group: &str, service: &mut UnitFile, podman: &mut PodmanCmdline) {
    for network in unit.lookup_all(group, KEY_NETWORK) {
        let (name, options) = match network.split_once(':') {
            Some((name, options)) => (name, Some(options)),
            None => (network.as_str(), None),
        };

        let network = if name.ends_with(".network") {
            let podman_name = kind::podman_object_name(name);
            let service_name = kind::service_name(UnitKind::Network, name);
            service.add(UNIT_GROUP, "Requires", &service_name);
            service.add(UNIT_GROUP, "After", &service_name);
            match options {
                Some(options) => format!("{}:{}", podman_name, options),
                None => podman_name,
            }
        } else {
            network
        };

        podman.add(format!("--network={}", network));
    }
}

static PORT_RANGE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[0-9]+(-[0-9]+)?(/udp|/tcp)?$").expect("invalid port range regex")
});

/// `80`, `8000-8080`, `53/udp`
pub fn is_port_range(port: &str) -> bool {
    PORT_RANGE.is_match(port)
}

/// Split a published port on `:`, ignoring colons inside `[...]`.
pub fn split_ports(ports: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut in_brackets = false;

    for (idx, c) in ports.char_indices() {
        match c {
            '[' => in_brackets = true,
            ']' => in_brackets = false,
            ':' if !in_brackets => {
                parts.push(&ports[start..idx]);
                start = idx + 1;
            }
            _ => {}
        }
    }
    parts.push(&ports[start..]);
    parts
}

fn invalid_port(key: &str, value: &str) -> ConvertError {
    ConvertError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
        reason: "invalid port format".to_string(),
    }
}

/// `PublishPort=[[ip:][hostPort]:]containerPort[/protocol]`
fn handle_publish_ports(unit: &UnitFile, group: &str, podman: &mut PodmanCmdline) -> ConvertResult<()> {
    for publish in unit.lookup_all(group, KEY_PUBLISH_PORT) {
        let parts = split_ports(&publish);
        let (mut ip, host, container) = match parts.as_slice() {
            [container] => ("", "", *container),
            [host, container] => ("", *host, *container),
            [ip, host, container] => (*ip, *host, *container),
            _ => {
                return InvalidValueSnafu {
                    key: KEY_PUBLISH_PORT,
                    value: publish.as_str(),
                    reason: "too many ':' separated parts",
                }
                .fail()
            }
        };

        if ip == "0.0.0.0" {
            ip = "";
        }
        if !host.is_empty() && !is_port_range(host) {
            return Err(invalid_port(KEY_PUBLISH_PORT, host));
        }
        if !container.is_empty() && !is_port_range(container) {
            return Err(invalid_port(KEY_PUBLISH_PORT, container));
        }

        let arg = match (ip.is_empty(), host.is_empty()) {
            (false, false) => format!("-p={}:{}:{}", ip, host, container),
            (false, true) => format!("-p={}::{}", ip, container),
            (true, false) => format!("-p={}:{}", host, container),
            (true, true) => format!("-p={}", container),
        };
        podman.add(arg);
    }
    Ok(())
}

fn userns_opts(kind: &str, opts: &[String]) -> String {
    if opts.is_empty() {
        kind.to_string()
    } else {
        format!("{}:{}", kind, opts.join(","))
    }
}

/// `RemapUsers=` with its `RemapUid=`, `RemapGid=` and `RemapUidSize=`.
fn handle_user_remap(
    unit: &UnitFile,
    group: &str,
    podman: &mut PodmanCmdline,
    rootless: bool,
    support_manual: bool,
) -> ConvertResult<()> {
    let uid_maps = unit.lookup_all_strv(group, KEY_REMAP_UID);
    let gid_maps = unit.lookup_all_strv(group, KEY_REMAP_GID);
    let remap = unit.lookup_last(group, KEY_REMAP_USERS).unwrap_or("");

    match remap {
        "" => {
            if !uid_maps.is_empty() || !gid_maps.is_empty() {
                let key = if uid_maps.is_empty() {
                    KEY_REMAP_GID
                } else {
                    KEY_REMAP_UID
                };
                return InvalidValueSnafu {
                    key,
                    value: "",
                    reason: "set without RemapUsers",
                }
                .fail();
            }
        }
        "manual" => {
            if !support_manual {
                return UnsupportedSnafu {
                    what: "RemapUsers=manual",
                }
                .fail();
            }
            for map in &uid_maps {
                podman.add(format!("--uidmap={}", map));
            }
            for map in &gid_maps {
                podman.add(format!("--gidmap={}", map));
            }
        }
        "auto" => {
            let mut opts: Vec<String> = uid_maps
                .iter()
                .map(|m| format!("uidmapping={}", m))
                .chain(gid_maps.iter().map(|m| format!("gidmapping={}", m)))
                .collect();
            let size = unit.lookup_u32(group, KEY_REMAP_UID_SIZE, 0);
            if size > 0 {
                opts.push(format!("size={}", size));
            }
            podman.add(format!("--userns={}", userns_opts("auto", &opts)));
        }
        "keep-id" => {
            if !rootless {
                return UnsupportedSnafu {
                    what: "RemapUsers=keep-id for system units",
                }
                .fail();
            }
            if uid_maps.len() > 1 {
                return InvalidValueSnafu {
                    key: KEY_REMAP_UID,
                    value: uid_maps.join(" "),
                    reason: "keep-id supports only a single value",
                }
                .fail();
            }
            if gid_maps.len() > 1 {
                return InvalidValueSnafu {
                    key: KEY_REMAP_GID,
                    value: gid_maps.join(" "),
                    reason: "keep-id supports only a single value",
                }
                .fail();
            }
            let opts: Vec<String> = uid_maps
                .iter()
                .map(|m| format!("uid={}", m))
                .chain(gid_maps.iter().map(|m| format!("gid={}", m)))
                .collect();
            podman.add(format!("--userns={}", userns_opts("keep-id", &opts)));
        }
        other => {
            return InvalidValueSnafu {
                key: KEY_REMAP_USERS,
                value: other,
                reason: "expected manual, auto or keep-id",
            }
            .fail()
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    pub(super) fn unit(filename: &str, text: &str) -> UnitFile {
        let mut unit = UnitFile::parse(text).unwrap();
        unit.filename = filename.to_string();
        unit
    }

    fn args_of(podman: &PodmanCmdline) -> Vec<&str> {
        podman.args()[1..].iter().map(String::as_str).collect()
    }

    #[test]
    fn test_port_range() {
        for port in ["80", "8000-8080", "53/udp", "443/tcp", "1-2/udp"] {
            assert!(is_port_range(port), "{}", port);
        }
        for port in ["", "http", "80/sctp", "-80", "80-", "a80", "80a"] {
            assert!(!is_port_range(port), "{}", port);
        }
    }

    #[test]
    fn test_split_ports() {
        assert_eq!(split_ports("80"), vec!["80"]);
        assert_eq!(split_ports("8080:80"), vec!["8080", "80"]);
        assert_eq!(split_ports("[::]:8080:80/tcp"), vec!["[::]", "8080", "80/tcp"]);
        assert_eq!(split_ports("127.0.0.1::80"), vec!["127.0.0.1", "", "80"]);
    }

    #[test]
    fn test_publish_ports() {
        let u = unit(
            "a.container",
            "[Container]\nPublishPort=80\nPublishPort=8080:80\nPublishPort=0.0.0.0:8080:80\n\
             PublishPort=127.0.0.1::80/udp\nPublishPort=[::1]:53:53/udp\n",
        );
        let mut podman = PodmanCmdline::new("podman", &[]);
        handle_publish_ports(&u, CONTAINER_GROUP, &mut podman).unwrap();
        assert_eq!(
            args_of(&podman),
            vec![
                "-p=80",
                "-p=8080:80",
                "-p=8080:80",
                "-p=127.0.0.1::80/udp",
                "-p=[::1]:53:53/udp"
            ]
        );

        for bad in ["1:2:3:4", "http:80", "80:abc"] {
            let u = unit("a.container", &format!("[Container]\nPublishPort={}\n", bad));
            let mut podman = PodmanCmdline::new("podman", &[]);
            assert!(matches!(
                handle_publish_ports(&u, CONTAINER_GROUP, &mut podman),
                Err(ConvertError::InvalidValue { .. })
            ));
        }
    }

    #[test]
    fn test_networks() {
        let u = unit(
            "a.container",
            "[Container]\nNetwork=host\nNetwork=backend.network:ip=10.0.0.2\nNetwork=front.network\n",
        );
        let mut service = UnitFile::new("a.service");
        let mut podman = PodmanCmdline::new("podman", &[]);
        add_networks(&u, CONTAINER_GROUP, &mut service, &mut podman);

        assert_eq!(
            args_of(&podman),
            vec![
                "--network=host",
                "--network=systemd-backend:ip=10.0.0.2",
                "--network=systemd-front"
            ]
        );
        assert_eq!(
            service.lookup_all(UNIT_GROUP, "Requires"),
            vec!["backend-network.service", "front-network.service"]
        );
        assert_eq!(
            service.lookup_all(UNIT_GROUP, "After"),
            vec!["backend-network.service", "front-network.service"]
        );
    }

    fn remap(text: &str, rootless: bool, manual: bool) -> ConvertResult<Vec<String>> {
        let u = unit("a.container", &format!("[Container]\n{}", text));
        let mut podman = PodmanCmdline::new("podman", &[]);
        handle_user_remap(&u, CONTAINER_GROUP, &mut podman, rootless, manual)?;
        Ok(podman.args()[1..].to_vec())
    }

    #[test]
    fn test_user_remap() {
        assert!(remap("", false, true).unwrap().is_empty());
        assert!(matches!(
            remap("RemapUid=0:1000:1\n", false, true),
            Err(ConvertError::InvalidValue { .. })
        ));
        assert_eq!(
            remap("RemapUsers=manual\nRemapUid=0:1000:1\nRemapGid=0:2000:1\n", false, true).unwrap(),
            vec!["--uidmap=0:1000:1", "--gidmap=0:2000:1"]
        );
        assert!(matches!(
            remap("RemapUsers=manual\n", false, false),
            Err(ConvertError::Unsupported { .. })
        ));
        assert_eq!(
            remap("RemapUsers=auto\n", false, true).unwrap(),
            vec!["--userns=auto"]
        );
        assert_eq!(
            remap(
                "RemapUsers=auto\nRemapUid=0:1000:1\nRemapGid=0:2000:1\nRemapUidSize=10\n",
                false,
                true
            )
            .unwrap(),
            vec!["--userns=auto:uidmapping=0:1000:1,gidmapping=0:2000:1,size=10"]
        );
        assert_eq!(
            remap("RemapUsers=keep-id\nRemapUid=1000\n", true, true).unwrap(),
            vec!["--userns=keep-id:uid=1000"]
        );
        assert!(matches!(
            remap("RemapUsers=keep-id\n", false, true),
            Err(ConvertError::Unsupported { .. })
        ));
        assert!(matches!(
            remap("RemapUsers=keep-id\nRemapUid=1 2\n", true, true),
            Err(ConvertError::InvalidValue { .. })
        ));
        assert!(matches!(
            remap("RemapUsers=something\n", true, true),
            Err(ConvertError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_kill_mode() {
        let mut service = unit("a.service", "[Service]\nKillMode=control-group\n");
        check_kill_mode(&mut service).unwrap();
        assert_eq!(service.lookup(SERVICE_GROUP, "KillMode"), Some("control-group"));

        let mut service = unit("a.service", "[Unit]\nDescription=x\n");
        check_kill_mode(&mut service).unwrap();
        assert_eq!(service.lookup(SERVICE_GROUP, "KillMode"), Some("mixed"));

        let mut service = unit("a.service", "[Service]\nKillMode=process\n");
        assert!(matches!(
            check_kill_mode(&mut service),
            Err(ConvertError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_unknown_key() {
        let u = unit("a.volume", "[Volume]\nUser=1\nFoo=bar\n");
        match convert(UnitKind::Volume, &u, &ConvertContext::default()) {
            Err(ConvertError::UnsupportedKey { key, group }) => {
                assert_eq!(key, "Foo");
                assert_eq!(group, "Volume");
            }
            other => panic!("unexpected {:?}", other.map(|c| c.service)),
        }
    }
}
