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

//! `.volume` files
use super::*;

const G: &str = VOLUME_GROUP;

pub(super) fn convert_volume(volume: &UnitFile, ctx: &ConvertContext) -> ConvertResult<UnitFile> {
    let mut service = init_service(volume, UnitKind::Volume)?;
    let volume_name = kind::podman_object_name(&volume.filename);

    service.add(UNIT_GROUP, "RequiresMountsFor", "%t/containers");

    let labels = volume.lookup_all_key_val(G, KEY_LABEL);

    let mut podman = PodmanCmdline::new(&ctx.podman, &["volume", "create", "--ignore"]);

    // mount options collected into a single "o=" option
    let mut opts: Vec<String> = Vec::new();
    if volume.has_key(G, KEY_USER) {
        opts.push(format!("uid={}", volume.lookup_u32(G, KEY_USER, 0)));
    }
    if volume.has_key(G, KEY_GROUP) {
        opts.push(format!("gid={}", volume.lookup_u32(G, KEY_GROUP, 0)));
    }

    if let Some(copy) = volume.lookup_boolean(G, KEY_COPY) {
        podman.add("--opt");
        podman.add(if copy { "copy" } else { "nocopy" });
    }

    let device = lookup_non_empty(volume, G, KEY_DEVICE);
    if let Some(device) = device {
        podman.add("--opt");
        podman.add(format!("device={}", device));
    }

    if let Some(dev_type) = lookup_non_empty(volume, G, KEY_TYPE) {
        if device.is_none() {
            return InvalidValueSnafu {
                key: KEY_TYPE,
                value: dev_type,
                reason: "can't be used without Device",
            }
            .fail();
        }
        podman.add("--opt");
        podman.add(format!("type={}", dev_type));
    }

    if let Some(mount_opts) = lookup_non_empty(volume, G, KEY_OPTIONS) {
        if device.is_none() {
            return InvalidValueSnafu {
                key: KEY_OPTIONS,
                value: mount_opts,
                reason: "can't be used without Device",
            }
            .fail();
        }
        opts.push(mount_opts.to_string());
    }

    if !opts.is_empty() {
        podman.add("--opt");
        podman.add(format!("o={}", opts.join(",")));
    }

    podman.add_labels(&labels);
    podman.add(volume_name);

    service.add_cmdline(SERVICE_GROUP, "ExecStart", podman.args());

    // the default identifier would be "podman"
    service.setv(
        SERVICE_GROUP,
        &[
            ("Type", "oneshot"),
            ("RemainAfterExit", "yes"),
            ("SyslogIdentifier", "%N"),
        ],
    );

    Ok(service)
}
