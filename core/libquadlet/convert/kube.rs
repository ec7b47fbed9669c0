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

//! `.kube` files
use super::*;
use crate::path_util::absolute_path;

const G: &str = KUBE_GROUP;

pub(super) fn convert_kube(kube: &UnitFile, ctx: &ConvertContext) -> ConvertResult<UnitFile> {
    let mut service = init_service(kube, UnitKind::Kube)?;

    let yaml = match lookup_non_empty(kube, G, KEY_YAML) {
        Some(yaml) => absolute_path(kube.path.as_deref(), yaml)?,
        None => return MissingKeySnafu { key: KEY_YAML }.fail(),
    };

    check_kill_mode(&mut service)?;

    service.add(SERVICE_GROUP, "Environment", "PODMAN_SYSTEMD_UNIT=%n");
    service.add(UNIT_GROUP, "RequiresMountsFor", "%t/containers");
    service.setv(SERVICE_GROUP, &[("Type", "notify"), ("NotifyAccess", "all")]);
    set_syslog_identifier(kube, &mut service);

    let mut podman = PodmanCmdline::new(
        &ctx.podman,
        &["kube", "play", "--replace", "--service-container=true"],
    );

    handle_log_driver(kube, G, &mut podman);
    handle_user_remap(kube, G, &mut podman, ctx.rootless, false)?;
    add_networks(kube, G, &mut service, &mut podman);

    for config_map in kube.lookup_all_strv(G, KEY_CONFIG_MAP) {
        podman.add("--configmap");
        podman.add(absolute_path(kube.path.as_deref(), &config_map)?);
    }

    handle_publish_ports(kube, G, &mut podman)?;

    podman.add(yaml.as_str());

    service.add_cmdline(SERVICE_GROUP, "ExecStart", podman.args());
    service.add_cmdline(
        SERVICE_GROUP,
        "ExecStopPost",
        &[ctx.podman.as_str(), "kube", "down", yaml.as_str()],
    );

    Ok(service)
}
