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

//! `.network` files
use super::*;

const G: &str = NETWORK_GROUP;

pub(super) fn convert_network(network: &UnitFile, ctx: &ConvertContext) -> ConvertResult<UnitFile> {
    let mut service = init_service(network, UnitKind::Network)?;
    let network_name = kind::podman_object_name(&network.filename);

    service.add(UNIT_GROUP, "RequiresMountsFor", "%t/containers");

    let mut podman = PodmanCmdline::new(&ctx.podman, &["network", "create", "--ignore"]);

    if network.lookup_boolean_with_default(G, KEY_NETWORK_DISABLE_DNS, false) {
        podman.add("--disable-dns");
    }

    if let Some(driver) = lookup_non_empty(network, G, KEY_NETWORK_DRIVER) {
        podman.add(format!("--driver={}", driver));
    }

    handle_subnets(network, &mut podman)?;

    if network.lookup_boolean_with_default(G, KEY_NETWORK_INTERNAL, false) {
        podman.add("--internal");
    }

    if let Some(driver) = lookup_non_empty(network, G, KEY_NETWORK_IPAM_DRIVER) {
        podman.add(format!("--ipam-driver={}", driver));
    }

    if network.lookup_boolean_with_default(G, KEY_NETWORK_IPV6, false) {
        podman.add("--ipv6");
    }

    podman.add_keys("--opt", &network.lookup_all_key_val(G, KEY_NETWORK_OPTIONS));
    podman.add_labels(&network.lookup_all_key_val(G, KEY_LABEL));
    podman.add(network_name);

    service.add_cmdline(SERVICE_GROUP, "ExecStart", podman.args());

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

/// The n-th `Gateway=` and `IPRange=` belong to the n-th `Subnet=`.
fn handle_subnets(network: &UnitFile, podman: &mut PodmanCmdline) -> ConvertResult<()> {
    let subnets = network.lookup_all(G, KEY_NETWORK_SUBNET);
    let gateways = network.lookup_all(G, KEY_NETWORK_GATEWAY);
    let ranges = network.lookup_all(G, KEY_NETWORK_IP_RANGE);

    if subnets.is_empty() {
        if let Some(gateway) = gateways.first() {
            return InvalidValueSnafu {
                key: KEY_NETWORK_GATEWAY,
                value: gateway.as_str(),
                reason: "can't be set without Subnet",
            }
            .fail();
        }
        if let Some(range) = ranges.first() {
            return InvalidValueSnafu {
                key: KEY_NETWORK_IP_RANGE,
                value: range.as_str(),
                reason: "can't be set without Subnet",
            }
            .fail();
        }
        return Ok(());
    }

    if gateways.len() > subnets.len() {
        return InvalidValueSnafu {
            key: KEY_NETWORK_GATEWAY,
            value: gateways.join(" "),
            reason: "more gateways than subnets",
        }
        .fail();
    }
    if ranges.len() > subnets.len() {
        return InvalidValueSnafu {
            key: KEY_NETWORK_IP_RANGE,
            value: ranges.join(" "),
            reason: "more ranges than subnets",
        }
        .fail();
    }

    for (idx, subnet) in subnets.iter().enumerate() {
        podman.add(format!("--subnet={}", subnet));
        if let Some(gateway) = gateways.get(idx) {
            podman.add(format!("--gateway={}", gateway));
        }
        if let Some(range) = ranges.get(idx) {
            podman.add(format!("--ip-range={}", range));
        }
    }

    Ok(())
}
