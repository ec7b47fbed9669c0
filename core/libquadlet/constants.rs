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

//! Common used constants by the converters and the generator.

/// Directory for sysadmin quadlet files
pub const UNIT_DIR_ADMIN: &str = "/etc/containers/systemd";
/// Directory for distribution quadlet files
pub const UNIT_DIR_DISTRO: &str = "/usr/share/containers/systemd";
/// Podman binary used when `PODMAN` is unset
pub const DEFAULT_PODMAN: &str = "/usr/bin/podman";
/// Program name written in front of every log line
pub const LOG_NAME: &str = "quadlet-generator";

/// Environment variable overriding the unit directories
pub const ENV_UNIT_DIRS: &str = "QUADLET_UNIT_DIRS";
/// Environment variable overriding the podman binary
pub const ENV_PODMAN: &str = "PODMAN";

pub const UNIT_GROUP: &str = "Unit";
pub const SERVICE_GROUP: &str = "Service";
pub const INSTALL_GROUP: &str = "Install";
pub const CONTAINER_GROUP: &str = "Container";
pub const X_CONTAINER_GROUP: &str = "X-Container";
pub const VOLUME_GROUP: &str = "Volume";
pub const X_VOLUME_GROUP: &str = "X-Volume";
pub const KUBE_GROUP: &str = "Kube";
pub const X_KUBE_GROUP: &str = "X-Kube";
pub const NETWORK_GROUP: &str = "Network";
pub const X_NETWORK_GROUP: &str = "X-Network";

pub const KEY_ADD_CAPABILITY: &str = "AddCapability";
pub const KEY_ADD_DEVICE: &str = "AddDevice";
pub const KEY_ANNOTATION: &str = "Annotation";
pub const KEY_AUTO_UPDATE: &str = "AutoUpdate";
pub const KEY_CONFIG_MAP: &str = "ConfigMap";
pub const KEY_CONTAINER_NAME: &str = "ContainerName";
pub const KEY_COPY: &str = "Copy";
pub const KEY_DEVICE: &str = "Device";
pub const KEY_DROP_CAPABILITY: &str = "DropCapability";
pub const KEY_ENVIRONMENT: &str = "Environment";
pub const KEY_ENVIRONMENT_FILE: &str = "EnvironmentFile";
pub const KEY_ENVIRONMENT_HOST: &str = "EnvironmentHost";
pub const KEY_EXEC: &str = "Exec";
pub const KEY_EXPOSE_HOST_PORT: &str = "ExposeHostPort";
pub const KEY_GROUP: &str = "Group";
pub const KEY_HEALTH_CMD: &str = "HealthCmd";
pub const KEY_HEALTH_INTERVAL: &str = "HealthInterval";
pub const KEY_HEALTH_ON_FAILURE: &str = "HealthOnFailure";
pub const KEY_HEALTH_RETRIES: &str = "HealthRetries";
pub const KEY_HEALTH_START_PERIOD: &str = "HealthStartPeriod";
pub const KEY_HEALTH_STARTUP_CMD: &str = "HealthStartupCmd";
pub const KEY_HEALTH_STARTUP_INTERVAL: &str = "HealthStartupInterval";
pub const KEY_HEALTH_STARTUP_RETRIES: &str = "HealthStartupRetries";
pub const KEY_HEALTH_STARTUP_SUCCESS: &str = "HealthStartupSuccess";
pub const KEY_HEALTH_STARTUP_TIMEOUT: &str = "HealthStartupTimeout";
pub const KEY_HEALTH_TIMEOUT: &str = "HealthTimeout";
pub const KEY_IMAGE: &str = "Image";
pub const KEY_IP: &str = "IP";
pub const KEY_IP6: &str = "IP6";
pub const KEY_LABEL: &str = "Label";
pub const KEY_LOG_DRIVER: &str = "LogDriver";
pub const KEY_MOUNT: &str = "Mount";
pub const KEY_NETWORK: &str = "Network";
pub const KEY_NETWORK_DISABLE_DNS: &str = "DisableDNS";
pub const KEY_NETWORK_DRIVER: &str = "Driver";
pub const KEY_NETWORK_GATEWAY: &str = "Gateway";
pub const KEY_NETWORK_INTERNAL: &str = "Internal";
pub const KEY_NETWORK_IPAM_DRIVER: &str = "IPAMDriver";
pub const KEY_NETWORK_IP_RANGE: &str = "IPRange";
pub const KEY_NETWORK_IPV6: &str = "IPv6";
pub const KEY_NETWORK_OPTIONS: &str = "Options";
pub const KEY_NETWORK_SUBNET: &str = "Subnet";
pub const KEY_NO_NEW_PRIVILEGES: &str = "NoNewPrivileges";
pub const KEY_NOTIFY: &str = "Notify";
pub const KEY_OPTIONS: &str = "Options";
pub const KEY_PODMAN_ARGS: &str = "PodmanArgs";
pub const KEY_PUBLISH_PORT: &str = "PublishPort";
pub const KEY_READ_ONLY: &str = "ReadOnly";
pub const KEY_REMAP_GID: &str = "RemapGid";
pub const KEY_REMAP_UID: &str = "RemapUid";
pub const KEY_REMAP_UID_SIZE: &str = "RemapUidSize";
pub const KEY_REMAP_USERS: &str = "RemapUsers";
pub const KEY_RUN_INIT: &str = "RunInit";
pub const KEY_SECCOMP_PROFILE: &str = "SeccompProfile";
pub const KEY_SECRET: &str = "Secret";
pub const KEY_SECURITY_LABEL_DISABLE: &str = "SecurityLabelDisable";
pub const KEY_SECURITY_LABEL_FILE_TYPE: &str = "SecurityLabelFileType";
pub const KEY_SECURITY_LABEL_LEVEL: &str = "SecurityLabelLevel";
pub const KEY_SECURITY_LABEL_TYPE: &str = "SecurityLabelType";
pub const KEY_TIMEZONE: &str = "Timezone";
pub const KEY_TMPFS: &str = "Tmpfs";
pub const KEY_TYPE: &str = "Type";
pub const KEY_USER: &str = "User";
pub const KEY_VOLATILE_TMP: &str = "VolatileTmp";
pub const KEY_VOLUME: &str = "Volume";
pub const KEY_YAML: &str = "Yaml";

/// Keys accepted in `[Container]`
pub const SUPPORTED_CONTAINER_KEYS: &[&str] = &[
    KEY_ADD_CAPABILITY,
    KEY_ADD_DEVICE,
    KEY_ANNOTATION,
    KEY_AUTO_UPDATE,
    KEY_CONTAINER_NAME,
    KEY_DROP_CAPABILITY,
    KEY_ENVIRONMENT,
    KEY_ENVIRONMENT_FILE,
    KEY_ENVIRONMENT_HOST,
    KEY_EXEC,
    KEY_EXPOSE_HOST_PORT,
    KEY_GROUP,
    KEY_HEALTH_CMD,
    KEY_HEALTH_INTERVAL,
    KEY_HEALTH_ON_FAILURE,
    KEY_HEALTH_RETRIES,
    KEY_HEALTH_START_PERIOD,
    KEY_HEALTH_STARTUP_CMD,
    KEY_HEALTH_STARTUP_INTERVAL,
    KEY_HEALTH_STARTUP_RETRIES,
    KEY_HEALTH_STARTUP_SUCCESS,
    KEY_HEALTH_STARTUP_TIMEOUT,
    KEY_HEALTH_TIMEOUT,
    KEY_IMAGE,
    KEY_IP,
    KEY_IP6,
    KEY_LABEL,
    KEY_LOG_DRIVER,
    KEY_MOUNT,
    KEY_NETWORK,
    KEY_NO_NEW_PRIVILEGES,
    KEY_NOTIFY,
    KEY_PODMAN_ARGS,
    KEY_PUBLISH_PORT,
    KEY_READ_ONLY,
    KEY_REMAP_GID,
    KEY_REMAP_UID,
    KEY_REMAP_UID_SIZE,
    KEY_REMAP_USERS,
    KEY_RUN_INIT,
    KEY_SECCOMP_PROFILE,
    KEY_SECRET,
    KEY_SECURITY_LABEL_DISABLE,
    KEY_SECURITY_LABEL_FILE_TYPE,
    KEY_SECURITY_LABEL_LEVEL,
    KEY_SECURITY_LABEL_TYPE,
    KEY_TIMEZONE,
    KEY_TMPFS,
    KEY_USER,
    KEY_VOLATILE_TMP,
    KEY_VOLUME,
];

/// Keys accepted in `[Volume]`
pub const SUPPORTED_VOLUME_KEYS: &[&str] = &[
    KEY_COPY,
    KEY_DEVICE,
    KEY_GROUP,
    KEY_LABEL,
    KEY_OPTIONS,
    KEY_TYPE,
    KEY_USER,
];

/// Keys accepted in `[Network]`
pub const SUPPORTED_NETWORK_KEYS: &[&str] = &[
    KEY_NETWORK_DISABLE_DNS,
    KEY_NETWORK_DRIVER,
    KEY_NETWORK_GATEWAY,
    KEY_NETWORK_INTERNAL,
    KEY_NETWORK_IPAM_DRIVER,
    KEY_NETWORK_IP_RANGE,
    KEY_NETWORK_IPV6,
    KEY_LABEL,
    KEY_NETWORK_OPTIONS,
    KEY_NETWORK_SUBNET,
];

/// Keys accepted in `[Kube]`
pub const SUPPORTED_KUBE_KEYS: &[&str] = &[
    KEY_CONFIG_MAP,
    KEY_LOG_DRIVER,
    KEY_NETWORK,
    KEY_PUBLISH_PORT,
    KEY_REMAP_GID,
    KEY_REMAP_UID,
    KEY_REMAP_UID_SIZE,
    KEY_REMAP_USERS,
    KEY_YAML,
];

/// Health check keys and the podman flag each one maps to.
pub const HEALTH_CHECK_FLAGS: &[(&str, &str)] = &[
    (KEY_HEALTH_CMD, "--health-cmd"),
    (KEY_HEALTH_INTERVAL, "--health-interval"),
    (KEY_HEALTH_ON_FAILURE, "--health-on-failure"),
    (KEY_HEALTH_RETRIES, "--health-retries"),
    (KEY_HEALTH_START_PERIOD, "--health-start-period"),
    (KEY_HEALTH_TIMEOUT, "--health-timeout"),
    (KEY_HEALTH_STARTUP_CMD, "--health-startup-cmd"),
    (KEY_HEALTH_STARTUP_INTERVAL, "--health-startup-interval"),
    (KEY_HEALTH_STARTUP_RETRIES, "--health-startup-retries"),
    (KEY_HEALTH_STARTUP_SUCCESS, "--health-startup-success"),
    (KEY_HEALTH_STARTUP_TIMEOUT, "--health-startup-timeout"),
];
