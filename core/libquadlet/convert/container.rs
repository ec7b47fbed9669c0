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

//! `.container` files
use super::*;
use crate::image::is_unambiguous_name;
use crate::path_util::absolute_path;
use std::path::Path;

const G: &str = CONTAINER_GROUP;

pub(super) fn convert_container(
    container: &UnitFile,
    ctx: &ConvertContext,
    warnings: &mut Vec<Warning>,
) -> ConvertResult<UnitFile> {
    let mut service = init_service(container, UnitKind::Container)?;

    let image = match lookup_non_empty(container, G, KEY_IMAGE) {
        Some(image) => image,
        None => return MissingKeySnafu { key: KEY_IMAGE }.fail(),
    };
    if !is_unambiguous_name(image) {
        warnings.push(Warning::AmbiguousImage {
            filename: container.filename.clone(),
            image: image.to_string(),
        });
    }

    let name = lookup_non_empty(container, G, KEY_CONTAINER_NAME).unwrap_or("systemd-%N");

    // podman auto-update finds the unit to restart through this
    service.add(SERVICE_GROUP, "Environment", "PODMAN_SYSTEMD_UNIT=%n");

    check_kill_mode(&mut service)?;

    let env = container.lookup_all_key_val(G, KEY_ENVIRONMENT);

    service.add(UNIT_GROUP, "RequiresMountsFor", "%t/containers");

    // conmon may exit without removing the container, -i ignores a missing one
    service.add(
        SERVICE_GROUP,
        "ExecStopPost",
        &format!("-{} rm -f -i --cidfile=%t/%N.cid", ctx.podman),
    );
    service.add(SERVICE_GROUP, "ExecStopPost", "-rm -f %t/%N.cid");

    let mut podman = PodmanCmdline::new(&ctx.podman, &["run"]);
    podman.add(format!("--name={}", name));
    podman.extend(&["--cidfile=%t/%N.cid", "--replace", "--rm"]);

    handle_log_driver(container, G, &mut podman);

    service.add(SERVICE_GROUP, "Delegate", "yes");
    podman.add("--cgroups=split");

    if let Some(tz) = lookup_non_empty(container, G, KEY_TIMEZONE) {
        podman.add(format!("--tz={}", tz));
    }

    add_networks(container, G, &mut service, &mut podman);

    if let Some(init) = container.lookup_boolean(G, KEY_RUN_INIT) {
        podman.add_bool("--init", init);
    }

    handle_service_type(container, &mut service, &mut podman)?;

    set_syslog_identifier(container, &mut service);

    handle_security(container, &mut podman);
    handle_user(container, &mut podman)?;
    handle_user_remap(container, G, &mut podman, ctx.rootless, true)?;

    for tmpfs in container.lookup_all(G, KEY_TMPFS) {
        if tmpfs.matches(':').count() > 1 {
            return InvalidValueSnafu {
                key: KEY_TMPFS,
                value: tmpfs.as_str(),
                reason: "expected CONTAINER-DIR[:OPTIONS]",
            }
            .fail();
        }
        podman.add("--tmpfs");
        podman.add(tmpfs);
    }

    handle_volumes(container, &mut service, &mut podman);

    for port in container.lookup_all(G, KEY_EXPOSE_HOST_PORT) {
        if !is_port_range(&port) {
            return Err(invalid_port(KEY_EXPOSE_HOST_PORT, &port));
        }
        podman.add(format!("--expose={}", port));
    }

    handle_publish_ports(container, G, &mut podman)?;

    podman.add_env(&env);

    if let Some(ip) = lookup_non_empty(container, G, KEY_IP) {
        podman.add("--ip");
        podman.add(ip);
    }
    if let Some(ip6) = lookup_non_empty(container, G, KEY_IP6) {
        podman.add("--ip6");
        podman.add(ip6);
    }

    let mut labels = container.lookup_all_key_val(G, KEY_LABEL);
    if let Some(policy) = lookup_non_empty(container, G, KEY_AUTO_UPDATE) {
        let key = "io.containers.autoupdate";
        match labels.iter_mut().find(|(k, _)| k == key) {
            Some((_, value)) => *value = policy.to_string(),
            None => labels.push((key.to_string(), policy.to_string())),
        }
    }
    podman.add_labels(&labels);
    podman.add_annotations(&container.lookup_all_key_val(G, KEY_ANNOTATION));

    for env_file in container.lookup_all_args(G, KEY_ENVIRONMENT_FILE) {
        podman.add("--env-file");
        podman.add(absolute_path(container.path.as_deref(), &env_file)?);
    }

    if let Some(env_host) = container.lookup_boolean(G, KEY_ENVIRONMENT_HOST) {
        podman.add_bool("--env-host", env_host);
    }

    for secret in container.lookup_all_args(G, KEY_SECRET) {
        podman.add("--secret");
        podman.add(secret);
    }

    for mount in container.lookup_all_args(G, KEY_MOUNT) {
        podman.add("--mount");
        podman.add(mount);
    }

    for (key, flag) in HEALTH_CHECK_FLAGS {
        if let Some(value) = lookup_non_empty(container, G, key) {
            podman.add(*flag);
            podman.add(value);
        }
    }

    podman.extend(&container.lookup_all_args(G, KEY_PODMAN_ARGS));
    podman.add(image);
    if let Some(exec) = container.lookup_last_args(G, KEY_EXEC) {
        podman.extend(&exec);
    }

    service.add_cmdline(SERVICE_GROUP, "ExecStart", podman.args());

    Ok(service)
}

/// Only `notify` and `oneshot` services make sense for a container. Anything
/// but oneshot waits for the container through sd-notify and detaches.
fn handle_service_type(
    container: &UnitFile,
    service: &mut UnitFile,
    podman: &mut PodmanCmdline,
) -> ConvertResult<()> {
    let service_type = service.lookup_last(SERVICE_GROUP, "Type").map(str::to_string);
    match service_type.as_deref() {
        None | Some("notify") => {}
        Some("oneshot") => return Ok(()),
        Some(other) => {
            return InvalidValueSnafu {
                key: "Type",
                value: other,
                reason: "only 'notify' and 'oneshot' are allowed",
            }
            .fail()
        }
    }

    if container.lookup_boolean_with_default(G, KEY_NOTIFY, false) {
        podman.add("--sdnotify=container");
    } else {
        podman.add("--sdnotify=conmon");
    }
    service.setv(SERVICE_GROUP, &[("Type", "notify"), ("NotifyAccess", "all")]);
    podman.add("-d");

    Ok(())
}

fn handle_security(container: &UnitFile, podman: &mut PodmanCmdline) {
    if container.lookup_boolean_with_default(G, KEY_NO_NEW_PRIVILEGES, false) {
        podman.add("--security-opt=no-new-privileges");
    }

    if container.lookup_boolean_with_default(G, KEY_SECURITY_LABEL_DISABLE, false) {
        podman.extend(&["--security-opt", "label:disable"]);
    }

    for (key, label) in [
        (KEY_SECURITY_LABEL_TYPE, "type"),
        (KEY_SECURITY_LABEL_FILE_TYPE, "filetype"),
        (KEY_SECURITY_LABEL_LEVEL, "level"),
    ] {
        if let Some(value) = lookup_non_empty(container, G, key) {
            podman.add("--security-opt");
            podman.add(format!("label={}:{}", label, value));
        }
    }

    for device in container.lookup_all_strv(G, KEY_ADD_DEVICE) {
        let device = match device.strip_prefix('-') {
            Some(optional) => {
                let host = optional.split(':').next().unwrap_or(optional);
                if !Path::new(host).exists() {
                    log::debug!("Skipping optional device {}", host);
                    continue;
                }
                optional.to_string()
            }
            None => device,
        };
        podman.add(format!("--device={}", device));
    }

    if let Some(profile) = container.lookup_last(G, KEY_SECCOMP_PROFILE) {
        podman.add("--security-opt");
        podman.add(format!("seccomp={}", profile));
    }

    for cap in container.lookup_all_strv(G, KEY_DROP_CAPABILITY) {
        podman.add(format!("--cap-drop={}", cap.to_lowercase()));
    }
    for cap in container.lookup_all_strv(G, KEY_ADD_CAPABILITY) {
        podman.add(format!("--cap-add={}", cap.to_lowercase()));
    }

    let read_only = container.lookup_boolean(G, KEY_READ_ONLY);
    if let Some(read_only) = read_only {
        podman.add_bool("--read-only", read_only);
    }
    let read_only = read_only.unwrap_or(false);

    if container.lookup_boolean_with_default(G, KEY_VOLATILE_TMP, false) {
        // --read-only already mounts a tmpfs on /tmp
        if !read_only {
            podman.extend(&["--tmpfs", "/tmp:rw,size=512M,mode=1777"]);
        }
    } else if read_only {
        podman.add("--read-only-tmpfs=false");
    }
}

fn handle_user(container: &UnitFile, podman: &mut PodmanCmdline) -> ConvertResult<()> {
    let user = lookup_non_empty(container, G, KEY_USER);
    let group = lookup_non_empty(container, G, KEY_GROUP);

    match (user, group) {
        (None, None) => {}
        (None, Some(group)) => {
            return InvalidValueSnafu {
                key: KEY_GROUP,
                value: group,
                reason: "Group set without User",
            }
            .fail()
        }
        (Some(user), None) => podman.extend(&["--user", user]),
        (Some(user), Some(group)) => {
            podman.add("--user");
            podman.add(format!("{}:{}", user, group));
        }
    }
    Ok(())
}

/// `Volume=[SOURCE:]DEST[:OPTIONS]`
fn handle_volumes(container: &UnitFile, service: &mut UnitFile, podman: &mut PodmanCmdline) {
    for volume in container.lookup_all(G, KEY_VOLUME) {
        let parts: Vec<&str> = volume.splitn(3, ':').collect();
        let (mut source, dest, options) = match parts.as_slice() {
            [dest] => (String::new(), *dest, String::new()),
            [source, dest] => (source.to_string(), *dest, String::new()),
            [source, dest, options, ..] => (source.to_string(), *dest, format!(":{}", options)),
            [] => continue,
        };

        if source.starts_with('/') {
            service.add(UNIT_GROUP, "RequiresMountsFor", &source);
        } else if source.ends_with(".volume") {
            let volume_service = kind::service_name(UnitKind::Volume, &source);
            service.add(UNIT_GROUP, "Requires", &volume_service);
            service.add(UNIT_GROUP, "After", &volume_service);
            source = kind::podman_object_name(&source);
        }

        podman.add("-v");
        if source.is_empty() {
            podman.add(dest);
        } else {
            podman.add(format!("{}:{}{}", source, dest, options));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::tests::unit;

    fn ctx(rootless: bool) -> ConvertContext {
        ConvertContext {
            rootless,
            podman: "/usr/bin/podman".to_string(),
        }
    }

    fn exec_start(service: &UnitFile) -> Vec<String> {
        service.lookup_last_args(SERVICE_GROUP, "ExecStart").unwrap()
    }

    fn convert_text(text: &str) -> ConvertResult<Conversion> {
        convert(UnitKind::Container, &unit("web.container", text), &ctx(false))
    }

    #[test]
    fn test_minimal_container() {
        let conv = convert_text("[Container]\nImage=quay.io/podman/hello\n").unwrap();
        let service = conv.service;
        assert!(conv.warnings.is_empty());
        assert_eq!(service.filename, "web.service");
        assert!(!service.has_group(CONTAINER_GROUP));
        assert_eq!(
            service.lookup(X_CONTAINER_GROUP, KEY_IMAGE),
            Some("quay.io/podman/hello")
        );
        assert_eq!(
            service.lookup(UNIT_GROUP, "RequiresMountsFor"),
            Some("%t/containers")
        );
        assert_eq!(service.lookup(SERVICE_GROUP, "KillMode"), Some("mixed"));
        assert_eq!(service.lookup(SERVICE_GROUP, "Delegate"), Some("yes"));
        assert_eq!(service.lookup(SERVICE_GROUP, "Type"), Some("notify"));
        assert_eq!(service.lookup(SERVICE_GROUP, "NotifyAccess"), Some("all"));
        assert_eq!(service.lookup(SERVICE_GROUP, "SyslogIdentifier"), Some("%N"));
        assert_eq!(
            service.lookup(SERVICE_GROUP, "Environment"),
            Some("PODMAN_SYSTEMD_UNIT=%n")
        );
        assert_eq!(
            service.lookup_all(SERVICE_GROUP, "ExecStopPost"),
            vec![
                "-/usr/bin/podman rm -f -i --cidfile=%t/%N.cid",
                "-rm -f %t/%N.cid"
            ]
        );
        assert_eq!(
            exec_start(&service),
            vec![
                "/usr/bin/podman",
                "run",
                "--name=systemd-%N",
                "--cidfile=%t/%N.cid",
                "--replace",
                "--rm",
                "--cgroups=split",
                "--sdnotify=conmon",
                "-d",
                "quay.io/podman/hello"
            ]
        );
    }

    #[test]
    fn test_source_path() {
        let mut source = unit("web.container", "[Container]\nImage=localhost/web\n");
        source.path = Some("/etc/containers/systemd/web.container".into());
        let service = convert(UnitKind::Container, &source, &ctx(false))
            .unwrap()
            .service;
        assert_eq!(
            service.lookup(UNIT_GROUP, "SourcePath"),
            Some("/etc/containers/systemd/web.container")
        );
    }

    #[test]
    fn test_missing_image() {
        assert!(matches!(
            convert_text("[Container]\nExec=sleep\n"),
            Err(ConvertError::MissingKey { .. })
        ));
        assert!(matches!(
            convert_text("[Container]\nImage=\n"),
            Err(ConvertError::MissingKey { .. })
        ));
    }

    #[test]
    fn test_ambiguous_image_warning() {
        let conv = convert_text("[Container]\nImage=fedora\n").unwrap();
        assert_eq!(
            conv.warnings,
            vec![Warning::AmbiguousImage {
                filename: "web.container".to_string(),
                image: "fedora".to_string()
            }]
        );
        assert!(conv.warnings[0]
            .to_string()
            .contains("which is not a fully qualified image name"));
    }

    #[test]
    fn test_full_container() {
        let conv = convert_text(
            "[Container]\n\
             Image=localhost/app:latest\n\
             ContainerName=app\n\
             LogDriver=journald\n\
             Timezone=local\n\
             Network=app.network\n\
             RunInit=yes\n\
             Notify=yes\n\
             NoNewPrivileges=true\n\
             SecurityLabelDisable=true\n\
             SecurityLabelType=spc_t\n\
             SeccompProfile=/etc/seccomp.json\n\
             DropCapability=ALL\n\
             AddCapability=CAP_NET_BIND_SERVICE\n\
             ReadOnly=yes\n\
             User=1000\n\
             Group=1000\n\
             Tmpfs=/run:rw\n\
             Volume=/srv/data:/data:Z\n\
             Volume=cache.volume:/cache\n\
             Volume=/scratch\n\
             ExposeHostPort=9090\n\
             PublishPort=8080:80\n\
             Environment=B=2 A=1\n\
             IP=10.88.0.5\n\
             Label=tier=web\n\
             AutoUpdate=registry\n\
             Annotation=owner=ops\n\
             EnvironmentHost=false\n\
             Secret=token,type=env\n\
             Mount=type=tmpfs,destination=/x\n\
             HealthCmd=/bin/true\n\
             PodmanArgs=--pull=never\n\
             Exec=/app --flag \"two words\"\n",
        )
        .unwrap();
        let service = conv.service;

        assert_eq!(
            exec_start(&service),
            vec![
                "/usr/bin/podman",
                "run",
                "--name=app",
                "--cidfile=%t/%N.cid",
                "--replace",
                "--rm",
                "--log-driver",
                "journald",
                "--cgroups=split",
                "--tz=local",
                "--network=systemd-app",
                "--init",
                "--sdnotify=container",
                "-d",
                "--security-opt=no-new-privileges",
                "--security-opt",
                "label:disable",
                "--security-opt",
                "label=type:spc_t",
                "--security-opt",
                "seccomp=/etc/seccomp.json",
                "--cap-drop=all",
                "--cap-add=cap_net_bind_service",
                "--read-only",
                "--read-only-tmpfs=false",
                "--user",
                "1000:1000",
                "--tmpfs",
                "/run:rw",
                "-v",
                "/srv/data:/data:Z",
                "-v",
                "systemd-cache:/cache",
                "-v",
                "/scratch",
                "--expose=9090",
                "-p=8080:80",
                "--env",
                "B=2",
                "--env",
                "A=1",
                "--ip",
                "10.88.0.5",
                "--label",
                "tier=web",
                "--label",
                "io.containers.autoupdate=registry",
                "--annotation",
                "owner=ops",
                "--env-host=false",
                "--secret",
                "token,type=env",
                "--mount",
                "type=tmpfs,destination=/x",
                "--health-cmd",
                "/bin/true",
                "--pull=never",
                "localhost/app:latest",
                "/app",
                "--flag",
                "two words"
            ]
        );
        assert_eq!(
            service.lookup_all(UNIT_GROUP, "Requires"),
            vec!["app-network.service", "cache-volume.service"]
        );
        assert_eq!(
            service.lookup_all(UNIT_GROUP, "RequiresMountsFor"),
            vec!["%t/containers", "/srv/data"]
        );
    }

    #[test]
    fn test_oneshot_and_invalid_type() {
        let service = convert_text("[Container]\nImage=localhost/x\n[Service]\nType=oneshot\n")
            .unwrap()
            .service;
        let args = exec_start(&service);
        assert!(!args.iter().any(|a| a == "-d" || a.starts_with("--sdnotify")));
        assert_eq!(service.lookup(SERVICE_GROUP, "Type"), Some("oneshot"));
        assert!(!service.has_key(SERVICE_GROUP, "NotifyAccess"));

        assert!(matches!(
            convert_text("[Container]\nImage=localhost/x\n[Service]\nType=simple\n"),
            Err(ConvertError::InvalidValue { .. })
        ));
        assert!(matches!(
            convert_text("[Container]\nImage=localhost/x\n[Service]\nKillMode=none\n"),
            Err(ConvertError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_syslog_identifier_kept() {
        let service = convert_text(
            "[Container]\nImage=localhost/x\n[Service]\nSyslogIdentifier=custom\n",
        )
        .unwrap()
        .service;
        assert_eq!(
            service.lookup_all(SERVICE_GROUP, "SyslogIdentifier"),
            vec!["custom"]
        );
    }

    #[test]
    fn test_volatile_tmp() {
        let service = convert_text("[Container]\nImage=localhost/x\nVolatileTmp=yes\n")
            .unwrap()
            .service;
        let args = exec_start(&service).join(" ");
        assert!(args.contains("--tmpfs /tmp:rw,size=512M,mode=1777"));

        let service =
            convert_text("[Container]\nImage=localhost/x\nVolatileTmp=yes\nReadOnly=yes\n")
                .unwrap()
                .service;
        let args = exec_start(&service).join(" ");
        assert!(args.contains("--read-only"));
        assert!(!args.contains("/tmp:rw"));
        assert!(!args.contains("--read-only-tmpfs=false"));
    }

    #[test]
    fn test_user_and_tmpfs_errors() {
        assert!(matches!(
            convert_text("[Container]\nImage=localhost/x\nGroup=10\n"),
            Err(ConvertError::InvalidValue { .. })
        ));
        assert!(matches!(
            convert_text("[Container]\nImage=localhost/x\nTmpfs=/a:rw:extra\n"),
            Err(ConvertError::InvalidValue { .. })
        ));
        assert!(matches!(
            convert_text("[Container]\nImage=localhost/x\nExposeHostPort=http\n"),
            Err(ConvertError::InvalidValue { .. })
        ));
        let service = convert_text("[Container]\nImage=localhost/x\nUser=app\n")
            .unwrap()
            .service;
        assert!(exec_start(&service).join(" ").contains("--user app"));
    }

    #[test]
    fn test_optional_device() {
        let service = convert_text(
            "[Container]\nImage=localhost/x\nAddDevice=-/dev/does-not-exist-quadlet\nAddDevice=-/dev/null:/dev/null\nAddDevice=/dev/fuse\n",
        )
        .unwrap()
        .service;
        let args = exec_start(&service);
        assert!(!args.iter().any(|a| a.contains("does-not-exist")));
        assert!(args.contains(&"--device=/dev/null:/dev/null".to_string()));
        assert!(args.contains(&"--device=/dev/fuse".to_string()));
    }

    #[test]
    fn test_env_file_resolution() {
        let mut source = unit(
            "web.container",
            "[Container]\nImage=localhost/x\nEnvironmentFile=web.env\nEnvironmentFile=%h/other.env\n",
        );
        source.path = Some("/etc/containers/systemd/web.container".into());
        let service = convert(UnitKind::Container, &source, &ctx(false))
            .unwrap()
            .service;
        let args = exec_start(&service).join(" ");
        assert!(args.contains("--env-file /etc/containers/systemd/web.env"));
        assert!(args.contains("--env-file %h/other.env"));
    }

    #[test]
    fn test_environment_order_and_reset() {
        let service = convert_text(
            "[Container]\nImage=localhost/x\nEnvironment=Z=1\nEnvironment=\nEnvironment=C=3 A=1\nEnvironment=C=4\n",
        )
        .unwrap()
        .service;
        let args = exec_start(&service).join(" ");
        assert!(args.contains("--env C=4 --env A=1"));
        assert!(!args.contains("Z=1"));
    }
}
