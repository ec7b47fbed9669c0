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

//! quadlet systemd generator
//!
//! Installed as `podman-system-generator` and `podman-user-generator`,
//! called by systemd with the normal, early and late output directories.

use clap::Parser;
use log::Level;
use quadlet::constants::*;
use quadlet::generator::{self, Generator, GeneratorConfig};
use std::env;
use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};
use std::process::exit;

/// parse program arguments
#[derive(Parser, Debug)]
#[clap(version, about = "Generate systemd services from podman quadlet files", long_about = None)]
struct Args {
    /// Print debug information
    #[clap(short, long)]
    verbose: bool,

    /// Don't log to kmsg
    #[clap(long = "no-kmsg-log")]
    no_kmsg_log: bool,

    /// Run as systemd user
    #[clap(long)]
    user: bool,

    /// Run in dryrun mode printing debug information
    #[clap(long)]
    dryrun: bool,

    /// Output directories: normal, early and late. Only the first is used.
    #[clap(parse(from_os_str), value_name = "OUTPUT_DIR")]
    output_dirs: Vec<PathBuf>,
}

/// Long options that were also accepted with a single dash.
const SINGLE_DASH_LONG: &[&str] = &["-dryrun", "-user", "-no-kmsg-log", "-version"];

/// Turn `-dryrun` into `--dryrun` and the like, up to a `--` separator.
fn normalize_args(args: impl IntoIterator<Item = OsString>) -> Vec<OsString> {
    let mut options_done = false;
    args.into_iter()
        .map(|arg| {
            if options_done {
                return arg;
            }
            let long = match arg.to_str() {
                Some("--") => {
                    options_done = true;
                    None
                }
                Some(opt) if SINGLE_DASH_LONG.contains(&opt) => Some(format!("-{}", opt)),
                _ => None,
            };
            long.map_or(arg, OsString::from)
        })
        .collect()
}

/// `podman-user-generator` generates user services
fn is_user_program(program: &str) -> bool {
    Path::new(program)
        .file_name()
        .map_or(false, |name| name.to_string_lossy().contains("user"))
}

fn non_empty_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.is_empty())
}

fn unit_dirs(rootless: bool) -> Vec<PathBuf> {
    if let Some(dirs) = non_empty_env(ENV_UNIT_DIRS) {
        return generator::parse_unit_dirs(&dirs);
    }

    let config_home = non_empty_env("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|| non_empty_env("HOME").map(|home| Path::new(&home).join(".config")));
    generator::default_unit_dirs(
        rootless,
        config_home.as_deref(),
        nix::unistd::getuid().as_raw(),
    )
}

fn main() {
    let args = Args::parse_from(normalize_args(env::args_os()));

    let program = env::args_os()
        .next()
        .map(|arg| arg.to_string_lossy().into_owned())
        .unwrap_or_else(|| "quadlet".to_string());
    let rootless = args.user || is_user_program(&program);

    let level = if args.verbose || args.dryrun {
        Level::Debug
    } else {
        Level::Info
    };
    if args.no_kmsg_log || args.dryrun {
        log::init_log_to_console(LOG_NAME, level);
    } else {
        log::init_log_to_kmsg_console(LOG_NAME, level);
    }

    let config = GeneratorConfig {
        output_dir: args.output_dirs.first().cloned(),
        unit_dirs: unit_dirs(rootless),
        rootless,
        dry_run: args.dryrun,
        podman: non_empty_env(ENV_PODMAN).unwrap_or_else(|| DEFAULT_PODMAN.to_string()),
        program,
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match Generator::new(config).run(&mut out) {
        Ok(report) => {
            if report.render_failed {
                exit(1);
            }
        }
        Err(e) => {
            log::error!("{}", e);
            exit(1);
        }
    }
}
