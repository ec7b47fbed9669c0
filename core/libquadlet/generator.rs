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

//! One generator run: discover quadlet files, convert them, write the
//! services and enable them.
//!
//! Generators run very early at boot, so nothing here may rely on /var,
//! /home or syslog being available.
use crate::constants::*;
use crate::convert::{self, ConvertContext, Warning};
use crate::error::*;
use crate::install;
use crate::kind::UnitKind;
use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::os::unix::fs::OpenOptionsExt;
use std::path::{Path, PathBuf};
use unit_parser::UnitFile;
use walkdir::WalkDir;

/// Everything a run needs, resolved by the caller from the command line and
/// the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorConfig {
    /// where services are written, unused in dry run mode
    pub output_dir: Option<PathBuf>,
    /// source directories, highest priority first
    pub unit_dirs: Vec<PathBuf>,
    /// generate user services
    pub rootless: bool,
    /// print the services instead of writing them
    pub dry_run: bool,
    /// the podman binary
    pub podman: String,
    /// the name written into the banner of every generated file
    pub program: String,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        GeneratorConfig {
            output_dir: None,
            unit_dirs: Vec::new(),
            rootless: false,
            dry_run: false,
            podman: DEFAULT_PODMAN.to_string(),
            program: "quadlet".to_string(),
        }
    }
}

/// The source directories when `QUADLET_UNIT_DIRS` is not set.
///
/// System: /etc/containers/systemd, /usr/share/containers/systemd.
/// User: $XDG_CONFIG_HOME/containers/systemd, /etc/containers/systemd/users/$UID,
/// /etc/containers/systemd/users.
pub fn default_unit_dirs(rootless: bool, config_home: Option<&Path>, uid: u32) -> Vec<PathBuf> {
    if !rootless {
        return vec![PathBuf::from(UNIT_DIR_ADMIN), PathBuf::from(UNIT_DIR_DISTRO)];
    }

    let mut dirs = Vec::new();
    match config_home {
        Some(config) => dirs.push(config.join("containers/systemd")),
        None => log::warn!("Neither $XDG_CONFIG_HOME nor $HOME is set"),
    }
    let users = Path::new(UNIT_DIR_ADMIN).join("users");
    dirs.push(users.join(uid.to_string()));
    dirs.push(users);
    dirs
}

/// Split a colon separated directory list.
pub fn parse_unit_dirs(value: &str) -> Vec<PathBuf> {
    value
        .split(':')
        .filter(|dir| !dir.is_empty())
        .map(PathBuf::from)
        .collect()
}

/// The quadlet file names in `dir`, sorted. A missing directory has none.
pub fn scan_dir(dir: &Path) -> Vec<String> {
    let mut names = Vec::new();

    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                let not_found = e
                    .io_error()
                    .map_or(false, |io| io.kind() == io::ErrorKind::NotFound);
                if !not_found {
                    log::error!("Can't read \"{}\": {}", dir.display(), e);
                }
                continue;
            }
        };

        if let Some(name) = entry.file_name().to_str() {
            if UnitKind::from_filename(name).is_some() {
                names.push(name.to_string());
            }
        }
    }

    names
}

/// Merge directory listings given in priority order. A file name belongs to
/// the first directory whose file `load` accepts; a file that fails to load
/// leaves the name to the next directories.
pub fn merge_units<T>(
    listings: Vec<(PathBuf, Vec<String>)>,
    mut load: impl FnMut(&Path) -> Option<T>,
) -> BTreeMap<String, T> {
    let mut units = BTreeMap::new();
    for (dir, names) in listings {
        for name in names {
            if units.contains_key(&name) {
                continue;
            }
            if let Some(unit) = load(&dir.join(&name)) {
                units.insert(name, unit);
            }
        }
    }
    units
}

/// What a run did. Failures of single units do not stop the run.
#[derive(Debug, Default)]
pub struct GenerateReport {
    /// paths of the services written or printed
    pub generated: Vec<PathBuf>,
    /// per unit failures, already logged
    pub failed: Vec<Error>,
    /// conversion warnings, already logged
    pub warnings: Vec<Warning>,
    /// a service could not be printed in dry run mode
    pub render_failed: bool,
}

/// Converts the quadlet files found in the configured directories.
pub struct Generator {
    config: GeneratorConfig,
}

impl Generator {
    pub fn new(config: GeneratorConfig) -> Self {
        Generator { config }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Load the quadlet files to convert, by file name. Files that fail to
    /// load are logged and returned as errors.
    pub fn load_units(&self) -> (BTreeMap<String, UnitFile>, Vec<Error>) {
        let listings = self
            .config
            .unit_dirs
            .iter()
            .map(|dir| (dir.clone(), scan_dir(dir)))
            .collect();

        let mut errors = Vec::new();
        let units = merge_units(listings, |path| {
            log::debug!("Loading source unit file {}", path.display());
            match UnitFile::load(path).context(LoadSnafu { path }) {
                Ok(unit) => Some(unit),
                Err(e) => {
                    log::error!("{}", e);
                    errors.push(e);
                    None
                }
            }
        });
        (units, errors)
    }

    /// Run the generator. Dry run output goes to `out`.
    pub fn run(&self, out: &mut impl Write) -> Result<GenerateReport> {
        let output_dir = match (&self.config.output_dir, self.config.dry_run) {
            (_, true) => None,
            (Some(dir), false) => Some(dir.as_path()),
            (None, false) => return MissingOutputDirSnafu.fail(),
        };

        if let Some(dir) = output_dir {
            log::debug!("Starting quadlet-generator, output to: {}", dir.display());
        }

        let (units, failed) = self.load_units();
        let mut report = GenerateReport {
            failed,
            ..Default::default()
        };

        if units.is_empty() {
            log::debug!("No files to parse from {:?}", self.config.unit_dirs);
            return Ok(report);
        }

        if let Some(dir) = output_dir {
            fs::create_dir_all(dir).context(CreateOutputDirSnafu { path: dir })?;
        }

        let ctx = ConvertContext {
            rootless: self.config.rootless,
            podman: self.config.podman.clone(),
        };

        for (name, source) in &units {
            if let Err(e) = self.generate_one(name, source, &ctx, output_dir, out, &mut report) {
                log::error!("{}", e);
                if let Error::Render { .. } = e {
                    report.render_failed = true;
                }
                report.failed.push(e);
            }
        }

        Ok(report)
    }

    fn generate_one(
        &self,
        name: &str,
        source: &UnitFile,
        ctx: &ConvertContext,
        output_dir: Option<&Path>,
        out: &mut impl Write,
        report: &mut GenerateReport,
    ) -> Result<()> {
        let kind = match UnitKind::from_filename(name) {
            Some(kind) => kind,
            None => {
                log::error!("Unsupported file type '{}'", name);
                return Ok(());
            }
        };

        let conversion = convert::convert(kind, source, ctx).context(ConvertSnafu { name })?;
        for warning in conversion.warnings {
            log::warn!("{}", warning);
            report.warnings.push(warning);
        }

        let mut service = conversion.service;
        let service_path = match output_dir {
            Some(dir) => dir.join(&service.filename),
            None => PathBuf::from(&service.filename),
        };
        service.path = Some(service_path.clone());

        match output_dir {
            None => {
                write!(out, "---{}---\n{}\n", service_path.display(), service).context(
                    RenderSnafu {
                        name: service.filename.as_str(),
                    },
                )?;
            }
            Some(dir) => {
                write_unit(&mut service, &service_path, &self.config.program)?;
                for e in install::install_symlinks(dir, &service) {
                    log::error!("{}", e);
                    report.failed.push(e);
                }
            }
        }

        report.generated.push(service_path);
        Ok(())
    }
}

/// Write `service` to `path` below the banner naming `program`.
pub fn write_unit(service: &mut UnitFile, path: &Path, program: &str) -> Result<()> {
    log::debug!("writing '{}'", path.display());

    let banner = format!("Automatically generated by {}", program);
    service.prepend_comment(&["", &banner, ""]);

    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o644)
        .open(path)
        .context(WriteUnitSnafu { path })?;
    service.write(&mut file).context(WriteUnitSnafu { path })?;
    file.sync_all().context(WriteUnitSnafu { path })
}
