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

//!
use log::{Level, Log};
use std::{
    fs::{File, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
    sync::{Mutex, MutexGuard},
};

const KMSG_PATH: &str = "/dev/kmsg";

/// Where the kernel log stands for the next record.
#[derive(Debug)]
enum KmsgState {
    /// not requested, every record goes to stderr
    Disabled,
    /// requested, opened on the next record
    Unopened,
    Open(File),
    /// opening failed once, never retried
    Unavailable,
}

fn syslog_priority(level: Level) -> libc::c_int {
    match level {
        Level::Error => libc::LOG_ERR,
        Level::Warn => libc::LOG_WARNING,
        Level::Info => libc::LOG_INFO,
        Level::Debug | Level::Trace => libc::LOG_DEBUG,
    }
}

/// Writes `name[pid]: message` lines to the kernel log. Records that cannot
/// be written there go to stderr.
pub struct Logger {
    name: String,
    level: Level,
    kmsg_path: PathBuf,
    kmsg: Mutex<KmsgState>,
}

impl Logger {
    /// Create a logger for the given targets, `kmsg` and/or `console`.
    pub fn new(name: &str, level: Level, targets: &[&str]) -> Self {
        let mut kmsg = KmsgState::Disabled;
        for target in targets {
            match *target {
                "kmsg" => kmsg = KmsgState::Unopened,
                "console" => {}
                _ => eprintln!("{}: log target '{}' is strange, ignoring.", name, target),
            }
        }

        Logger {
            name: name.to_string(),
            level,
            kmsg_path: PathBuf::from(KMSG_PATH),
            kmsg: Mutex::new(kmsg),
        }
    }

    /// Use another device than `/dev/kmsg`.
    pub fn with_kmsg_path(mut self, path: &Path) -> Self {
        self.kmsg_path = path.to_path_buf();
        self
    }

    fn state(&self) -> MutexGuard<'_, KmsgState> {
        match self.kmsg.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Whether the kernel log is currently open.
    pub fn kmsg_open(&self) -> bool {
        matches!(*self.state(), KmsgState::Open(_))
    }

    fn format_line(&self, msg: &str) -> String {
        format!("{}[{}]: {}", self.name, std::process::id(), msg)
    }

    /// Try the kernel log first, `fallback` otherwise.
    fn dispatch(&self, level: Level, msg: &str, fallback: &mut impl Write) {
        let line = self.format_line(msg);
        if !self.write_kmsg(level, &line) {
            let _ = writeln!(fallback, "{}", line);
        }
    }

    fn write_kmsg(&self, level: Level, line: &str) -> bool {
        let mut state = self.state();

        if let KmsgState::Unopened = *state {
            *state = match OpenOptions::new().write(true).open(&self.kmsg_path) {
                Ok(file) => KmsgState::Open(file),
                Err(_) => KmsgState::Unavailable,
            };
        }

        let file = match &mut *state {
            KmsgState::Open(file) => file,
            _ => return false,
        };

        let entry = format!("<{}>{}\n", syslog_priority(level), line);
        if file.write_all(entry.as_bytes()).is_err() {
            *state = KmsgState::Unopened;
            return false;
        }
        true
    }
}

impl Log for Logger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &log::Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let mut stderr = std::io::stderr();
        self.dispatch(record.level(), &record.args().to_string(), &mut stderr);
    }

    fn flush(&self) {}
}

/// Initialize the global static logger instance.
/// Available log `targets` include `kmsg`, `console`. Without `kmsg`, or once
/// the kernel log fails, messages are written to stderr.
///
/// # Arguments
///
/// * `name` - The program name prefixed to every line.
/// * `level` - Log message level.
/// * `targets` - A set of log targets.
pub fn init_log(name: &str, level: Level, targets: Vec<&str>) {
    let logger = Logger::new(name, level, &targets);

    if let Err(e) = log::set_boxed_logger(Box::new(logger)) {
        eprintln!("{}: failed to set global logger: {:?}", name, e);
        return;
    }

    log::set_max_level(level.to_level_filter());
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_console_only() {
        let logger = Logger::new("quadlet-generator", Level::Info, &["console"]);
        let mut out = Vec::new();
        logger.dispatch(Level::Info, "hello", &mut out);
        assert_eq!(
            String::from_utf8(out).unwrap(),
            format!("quadlet-generator[{}]: hello\n", std::process::id())
        );
        assert!(!logger.kmsg_open());
    }

    #[test]
    fn test_kmsg_write() {
        let dir = tempfile::tempdir().unwrap();
        let kmsg = dir.path().join("kmsg");
        fs::write(&kmsg, "").unwrap();

        let logger = Logger::new("quadlet-generator", Level::Debug, &["kmsg", "console"])
            .with_kmsg_path(&kmsg);
        let mut out = Vec::new();
        logger.dispatch(Level::Error, "broken", &mut out);
        logger.dispatch(Level::Debug, "details", &mut out);

        assert!(out.is_empty());
        assert!(logger.kmsg_open());
        let pid = std::process::id();
        assert_eq!(
            fs::read_to_string(&kmsg).unwrap(),
            format!(
                "<3>quadlet-generator[{}]: broken\n<7>quadlet-generator[{}]: details\n",
                pid, pid
            )
        );
    }

    #[test]
    fn test_kmsg_unavailable_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let logger = Logger::new("quadlet-generator", Level::Info, &["kmsg"])
            .with_kmsg_path(&dir.path().join("missing/kmsg"));

        let mut out = Vec::new();
        logger.dispatch(Level::Warn, "first", &mut out);
        logger.dispatch(Level::Warn, "second", &mut out);

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("]: first\n"));
        assert!(text.contains("]: second\n"));
        assert!(matches!(*logger.state(), KmsgState::Unavailable));
    }

    #[test]
    fn test_kmsg_write_failure_falls_back() {
        // opens fine, every write fails with ENOSPC
        let full = Path::new("/dev/full");
        if !full.exists() {
            return;
        }
        let logger =
            Logger::new("quadlet-generator", Level::Info, &["kmsg"]).with_kmsg_path(full);

        let mut out = Vec::new();
        logger.dispatch(Level::Error, "lost", &mut out);

        assert!(String::from_utf8(out).unwrap().contains("]: lost\n"));
        assert!(!logger.kmsg_open());
        assert!(matches!(*logger.state(), KmsgState::Unopened));
    }

    #[test]
    fn test_level_filter() {
        let logger = Logger::new("quadlet-generator", Level::Info, &["console"]);
        let debug = log::Metadata::builder().level(Level::Debug).build();
        let warn = log::Metadata::builder().level(Level::Warn).build();
        assert!(!logger.enabled(&debug));
        assert!(logger.enabled(&warn));
    }
}
