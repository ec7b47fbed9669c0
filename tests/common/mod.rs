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

use std::{
    fs,
    path::Path,
    process::{Command, Output},
};

/// Write `files` as (name, content) pairs into `dir`.
pub fn write_units(dir: &Path, files: &[(&str, &str)]) {
    for (name, content) in files {
        fs::write(dir.join(name), content).unwrap();
    }
}

/// Run the generator binary on `unit_dirs`, never logging to kmsg.
pub fn run_quadlet(unit_dirs: &[&Path], args: &[&str]) -> Output {
    let dirs: Vec<String> = unit_dirs
        .iter()
        .map(|dir| dir.to_string_lossy().into_owned())
        .collect();

    let output = Command::new(env!("CARGO_BIN_EXE_quadlet"))
        .env("QUADLET_UNIT_DIRS", dirs.join(":"))
        .env_remove("PODMAN")
        .arg("--no-kmsg-log")
        .args(args)
        .output()
        .expect("failed to execute quadlet");

    println!("stderr: {}", String::from_utf8_lossy(&output.stderr));
    output
}

pub fn stdout_of(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

pub fn stderr_of(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}
