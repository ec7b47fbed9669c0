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

//! podman command line builder
use unit_parser::KeyValues;

/// The argument vector of a podman invocation, binary first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PodmanCmdline {
    args: Vec<String>,
}

impl PodmanCmdline {
    /// Start a command line with `podman` followed by `args`.
    pub fn new(podman: &str, args: &[&str]) -> Self {
        let mut cmdline = PodmanCmdline {
            args: vec![podman.to_string()],
        };
        cmdline.extend(args);
        cmdline
    }

    pub fn add(&mut self, arg: impl Into<String>) {
        self.args.push(arg.into());
    }

    pub fn extend<S: AsRef<str>>(&mut self, args: &[S]) {
        self.args
            .extend(args.iter().map(|a| a.as_ref().to_string()));
    }

    /// `flag` when `value` is true, `flag=false` otherwise.
    pub fn add_bool(&mut self, flag: &str, value: bool) {
        if value {
            self.add(flag);
        } else {
            self.add(format!("{}=false", flag));
        }
    }

    /// `flag k=v` for every pair.
    pub fn add_keys(&mut self, flag: &str, pairs: &KeyValues) {
        for (key, value) in pairs {
            self.add(flag);
            self.add(format!("{}={}", key, value));
        }
    }

    pub fn add_env(&mut self, env: &KeyValues) {
        self.add_keys("--env", env);
    }

    pub fn add_labels(&mut self, labels: &KeyValues) {
        self.add_keys("--label", labels);
    }

    pub fn add_annotations(&mut self, annotations: &KeyValues) {
        self.add_keys("--annotation", annotations);
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }
}
