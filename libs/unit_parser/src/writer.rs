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

//! Unit file serialization.
use crate::unit_file::{Line, UnitFile};
use std::fmt;
use std::io;

impl fmt::Display for UnitFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, group) in self.groups().iter().enumerate() {
            if idx > 0 {
                writeln!(f)?;
            }

            for comment in group.comments() {
                writeln!(f, "{}", comment)?;
            }

            if group.name().is_empty() {
                continue;
            }
            writeln!(f, "[{}]", group.name())?;

            for line in group.lines() {
                match line {
                    Line::Comment(comment) => writeln!(f, "{}", comment)?,
                    Line::Entry { key, value } => writeln!(f, "{}={}", key, value)?,
                }
            }
        }
        Ok(())
    }
}

impl UnitFile {
    /// Write the unit file text to `w`.
    pub fn write<W: io::Write>(&self, w: &mut W) -> io::Result<()> {
        w.write_all(self.to_string().as_bytes())
    }
}
