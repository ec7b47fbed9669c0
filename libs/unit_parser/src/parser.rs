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

//! Line oriented unit file parser.
use crate::error::*;
use crate::unit_file::{Group, Line, UnitFile};
use nom::{
    bytes::complete::is_not,
    character::complete::{char, space0},
    combinator::{all_consuming, rest},
    sequence::{delimited, separated_pair, terminated},
    IResult,
};
use snafu::ResultExt;
use std::path::Path;

const BLANKS: &[char] = &[' ', '\t'];

fn group_header(i: &str) -> IResult<&str, &str> {
    all_consuming(terminated(
        delimited(char('['), is_not("]"), char(']')),
        space0,
    ))(i)
}

fn key_value(i: &str) -> IResult<&str, (&str, &str)> {
    separated_pair(is_not("="), char('='), rest)(i)
}

fn is_comment(line: &str) -> bool {
    line.is_empty() || line.starts_with('#') || line.starts_with(';')
}

/// An odd number of trailing backslashes continues the value on the next line.
fn strip_continuation(value: &str) -> Option<&str> {
    let backslashes = value.chars().rev().take_while(|c| *c == '\\').count();
    if backslashes % 2 == 1 {
        Some(&value[..value.len() - 1])
    } else {
        None
    }
}

struct PendingEntry {
    key: String,
    value: String,
}

#[derive(Default)]
struct UnitFileParser {
    groups: Vec<Group>,
    current: Option<usize>,
    comments: Vec<String>,
    continuation: Option<PendingEntry>,
}

impl UnitFileParser {
    fn feed(&mut self, line_nr: usize, raw: &str) -> Result<()> {
        let line = raw.trim_start_matches(BLANKS);

        if let Some(mut pending) = self.continuation.take() {
            if line.starts_with('#') || line.starts_with(';') {
                self.continuation = Some(pending);
                return Ok(());
            }
            let piece = line.trim_end_matches(BLANKS);
            if !piece.is_empty() {
                pending.value.push(' ');
            }
            match strip_continuation(piece) {
                Some(piece) => {
                    pending.value.push_str(piece.trim_end_matches(BLANKS));
                    self.continuation = Some(pending);
                }
                None => {
                    pending.value.push_str(piece);
                    self.push_entry(pending);
                }
            }
            return Ok(());
        }

        if is_comment(line) {
            self.comments.push(line.to_string());
            return Ok(());
        }

        if line.starts_with('[') {
            return self.start_group(line_nr, line);
        }

        self.parse_entry(line_nr, line)
    }

    fn start_group(&mut self, line_nr: usize, line: &str) -> Result<()> {
        let name = match group_header(line) {
            Ok((_, name)) => name,
            Err(_) => {
                return ParseSnafu {
                    line: line_nr,
                    msg: format!("invalid group header '{}'", line),
                }
                .fail()
            }
        };

        if name.contains('[') || name.chars().any(char::is_control) {
            return ParseSnafu {
                line: line_nr,
                msg: format!("invalid group name '{}'", name),
            }
            .fail();
        }

        // the writer puts a blank line between groups
        while self.comments.last().map_or(false, |c| c.is_empty()) {
            self.comments.pop();
        }
        if !self.groups.is_empty() && self.comments.first().map_or(false, |c| c.is_empty()) {
            self.comments.remove(0);
        }

        // a reopened group continues where it left off
        if let Some(pos) = self.groups.iter().position(|g| g.name() == name) {
            self.current = Some(pos);
            self.flush_comments();
            return Ok(());
        }

        let mut group = Group::new(name);
        for comment in self.comments.drain(..) {
            group.push_comment(comment);
        }
        self.groups.push(group);
        self.current = Some(self.groups.len() - 1);
        Ok(())
    }

    fn parse_entry(&mut self, line_nr: usize, line: &str) -> Result<()> {
        let (key, value) = match key_value(line) {
            Ok((_, (key, value))) => (key.trim_matches(BLANKS), value.trim_matches(BLANKS)),
            Err(_) => {
                return ParseSnafu {
                    line: line_nr,
                    msg: format!("'{}' is not a key-value pair, group, or comment", line),
                }
                .fail()
            }
        };

        if key.is_empty() || key.chars().any(char::is_whitespace) {
            return ParseSnafu {
                line: line_nr,
                msg: format!("invalid key '{}'", key),
            }
            .fail();
        }

        if self.current.is_none() {
            return ParseSnafu {
                line: line_nr,
                msg: format!("key '{}' outside of any group", key),
            }
            .fail();
        }

        let mut pending = PendingEntry {
            key: key.to_string(),
            value: String::new(),
        };
        match strip_continuation(value) {
            Some(value) => {
                pending.value.push_str(value.trim_end_matches(BLANKS));
                self.continuation = Some(pending);
            }
            None => {
                pending.value.push_str(value);
                self.push_entry(pending);
            }
        }
        Ok(())
    }

    fn flush_comments(&mut self) {
        if self.comments.is_empty() {
            return;
        }
        let pos = match self.current {
            Some(pos) => pos,
            None => {
                let mut group = Group::new("");
                for comment in self.comments.drain(..) {
                    group.push_comment(comment);
                }
                self.groups.push(group);
                return;
            }
        };
        if let Some(group) = self.groups.get_mut(pos) {
            for comment in self.comments.drain(..) {
                group.push_line(Line::Comment(comment));
            }
        }
    }

    fn push_entry(&mut self, entry: PendingEntry) {
        self.flush_comments();
        if let Some(group) = self.current.and_then(|pos| self.groups.get_mut(pos)) {
            group.push_line(Line::Entry {
                key: entry.key,
                value: entry.value,
            });
        }
    }

    fn finish(mut self, line_nr: usize) -> Result<Vec<Group>> {
        if let Some(pending) = self.continuation.take() {
            return ParseSnafu {
                line: line_nr,
                msg: format!("unterminated continuation of key '{}'", pending.key),
            }
            .fail();
        }
        self.flush_comments();
        Ok(self.groups)
    }
}

impl UnitFile {
    /// Parse unit file text. The result has no path and an empty filename.
    pub fn parse(input: &str) -> Result<Self> {
        let mut parser = UnitFileParser::default();
        let mut line_nr = 0;
        for (idx, line) in input.lines().enumerate() {
            line_nr = idx + 1;
            parser.feed(line_nr, line)?;
        }

        let mut unit = UnitFile::new("");
        for group in parser.finish(line_nr)? {
            unit.push_group(group);
        }
        Ok(unit)
    }

    /// Read and parse the unit file at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let filename = match path.file_name().and_then(|n| n.to_str()) {
            Some(name) => name.to_string(),
            None => {
                return InvalidFilenameSnafu {
                    path: path.to_path_buf(),
                }
                .fail()
            }
        };

        let content = std::fs::read_to_string(path).context(ReadFileSnafu {
            path: path.to_path_buf(),
        })?;

        let mut unit = Self::parse(&content)?;
        unit.path = Some(path.to_path_buf());
        unit.filename = filename;
        Ok(unit)
    }
}
