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

//! The in-memory unit file model.
use crate::split::{escape_words, split_words, SplitFlags};
use std::path::PathBuf;

const BLANKS: &[char] = &[' ', '\t'];

/// Ordered `key=value` pairs; a repeated key keeps its first position and
/// takes the last value.
pub type KeyValues = Vec<(String, String)>;

/// One line inside a group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line {
    /// A comment or blank line, kept verbatim.
    Comment(String),
    /// A `key=value` assignment.
    Entry {
        /// the key, never empty
        key: String,
        /// the raw value
        value: String,
    },
}

impl Line {
    fn is_key(&self, name: &str) -> bool {
        matches!(self, Line::Entry { key, .. } if key == name)
    }
}

/// A `[Name]` section with its lines in file order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Group {
    name: String,
    comments: Vec<String>,
    lines: Vec<Line>,
}

impl Group {
    pub(crate) fn new(name: &str) -> Self {
        Group {
            name: name.to_string(),
            ..Default::default()
        }
    }

    /// The group name, empty for the anonymous group holding the comments of
    /// a file without any group.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Comments written before the group header.
    pub fn comments(&self) -> &[String] {
        &self.comments
    }

    /// All lines of the group, comments included.
    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    /// The `(key, value)` assignments in file order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.lines.iter().filter_map(|line| match line {
            Line::Entry { key, value } => Some((key.as_str(), value.as_str())),
            Line::Comment(_) => None,
        })
    }

    pub(crate) fn push_comment(&mut self, comment: String) {
        self.comments.push(comment);
    }

    pub(crate) fn push_line(&mut self, line: Line) {
        self.lines.push(line);
    }

    fn find_last(&self, key: &str) -> Option<&str> {
        self.lines.iter().rev().find_map(|line| match line {
            Line::Entry { key: k, value } if k == key => Some(value.as_str()),
            _ => None,
        })
    }

    fn add(&mut self, key: &str, value: &str) {
        self.lines.push(Line::Entry {
            key: key.to_string(),
            value: value.to_string(),
        });
    }

    fn set(&mut self, key: &str, value: &str) {
        let last = self.lines.iter_mut().rev().find(|line| line.is_key(key));
        match last {
            Some(Line::Entry { value: v, .. }) => *v = value.to_string(),
            _ => self.add(key, value),
        }
    }

    fn unset(&mut self, key: &str) {
        self.lines.retain(|line| !line.is_key(key));
    }
}

/// A systemd-style unit file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnitFile {
    /// where the file was read from, or where it will be written to
    pub path: Option<PathBuf>,
    /// the file name, e.g. `foo.container` or `foo.service`
    pub filename: String,
    groups: Vec<Group>,
}

impl UnitFile {
    /// An empty unit file without path.
    pub fn new(filename: &str) -> Self {
        UnitFile {
            path: None,
            filename: filename.to_string(),
            groups: Vec::new(),
        }
    }

    /// The groups in file order.
    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    pub(crate) fn push_group(&mut self, group: Group) {
        self.groups.push(group);
    }

    /// The group named `name`.
    pub fn group(&self, name: &str) -> Option<&Group> {
        self.groups.iter().find(|g| g.name == name)
    }

    fn group_mut(&mut self, name: &str) -> Option<&mut Group> {
        self.groups.iter_mut().find(|g| g.name == name)
    }

    /// The group named `name`, appended at the end when missing.
    pub fn ensure_group(&mut self, name: &str) -> &mut Group {
        let pos = match self.groups.iter().position(|g| g.name == name) {
            Some(pos) => pos,
            None => {
                self.groups.push(Group::new(name));
                self.groups.len() - 1
            }
        };
        &mut self.groups[pos]
    }

    /// Whether the file has a group named `name`.
    pub fn has_group(&self, name: &str) -> bool {
        self.group(name).is_some()
    }

    /// Whether `key` is assigned at least once in `group`.
    pub fn has_key(&self, group: &str, key: &str) -> bool {
        self.group(group)
            .map_or(false, |g| g.lines.iter().any(|line| line.is_key(key)))
    }

    /// The distinct keys of `group`, in order of first appearance.
    pub fn list_keys(&self, group: &str) -> Vec<String> {
        let mut keys: Vec<String> = Vec::new();
        if let Some(g) = self.group(group) {
            for (key, _) in g.entries() {
                if !keys.iter().any(|k| k == key) {
                    keys.push(key.to_string());
                }
            }
        }
        keys
    }

    /// The last value of `key`.
    pub fn lookup(&self, group: &str, key: &str) -> Option<&str> {
        self.group(group).and_then(|g| g.find_last(key))
    }

    /// The last value of `key`, without surrounding blanks.
    pub fn lookup_last(&self, group: &str, key: &str) -> Option<&str> {
        self.lookup(group, key).map(|v| v.trim_matches(BLANKS))
    }

    /// All values of `key` in file order. An empty assignment drops the
    /// values collected before it.
    pub fn lookup_all(&self, group: &str, key: &str) -> Vec<String> {
        let mut values = Vec::new();
        if let Some(g) = self.group(group) {
            for (k, value) in g.entries() {
                if k != key {
                    continue;
                }
                let value = value.trim_matches(BLANKS);
                if value.is_empty() {
                    values.clear();
                } else {
                    values.push(value.to_string());
                }
            }
        }
        values
    }

    /// All values of `key`, each split into words.
    pub fn lookup_all_strv(&self, group: &str, key: &str) -> Vec<String> {
        self.lookup_all(group, key)
            .iter()
            .flat_map(|value| split_words(value, SplitFlags::ARGS).unwrap_or_default())
            .collect()
    }

    /// All values of `key` split into command line arguments.
    pub fn lookup_all_args(&self, group: &str, key: &str) -> Vec<String> {
        self.lookup_all_strv(group, key)
    }

    /// The last value of `key` split into command line arguments.
    pub fn lookup_last_args(&self, group: &str, key: &str) -> Option<Vec<String>> {
        self.lookup_last(group, key)
            .and_then(|value| split_words(value, SplitFlags::ARGS).ok())
    }

    /// All `k=v` words of every value of `key`. Words without `=` are skipped.
    pub fn lookup_all_key_val(&self, group: &str, key: &str) -> KeyValues {
        let mut res: KeyValues = Vec::new();
        for word in self.lookup_all_strv(group, key) {
            let (k, v) = match word.split_once('=') {
                Some(kv) => kv,
                None => continue,
            };
            match res.iter_mut().find(|(existing, _)| existing == k) {
                Some((_, value)) => *value = v.to_string(),
                None => res.push((k.to_string(), v.to_string())),
            }
        }
        res
    }

    /// `Some(true)` for `1`, `yes`, `true` and `on`, `Some(false)` for any
    /// other value, `None` when unset.
    pub fn lookup_boolean(&self, group: &str, key: &str) -> Option<bool> {
        self.lookup_last(group, key).map(|v| {
            ["1", "yes", "true", "on"]
                .iter()
                .any(|t| v.eq_ignore_ascii_case(t))
        })
    }

    /// Like [`UnitFile::lookup_boolean`], with a default for unset keys.
    pub fn lookup_boolean_with_default(&self, group: &str, key: &str, default: bool) -> bool {
        self.lookup_boolean(group, key).unwrap_or(default)
    }

    /// The last value of `key` as an unsigned number, `default` when unset
    /// or malformed.
    pub fn lookup_u32(&self, group: &str, key: &str, default: u32) -> u32 {
        self.lookup_last(group, key)
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    }

    /// Append an assignment to `group`, creating the group when needed.
    pub fn add(&mut self, group: &str, key: &str, value: &str) {
        self.ensure_group(group).add(key, value);
    }

    /// Replace the last assignment of `key`, or append one.
    pub fn set(&mut self, group: &str, key: &str, value: &str) {
        self.ensure_group(group).set(key, value);
    }

    /// [`UnitFile::set`] for several `(key, value)` pairs.
    pub fn setv(&mut self, group: &str, pairs: &[(&str, &str)]) {
        let g = self.ensure_group(group);
        for (key, value) in pairs {
            g.set(key, value);
        }
    }

    /// Remove every assignment of `key`.
    pub fn unset(&mut self, group: &str, key: &str) {
        if let Some(g) = self.group_mut(group) {
            g.unset(key);
        }
    }

    /// Append `args` as one escaped command line.
    pub fn add_cmdline<S: AsRef<str>>(&mut self, group: &str, key: &str, args: &[S]) {
        self.add(group, key, &escape_words(args));
    }

    /// Rename `from` to `to`. When `to` already exists the lines of `from`
    /// are moved to its end.
    pub fn rename_group(&mut self, from: &str, to: &str) {
        let from_pos = match self.groups.iter().position(|g| g.name == from) {
            Some(pos) => pos,
            None => return,
        };

        if !self.has_group(to) {
            self.groups[from_pos].name = to.to_string();
            return;
        }

        let moved = self.groups.remove(from_pos);
        let target = self.ensure_group(to);
        target.comments.extend(moved.comments);
        target.lines.extend(moved.lines);
    }

    /// Put comment lines before the first group. An empty string becomes a
    /// bare `#`.
    pub fn prepend_comment(&mut self, comments: &[&str]) {
        if self.groups.is_empty() {
            self.groups.push(Group::new(""));
        }

        let lines = comments.iter().map(|c| {
            if c.is_empty() {
                "#".to_string()
            } else {
                format!("# {}", c)
            }
        });
        let first = &mut self.groups[0];
        first.comments.splice(0..0, lines);
    }
}
