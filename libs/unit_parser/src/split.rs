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

//! Word splitting and escaping of unit file values.
//!
//! The grammar follows systemd's `extract_first_word()`:
//!
//! * words are separated by runs of space, tab, newline or carriage return;
//! * with [`SplitFlags::UNQUOTE`], `'...'` and `"..."` group characters into
//!   the current word and the quotes are removed. A quoted part may start in
//!   the middle of a word, `a"b c"d` is the single word `ab cd`;
//! * a backslash escapes the next character, inside quotes too. With
//!   [`SplitFlags::CUNESCAPE`] the C escapes `\a \b \f \n \r \t \v \\ \" \' \s`,
//!   `\xNN`, `\NNN` (octal), `\uXXXX` and `\UXXXXXXXX` are decoded;
//! * with [`SplitFlags::RELAX`] an unterminated quote runs to the end of the
//!   input, a trailing backslash is dropped and an invalid escape is kept
//!   literally. Without it these are errors.

use bitflags::bitflags;
use snafu::Snafu;
use std::fmt::Write as _;
use std::iter::Peekable;
use std::str::Chars;

/// Characters separating words.
pub const WHITESPACE: &[char] = &[' ', '\t', '\n', '\r'];

bitflags! {
    /// How [`split_words`] treats quotes and escapes.
    pub struct SplitFlags: u32 {
        /// Tolerate unterminated quotes, trailing backslashes and bad escapes.
        const RELAX = 1 << 0;
        /// Remove quotes, keeping the quoted characters in one word.
        const UNQUOTE = 1 << 1;
        /// Decode C escape sequences.
        const CUNESCAPE = 1 << 2;
        /// The flags used for every list-valued directive.
        const ARGS = Self::RELAX.bits | Self::UNQUOTE.bits | Self::CUNESCAPE.bits;
    }
}

/// Errors of a strict (non relaxed) split.
#[derive(Debug, Snafu, Clone, PartialEq, Eq)]
#[allow(missing_docs)]
#[snafu(visibility(pub))]
pub enum SplitError {
    #[snafu(display("unterminated quote"))]
    UnterminatedQuote,

    #[snafu(display("trailing backslash"))]
    TrailingBackslash,

    #[snafu(display("invalid escape sequence '\\{}'", seq))]
    InvalidEscape { seq: String },
}

/// Split `input` into words.
pub fn split_words(input: &str, flags: SplitFlags) -> Result<Vec<String>, SplitError> {
    let mut words = Vec::new();
    let mut chars = input.chars().peekable();

    loop {
        while chars.next_if(|c| WHITESPACE.contains(c)).is_some() {}
        if chars.peek().is_none() {
            break;
        }
        words.push(next_word(&mut chars, flags)?);
    }

    Ok(words)
}

fn next_word(chars: &mut Peekable<Chars<'_>>, flags: SplitFlags) -> Result<String, SplitError> {
    let mut word = String::new();
    let mut quote: Option<char> = None;

    while let Some(c) = chars.next() {
        match (quote, c) {
            (_, '\\') => unescape_into(&mut word, chars, flags)?,
            (Some(q), c) if c == q => quote = None,
            (Some(_), c) => word.push(c),
            (None, '\'' | '"') if flags.contains(SplitFlags::UNQUOTE) => quote = Some(c),
            (None, c) if WHITESPACE.contains(&c) => return Ok(word),
            (None, c) => word.push(c),
        }
    }

    if quote.is_some() && !flags.contains(SplitFlags::RELAX) {
        return Err(SplitError::UnterminatedQuote);
    }

    Ok(word)
}

fn unescape_into(
    word: &mut String,
    chars: &mut Peekable<Chars<'_>>,
    flags: SplitFlags,
) -> Result<(), SplitError> {
    let relax = flags.contains(SplitFlags::RELAX);

    let c = match chars.next() {
        Some(c) => c,
        None if relax => return Ok(()),
        None => return Err(SplitError::TrailingBackslash),
    };

    // an escaped separator is part of the word
    if !flags.contains(SplitFlags::CUNESCAPE) || WHITESPACE.contains(&c) {
        word.push(c);
        return Ok(());
    }

    match cunescape_one(c, chars) {
        Ok(decoded) => word.push(decoded),
        Err(seq) if relax => {
            word.push('\\');
            word.push_str(&seq);
        }
        Err(seq) => return Err(SplitError::InvalidEscape { seq }),
    }

    Ok(())
}

/// Decode the escape sequence starting with `c` (the character after the
/// backslash). On failure the consumed text is returned.
fn cunescape_one(c: char, chars: &mut Peekable<Chars<'_>>) -> Result<char, String> {
    let simple = match c {
        'a' => Some('\x07'),
        'b' => Some('\x08'),
        'f' => Some('\x0c'),
        'n' => Some('\n'),
        'r' => Some('\r'),
        't' => Some('\t'),
        'v' => Some('\x0b'),
        's' => Some(' '),
        '\\' | '"' | '\'' => Some(c),
        _ => None,
    };
    if let Some(decoded) = simple {
        return Ok(decoded);
    }

    let mut seq = c.to_string();
    let code = match c {
        'x' => read_code(chars, &mut seq, 0, 2, 16),
        'u' => read_code(chars, &mut seq, 0, 4, 16),
        'U' => read_code(chars, &mut seq, 0, 8, 16),
        '0'..='7' => read_code(chars, &mut seq, c as u32 - '0' as u32, 2, 8),
        _ => None,
    };

    match code.and_then(char::from_u32) {
        Some(decoded) if decoded != '\0' => Ok(decoded),
        _ => Err(seq),
    }
}

fn read_code(
    chars: &mut Peekable<Chars<'_>>,
    seq: &mut String,
    initial: u32,
    count: usize,
    radix: u32,
) -> Option<u32> {
    let mut code = initial;
    for _ in 0..count {
        let digit = chars.next_if(|c| c.is_digit(radix))?;
        seq.push(digit);
        code = code.checked_mul(radix)?.checked_add(digit.to_digit(radix)?)?;
    }
    Some(code)
}

fn needs_quoting(word: &str) -> bool {
    word.is_empty()
        || word
            .chars()
            .any(|c| c.is_whitespace() || c.is_control() || matches!(c, '"' | '\'' | '\\'))
}

/// Quote a single word so that [`split_words`] with [`SplitFlags::ARGS`]
/// yields it back unchanged.
pub fn escape_word(word: &str) -> String {
    if !needs_quoting(word) {
        return word.to_string();
    }

    let mut escaped = String::with_capacity(word.len() + 2);
    escaped.push('"');
    for c in word.chars() {
        match c {
            '"' => escaped.push_str("\\\""),
            '\\' => escaped.push_str("\\\\"),
            '\n' => escaped.push_str("\\n"),
            '\t' => escaped.push_str("\\t"),
            '\r' => escaped.push_str("\\r"),
            '\x07' => escaped.push_str("\\a"),
            '\x08' => escaped.push_str("\\b"),
            '\x0b' => escaped.push_str("\\v"),
            '\x0c' => escaped.push_str("\\f"),
            c if c.is_control() && (c as u32) < 0x80 => {
                let _ = write!(escaped, "\\x{:02x}", c as u32);
            }
            c if c.is_control() => {
                let _ = write!(escaped, "\\u{:04x}", c as u32);
            }
            c => escaped.push(c),
        }
    }
    escaped.push('"');
    escaped
}

/// Join `words` by single spaces, quoting the ones that need it.
pub fn escape_words<S: AsRef<str>>(words: &[S]) -> String {
    words
        .iter()
        .map(|w| escape_word(w.as_ref()))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(input: &str) -> Vec<String> {
        split_words(input, SplitFlags::ARGS).unwrap()
    }

    #[test]
    fn test_split_plain() {
        assert_eq!(args("  foo bar\tbaz  "), vec!["foo", "bar", "baz"]);
        assert!(args("").is_empty());
        assert!(args(" \t ").is_empty());
    }

    #[test]
    fn test_split_quotes() {
        assert_eq!(args(r#""foo bar" 'baz qux'"#), vec!["foo bar", "baz qux"]);
        assert_eq!(args(r#"a"b c"d"#), vec!["ab cd"]);
        assert_eq!(args(r#""it's" 'say "hi"'"#), vec!["it's", r#"say "hi""#]);
        assert_eq!(args(r#""" x"#), vec!["", "x"]);
    }

    #[test]
    fn test_split_without_unquote_keeps_quotes() {
        let words = split_words(r#""a b""#, SplitFlags::RELAX).unwrap();
        assert_eq!(words, vec!["\"a", "b\""]);
    }

    #[test]
    fn test_split_escapes() {
        assert_eq!(args(r"foo\ bar"), vec!["foo bar"]);
        assert_eq!(args(r#""a\"b""#), vec!["a\"b"]);
        assert_eq!(args(r"a\tb"), vec!["a\tb"]);
        assert_eq!(args(r"\x41\102é"), vec!["ABé"]);
        assert_eq!(args(r"\s"), vec![" "]);
        assert_eq!(args("a\\\tb c"), vec!["a\tb", "c"]);
    }

    #[test]
    fn test_split_without_cunescape() {
        let words = split_words(r"a\tb", SplitFlags::UNQUOTE).unwrap();
        assert_eq!(words, vec!["atb"]);
    }

    #[test]
    fn test_split_relaxed_errors() {
        assert_eq!(args(r#""unterminated quote"#), vec!["unterminated quote"]);
        assert_eq!(args(r"trailing\"), vec!["trailing"]);
        assert_eq!(args(r"bad\qescape"), vec![r"bad\qescape"]);
        assert_eq!(args(r"\x4"), vec![r"\x4"]);
    }

    #[test]
    fn test_split_strict_errors() {
        let strict = SplitFlags::UNQUOTE | SplitFlags::CUNESCAPE;
        assert_eq!(
            split_words("\"open", strict),
            Err(SplitError::UnterminatedQuote)
        );
        assert_eq!(
            split_words("open\\", strict),
            Err(SplitError::TrailingBackslash)
        );
        assert_eq!(
            split_words(r"\q", strict),
            Err(SplitError::InvalidEscape {
                seq: "q".to_string()
            })
        );
        assert_eq!(
            split_words(r"\x00", strict),
            Err(SplitError::InvalidEscape {
                seq: "x00".to_string()
            })
        );
    }

    #[test]
    fn test_escape_word() {
        assert_eq!(escape_word("plain"), "plain");
        assert_eq!(escape_word("--cidfile=%t/%N.cid"), "--cidfile=%t/%N.cid");
        assert_eq!(escape_word(""), "\"\"");
        assert_eq!(escape_word("a b"), "\"a b\"");
        assert_eq!(escape_word("say \"hi\""), r#""say \"hi\"""#);
        assert_eq!(escape_word("back\\slash"), r#""back\\slash""#);
        assert_eq!(escape_word("line\nbreak"), r#""line\nbreak""#);
        assert_eq!(escape_word("bell\x01"), r#""bell\x01""#);
    }

    #[test]
    fn test_escape_then_split() {
        let words = vec![
            "/usr/bin/podman".to_string(),
            "run".to_string(),
            "".to_string(),
            "with space".to_string(),
            "quote's".to_string(),
            "dq\"".to_string(),
            "tab\tand\nnewline".to_string(),
            "uni\u{85}code é".to_string(),
            "\\".to_string(),
        ];
        assert_eq!(args(&escape_words(&words)), words);
    }
}
