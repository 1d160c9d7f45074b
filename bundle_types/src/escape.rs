/*
 * Copyright (c) Facebook, Inc. and its affiliates.
 *
 * This software may be used and distributed according to the terms of the
 * GNU General Public License version 2 or any later version.
 */

//! Escaping for fields embedded in line-oriented text formats.
//!
//! An escaped field contains no spaces, newlines or control bytes, so it can
//! sit inside a space-delimited line without ambiguity.

use crate::errors::*;

/// Escape a field so it contains no spaces, newlines or control characters.
pub fn escape_field(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            ' ' => out.push_str("\\s"),
            c if (c as u32) < 0x20 || c as u32 == 0x7f => {
                out.push_str(&format!("\\x{:02x}", c as u32));
            }
            c => out.push(c),
        }
    }
    out
}

/// Reverse `escape_field`.
pub fn unescape_field(s: &str) -> Result<String> {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('\\') => out.push('\\'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('s') => out.push(' '),
            Some('x') => {
                let hi = chars.next();
                let lo = chars.next();
                let (hi, lo) = match (hi, lo) {
                    (Some(hi), Some(lo)) => (hi, lo),
                    _ => bail!(ErrorKind::InvalidEscape(
                        "truncated hex escape".to_string()
                    )),
                };
                let hi = hex_digit(hi)?;
                let lo = hex_digit(lo)?;
                let value = hi * 16 + lo;
                if value >= 0x80 {
                    bail!(ErrorKind::InvalidEscape(format!(
                        "hex escape out of range: {:02x}",
                        value
                    )));
                }
                out.push(value as u8 as char);
            }
            Some(other) => bail!(ErrorKind::InvalidEscape(format!(
                "unknown escape: \\{}",
                other
            ))),
            None => bail!(ErrorKind::InvalidEscape(
                "trailing backslash".to_string()
            )),
        }
    }
    Ok(out)
}

fn hex_digit(c: char) -> Result<u32> {
    c.to_digit(16)
        .ok_or_else(|| ErrorKind::InvalidEscape(format!("bad hex digit: {}", c)).into())
}

#[cfg(test)]
mod test {
    use super::*;
    use quickcheck::quickcheck;

    #[test]
    fn escape_simple() {
        assert_eq!(escape_field("plain"), "plain");
        assert_eq!(escape_field("two words"), "two\\swords");
        assert_eq!(escape_field("line1\nline2"), "line1\\nline2");
        assert_eq!(escape_field("back\\slash"), "back\\\\slash");
        assert_eq!(escape_field("bell\u{7}"), "bell\\x07");
        assert_eq!(escape_field("del\u{7f}"), "del\\x7f");
    }

    #[test]
    fn escaped_fields_have_no_separators() {
        for input in &["a b", "a\nb", "a\rb", "a\tb", "\\", " "] {
            let escaped = escape_field(input);
            assert!(!escaped.contains(' '), "space survived in {:?}", escaped);
            assert!(!escaped.contains('\n'), "newline survived in {:?}", escaped);
            assert!(!escaped.contains('\r'), "cr survived in {:?}", escaped);
        }
    }

    #[test]
    fn unescape_bad() {
        unescape_field("trailing\\").expect_err("unexpected OK - trailing backslash");
        unescape_field("\\q").expect_err("unexpected OK - unknown escape");
        unescape_field("\\x4").expect_err("unexpected OK - truncated hex");
        unescape_field("\\xgg").expect_err("unexpected OK - bad hex digit");
        unescape_field("\\xff").expect_err("unexpected OK - hex out of range");
    }

    quickcheck! {
        fn escape_roundtrip(s: String) -> bool {
            let escaped = escape_field(&s);
            unescape_field(&escaped).unwrap() == s
        }

        fn escaped_is_single_token(s: String) -> bool {
            let escaped = escape_field(&s);
            !escaped.contains(' ') && !escaped.contains('\n') && !escaped.contains('\r')
        }
    }
}
