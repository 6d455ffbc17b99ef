//! Plain-text flattening for TEXT and MTEXT payloads.

use std::sync::LazyLock;

use regex::{Captures, Regex};

static TEXT_CONTROL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"%%(\d{3}|[dDpPcCuUoO%])").expect("hardcoded TEXT control code regex is valid")
});

/// Decodes `%%` control sequences found in single-line TEXT values.
pub(crate) fn decode_text_controls(raw: &str) -> String {
    TEXT_CONTROL_RE
        .replace_all(raw, |caps: &Captures<'_>| match &caps[1] {
            "d" | "D" => "°".to_string(),
            "p" | "P" => "±".to_string(),
            "c" | "C" => "⌀".to_string(),
            "%" => "%".to_string(),
            "u" | "U" | "o" | "O" => String::new(),
            code => code
                .parse::<u32>()
                .ok()
                .and_then(char::from_u32)
                .map(String::from)
                .unwrap_or_default(),
        })
        .into_owned()
}

fn take_until_semicolon(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> String {
    let mut out = String::new();
    for ch in chars.by_ref() {
        if ch == ';' {
            break;
        }
        out.push(ch);
    }
    out
}

fn take_unicode_escape(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> Option<char> {
    if chars.peek() != Some(&'+') {
        return None;
    }
    chars.next();
    let mut hex = String::with_capacity(4);
    while hex.len() < 4 {
        match chars.peek() {
            Some(ch) if ch.is_ascii_hexdigit() => {
                hex.push(*ch);
                chars.next();
            }
            _ => break,
        }
    }
    u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32)
}

/// Flattens MTEXT markup into plain lines.
///
/// Paragraph breaks become `\n`, stacked fractions become `a/b`, and every
/// formatting code and grouping brace is dropped.
pub(crate) fn flatten_mtext(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '{' | '}' => {}
            '\\' => match chars.next() {
                Some(literal @ ('\\' | '{' | '}')) => out.push(literal),
                Some('P' | 'X') => out.push('\n'),
                Some('~') => out.push(' '),
                Some('L' | 'l' | 'O' | 'o' | 'K' | 'k') => {}
                Some('S') => {
                    let stacked = take_until_semicolon(&mut chars);
                    out.push_str(&stacked.replace(['^', '#'], "/"));
                }
                Some('U') => {
                    if let Some(decoded) = take_unicode_escape(&mut chars) {
                        out.push(decoded);
                    } else {
                        out.push_str("\\U");
                    }
                }
                Some('A' | 'C' | 'c' | 'F' | 'f' | 'H' | 'Q' | 'T' | 'W' | 'p') => {
                    take_until_semicolon(&mut chars);
                }
                Some(other) => {
                    out.push('\\');
                    out.push(other);
                }
                None => out.push('\\'),
            },
            _ => out.push(ch),
        }
    }

    out.lines()
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n")
}
