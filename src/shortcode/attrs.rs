//! shortcode attribute parsing
//!
//! recognizes `key="value"`, `key='value'`, `key=value` and bare positional
//! tokens. keys are lowercased; positional tokens are dropped since every
//! rule parameter is named.

use lazy_static::lazy_static;
use regex::Regex;

use crate::conditions::RuleSet;

lazy_static! {
    static ref ATTR_PATTERN: Regex = Regex::new(concat!(
        r#"([\w-]+)\s*=\s*"([^"]*)"(?:\s|$)"#,
        r#"|([\w-]+)\s*=\s*'([^']*)'(?:\s|$)"#,
        r#"|([\w-]+)\s*=\s*([^\s'"]+)(?:\s|$)"#,
        r#"|"([^"]*)"(?:\s|$)"#,
        r#"|'([^']*)'(?:\s|$)"#,
        r#"|(\S+)(?:\s|$)"#,
    ))
    .expect("attribute pattern is valid");
    static ref INVISIBLE_SPACE: Regex =
        Regex::new(r"[\x{00a0}\x{200b}]+").expect("space pattern is valid");
}

/// parse a raw attribute string into a rule set
pub fn parse_attributes(raw: &str) -> RuleSet {
    let text = INVISIBLE_SPACE.replace_all(raw, " ");
    let mut attrs = RuleSet::new();

    for caps in ATTR_PATTERN.captures_iter(&text) {
        // (key group, value group) for the three named forms
        for (key, value) in [(1, 2), (3, 4), (5, 6)] {
            if let (Some(k), Some(v)) = (caps.get(key), caps.get(value)) {
                attrs.insert(k.as_str().to_ascii_lowercase(), unescape(v.as_str()));
                break;
            }
        }
    }

    attrs
}

/// remove C-style backslash escapes (`\n`, `\t`, `\x41`, `\101`, `\"`, ...)
fn unescape(s: &str) -> String {
    if !s.contains('\\') {
        return s.to_string();
    }

    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }

        let Some(next) = chars.next() else {
            break;
        };
        match next {
            'n' => out.push('\n'),
            't' => out.push('\t'),
            'r' => out.push('\r'),
            'a' => out.push('\x07'),
            'v' => out.push('\x0b'),
            'b' => out.push('\x08'),
            'f' => out.push('\x0c'),
            'x' if chars.peek().is_some_and(|c| c.is_ascii_hexdigit()) => {
                let mut value = 0u32;
                for _ in 0..2 {
                    match chars.peek().and_then(|c| c.to_digit(16)) {
                        Some(d) => {
                            value = value * 16 + d;
                            chars.next();
                        }
                        None => break,
                    }
                }
                out.push(char::from(value as u8));
            }
            '0'..='7' => {
                let mut value = next.to_digit(8).unwrap_or_default();
                for _ in 0..2 {
                    match chars.peek().and_then(|c| c.to_digit(8)) {
                        Some(d) => {
                            value = value * 8 + d;
                            chars.next();
                        }
                        None => break,
                    }
                }
                out.push(char::from((value & 0xff) as u8));
            }
            other => out.push(other),
        }
    }

    out
}
