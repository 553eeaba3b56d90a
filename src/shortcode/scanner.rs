//! bracket-tag scanner
//!
//! locates occurrences of one shortcode tag in raw text. an occurrence is
//!
//! ```text
//! '[' '['?  tag  (not followed by a word char or '-')
//!     attrs           up to the first ']' or a '/' directly before ']'
//!     ( '/]'                          self-closing
//!     | ']' ( body '[/' tag ']' )?    opening tag, optional body + closing tag
//!     )
//! ']'?
//! ```
//!
//! the body runs to the first closing tag of the same name. doubled outer
//! brackets (`[[tag]]`) mark a literal, escaped occurrence; escaped
//! occurrences are reported like any other so callers can skip them.

use std::ops::Range;

use serde::Serialize;

use super::attrs::parse_attributes;
use crate::conditions::RuleSet;

/// one located tag instance, borrowed from the scanned text
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Occurrence<'a> {
    /// byte range of the whole match in the scanned text
    pub span: Range<usize>,
    /// the whole matched text
    pub text: &'a str,
    /// extra '[' before the tag
    pub leading_bracket: bool,
    /// extra ']' after the tag
    pub trailing_bracket: bool,
    /// raw attribute string between the tag name and the closing bracket
    pub attrs_raw: &'a str,
    pub self_closing: bool,
    /// content between the opening and closing tags
    pub body: Option<&'a str>,
}

impl<'a> Occurrence<'a> {
    /// `[[tag]]`: literal text, not an active element
    pub fn is_escaped(&self) -> bool {
        self.leading_bracket && self.trailing_bracket
    }

    pub fn attributes(&self) -> RuleSet {
        parse_attributes(self.attrs_raw)
    }
}

/// PCRE `\w` (ASCII) or '-'
fn is_name_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'-'
}

/// every non-overlapping occurrence of `tag` in `text`, left to right
pub fn find_all<'a>(tag: &str, text: &'a str) -> Vec<Occurrence<'a>> {
    let mut found = Vec::new();
    if tag.is_empty() {
        return found;
    }

    let mut pos = 0;
    while let Some(offset) = text[pos..].find('[') {
        let start = pos + offset;
        match match_at(tag, text, start) {
            Some(occurrence) => {
                pos = occurrence.span.end;
                found.push(occurrence);
            }
            None => pos = start + 1,
        }
    }

    found
}

/// name of the first tag opened in `text` (closing tags are skipped)
pub fn first_tag_name(text: &str) -> Option<&str> {
    let bytes = text.as_bytes();
    let mut pos = 0;

    while let Some(offset) = text[pos..].find('[') {
        let mut start = pos + offset + 1;
        while bytes.get(start) == Some(&b'[') {
            start += 1;
        }
        let len = bytes[start..].iter().take_while(|b| is_name_char(**b)).count();
        if len > 0 {
            return Some(&text[start..start + len]);
        }
        pos = start;
    }

    None
}

/// try to match an occurrence starting at the '[' at `start`
fn match_at<'a>(tag: &str, text: &'a str, start: usize) -> Option<Occurrence<'a>> {
    let bytes = text.as_bytes();

    // prefer consuming an escaping '[', fall back to the plain form
    let escaped = bytes.get(start + 1) == Some(&b'[');
    let attempts: &[bool] = if escaped { &[true, false] } else { &[false] };

    attempts
        .iter()
        .find_map(|&leading| match_tag(tag, text, start, leading))
}

fn match_tag<'a>(tag: &str, text: &'a str, start: usize, leading: bool) -> Option<Occurrence<'a>> {
    let bytes = text.as_bytes();
    let mut cursor = start + 1 + usize::from(leading);

    if !text.get(cursor..)?.starts_with(tag) {
        return None;
    }
    cursor += tag.len();
    if bytes.get(cursor).copied().is_some_and(is_name_char) {
        return None;
    }

    let attrs_start = cursor;
    loop {
        match bytes.get(cursor)? {
            b']' => break,
            b'/' if bytes.get(cursor + 1) == Some(&b']') => break,
            _ => cursor += 1,
        }
    }
    let attrs_raw = &text[attrs_start..cursor];

    let self_closing = bytes[cursor] == b'/';
    let mut body = None;
    if self_closing {
        cursor += 2;
    } else {
        cursor += 1;
        let closing = format!("[/{}]", tag);
        if let Some(offset) = text[cursor..].find(&closing) {
            body = Some(&text[cursor..cursor + offset]);
            cursor += offset + closing.len();
        }
    }

    let trailing = bytes.get(cursor) == Some(&b']');
    if trailing {
        cursor += 1;
    }

    Some(Occurrence {
        span: start..cursor,
        text: &text[start..cursor],
        leading_bracket: leading,
        trailing_bracket: trailing,
        attrs_raw,
        self_closing,
        body,
    })
}

/// remove the given occurrences from `text`
///
/// spans refer to `text` as it was scanned; overlapping spans are merged
pub fn remove_all(text: &str, occurrences: &[Occurrence<'_>]) -> String {
    let mut spans: Vec<Range<usize>> = occurrences.iter().map(|o| o.span.clone()).collect();
    spans.sort_by_key(|span| span.start);

    let mut out = String::with_capacity(text.len());
    let mut pos = 0;
    for span in spans {
        if span.end <= pos {
            continue;
        }
        if span.start > pos {
            out.push_str(&text[pos..span.start]);
        }
        pos = span.end;
    }
    out.push_str(&text[pos.min(text.len())..]);

    out
}
