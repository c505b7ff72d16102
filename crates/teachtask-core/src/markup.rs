//! `**bold**` markup embedded in item text. Stored verbatim, interpreted only
//! when rendering.

use regex::Regex;
use std::sync::LazyLock;

static BOLD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*.*?\*\*").expect("bold pattern is valid"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    Plain(&'a str),
    Bold(&'a str),
}

/// Split `text` into plain and bold runs. Spans are matched non-greedily and
/// never cross an unmatched `**`, which stays in the plain text.
#[must_use]
pub fn segments(text: &str) -> Vec<Segment<'_>> {
    let mut out = Vec::new();
    let mut cursor = 0;
    for span in BOLD_RE.find_iter(text) {
        if span.start() > cursor {
            out.push(Segment::Plain(&text[cursor..span.start()]));
        }
        let inner = &text[span.start() + 2..span.end() - 2];
        if !inner.is_empty() {
            out.push(Segment::Bold(inner));
        }
        cursor = span.end();
    }
    if cursor < text.len() {
        out.push(Segment::Plain(&text[cursor..]));
    }
    out
}

/// Text with every matched bold span unwrapped.
#[must_use]
pub fn strip_markup(text: &str) -> String {
    segments(text)
        .into_iter()
        .map(|segment| match segment {
            Segment::Plain(s) | Segment::Bold(s) => s,
        })
        .collect()
}
