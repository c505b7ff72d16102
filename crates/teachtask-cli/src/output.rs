//! How `tt` prints: pretty blocks for a terminal, tab-separated rows for
//! pipes, JSON for scripts. Errors go to stderr in the same mode.
//!
//! The mode is resolved once per run (see `teachtask_core::config::resolve_output`):
//! `--json`, then `FORMAT`, then the config's `output`, then TTY detection.

use serde::Serialize;
use std::io::{self, Write};
use teachtask_core::error::ErrorCode;
use teachtask_core::markup::{Segment, segments};
use teachtask_core::model::Item;

/// Width of the `----` rule under pretty headings.
pub const PRETTY_RULE_WIDTH: usize = 72;

const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

/// A full-width dashed rule.
pub fn pretty_rule(w: &mut dyn Write) -> io::Result<()> {
    writeln!(w, "{:-<width$}", "", width = PRETTY_RULE_WIDTH)
}

/// Heading line with a rule under it.
pub fn pretty_section(w: &mut dyn Write, heading: &str) -> io::Result<()> {
    writeln!(w, "{heading}")?;
    pretty_rule(w)
}

/// `Key:` padded to a fixed column, then the value.
pub fn pretty_kv(w: &mut dyn Write, key: &str, value: impl AsRef<str>) -> io::Result<()> {
    writeln!(w, "{:<12} {}", format!("{key}:"), value.as_ref())
}

/// Item text with `**bold**` spans shown in ANSI bold.
#[must_use]
pub fn pretty_markup(text: &str) -> String {
    segments(text)
        .into_iter()
        .map(|segment| match segment {
            Segment::Plain(s) => s.to_string(),
            Segment::Bold(s) => format!("{BOLD}{s}{RESET}"),
        })
        .collect()
}

/// First line of an item's text with markup removed, for one-line rows.
#[must_use]
pub fn plain_line(text: &str) -> String {
    teachtask_core::markup::strip_markup(text.lines().next().unwrap_or_default())
}

/// Checkbox marker for an item.
#[must_use]
pub fn status_mark(item: &Item) -> &'static str {
    if item.is_done() { "[x]" } else { "[ ]" }
}

/// Priority shown as its level name where it has one.
#[must_use]
pub fn priority_label(item: &Item) -> String {
    item.priority
        .label()
        .map_or_else(|| format!("p{}", item.priority), str::to_string)
}

/// Where the rendered output is headed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-optimized output (tables, sections, ANSI bold).
    Pretty,
    /// Tab-separated rows for pipes and scripts.
    Text,
    /// Machine-readable JSON.
    Json,
}

impl OutputMode {
    /// Map a resolved mode name onto the enum. Unknown names fall back to text.
    #[must_use]
    pub fn from_resolved(mode: &str) -> Self {
        match mode {
            "json" => Self::Json,
            "pretty" => Self::Pretty,
            _ => Self::Text,
        }
    }
}

/// Print `value` to stdout: serialized as JSON, or through the text or pretty writer.
///
/// # Errors
///
/// Returns an error if writing to stdout or JSON serialization fails.
pub fn render_mode<T: Serialize>(
    mode: OutputMode,
    value: &T,
    text_fn: impl FnOnce(&T, &mut dyn Write) -> io::Result<()>,
    pretty_fn: impl FnOnce(&T, &mut dyn Write) -> io::Result<()>,
) -> anyhow::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_mode(&mut out, mode, value, text_fn, pretty_fn)
}

fn write_mode<T: Serialize>(
    out: &mut dyn Write,
    mode: OutputMode,
    value: &T,
    text_fn: impl FnOnce(&T, &mut dyn Write) -> io::Result<()>,
    pretty_fn: impl FnOnce(&T, &mut dyn Write) -> io::Result<()>,
) -> anyhow::Result<()> {
    match mode {
        OutputMode::Json => {
            serde_json::to_writer_pretty(&mut *out, value)?;
            writeln!(out)?;
        }
        OutputMode::Text => text_fn(value, out)?,
        OutputMode::Pretty => pretty_fn(value, out)?,
    }
    Ok(())
}

/// Error shown to the user, with an optional hint and `E####` code.
#[derive(Debug, Serialize)]
pub struct CliError {
    pub message: String,
    /// What to try next.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    /// Machine-readable error code (`E####`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
}

impl CliError {
    /// Error without a code or hint.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            suggestion: None,
            error_code: None,
        }
    }

    /// Error carrying a stable code and its hint.
    pub fn coded(message: impl Into<String>, code: ErrorCode) -> Self {
        Self {
            message: message.into(),
            suggestion: code.hint().map(str::to_string),
            error_code: Some(code.code().to_string()),
        }
    }
}

/// Print an error to stderr; JSON mode wraps it as `{"error": {...}}`.
///
/// # Errors
///
/// Returns an error if writing to stderr fails.
pub fn render_error(mode: OutputMode, error: &CliError) -> anyhow::Result<()> {
    let stderr = io::stderr();
    let mut out = stderr.lock();
    write_error(&mut out, mode, error)
}

fn write_error(out: &mut dyn Write, mode: OutputMode, error: &CliError) -> anyhow::Result<()> {
    match mode {
        OutputMode::Json => {
            let wrapper = serde_json::json!({
                "error": error,
            });
            serde_json::to_writer_pretty(&mut *out, &wrapper)?;
            writeln!(out)?;
        }
        OutputMode::Pretty | OutputMode::Text => {
            writeln!(out, "error: {}", error.message)?;
            if let Some(ref suggestion) = error.suggestion {
                writeln!(out, "  suggestion: {suggestion}")?;
            }
        }
    }
    Ok(())
}
