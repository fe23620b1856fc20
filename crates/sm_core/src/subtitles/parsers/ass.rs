//! ASS/SSA subtitle parser.
//!
//! Parses Advanced SubStation Alpha (.ass) and SubStation Alpha (.ssa) files.
//!
//! # Format Overview
//!
//! ASS files have three main sections:
//! - `[Script Info]`: Metadata (title, resolution, etc.)
//! - `[V4+ Styles]` or `[V4 Styles]`: Style definitions
//! - `[Events]`: Dialogue and comment lines
//!
//! Only `[Events]` matters here. Its `Format:` line names the columns of each
//! `Dialogue:` line; the last column (`Text`) may itself contain commas.
//! All timing is in the format `H:MM:SS.cc` (centiseconds).

use super::normalize_newlines;
use crate::subtitles::timestamp::parse_ass_time;
use crate::subtitles::types::Cue;

/// Column positions of an `[Events]` section, resolved once per file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventLayout {
    /// Number of comma-separated fields in a `Dialogue:` line.
    pub field_count: usize,
    /// Index of the `Start` field.
    pub start: usize,
    /// Index of the `End` field.
    pub end: usize,
    /// Index of the `Text` field.
    pub text: usize,
}

impl Default for EventLayout {
    /// `Layer, Start, End, Style, Name, MarginL, MarginR, MarginV, Effect, Text`
    fn default() -> Self {
        Self {
            field_count: 10,
            start: 1,
            end: 2,
            text: 9,
        }
    }
}

impl EventLayout {
    /// Resolve positions from the field list of a `Format:` line.
    ///
    /// Missing names fall back to positions 1, 2 and the last field.
    pub fn from_format(fields: &str) -> Self {
        let names: Vec<String> = fields
            .split(',')
            .map(|s| s.trim().to_lowercase())
            .collect();
        let position = |name: &str| names.iter().position(|n| n == name);
        let field_count = names.len();

        Self {
            field_count,
            start: position("start").unwrap_or(1),
            end: position("end").unwrap_or(2),
            text: position("text").unwrap_or(field_count.saturating_sub(1)),
        }
    }
}

/// Parse ASS/SSA content into cues.
///
/// `Comment:` lines and anything outside `[Events]` are ignored. Dialogue
/// lines with unparsable times are skipped.
pub fn parse_ass(content: &str) -> Vec<Cue> {
    let content = normalize_newlines(content);
    let mut cues = Vec::new();
    let mut in_events = false;
    let mut layout = EventLayout::default();

    for (line_num, line) in content.split('\n').enumerate() {
        let line_num = line_num + 1; // 1-indexed for logs
        let line = line.trim_end();

        if line.is_empty() {
            continue;
        }

        // Section header
        let trimmed = line.trim_start();
        if trimmed.starts_with('[') && trimmed.ends_with(']') {
            let name = trimmed[1..trimmed.len() - 1].trim();
            in_events = name.eq_ignore_ascii_case("events");
            continue;
        }

        if !in_events {
            continue;
        }

        if let Some(fields) = strip_key(line, "format") {
            layout = EventLayout::from_format(fields);
            continue;
        }

        let Some(rest) = strip_key(line, "dialogue") else {
            continue;
        };

        match parse_dialogue(rest, &layout) {
            Some(cue) => cues.push(cue),
            None => tracing::trace!("ASS line {}: invalid dialogue, skipped", line_num),
        }
    }

    cues
}

/// Split a dialogue line per the layout and build a cue.
fn parse_dialogue(rest: &str, layout: &EventLayout) -> Option<Cue> {
    let fields: Vec<&str> = rest.splitn(layout.field_count.max(1), ',').collect();

    let start = parse_ass_time(fields.get(layout.start)?)?;
    let end = parse_ass_time(fields.get(layout.end)?)?;
    let text = fields.get(layout.text).copied().unwrap_or("");

    Some(Cue::new(start, end, clean_ass_text(text)))
}

/// Match `<key> :` case-insensitively at line start, returning the rest.
fn strip_key<'a>(line: &'a str, key: &str) -> Option<&'a str> {
    let line = line.trim_start();
    let head = line.get(..key.len())?;
    if !head.eq_ignore_ascii_case(key) {
        return None;
    }
    let rest = line[key.len()..].trim_start().strip_prefix(':')?;
    Some(rest.trim_start())
}

/// Remove `{...}` override blocks and expand `\N`, `\n` and `\h`.
pub fn clean_ass_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(open) = rest.find('{') {
        match rest[open..].find('}') {
            Some(close) => {
                out.push_str(&rest[..open]);
                rest = &rest[open + close + 1..];
            }
            None => break,
        }
    }
    out.push_str(rest);

    out.replace("\\N", "\n")
        .replace("\\n", "\n")
        .replace("\\h", " ")
        .trim()
        .to_string()
}
