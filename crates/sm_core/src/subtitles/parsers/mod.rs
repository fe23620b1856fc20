//! Subtitle parsers for various formats.
//!
//! Each parser is a pure, best-effort function from text to cues. A block or
//! line that does not parse is dropped and logged at trace level; the rest of
//! the file still parses. Zero cues is a valid result.

mod ass;
mod srt;
mod vtt;

pub use ass::{clean_ass_text, parse_ass, EventLayout};
pub use srt::parse_srt;
pub use vtt::parse_vtt;

use std::borrow::Cow;
use std::path::Path;

use crate::subtitles::types::{Cue, SubtitleFormat};

/// Parse decoded subtitle text in the given format.
pub fn parse_content(content: &str, format: SubtitleFormat) -> Vec<Cue> {
    let text = prepare_text(content);

    let cues = match format {
        SubtitleFormat::Srt => parse_srt(&text),
        SubtitleFormat::WebVtt => parse_vtt(&text),
        SubtitleFormat::Ass => parse_ass(&text),
    };

    tracing::debug!("Parsed {} cues as {}", cues.len(), format.extension());
    cues
}

/// Parse content using the format hinted by the file extension.
///
/// Returns the format that was used along with the cues.
pub fn parse_for_path(path: impl AsRef<Path>, content: &str) -> (SubtitleFormat, Vec<Cue>) {
    let format = SubtitleFormat::from_path_hint(path);
    (format, parse_content(content, format))
}

/// Strip a leading byte-order mark and normalize line endings to `\n`.
pub fn prepare_text(content: &str) -> Cow<'_, str> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    normalize_newlines(content)
}

/// Convert `\r\n` and lone `\r` to `\n`.
pub(crate) fn normalize_newlines(text: &str) -> Cow<'_, str> {
    if text.contains('\r') {
        Cow::Owned(text.replace("\r\n", "\n").replace('\r', "\n"))
    } else {
        Cow::Borrowed(text)
    }
}

/// Split text into blocks separated by empty lines.
///
/// Only zero-length lines separate blocks; whitespace-only lines stay in
/// their block and are trimmed away with the cue body. Returned blocks
/// never contain empty lines and are never empty.
pub(crate) fn split_blocks(text: &str) -> Vec<Vec<&str>> {
    let mut blocks = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in text.split('\n') {
        if line.is_empty() {
            if !current.is_empty() {
                blocks.push(std::mem::take(&mut current));
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        blocks.push(current);
    }

    blocks
}

/// Split a `start --> end [settings]` line into its two timestamps.
///
/// Anything after a whitespace run following the end timestamp (cue
/// positioning, WebVTT settings) is ignored.
pub(crate) fn split_time_line(line: &str) -> Option<(&str, &str)> {
    let (start, rest) = line.split_once("-->")?;
    let start = start.trim();
    let end = rest.split_whitespace().next()?;
    if start.is_empty() {
        return None;
    }
    Some((start, end))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prepare_text_strips_bom_and_crlf() {
        let text = prepare_text("\u{feff}a\r\nb\rc\n");
        assert_eq!(text, "a\nb\nc\n");
        assert!(matches!(prepare_text("plain\n"), Cow::Borrowed(_)));
    }

    #[test]
    fn test_split_blocks() {
        let blocks = split_blocks("\n\na\nb\n\n  \n\nc\n \nd\n\n\n");
        assert_eq!(blocks, vec![vec!["a", "b"], vec!["  "], vec!["c", " ", "d"]]);
        assert!(split_blocks("").is_empty());
    }

    #[test]
    fn test_split_time_line() {
        assert_eq!(
            split_time_line("00:00:01,000 --> 00:00:02,000"),
            Some(("00:00:01,000", "00:00:02,000"))
        );
        assert_eq!(
            split_time_line("00:01.000-->00:02.000 align:start line:0"),
            Some(("00:01.000", "00:02.000"))
        );
        assert_eq!(split_time_line("00:00:01,000 00:00:02,000"), None);
        assert_eq!(split_time_line("00:00:01,000 -->"), None);
    }

    #[test]
    fn test_parse_for_path_uses_extension() {
        let (format, cues) = parse_for_path("movie.VTT", "WEBVTT\n\n00:01.000 --> 00:02.000\nHi\n");
        assert_eq!(format, SubtitleFormat::WebVtt);
        assert_eq!(cues.len(), 1);

        let (format, cues) = parse_for_path("movie.txt", "1\n00:00:01,000 --> 00:00:02,000\nHi\n");
        assert_eq!(format, SubtitleFormat::Srt);
        assert_eq!(cues.len(), 1);
    }

    #[test]
    fn test_parse_content_handles_bom_and_crlf() {
        let content = "\u{feff}1\r\n00:00:01,000 --> 00:00:02,500\r\nHello world\r\n";
        let cues = parse_content(content, SubtitleFormat::Srt);
        assert_eq!(cues, vec![Cue::new(1.0, 2.5, "Hello world")]);
    }
}
