//! SRT subtitle parser.
//!
//! Parses SubRip (.srt) subtitle files.
//!
//! # Format Overview
//!
//! SRT files consist of sequential entries:
//! ```text
//! 1
//! 00:00:01,000 --> 00:00:04,000
//! Hello, world!
//!
//! 2
//! 00:00:05,000 --> 00:00:08,000 X1:40 X2:600 Y1:20 Y2:50
//! This is a test.
//! ```
//!
//! Each entry has:
//! - Index number (optional, discarded)
//! - Timing line: `HH:MM:SS,mmm --> HH:MM:SS,mmm`, trailing position tokens ignored
//! - One or more lines of text
//! - Blank line separator

use super::{normalize_newlines, split_blocks, split_time_line};
use crate::subtitles::timestamp::parse_srt_time;
use crate::subtitles::types::Cue;

/// Parse SRT content into cues.
///
/// Blocks without a valid timing line are skipped.
pub fn parse_srt(content: &str) -> Vec<Cue> {
    let content = normalize_newlines(content);
    let mut cues = Vec::new();

    for (block_num, lines) in split_blocks(&content).into_iter().enumerate() {
        if lines.len() < 2 {
            tracing::trace!("SRT block {}: too short, skipped", block_num + 1);
            continue;
        }

        // Leading index line
        let timing_idx = usize::from(is_index_line(lines[0]));

        let Some(timing) = lines.get(timing_idx).and_then(|l| parse_srt_timing(l)) else {
            tracing::trace!("SRT block {}: no valid timing line, skipped", block_num + 1);
            continue;
        };

        let text = lines[timing_idx + 1..].join("\n");
        cues.push(Cue::new(timing.0, timing.1, text.trim()));
    }

    cues
}

fn is_index_line(line: &str) -> bool {
    let line = line.trim();
    !line.is_empty() && line.bytes().all(|b| b.is_ascii_digit())
}

/// Parse SRT timing line: `HH:MM:SS,mmm --> HH:MM:SS,mmm`
fn parse_srt_timing(line: &str) -> Option<(f64, f64)> {
    let (start, end) = split_time_line(line)?;
    Some((parse_srt_time(start)?, parse_srt_time(end)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_srt_timing() {
        let (start, end) = parse_srt_timing("00:00:01,000 --> 00:00:04,500").unwrap();
        assert_eq!(start, 1.0);
        assert_eq!(end, 4.5);

        let (start, end) = parse_srt_timing("00:00:01,000 --> 00:00:04,500 X1:1 X2:2").unwrap();
        assert_eq!((start, end), (1.0, 4.5));
    }

    #[test]
    fn test_parse_single_cue() {
        let content = "1\n00:00:01,000 --> 00:00:02,500\nHello world\n";
        let cues = parse_srt(content);
        assert_eq!(cues, vec![Cue::new(1.0, 2.5, "Hello world")]);
    }

    #[test]
    fn test_parse_basic_srt() {
        let content = r#"1
00:00:01,000 --> 00:00:04,000
Hello, world!

2
00:00:05,000 --> 00:00:08,000
This is a test.
With multiple lines.

3
00:00:09,000 --> 00:00:12,000
Final subtitle.
"#;

        let cues = parse_srt(content);
        assert_eq!(cues.len(), 3);

        assert_eq!(cues[0].start, 1.0);
        assert_eq!(cues[0].end, 4.0);
        assert_eq!(cues[0].text, "Hello, world!");

        assert_eq!(cues[1].start, 5.0);
        assert_eq!(cues[1].text, "This is a test.\nWith multiple lines.");

        assert_eq!(cues[2].start, 9.0);
        assert_eq!(cues[2].text, "Final subtitle.");
    }

    #[test]
    fn test_parse_srt_without_index() {
        let content = r#"
00:00:01,000 --> 00:00:04,000
Hello, world!

00:00:05,000 --> 00:00:08,000
Another line.
"#;

        let cues = parse_srt(content);
        assert_eq!(cues.len(), 2);
        assert_eq!(cues[1].text, "Another line.");
    }

    #[test]
    fn test_missing_arrow_skips_only_that_block() {
        let content = r#"1
00:00:01,000 --> 00:00:02,000
First

2
00:00:03,000 00:00:04,000
Broken

3
00:00:05,000 --> 00:00:06,000
Third
"#;

        let cues = parse_srt(content);
        assert_eq!(cues.len(), 2);
        assert_eq!(cues[0].text, "First");
        assert_eq!(cues[1].text, "Third");
        assert_eq!(cues[1].start, 5.0);
    }

    #[test]
    fn test_bad_timestamp_skips_block() {
        let content = "1\n00:00:xx,000 --> 00:00:02,000\nBad\n\n2\n00:00:03,000 --> 00:00:04,000\nGood\n";
        let cues = parse_srt(content);
        assert_eq!(cues.len(), 1);
        assert_eq!(cues[0].text, "Good");
    }

    #[test]
    fn test_parse_srt_keeps_formatting_and_file_order() {
        let content = r#"1
00:00:05,000 --> 00:00:08,000
<i>Later</i>

2
00:00:01,000 --> 00:00:04,000
<b>Earlier</b>
"#;

        let cues = parse_srt(content);
        assert_eq!(cues[0].text, "<i>Later</i>");
        assert_eq!(cues[1].text, "<b>Earlier</b>");
    }

    #[test]
    fn test_whitespace_only_line_stays_in_body() {
        let cues = parse_srt("1\n00:00:01,000 --> 00:00:02,000\nA\n  \nB\n\n2\n00:00:03,000 --> 00:00:04,000\nC\n");
        assert_eq!(cues.len(), 2);
        assert_eq!(cues[0], Cue::new(1.0, 2.0, "A\n  \nB"));
        assert_eq!(cues[1].text, "C");
    }

    #[test]
    fn test_empty_input_yields_no_cues() {
        assert!(parse_srt("").is_empty());
        assert!(parse_srt("\n\n\n").is_empty());
    }
}
