//! WebVTT subtitle parser.
//!
//! Handles the `WEBVTT` header, optional cue identifiers, cue settings after
//! the end timestamp, and skips `NOTE`, `STYLE` and `REGION` blocks.

use super::{normalize_newlines, split_blocks, split_time_line};
use crate::subtitles::timestamp::parse_vtt_time;
use crate::subtitles::types::Cue;

const SKIPPED_BLOCKS: [&str; 3] = ["NOTE", "STYLE", "REGION"];

/// Parse WebVTT content into cues.
pub fn parse_vtt(content: &str) -> Vec<Cue> {
    let content = normalize_newlines(content);
    let body = strip_header(&content);
    let mut cues = Vec::new();

    for (block_num, lines) in split_blocks(body).into_iter().enumerate() {
        if is_metadata_block(lines[0]) {
            continue;
        }

        // Cue identifier line
        let timing_idx = usize::from(!lines[0].contains("-->") && lines.len() >= 2);

        let Some((start, end)) = lines.get(timing_idx).and_then(|l| parse_vtt_timing(l)) else {
            tracing::trace!("VTT block {}: no valid timing line, skipped", block_num + 1);
            continue;
        };

        let text = lines[timing_idx + 1..].join("\n");
        cues.push(Cue::new(start, end, text.trim()));
    }

    cues
}

/// Drop the `WEBVTT ...` signature line if present.
fn strip_header(content: &str) -> &str {
    let (first, rest) = content.split_once('\n').unwrap_or((content, ""));
    if starts_with_ignore_case(first, "WEBVTT") {
        rest
    } else {
        content
    }
}

fn is_metadata_block(first_line: &str) -> bool {
    SKIPPED_BLOCKS.iter().any(|keyword| {
        starts_with_ignore_case(first_line, keyword)
            && first_line[keyword.len()..]
                .chars()
                .next()
                .is_none_or(|c| !(c.is_ascii_alphanumeric() || c == '_'))
    })
}

fn starts_with_ignore_case(s: &str, prefix: &str) -> bool {
    s.get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}

fn parse_vtt_timing(line: &str) -> Option<(f64, f64)> {
    let (start, end) = split_time_line(line)?;
    Some((parse_vtt_time(start)?, parse_vtt_time(end)?))
}
