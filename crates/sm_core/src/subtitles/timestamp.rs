//! Timestamp parsing and formatting for the supported dialects.
//!
//! | Dialect | Pattern                  |
//! |---------|--------------------------|
//! | SRT     | `H:MM:SS,mmm` / `H:MM:SS.mmm` |
//! | WebVTT  | `[H:]MM:SS.mmm`          |
//! | ASS     | `H:MM:SS.cc`             |
//!
//! Fraction digits are right-padded to milliseconds and truncated beyond
//! three digits, so sub-millisecond precision is dropped.

/// Timestamp syntax of a subtitle format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    Srt,
    WebVtt,
    Ass,
}

/// Parse a timestamp in the given dialect.
///
/// Returns seconds, or `None` if the text does not match the dialect's
/// pattern. Callers skip the owning cue in that case.
pub fn parse_timestamp(s: &str, dialect: Dialect) -> Option<f64> {
    let s = s.trim();
    let parts: Vec<&str> = s.split(':').collect();

    let (hours, minutes, rest) = match (dialect, parts.as_slice()) {
        (_, [h, m, rest]) => (parse_digits(h)?, parse_two_digits(m)?, *rest),
        (Dialect::WebVtt, [m, rest]) => (0, parse_two_digits(m)?, *rest),
        _ => return None,
    };

    let separators: &[char] = match dialect {
        Dialect::Srt => &[',', '.'],
        Dialect::WebVtt | Dialect::Ass => &['.'],
    };
    let (secs, frac) = rest.split_once(separators)?;
    let seconds = parse_two_digits(secs)?;
    let millis = parse_fraction(frac)?;

    let total_ms = hours
        .checked_mul(3_600_000)?
        .checked_add(minutes * 60_000 + seconds * 1000 + millis)?;
    Some(total_ms as f64 / 1000.0)
}

/// Parse an SRT timestamp.
pub fn parse_srt_time(s: &str) -> Option<f64> {
    parse_timestamp(s, Dialect::Srt)
}

/// Parse a WebVTT timestamp (hours optional).
pub fn parse_vtt_time(s: &str) -> Option<f64> {
    parse_timestamp(s, Dialect::WebVtt)
}

/// Parse an ASS/SSA timestamp.
pub fn parse_ass_time(s: &str) -> Option<f64> {
    parse_timestamp(s, Dialect::Ass)
}

fn parse_digits(s: &str) -> Option<u64> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

fn parse_two_digits(s: &str) -> Option<u64> {
    if s.len() != 2 {
        return None;
    }
    parse_digits(s)
}

/// Fraction digits to milliseconds: `5` → 500, `05` → 50, `0519` → 51.
fn parse_fraction(s: &str) -> Option<u64> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let mut digits: String = s.chars().take(3).collect();
    while digits.len() < 3 {
        digits.push('0');
    }
    digits.parse().ok()
}

/// Round seconds to whole milliseconds, clamping negatives and NaN to zero.
fn to_millis(seconds: f64) -> u64 {
    if !seconds.is_finite() || seconds <= 0.0 {
        return 0;
    }
    (seconds * 1000.0).round() as u64
}

/// Format seconds as `HH:MM:SS.mmm`.
pub fn format_timestamp(seconds: f64) -> String {
    let ms = to_millis(seconds);
    let h = ms / 3_600_000;
    let m = (ms % 3_600_000) / 60_000;
    let s = (ms % 60_000) / 1000;
    let millis = ms % 1000;
    format!("{:02}:{:02}:{:02}.{:03}", h, m, s, millis)
}

/// Short form for narrow list views: `MM:SS`, or `H:MM:SS` past an hour.
pub fn format_timestamp_compact(seconds: f64) -> String {
    let ms = to_millis(seconds);
    let h = ms / 3_600_000;
    let m = (ms % 3_600_000) / 60_000;
    let s = (ms % 60_000) / 1000;
    if h == 0 {
        format!("{:02}:{:02}", m, s)
    } else {
        format!("{}:{:02}:{:02}", h, m, s)
    }
}

/// Format a cue interval as `start ~ end`.
pub fn format_time_range(start: f64, end: f64, compact: bool) -> String {
    if compact {
        format!(
            "{} ~ {}",
            format_timestamp_compact(start),
            format_timestamp_compact(end)
        )
    } else {
        format!("{} ~ {}", format_timestamp(start), format_timestamp(end))
    }
}
