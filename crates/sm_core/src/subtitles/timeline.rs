//! Timeline queries over a resolved cue list.
//!
//! All functions here are pure and synchronous. They assume cues are in
//! non-decreasing `start` order (file order); a file that violates this
//! gives undefined lookup results, not a panic.
//!
//! A uniform delay `d` shifts every cue: the effective interval of a cue is
//! `[start + d, end + d)`.

use crate::subtitles::timestamp::format_timestamp;
use crate::subtitles::types::Cue;

/// Separator used when flattening multi-line cue text.
pub const FLATTEN_SEPARATOR: &str = " / ";

/// Index of the cue active at playback time `t` under `delay`.
///
/// Binary search for the rightmost cue with `start <= t - delay`; it is
/// active only if `t - delay < end`.
pub fn active_cue_index(cues: &[Cue], t: f64, delay: f64) -> Option<usize> {
    if cues.is_empty() || !t.is_finite() {
        return None;
    }
    let t = t - if delay.is_finite() { delay } else { 0.0 };

    // Number of cues with start <= t
    let upper = cues.partition_point(|cue| cue.start <= t);
    let best = upper.checked_sub(1)?;

    (t < cues[best].end).then_some(best)
}

/// Outcome of a free-text search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchMatches {
    /// Query was empty; nothing is being searched.
    NoQuery,
    /// Ascending indices of matching cues (possibly empty).
    Matches(Vec<usize>),
}

impl SearchMatches {
    /// Matching indices, empty when no query is active.
    pub fn indices(&self) -> &[usize] {
        match self {
            Self::NoQuery => &[],
            Self::Matches(m) => m,
        }
    }

    /// Whether a query is active.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Matches(_))
    }

    /// Number of matches, `None` when no query is active.
    pub fn count(&self) -> Option<usize> {
        match self {
            Self::NoQuery => None,
            Self::Matches(m) => Some(m.len()),
        }
    }
}

/// Case-insensitive substring search over flattened cue text.
pub fn search_matches(cues: &[Cue], query: &str) -> SearchMatches {
    let query = query.trim();
    if query.is_empty() {
        return SearchMatches::NoQuery;
    }
    let needle = query.to_lowercase();

    let matches = cues
        .iter()
        .enumerate()
        .filter(|(_, cue)| flatten_text(&cue.text).to_lowercase().contains(&needle))
        .map(|(i, _)| i)
        .collect();

    SearchMatches::Matches(matches)
}

/// Match closest to `anchor`; ties go to the earlier match.
pub fn nearest_match(matches: &[usize], anchor: usize) -> Option<usize> {
    // First match >= anchor
    let lo = matches.partition_point(|&m| m < anchor);

    let after = matches.get(lo).copied();
    let before = lo.checked_sub(1).map(|i| matches[i]);

    match (before, after) {
        (None, after) => after,
        (before, None) => before,
        (Some(b), Some(a)) => {
            if anchor - b <= a - anchor {
                Some(b)
            } else {
                Some(a)
            }
        }
    }
}

/// Direction for cycling through matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

impl Direction {
    /// Negative steps go backward, everything else forward.
    pub fn from_step(step: i32) -> Self {
        if step < 0 {
            Self::Backward
        } else {
            Self::Forward
        }
    }
}

/// Where to anchor a search focus when none exists yet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FocusSeed {
    /// Row the user selected.
    pub selected: Option<usize>,
    /// Cue active at the current playback time.
    pub active: Option<usize>,
}

impl FocusSeed {
    /// Selection, then active cue, then the first cue.
    pub fn anchor(&self) -> usize {
        self.selected.or(self.active).unwrap_or(0)
    }
}

/// Move the search focus to the next or previous match, wrapping around.
///
/// Without a current focus, the nearest match to the seed's anchor is
/// returned instead of stepping. A focus that is not itself a match steps
/// from its insertion point.
pub fn cycle_match(
    matches: &[usize],
    current: Option<usize>,
    direction: Direction,
    seed: FocusSeed,
) -> Option<usize> {
    if matches.is_empty() {
        return None;
    }
    let Some(cur) = current else {
        return nearest_match(matches, seed.anchor());
    };

    let len = matches.len() as isize;
    let pos = match matches.binary_search(&cur) {
        Ok(pos) => match direction {
            Direction::Forward => pos as isize + 1,
            Direction::Backward => pos as isize - 1,
        },
        Err(insert) => match direction {
            Direction::Forward => insert as isize,
            Direction::Backward => insert as isize - 1,
        },
    };

    Some(matches[pos.rem_euclid(len) as usize])
}

/// Collapse multi-line text into one line joined with [`FLATTEN_SEPARATOR`].
pub fn flatten_text(text: &str) -> String {
    flatten_text_with(text, FLATTEN_SEPARATOR)
}

/// Like [`flatten_text`] with a custom separator.
pub fn flatten_text_with(text: &str, separator: &str) -> String {
    text.split(['\n', '\r'])
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(separator)
}

/// Cue interval shifted by `delay`.
pub fn effective_interval(cue: &Cue, delay: f64) -> (f64, f64) {
    (cue.start + delay, cue.end + delay)
}

/// Playback position to seek to for a cue: its shifted start, never negative.
pub fn seek_target(cue: &Cue, delay: f64) -> f64 {
    (cue.start + delay).max(0.0)
}

/// Clipboard/export line: `HH:MM:SS.mmm ~ HH:MM:SS.mmm text`.
///
/// A missing end falls back to the start, a missing start to zero.
pub fn format_copy_payload(start: Option<f64>, end: Option<f64>, text: &str) -> String {
    let time_a = format_timestamp(start.unwrap_or(0.0));
    let time_b = format_timestamp(end.or(start).unwrap_or(0.0));
    format!("{} ~ {} {}", time_a, time_b, flatten_text(text))
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cues() -> Vec<Cue> {
        vec![
            Cue::new(1.0, 2.0, "Hello there"),
            Cue::new(2.0, 3.0, "General Kenobi"),
            Cue::new(5.0, 6.5, "You are\na bold one"),
            Cue::new(8.0, 9.0, "HELLO again"),
        ]
    }

    #[test]
    fn test_active_cue_basic() {
        let cues = cues();
        assert_eq!(active_cue_index(&cues, 0.5, 0.0), None);
        assert_eq!(active_cue_index(&cues, 1.0, 0.0), Some(0));
        assert_eq!(active_cue_index(&cues, 1.999, 0.0), Some(0));
        // End is exclusive; the next cue starts at the same instant.
        assert_eq!(active_cue_index(&cues, 2.0, 0.0), Some(1));
        assert_eq!(active_cue_index(&cues, 4.0, 0.0), None);
        assert_eq!(active_cue_index(&cues, 100.0, 0.0), None);
    }

    #[test]
    fn test_active_cue_with_delay() {
        let cues = cues();
        // Delay 2s: cue 2 is effective at [7.0, 8.5)
        assert_eq!(active_cue_index(&cues, 7.0, 2.0), Some(2));
        assert_eq!(active_cue_index(&cues, 8.5, 2.0), None);
        assert_eq!(active_cue_index(&cues, 0.2, -1.0), Some(0));
    }

    #[test]
    fn test_active_cue_edge_inputs() {
        assert_eq!(active_cue_index(&[], 1.0, 0.0), None);
        assert_eq!(active_cue_index(&cues(), f64::NAN, 0.0), None);
    }

    #[test]
    fn active_cue_agrees_with_linear_scan() {
        // Non-overlapping sorted cues: at most one index satisfies the interval test.
        let cues: Vec<Cue> = (0..40)
            .map(|i| {
                let start = i as f64 * 1.5;
                Cue::new(start, start + 0.5 + (i % 3) as f64 * 0.3, format!("cue {i}"))
            })
            .collect();

        for delay in [-3.25, 0.0, 0.75, 10.0] {
            for step in 0..1000 {
                let t = step as f64 * 0.07 - 5.0;
                let shifted = t - delay;
                let expected = cues
                    .iter()
                    .position(|c| c.start <= shifted && shifted < c.end);
                assert_eq!(active_cue_index(&cues, t, delay), expected, "t={t} d={delay}");
            }
        }
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let cues = cues();
        assert_eq!(search_matches(&cues, "hello"), SearchMatches::Matches(vec![0, 3]));
        assert_eq!(search_matches(&cues, "  KENOBI "), SearchMatches::Matches(vec![1]));
        assert_eq!(search_matches(&cues, "nothing"), SearchMatches::Matches(vec![]));
    }

    #[test]
    fn test_search_matches_flattened_text() {
        let cues = cues();
        assert_eq!(search_matches(&cues, "are / a"), SearchMatches::Matches(vec![2]));
    }

    #[test]
    fn test_empty_query_is_not_an_empty_match_set() {
        let result = search_matches(&cues(), "   ");
        assert_eq!(result, SearchMatches::NoQuery);
        assert!(!result.is_active());
        assert_eq!(result.count(), None);

        let empty = search_matches(&cues(), "zzz");
        assert!(empty.is_active());
        assert_eq!(empty.count(), Some(0));
    }

    #[test]
    fn test_nearest_match() {
        let matches = [2, 6, 10];
        assert_eq!(nearest_match(&matches, 0), Some(2));
        assert_eq!(nearest_match(&matches, 6), Some(6));
        assert_eq!(nearest_match(&matches, 7), Some(6));
        assert_eq!(nearest_match(&matches, 9), Some(10));
        assert_eq!(nearest_match(&matches, 50), Some(10));
        assert_eq!(nearest_match(&[], 3), None);
    }

    #[test]
    fn test_nearest_match_tie_goes_to_lower() {
        assert_eq!(nearest_match(&[2, 6], 4), Some(2));
        assert_eq!(nearest_match(&[1, 3, 5], 4), Some(3));
    }

    #[test]
    fn nearest_match_returns_member() {
        let matches = [0, 3, 4, 9, 15, 16, 30];
        for anchor in 0..40 {
            let found = nearest_match(&matches, anchor).unwrap();
            assert!(matches.contains(&found));
            let best = matches.iter().map(|&m| m.abs_diff(anchor)).min().unwrap();
            assert_eq!(found.abs_diff(anchor), best);
        }
    }

    #[test]
    fn test_cycle_wraps() {
        let matches = [1, 4, 7];
        let seed = FocusSeed::default();
        assert_eq!(cycle_match(&matches, Some(4), Direction::Forward, seed), Some(7));
        assert_eq!(cycle_match(&matches, Some(7), Direction::Forward, seed), Some(1));
        assert_eq!(cycle_match(&matches, Some(1), Direction::Backward, seed), Some(7));
        assert_eq!(cycle_match(&matches, Some(4), Direction::Backward, seed), Some(1));
    }

    #[test]
    fn test_cycle_from_non_match_focus() {
        let matches = [1, 4, 7];
        let seed = FocusSeed::default();
        assert_eq!(cycle_match(&matches, Some(5), Direction::Forward, seed), Some(7));
        assert_eq!(cycle_match(&matches, Some(5), Direction::Backward, seed), Some(4));
        assert_eq!(cycle_match(&matches, Some(0), Direction::Backward, seed), Some(7));
        assert_eq!(cycle_match(&matches, Some(9), Direction::Forward, seed), Some(1));
    }

    #[test]
    fn test_cycle_seeds_focus() {
        let matches = [1, 4, 7];
        let by_selection = FocusSeed {
            selected: Some(6),
            active: Some(0),
        };
        assert_eq!(cycle_match(&matches, None, Direction::Forward, by_selection), Some(7));

        let by_active = FocusSeed {
            selected: None,
            active: Some(3),
        };
        assert_eq!(cycle_match(&matches, None, Direction::Backward, by_active), Some(4));

        assert_eq!(cycle_match(&matches, None, Direction::Forward, FocusSeed::default()), Some(1));
        assert_eq!(cycle_match(&[], Some(1), Direction::Forward, FocusSeed::default()), None);
    }

    #[test]
    fn cycling_len_times_returns_to_start() {
        let matches = [0, 2, 3, 8, 13];
        for direction in [Direction::Forward, Direction::Backward] {
            for &start in &matches {
                let mut focus = start;
                for _ in 0..matches.len() {
                    focus = cycle_match(&matches, Some(focus), direction, FocusSeed::default())
                        .unwrap();
                }
                assert_eq!(focus, start);
            }
        }
    }

    #[test]
    fn test_flatten_text() {
        assert_eq!(flatten_text("  a \r\n\r\n b\rc  "), "a / b / c");
        assert_eq!(flatten_text(""), "");
        assert_eq!(flatten_text_with("a\nb", " | "), "a | b");
    }

    #[test]
    fn test_copy_payload() {
        assert_eq!(
            format_copy_payload(Some(1.0), Some(2.5), "Hello\nworld"),
            "00:00:01.000 ~ 00:00:02.500 Hello / world"
        );
        assert_eq!(
            format_copy_payload(Some(3.0), None, ""),
            "00:00:03.000 ~ 00:00:03.000"
        );
        assert_eq!(
            format_copy_payload(None, None, "x"),
            "00:00:00.000 ~ 00:00:00.000 x"
        );
    }

    #[test]
    fn test_seek_target_and_interval() {
        let cue = Cue::new(1.0, 2.0, "x");
        assert_eq!(seek_target(&cue, 0.5), 1.5);
        assert_eq!(seek_target(&cue, -3.0), 0.0);
        assert_eq!(effective_interval(&cue, -0.5), (0.5, 1.5));
        assert_eq!(Direction::from_step(-1), Direction::Backward);
        assert_eq!(Direction::from_step(1), Direction::Forward);
    }
}
