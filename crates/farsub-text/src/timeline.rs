//! Timeline clamp and SRT emission (§4.4).

use std::fmt::Write as _;

#[derive(Debug, Clone, PartialEq)]
pub struct TimelineCue {
    pub index: u32,
    pub start_ms: i64,
    pub end_ms: i64,
    pub text: String,
}

/// Forces a monotonic, non-overlapping timeline: each cue's start is pushed
/// to at least `last_end + min_gap_ms`, and its end to at least
/// `start + min_gap_ms`. Cues must already be in ascending start order.
pub fn clamp_non_overlapping(cues: &[TimelineCue], min_gap_ms: i64) -> Vec<TimelineCue> {
    let mut out = Vec::with_capacity(cues.len());
    let mut last_end: i64 = -1;
    for c in cues {
        let start = c.start_ms.max(last_end + min_gap_ms);
        let end = c.end_ms.max(start + min_gap_ms);
        out.push(TimelineCue {
            index: c.index,
            start_ms: start,
            end_ms: end,
            text: c.text.clone(),
        });
        last_end = end;
    }
    out
}

fn ms_to_srt_timestamp(ms: i64) -> String {
    let ms = ms.max(0);
    let hours = ms / 3_600_000;
    let minutes = (ms % 3_600_000) / 60_000;
    let seconds = (ms % 60_000) / 1000;
    let millis = ms % 1000;
    format!("{:02}:{:02}:{:02},{:03}", hours, minutes, seconds, millis)
}

/// Renders cues as an SRT document: `index`, `start --> end`, text, blank
/// line, in that order for every cue.
pub fn build_srt(cues: &[TimelineCue]) -> String {
    let mut out = String::new();
    for c in cues {
        let _ = writeln!(out, "{}", c.index);
        let _ = writeln!(
            out,
            "{} --> {}",
            ms_to_srt_timestamp(c.start_ms),
            ms_to_srt_timestamp(c.end_ms)
        );
        let _ = writeln!(out, "{}", c.text.trim());
        let _ = writeln!(out);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cue(index: u32, start_ms: i64, end_ms: i64, text: &str) -> TimelineCue {
        TimelineCue {
            index,
            start_ms,
            end_ms,
            text: text.to_string(),
        }
    }

    #[test]
    fn clamp_leaves_non_overlapping_cues_untouched() {
        let cues = vec![cue(1, 0, 1000, "a"), cue(2, 1500, 2500, "b")];
        let clamped = clamp_non_overlapping(&cues, 1);
        assert_eq!(clamped, cues);
    }

    #[test]
    fn clamp_pushes_overlapping_start_past_prior_end() {
        let cues = vec![cue(1, 0, 1000, "a"), cue(2, 900, 1800, "b")];
        let clamped = clamp_non_overlapping(&cues, 1);
        assert_eq!(clamped[1].start_ms, 1001);
        assert_eq!(clamped[1].end_ms, 1800);
    }

    #[test]
    fn clamp_enforces_minimum_duration_when_end_precedes_start() {
        let cues = vec![cue(1, 0, 1000, "a"), cue(2, 1000, 1000, "b")];
        let clamped = clamp_non_overlapping(&cues, 1);
        assert_eq!(clamped[1].start_ms, 1001);
        assert_eq!(clamped[1].end_ms, 1002);
    }

    #[test]
    fn srt_format_matches_hh_mm_ss_comma_ms() {
        let cues = vec![cue(1, 0, 1234, "سلام")];
        let srt = build_srt(&cues);
        assert_eq!(srt, "1\n00:00:00,000 --> 00:00:01,234\nسلام\n\n");
    }
}
