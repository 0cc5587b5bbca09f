//! Turns word-level ASR timings into cue-sized chunks (§4.3).

use farsub_core::AsrWord;

#[derive(Debug, Clone, PartialEq)]
pub struct SegCue {
    pub start_ms: i64,
    pub end_ms: i64,
    pub text: String,
}

/// Shape limits the segmenter enforces. Mirrors `SubtitleShapeConfig` without
/// depending on `farsub-config` from this crate.
#[derive(Debug, Clone, Copy)]
pub struct SegmentShape {
    pub max_chars: u32,
    pub min_cue_ms: i64,
    pub max_cue_ms: i64,
}

impl SegmentShape {
    pub fn new(max_lines: u32, max_chars_per_line: u32, min_cue_ms: i64, max_cue_ms: i64) -> Self {
        Self {
            max_chars: max_lines * max_chars_per_line,
            min_cue_ms,
            max_cue_ms,
        }
    }
}

/// Breaks on a pause greater than 450 ms once the current cue has already
/// run at least `min_cue_ms`; otherwise force-flushes at `max_cue_ms` or once
/// the buffered text reaches `max_chars`.
pub fn segment_from_words(words: &[AsrWord], shape: SegmentShape) -> Vec<SegCue> {
    if words.is_empty() {
        return Vec::new();
    }

    const PAUSE_BREAK_MS: i64 = 450;

    let mut cues = Vec::new();
    let mut buf: Vec<&str> = Vec::new();
    let mut cue_start = words[0].start_ms;
    let mut last_end = words[0].end_ms;

    let flush = |buf: &mut Vec<&str>, cue_start: i64, end_ms: i64, cues: &mut Vec<SegCue>| {
        if buf.is_empty() {
            return;
        }
        let text = buf.join(" ").trim().to_string();
        if !text.is_empty() {
            cues.push(SegCue {
                start_ms: cue_start,
                end_ms,
                text,
            });
        }
        buf.clear();
    };

    for w in words {
        let t = w.text.trim();
        if t.is_empty() {
            continue;
        }
        let pause = w.start_ms - last_end;

        if !buf.is_empty() && pause > PAUSE_BREAK_MS && (last_end - cue_start) >= shape.min_cue_ms
        {
            flush(&mut buf, cue_start, last_end, &mut cues);
            cue_start = w.start_ms;
        }

        buf.push(t);
        last_end = w.end_ms;

        if (last_end - cue_start) >= shape.max_cue_ms {
            flush(&mut buf, cue_start, last_end, &mut cues);
            cue_start = last_end;
        } else if !buf.is_empty() && buf.join(" ").len() as u32 >= shape.max_chars {
            flush(&mut buf, cue_start, last_end, &mut cues);
            cue_start = last_end;
        }
    }
    flush(&mut buf, cue_start, last_end, &mut cues);

    cues
        .into_iter()
        .map(|c| SegCue {
            start_ms: c.start_ms,
            end_ms: c.end_ms.max(c.start_ms + 200),
            text: c.text,
        })
        .collect()
}

/// Used when the ASR provider returned text but no word timings. Splits on
/// sentence boundaries and estimates duration from word count at a flat
/// reading rate, rather than failing the job outright.
pub fn segment_fallback(transcript_text: &str) -> Vec<SegCue> {
    let text = transcript_text.trim();
    if text.is_empty() {
        return Vec::new();
    }

    let parts = split_on_sentence_boundaries(text);
    let mut cues = Vec::new();
    let mut t: i64 = 0;
    for p in parts {
        let word_count = p.split_whitespace().count().max(1) as i64;
        let est = (150 * word_count).max(1200);
        cues.push(SegCue {
            start_ms: t,
            end_ms: t + est,
            text: p,
        });
        t += est;
    }
    cues
}

fn split_on_sentence_boundaries(text: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        current.push(c);
        if matches!(c, '.' | '!' | '?') {
            while matches!(chars.peek(), Some(c) if c.is_whitespace()) {
                chars.next();
            }
            let trimmed = current.trim().to_string();
            if !trimmed.is_empty() {
                parts.push(trimmed);
            }
            current.clear();
        }
    }
    let trimmed = current.trim().to_string();
    if !trimmed.is_empty() {
        parts.push(trimmed);
    }
    parts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word(text: &str, start_ms: i64, end_ms: i64) -> AsrWord {
        AsrWord {
            text: text.to_string(),
            start_ms,
            end_ms,
        }
    }

    fn shape() -> SegmentShape {
        SegmentShape::new(2, 42, 900, 6500)
    }

    #[test]
    fn empty_words_produce_no_cues() {
        assert!(segment_from_words(&[], shape()).is_empty());
    }

    #[test]
    fn pause_above_threshold_breaks_a_cue_once_min_duration_met() {
        let words = vec![
            word("Hello", 0, 400),
            word("there", 450, 1000),
            // 600ms pause, and the buffered cue has already run 1000ms >= min_cue_ms
            word("Next", 1600, 2000),
            word("sentence", 2050, 2400),
        ];
        let cues = segment_from_words(&words, shape());
        assert_eq!(cues.len(), 2);
        assert_eq!(cues[0].text, "Hello there");
        assert_eq!(cues[1].text, "Next sentence");
    }

    #[test]
    fn short_pause_does_not_break_a_cue() {
        let words = vec![word("Hello", 0, 400), word("there", 500, 900)];
        let cues = segment_from_words(&words, shape());
        assert_eq!(cues.len(), 1);
        assert_eq!(cues[0].text, "Hello there");
    }

    #[test]
    fn max_cue_duration_forces_a_flush() {
        let words = vec![
            word("Start", 0, 100),
            word("End", 7000, 7100),
            word("More", 7150, 7300),
        ];
        let cues = segment_from_words(&words, shape());
        assert_eq!(cues.len(), 2);
        assert_eq!(cues[0].text, "Start End");
        assert_eq!(cues[1].text, "More");
    }

    #[test]
    fn fallback_splits_on_sentence_boundaries() {
        let cues = segment_fallback("First sentence. Second one! Third?");
        assert_eq!(cues.len(), 3);
        assert_eq!(cues[0].text, "First sentence.");
        assert_eq!(cues[1].text, "Second one!");
        assert_eq!(cues[2].text, "Third?");
    }

    #[test]
    fn fallback_on_empty_text_is_empty() {
        assert!(segment_fallback("").is_empty());
        assert!(segment_fallback("   ").is_empty());
    }

    #[test]
    fn word_timed_pause_break_at_exactly_min_cue_duration() {
        let words = vec![
            word("Hello", 0, 400),
            word("world.", 420, 900),
            word("Next", 1400, 1700),
            word("sentence.", 1720, 2200),
        ];
        let cues = segment_from_words(&words, shape());
        assert_eq!(cues.len(), 2);
        assert_eq!(cues[0].start_ms, 0);
        assert_eq!(cues[0].end_ms, 900);
        assert_eq!(cues[0].text, "Hello world.");
        assert_eq!(cues[1].start_ms, 1400);
        assert_eq!(cues[1].end_ms, 2200);
        assert_eq!(cues[1].text, "Next sentence.");
    }
}
