//! Persian-script normalization applied to agent output before it ships in a
//! subtitle cue.

use once_cell::sync::Lazy;
use regex::Regex;

static RUNS_OF_BLANK: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t]+").unwrap());
static SPACE_AROUND_PUNCT: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s*([،؛:!؟])\s*").unwrap());
static SPACE_AROUND_DOT: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s*\.\s*").unwrap());
static COLLAPSE_SPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
static SPEAKER_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(speaker\s*\d+|[A-Z][A-Z0-9 _-]{1,30})\s*:\s*").unwrap());

/// Arabic-Indic `0-9` to the Persian digit block `۰-۹`.
pub fn to_persian_digits(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            '0'..='9' => {
                let offset = c as u32 - '0' as u32;
                char::from_u32('۰' as u32 + offset).unwrap_or(c)
            }
            other => other,
        })
        .collect()
}

/// Collapses runs of whitespace and normalizes spacing around Persian
/// punctuation (`،؛:!؟`) and the full stop: no space before, one space after.
pub fn normalize_persian_spacing(s: &str) -> String {
    let s = RUNS_OF_BLANK.replace_all(s.trim(), " ");
    let s = SPACE_AROUND_PUNCT.replace_all(&s, "$1 ");
    let s = SPACE_AROUND_DOT.replace_all(&s, ". ");
    COLLAPSE_SPACE.replace_all(s.trim(), " ").trim().to_string()
}

/// Strips a leading `Speaker 1:` / `JOHN:` style diarization label, if any.
pub fn strip_speaker_ids(s: &str) -> String {
    SPEAKER_PREFIX.replace(s.trim(), "").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digits_map_to_persian_block() {
        assert_eq!(to_persian_digits("Episode 12"), "Episode ۱۲");
    }

    #[test]
    fn spacing_normalizes_punctuation_and_whitespace() {
        assert_eq!(
            normalize_persian_spacing("سلام   ،دنیا .خوبی؟"),
            "سلام، دنیا. خوبی؟"
        );
    }

    #[test]
    fn speaker_prefix_is_stripped() {
        assert_eq!(strip_speaker_ids("Speaker 1: hello there"), "hello there");
        assert_eq!(strip_speaker_ids("JOHN: hi"), "hi");
        assert_eq!(strip_speaker_ids("no prefix here"), "no prefix here");
    }
}
