//! Risk classifier: a cheap lexical heuristic that feeds the Strategist's
//! difficulty/model-tier decision (§4.2), run before any LLM call.

use farsub_core::RiskLevel;
use once_cell::sync::Lazy;
use regex::Regex;

static TECH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(API|HTTP|SQL|Docker|Kubernetes|TLS|DNS|VLAN|OAuth|JWT|GPU|RAM|CPU|CLI|Regex)\b")
        .unwrap()
});
static MATH: Lazy<Regex> = Lazy::new(|| Regex::new(r"[=+\-*/]|(\b\d+(\.\d+)?\b)").unwrap());
static LEGAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)[§¶]|(\bAct\b|\bRegulation\b|\bArticle\b)").unwrap());
static MED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(mg|ml|ICD|dose|diagnosis|patient)\b").unwrap());
static SENTENCE_SPLIT: Lazy<Regex> = Lazy::new(|| Regex::new(r"[.!?]\s+").unwrap());

/// Classifies the full transcript text, not a single cue: thresholds are
/// tuned against whole-document length and marker density.
pub fn risk_level(text: &str) -> RiskLevel {
    let length = text.chars().count();
    let long_sentences = SENTENCE_SPLIT
        .split(text)
        .filter(|s| s.split_whitespace().count() >= 25)
        .count();
    let markers = [&*TECH, &*MATH, &*LEGAL, &*MED]
        .iter()
        .filter(|re| re.is_match(text))
        .count();

    if length > 25_000 || markers >= 3 || long_sentences >= 8 {
        RiskLevel::High
    } else if length > 9_000 || markers >= 2 || long_sentences >= 4 {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_plain_text_is_low_risk() {
        assert_eq!(risk_level("Hello there, welcome to the show."), RiskLevel::Low);
    }

    #[test]
    fn three_technical_markers_force_high_risk() {
        let text = "We call the API over HTTP and store results in SQL, cost is $40/unit.";
        assert_eq!(risk_level(text), RiskLevel::High);
    }

    #[test]
    fn long_length_alone_forces_high_risk() {
        let text = "word ".repeat(6000);
        assert_eq!(risk_level(&text), RiskLevel::High);
    }
}
