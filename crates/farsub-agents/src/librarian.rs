//! Librarian Promotion Gate (§4.8). Pure predicate over a cue's QA outcome
//! — no LLM call of its own, despite living alongside the four agents that
//! do make calls, since it's the other half of the same "does this cue earn
//! a place in the glossary/TM" decision the agents feed into.

use farsub_core::CueIssues;

/// `qa_score >= 85` and neither `meaning_drift` nor `numbers_mismatch` among
/// `issues`. A missing score is treated as disqualifying, not as "trust it".
pub fn should_store(qa_score: Option<f32>, issues: &CueIssues) -> bool {
    match qa_score {
        Some(score) if score >= 85.0 => {
            !issues.contains("meaning_drift") && !issues.contains("numbers_mismatch")
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn below_threshold_is_rejected() {
        assert!(!should_store(Some(84.9), &CueIssues::default()));
    }

    #[test]
    fn missing_score_is_rejected() {
        assert!(!should_store(None, &CueIssues::default()));
    }

    #[test]
    fn meaning_drift_disqualifies_even_at_a_high_score() {
        let issues = CueIssues(vec!["meaning_drift".to_string()]);
        assert!(!should_store(Some(99.0), &issues));
    }

    #[test]
    fn numbers_mismatch_disqualifies_even_at_a_high_score() {
        let issues = CueIssues(vec!["numbers_mismatch".to_string()]);
        assert!(!should_store(Some(95.0), &issues));
    }

    #[test]
    fn a_clean_high_score_is_accepted() {
        let issues = CueIssues(vec!["minor_punctuation".to_string()]);
        assert!(should_store(Some(90.0), &issues));
    }
}
