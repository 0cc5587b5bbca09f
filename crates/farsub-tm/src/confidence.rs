//! Composite confidence (§4.6): blends the vector index's reported
//! similarity with two cheap textual sanity checks so a near-duplicate
//! sentence with a different number in it doesn't get auto-reused.

use once_cell::sync::Lazy;
use regex::Regex;

static NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+(?:\.\d+)?").unwrap());

/// `sim` is `1.0 - cosine_distance`, computed by the caller from the vector
/// index's reported distance — never passed in as a constant placeholder.
pub fn composite_confidence(en_text: &str, cand_en: &str, sim: f32) -> f32 {
    let a = en_text.trim();
    let b = cand_en.trim();
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    let len_ratio = a.chars().count().min(b.chars().count()) as f32
        / a.chars().count().max(b.chars().count()) as f32;

    let nums_a: Vec<&str> = NUMBER.find_iter(a).map(|m| m.as_str()).collect();
    let nums_b: Vec<&str> = NUMBER.find_iter(b).map(|m| m.as_str()).collect();
    let num_match = if nums_a == nums_b { 1.0 } else { 0.0 };

    let conf = 0.75 * sim + 0.15 * len_ratio + 0.10 * num_match;
    conf.clamp(0.0, 1.0)
}

/// Cosine distance in `[0, 2]` (as `farsub_core::VectorHit::distance`
/// documents) to similarity in `[0, 1]`. Distances above 1.0 map to 0, not a
/// negative similarity — a confidence term should never go negative.
pub fn distance_to_similarity(distance: f32) -> f32 {
    (1.0 - distance).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_text_with_perfect_similarity_is_full_confidence() {
        let conf = composite_confidence("ship 3 boxes", "ship 3 boxes", 1.0);
        assert!((conf - 1.0).abs() < 1e-6);
    }

    #[test]
    fn mismatched_numbers_drag_confidence_down() {
        let same_len_no_num_match =
            composite_confidence("ship 3 boxes now", "ship 9 boxes now", 1.0);
        assert!(same_len_no_num_match < 1.0);
        assert!((same_len_no_num_match - 0.90).abs() < 1e-5);
    }

    #[test]
    fn empty_input_is_zero_confidence() {
        assert_eq!(composite_confidence("", "anything", 1.0), 0.0);
        assert_eq!(composite_confidence("anything", "", 1.0), 0.0);
    }

    #[test]
    fn confidence_never_exceeds_one_or_drops_below_zero() {
        assert!(composite_confidence("a", "a very much longer sentence indeed", -5.0) >= 0.0);
        assert!(composite_confidence("same text here", "same text here", 10.0) <= 1.0);
    }

    #[test]
    fn distance_beyond_one_clamps_to_zero_similarity() {
        assert_eq!(distance_to_similarity(2.0), 0.0);
        assert_eq!(distance_to_similarity(0.0), 1.0);
    }
}
