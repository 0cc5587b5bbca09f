//! Persian normalizer, risk classifier, segmenter and subtitle emitter.
//!
//! Pure text/timing logic with no provider or persistence dependencies, so
//! it is trivially unit-testable in isolation from the orchestrator.

pub mod persian;
pub mod risk;
pub mod segmenter;
pub mod timeline;

pub use persian::{normalize_persian_spacing, strip_speaker_ids, to_persian_digits};
pub use risk::risk_level;
pub use segmenter::{segment_fallback, segment_from_words, SegCue, SegmentShape};
pub use timeline::{build_srt, clamp_non_overlapping, TimelineCue};
