//! Translation Memory: exact-dedup hashing, embedding recall against
//! Qdrant, composite confidence scoring, and the gating decision that ties
//! them together with the TM-Judge agent (§4.6).

pub mod confidence;
pub mod gate;
pub mod hash;
pub mod qdrant;

pub use confidence::{composite_confidence, distance_to_similarity};
pub use gate::{GateOutcome, GateResult};
pub use hash::{en_hash, normalize_for_hash};
pub use qdrant::QdrantTmIndex;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TmError {
    #[error("vector index error: {0}")]
    VectorIndex(String),

    #[error("tm-judge error: {0}")]
    Judge(String),
}

impl From<TmError> for farsub_core::Error {
    fn from(err: TmError) -> Self {
        farsub_core::Error::Tm(err.to_string())
    }
}
