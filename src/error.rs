//! Error types for the fusion core.
//!
//! Only caller/integration mistakes surface here. Transient absence (a hand
//! out of view, an inactive device) is reported through outcome types and
//! numerical degeneracy is resolved locally with identity fallbacks.

use thiserror::Error;

use crate::config::CombinerKind;
use crate::hand::Handedness;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FusionError {
    /// Fewer than three correspondences were handed to the rigid solver.
    #[error("rigid alignment needs at least 3 correspondences, got {got}")]
    TooFewPoints { got: usize },

    #[error("correspondence sets differ in length (reference {reference}, moving {moving})")]
    LengthMismatch { reference: usize, moving: usize },

    /// A frame carried two hands of the same handedness.
    #[error("frame already contains a {0:?} hand")]
    DuplicateHand(Handedness),

    #[error("combiner {0:?} is not implemented")]
    UnsupportedCombiner(CombinerKind),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, FusionError>;
