//! Merge per-device frames into a single frame.
//!
//! Every input hand must already be expressed in the shared reference frame.

use nalgebra::{UnitQuaternion, Vector3};
use tracing::trace;

use crate::config::CombinerKind;
use crate::error::{FusionError, Result};
use crate::geometry::frames::mean_rotation;
use crate::hand::{Frame, Hand, Handedness, LocalJoints};

use super::reconstruct::{local_joints, reconstruct};

/// Strategy for merging several observations of the same hand.
pub trait CombineStrategy {
    /// `hands` is never empty when called from [`combine`].
    fn combine_hands(&self, handedness: Handedness, hands: &[&Hand]) -> Option<Hand>;
}

/// Joint-wise mean in palm-local space.
#[derive(Debug, Default, Clone, Copy)]
pub struct LinearCombiner;

impl CombineStrategy for LinearCombiner {
    fn combine_hands(&self, handedness: Handedness, hands: &[&Hand]) -> Option<Hand> {
        if hands.is_empty() {
            return None;
        }
        let n = hands.len() as f64;

        let mut joints = LocalJoints::zeros();
        let mut palm_position = Vector3::zeros();
        let mut orientations: Vec<UnitQuaternion<f64>> = Vec::with_capacity(hands.len());

        for hand in hands {
            for (sum, joint) in joints.iter_mut().zip(local_joints(hand).iter()) {
                *sum += joint;
            }
            palm_position += hand.palm.position;
            orientations.push(hand.palm.orientation);
        }
        joints.iter_mut().for_each(|j| *j /= n);
        palm_position /= n;

        Some(reconstruct(
            handedness,
            &palm_position,
            &mean_rotation(&orientations),
            &joints,
        ))
    }
}

pub fn build_combiner(kind: CombinerKind) -> Result<Box<dyn CombineStrategy>> {
    match kind {
        CombinerKind::Linear => Ok(Box::new(LinearCombiner)),
        CombinerKind::Angular => Err(FusionError::UnsupportedCombiner(kind)),
    }
}

/// Combine frames handedness by handedness.
///
/// A frame without a given hand contributes nothing to it; a handedness no
/// frame carries is absent from the result. The timestamp is the latest
/// among contributing frames.
pub fn combine(strategy: &dyn CombineStrategy, frames: &[Frame]) -> Frame {
    let mut timestamp_us = None;
    let mut combined = Vec::with_capacity(Handedness::ALL.len());

    for handedness in Handedness::ALL {
        let mut hands = Vec::with_capacity(frames.len());
        for frame in frames {
            if let Some(hand) = frame.hand(handedness) {
                hands.push(hand);
                timestamp_us = timestamp_us.max(Some(frame.timestamp_us));
            }
        }
        if hands.is_empty() {
            continue;
        }
        trace!(hand = handedness.as_str(), contributors = hands.len(), "Combining hand");
        if let Some(hand) = strategy.combine_hands(handedness, &hands) {
            combined.push(hand);
        }
    }

    let mut frame = Frame::empty(timestamp_us.unwrap_or_default());
    for hand in combined {
        frame.set_hand(hand);
    }
    frame
}
