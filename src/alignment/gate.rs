//! Alignment convergence gate.
//!
//! Decides per tick whether two devices already agree on where a hand is,
//! and runs the rigid solver when they do not. The agreement check places
//! the target's landmarks with its current pose. The solve always runs on
//! the raw device-local landmarks, so its result replaces the pose rather
//! than refining it.

use tracing::debug;

use crate::config::AlignmentConfig;
use crate::error::Result;
use crate::geometry::RigidTransform;
use crate::hand::landmarks::{landmark_distances, landmarks};
use crate::hand::{Frame, Hand};

use super::kabsch;

/// Why a tick did no alignment work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// One of the two devices is not connected.
    DeviceInactive,
    /// A device produced no frame this tick.
    NoFrame,
    /// No handedness is visible to both devices.
    HandMissing,
    /// Alignment already accepted; frozen until reset.
    AlreadyAligned,
}

/// Result of one gate evaluation.
#[derive(Debug, Clone, PartialEq)]
pub enum GateOutcome {
    Skipped(SkipReason),
    /// Every landmark pair is within the variance threshold.
    Converged { max_distance: f64 },
    /// The solver ran; `transform` maps target-device points into the
    /// source (reference) device's frame.
    Realigned {
        transform: RigidTransform,
        max_distance: f64,
    },
}

impl GateOutcome {
    pub fn is_converged(&self) -> bool {
        matches!(self, Self::Converged { .. })
    }
}

/// Observability hook called after every landmark comparison.
pub trait AlignmentObserver {
    fn on_alignment_step(&mut self, distances: &[f64], converged: bool);
}

impl<F: FnMut(&[f64], bool)> AlignmentObserver for F {
    fn on_alignment_step(&mut self, distances: &[f64], converged: bool) {
        self(distances, converged)
    }
}

/// Logs each alignment step at debug level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl AlignmentObserver for TracingObserver {
    fn on_alignment_step(&mut self, distances: &[f64], converged: bool) {
        let max_distance = distances.iter().copied().fold(0.0, f64::max);
        debug!(
            landmarks = distances.len(),
            max_distance,
            converged,
            "Alignment step"
        );
    }
}

#[derive(Debug, Clone)]
pub struct ConvergenceGate {
    positioning_complete: bool,
    variance_threshold: f64,
    max_iterations: usize,
}

impl ConvergenceGate {
    pub fn new(config: &AlignmentConfig) -> Self {
        Self {
            positioning_complete: false,
            variance_threshold: config.variance_threshold,
            max_iterations: config.max_iterations,
        }
    }

    pub fn is_positioning_complete(&self) -> bool {
        self.positioning_complete
    }

    pub fn variance_threshold(&self) -> f64 {
        self.variance_threshold
    }

    /// Takes effect on the next update.
    pub fn set_variance_threshold(&mut self, threshold: f64) {
        self.variance_threshold = threshold;
    }

    /// Compare the first source hand that the target device also sees.
    ///
    /// `target` is in the target device's own coordinates and `target_pose`
    /// is its current pose in the source frame. Leaves the state untouched
    /// when no handedness is shared.
    pub fn update(
        &mut self,
        source: &Frame,
        target: &Frame,
        target_pose: &RigidTransform,
        observer: &mut dyn AlignmentObserver,
    ) -> Result<GateOutcome> {
        let pair = source
            .hands()
            .iter()
            .find_map(|s| target.hand(s.handedness).map(|t| (s, t)));

        match pair {
            Some((source_hand, target_hand)) => {
                self.update_hands(source_hand, target_hand, target_pose, observer)
            }
            None => Ok(GateOutcome::Skipped(SkipReason::HandMissing)),
        }
    }

    /// Compare two observations of the same physical hand.
    pub fn update_hands(
        &mut self,
        source: &Hand,
        target: &Hand,
        target_pose: &RigidTransform,
        observer: &mut dyn AlignmentObserver,
    ) -> Result<GateOutcome> {
        let source_points = landmarks(source);
        let target_points = landmarks(target);
        let placed = target_points.map(|p| target_pose.transform_point(&p));

        let distances = landmark_distances(&source_points, &placed);
        let max_distance = distances.iter().copied().fold(0.0, f64::max);
        let converged = distances.iter().all(|d| *d <= self.variance_threshold);
        observer.on_alignment_step(&distances, converged);

        if converged {
            self.positioning_complete = true;
            return Ok(GateOutcome::Converged { max_distance });
        }

        self.positioning_complete = false;
        let transform = kabsch::solve(&source_points, &target_points, self.max_iterations)?;
        Ok(GateOutcome::Realigned {
            transform,
            max_distance,
        })
    }

    pub fn reset(&mut self) {
        self.positioning_complete = false;
    }
}
