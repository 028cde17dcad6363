//! Per-session alignment of one target device onto a source device.
//!
//! Owns the target's [`DeviceRegistration`]. Frames are read in each
//! device's own coordinates; the gate places the target's hand with the
//! registered pose before comparing. Once the gate accepts the alignment
//! it stays frozen until [`DeviceAligner::reset`] is called.

use tracing::{debug, info};

use crate::config::AlignmentConfig;
use crate::device::{DeviceConnectivity, DeviceHost, DeviceId, FrameSource, PoseSink};
use crate::error::Result;
use crate::geometry::RigidTransform;

use super::gate::{AlignmentObserver, ConvergenceGate, GateOutcome, SkipReason};

/// A device's pose in the reference frame.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceRegistration {
    pub device_id: DeviceId,
    pub device_to_reference: RigidTransform,
    pub aligned: bool,
}

impl DeviceRegistration {
    pub fn new(device_id: DeviceId) -> Self {
        Self {
            device_id,
            device_to_reference: RigidTransform::identity(),
            aligned: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DeviceAligner {
    source: DeviceId,
    registration: DeviceRegistration,
    gate: ConvergenceGate,
}

impl DeviceAligner {
    /// Align `target` into the frame of `source`.
    pub fn new(source: DeviceId, target: DeviceId, config: &AlignmentConfig) -> Self {
        Self {
            source,
            registration: DeviceRegistration::new(target),
            gate: ConvergenceGate::new(config),
        }
    }

    pub fn source(&self) -> DeviceId {
        self.source
    }

    pub fn target(&self) -> DeviceId {
        self.registration.device_id
    }

    pub fn registration(&self) -> &DeviceRegistration {
        &self.registration
    }

    pub fn gate(&self) -> &ConvergenceGate {
        &self.gate
    }

    pub fn set_variance_threshold(&mut self, threshold: f64) {
        self.gate.set_variance_threshold(threshold);
    }

    /// One alignment step. Cheap no-op unless both devices are active, the
    /// alignment is not yet accepted, and both see the same hand.
    ///
    /// Requires every device to have published its frame for this tick.
    pub fn tick<H: DeviceHost + ?Sized>(
        &mut self,
        host: &mut H,
        observer: &mut dyn AlignmentObserver,
    ) -> Result<GateOutcome> {
        let target = self.target();
        if !host.is_device_active(self.source) || !host.is_device_active(target) {
            return Ok(GateOutcome::Skipped(SkipReason::DeviceInactive));
        }
        if self.gate.is_positioning_complete() {
            return Ok(GateOutcome::Skipped(SkipReason::AlreadyAligned));
        }

        let (Some(source_frame), Some(target_frame)) =
            (host.latest_frame(self.source), host.latest_frame(target))
        else {
            return Ok(GateOutcome::Skipped(SkipReason::NoFrame));
        };

        let outcome = self.gate.update(
            &source_frame,
            &target_frame,
            &self.registration.device_to_reference,
            observer,
        )?;
        match &outcome {
            GateOutcome::Realigned {
                transform,
                max_distance,
            } => {
                let (angle, shift) = transform.magnitude();
                debug!(
                    source = %self.source,
                    %target,
                    max_distance,
                    angle_rad = angle,
                    translation = shift,
                    "Re-solved device alignment"
                );
                // Overwrite, never compose: each solve starts from raw points.
                self.registration.device_to_reference = *transform;
                host.set_device_world_transform(target, *transform);
            }
            GateOutcome::Converged { max_distance } => {
                info!(
                    source = %self.source,
                    %target,
                    max_distance,
                    "Device alignment accepted"
                );
            }
            GateOutcome::Skipped(_) => {}
        }
        self.registration.aligned = self.gate.is_positioning_complete();
        Ok(outcome)
    }

    /// Put the target back at identity and force a fresh alignment.
    pub fn reset<H: PoseSink + ?Sized>(&mut self, host: &mut H) {
        let target = self.target();
        self.registration.device_to_reference = RigidTransform::identity();
        self.registration.aligned = false;
        host.set_device_world_transform(target, RigidTransform::identity());
        self.gate.reset();
        info!(%target, "Device alignment reset");
    }
}
