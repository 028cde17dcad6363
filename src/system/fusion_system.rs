//! Fusion system - per-tick orchestration.
//!
//! The `FusionSystem` is the top-level struct a host drives. Every tick it
//! first lets each non-reference device refine its alignment against the
//! reference device, then merges all devices into one frame. The host
//! must have published every device's frame for the tick beforehand.

use std::time::Instant;

use tracing::{debug, info};

use crate::alignment::{AlignmentObserver, DeviceAligner, TracingObserver};
use crate::config::{FusionConfig, validate_threshold};
use crate::device::{DeviceHost, DeviceId, PoseSink};
use crate::error::{FusionError, Result};
use crate::fusion::CombinedDevice;

use super::result::{AlignmentReport, TickResult, TickTiming};

pub struct FusionSystem {
    config: FusionConfig,
    reference: DeviceId,
    /// One per non-reference device, aligned onto `reference`.
    aligners: Vec<DeviceAligner>,
    combined: CombinedDevice,
    observer: Box<dyn AlignmentObserver>,
}

impl FusionSystem {
    /// `devices[0]` is the reference device; all others are aligned into
    /// its frame.
    pub fn new(config: FusionConfig, devices: Vec<DeviceId>) -> Result<Self> {
        config.validate()?;

        let Some(&reference) = devices.first() else {
            return Err(FusionError::InvalidConfig(
                "at least one device is required".to_string(),
            ));
        };
        for (i, device) in devices.iter().enumerate() {
            if devices[..i].contains(device) {
                return Err(FusionError::InvalidConfig(format!(
                    "{device} is listed more than once"
                )));
            }
        }

        let aligners = devices[1..]
            .iter()
            .map(|&target| DeviceAligner::new(reference, target, &config.alignment))
            .collect();
        let combined = CombinedDevice::from_config(devices, config.combiner)?;

        info!(
            %reference,
            devices = combined.sources().len(),
            combiner = ?config.combiner,
            "Fusion system ready"
        );

        Ok(Self {
            config,
            reference,
            aligners,
            combined,
            observer: Box::new(TracingObserver),
        })
    }

    /// Replace the default tracing observer.
    pub fn with_observer(mut self, observer: Box<dyn AlignmentObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn config(&self) -> &FusionConfig {
        &self.config
    }

    pub fn reference(&self) -> DeviceId {
        self.reference
    }

    pub fn aligners(&self) -> &[DeviceAligner] {
        &self.aligners
    }

    pub fn aligner(&self, device: DeviceId) -> Option<&DeviceAligner> {
        self.aligners.iter().find(|a| a.target() == device)
    }

    /// Alignment first, then combination, so this tick's frame already
    /// uses any pose solved this tick.
    pub fn tick<H: DeviceHost + ?Sized>(&mut self, host: &mut H) -> Result<TickResult> {
        let start = Instant::now();

        let mut alignment = Vec::with_capacity(self.aligners.len());
        for aligner in &mut self.aligners {
            let outcome = aligner.tick(&mut *host, self.observer.as_mut())?;
            alignment.push(AlignmentReport {
                device: aligner.target(),
                outcome,
                aligned: aligner.registration().aligned,
            });
        }
        let alignment_done = Instant::now();

        let frame = self.combined.next_frame(&*host);
        let end = Instant::now();

        let timing = TickTiming {
            total_ms: (end - start).as_secs_f64() * 1000.0,
            alignment_ms: (alignment_done - start).as_secs_f64() * 1000.0,
            combine_ms: (end - alignment_done).as_secs_f64() * 1000.0,
        };
        debug!(
            timestamp_us = frame.timestamp_us,
            hands = frame.hands().len(),
            total_ms = timing.total_ms,
            "Fusion tick"
        );

        Ok(TickResult {
            alignment,
            frame,
            timing,
        })
    }

    /// Drop every alignment and start over from identity poses.
    pub fn realign<H: PoseSink + ?Sized>(&mut self, host: &mut H) {
        for aligner in &mut self.aligners {
            aligner.reset(host);
        }
        info!(devices = self.aligners.len(), "Realignment requested");
    }

    /// Applies to every aligner from the next tick on.
    pub fn set_variance_threshold(&mut self, threshold: f64) -> Result<()> {
        validate_threshold(threshold)?;
        self.config.alignment.variance_threshold = threshold;
        for aligner in &mut self.aligners {
            aligner.set_variance_threshold(threshold);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CombinerKind;
    use crate::device::DeviceHub;
    use crate::geometry::RigidTransform;
    use crate::hand::Frame;

    #[test]
    fn test_rejects_bad_device_lists() {
        assert!(matches!(
            FusionSystem::new(FusionConfig::default(), vec![]),
            Err(FusionError::InvalidConfig(_))
        ));
        assert!(matches!(
            FusionSystem::new(FusionConfig::default(), vec![DeviceId(1), DeviceId(1)]),
            Err(FusionError::InvalidConfig(_))
        ));

        let config = FusionConfig {
            combiner: CombinerKind::Angular,
            ..FusionConfig::default()
        };
        assert!(matches!(
            FusionSystem::new(config, vec![DeviceId(0), DeviceId(1)]),
            Err(FusionError::UnsupportedCombiner(_))
        ));
    }

    #[test]
    fn test_one_aligner_per_secondary_device() {
        let system =
            FusionSystem::new(FusionConfig::default(), vec![DeviceId(3), DeviceId(1), DeviceId(2)])
                .unwrap();

        assert_eq!(system.reference(), DeviceId(3));
        let targets: Vec<_> = system.aligners().iter().map(|a| a.target()).collect();
        assert_eq!(targets, vec![DeviceId(1), DeviceId(2)]);
        assert!(system.aligners().iter().all(|a| a.source() == DeviceId(3)));
        assert!(system.aligner(DeviceId(3)).is_none());
    }

    #[test]
    fn test_tick_without_hands() {
        let mut hub = DeviceHub::new();
        hub.publish_frame(DeviceId(0), Frame::empty(5));
        hub.publish_frame(DeviceId(1), Frame::empty(5));
        let mut system =
            FusionSystem::new(FusionConfig::default(), vec![DeviceId(0), DeviceId(1)]).unwrap();

        let result = system.tick(&mut hub).unwrap();

        assert!(result.frame.is_empty());
        assert_eq!(result.alignment.len(), 1);
        assert!(!result.all_aligned());
        assert_eq!(hub.device_world_transform(DeviceId(1)), RigidTransform::identity());
    }

    #[test]
    fn test_set_variance_threshold() {
        let mut system =
            FusionSystem::new(FusionConfig::default(), vec![DeviceId(0), DeviceId(1)]).unwrap();

        system.set_variance_threshold(0.25).unwrap();
        assert_eq!(system.config().alignment.variance_threshold, 0.25);
        assert_eq!(system.aligners()[0].gate().variance_threshold(), 0.25);

        assert!(system.set_variance_threshold(f64::NAN).is_err());
        assert_eq!(system.aligners()[0].gate().variance_threshold(), 0.25);
    }
}
