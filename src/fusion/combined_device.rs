//! A virtual device whose frames merge every source device.

use tracing::trace;

use crate::config::CombinerKind;
use crate::device::{DeviceHost, DeviceId};
use crate::error::Result;

use super::combiner::{CombineStrategy, build_combiner, combine};
use crate::hand::Frame;

pub struct CombinedDevice {
    sources: Vec<DeviceId>,
    strategy: Box<dyn CombineStrategy>,
}

impl CombinedDevice {
    pub fn new(sources: Vec<DeviceId>, strategy: Box<dyn CombineStrategy>) -> Self {
        Self { sources, strategy }
    }

    pub fn from_config(sources: Vec<DeviceId>, kind: CombinerKind) -> Result<Self> {
        Ok(Self::new(sources, build_combiner(kind)?))
    }

    pub fn sources(&self) -> &[DeviceId] {
        &self.sources
    }

    /// Merge the latest frame of every active source, each moved into the
    /// reference frame by its device pose.
    ///
    /// Call after every source has published its frame for this tick.
    pub fn next_frame<H: DeviceHost + ?Sized>(&self, host: &H) -> Frame {
        let frames: Vec<Frame> = self
            .sources
            .iter()
            .filter(|&&device| host.is_device_active(device))
            .filter_map(|&device| {
                let frame = host.latest_frame(device)?;
                let pose = host.device_world_transform(device);
                trace!(%device, hands = frame.hands().len(), "Gathered device frame");
                Some(frame.transformed(&pose))
            })
            .collect();

        combine(self.strategy.as_ref(), &frames)
    }
}
