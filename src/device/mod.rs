//! Boundary between the fusion core and the host that owns the devices.
//!
//! The host drives the tick, reads the tracking SDK and stores device
//! poses. The core only sees it through these traits. [`DeviceHub`] is an
//! in-memory host used by the replay binary and by tests.

use std::collections::BTreeMap;
use std::fmt;

use tracing::debug;

use crate::geometry::RigidTransform;
use crate::hand::Frame;

/// Opaque device handle assigned by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DeviceId(pub u32);

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "device#{}", self.0)
    }
}

/// Non-blocking read of a device's most recent tracking snapshot.
pub trait FrameSource {
    /// `None` if the device is unknown. A known device may return a frame
    /// with no hands.
    fn latest_frame(&self, device: DeviceId) -> Option<Frame>;
}

pub trait DeviceConnectivity {
    fn is_device_active(&self, device: DeviceId) -> bool;
}

/// Storage for each device's pose in the shared reference frame.
pub trait PoseSink {
    /// Identity for devices that were never placed.
    fn device_world_transform(&self, device: DeviceId) -> RigidTransform;
    fn set_device_world_transform(&mut self, device: DeviceId, transform: RigidTransform);
}

/// Everything the per-tick update needs from its host.
pub trait DeviceHost: FrameSource + DeviceConnectivity + PoseSink {}

impl<T: FrameSource + DeviceConnectivity + PoseSink + ?Sized> DeviceHost for T {}

#[derive(Debug, Clone, Default)]
struct DeviceSlot {
    frame: Frame,
    active: bool,
    pose: RigidTransform,
}

/// In-memory device host.
#[derive(Debug, Clone, Default)]
pub struct DeviceHub {
    devices: BTreeMap<DeviceId, DeviceSlot>,
}

impl DeviceHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a connected device with an empty frame and identity pose.
    pub fn add_device(&mut self, device: DeviceId) {
        self.devices.entry(device).or_insert_with(|| DeviceSlot {
            active: true,
            ..DeviceSlot::default()
        });
    }

    pub fn device_ids(&self) -> impl Iterator<Item = DeviceId> + '_ {
        self.devices.keys().copied()
    }

    /// Replace a device's latest frame. Unknown devices are registered.
    pub fn publish_frame(&mut self, device: DeviceId, frame: Frame) {
        self.add_device(device);
        if let Some(slot) = self.devices.get_mut(&device) {
            slot.frame = frame;
        }
    }

    pub fn set_active(&mut self, device: DeviceId, active: bool) {
        match self.devices.get_mut(&device) {
            Some(slot) => slot.active = active,
            None => debug!(%device, "Ignoring connectivity change for unknown device"),
        }
    }
}

impl FrameSource for DeviceHub {
    fn latest_frame(&self, device: DeviceId) -> Option<Frame> {
        self.devices.get(&device).map(|slot| slot.frame.clone())
    }
}

impl DeviceConnectivity for DeviceHub {
    fn is_device_active(&self, device: DeviceId) -> bool {
        self.devices.get(&device).is_some_and(|slot| slot.active)
    }
}

impl PoseSink for DeviceHub {
    fn device_world_transform(&self, device: DeviceId) -> RigidTransform {
        self.devices
            .get(&device)
            .map(|slot| slot.pose)
            .unwrap_or_default()
    }

    fn set_device_world_transform(&mut self, device: DeviceId, transform: RigidTransform) {
        self.add_device(device);
        if let Some(slot) = self.devices.get_mut(&device) {
            slot.pose = transform;
        }
    }
}
