//! Per-tick results and diagnostics.

use crate::alignment::GateOutcome;
use crate::device::DeviceId;
use crate::hand::Frame;

/// Summary of one fusion tick.
#[derive(Debug, Clone)]
pub struct TickResult {
    /// One entry per non-reference device, in registration order.
    pub alignment: Vec<AlignmentReport>,
    /// The combined frame in the reference device's coordinates.
    pub frame: Frame,
    pub timing: TickTiming,
}

impl TickResult {
    /// True once every device has an accepted alignment.
    pub fn all_aligned(&self) -> bool {
        self.alignment.iter().all(|r| r.aligned)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AlignmentReport {
    pub device: DeviceId,
    pub outcome: GateOutcome,
    /// Registration state after this tick.
    pub aligned: bool,
}

/// Timing breakdown for a tick.
#[derive(Debug, Clone, Copy, Default)]
pub struct TickTiming {
    pub total_ms: f64,
    pub alignment_ms: f64,
    pub combine_ms: f64,
}
