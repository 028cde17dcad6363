//! Cross-device rigid alignment: Kabsch solver, convergence gate and the
//! per-session device aligner.

pub mod aligner;
pub mod gate;
pub mod kabsch;

pub use aligner::{DeviceAligner, DeviceRegistration};
pub use gate::{AlignmentObserver, ConvergenceGate, GateOutcome, SkipReason, TracingObserver};
pub use kabsch::solve;
