//! Top-level orchestration of alignment and combination.

mod fusion_system;
pub mod result;

pub use fusion_system::FusionSystem;
pub use result::{AlignmentReport, TickResult, TickTiming};
