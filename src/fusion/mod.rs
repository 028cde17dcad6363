pub mod combined_device;
pub mod combiner;
pub mod reconstruct;

pub use combined_device::CombinedDevice;
pub use combiner::{CombineStrategy, LinearCombiner, build_combiner, combine};
pub use reconstruct::{local_joints, reconstruct};
