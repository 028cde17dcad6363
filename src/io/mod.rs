pub mod recording;

pub use recording::{RecordedDevice, Recording};
