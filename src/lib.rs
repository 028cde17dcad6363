pub mod alignment;
pub mod config;
pub mod device;
pub mod error;
pub mod fusion;
pub mod geometry;
pub mod hand;
pub mod io;
pub mod system;

pub use config::FusionConfig;
pub use error::{FusionError, Result};
pub use system::FusionSystem;

#[cfg(test)]
pub(crate) mod test_fixtures;
