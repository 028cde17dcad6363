//! Geometry utilities: rigid transforms, axis conventions, palm-local frames.

pub mod frames;
pub mod rigid;

pub use frames::{FORWARD, RIGHT, UP, look_rotation, to_local, to_world};
pub use rigid::RigidTransform;
