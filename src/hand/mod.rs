//! Hand data model and landmark extraction.

pub mod landmarks;
pub mod types;

pub use landmarks::{LANDMARK_COUNT, Landmarks, frame_landmarks, landmarks};
pub use types::{
    BONES_PER_DIGIT, Bone, BoneIndex, DIGIT_COUNT, Digit, DigitKind, Frame, Hand, Handedness,
    JOINTS_PER_DIGIT, LocalJoints, Palm,
};
