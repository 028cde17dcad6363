use nalgebra::Vector3;

use crate::hand::{DigitKind, LocalJoints};

/// A relaxed open hand in palm-local space. The thumb's metacarpal has
/// zero length.
pub fn sample_local_joints() -> LocalJoints {
    let mut joints = LocalJoints::zeros();
    for kind in DigitKind::ALL {
        let x = (kind.index() as f64 - 2.0) * 2.0;
        let m = if kind == DigitKind::Thumb { 0.0 } else { 3.0 };
        *joints.digit_mut(kind) = [
            Vector3::new(x, 0.0, 0.0),
            Vector3::new(x, 0.0, m),
            Vector3::new(x, -0.3, m + 2.5),
            Vector3::new(x, -0.8, m + 4.0),
            Vector3::new(x, -1.5, m + 5.0),
        ];
    }
    joints
}

/// [`sample_local_joints`] scaled about the palm and raised along +Y, so
/// each caller can hand a device its own distinct joint set.
pub fn scaled_local_joints(scale: f64, lift: f64) -> LocalJoints {
    let mut joints = sample_local_joints();
    for j in joints.iter_mut() {
        *j = *j * scale + Vector3::new(0.0, lift, 0.0);
    }
    joints
}

/// Element-wise mean of several joint sets.
pub fn mean_local_joints(sets: &[LocalJoints]) -> LocalJoints {
    let mut mean = LocalJoints::zeros();
    for set in sets {
        for (sum, j) in mean.iter_mut().zip(set.iter()) {
            *sum += j;
        }
    }
    mean.iter_mut().for_each(|j| *j /= sets.len() as f64);
    mean
}
