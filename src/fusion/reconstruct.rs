//! Palm-local joint list <-> world-space hand skeleton.
//!
//! The reconstructor is stateless: the same palm pose and joint list always
//! yield the same hand.

use nalgebra::{UnitQuaternion, Vector3};

use crate::geometry::frames::try_normalize;
use crate::geometry::{FORWARD, RIGHT, UP, look_rotation, to_local, to_world};
use crate::hand::{Bone, BoneIndex, DigitKind, Hand, Handedness, LocalJoints, Palm};

pub const FINGER_BONE_WIDTH: f64 = 1.0;
pub const ARM_WIDTH: f64 = 5.0;
pub const PALM_WIDTH: f64 = 8.5;

/// Forearm endpoints in palm-local space. Not tracked, a fixed convention.
const ARM_PREV_LOCAL: Vector3<f64> = Vector3::new(0.0, 0.0, -30.0);
const ARM_NEXT_LOCAL: Vector3<f64> = Vector3::new(0.0, 0.0, -5.5);

/// Rebuild a full hand from palm-local joint positions.
///
/// Bone orientation: forward along the segment, up along
/// `direction × reference`, where the reference axis is `UP` for the thumb
/// (mirrored for the left hand) and `RIGHT` for the fingers. Zero-length
/// segments get the palm's orientation.
pub fn reconstruct(
    handedness: Handedness,
    palm_position: &Vector3<f64>,
    palm_orientation: &UnitQuaternion<f64>,
    joints: &LocalJoints,
) -> Hand {
    let mut hand = Hand::empty(handedness);

    for idx in BoneIndex::all() {
        let (prev, next) = joints.segment(idx);
        let local_rotation = local_bone_rotation(handedness, idx.digit(), &prev, &next);

        let mut rotation = palm_orientation * local_rotation;
        rotation.renormalize();

        *hand.bone_mut(idx) = Bone::new(
            to_world(&prev, palm_position, palm_orientation),
            to_world(&next, palm_position, palm_orientation),
            FINGER_BONE_WIDTH,
            rotation,
        );
    }

    hand.arm = Bone::new(
        to_world(&ARM_PREV_LOCAL, palm_position, palm_orientation),
        to_world(&ARM_NEXT_LOCAL, palm_position, palm_orientation),
        ARM_WIDTH,
        *palm_orientation,
    );

    hand.palm = Palm {
        position: *palm_position,
        stabilized_position: *palm_position,
        // Placeholder carried over from the device SDK convention, not a velocity.
        velocity: *palm_position,
        normal: Vector3::zeros(),
        direction: palm_orientation * FORWARD,
        orientation: *palm_orientation,
        width: PALM_WIDTH,
    };

    hand
}

/// Rotation of one bone relative to the palm.
pub fn local_bone_rotation(
    handedness: Handedness,
    digit: DigitKind,
    prev: &Vector3<f64>,
    next: &Vector3<f64>,
) -> UnitQuaternion<f64> {
    let Some(direction) = try_normalize(&(next - prev)) else {
        // Coincident joints, e.g. the thumb's metacarpal slot.
        return UnitQuaternion::identity();
    };

    let reference = match (digit, handedness) {
        (DigitKind::Thumb, Handedness::Left) => -UP,
        (DigitKind::Thumb, Handedness::Right) => UP,
        _ => RIGHT,
    };
    look_rotation(&direction, &direction.cross(&reference))
}

/// Joint positions of `hand` relative to its own palm.
pub fn local_joints(hand: &Hand) -> LocalJoints {
    let palm_pos = hand.palm.position;
    let palm_rot = hand.palm.orientation;

    let mut joints = LocalJoints::zeros();
    for kind in DigitKind::ALL {
        let digit = hand.digit(kind);
        let out = joints.digit_mut(kind);
        out[0] = to_local(&digit.bones[0].prev_joint, &palm_pos, &palm_rot);
        for (slot, bone) in out[1..].iter_mut().zip(digit.bones.iter()) {
            *slot = to_local(&bone.next_joint, &palm_pos, &palm_rot);
        }
    }
    joints
}
