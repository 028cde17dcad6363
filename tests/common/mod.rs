#![allow(dead_code)]

use nalgebra::{UnitQuaternion, Vector3};

use rust_handfusion::fusion::reconstruct;
use rust_handfusion::geometry::RigidTransform;
use rust_handfusion::hand::{BoneIndex, DigitKind, Hand, Handedness, LocalJoints};

/// Open hand in palm-local space, fingers curling slightly downwards.
pub fn open_hand_joints() -> LocalJoints {
    let mut joints = LocalJoints::zeros();
    for kind in DigitKind::ALL {
        let x = (kind.index() as f64 - 2.0) * 2.0;
        let root = if kind == DigitKind::Thumb { 0.0 } else { 3.0 };
        *joints.digit_mut(kind) = [
            Vector3::new(x, 0.0, 0.0),
            Vector3::new(x, 0.0, root),
            Vector3::new(x, -0.3, root + 2.5),
            Vector3::new(x, -0.8, root + 4.0),
            Vector3::new(x, -1.5, root + 5.0),
        ];
    }
    joints
}

pub fn hand_at(handedness: Handedness, position: Vector3<f64>) -> Hand {
    reconstruct(
        handedness,
        &position,
        &UnitQuaternion::from_euler_angles(0.2, 0.1, -0.3),
        &open_hand_joints(),
    )
}

/// Hand whose 20 landmarks cycle through the corners of a unit square.
pub fn square_hand(handedness: Handedness, t: &RigidTransform) -> Hand {
    let corners = square_corners();
    let mut hand = Hand::empty(handedness);
    for idx in BoneIndex::all() {
        let p = t.transform_point(&corners[idx.bone()]);
        let bone = hand.bone_mut(idx);
        bone.prev_joint = p;
        bone.next_joint = p;
    }
    hand
}

pub fn square_corners() -> [Vector3<f64>; 4] {
    [
        Vector3::new(0.0, 0.0, 0.0),
        Vector3::new(1.0, 0.0, 0.0),
        Vector3::new(0.0, 1.0, 0.0),
        Vector3::new(1.0, 1.0, 0.0),
    ]
}

/// 90 degrees about +Z, then (5, 0, 0).
pub fn quarter_turn_shift() -> RigidTransform {
    RigidTransform::new(
        UnitQuaternion::from_axis_angle(&Vector3::z_axis(), std::f64::consts::FRAC_PI_2),
        Vector3::new(5.0, 0.0, 0.0),
    )
}
