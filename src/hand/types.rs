//! Skeletal hand data structures.
//!
//! A hand is 5 digits of 4 bones each plus a forearm bone: 21 bones total.
//! Bones are addressed with an explicit (digit, bone) pair rather than a
//! flattened index.

use nalgebra::{UnitQuaternion, Vector3};

use crate::error::{FusionError, Result};
use crate::geometry::{FORWARD, RigidTransform};

pub const DIGIT_COUNT: usize = 5;
pub const BONES_PER_DIGIT: usize = 4;
/// Joints per digit in a [`LocalJoints`] list: the root plus one per bone end.
pub const JOINTS_PER_DIGIT: usize = BONES_PER_DIGIT + 1;
/// Finger bones per hand (the arm is not a finger bone).
pub const FINGER_BONE_COUNT: usize = DIGIT_COUNT * BONES_PER_DIGIT;

/// Which hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Handedness {
    Left,
    Right,
}

impl Handedness {
    pub const ALL: [Handedness; 2] = [Handedness::Left, Handedness::Right];

    pub fn is_left(self) -> bool {
        matches!(self, Self::Left)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
        }
    }
}

/// Digits in canonical order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DigitKind {
    Thumb = 0,
    Index = 1,
    Middle = 2,
    Ring = 3,
    Pinky = 4,
}

impl DigitKind {
    pub const ALL: [DigitKind; DIGIT_COUNT] = [
        DigitKind::Thumb,
        DigitKind::Index,
        DigitKind::Middle,
        DigitKind::Ring,
        DigitKind::Pinky,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(idx: usize) -> Option<Self> {
        Self::ALL.get(idx).copied()
    }
}

/// Bounds-checked (digit, bone-within-digit) address of a finger bone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BoneIndex {
    digit: DigitKind,
    bone: usize,
}

impl BoneIndex {
    /// Returns `None` if `bone` is not in `0..BONES_PER_DIGIT`.
    pub fn new(digit: DigitKind, bone: usize) -> Option<Self> {
        (bone < BONES_PER_DIGIT).then_some(Self { digit, bone })
    }

    /// Returns `None` if either coordinate is out of range.
    pub fn from_raw(digit: usize, bone: usize) -> Option<Self> {
        Self::new(DigitKind::from_index(digit)?, bone)
    }

    pub fn digit(&self) -> DigitKind {
        self.digit
    }

    pub fn bone(&self) -> usize {
        self.bone
    }

    /// All finger bones, digit-major then bone-minor.
    pub fn all() -> impl Iterator<Item = BoneIndex> {
        DigitKind::ALL.into_iter().flat_map(|digit| {
            (0..BONES_PER_DIGIT).map(move |bone| BoneIndex { digit, bone })
        })
    }
}

/// One rigid skeletal segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bone {
    pub prev_joint: Vector3<f64>,
    pub next_joint: Vector3<f64>,
    /// Maps `FORWARD` onto the prev -> next direction.
    pub rotation: UnitQuaternion<f64>,
    pub width: f64,
}

impl Bone {
    pub fn new(
        prev_joint: Vector3<f64>,
        next_joint: Vector3<f64>,
        width: f64,
        rotation: UnitQuaternion<f64>,
    ) -> Self {
        Self {
            prev_joint,
            next_joint,
            rotation,
            width,
        }
    }

    pub fn center(&self) -> Vector3<f64> {
        self.prev_joint.lerp(&self.next_joint, 0.5)
    }

    pub fn length(&self) -> f64 {
        (self.next_joint - self.prev_joint).norm()
    }

    /// The bone's forward axis in the bone's parent space.
    pub fn direction(&self) -> Vector3<f64> {
        self.rotation * FORWARD
    }

    fn transformed(&self, t: &RigidTransform) -> Self {
        Self {
            prev_joint: t.transform_point(&self.prev_joint),
            next_joint: t.transform_point(&self.next_joint),
            rotation: t.transform_rotation(&self.rotation),
            width: self.width,
        }
    }
}

impl Default for Bone {
    fn default() -> Self {
        Self {
            prev_joint: Vector3::zeros(),
            next_joint: Vector3::zeros(),
            rotation: UnitQuaternion::identity(),
            width: 0.0,
        }
    }
}

/// One finger or thumb, root to tip.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Digit {
    pub bones: [Bone; BONES_PER_DIGIT],
}

impl Digit {
    pub fn tip(&self) -> Vector3<f64> {
        self.bones[BONES_PER_DIGIT - 1].next_joint
    }
}

/// Palm summary fields.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Palm {
    pub position: Vector3<f64>,
    pub stabilized_position: Vector3<f64>,
    /// A vector quantity: a pose rotates it and never translates it. Hands
    /// built by the reconstructor store the palm position here as a
    /// placeholder, so the two stop matching once such a hand is moved with
    /// [`Hand::transformed`].
    pub velocity: Vector3<f64>,
    pub normal: Vector3<f64>,
    pub direction: Vector3<f64>,
    pub orientation: UnitQuaternion<f64>,
    pub width: f64,
}

impl Default for Palm {
    fn default() -> Self {
        Self {
            position: Vector3::zeros(),
            stabilized_position: Vector3::zeros(),
            velocity: Vector3::zeros(),
            normal: Vector3::zeros(),
            direction: FORWARD,
            orientation: UnitQuaternion::identity(),
            width: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Hand {
    pub handedness: Handedness,
    pub palm: Palm,
    pub digits: [Digit; DIGIT_COUNT],
    pub arm: Bone,
}

impl Hand {
    /// A hand with every bone collapsed at the origin.
    pub fn empty(handedness: Handedness) -> Self {
        Self {
            handedness,
            palm: Palm::default(),
            digits: [Digit::default(); DIGIT_COUNT],
            arm: Bone::default(),
        }
    }

    pub fn digit(&self, kind: DigitKind) -> &Digit {
        &self.digits[kind.index()]
    }

    pub fn bone(&self, idx: BoneIndex) -> &Bone {
        &self.digits[idx.digit().index()].bones[idx.bone()]
    }

    pub fn bone_mut(&mut self, idx: BoneIndex) -> &mut Bone {
        &mut self.digits[idx.digit().index()].bones[idx.bone()]
    }

    /// Finger bones in canonical order (arm excluded).
    pub fn finger_bones(&self) -> impl Iterator<Item = &Bone> {
        self.digits.iter().flat_map(|d| d.bones.iter())
    }

    /// Apply a rigid transform to every point, direction and orientation.
    ///
    /// Velocity is rotated as a vector, so the reconstructor's
    /// velocity == position placeholder does not survive a pose with a
    /// translation. Scalar widths are unchanged.
    pub fn transformed(&self, t: &RigidTransform) -> Self {
        let mut digits = self.digits;
        for digit in digits.iter_mut() {
            for bone in digit.bones.iter_mut() {
                *bone = bone.transformed(t);
            }
        }
        Self {
            handedness: self.handedness,
            palm: Palm {
                position: t.transform_point(&self.palm.position),
                stabilized_position: t.transform_point(&self.palm.stabilized_position),
                velocity: t.transform_vector(&self.palm.velocity),
                normal: t.transform_vector(&self.palm.normal),
                direction: t.transform_vector(&self.palm.direction),
                orientation: t.transform_rotation(&self.palm.orientation),
                width: self.palm.width,
            },
            digits,
            arm: self.arm.transformed(t),
        }
    }
}

/// Joint positions of a hand, five per digit: the root (`prev_joint` of
/// bone 0) followed by the `next_joint` of each bone.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalJoints {
    joints: [[Vector3<f64>; JOINTS_PER_DIGIT]; DIGIT_COUNT],
}

impl LocalJoints {
    pub fn zeros() -> Self {
        Self {
            joints: [[Vector3::zeros(); JOINTS_PER_DIGIT]; DIGIT_COUNT],
        }
    }

    pub fn from_array(joints: [[Vector3<f64>; JOINTS_PER_DIGIT]; DIGIT_COUNT]) -> Self {
        Self { joints }
    }

    pub fn get(&self, digit: DigitKind, joint: usize) -> Option<&Vector3<f64>> {
        self.joints[digit.index()].get(joint)
    }

    pub fn digit(&self, digit: DigitKind) -> &[Vector3<f64>; JOINTS_PER_DIGIT] {
        &self.joints[digit.index()]
    }

    pub fn digit_mut(&mut self, digit: DigitKind) -> &mut [Vector3<f64>; JOINTS_PER_DIGIT] {
        &mut self.joints[digit.index()]
    }

    /// The two joints bounding a bone.
    pub fn segment(&self, idx: BoneIndex) -> (Vector3<f64>, Vector3<f64>) {
        let joints = self.digit(idx.digit());
        (joints[idx.bone()], joints[idx.bone() + 1])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Vector3<f64>> {
        self.joints.iter().flat_map(|d| d.iter())
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Vector3<f64>> {
        self.joints.iter_mut().flat_map(|d| d.iter_mut())
    }
}

/// Point-in-time snapshot from one device: at most one hand per handedness.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Frame {
    pub timestamp_us: i64,
    hands: Vec<Hand>,
}

impl Frame {
    /// Fails with [`FusionError::DuplicateHand`] if two hands share a handedness.
    pub fn new(timestamp_us: i64, hands: Vec<Hand>) -> Result<Self> {
        let mut frame = Self {
            timestamp_us,
            hands: Vec::with_capacity(hands.len()),
        };
        for hand in hands {
            frame.push_hand(hand)?;
        }
        Ok(frame)
    }

    pub fn empty(timestamp_us: i64) -> Self {
        Self {
            timestamp_us,
            hands: Vec::new(),
        }
    }

    pub fn push_hand(&mut self, hand: Hand) -> Result<()> {
        if self.hand(hand.handedness).is_some() {
            return Err(FusionError::DuplicateHand(hand.handedness));
        }
        self.hands.push(hand);
        Ok(())
    }

    /// Insert `hand`, replacing any hand of the same handedness.
    pub fn set_hand(&mut self, hand: Hand) {
        match self.hands.iter_mut().find(|h| h.handedness == hand.handedness) {
            Some(slot) => *slot = hand,
            None => self.hands.push(hand),
        }
    }

    pub fn hands(&self) -> &[Hand] {
        &self.hands
    }

    pub fn hand(&self, handedness: Handedness) -> Option<&Hand> {
        self.hands.iter().find(|h| h.handedness == handedness)
    }

    pub fn is_empty(&self) -> bool {
        self.hands.is_empty()
    }

    /// Copy of this frame with every hand moved by `t`.
    pub fn transformed(&self, t: &RigidTransform) -> Self {
        Self {
            timestamp_us: self.timestamp_us,
            hands: self.hands.iter().map(|h| h.transformed(t)).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_bone_index_bounds() {
        assert!(BoneIndex::new(DigitKind::Thumb, 3).is_some());
        assert!(BoneIndex::new(DigitKind::Thumb, 4).is_none());
        assert!(BoneIndex::from_raw(5, 0).is_none());
        assert_eq!(
            BoneIndex::from_raw(4, 3).map(|b| (b.digit(), b.bone())),
            Some((DigitKind::Pinky, 3))
        );
    }

    #[test]
    fn test_bone_index_order() {
        let all: Vec<_> = BoneIndex::all().collect();
        assert_eq!(all.len(), FINGER_BONE_COUNT);
        assert_eq!(all[0].digit(), DigitKind::Thumb);
        assert_eq!(all[3].bone(), 3);
        assert_eq!(all[4].digit(), DigitKind::Index);
        assert_eq!(all[4].bone(), 0);
        assert_eq!(all[19].digit(), DigitKind::Pinky);
    }

    #[test]
    fn test_frame_rejects_duplicate_handedness() {
        let result = Frame::new(
            0,
            vec![Hand::empty(Handedness::Left), Hand::empty(Handedness::Left)],
        );
        assert_eq!(result, Err(FusionError::DuplicateHand(Handedness::Left)));

        let frame = Frame::new(
            0,
            vec![Hand::empty(Handedness::Left), Hand::empty(Handedness::Right)],
        )
        .unwrap();
        assert_eq!(frame.hands().len(), 2);
        assert!(frame.hand(Handedness::Right).is_some());
    }

    #[test]
    fn test_hand_transformed_moves_joints() {
        let mut hand = Hand::empty(Handedness::Right);
        let idx = BoneIndex::new(DigitKind::Index, 1).unwrap();
        hand.bone_mut(idx).next_joint = Vector3::new(1.0, 0.0, 0.0);
        hand.palm.velocity = Vector3::new(1.0, 0.0, 0.0);

        let t = RigidTransform::new(
            UnitQuaternion::from_axis_angle(&Vector3::z_axis(), std::f64::consts::FRAC_PI_2),
            Vector3::new(0.0, 0.0, 5.0),
        );
        let moved = hand.transformed(&t);

        assert_relative_eq!(moved.bone(idx).next_joint, Vector3::new(0.0, 1.0, 5.0), epsilon = 1e-10);
        assert_relative_eq!(moved.palm.position, Vector3::new(0.0, 0.0, 5.0), epsilon = 1e-10);
        // Velocity is a vector: rotated, not translated.
        assert_relative_eq!(moved.palm.velocity, Vector3::new(0.0, 1.0, 0.0), epsilon = 1e-10);
        assert_eq!(moved.handedness, Handedness::Right);
    }
}
