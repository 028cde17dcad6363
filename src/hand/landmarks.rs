//! Canonical landmark points used for cross-device correspondence.
//!
//! One landmark per finger bone: the midpoint of the segment. The order is
//! fixed (digit-major, bone-minor) so landmark `i` of one device corresponds
//! to landmark `i` of another.

use nalgebra::Vector3;

use super::types::{BoneIndex, FINGER_BONE_COUNT, Frame, Hand, Handedness};

pub const LANDMARK_COUNT: usize = FINGER_BONE_COUNT;

pub type Landmarks = [Vector3<f64>; LANDMARK_COUNT];

/// Bone midpoints of `hand` in canonical order.
pub fn landmarks(hand: &Hand) -> Landmarks {
    let mut out = [Vector3::zeros(); LANDMARK_COUNT];
    for (slot, idx) in out.iter_mut().zip(BoneIndex::all()) {
        *slot = hand.bone(idx).center();
    }
    out
}

/// Landmarks of the hand with the given handedness, if the frame has one.
pub fn frame_landmarks(frame: &Frame, handedness: Handedness) -> Option<Landmarks> {
    frame.hand(handedness).map(landmarks)
}

/// Per-landmark Euclidean distances.
pub fn landmark_distances(a: &Landmarks, b: &Landmarks) -> Vec<f64> {
    a.iter().zip(b.iter()).map(|(p, q)| (p - q).norm()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hand::types::DigitKind;
    use approx::assert_relative_eq;

    fn hand_with_offsets(handedness: Handedness) -> Hand {
        let mut hand = Hand::empty(handedness);
        for idx in BoneIndex::all() {
            let d = idx.digit().index() as f64;
            let b = idx.bone() as f64;
            let bone = hand.bone_mut(idx);
            bone.prev_joint = Vector3::new(d, b, 0.0);
            bone.next_joint = Vector3::new(d, b + 1.0, 2.0);
        }
        hand
    }

    #[test]
    fn test_midpoints_in_canonical_order() {
        let hand = hand_with_offsets(Handedness::Right);
        let lm = landmarks(&hand);

        assert_eq!(lm.len(), 20);
        assert_relative_eq!(lm[0], Vector3::new(0.0, 0.5, 1.0), epsilon = 1e-12);
        assert_relative_eq!(lm[1], Vector3::new(0.0, 1.5, 1.0), epsilon = 1e-12);
        // Digit 2 (middle), bone 3.
        assert_relative_eq!(lm[2 * 4 + 3], Vector3::new(2.0, 3.5, 1.0), epsilon = 1e-12);
        assert_relative_eq!(
            lm[19],
            hand.bone(BoneIndex::new(DigitKind::Pinky, 3).unwrap()).center(),
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_missing_hand_is_none() {
        let frame = Frame::new(10, vec![hand_with_offsets(Handedness::Left)]).unwrap();
        assert!(frame_landmarks(&frame, Handedness::Left).is_some());
        assert!(frame_landmarks(&frame, Handedness::Right).is_none());
        assert!(frame_landmarks(&Frame::empty(11), Handedness::Left).is_none());
    }

    #[test]
    fn test_distances() {
        let a = landmarks(&hand_with_offsets(Handedness::Left));
        let mut b = a;
        b[4] += Vector3::new(3.0, 4.0, 0.0);

        let d = landmark_distances(&a, &b);
        assert_relative_eq!(d[4], 5.0, epsilon = 1e-12);
        assert_relative_eq!(d[0], 0.0);
    }
}
