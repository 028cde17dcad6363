//! Axis conventions and palm-local <-> world conversions.
//!
//! # Axis convention
//!
//! All hand data in this crate uses a single right-handed convention:
//!
//! ```text
//!        +Y (up)
//!         |
//!         |
//!         +------ +X (right)
//!        /
//!       /
//!      +Z (forward, from wrist towards fingertips)
//! ```
//!
//! A bone's rotation maps `FORWARD` onto the direction from its previous
//! joint to its next joint. The palm orientation maps `FORWARD` onto the
//! palm direction, which is why the forearm sits at negative local Z.
//!
//! # Palm-local space
//!
//! ```text
//! local = palm_rot⁻¹ * (world - palm_pos)
//! world = palm_rot * local + palm_pos
//! ```

use nalgebra::{UnitQuaternion, Vector3};

/// Below this length a direction is treated as the zero vector.
pub const DEGENERATE_LENGTH: f64 = 1e-6;

pub const FORWARD: Vector3<f64> = Vector3::new(0.0, 0.0, 1.0);
pub const UP: Vector3<f64> = Vector3::new(0.0, 1.0, 0.0);
pub const RIGHT: Vector3<f64> = Vector3::new(1.0, 0.0, 0.0);

/// Express a world-space point in the frame centered at `origin` with rotation `rot`.
#[inline]
pub fn to_local(world: &Vector3<f64>, origin: &Vector3<f64>, rot: &UnitQuaternion<f64>) -> Vector3<f64> {
    rot.inverse_transform_vector(&(world - origin))
}

/// Inverse of [`to_local`].
#[inline]
pub fn to_world(local: &Vector3<f64>, origin: &Vector3<f64>, rot: &UnitQuaternion<f64>) -> Vector3<f64> {
    rot * local + origin
}

/// Normalize `v`, returning `None` for (near) zero-length vectors.
#[inline]
pub fn try_normalize(v: &Vector3<f64>) -> Option<Vector3<f64>> {
    v.try_normalize(DEGENERATE_LENGTH)
}

/// Orientation whose forward axis points along `forward` and whose up axis
/// points along the component of `up` orthogonal to `forward`.
///
/// Falls back to the minimal rotation `FORWARD -> forward` when `up` is
/// (anti)parallel to `forward`, and to identity when `forward` is zero.
pub fn look_rotation(forward: &Vector3<f64>, up: &Vector3<f64>) -> UnitQuaternion<f64> {
    let Some(f) = try_normalize(forward) else {
        return UnitQuaternion::identity();
    };
    if try_normalize(&up.cross(&f)).is_none() {
        return rotation_between_or_flip(&FORWARD, &f);
    }
    // face_towards maps +Z onto `f` and +Y into the plane of `up`.
    UnitQuaternion::face_towards(&f, up)
}

/// Minimal rotation taking unit vector `a` onto unit vector `b`.
///
/// For opposite vectors the half-turn is taken about an arbitrary axis
/// orthogonal to `a`.
pub fn rotation_between_or_flip(a: &Vector3<f64>, b: &Vector3<f64>) -> UnitQuaternion<f64> {
    if let Some(q) = UnitQuaternion::rotation_between(a, b) {
        return q;
    }
    let helper = if a.x.abs() < 0.9 { RIGHT } else { UP };
    match try_normalize(&a.cross(&helper)) {
        Some(axis) => UnitQuaternion::from_scaled_axis(axis * std::f64::consts::PI),
        None => UnitQuaternion::identity(),
    }
}

/// Sign-aligned, renormalized mean of a set of orientations.
///
/// Adequate for the small spread expected between devices observing the
/// same palm. Returns identity for an empty input.
pub fn mean_rotation(rotations: &[UnitQuaternion<f64>]) -> UnitQuaternion<f64> {
    let Some(first) = rotations.first() else {
        return UnitQuaternion::identity();
    };
    let mut sum = nalgebra::Quaternion::new(0.0, 0.0, 0.0, 0.0);
    for q in rotations {
        // q and -q are the same rotation; keep every sample in the first one's hemisphere.
        if q.coords.dot(&first.coords) < 0.0 {
            sum -= q.into_inner();
        } else {
            sum += q.into_inner();
        }
    }
    UnitQuaternion::try_new(sum, DEGENERATE_LENGTH).unwrap_or(*first)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::Unit;
    use rand::prelude::*;

    fn random_rotation(rng: &mut impl Rng) -> UnitQuaternion<f64> {
        let axis = Vector3::new(
            rng.gen_range(-1.0..1.0),
            rng.gen_range(-1.0..1.0),
            rng.gen_range(-1.0..1.0),
        );
        let angle = rng.gen_range(-std::f64::consts::PI..std::f64::consts::PI);
        UnitQuaternion::from_axis_angle(&Unit::new_normalize(axis), angle)
    }

    #[test]
    fn test_local_world_roundtrip() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..100 {
            let p = Vector3::new(
                rng.gen_range(-50.0..50.0),
                rng.gen_range(-50.0..50.0),
                rng.gen_range(-50.0..50.0),
            );
            let origin = Vector3::new(
                rng.gen_range(-10.0..10.0),
                rng.gen_range(-10.0..10.0),
                rng.gen_range(-10.0..10.0),
            );
            let rot = random_rotation(&mut rng);

            let back = to_local(&to_world(&p, &origin, &rot), &origin, &rot);
            assert_relative_eq!(back, p, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_look_rotation_axes() {
        let forward = Vector3::new(1.0, 1.0, 0.0);
        let up = Vector3::new(0.0, 0.0, 1.0);
        let q = look_rotation(&forward, &up);

        assert_relative_eq!(q * FORWARD, forward.normalize(), epsilon = 1e-10);
        assert_relative_eq!(q * UP, up, epsilon = 1e-10);
    }

    #[test]
    fn test_look_rotation_degenerate_inputs() {
        assert_eq!(look_rotation(&Vector3::zeros(), &UP), UnitQuaternion::identity());

        // Up parallel to forward: still points forward, no NaN.
        let q = look_rotation(&UP, &UP);
        assert!(q.coords.iter().all(|c| c.is_finite()));
        assert_relative_eq!(q * FORWARD, UP, epsilon = 1e-10);
    }

    #[test]
    fn test_rotation_between_opposite() {
        let q = rotation_between_or_flip(&FORWARD, &(-FORWARD));
        assert_relative_eq!(q * FORWARD, -FORWARD, epsilon = 1e-10);
    }

    #[test]
    fn test_mean_rotation_sign_invariant() {
        let q = UnitQuaternion::from_axis_angle(&Vector3::y_axis(), 0.4);
        let flipped = UnitQuaternion::new_unchecked(-q.into_inner());
        let mean = mean_rotation(&[q, flipped]);
        assert_relative_eq!(mean.angle_to(&q), 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_mean_rotation_between_two() {
        let a = UnitQuaternion::from_axis_angle(&Vector3::z_axis(), 0.2);
        let b = UnitQuaternion::from_axis_angle(&Vector3::z_axis(), 0.6);
        let mean = mean_rotation(&[a, b]);
        assert_relative_eq!(mean.angle(), 0.4, epsilon = 1e-10);
    }
}
