//! Rigid point-set alignment (Kabsch).
//!
//! Computes the rotation and translation that carry one set of 3D points
//! onto an index-corresponding second set in the least-squares sense.
//! There is no scale estimation and no outlier rejection: every
//! correspondence is trusted.

use nalgebra::{Matrix3, Rotation3, SVD, UnitQuaternion, Vector3};
use tracing::{debug, warn};

use crate::error::{FusionError, Result};
use crate::geometry::RigidTransform;
use crate::geometry::frames::rotation_between_or_flip;

/// Iteration cap used by the alignment gate.
pub const DEFAULT_MAX_ITERATIONS: usize = 200;

/// Minimum number of correspondences for a unique solution.
pub const MIN_CORRESPONDENCES: usize = 3;

/// Singular values below this fraction of the largest one count as zero.
const RANK_TOLERANCE: f64 = 1e-9;

/// Convergence threshold (radians) for the iterative rotation fallback.
const POLAR_TOLERANCE: f64 = 1e-12;

/// Compute the rigid transform `T` minimizing `Σ ‖T * moving[i] − reference[i]‖²`.
///
/// Algorithm:
/// 1. Compute centroids of both point sets
/// 2. Center the points
/// 3. Cross-covariance H = Σ moving_i * reference_iᵀ
/// 4. Rotation via SVD of H (iterations capped by `max_iterations`), with
///    the reflection case corrected so the result is always proper
/// 5. Translation: t = c_reference − R * c_moving
///
/// Rank-deficient covariance (collinear or coincident points) leaves the
/// rotation about the degenerate axis at identity.
///
/// # Errors
/// * [`FusionError::LengthMismatch`] if the sets differ in length
/// * [`FusionError::TooFewPoints`] for fewer than 3 correspondences
pub fn solve(
    reference: &[Vector3<f64>],
    moving: &[Vector3<f64>],
    max_iterations: usize,
) -> Result<RigidTransform> {
    if reference.len() != moving.len() {
        return Err(FusionError::LengthMismatch {
            reference: reference.len(),
            moving: moving.len(),
        });
    }
    if moving.len() < MIN_CORRESPONDENCES {
        return Err(FusionError::TooFewPoints { got: moving.len() });
    }

    let centroid_ref = compute_centroid(reference);
    let centroid_mov = compute_centroid(moving);

    let mut h = Matrix3::zeros();
    for (m, r) in moving.iter().zip(reference.iter()) {
        h += (m - centroid_mov) * (r - centroid_ref).transpose();
    }

    let rotation = optimal_rotation(&h, max_iterations);
    let translation = centroid_ref - rotation * centroid_mov;

    Ok(RigidTransform {
        rotation,
        translation,
    })
}

/// Rotation R maximizing trace(R * H).
fn optimal_rotation(h: &Matrix3<f64>, max_iterations: usize) -> UnitQuaternion<f64> {
    if h.amax() <= f64::EPSILON {
        debug!("Coincident point sets, rotation is undetermined");
        return UnitQuaternion::identity();
    }

    // nalgebra treats a cap of 0 as "unbounded".
    let cap = max_iterations.max(1);
    match SVD::try_new(*h, true, true, f64::EPSILON, cap) {
        Some(svd) => rotation_from_svd(&svd),
        None => {
            warn!(
                max_iterations = cap,
                "SVD did not converge, using iterative rotation estimate"
            );
            polar_rotation(&h.transpose(), cap)
        }
    }
}

fn rotation_from_svd(svd: &SVD<f64, nalgebra::U3, nalgebra::U3>) -> UnitQuaternion<f64> {
    let (Some(u), Some(v_t)) = (svd.u.as_ref(), svd.v_t.as_ref()) else {
        return UnitQuaternion::identity();
    };
    let s = &svd.singular_values;
    let rank = svd.rank(RANK_TOLERANCE * s.max());

    match rank {
        0 => UnitQuaternion::identity(),
        1 => {
            // Collinear: only the line direction is known. Take the minimal
            // rotation between the two directions, no twist about the line.
            debug!("Collinear point sets, rotation about the line left at identity");
            let i = s.imax();
            let from = u.column(i).into_owned();
            let to = v_t.row(i).transpose();
            rotation_between_or_flip(&from, &to)
        }
        _ => {
            // SVD: H = U * S * V^T, R = V * U^T
            let mut v = v_t.transpose();
            let mut rotation_mat = v * u.transpose();

            // Handle reflection case (det(R) = -1)
            if rotation_mat.determinant() < 0.0 {
                let k = s.imin();
                for i in 0..3 {
                    v[(i, k)] = -v[(i, k)];
                }
                rotation_mat = v * u.transpose();
            }

            UnitQuaternion::from_rotation_matrix(&Rotation3::from_matrix_unchecked(rotation_mat))
        }
    }
}

/// Rotational part of `a`, found by iteratively torquing an estimate
/// towards the columns of `a` (Müller et al., "A Robust Method to Extract
/// the Rotational Part of Deformations").
///
/// Always returns the current estimate, converged or not.
fn polar_rotation(a: &Matrix3<f64>, max_iterations: usize) -> UnitQuaternion<f64> {
    let mut q = UnitQuaternion::identity();
    for _ in 0..max_iterations {
        let r = q.to_rotation_matrix().into_inner();
        let mut torque = Vector3::zeros();
        let mut alignment = 0.0;
        for c in 0..3 {
            torque += r.column(c).cross(&a.column(c));
            alignment += r.column(c).dot(&a.column(c));
        }
        let omega = torque / (alignment.abs() + 1e-9);
        let w = omega.norm();
        if w < POLAR_TOLERANCE {
            break;
        }
        q = UnitQuaternion::from_scaled_axis(omega) * q;
        q.renormalize();
    }
    q
}

/// Compute centroid of a set of 3D points.
fn compute_centroid(points: &[Vector3<f64>]) -> Vector3<f64> {
    if points.is_empty() {
        return Vector3::zeros();
    }
    let sum: Vector3<f64> = points.iter().sum();
    sum / points.len() as f64
}
