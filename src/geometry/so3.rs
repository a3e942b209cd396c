//! # SO(3)
//!
//! Special Orthogonal Group 3 (SO(3)).

use ndarray::{Array, Array2, ArrayView, Ix1, Ix2};

/// Convert a quaternion in scalar-first format to a 3x3 rotation matrix.
pub fn quat_to_mat3(quat_wxyz: &ArrayView<f64, Ix1>) -> Array<f64, Ix2> {
    let w = quat_wxyz[0];
    let x = quat_wxyz[1];
    let y = quat_wxyz[2];
    let z = quat_wxyz[3];

    let e_00 = 1. - 2. * y.powi(2) - 2. * z.powi(2);
    let e_01 = 2. * x * y - 2. * z * w;
    let e_02 = 2. * x * z + 2. * y * w;

    let e_10 = 2. * x * y + 2. * z * w;
    let e_11 = 1. - 2. * x.powi(2) - 2. * z.powi(2);
    let e_12 = 2. * y * z - 2. * x * w;

    let e_20 = 2. * x * z - 2. * y * w;
    let e_21 = 2. * y * z + 2. * x * w;
    let e_22 = 1. - 2. * x.powi(2) - 2. * y.powi(2);

    // Safety: We will always have nine elements.
    unsafe {
        Array2::from_shape_vec_unchecked(
            [3, 3],
            vec![e_00, e_01, e_02, e_10, e_11, e_12, e_20, e_21, e_22],
        )
    }
}

/// Convert a 3x3 rotation matrix to a scalar-first quaternion.
pub fn mat3_to_quat(mat3: &ArrayView<f64, Ix2>) -> Array<f64, Ix1> {
    let trace = mat3[[0, 0]] + mat3[[1, 1]] + mat3[[2, 2]];
    let mut quat_wxyz = if trace > 0.0 {
        let s = 0.5 / f64::sqrt(trace + 1.0);
        let qw = 0.25 / s;
        let qx = (mat3[[2, 1]] - mat3[[1, 2]]) * s;
        let qy = (mat3[[0, 2]] - mat3[[2, 0]]) * s;
        let qz = (mat3[[1, 0]] - mat3[[0, 1]]) * s;
        Array::<f64, Ix1>::from_vec(vec![qw, qx, qy, qz])
    } else if mat3[[0, 0]] > mat3[[1, 1]] && mat3[[0, 0]] > mat3[[2, 2]] {
        let s = 2.0 * f64::sqrt(1.0 + mat3[[0, 0]] - mat3[[1, 1]] - mat3[[2, 2]]);
        let qw = (mat3[[2, 1]] - mat3[[1, 2]]) / s;
        let qx = 0.25 * s;
        let qy = (mat3[[0, 1]] + mat3[[1, 0]]) / s;
        let qz = (mat3[[0, 2]] + mat3[[2, 0]]) / s;
        Array::<f64, Ix1>::from_vec(vec![qw, qx, qy, qz])
    } else if mat3[[1, 1]] > mat3[[2, 2]] {
        let s = 2.0 * f64::sqrt(1.0 + mat3[[1, 1]] - mat3[[0, 0]] - mat3[[2, 2]]);
        let qw = (mat3[[0, 2]] - mat3[[2, 0]]) / s;
        let qx = (mat3[[0, 1]] + mat3[[1, 0]]) / s;
        let qy = 0.25 * s;
        let qz = (mat3[[1, 2]] + mat3[[2, 1]]) / s;
        Array::<f64, Ix1>::from_vec(vec![qw, qx, qy, qz])
    } else {
        let s = 2.0 * f64::sqrt(1.0 + mat3[[2, 2]] - mat3[[0, 0]] - mat3[[1, 1]]);
        let qw = (mat3[[1, 0]] - mat3[[0, 1]]) / s;
        let qx = (mat3[[0, 2]] + mat3[[2, 0]]) / s;
        let qy = (mat3[[1, 2]] + mat3[[2, 1]]) / s;
        let qz = 0.25 * s;
        Array::<f64, Ix1>::from_vec(vec![qw, qx, qy, qz])
    };

    // Canonicalize the quaternion.
    if quat_wxyz[0] < 0.0 {
        quat_wxyz *= -1.0;
    }
    quat_wxyz
}

/// Convert a scalar-first quaternion to yaw.
/// In the Pandaset coordinate system, this is counter-clockwise rotation about the +z axis.
pub fn quat_to_yaw(quat_wxyz: &ArrayView<f64, Ix1>) -> f64 {
    let (qw, qx, qy, qz) = (quat_wxyz[0], quat_wxyz[1], quat_wxyz[2], quat_wxyz[3]);
    let siny_cosp = 2. * (qw * qz + qx * qy);
    let cosy_cosp = 1. - 2. * (qy * qy + qz * qz);
    siny_cosp.atan2(cosy_cosp)
}

/// Convert rotation about the z-axis to a scalar-first quaternion.
pub fn yaw_to_quat(yaw_rad: f64) -> Array<f64, Ix1> {
    let qw = f64::cos(0.5 * yaw_rad);
    let qz = f64::sin(0.5 * yaw_rad);
    Array::<f64, Ix1>::from_vec(vec![qw, 0.0, 0.0, qz])
}

/// Recover extrinsic x-y-z Euler angles (roll, pitch, yaw) from a rotation matrix.
/// This is the rotation reported for a world-frame cuboid after the rigid map.
pub fn mat3_to_rpy(mat3: &ArrayView<f64, Ix2>) -> [f64; 3] {
    let sy = f64::sqrt(mat3[[0, 0]].powi(2) + mat3[[1, 0]].powi(2));
    if sy > 1e-6 {
        let roll = mat3[[2, 1]].atan2(mat3[[2, 2]]);
        let pitch = (-mat3[[2, 0]]).atan2(sy);
        let yaw = mat3[[1, 0]].atan2(mat3[[0, 0]]);
        [roll, pitch, yaw]
    } else {
        // Gimbal lock: pitch at +-90 degrees, yaw folded into roll.
        let roll = (-mat3[[1, 2]]).atan2(mat3[[1, 1]]);
        let pitch = (-mat3[[2, 0]]).atan2(sy);
        [roll, pitch, 0.0]
    }
}

#[cfg(test)]
mod tests {
    use super::{mat3_to_quat, mat3_to_rpy, quat_to_mat3, quat_to_yaw, yaw_to_quat};
    use ndarray::{Array, Ix1};
    use rand_distr::{Distribution, StandardNormal};

    /// Sample a random unit quaternion in scalar-first format.
    fn sample_random_quat_wxyz() -> Array<f64, Ix1> {
        let distribution = StandardNormal;
        let qw: f64 = distribution.sample(&mut rand::thread_rng());
        let qx: f64 = distribution.sample(&mut rand::thread_rng());
        let qy: f64 = distribution.sample(&mut rand::thread_rng());
        let qz: f64 = distribution.sample(&mut rand::thread_rng());
        let quat_wxyz = Array::<f64, Ix1>::from_vec(vec![qw, qx, qy, qz]);
        let norm = quat_wxyz.dot(&quat_wxyz).sqrt();
        let mut versor_wxyz = quat_wxyz / norm;

        // Canonicalize the quaternion.
        if versor_wxyz[0] < 0.0 {
            versor_wxyz *= -1.0;
        }
        versor_wxyz
    }

    #[test]
    fn test_quat_to_mat3_round_trip() {
        let num_trials = 10000;
        let epsilon = 1e-9;
        for _ in 0..num_trials {
            let quat_wxyz = sample_random_quat_wxyz();
            let mat3 = quat_to_mat3(&quat_wxyz.view());
            let recovered_wxyz = mat3_to_quat(&mat3.view());
            for (a, b) in quat_wxyz.iter().zip(recovered_wxyz.iter()) {
                assert!((a - b).abs() < epsilon);
            }
        }
    }

    #[test]
    fn test_yaw_round_trip() {
        let yaw = 1.25_f64;
        let quat_wxyz = yaw_to_quat(yaw);
        assert!((quat_to_yaw(&quat_wxyz.view()) - yaw).abs() < 1e-12);
    }

    #[test]
    fn test_pure_yaw_rotation_recovers_rpy() {
        let yaw = -0.75_f64;
        let quat_wxyz = yaw_to_quat(yaw);
        let mat3 = quat_to_mat3(&quat_wxyz.view());
        let [roll, pitch, recovered_yaw] = mat3_to_rpy(&mat3.view());
        assert!(roll.abs() < 1e-12);
        assert!(pitch.abs() < 1e-12);
        assert!((recovered_yaw - yaw).abs() < 1e-12);
    }
}
