//! # SE(3)
//!
//! Special Euclidean Group 3.

use ndarray::{s, Array, Array1, Array2, ArrayView2, Ix1};

use super::so3::quat_to_mat3;

/// Special Euclidean Group 3.
/// Rigid transformation parameterized by a rotation and translation in $R^3$.
#[derive(Clone, Debug)]
pub struct SE3 {
    /// (3,3) Orthonormal rotation matrix.
    pub rotation: Array2<f64>,
    /// (3,) Translation vector.
    pub translation: Array1<f64>,
}

impl SE3 {
    /// Build an SE(3) from a scalar-first quaternion and a translation.
    pub fn from_quat_translation(quat_wxyz: [f64; 4], translation_m: [f64; 3]) -> Self {
        let quat_wxyz = Array::<f64, Ix1>::from_vec(quat_wxyz.to_vec());
        let rotation = quat_to_mat3(&quat_wxyz.view());
        let translation = Array::<f64, Ix1>::from_vec(translation_m.to_vec());
        Self {
            rotation,
            translation,
        }
    }

    /// Get the (4,4) homogeneous transformation matrix associated with the rigid transformation.
    pub fn transform_matrix(&self) -> Array2<f64> {
        let mut transform_matrix = Array2::eye(4);
        transform_matrix
            .slice_mut(s![..3, ..3])
            .assign(&self.rotation);
        transform_matrix
            .slice_mut(s![..3, 3])
            .assign(&self.translation);
        transform_matrix
    }

    /// Transform the point set from its reference frame to the SE(3) destination.
    pub fn transform_from(&self, points: &ArrayView2<f64>) -> Array2<f64> {
        points.dot(&self.rotation.t()) + &self.translation
    }

    /// Transform a single point from its reference frame to the SE(3) destination.
    pub fn transform_point(&self, point: [f64; 3]) -> [f64; 3] {
        let point = Array::<f64, Ix1>::from_vec(point.to_vec());
        let mapped = self.rotation.dot(&point) + &self.translation;
        [mapped[0], mapped[1], mapped[2]]
    }

    /// Invert the SE(3) transformation.
    pub fn inverse(&self) -> SE3 {
        let rotation = self.rotation.t().as_standard_layout().to_owned();
        let translation = rotation.dot(&(-&self.translation));
        Self {
            rotation,
            translation,
        }
    }

    /// Compose (right multiply) an SE(3) with another SE(3).
    pub fn compose(&self, right_se3: &SE3) -> SE3 {
        let chained_transform_matrix = self.transform_matrix().dot(&right_se3.transform_matrix());
        SE3 {
            rotation: chained_transform_matrix
                .slice(s![..3, ..3])
                .as_standard_layout()
                .to_owned(),
            translation: chained_transform_matrix
                .slice(s![..3, 3])
                .as_standard_layout()
                .to_owned(),
        }
    }
}
