//! # polytope
//!
//! Geometric algorithms for cuboid geometries.

use ndarray::{Array, ArrayView, Ix1, Ix2};
use once_cell::sync::Lazy;

use super::so3::quat_to_mat3;

// Safety: 24 elements (8 * 3 = 24) are defined.
static VERTS: Lazy<Array<f64, Ix2>> = Lazy::new(|| unsafe {
    Array::<f64, Ix2>::from_shape_vec_unchecked(
        (8, 3),
        vec![
            1., 1., 1., 1., -1., 1., 1., -1., -1., 1., 1., -1., -1., 1., 1., -1., -1., 1., -1.,
            -1., -1., -1., 1., -1.,
        ],
    )
});

/// Convert a cuboid parameterization to its 8 vertices.
/// `center_xyz` is the box center, `dims_lwh` the full extents along the box
/// axes, and `quat_wxyz` the box orientation (scalar-first).
pub fn cuboid_to_vertices(
    center_xyz: &ArrayView<f64, Ix1>,
    dims_lwh: &ArrayView<f64, Ix1>,
    quat_wxyz: &ArrayView<f64, Ix1>,
) -> Array<f64, Ix2> {
    let mat = quat_to_mat3(quat_wxyz);
    let verts = &VERTS.clone() * dims_lwh / 2.;
    let verts = verts.dot(&mat.t()) + center_xyz;
    verts.as_standard_layout().to_owned()
}
