//! # cuboids
//!
//! 3D cuboid annotations and the vehicle-to-world transform pipeline.

use ndarray::{arr1, Array, Array2, Ix1};
use serde::{Deserialize, Serialize};

use crate::geometry::polytope::cuboid_to_vertices;
use crate::geometry::se3::SE3;
use crate::geometry::so3::{mat3_to_quat, mat3_to_rpy, quat_to_mat3, yaw_to_quat};
use crate::sequence::{Pose, Vector3};

/// A vehicle-frame cuboid annotation, as stored in `annotations/cuboids/`.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Cuboid {
    /// Track identifier, stable across frames.
    pub uuid: String,
    /// Class label.
    pub label: String,
    /// Box center in the vehicle frame.
    pub position: Vector3,
    /// Full box extents along the box axes.
    pub dimensions: Vector3,
    /// Rotation about the +z axis in radians.
    pub yaw: f64,
    /// Whether the object is static across the sequence.
    #[serde(default)]
    pub stationary: bool,
}

/// A cuboid re-expressed in world coordinates.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct WorldCuboid {
    /// Track identifier, stable across frames.
    pub uuid: String,
    /// Class label.
    pub label: String,
    /// Box center in the world frame.
    pub position: [f64; 3],
    /// Full box extents; invariant under the rigid map.
    pub scale: [f64; 3],
    /// Recovered extrinsic Euler rotation (roll, pitch, yaw).
    pub rotation: [f64; 3],
}

/// Build the world-from-vehicle rigid transform from a pose record.
/// Quaternion to rotation matrix to 4x4 homogeneous transform.
pub fn world_from_vehicle(pose: &Pose) -> SE3 {
    SE3::from_quat_translation(pose.quat_wxyz(), pose.translation_m())
}

impl Cuboid {
    /// Box orientation as a scalar-first quaternion.
    pub fn quat_wxyz(&self) -> Array<f64, Ix1> {
        yaw_to_quat(self.yaw)
    }

    /// The 8 box corners in the cuboid's own reference frame.
    pub fn vertices(&self) -> Array2<f64> {
        let center = arr1(&[self.position.x, self.position.y, self.position.z]);
        let dims = arr1(&[self.dimensions.x, self.dimensions.y, self.dimensions.z]);
        cuboid_to_vertices(&center.view(), &dims.view(), &self.quat_wxyz().view())
    }

    /// Map the cuboid through a rigid transform, recovering the Euler rotation
    /// of the composed orientation.
    pub fn to_world(&self, world_se3_vehicle: &SE3) -> WorldCuboid {
        let position = world_se3_vehicle.transform_point([
            self.position.x,
            self.position.y,
            self.position.z,
        ]);
        let yaw_mat3 = quat_to_mat3(&self.quat_wxyz().view());
        let world_rotation = world_se3_vehicle.rotation.dot(&yaw_mat3);
        let rotation = mat3_to_rpy(&world_rotation.view());
        WorldCuboid {
            uuid: self.uuid.clone(),
            label: self.label.clone(),
            position,
            scale: [self.dimensions.x, self.dimensions.y, self.dimensions.z],
            rotation,
        }
    }

    /// The 8 box corners in world coordinates.
    pub fn world_vertices(&self, world_se3_vehicle: &SE3) -> Array2<f64> {
        let world = self.to_world(world_se3_vehicle);
        let center = arr1(&world.position);
        let dims = arr1(&world.scale);
        let yaw_mat3 = quat_to_mat3(&self.quat_wxyz().view());
        let world_rotation = world_se3_vehicle.rotation.dot(&yaw_mat3);
        let quat_wxyz = mat3_to_quat(&world_rotation.view());
        cuboid_to_vertices(&center.view(), &dims.view(), &quat_wxyz.view())
    }
}

#[cfg(test)]
mod tests {
    use super::{world_from_vehicle, Cuboid};
    use crate::sequence::{Heading, Pose, Vector3};
    use std::f64::consts::FRAC_PI_2;

    fn sample_cuboid() -> Cuboid {
        Cuboid {
            uuid: "7c3b1e1c".to_string(),
            label: "Car".to_string(),
            position: Vector3 {
                x: 10.0,
                y: 0.0,
                z: 1.0,
            },
            dimensions: Vector3 {
                x: 4.0,
                y: 2.0,
                z: 1.5,
            },
            yaw: 0.5,
            stationary: false,
        }
    }

    fn identity_pose() -> Pose {
        Pose {
            position: Vector3 {
                x: 0.0,
                y: 0.0,
                z: 0.0,
            },
            heading: Heading {
                w: 1.0,
                x: 0.0,
                y: 0.0,
                z: 0.0,
            },
        }
    }

    #[test]
    fn test_identity_pose_preserves_yaw() {
        let cuboid = sample_cuboid();
        let world = cuboid.to_world(&world_from_vehicle(&identity_pose()));
        assert_eq!(world.position, [10.0, 0.0, 1.0]);
        assert_eq!(world.scale, [4.0, 2.0, 1.5]);
        assert!(world.rotation[0].abs() < 1e-12);
        assert!(world.rotation[1].abs() < 1e-12);
        assert!((world.rotation[2] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_pose_yaw_composes_with_box_yaw() {
        let cuboid = sample_cuboid();
        let pose = Pose {
            position: Vector3 {
                x: 100.0,
                y: -50.0,
                z: 2.0,
            },
            heading: Heading {
                w: f64::cos(0.5 * FRAC_PI_2),
                x: 0.0,
                y: 0.0,
                z: f64::sin(0.5 * FRAC_PI_2),
            },
        };
        let world = cuboid.to_world(&world_from_vehicle(&pose));

        // Vehicle +x maps to world +y under a 90 degree pose yaw.
        assert!((world.position[0] - 100.0).abs() < 1e-12);
        assert!((world.position[1] - -40.0).abs() < 1e-12);
        assert!((world.position[2] - 3.0).abs() < 1e-12);
        assert!((world.rotation[2] - (0.5 + FRAC_PI_2)).abs() < 1e-12);
    }

    #[test]
    fn test_world_vertices_follow_center() {
        let cuboid = sample_cuboid();
        let se3 = world_from_vehicle(&identity_pose());
        let verts = cuboid.world_vertices(&se3);
        assert_eq!(verts.shape(), [8, 3]);

        let centroid_x = verts.column(0).sum() / 8.0;
        let centroid_y = verts.column(1).sum() / 8.0;
        assert!((centroid_x - 10.0).abs() < 1e-12);
        assert!(centroid_y.abs() < 1e-12);
    }
}
