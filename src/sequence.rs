//! # sequence
//!
//! Reader for a raw devkit-exported Pandaset sequence.

use anyhow::{bail, Context, Result};
use glob::glob;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::cuboids::Cuboid;
use crate::geometry::camera::pinhole_camera::PinholeCamera;
use crate::io::{read_json, read_lidar_csv, LidarPoint};
use crate::path::extract_frame_number;

/// A 3D position in meters.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
pub struct Vector3 {
    /// x-coordinate.
    pub x: f64,
    /// y-coordinate.
    pub y: f64,
    /// z-coordinate.
    pub z: f64,
}

/// A scalar-first unit quaternion.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
pub struct Heading {
    /// Scalar component.
    pub w: f64,
    /// x component.
    pub x: f64,
    /// y component.
    pub y: f64,
    /// z component.
    pub z: f64,
}

/// A world-frame rigid pose record, as stored in `poses.json`.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
pub struct Pose {
    /// Translation component.
    pub position: Vector3,
    /// Rotation component.
    pub heading: Heading,
}

impl Pose {
    /// Pose quaternion as a `[w, x, y, z]` array.
    pub fn quat_wxyz(&self) -> [f64; 4] {
        [self.heading.w, self.heading.x, self.heading.y, self.heading.z]
    }

    /// Pose translation as an `[x, y, z]` array.
    pub fn translation_m(&self) -> [f64; 3] {
        [self.position.x, self.position.y, self.position.z]
    }
}

/// Data associated with a single sequence frame.
#[derive(Clone, Debug)]
pub struct FrameData {
    /// Frame number within the sequence.
    pub frame_number: usize,
    /// Lidar timestamp in seconds.
    pub timestamp: f64,
    /// World-frame vehicle pose at the lidar timestamp.
    pub pose: Pose,
    /// Vehicle-frame lidar returns.
    pub points: Vec<LidarPoint>,
    /// Vehicle-frame cuboid annotations.
    pub cuboids: Vec<Cuboid>,
    /// Per-point semantic class ids. Empty if the sequence has no semseg.
    pub semseg: Vec<u32>,
}

/// Raw sequence reader for a devkit-exported Pandaset scene.
#[derive(Clone, Debug)]
pub struct Sequence {
    /// Root sequence directory.
    pub root_dir: PathBuf,
    /// Sorted frame numbers present in the lidar directory.
    pub frame_numbers: Vec<usize>,
    /// Camera names present in the sequence.
    pub camera_names: Vec<String>,
    /// Per-frame lidar timestamps in seconds.
    pub timestamps: Vec<f64>,
    /// Per-frame world-frame vehicle poses.
    pub poses: Vec<Pose>,
    /// Current index of the frame iterator.
    current_index: usize,
}

impl Sequence {
    /// Open a sequence directory and build the frame index.
    pub fn open(root_dir: &Path) -> Result<Sequence> {
        let lidar_dir = root_dir.join("lidar");
        if !lidar_dir.is_dir() {
            bail!("Not a sequence directory (missing lidar/): {root_dir:?}.");
        }

        let pattern = lidar_dir.join("*.csv");
        let frame_numbers: Vec<_> = glob(pattern.to_str().context("Invalid lidar pattern.")?)?
            .filter_map(|x| x.ok())
            .map(|x| extract_frame_number(&x))
            .collect::<Result<Vec<_>>>()?
            .into_iter()
            .sorted()
            .collect();

        let poses: Vec<Pose> = read_json(&lidar_dir.join("poses.json"))?;
        let timestamps: Vec<f64> = read_json(&lidar_dir.join("timestamps.json"))?;
        if poses.len() != frame_numbers.len() || timestamps.len() != frame_numbers.len() {
            bail!(
                "Frame count mismatch: {} lidar frames, {} poses, {} timestamps.",
                frame_numbers.len(),
                poses.len(),
                timestamps.len()
            );
        }

        let camera_dir = root_dir.join("camera");
        let camera_names = if camera_dir.is_dir() {
            crate::path::walk_dir(&camera_dir)?
                .into_iter()
                .filter(|x| x.is_dir())
                .map(|x| crate::path::extract_file_stem(&x))
                .collect::<Result<Vec<_>>>()?
                .into_iter()
                .sorted()
                .collect()
        } else {
            vec![]
        };

        Ok(Sequence {
            root_dir: root_dir.to_path_buf(),
            frame_numbers,
            camera_names,
            timestamps,
            poses,
            current_index: 0,
        })
    }

    /// Return the number of frames in the sequence.
    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.frame_numbers.len()
    }

    /// Returns `true` if the sequence has no frames.
    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Lidar file path for `frame_number`.
    /// E.g., `<root_dir>/lidar/07.csv`.
    pub fn lidar_path(&self, frame_number: usize) -> PathBuf {
        self.root_dir.join("lidar").join(format!("{frame_number:02}.csv"))
    }

    /// Camera image path for `camera_name` at `frame_number`.
    /// E.g., `<root_dir>/camera/front_camera/07.jpg`.
    pub fn image_path(&self, camera_name: &str, frame_number: usize) -> PathBuf {
        self.root_dir
            .join("camera")
            .join(camera_name)
            .join(format!("{frame_number:02}.jpg"))
    }

    /// Cuboid annotation path for `frame_number`.
    pub fn cuboids_path(&self, frame_number: usize) -> PathBuf {
        self.root_dir
            .join("annotations")
            .join("cuboids")
            .join(format!("{frame_number:02}.json"))
    }

    /// Semantic segmentation path for `frame_number`.
    pub fn semseg_path(&self, frame_number: usize) -> PathBuf {
        self.root_dir
            .join("annotations")
            .join("semseg")
            .join(format!("{frame_number:02}.json"))
    }

    /// Read the lidar returns at `frame_number`.
    pub fn read_lidar(&self, frame_number: usize) -> Result<Vec<LidarPoint>> {
        read_lidar_csv(&self.lidar_path(frame_number))
    }

    /// Read the world-frame vehicle pose at `frame_number`.
    pub fn read_pose(&self, frame_number: usize) -> Result<Pose> {
        let index = self
            .frame_numbers
            .binary_search(&frame_number)
            .ok()
            .with_context(|| format!("Unknown frame number: {frame_number}."))?;
        Ok(self.poses[index])
    }

    /// Read the cuboid annotations at `frame_number`.
    /// Sparse sequences may have frames without annotations.
    pub fn read_cuboids(&self, frame_number: usize) -> Result<Vec<Cuboid>> {
        let path = self.cuboids_path(frame_number);
        if !path.is_file() {
            return Ok(vec![]);
        }
        read_json(&path)
    }

    /// Read the per-point semantic class ids at `frame_number`.
    pub fn read_semseg(&self, frame_number: usize) -> Result<Vec<u32>> {
        let path = self.semseg_path(frame_number);
        if !path.is_file() {
            return Ok(vec![]);
        }
        read_json(&path)
    }

    /// Read the semantic class-id to label mapping.
    pub fn semseg_classes(&self) -> Result<BTreeMap<String, String>> {
        let path = self
            .root_dir
            .join("annotations")
            .join("semseg")
            .join("classes.json");
        if !path.is_file() {
            return Ok(BTreeMap::new());
        }
        read_json(&path)
    }

    /// Load the camera model for `camera_name`.
    pub fn camera(&self, camera_name: &str) -> Result<PinholeCamera> {
        PinholeCamera::from_json(&self.root_dir.join("camera"), camera_name)
    }

    /// Get the frame at `index` within the frame index.
    pub fn get(&self, index: usize) -> Result<FrameData> {
        let frame_number = *self
            .frame_numbers
            .get(index)
            .with_context(|| format!("Frame index out of range: {index}."))?;
        Ok(FrameData {
            frame_number,
            timestamp: self.timestamps[index],
            pose: self.poses[index],
            points: self.read_lidar(frame_number)?,
            cuboids: self.read_cuboids(frame_number)?,
            semseg: self.read_semseg(frame_number)?,
        })
    }
}

impl Iterator for Sequence {
    type Item = Result<FrameData>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.current_index >= self.frame_numbers.len() {
            return None;
        }
        let frame_data = self.get(self.current_index);
        self.current_index += 1;
        Some(frame_data)
    }
}

#[cfg(test)]
mod tests {
    use super::{Heading, Pose, Sequence, Vector3};
    use crate::testing::write_sample_sequence;
    use serde_json::json;
    use std::fs;

    #[test]
    fn test_open_rejects_frame_count_mismatch() {
        let root_dir = tempfile::tempdir().unwrap();
        write_sample_sequence(root_dir.path(), 2);

        // Truncate poses.json to a single pose while two lidar frames remain.
        let poses_path = root_dir.path().join("lidar").join("poses.json");
        let short_poses = json!([{
            "position": {"x": 0.0, "y": 0.0, "z": 0.0},
            "heading": {"w": 1.0, "x": 0.0, "y": 0.0, "z": 0.0},
        }]);
        fs::write(&poses_path, short_poses.to_string()).unwrap();

        let result = Sequence::open(root_dir.path());
        assert!(result.is_err());
        assert!(format!("{:#}", result.unwrap_err()).contains("Frame count mismatch"));
    }

    #[test]
    fn test_read_pose() {
        let root_dir = tempfile::tempdir().unwrap();
        write_sample_sequence(root_dir.path(), 2);

        let sequence = Sequence::open(root_dir.path()).unwrap();
        let pose = sequence.read_pose(1).unwrap();
        assert_eq!(pose.translation_m(), [1.0, 0.0, 0.0]);
        assert!(sequence.read_pose(7).is_err());
    }

    #[test]
    fn test_pose_json_round_trip() {
        let json = r#"{"position":{"x":1.0,"y":2.0,"z":3.0},
                       "heading":{"w":1.0,"x":0.0,"y":0.0,"z":0.0}}"#;
        let pose: Pose = serde_json::from_str(json).unwrap();
        assert_eq!(
            pose,
            Pose {
                position: Vector3 {
                    x: 1.0,
                    y: 2.0,
                    z: 3.0
                },
                heading: Heading {
                    w: 1.0,
                    x: 0.0,
                    y: 0.0,
                    z: 0.0
                },
            }
        );
        assert_eq!(pose.quat_wxyz(), [1.0, 0.0, 0.0, 0.0]);
        assert_eq!(pose.translation_m(), [1.0, 2.0, 3.0]);
    }
}
