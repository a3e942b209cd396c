//! # pinhole_camera
//!
//! Pinhole camera model backed by the per-camera calibration files.

use anyhow::{bail, Context, Result};
use ndarray::{Array, Ix2};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::io::read_json;
use crate::sequence::Pose;

/// Pinhole camera intrinsics, as stored in `intrinsics.json`.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
pub struct Intrinsics {
    /// Horizontal focal length in pixels.
    pub fx: f64,
    /// Vertical focal length in pixels.
    pub fy: f64,
    /// Horizontal focal center in pixels.
    pub cx: f64,
    /// Vertical focal center in pixels.
    pub cy: f64,
}

impl Intrinsics {
    /// Camera intrinsic matrix.
    pub fn k(&self) -> Array<f64, Ix2> {
        let mut k = Array::<f64, Ix2>::eye(3);
        k[[0, 0]] = self.fx;
        k[[1, 1]] = self.fy;
        k[[0, 2]] = self.cx;
        k[[1, 2]] = self.cy;
        k
    }
}

/// Parameterizes a pinhole camera with zero skew.
#[derive(Clone, Debug)]
pub struct PinholeCamera {
    /// Associated camera name.
    pub camera_name: String,
    /// `Intrinsics` object containing the intrinsic parameters.
    pub intrinsics: Intrinsics,
    /// World-frame camera pose per frame.
    pub poses: Vec<Pose>,
    /// Per-frame capture timestamps in seconds.
    pub timestamps: Vec<f64>,
}

impl PinholeCamera {
    /// Create a pinhole camera model from the per-camera calibration files.
    /// `camera_root` is the sequence `camera/` directory.
    pub fn from_json(camera_root: &Path, camera_name: &str) -> Result<PinholeCamera> {
        let camera_dir = camera_root.join(camera_name);
        let intrinsics: Intrinsics = read_json(&camera_dir.join("intrinsics.json"))
            .with_context(|| format!("Cannot read intrinsics for camera {camera_name}."))?;
        let poses: Vec<Pose> = read_json(&camera_dir.join("poses.json"))?;
        let timestamps: Vec<f64> = read_json(&camera_dir.join("timestamps.json"))?;
        if poses.len() != timestamps.len() {
            bail!(
                "Camera {camera_name} has {} poses but {} timestamps.",
                poses.len(),
                timestamps.len()
            );
        }

        Ok(Self {
            camera_name: camera_name.to_string(),
            intrinsics,
            poses,
            timestamps,
        })
    }

    /// World-frame pose of the camera at `frame_number`.
    pub fn pose(&self, frame_number: usize) -> Result<&Pose> {
        self.poses
            .get(frame_number)
            .with_context(|| format!("Camera {} has no pose for frame {frame_number}.", self.camera_name))
    }
}
