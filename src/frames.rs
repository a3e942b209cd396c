//! # frames
//!
//! The `frames.json` scene manifest and uploaded-item id patching.

use anyhow::{Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::geometry::camera::pinhole_camera::Intrinsics;
use crate::path::extract_frame_number;
use crate::platform::Item;
use crate::sequence::{Heading, Vector3};

/// Camera extrinsics attached to a manifest image entry.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
pub struct Extrinsics {
    /// World-frame camera translation.
    pub translation: Vector3,
    /// World-frame camera rotation (scalar-first).
    pub rotation: Heading,
}

/// Plumb-bob distortion coefficients. Zeroed for rectified imagery.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct Distortion {
    /// First radial coefficient.
    pub k1: f64,
    /// Second radial coefficient.
    pub k2: f64,
    /// Third radial coefficient.
    pub k3: f64,
    /// First tangential coefficient.
    pub p1: f64,
    /// Second tangential coefficient.
    pub p2: f64,
}

/// Reference to the lidar point cloud of a frame.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct LidarRef {
    /// Platform item id, filled in after upload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lidar_pcd_id: Option<String>,
    /// Remote path of the PCD file within the dataset.
    pub remote_path: String,
}

/// Reference to a camera image of a frame.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct ImageRef {
    /// Platform item id, filled in after upload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_id: Option<String>,
    /// Remote path of the image within the dataset.
    pub remote_path: String,
    /// Capture timestamp in seconds.
    pub timestamp: f64,
    /// World-frame camera pose.
    pub extrinsics: Extrinsics,
    /// Camera intrinsics.
    pub intrinsics: Intrinsics,
    /// Lens distortion coefficients.
    #[serde(default)]
    pub distortion: Distortion,
}

/// A single manifest frame.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct FrameEntry {
    /// Lidar reference.
    pub lidar: LidarRef,
    /// Lidar timestamp in seconds.
    pub timestamp: f64,
    /// Synchronized camera images.
    pub images: Vec<ImageRef>,
}

/// The `frames.json` manifest of a staged scene.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct FramesManifest {
    /// Per-frame entries, indexed by frame number.
    pub frames: Vec<FrameEntry>,
}

impl FramesManifest {
    /// Fill item ids into the manifest from the uploaded platform items.
    ///
    /// PCD items are matched by the frame number in their file stem; image
    /// items are matched by remote path. Items of any other mimetype are
    /// skipped, as are images with no manifest entry.
    pub fn patch_item_ids(&mut self, items: &[Item]) -> Result<()> {
        for item in items {
            if item.mimetype.contains("pcd") {
                let frame_number = extract_frame_number(Path::new(&item.name))?;
                let entry = self
                    .frames
                    .get_mut(frame_number)
                    .with_context(|| format!("No manifest frame {frame_number} for {}.", item.name))?;
                entry.lidar.lidar_pcd_id = Some(item.id.clone());
            } else if item.mimetype.contains("image") {
                let filename = item.filename();
                let mut matched = false;
                for entry in &mut self.frames {
                    for image in &mut entry.images {
                        if image.remote_path == filename {
                            image.image_id = Some(item.id.clone());
                            matched = true;
                        }
                    }
                }
                if !matched {
                    warn!("No manifest image entry for uploaded item {filename}.");
                }
            }
        }
        Ok(())
    }
}
