//! # pandaset-import
//!
//! Pandaset LiDAR scene import library.
//!
//! Stages a downloaded scene archive, converts raw devkit-exported sequences
//! into the annotation-platform scene layout (PCD point clouds, camera
//! images, `frames.json`), and attaches 3D cuboid and semantic-segmentation
//! annotations with vehicle-to-world coordinate transforms.

#![warn(missing_docs)]

pub mod annotations;
pub mod archive;
pub mod constants;
pub mod convert;
pub mod cuboids;
pub mod frames;
pub mod geometry;
pub mod io;
pub mod path;
pub mod pipeline;
pub mod platform;
pub mod semseg;
pub mod sequence;

#[cfg(test)]
mod testing;
