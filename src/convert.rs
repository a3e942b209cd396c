//! # convert
//!
//! Convert a raw devkit-exported sequence into the staged scene layout.

use anyhow::{Context, Result};
use itertools::Itertools;
use log::{debug, info, warn};
use rayon::prelude::*;
use serde_json::json;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::annotations::{
    cube3d_annotation, cube3d_coordinates, ref_semantic_annotation, Annotation,
    AnnotationCollection,
};
use crate::constants::{CameraNames, FRAMES_FILE_NAME, SEM_REF_DIR_NAME};
use crate::cuboids::{world_from_vehicle, WorldCuboid};
use crate::frames::{Extrinsics, FrameEntry, FramesManifest, ImageRef, LidarRef};
use crate::io::{write_json, write_pcd};
use crate::semseg::{build_references, write_reference_files};
use crate::sequence::Sequence;

/// Paths produced by staging a sequence.
#[derive(Clone, Debug)]
pub struct StagedScene {
    /// Scene directory holding PCD files, images, and `frames.json`.
    pub scene_dir: PathBuf,
    /// The frames manifest path.
    pub frames_path: PathBuf,
    /// The annotation collection path (`<sequence>_frames.json`).
    pub annotations_path: PathBuf,
    /// Per-class semantic reference directory, if the sequence has semseg.
    pub sem_ref_dir: Option<PathBuf>,
}

/// Stage a raw sequence under `out_dir` in the platform scene layout.
pub fn stage_scene(sequence: &Sequence, sequence_name: &str, out_dir: &Path) -> Result<StagedScene> {
    let scene_dir = out_dir.join(sequence_name);
    fs::create_dir_all(&scene_dir)
        .with_context(|| format!("Cannot create directory: {scene_dir:?}."))?;

    write_point_clouds(sequence, &scene_dir)?;
    let images = stage_images(sequence, sequence_name, &scene_dir)?;
    let manifest = build_manifest(sequence, sequence_name, images)?;
    let frames_path = scene_dir.join(FRAMES_FILE_NAME);
    write_json(&frames_path, &manifest)?;

    let collection = build_annotations(sequence)?;
    let annotations_path = out_dir.join(format!("{sequence_name}_frames.json"));
    write_json(&annotations_path, &collection)?;

    let sem_ref_dir = write_semantic_references(sequence, sequence_name, out_dir)?;
    info!(
        "Staged {} frames of sequence {sequence_name} under {out_dir:?}.",
        sequence.len()
    );
    Ok(StagedScene {
        scene_dir,
        frames_path,
        annotations_path,
        sem_ref_dir,
    })
}

/// Convert every lidar frame to an ASCII PCD file.
fn write_point_clouds(sequence: &Sequence, scene_dir: &Path) -> Result<()> {
    sequence
        .frame_numbers
        .par_iter()
        .map(|&frame_number| {
            let points = sequence.read_lidar(frame_number)?;
            let pcd_path = scene_dir.join(format!("{frame_number:02}.pcd"));
            debug!("Writing {} points to {pcd_path:?}.", points.len());
            write_pcd(&pcd_path, &points)
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(())
}

/// Copy camera JPEGs into the scene directory and build the per-frame image
/// references. Each JPEG header is decoded as a sanity check on the archive.
fn stage_images(
    sequence: &Sequence,
    sequence_name: &str,
    scene_dir: &Path,
) -> Result<Vec<Vec<ImageRef>>> {
    let mut images: Vec<Vec<ImageRef>> = vec![vec![]; sequence.len()];
    for camera_name in &sequence.camera_names {
        if CameraNames::from_str(camera_name).is_err() {
            warn!("Camera {camera_name} is not a known Pandaset camera.");
        }
        let camera = sequence.camera(camera_name)?;
        let camera_dir = scene_dir.join(camera_name);
        fs::create_dir_all(&camera_dir)
            .with_context(|| format!("Cannot create directory: {camera_dir:?}."))?;

        for (index, &frame_number) in sequence.frame_numbers.iter().enumerate() {
            let src = sequence.image_path(camera_name, frame_number);
            image::image_dimensions(&src)
                .with_context(|| format!("Corrupt camera image: {src:?}."))?;
            let file_name = format!("{frame_number:02}.jpg");
            fs::copy(&src, camera_dir.join(&file_name))
                .with_context(|| format!("Cannot copy image: {src:?}."))?;

            let pose = camera.pose(index)?;
            images[index].push(ImageRef {
                image_id: None,
                remote_path: format!("/{sequence_name}/{camera_name}/{file_name}"),
                timestamp: camera.timestamps[index],
                extrinsics: Extrinsics {
                    translation: pose.position,
                    rotation: pose.heading,
                },
                intrinsics: camera.intrinsics,
                distortion: Default::default(),
            });
        }
    }
    Ok(images)
}

/// Build the frames manifest with unpatched item ids.
fn build_manifest(
    sequence: &Sequence,
    sequence_name: &str,
    images: Vec<Vec<ImageRef>>,
) -> Result<FramesManifest> {
    let frames = sequence
        .frame_numbers
        .iter()
        .enumerate()
        .zip(images)
        .map(|((index, &frame_number), images)| FrameEntry {
            lidar: LidarRef {
                lidar_pcd_id: None,
                remote_path: format!("/{sequence_name}/{frame_number:02}.pcd"),
            },
            timestamp: sequence.timestamps[index],
            images,
        })
        .collect_vec();
    Ok(FramesManifest { frames })
}

/// Build the annotation collection: one `cube3d` annotation per cuboid track
/// with world-frame per-frame snapshots, and one `ref_semantic_3d` annotation
/// per semantic class.
fn build_annotations(sequence: &Sequence) -> Result<AnnotationCollection> {
    // Track uuid -> (label, frame index -> world cuboid).
    let mut tracks: BTreeMap<String, (String, BTreeMap<usize, WorldCuboid>)> = BTreeMap::new();
    for (index, &frame_number) in sequence.frame_numbers.iter().enumerate() {
        let world_se3_vehicle = world_from_vehicle(&sequence.read_pose(frame_number)?);
        for cuboid in sequence.read_cuboids(frame_number)? {
            let world = cuboid.to_world(&world_se3_vehicle);
            tracks
                .entry(cuboid.uuid.clone())
                .or_insert_with(|| (cuboid.label.clone(), BTreeMap::new()))
                .1
                .insert(index, world);
        }
    }

    let mut annotations: Vec<Annotation> = tracks
        .into_values()
        .map(|(label, frames)| {
            let first_frame = *frames.keys().next().expect("Track has at least one frame.");
            let last_frame = *frames.keys().last().expect("Track has at least one frame.");
            let mut coordinates = None;
            let mut snapshots = vec![];
            for (frame, world) in &frames {
                let data = cube3d_coordinates(world);
                if coordinates.is_none() {
                    coordinates = Some(data);
                } else {
                    snapshots.push(json!({"frame": frame, "data": data}));
                }
            }
            cube3d_annotation(
                &label,
                first_frame,
                last_frame,
                coordinates.expect("Track has at least one frame."),
                snapshots,
            )
        })
        .collect();

    let classes = sequence.semseg_classes()?;
    let labels: Vec<_> = classes.values().sorted().dedup().cloned().collect();
    annotations.extend(labels.iter().map(|label| ref_semantic_annotation(label)));

    Ok(AnnotationCollection { annotations })
}

/// Write per-class semantic reference files, keyed by class and frame.
fn write_semantic_references(
    sequence: &Sequence,
    sequence_name: &str,
    out_dir: &Path,
) -> Result<Option<PathBuf>> {
    let classes = sequence.semseg_classes()?;
    if classes.is_empty() {
        return Ok(None);
    }

    let mut frames = vec![];
    for (index, &frame_number) in sequence.frame_numbers.iter().enumerate() {
        let class_ids = sequence.read_semseg(frame_number)?;
        if !class_ids.is_empty() {
            frames.push((index, class_ids));
        }
    }
    let references = build_references(&frames, &classes);
    let sem_ref_dir = out_dir.join(SEM_REF_DIR_NAME);
    write_reference_files(&references, sequence_name, &sem_ref_dir)?;
    Ok(Some(sem_ref_dir))
}

#[cfg(test)]
mod tests {
    use super::stage_scene;
    use crate::annotations::{CUBE_3D, REF_SEMANTIC_3D};
    use crate::io::read_pcd;
    use crate::sequence::Sequence;
    use crate::testing::write_sample_sequence;
    use serde_json::Value;

    #[test]
    fn test_stage_scene_layout() {
        let raw_dir = tempfile::tempdir().unwrap();
        let out_dir = tempfile::tempdir().unwrap();
        write_sample_sequence(raw_dir.path(), 2);

        let sequence = Sequence::open(raw_dir.path()).unwrap();
        let staged = stage_scene(&sequence, "001", out_dir.path()).unwrap();

        assert!(staged.scene_dir.join("00.pcd").is_file());
        assert!(staged.scene_dir.join("01.pcd").is_file());
        assert!(staged.scene_dir.join("front_camera/00.jpg").is_file());
        assert!(staged.frames_path.is_file());
        assert!(staged.annotations_path.is_file());
        assert!(staged.sem_ref_dir.as_ref().unwrap().join("001_Car.json").is_file());

        let points = read_pcd(&staged.scene_dir.join("00.pcd")).unwrap();
        assert_eq!(points.len(), 3);
    }

    #[test]
    fn test_stage_scene_annotations() {
        let raw_dir = tempfile::tempdir().unwrap();
        let out_dir = tempfile::tempdir().unwrap();
        write_sample_sequence(raw_dir.path(), 2);

        let sequence = Sequence::open(raw_dir.path()).unwrap();
        let staged = stage_scene(&sequence, "001", out_dir.path()).unwrap();
        let collection: Value =
            serde_json::from_slice(&std::fs::read(&staged.annotations_path).unwrap()).unwrap();
        let annotations = collection["annotations"].as_array().unwrap();

        let cubes: Vec<_> = annotations
            .iter()
            .filter(|x| x["type"] == CUBE_3D)
            .collect();
        assert_eq!(cubes.len(), 1);
        // A track spanning both frames carries one snapshot beyond its first.
        assert_eq!(cubes[0]["metadata"]["system"]["frame"], 0);
        assert_eq!(cubes[0]["metadata"]["system"]["endFrame"], 1);
        assert_eq!(
            cubes[0]["metadata"]["system"]["snapshots_"]
                .as_array()
                .unwrap()
                .len(),
            1
        );

        let refs: Vec<_> = annotations
            .iter()
            .filter(|x| x["type"] == REF_SEMANTIC_3D)
            .collect();
        assert_eq!(refs.len(), 2);
    }
}
