//! # testing
//!
//! Shared fixtures for filesystem-backed tests.

use serde_json::json;
use std::fs;
use std::path::Path;

/// Write a minimal raw sequence with `num_frames` frames: three lidar points
/// per frame, one camera, one cuboid track, and two semantic classes.
pub fn write_sample_sequence(root_dir: &Path, num_frames: usize) {
    let lidar_dir = root_dir.join("lidar");
    fs::create_dir_all(&lidar_dir).unwrap();

    let mut poses = vec![];
    let mut timestamps = vec![];
    for frame in 0..num_frames {
        let csv = "x,y,z,i\n1.0,0.0,0.0,10.0\n0.0,1.0,0.0,20.0\n0.0,0.0,1.0,30.0\n";
        fs::write(lidar_dir.join(format!("{frame:02}.csv")), csv).unwrap();
        poses.push(json!({
            "position": {"x": frame as f64, "y": 0.0, "z": 0.0},
            "heading": {"w": 1.0, "x": 0.0, "y": 0.0, "z": 0.0},
        }));
        timestamps.push(1_600_000_000.0 + frame as f64 * 0.1);
    }
    fs::write(lidar_dir.join("poses.json"), json!(poses).to_string()).unwrap();
    fs::write(
        lidar_dir.join("timestamps.json"),
        json!(timestamps).to_string(),
    )
    .unwrap();

    let camera_dir = root_dir.join("camera").join("front_camera");
    fs::create_dir_all(&camera_dir).unwrap();
    for frame in 0..num_frames {
        let image = image::RgbImage::new(2, 2);
        image.save(camera_dir.join(format!("{frame:02}.jpg"))).unwrap();
    }
    fs::write(camera_dir.join("poses.json"), json!(poses).to_string()).unwrap();
    fs::write(
        camera_dir.join("timestamps.json"),
        json!(timestamps).to_string(),
    )
    .unwrap();
    fs::write(
        camera_dir.join("intrinsics.json"),
        json!({"fx": 1000.0, "fy": 1000.0, "cx": 960.0, "cy": 540.0}).to_string(),
    )
    .unwrap();

    let cuboids_dir = root_dir.join("annotations").join("cuboids");
    fs::create_dir_all(&cuboids_dir).unwrap();
    for frame in 0..num_frames {
        let cuboids = json!([{
            "uuid": "track-1",
            "label": "Car",
            "position": {"x": 5.0 + frame as f64, "y": 0.0, "z": 1.0},
            "dimensions": {"x": 4.0, "y": 2.0, "z": 1.5},
            "yaw": 0.25,
            "stationary": false,
        }]);
        fs::write(
            cuboids_dir.join(format!("{frame:02}.json")),
            cuboids.to_string(),
        )
        .unwrap();
    }

    let semseg_dir = root_dir.join("annotations").join("semseg");
    fs::create_dir_all(&semseg_dir).unwrap();
    for frame in 0..num_frames {
        fs::write(
            semseg_dir.join(format!("{frame:02}.json")),
            json!([1, 2, 1]).to_string(),
        )
        .unwrap();
    }
    fs::write(
        semseg_dir.join("classes.json"),
        json!({"1": "Car", "2": "Road"}).to_string(),
    )
    .unwrap();
}
