//! # io
//!
//! Reading and writing operations.

use anyhow::{bail, Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// A single lidar return in the vehicle frame.
#[derive(Clone, Copy, Debug, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct LidarPoint {
    /// x-coordinate in meters.
    pub x: f64,
    /// y-coordinate in meters.
    pub y: f64,
    /// z-coordinate in meters.
    pub z: f64,
    /// Return intensity.
    pub i: f64,
}

/// Read a JSON file and deserialize it.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let file = File::open(path).with_context(|| format!("Cannot open JSON file: {path:?}."))?;
    let value = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Malformed JSON file: {path:?}."))?;
    Ok(value)
}

/// Serialize a value and write it as JSON.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let file = File::create(path).with_context(|| format!("Cannot create file: {path:?}."))?;
    serde_json::to_writer(BufWriter::new(file), value)
        .with_context(|| format!("Cannot write JSON file: {path:?}."))?;
    Ok(())
}

/// Read lidar returns from a devkit-exported CSV file with an `x,y,z,i` header.
pub fn read_lidar_csv(path: &Path) -> Result<Vec<LidarPoint>> {
    let file = File::open(path).with_context(|| format!("Cannot open lidar file: {path:?}."))?;
    let mut reader = csv::Reader::from_reader(BufReader::new(file));
    let points = reader
        .deserialize()
        .collect::<Result<Vec<LidarPoint>, _>>()
        .with_context(|| format!("Malformed lidar CSV file: {path:?}."))?;
    Ok(points)
}

/// Write a point cloud as an ASCII PCD v0.7 file with `x y z i` fields.
pub fn write_pcd(path: &Path, points: &[LidarPoint]) -> Result<()> {
    let file = File::create(path).with_context(|| format!("Cannot create file: {path:?}."))?;
    let mut writer = BufWriter::new(file);
    writeln!(writer, "# .PCD v0.7 - Point Cloud Data file format")?;
    writeln!(writer, "VERSION 0.7")?;
    writeln!(writer, "FIELDS x y z i")?;
    writeln!(writer, "SIZE 4 4 4 4")?;
    writeln!(writer, "TYPE F F F F")?;
    writeln!(writer, "COUNT 1 1 1 1")?;
    writeln!(writer, "WIDTH {}", points.len())?;
    writeln!(writer, "HEIGHT 1")?;
    writeln!(writer, "VIEWPOINT 0 0 0 1 0 0 0")?;
    writeln!(writer, "POINTS {}", points.len())?;
    writeln!(writer, "DATA ascii")?;
    for point in points {
        writeln!(writer, "{} {} {} {}", point.x, point.y, point.z, point.i)?;
    }
    Ok(())
}

/// Read an ASCII PCD file written by [`write_pcd`].
pub fn read_pcd(path: &Path) -> Result<Vec<LidarPoint>> {
    let file = File::open(path).with_context(|| format!("Cannot open PCD file: {path:?}."))?;
    let reader = BufReader::new(file);
    let mut in_data = false;
    let mut points = vec![];
    for line in reader.lines() {
        let line = line?;
        if in_data {
            let fields: Vec<f64> = line
                .split_whitespace()
                .map(|x| x.parse::<f64>())
                .collect::<Result<_, _>>()
                .with_context(|| format!("Malformed PCD data row: {line}."))?;
            if fields.len() != 4 {
                bail!("Expected 4 fields per PCD row, found {}.", fields.len());
            }
            points.push(LidarPoint {
                x: fields[0],
                y: fields[1],
                z: fields[2],
                i: fields[3],
            });
        } else if line.starts_with("DATA") {
            if line != "DATA ascii" {
                bail!("Unsupported PCD data encoding: {line}.");
            }
            in_data = true;
        }
    }
    Ok(points)
}

#[cfg(test)]
mod tests {
    use super::{read_lidar_csv, read_pcd, write_pcd, LidarPoint};
    use std::io::Write;

    fn sample_points() -> Vec<LidarPoint> {
        vec![
            LidarPoint {
                x: 1.0,
                y: -2.5,
                z: 0.25,
                i: 17.0,
            },
            LidarPoint {
                x: 0.0,
                y: 0.0,
                z: 0.0,
                i: 0.0,
            },
        ]
    }

    #[test]
    fn test_pcd_write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("00.pcd");
        let points = sample_points();
        write_pcd(&path, &points).unwrap();
        assert_eq!(read_pcd(&path).unwrap(), points);
    }

    #[test]
    fn test_lidar_csv_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("00.csv");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "x,y,z,i").unwrap();
        writeln!(file, "1.0,-2.5,0.25,17.0").unwrap();
        writeln!(file, "0.0,0.0,0.0,0.0").unwrap();
        drop(file);

        assert_eq!(read_lidar_csv(&path).unwrap(), sample_points());
    }
}
