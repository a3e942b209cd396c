//! # constants
//!
//! Common constants used throughout the library.

use strum_macros::{Display, EnumIter, EnumString};

/// Default scene archive served for the sample Pandaset sequence.
pub const DEFAULT_SOURCE_URL: &str =
    "https://storage.googleapis.com/model-mgmt-snapshots/datasets-lidar-pandaset/001.zip";

/// Default sequence name inside the archive.
pub const DEFAULT_SEQUENCE_NAME: &str = "001";

/// Ontology definition shipped next to the scene data.
pub const ONTOLOGY_FILE_NAME: &str = "ontology.json";

/// Frames manifest file name within a staged scene directory.
pub const FRAMES_FILE_NAME: &str = "frames.json";

/// Directory of per-class semantic-segmentation reference files.
pub const SEM_REF_DIR_NAME: &str = "sem_ref";

/// Hidden remote directory semantic reference items are uploaded under.
pub const SEM_REF_REMOTE_DIR: &str = "/.dataloop";

/// Camera names found in a Pandaset sequence.
/// Serialized form matches the sequence directory names (e.g., `front_camera`).
#[derive(Clone, Copy, Debug, Display, EnumIter, EnumString, Eq, Hash, PartialEq)]
#[strum(serialize_all = "snake_case")]
pub enum CameraNames {
    /// Forward-facing wide camera.
    FrontCamera,
    /// Forward-left camera.
    FrontLeftCamera,
    /// Forward-right camera.
    FrontRightCamera,
    /// Left camera.
    LeftCamera,
    /// Right camera.
    RightCamera,
    /// Rear camera.
    BackCamera,
}

#[cfg(test)]
mod tests {
    use super::CameraNames;
    use strum::IntoEnumIterator;

    #[test]
    fn camera_names_serialize_to_directory_names() {
        let names: Vec<_> = CameraNames::iter().map(|x| x.to_string()).collect();
        assert_eq!(names.len(), 6);
        assert!(names.contains(&"front_camera".to_string()));
        assert!(names.contains(&"back_camera".to_string()));
    }
}
