//! # path
//!
//! File path traversal utilities.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use std::path::PathBuf;

/// Walk a directory and filter invalid paths.
pub fn walk_dir(dir: &Path) -> Result<Vec<PathBuf>> {
    let files: Vec<_> = fs::read_dir(dir)
        .with_context(|| format!("Cannot walk directory: {dir:?}."))?
        .filter_map(|x| x.ok())
        .map(|x| x.path())
        .collect();
    Ok(files)
}

/// Extract the file stem from a path.
pub fn extract_file_stem(path: &Path) -> Result<String> {
    let file_stem = path
        .file_stem()
        .context("Cannot parse file stem.")?
        .to_str()
        .context("Cannot convert file stem to string.")?
        .to_string();
    Ok(file_stem)
}

/// Parse the frame number encoded in a per-frame file name (e.g., `07.pcd`).
pub fn extract_frame_number(path: &Path) -> Result<usize> {
    let stem = extract_file_stem(path)?;
    stem.parse::<usize>()
        .with_context(|| format!("File stem is not a frame number: {stem}."))
}

#[cfg(test)]
mod tests {
    use super::extract_frame_number;
    use std::path::Path;

    #[test]
    fn frame_number_from_zero_padded_stem() {
        let frame = extract_frame_number(Path::new("/data/001/lidar/07.pcd")).unwrap();
        assert_eq!(frame, 7);
    }

    #[test]
    fn frame_number_rejects_non_numeric_stem() {
        assert!(extract_frame_number(Path::new("/data/001/frames.json")).is_err());
    }
}
