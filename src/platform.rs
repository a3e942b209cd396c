//! # platform
//!
//! The annotation-platform surface the pipeline uploads through.
//!
//! The real SaaS object model is out of scope; the pipeline only needs the
//! seam below. [`MemoryPlatform`] backs tests and offline runs.

use anyhow::{bail, Context, Result};
use glob::glob;
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;

use crate::annotations::AnnotationCollection;

/// A platform item: one uploaded file.
#[derive(Clone, Debug, PartialEq)]
pub struct Item {
    /// Platform-assigned item id.
    pub id: String,
    /// File name (e.g., `00.pcd`).
    pub name: String,
    /// Remote directory (e.g., `/001`).
    pub dir: String,
    /// Mimetype guessed from the file extension.
    pub mimetype: String,
}

impl Item {
    /// Full remote path of the item.
    pub fn filename(&self) -> String {
        format!("{}/{}", self.dir.trim_end_matches('/'), self.name)
    }
}

/// Reports coarse pipeline progress. Implementations must be cheap; updates
/// arrive at most once per percent step.
pub trait Progress {
    /// Record a progress milestone.
    fn update(&self, percent: u8, message: &str);
}

/// Progress sink that drops every update.
pub struct NoProgress;

impl Progress for NoProgress {
    fn update(&self, _percent: u8, _message: &str) {}
}

/// The upload surface of the annotation platform.
pub trait Platform {
    /// Replace the dataset ontology with the given definition.
    fn set_ontology(&mut self, ontology: Value) -> Result<()>;

    /// Upload a local directory. The directory name becomes a remote
    /// directory under `remote_root`; returns the created items.
    fn upload_dir(&mut self, local_dir: &Path, remote_root: &str) -> Result<Vec<Item>>;

    /// Upload raw bytes as an item, overwriting any item at the same path.
    fn upload_bytes(
        &mut self,
        remote_dir: &str,
        name: &str,
        bytes: Vec<u8>,
        metadata: Option<Value>,
    ) -> Result<Item>;

    /// Get the item at a remote path.
    fn get_item(&self, remote_path: &str) -> Result<Item>;

    /// Download the bytes of an item.
    fn download_item(&self, item_id: &str) -> Result<Vec<u8>>;

    /// List every item in the dataset.
    fn list_items(&self) -> Vec<Item>;

    /// Attach an annotation collection to an item.
    fn upload_annotations(&mut self, item_id: &str, collection: &AnnotationCollection)
        -> Result<()>;
}

/// Guess an item mimetype from its file extension.
fn guess_mimetype(name: &str) -> String {
    match Path::new(name)
        .extension()
        .and_then(|x| x.to_str())
        .unwrap_or_default()
    {
        "pcd" => "application/pcd".to_string(),
        "jpg" | "jpeg" => "image/jpeg".to_string(),
        "png" => "image/png".to_string(),
        "json" => "application/json".to_string(),
        _ => "application/octet-stream".to_string(),
    }
}

/// In-memory platform implementation with sequential item ids.
#[derive(Debug, Default)]
pub struct MemoryPlatform {
    next_id: usize,
    items: Vec<Item>,
    contents: HashMap<String, Vec<u8>>,
    metadata: HashMap<String, Value>,
    annotations: HashMap<String, AnnotationCollection>,
    ontology: Option<Value>,
}

impl MemoryPlatform {
    /// Create an empty platform.
    pub fn new() -> MemoryPlatform {
        MemoryPlatform::default()
    }

    /// The installed ontology, if one has been set.
    pub fn ontology(&self) -> Option<&Value> {
        self.ontology.as_ref()
    }

    /// Item metadata recorded at upload time.
    pub fn item_metadata(&self, item_id: &str) -> Option<&Value> {
        self.metadata.get(item_id)
    }

    /// The annotation collection attached to an item.
    pub fn item_annotations(&self, item_id: &str) -> Option<&AnnotationCollection> {
        self.annotations.get(item_id)
    }

    fn insert(&mut self, dir: String, name: String, bytes: Vec<u8>) -> Item {
        let mimetype = guess_mimetype(&name);
        let filename = format!("{}/{}", dir.trim_end_matches('/'), name);
        if let Some(existing) = self
            .items
            .iter()
            .find(|x| x.filename() == filename)
            .cloned()
        {
            self.contents.insert(existing.id.clone(), bytes);
            return existing;
        }

        self.next_id += 1;
        let item = Item {
            id: format!("item-{}", self.next_id),
            name,
            dir,
            mimetype,
        };
        self.contents.insert(item.id.clone(), bytes);
        self.items.push(item.clone());
        item
    }
}

impl Platform for MemoryPlatform {
    fn set_ontology(&mut self, ontology: Value) -> Result<()> {
        self.ontology = Some(ontology);
        Ok(())
    }

    fn upload_dir(&mut self, local_dir: &Path, remote_root: &str) -> Result<Vec<Item>> {
        if !local_dir.is_dir() {
            bail!("Not a directory: {local_dir:?}.");
        }
        let dir_name = crate::path::extract_file_stem(local_dir)?;
        let pattern = local_dir.join("**/*");
        let mut uploaded = vec![];
        for path in glob(pattern.to_str().context("Invalid upload pattern.")?)?
            .filter_map(|x| x.ok())
            .filter(|x| x.is_file())
        {
            let relative = path
                .strip_prefix(local_dir)
                .context("Upload path escaped the local directory.")?;
            let name = relative
                .file_name()
                .context("Upload path has no file name.")?
                .to_str()
                .context("Non-UTF8 file name.")?
                .to_string();
            let sub_dir = relative
                .parent()
                .filter(|x| !x.as_os_str().is_empty())
                .map(|x| format!("/{}", x.display()))
                .unwrap_or_default();
            let dir = format!("{}/{dir_name}{sub_dir}", remote_root.trim_end_matches('/'));
            let bytes = std::fs::read(&path)?;
            uploaded.push(self.insert(dir, name, bytes));
        }
        Ok(uploaded)
    }

    fn upload_bytes(
        &mut self,
        remote_dir: &str,
        name: &str,
        bytes: Vec<u8>,
        metadata: Option<Value>,
    ) -> Result<Item> {
        let item = self.insert(remote_dir.to_string(), name.to_string(), bytes);
        if let Some(metadata) = metadata {
            self.metadata.insert(item.id.clone(), metadata);
        }
        Ok(item)
    }

    fn get_item(&self, remote_path: &str) -> Result<Item> {
        self.items
            .iter()
            .find(|x| x.filename() == remote_path)
            .cloned()
            .with_context(|| format!("No item at remote path: {remote_path}."))
    }

    fn download_item(&self, item_id: &str) -> Result<Vec<u8>> {
        self.contents
            .get(item_id)
            .cloned()
            .with_context(|| format!("No item with id: {item_id}."))
    }

    fn list_items(&self) -> Vec<Item> {
        self.items.clone()
    }

    fn upload_annotations(
        &mut self,
        item_id: &str,
        collection: &AnnotationCollection,
    ) -> Result<()> {
        if !self.contents.contains_key(item_id) {
            bail!("No item with id: {item_id}.");
        }
        self.annotations.insert(item_id.to_string(), collection.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{MemoryPlatform, Platform};
    use std::fs;

    #[test]
    fn test_upload_dir_assigns_paths_and_mimetypes() {
        let dir = tempfile::tempdir().unwrap();
        let scene = dir.path().join("001");
        fs::create_dir_all(scene.join("front_camera")).unwrap();
        fs::write(scene.join("00.pcd"), b"pcd").unwrap();
        fs::write(scene.join("front_camera/00.jpg"), b"jpg").unwrap();

        let mut platform = MemoryPlatform::new();
        let items = platform.upload_dir(&scene, "/").unwrap();
        assert_eq!(items.len(), 2);

        let pcd = platform.get_item("/001/00.pcd").unwrap();
        assert_eq!(pcd.mimetype, "application/pcd");
        let jpg = platform.get_item("/001/front_camera/00.jpg").unwrap();
        assert_eq!(jpg.mimetype, "image/jpeg");
    }

    #[test]
    fn test_upload_bytes_overwrite_keeps_id() {
        let mut platform = MemoryPlatform::new();
        let first = platform
            .upload_bytes("/001", "frames.json", b"one".to_vec(), None)
            .unwrap();
        let second = platform
            .upload_bytes("/001", "frames.json", b"two".to_vec(), None)
            .unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(platform.download_item(&first.id).unwrap(), b"two".to_vec());
        assert_eq!(platform.list_items().len(), 1);
    }
}
