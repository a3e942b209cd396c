//! # pipeline
//!
//! End-to-end scene import orchestration.

use anyhow::{Context, Result};
use log::{info, warn};
use serde_json::{json, Value};
use std::path::{Path, PathBuf};

use crate::annotations::AnnotationCollection;
use crate::archive;
use crate::constants::{FRAMES_FILE_NAME, ONTOLOGY_FILE_NAME, SEM_REF_DIR_NAME, SEM_REF_REMOTE_DIR};
use crate::frames::FramesManifest;
use crate::io::read_json;
use crate::platform::{Item, Platform, Progress};
use crate::semseg::SemanticRefIndex;

/// Imports a staged scene archive into an annotation platform.
///
/// Every stage is public so a partial import (data only, annotations only)
/// can be run against an already-staged directory.
#[derive(Clone, Debug)]
pub struct SceneImporter {
    /// Scene archive URL.
    pub source_url: String,
    /// Local working directory for the downloaded data.
    pub work_dir: PathBuf,
    /// Sequence name within the archive (e.g., `001`).
    pub sequence_name: String,
    /// Whether to attach semantic-segmentation annotations.
    pub include_semantic: bool,
}

impl SceneImporter {
    /// Create an importer with the default working subdirectory layout.
    pub fn new(source_url: &str, work_dir: &Path, sequence_name: &str) -> SceneImporter {
        SceneImporter {
            source_url: source_url.to_string(),
            work_dir: work_dir.to_path_buf(),
            sequence_name: sequence_name.to_string(),
            include_semantic: false,
        }
    }

    /// Attach semantic-segmentation annotations during import.
    #[must_use]
    pub fn with_semantic(mut self, include_semantic: bool) -> SceneImporter {
        self.include_semantic = include_semantic;
        self
    }

    /// Download and extract the scene archive; returns the data directory.
    pub fn stage<R: Progress>(&self, progress: &R) -> Result<PathBuf> {
        progress.update(10, "Downloading dataset for source...");
        archive::stage(&self.source_url, &self.work_dir.join("data"))
    }

    /// Install the ontology shipped next to the scene data, if present.
    pub fn import_ontology<P: Platform>(&self, platform: &mut P, data_dir: &Path) -> Result<()> {
        let ontology_path = data_dir.join(ONTOLOGY_FILE_NAME);
        if !ontology_path.is_file() {
            warn!("No {ONTOLOGY_FILE_NAME} next to the scene data; keeping the dataset ontology.");
            return Ok(());
        }
        let ontology: Value = read_json(&ontology_path)?;
        platform.set_ontology(ontology)
    }

    /// Upload the scene directory, then patch uploaded item ids into the
    /// frames manifest and re-upload it as the scene's frames item.
    pub fn upload_data<P: Platform, R: Progress>(
        &self,
        platform: &mut P,
        data_dir: &Path,
        progress: &R,
    ) -> Result<Item> {
        progress.update(40, "Uploading source data...");
        let scene_dir = data_dir.join(&self.sequence_name);
        let uploaded = platform.upload_dir(&scene_dir, "/")?;
        info!("Uploaded {} scene items.", uploaded.len());
        progress.update(80, "Uploading source data...");

        let frames_path = format!("/{}/{FRAMES_FILE_NAME}", self.sequence_name);
        let frames_item = platform
            .get_item(&frames_path)
            .context("Scene upload produced no frames manifest item.")?;
        let mut manifest: FramesManifest =
            serde_json::from_slice(&platform.download_item(&frames_item.id)?)
                .context("Malformed frames manifest.")?;
        manifest.patch_item_ids(&platform.list_items())?;

        let bytes = serde_json::to_vec(&manifest)?;
        let metadata = json!({
            "system": {
                "shebang": {
                    "dltype": "PCDFrames"
                }
            },
            "fps": 1,
        });
        platform.upload_bytes(&frames_item.dir, &frames_item.name, bytes, Some(metadata))
    }

    /// Attach the annotation collection to the frames item.
    ///
    /// With semantics included, the `sem_ref` files are uploaded first and
    /// every `ref_semantic_3d` annotation is pointed at its reference item;
    /// otherwise only the `cube3d` annotations are kept.
    pub fn upload_annotations<P: Platform, R: Progress>(
        &self,
        platform: &mut P,
        frames_item: &Item,
        data_dir: &Path,
        progress: &R,
    ) -> Result<()> {
        progress.update(90, "Uploading annotations...");
        let annotations_path = data_dir.join(format!("{}_frames.json", self.sequence_name));
        let mut collection = AnnotationCollection::from_json_file(&annotations_path)?;

        if self.include_semantic {
            let sem_ref_dir = data_dir.join(SEM_REF_DIR_NAME);
            let sem_ref_items = platform.upload_dir(&sem_ref_dir, SEM_REF_REMOTE_DIR)?;
            let index = SemanticRefIndex::from_items(&sem_ref_items);
            collection.attach_semantic_refs(&index)?;
        } else {
            collection.retain_cuboids();
        }

        platform.upload_annotations(&frames_item.id, &collection)
    }

    /// Import the staged data directory: ontology, scene items, annotations.
    pub fn import_staged<P: Platform, R: Progress>(
        &self,
        platform: &mut P,
        data_dir: &Path,
        progress: &R,
    ) -> Result<Item> {
        self.import_ontology(platform, data_dir)?;
        let frames_item = self.upload_data(platform, data_dir, progress)?;
        self.upload_annotations(platform, &frames_item, data_dir, progress)?;
        progress.update(100, "Done.");
        Ok(frames_item)
    }

    /// Run the full pipeline: download, extract, and import.
    pub fn run<P: Platform, R: Progress>(
        &self,
        platform: &mut P,
        progress: &R,
    ) -> Result<Item> {
        let data_dir = self.stage(progress)?;
        self.import_staged(platform, &data_dir, progress)
    }
}
