//! # semseg
//!
//! Semantic-segmentation reference files and the class-keyed item index.

use anyhow::{Context, Result};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use crate::io::write_json;
use crate::platform::Item;

/// Per-class semantic reference payload, keyed by class and frame.
/// Written as `<sequence>_<label>.json` under the `sem_ref` directory.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct SemanticReference {
    /// Class label.
    pub label: String,
    /// Point indices belonging to the class, per frame number.
    pub frames: BTreeMap<usize, Vec<usize>>,
}

/// Group per-frame class ids into per-class reference payloads.
///
/// `frames` pairs a frame number with its per-point class ids; `classes` maps
/// a class-id string to its label. Classes absent from the mapping are
/// skipped.
pub fn build_references(
    frames: &[(usize, Vec<u32>)],
    classes: &BTreeMap<String, String>,
) -> Vec<SemanticReference> {
    let mut by_label: BTreeMap<String, BTreeMap<usize, Vec<usize>>> = BTreeMap::new();
    for (frame_number, class_ids) in frames {
        for (point_index, class_id) in class_ids.iter().enumerate() {
            let Some(label) = classes.get(&class_id.to_string()) else {
                continue;
            };
            by_label
                .entry(label.clone())
                .or_default()
                .entry(*frame_number)
                .or_default()
                .push(point_index);
        }
    }
    by_label
        .into_iter()
        .map(|(label, frames)| SemanticReference { label, frames })
        .collect_vec()
}

/// Write reference payloads as `<sequence>_<label>.json` files.
pub fn write_reference_files(
    references: &[SemanticReference],
    sequence_name: &str,
    sem_ref_dir: &Path,
) -> Result<()> {
    std::fs::create_dir_all(sem_ref_dir)
        .with_context(|| format!("Cannot create directory: {sem_ref_dir:?}."))?;
    for reference in references {
        let file_name = format!("{sequence_name}_{}.json", reference.label);
        write_json(&sem_ref_dir.join(file_name), reference)?;
    }
    Ok(())
}

/// Uploaded semantic reference items, keyed by class label.
///
/// The label is everything after the first `_` of the item's file stem
/// (`001_Vegetation.json` keys as `Vegetation`).
#[derive(Clone, Debug, Default)]
pub struct SemanticRefIndex {
    items: HashMap<String, Item>,
}

impl SemanticRefIndex {
    /// Build the index from uploaded items.
    pub fn from_items(items: &[Item]) -> SemanticRefIndex {
        let items = items
            .iter()
            .filter_map(|item| {
                let stem = Path::new(&item.name).file_stem()?.to_str()?;
                let (_, label) = stem.split_once('_')?;
                Some((label.to_string(), item.clone()))
            })
            .collect();
        SemanticRefIndex { items }
    }

    /// Look up the reference item of a class label.
    pub fn get(&self, label: &str) -> Result<&Item> {
        self.items
            .get(label)
            .with_context(|| format!("No semantic reference item for label: {label}."))
    }
}
