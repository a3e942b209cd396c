//! # annotations
//!
//! The annotation collection attached to a staged scene.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::path::Path;

use crate::cuboids::WorldCuboid;
use crate::io::read_json;
use crate::semseg::SemanticRefIndex;

/// Annotation type of a 3D bounding box.
pub const CUBE_3D: &str = "cube3d";

/// Annotation type of a semantic-segmentation reference.
pub const REF_SEMANTIC_3D: &str = "ref_semantic_3d";

/// A single annotation entry.
/// Coordinates are kept as opaque JSON so unknown platform fields survive a
/// load-modify-upload cycle.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Annotation {
    /// Annotation type (e.g., `cube3d`).
    #[serde(rename = "type")]
    pub kind: String,
    /// Class label.
    pub label: String,
    /// Type-specific coordinate payload.
    #[serde(default)]
    pub coordinates: Value,
    /// Platform metadata (frame ranges, snapshots).
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub metadata: Value,
}

/// An ordered collection of annotations for one frames item.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct AnnotationCollection {
    /// The annotations.
    pub annotations: Vec<Annotation>,
}

impl AnnotationCollection {
    /// Load a collection from a JSON file.
    pub fn from_json_file(path: &Path) -> Result<AnnotationCollection> {
        read_json(path)
    }

    /// Drop every annotation that is not a 3D cuboid.
    pub fn retain_cuboids(&mut self) {
        self.annotations.retain(|x| x.kind == CUBE_3D);
    }

    /// Point every `ref_semantic_3d` annotation at its uploaded reference item.
    pub fn attach_semantic_refs(&mut self, index: &SemanticRefIndex) -> Result<()> {
        for annotation in &mut self.annotations {
            if annotation.kind == REF_SEMANTIC_3D {
                let item = index.get(&annotation.label)?;
                annotation.coordinates["ref"] = Value::String(item.id.clone());
            }
        }
        Ok(())
    }
}

/// Coordinate payload of a world-frame cuboid.
pub fn cube3d_coordinates(cuboid: &WorldCuboid) -> Value {
    json!({
        "position": {
            "x": cuboid.position[0],
            "y": cuboid.position[1],
            "z": cuboid.position[2],
        },
        "scale": {
            "x": cuboid.scale[0],
            "y": cuboid.scale[1],
            "z": cuboid.scale[2],
        },
        "rotation": {
            "x": cuboid.rotation[0],
            "y": cuboid.rotation[1],
            "z": cuboid.rotation[2],
        },
    })
}

/// Build a `cube3d` annotation for one track.
/// `snapshots` holds the later per-frame coordinate payloads of the track.
pub fn cube3d_annotation(
    label: &str,
    first_frame: usize,
    last_frame: usize,
    coordinates: Value,
    snapshots: Vec<Value>,
) -> Annotation {
    Annotation {
        kind: CUBE_3D.to_string(),
        label: label.to_string(),
        coordinates,
        metadata: json!({
            "system": {
                "frame": first_frame,
                "endFrame": last_frame,
                "snapshots_": snapshots,
            }
        }),
    }
}

/// Build a `ref_semantic_3d` annotation for one semantic class.
/// The `ref` field is attached after the reference items are uploaded.
pub fn ref_semantic_annotation(label: &str) -> Annotation {
    Annotation {
        kind: REF_SEMANTIC_3D.to_string(),
        label: label.to_string(),
        coordinates: json!({
            "interpolation": "none",
            "mode": "overwrite",
        }),
        metadata: Value::Null,
    }
}

#[cfg(test)]
mod tests {
    use super::{
        cube3d_annotation, ref_semantic_annotation, AnnotationCollection, CUBE_3D,
        REF_SEMANTIC_3D,
    };
    use crate::platform::Item;
    use crate::semseg::SemanticRefIndex;
    use serde_json::json;

    fn sample_collection() -> AnnotationCollection {
        AnnotationCollection {
            annotations: vec![
                cube3d_annotation("Car", 0, 1, json!({"position": {}}), vec![]),
                ref_semantic_annotation("Vegetation"),
            ],
        }
    }

    #[test]
    fn test_retain_cuboids_drops_semantic() {
        let mut collection = sample_collection();
        collection.retain_cuboids();
        assert_eq!(collection.annotations.len(), 1);
        assert_eq!(collection.annotations[0].kind, CUBE_3D);
    }

    #[test]
    fn test_attach_semantic_refs() {
        let mut collection = sample_collection();
        let index = SemanticRefIndex::from_items(&[Item {
            id: "ref-7".to_string(),
            name: "001_Vegetation.json".to_string(),
            dir: "/.dataloop".to_string(),
            mimetype: "application/json".to_string(),
        }]);
        collection.attach_semantic_refs(&index).unwrap();

        let semantic = collection
            .annotations
            .iter()
            .find(|x| x.kind == REF_SEMANTIC_3D)
            .unwrap();
        assert_eq!(semantic.coordinates["ref"], json!("ref-7"));
    }

    #[test]
    fn test_attach_semantic_refs_unknown_label_fails() {
        let mut collection = sample_collection();
        let index = SemanticRefIndex::from_items(&[]);
        assert!(collection.attach_semantic_refs(&index).is_err());
    }

    #[test]
    fn test_collection_json_round_trip() {
        let collection = sample_collection();
        let json = serde_json::to_string(&collection).unwrap();
        let parsed: AnnotationCollection = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, collection);
    }
}
