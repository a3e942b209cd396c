//! # convert_sequence
//!
//! Converts a raw devkit-exported sequence into the staged scene layout
//! (PCD point clouds, camera images, frames manifest, annotations).
//!
//! Usage: `convert_sequence <sequence_dir> <out_dir> [sequence_name]`

use std::env;
use std::path::PathBuf;

use pandaset_import::constants::DEFAULT_SEQUENCE_NAME;
use pandaset_import::convert::stage_scene;
use pandaset_import::sequence::Sequence;

#[macro_use]
extern crate log;

/// Script entrypoint.
pub fn main() {
    env_logger::init();
    let args: Vec<String> = env::args().collect();
    let (Some(sequence_dir), Some(out_dir)) =
        (args.get(1).map(PathBuf::from), args.get(2).map(PathBuf::from))
    else {
        eprintln!("Usage: convert_sequence <sequence_dir> <out_dir> [sequence_name]");
        std::process::exit(2);
    };
    let sequence_name = args
        .get(3)
        .map(String::as_str)
        .unwrap_or(DEFAULT_SEQUENCE_NAME);

    let result = Sequence::open(&sequence_dir)
        .and_then(|sequence| stage_scene(&sequence, sequence_name, &out_dir));
    match result {
        Ok(staged) => info!("Staged scene at {:?}.", staged.scene_dir),
        Err(e) => {
            error!("Conversion failed: {e:#}");
            std::process::exit(1);
        }
    }
}
