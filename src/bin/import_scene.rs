//! # import_scene
//!
//! Downloads a Pandaset scene archive and imports it into an in-memory
//! platform: scene items, patched frames manifest, and annotations.
//!
//! Usage: `import_scene <work_dir> [source_url] [--semantic]`

use std::env;
use std::path::PathBuf;

use indicatif::ProgressBar;
use pandaset_import::constants::{DEFAULT_SEQUENCE_NAME, DEFAULT_SOURCE_URL};
use pandaset_import::pipeline::SceneImporter;
use pandaset_import::platform::{MemoryPlatform, Platform, Progress};

#[macro_use]
extern crate log;

/// Progress milestones rendered as an indicatif bar.
struct BarProgress(ProgressBar);

impl Progress for BarProgress {
    fn update(&self, percent: u8, message: &str) {
        self.0.set_position(u64::from(percent));
        self.0.set_message(message.to_string());
    }
}

/// Script entrypoint.
pub fn main() {
    env_logger::init();
    let args: Vec<String> = env::args().collect();
    let Some(work_dir) = args.get(1).map(PathBuf::from) else {
        eprintln!("Usage: import_scene <work_dir> [source_url] [--semantic]");
        std::process::exit(2);
    };
    let include_semantic = args.iter().any(|x| x == "--semantic");
    let source_url = args
        .iter()
        .skip(2)
        .find(|x| !x.starts_with("--"))
        .map(String::as_str)
        .unwrap_or(DEFAULT_SOURCE_URL);

    let importer = SceneImporter::new(source_url, &work_dir, DEFAULT_SEQUENCE_NAME)
        .with_semantic(include_semantic);
    let mut platform = MemoryPlatform::new();
    let progress = BarProgress(ProgressBar::new(100));

    match importer.run(&mut platform, &progress) {
        Ok(frames_item) => {
            progress.0.finish_with_message("Done.");
            info!(
                "Imported scene: frames item {} with {} dataset items.",
                frames_item.id,
                platform.list_items().len()
            );
        }
        Err(e) => {
            progress.0.abandon();
            error!("Import failed: {e:#}");
            std::process::exit(1);
        }
    }
}
