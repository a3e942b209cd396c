//! # archive
//!
//! Scene archive download and extraction.

use anyhow::{bail, Context, Result};
use log::info;
use std::fs::{self, File};
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};

/// Download the archive at `url` into `dest_dir` and return its path.
pub fn download(url: &str, dest_dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(dest_dir)
        .with_context(|| format!("Cannot create directory: {dest_dir:?}."))?;
    let file_name = url
        .rsplit('/')
        .next()
        .filter(|x| !x.is_empty())
        .context("Cannot derive an archive name from the source URL.")?;
    let zip_path = dest_dir.join(file_name);

    let response = ureq::get(url)
        .call()
        .with_context(|| format!("Error downloading data: {url}."))?;
    let file = File::create(&zip_path)
        .with_context(|| format!("Cannot create file: {zip_path:?}."))?;
    io::copy(&mut response.into_reader(), &mut BufWriter::new(file))
        .with_context(|| format!("Error writing archive: {zip_path:?}."))?;
    info!("Downloaded {url} to {zip_path:?}.");
    Ok(zip_path)
}

/// Extract a `.zip` archive next to itself, delete it, and return the
/// directory its contents landed in.
pub fn extract(zip_path: &Path) -> Result<PathBuf> {
    if !zip_path.is_file() || zip_path.extension().and_then(|x| x.to_str()) != Some("zip") {
        bail!("Not a valid zip file: {zip_path:?}.");
    }
    let dest_dir = zip_path
        .parent()
        .context("Archive path has no parent directory.")?
        .to_path_buf();

    let file = File::open(zip_path).with_context(|| format!("Cannot open: {zip_path:?}."))?;
    let mut zip = zip::ZipArchive::new(file)
        .with_context(|| format!("Malformed zip archive: {zip_path:?}."))?;
    for i in 0..zip.len() {
        let mut entry = zip.by_index(i)?;
        let Some(relative_path) = entry.enclosed_name().map(Path::to_path_buf) else {
            continue;
        };
        let out_path = dest_dir.join(relative_path);
        if entry.is_dir() {
            fs::create_dir_all(&out_path)?;
            continue;
        }
        if let Some(parent) = out_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut out_file = File::create(&out_path)
            .with_context(|| format!("Cannot create file: {out_path:?}."))?;
        io::copy(&mut entry, &mut out_file)?;
    }
    info!("Extracted contents of {zip_path:?} to the same directory.");

    fs::remove_file(zip_path).with_context(|| format!("Cannot remove: {zip_path:?}."))?;
    Ok(dest_dir)
}

/// Download and extract a scene archive; returns the data directory.
pub fn stage(url: &str, work_dir: &Path) -> Result<PathBuf> {
    let zip_path = download(url, work_dir)?;
    extract(&zip_path)
}
