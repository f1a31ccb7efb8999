//! Unpacking downloaded release assets.
//!
//! Release artifacts arrive as `.tar.gz`/`.tgz` or `.zip` archives containing
//! the binary, or occasionally as the bare binary itself. This module
//! extracts the named binary entry into a destination directory and returns
//! its path; bare binaries pass through untouched.
//!
//! These are synchronous functions; the workflow runs them under
//! `tokio::task::spawn_blocking`.

use anyhow::{Context, Result};
use std::ffi::OsStr;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::core::SkiffError;

/// Extract the entry named `bin_name` from `archive` into `dest_dir`.
///
/// Returns the path of the extracted binary. When `archive` is not a
/// recognized archive format it is assumed to already be the binary and is
/// returned as-is.
pub fn extract_binary(archive: &Path, bin_name: &str, dest_dir: &Path) -> Result<PathBuf> {
    let name = archive.file_name().unwrap_or_default().to_string_lossy().to_lowercase();

    if name.ends_with(".tar.gz") || name.ends_with(".tgz") {
        extract_tar_gz(archive, bin_name, dest_dir)
    } else if name.ends_with(".zip") {
        extract_zip(archive, bin_name, dest_dir)
    } else {
        debug!("{} is not an archive, using as-is", archive.display());
        Ok(archive.to_path_buf())
    }
}

fn extract_tar_gz(archive: &Path, bin_name: &str, dest_dir: &Path) -> Result<PathBuf> {
    let file = File::open(archive)
        .with_context(|| format!("failed to open archive {}", archive.display()))?;
    let decoder = flate2::read::GzDecoder::new(file);
    let mut tar = tar::Archive::new(decoder);

    for entry in tar.entries().context("failed to read tar archive")? {
        let mut entry = entry.context("corrupt tar entry")?;
        let path = entry.path().context("tar entry has invalid path")?;
        if path.file_name() == Some(OsStr::new(bin_name)) {
            let out = dest_dir.join(bin_name);
            entry
                .unpack(&out)
                .with_context(|| format!("failed to unpack {bin_name} from archive"))?;
            debug!("extracted {bin_name} to {}", out.display());
            return Ok(out);
        }
    }

    Err(SkiffError::InstallFailed {
        reason: format!("archive {} contains no '{bin_name}' entry", archive.display()),
    }
    .into())
}

fn extract_zip(archive: &Path, bin_name: &str, dest_dir: &Path) -> Result<PathBuf> {
    let file = File::open(archive)
        .with_context(|| format!("failed to open archive {}", archive.display()))?;
    let mut zip = zip::ZipArchive::new(file).context("failed to read zip archive")?;

    for index in 0..zip.len() {
        let mut entry = zip.by_index(index).context("corrupt zip entry")?;
        let Some(path) = entry.enclosed_name() else {
            continue;
        };
        if path.file_name() == Some(OsStr::new(bin_name)) {
            let out = dest_dir.join(bin_name);
            let mut outfile = File::create(&out)
                .with_context(|| format!("failed to create {}", out.display()))?;
            std::io::copy(&mut entry, &mut outfile)
                .with_context(|| format!("failed to unpack {bin_name} from archive"))?;
            debug!("extracted {bin_name} to {}", out.display());
            return Ok(out);
        }
    }

    Err(SkiffError::InstallFailed {
        reason: format!("archive {} contains no '{bin_name}' entry", archive.display()),
    }
    .into())
}
