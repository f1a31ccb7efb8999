//! Atomic, crash-safe replacement of the running executable.
//!
//! The installer stages the new binary next to the target (same filesystem,
//! so the final rename is atomic), verifies the staged copy, carries over the
//! original file's permissions, and only then swaps it into place. Every
//! failure before the swap removes the staged file and leaves the original
//! executable untouched; a failed update must never leave the system without
//! a runnable binary.
//!
//! The swap itself is the single non-interruptible critical section: once the
//! rename begins, any observer sees either the fully-old or the fully-new
//! file, never a partial mix.
//!
//! On Windows the running image cannot be unlinked, so the swap first moves
//! the live executable aside to `<target>.old` and renames the new binary
//! into place; the process keeps executing the old in-memory image until
//! restarted. Stale `.old` files from earlier updates are swept
//! opportunistically.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

use crate::core::SkiffError;

/// Installs a new binary over the executable at a fixed target path.
pub struct BinaryInstaller {
    target: PathBuf,
}

impl BinaryInstaller {
    /// Create an installer for the executable at `target`.
    pub fn new(target: PathBuf) -> Self {
        Self { target }
    }

    /// The path being replaced.
    pub fn target(&self) -> &Path {
        &self.target
    }

    /// Path the new binary is staged at before the swap.
    pub fn staged_path(&self) -> PathBuf {
        let mut name = self.target.file_name().unwrap_or_default().to_os_string();
        name.push(".new");
        self.target.with_file_name(name)
    }

    #[cfg(windows)]
    fn displaced_path(&self) -> PathBuf {
        let mut name = self.target.file_name().unwrap_or_default().to_os_string();
        name.push(".old");
        self.target.with_file_name(name)
    }

    /// Replace the target executable with `bytes`.
    ///
    /// Refuses empty input. On any error the original executable is intact
    /// and the staged file has been removed.
    pub async fn install(&self, bytes: &[u8]) -> Result<()> {
        if bytes.is_empty() {
            return Err(SkiffError::InstallFailed {
                reason: "refusing to install an empty binary".to_string(),
            }
            .into());
        }

        self.sweep_stale().await;

        let staged = self.staged_path();
        if let Err(error) = self.stage(bytes, &staged).await {
            let _ = fs::remove_file(&staged).await;
            return Err(error);
        }

        if let Err(error) = self.swap(&staged).await {
            let _ = fs::remove_file(&staged).await;
            return Err(error);
        }

        info!("installed {} bytes to {}", bytes.len(), self.target.display());
        Ok(())
    }

    /// Convenience wrapper: read `source` and install its bytes.
    pub async fn install_file(&self, source: &Path) -> Result<()> {
        let bytes = fs::read(source)
            .await
            .with_context(|| format!("failed to read staged binary {}", source.display()))?;
        self.install(&bytes).await
    }

    /// Remove leftovers from interrupted or previous installs. Best effort;
    /// a locked `.old` on Windows is expected while the old image runs.
    async fn sweep_stale(&self) {
        let _ = fs::remove_file(self.staged_path()).await;
        #[cfg(windows)]
        {
            let _ = fs::remove_file(self.displaced_path()).await;
        }
    }

    /// Write and verify the staged copy. Only the staged file is touched.
    async fn stage(&self, bytes: &[u8], staged: &Path) -> Result<()> {
        debug!("staging new binary at {}", staged.display());

        fs::write(staged, bytes).await.map_err(|error| self.classify(error, staged))?;

        // Read back the metadata: the staged file must be present, readable,
        // and carry every byte before we commit to the swap.
        let metadata = fs::metadata(staged)
            .await
            .with_context(|| format!("staged binary {} is not readable", staged.display()))?;
        if metadata.len() != bytes.len() as u64 {
            return Err(SkiffError::InstallFailed {
                reason: format!(
                    "staged binary is truncated ({} of {} bytes)",
                    metadata.len(),
                    bytes.len()
                ),
            }
            .into());
        }

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;

            // Carry over the original executable's mode; default to rwxr-xr-x
            // when installing to a fresh path.
            let mode = match fs::metadata(&self.target).await {
                Ok(original) => original.permissions().mode(),
                Err(_) => 0o755,
            };
            fs::set_permissions(staged, std::fs::Permissions::from_mode(mode))
                .await
                .with_context(|| {
                    format!("failed to set permissions on {}", staged.display())
                })?;
        }

        Ok(())
    }

    /// The atomic swap. The rename either completes or leaves the original
    /// file as the sole survivor; no partial writes reach the target path.
    async fn swap(&self, staged: &Path) -> Result<()> {
        #[cfg(windows)]
        if fs::metadata(&self.target).await.is_ok() {
            // The running image cannot be overwritten in place; move it aside
            // so the new binary loads on next start.
            fs::rename(&self.target, self.displaced_path())
                .await
                .map_err(|error| self.classify(error, &self.target))?;
        }

        fs::rename(staged, &self.target)
            .await
            .map_err(|error| self.classify(error, &self.target))
    }

    fn classify(&self, error: std::io::Error, path: &Path) -> anyhow::Error {
        if error.kind() == std::io::ErrorKind::PermissionDenied {
            SkiffError::PermissionDenied { path: path.display().to_string() }.into()
        } else {
            anyhow::Error::from(SkiffError::IoError(error))
                .context(format!("failed to write {}", path.display()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[cfg(unix)]
    fn mode_of(path: &Path) -> u32 {
        use std::os::unix::fs::PermissionsExt;
        std::fs::metadata(path).unwrap().permissions().mode() & 0o777
    }

    #[tokio::test]
    async fn test_swap_round_trip() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("skiff");
        tokio::fs::write(&target, b"old binary").await.unwrap();

        let installer = BinaryInstaller::new(target.clone());
        installer.install(b"new binary bytes").await.unwrap();

        let installed = tokio::fs::read(&target).await.unwrap();
        assert_eq!(installed, b"new binary bytes");
        assert!(!installer.staged_path().exists());
    }

    #[tokio::test]
    async fn test_install_to_fresh_path() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("skiff");

        let installer = BinaryInstaller::new(target.clone());
        installer.install(b"#!/bin/sh\n").await.unwrap();

        assert!(target.exists());
        #[cfg(unix)]
        assert_eq!(mode_of(&target), 0o755);
    }

    #[tokio::test]
    async fn test_empty_input_refused_and_original_intact() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("skiff");
        tokio::fs::write(&target, b"old binary").await.unwrap();

        let installer = BinaryInstaller::new(target.clone());
        let err = installer.install(b"").await.unwrap_err();
        assert!(err.to_string().contains("empty"));

        assert_eq!(tokio::fs::read(&target).await.unwrap(), b"old binary");
    }

    #[tokio::test]
    async fn test_staging_failure_leaves_original_untouched() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("skiff");
        tokio::fs::write(&target, b"old binary").await.unwrap();

        #[cfg(unix)]
        let original_mode = mode_of(&target);

        // Occupy the staging path with a directory so the staged write fails.
        let installer = BinaryInstaller::new(target.clone());
        tokio::fs::create_dir(installer.staged_path()).await.unwrap();

        let result = installer.install(b"new binary").await;
        assert!(result.is_err());

        assert_eq!(tokio::fs::read(&target).await.unwrap(), b"old binary");
        #[cfg(unix)]
        assert_eq!(mode_of(&target), original_mode);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_permissions_carried_over() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        let target = temp.path().join("skiff");
        tokio::fs::write(&target, b"old binary").await.unwrap();
        tokio::fs::set_permissions(&target, std::fs::Permissions::from_mode(0o751))
            .await
            .unwrap();

        let installer = BinaryInstaller::new(target.clone());
        installer.install(b"new binary").await.unwrap();

        assert_eq!(mode_of(&target), 0o751);
    }

    #[tokio::test]
    async fn test_install_file_reads_source() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("unpacked");
        let target = temp.path().join("skiff");
        tokio::fs::write(&source, b"unpacked binary").await.unwrap();

        let installer = BinaryInstaller::new(target.clone());
        installer.install_file(&source).await.unwrap();

        assert_eq!(tokio::fs::read(&target).await.unwrap(), b"unpacked binary");
    }

    #[tokio::test]
    async fn test_stale_staged_file_swept() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("skiff");
        tokio::fs::write(&target, b"old binary").await.unwrap();

        let installer = BinaryInstaller::new(target.clone());
        tokio::fs::write(installer.staged_path(), b"leftover from a crash").await.unwrap();

        installer.install(b"new binary").await.unwrap();
        assert_eq!(tokio::fs::read(&target).await.unwrap(), b"new binary");
        assert!(!installer.staged_path().exists());
    }
}
