//! Configuration for the self-update workflow.
//!
//! Everything the updater needs to know about its environment - which
//! repository releases come from, what the binary is called, which version is
//! running, where downloads are staged - arrives through [`UpdateConfig`] at
//! construction time. Nothing is read from ambient global state, so tests
//! can drive the workflow with fabricated versions and repositories.

use std::path::PathBuf;

use crate::version::BuildVersion;

/// GitHub repository skiff releases are published to.
pub const DEFAULT_REPOSITORY: &str = "skiff-dev/skiff";

/// Injected configuration for a self-update run.
#[derive(Debug, Clone)]
pub struct UpdateConfig {
    /// `owner/name` repository identifier on the hosting service.
    pub repository: String,
    /// Name of the binary entry inside release artifacts (platform-suffixed
    /// on Windows).
    pub bin_name: String,
    /// Version of the running binary, or the source-build sentinel.
    pub current: BuildVersion,
    /// Directory downloads are staged in before install. `None` means a
    /// fresh temporary directory per run, cleaned up automatically.
    pub staging_dir: Option<PathBuf>,
}

impl Default for UpdateConfig {
    /// Configuration for the real skiff binary: the official repository, the
    /// build-stamped version, and a `~/.skiff` staging home (temporary
    /// directory when no home directory exists).
    fn default() -> Self {
        Self {
            repository: DEFAULT_REPOSITORY.to_string(),
            bin_name: format!("skiff{}", std::env::consts::EXE_SUFFIX),
            current: BuildVersion::from_build(),
            staging_dir: dirs::home_dir().map(|home| home.join(".skiff")),
        }
    }
}

impl UpdateConfig {
    /// Create a configuration with the production defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the running version (tests fabricate versions this way).
    #[must_use]
    pub fn with_current(mut self, current: BuildVersion) -> Self {
        self.current = current;
        self
    }

    /// Override the staging directory.
    #[must_use]
    pub fn with_staging_dir(mut self, dir: PathBuf) -> Self {
        self.staging_dir = Some(dir);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = UpdateConfig::default();
        assert_eq!(config.repository, "skiff-dev/skiff");
        assert!(config.bin_name.starts_with("skiff"));
    }

    #[test]
    fn test_builders() {
        let config = UpdateConfig::new()
            .with_current(BuildVersion::FromSource)
            .with_staging_dir(PathBuf::from("/tmp/stage"));
        assert_eq!(config.current, BuildVersion::FromSource);
        assert_eq!(config.staging_dir, Some(PathBuf::from("/tmp/stage")));
    }
}
