//! Core self-update orchestration.
//!
//! [`SelfUpdater`] drives one update run end to end: refuse source builds,
//! select the target release, confirm with the user, download and unpack the
//! asset, hand the binary to the installer, and compute the upgrade notices
//! to render. The run is one linear sequence of blocking steps - network
//! fetches and prompts are the only suspension points, and download and
//! install never interleave.
//!
//! The updater is generic over its [`ReleaseSource`] so tests can drive the
//! whole workflow against an in-memory repository.
//!
//! # Examples
//!
//! ```rust,no_run
//! use skiff_cli::upgrade::{SelfUpdater, UpdateOutcome};
//! use skiff_cli::upgrade::config::UpdateConfig;
//! use skiff_cli::upgrade::github::GithubReleases;
//! use skiff_cli::upgrade::prompt::TerminalPrompt;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = UpdateConfig::new();
//! let source = GithubReleases::new(&config.repository)?;
//! let updater = SelfUpdater::new(config, source);
//!
//! match updater.run(&TerminalPrompt).await? {
//!     UpdateOutcome::Installed { version, .. } => println!("updated to {version}"),
//!     UpdateOutcome::UpToDate { current } => println!("{current} is the latest"),
//!     UpdateOutcome::Declined => {}
//! }
//! # Ok(())
//! # }
//! ```

use anyhow::{Context, Result};
use semver::Version;
use std::path::PathBuf;
use tokio::fs;
use tracing::{debug, info};

use crate::upgrade::archive;
use crate::upgrade::config::UpdateConfig;
use crate::upgrade::github::ReleaseSource;
use crate::upgrade::installer::BinaryInstaller;
use crate::upgrade::notices::AnnotationTable;
use crate::upgrade::prompt::UserDecision;
use crate::upgrade::release::{Asset, Platform, Release};
use crate::upgrade::selector::{ReleaseSelector, Selection};
use crate::version::{BuildVersion, VersionComparator};

/// Terminal outcome of an update run.
///
/// All three variants are successes at the process level; failures travel as
/// errors. "Already up to date" and "user declined" are no-ops the caller
/// renders, never error exits.
#[derive(Debug, PartialEq)]
pub enum UpdateOutcome {
    /// A new binary was swapped into place.
    Installed {
        /// Version that was installed.
        version: Version,
        /// Upgrade notices applicable to the crossed version range, in
        /// ascending version order.
        notices: Vec<String>,
    },
    /// The current version is already the newest applicable release.
    UpToDate {
        /// The running version.
        current: Version,
    },
    /// The user declined or cancelled; nothing was touched.
    Declined,
}

/// Orchestrates the self-update workflow.
pub struct SelfUpdater<S> {
    config: UpdateConfig,
    source: S,
    platform: Platform,
    annotations: AnnotationTable,
    target_override: Option<PathBuf>,
}

impl<S: ReleaseSource> SelfUpdater<S> {
    /// Create an updater over `source` with skiff's built-in notice table.
    pub fn new(config: UpdateConfig, source: S) -> Self {
        Self {
            config,
            source,
            platform: Platform::current(),
            annotations: AnnotationTable::builtin(),
            target_override: None,
        }
    }

    /// Override the platform used for asset matching.
    #[must_use]
    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    /// Override the annotation table.
    #[must_use]
    pub fn with_annotations(mut self, annotations: AnnotationTable) -> Self {
        self.annotations = annotations;
        self
    }

    /// Install somewhere other than the running executable (tests install
    /// into scratch directories this way).
    #[must_use]
    pub fn with_target(mut self, target: PathBuf) -> Self {
        self.target_override = Some(target);
        self
    }

    /// The version of the running binary.
    pub fn current_version(&self) -> &BuildVersion {
        &self.config.current
    }

    /// The release source this updater reads from.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Check whether a newer release is available, without installing.
    ///
    /// Fails with `UnsupportedBuild` for source builds; the comparison is
    /// meaningless without a release version.
    pub async fn check_for_update(&self) -> Result<Option<Version>> {
        let current = self.config.current.release()?;
        match self.source.detect_latest(&self.platform).await? {
            Some(latest) if VersionComparator::greater_than(&latest.version, current) => {
                info!("update available: {current} -> {}", latest.version);
                Ok(Some(latest.version))
            }
            _ => {
                debug!("already on latest version");
                Ok(None)
            }
        }
    }

    /// The newest release version published for this platform, regardless of
    /// what is running. Works for source builds too.
    pub async fn latest_available(&self) -> Result<Option<Version>> {
        Ok(self.source.detect_latest(&self.platform).await?.map(|release| release.version))
    }

    /// Automatic mode: update to the latest applicable release.
    ///
    /// Refuses source builds before any network I/O. Asks `prompt` for
    /// confirmation before downloading; declining is a no-op outcome. After a
    /// successful install the applicable upgrade notices are computed for the
    /// crossed version range.
    pub async fn run(&self, prompt: &dyn UserDecision) -> Result<UpdateOutcome> {
        let current = self.config.current.release()?.clone();

        let selector = ReleaseSelector::new(&self.source, self.platform.clone());
        let (release, asset) = match selector.select_latest(&current).await? {
            Selection::UpToDate => return Ok(UpdateOutcome::UpToDate { current }),
            Selection::Cancelled => return Ok(UpdateOutcome::Declined),
            Selection::Target { release, asset } => (release, asset),
        };

        let question = format!(
            "Do you want to update to {}? (current version: {current})",
            release.version
        );
        if !prompt.confirm(&question)? {
            debug!("user declined update to {}", release.version);
            return Ok(UpdateOutcome::Declined);
        }

        self.download_and_install(&release, &asset).await?;

        let notices = self.annotations.applicable(&current, &release.version);
        Ok(UpdateOutcome::Installed { version: release.version, notices })
    }

    /// Interactive mode: the user picks any release (and asset) to install.
    ///
    /// This is the downgrade/reinstall path: no up-to-date check applies and
    /// no upgrade notices are rendered. Source builds are still refused; the
    /// swap target is only meaningful for release installs.
    pub async fn run_interactive(&self, prompt: &dyn UserDecision) -> Result<UpdateOutcome> {
        let current = self.config.current.release()?.clone();

        let selector = ReleaseSelector::new(&self.source, self.platform.clone());
        let (release, asset) = match selector.select_with(prompt).await? {
            Selection::Cancelled => return Ok(UpdateOutcome::Declined),
            Selection::UpToDate => return Ok(UpdateOutcome::UpToDate { current }),
            Selection::Target { release, asset } => (release, asset),
        };

        info!("installing user-selected release {}", release.tag);
        self.download_and_install(&release, &asset).await?;

        Ok(UpdateOutcome::Installed { version: release.version, notices: Vec::new() })
    }

    /// Download the asset, unpack it, and hand the binary to the installer.
    ///
    /// Strictly sequenced: the installer is not touched until the download
    /// and extraction have fully completed.
    async fn download_and_install(&self, release: &Release, asset: &Asset) -> Result<()> {
        debug!("updating to {} via {}", release.tag, asset.name);
        let bytes = self.source.fetch_asset(asset).await?;

        let (staging, guard) = self.staging_dir().await?;
        let archive_path = asset.local_path(&staging);
        fs::write(&archive_path, &bytes)
            .await
            .with_context(|| format!("failed to stage download at {}", archive_path.display()))?;

        let bin_name = self.config.bin_name.clone();
        let dest = staging.clone();
        let archive_file = archive_path.clone();
        let binary = tokio::task::spawn_blocking(move || {
            archive::extract_binary(&archive_file, &bin_name, &dest)
        })
        .await
        .context("extraction task failed")??;

        let target = match &self.target_override {
            Some(path) => path.clone(),
            None => std::env::current_exe().context("could not locate executable path")?,
        };
        BinaryInstaller::new(target).install_file(&binary).await?;

        drop(guard);
        Ok(())
    }

    /// The staging directory for this run: the configured home, or a fresh
    /// temporary directory that lives until the install completes.
    async fn staging_dir(&self) -> Result<(PathBuf, Option<tempfile::TempDir>)> {
        match &self.config.staging_dir {
            Some(dir) => {
                fs::create_dir_all(dir).await.with_context(|| {
                    format!("failed to create staging directory {}", dir.display())
                })?;
                Ok((dir.clone(), None))
            }
            None => {
                let temp = tempfile::tempdir().context("failed to create staging directory")?;
                let path = temp.path().to_path_buf();
                Ok((path, Some(temp)))
            }
        }
    }
}
