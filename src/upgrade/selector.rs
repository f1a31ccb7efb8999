//! Release selection: resolving "which release, which asset" for an update.
//!
//! Two modes share one output contract, [`Selection`]:
//!
//! - *Automatic* ([`ReleaseSelector::select_latest`]) resolves the latest
//!   applicable release for the platform, short-circuiting to
//!   [`Selection::UpToDate`] when the current version is already current.
//! - *Interactive* ([`ReleaseSelector::select_with`]) lets the user pick an
//!   arbitrary release and, when a release carries several artifacts, the
//!   exact asset to install. Cancelling is a no-op outcome, never an error.

use anyhow::Result;
use semver::Version;
use tracing::debug;

use crate::core::SkiffError;
use crate::upgrade::github::ReleaseSource;
use crate::upgrade::prompt::UserDecision;
use crate::upgrade::release::{Asset, Platform, Release};
use crate::version::VersionComparator;

/// Terminal result of release selection.
#[derive(Debug, Clone, PartialEq)]
pub enum Selection {
    /// The current version is already the newest applicable release.
    UpToDate,
    /// The user cancelled a selection prompt; nothing to do.
    Cancelled,
    /// A concrete release and asset to download and install.
    Target {
        /// The chosen release.
        release: Release,
        /// The asset to install from that release.
        asset: Asset,
    },
}

/// Resolves releases against the running platform and current version.
pub struct ReleaseSelector<'a, S: ReleaseSource + ?Sized> {
    source: &'a S,
    platform: Platform,
}

impl<'a, S: ReleaseSource + ?Sized> ReleaseSelector<'a, S> {
    /// Create a selector over `source` for `platform`.
    pub fn new(source: &'a S, platform: Platform) -> Self {
        Self { source, platform }
    }

    /// Automatic mode: resolve the latest applicable release.
    ///
    /// Fails with [`SkiffError::NoCompatibleRelease`] when no release exists
    /// for the platform. Returns [`Selection::UpToDate`] when `current` is
    /// greater than or equal to the latest release; that is a terminal no-op
    /// outcome for the caller to render, not a failure.
    pub async fn select_latest(&self, current: &Version) -> Result<Selection> {
        let Some(latest) = self.source.detect_latest(&self.platform).await? else {
            return Err(SkiffError::NoCompatibleRelease {
                os: self.platform.os.clone(),
                arch: self.platform.arch.clone(),
            }
            .into());
        };

        if VersionComparator::less_or_equal(&latest.version, current) {
            debug!("current version {current} >= latest {}", latest.version);
            return Ok(Selection::UpToDate);
        }

        let asset = latest.installable_asset(&self.platform)?.clone();
        Ok(Selection::Target { release: latest, asset })
    }

    /// Interactive mode: let the user pick a release, then an asset.
    ///
    /// Every listed release is offered, pre-releases and older versions
    /// included; this is the deliberate downgrade/reinstall path, so no
    /// up-to-date check applies. All of the chosen release's assets are
    /// candidates with the platform match preselected, since the user may
    /// intentionally direct-install a specific file.
    pub async fn select_with(&self, prompt: &dyn UserDecision) -> Result<Selection> {
        let releases = self.source.list_releases().await?;
        if releases.is_empty() {
            return Err(SkiffError::NoCompatibleRelease {
                os: self.platform.os.clone(),
                arch: self.platform.arch.clone(),
            }
            .into());
        }

        let tags: Vec<String> = releases.iter().map(|release| release.tag.clone()).collect();
        let Some(index) = prompt.choose_one("Choose a release to install", &tags, 0)? else {
            return Ok(Selection::Cancelled);
        };
        let release = releases[index].clone();

        let asset = match self.choose_asset(&release, prompt)? {
            Some(asset) => asset,
            None => return Ok(Selection::Cancelled),
        };

        Ok(Selection::Target { release, asset })
    }

    fn choose_asset(
        &self,
        release: &Release,
        prompt: &dyn UserDecision,
    ) -> Result<Option<Asset>> {
        if release.assets.len() == 1 {
            return Ok(Some(release.assets[0].clone()));
        }

        let default = release
            .assets
            .iter()
            .position(|asset| {
                asset.is_installable() && self.platform.matches_asset_name(&asset.name)
            })
            .unwrap_or(0);

        let names: Vec<String> = release.assets.iter().map(|asset| asset.name.clone()).collect();
        let Some(choice) = prompt.choose_one("Choose an asset to install", &names, default)?
        else {
            return Ok(None);
        };
        Ok(Some(release.assets[choice].clone()))
    }
}
