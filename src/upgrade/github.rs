//! Release repository client for GitHub-hosted releases.
//!
//! The [`ReleaseSource`] trait is the collaborator boundary the rest of the
//! updater depends on: listing releases, detecting the latest release that
//! applies to a platform, and fetching asset bytes. [`GithubReleases`] is the
//! production implementation speaking the GitHub REST API.
//!
//! All JSON handling happens here: responses are decoded into private DTOs
//! and converted to the typed [`Release`]/[`Asset`] model at this boundary,
//! so nothing downstream ever touches raw metadata.
//!
//! # Failure semantics
//!
//! Transport failures surface verbatim to the caller; this layer never
//! retries, because silent retries could mask rate-limiting or auth failures
//! that the user needs to see.
//!
//! # Examples
//!
//! ```rust,no_run
//! use skiff_cli::upgrade::github::{GithubReleases, ReleaseSource};
//! use skiff_cli::upgrade::release::Platform;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let source = GithubReleases::new("skiff-dev/skiff")?;
//! if let Some(latest) = source.detect_latest(&Platform::current()).await? {
//!     println!("latest release: {}", latest.tag);
//! }
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::core::SkiffError;
use crate::upgrade::release::{Asset, Platform, Release};
use crate::version::VersionComparator;

/// User agent sent with every GitHub API request (the API rejects requests
/// without one).
const USER_AGENT: &str = concat!("skiff/", env!("CARGO_PKG_VERSION"));

/// Abstract source of published releases.
///
/// Implementations perform network I/O only; no local state is mutated.
/// Tests substitute an in-memory implementation with fabricated releases.
#[async_trait]
pub trait ReleaseSource: Send + Sync {
    /// List published releases in the order the hosting service reports them
    /// (newest first on GitHub).
    ///
    /// Draft releases, releases without assets, and releases whose tag does
    /// not parse as a version are skipped, never fatal.
    async fn list_releases(&self) -> Result<Vec<Release>, SkiffError>;

    /// Fetch the raw bytes of an asset.
    async fn fetch_asset(&self, asset: &Asset) -> Result<Vec<u8>, SkiffError>;

    /// The latest stable release carrying an installable asset for
    /// `platform`, or `None` when no compatible release exists.
    ///
    /// `None` is a valid, non-error outcome, distinct from a transport
    /// failure. Pre-releases are never detected as latest; they remain
    /// reachable through [`list_releases`](Self::list_releases). When two
    /// releases share a version, the most recently listed one wins.
    async fn detect_latest(&self, platform: &Platform) -> Result<Option<Release>, SkiffError> {
        let releases = self.list_releases().await?;
        let mut best: Option<Release> = None;

        for release in releases {
            if !release.version.pre.is_empty() {
                debug!("skipping pre-release {}", release.tag);
                continue;
            }
            if !release.has_asset_for(platform) {
                debug!("skipping {} (no asset for {platform})", release.tag);
                continue;
            }
            match &best {
                Some(current)
                    if VersionComparator::greater_than(&current.version, &release.version) => {}
                _ => best = Some(release),
            }
        }

        Ok(best)
    }
}

/// Raw GitHub API release record, decoded at the client boundary only.
#[derive(Debug, Deserialize)]
struct ApiRelease {
    tag_name: String,
    #[serde(default)]
    draft: bool,
    #[serde(default)]
    assets: Vec<ApiAsset>,
}

/// Raw GitHub API asset record.
#[derive(Debug, Deserialize)]
struct ApiAsset {
    name: String,
    browser_download_url: String,
}

/// GitHub-backed [`ReleaseSource`].
///
/// Configured at construction with the `owner/name` repository identifier;
/// nothing is read from ambient global state, so fabricated repositories can
/// be injected in tests.
pub struct GithubReleases {
    client: reqwest::Client,
    repo: String,
    api_base: String,
}

impl GithubReleases {
    /// Create a client for the given `owner/name` repository.
    pub fn new(repo: &str) -> Result<Self, SkiffError> {
        let client = reqwest::Client::builder().user_agent(USER_AGENT).build().map_err(
            |source| SkiffError::NetworkError {
                operation: "construct HTTP client".to_string(),
                source,
            },
        )?;

        Ok(Self {
            client,
            repo: repo.to_string(),
            api_base: "https://api.github.com".to_string(),
        })
    }

    /// Override the API base URL.
    #[must_use]
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    /// Convert raw API records into the typed release model, skipping
    /// entries that cannot be represented.
    fn convert(raw: Vec<ApiRelease>) -> Vec<Release> {
        raw.into_iter()
            .filter_map(|release| {
                if release.draft {
                    debug!("skipping draft release {}", release.tag_name);
                    return None;
                }
                if release.assets.is_empty() {
                    debug!("skipping release {} with no assets", release.tag_name);
                    return None;
                }
                match VersionComparator::parse(&release.tag_name) {
                    Ok(version) => Some(Release {
                        version,
                        tag: release.tag_name,
                        assets: release
                            .assets
                            .into_iter()
                            .map(|asset| Asset {
                                name: asset.name,
                                download_url: asset.browser_download_url,
                            })
                            .collect(),
                    }),
                    Err(_) => {
                        warn!("skipping release with unparsable tag '{}'", release.tag_name);
                        None
                    }
                }
            })
            .collect()
    }

    fn download_bar(total: Option<u64>) -> ProgressBar {
        if std::env::var("SKIFF_NO_PROGRESS").is_ok() {
            return ProgressBar::hidden();
        }
        match total {
            Some(len) => {
                let bar = ProgressBar::new(len);
                bar.set_style(
                    ProgressStyle::default_bar()
                        .template("{prefix:.bold} [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta})")
                        .unwrap()
                        .progress_chars("━╸━"),
                );
                bar
            }
            None => {
                let bar = ProgressBar::new_spinner();
                bar.set_style(
                    ProgressStyle::default_spinner()
                        .template("{prefix:.bold} {spinner:.cyan} {bytes}")
                        .unwrap(),
                );
                bar
            }
        }
    }
}

#[async_trait]
impl ReleaseSource for GithubReleases {
    async fn list_releases(&self) -> Result<Vec<Release>, SkiffError> {
        let url = format!("{}/repos/{}/releases?per_page=100", self.api_base, self.repo);
        debug!("listing releases from {url}");

        let response =
            self.client.get(&url).send().await.map_err(|source| SkiffError::NetworkError {
                operation: format!("list releases for {}", self.repo),
                source,
            })?;

        if !response.status().is_success() {
            return Err(SkiffError::HttpStatus { status: response.status().as_u16(), url });
        }

        let body = response.text().await.map_err(|source| SkiffError::NetworkError {
            operation: format!("read release listing for {}", self.repo),
            source,
        })?;

        let raw: Vec<ApiRelease> = serde_json::from_str(&body)?;
        let releases = Self::convert(raw);
        debug!("decoded {} usable releases", releases.len());
        Ok(releases)
    }

    async fn fetch_asset(&self, asset: &Asset) -> Result<Vec<u8>, SkiffError> {
        debug!("downloading {}", asset.download_url);

        let mut response = self.client.get(&asset.download_url).send().await.map_err(
            |source| SkiffError::NetworkError {
                operation: format!("download {}", asset.name),
                source,
            },
        )?;

        if !response.status().is_success() {
            return Err(SkiffError::HttpStatus {
                status: response.status().as_u16(),
                url: asset.download_url.clone(),
            });
        }

        let total = response.content_length();
        let bar = Self::download_bar(total);
        bar.set_prefix(asset.name.clone());

        let mut bytes = Vec::with_capacity(total.unwrap_or(0) as usize);
        loop {
            let chunk = response.chunk().await.map_err(|source| SkiffError::NetworkError {
                operation: format!("download {}", asset.name),
                source,
            })?;
            match chunk {
                Some(data) => {
                    bytes.extend_from_slice(&data);
                    bar.inc(data.len() as u64);
                }
                None => break,
            }
        }
        bar.finish_and_clear();

        debug!("downloaded {} bytes", bytes.len());
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING: &str = r#"[
        {
            "tag_name": "v0.4.0",
            "draft": false,
            "assets": [
                {"name": "skiff-x86_64-unknown-linux-gnu.tar.gz",
                 "browser_download_url": "https://example.com/v0.4.0/linux.tar.gz"},
                {"name": "skiff-aarch64-apple-darwin.tar.gz",
                 "browser_download_url": "https://example.com/v0.4.0/darwin.tar.gz"}
            ]
        },
        {
            "tag_name": "v0.4.0-rc.1",
            "draft": false,
            "assets": [
                {"name": "skiff-x86_64-unknown-linux-gnu.tar.gz",
                 "browser_download_url": "https://example.com/rc/linux.tar.gz"}
            ]
        },
        {
            "tag_name": "v0.3.9",
            "draft": true,
            "assets": [
                {"name": "skiff-x86_64-unknown-linux-gnu.tar.gz",
                 "browser_download_url": "https://example.com/draft/linux.tar.gz"}
            ]
        },
        {
            "tag_name": "v0.3.8",
            "draft": false,
            "assets": []
        },
        {
            "tag_name": "nightly",
            "draft": false,
            "assets": [
                {"name": "skiff-x86_64-unknown-linux-gnu.tar.gz",
                 "browser_download_url": "https://example.com/nightly/linux.tar.gz"}
            ]
        },
        {
            "tag_name": "v0.3.0",
            "draft": false,
            "assets": [
                {"name": "skiff-x86_64-unknown-linux-gnu.tar.gz",
                 "browser_download_url": "https://example.com/v0.3.0/linux.tar.gz"}
            ]
        }
    ]"#;

    fn decode(listing: &str) -> Vec<Release> {
        let raw: Vec<ApiRelease> = serde_json::from_str(listing).unwrap();
        GithubReleases::convert(raw)
    }

    #[test]
    fn test_decode_skips_unusable_releases() {
        let releases = decode(LISTING);

        // Draft, assetless, and unparsable-tag entries are dropped; the
        // pre-release survives listing (it is filtered later, in detection).
        let tags: Vec<&str> = releases.iter().map(|r| r.tag.as_str()).collect();
        assert_eq!(tags, vec!["v0.4.0", "v0.4.0-rc.1", "v0.3.0"]);
    }

    #[test]
    fn test_decode_preserves_asset_order_and_urls() {
        let releases = decode(LISTING);
        let latest = &releases[0];
        assert_eq!(latest.assets.len(), 2);
        assert_eq!(latest.assets[0].name, "skiff-x86_64-unknown-linux-gnu.tar.gz");
        assert_eq!(latest.assets[0].download_url, "https://example.com/v0.4.0/linux.tar.gz");
    }

    #[test]
    fn test_decode_rejects_invalid_json() {
        let result: Result<Vec<ApiRelease>, _> = serde_json::from_str("{not json");
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_optional_fields_default() {
        let raw: Vec<ApiRelease> =
            serde_json::from_str(r#"[{"tag_name": "v1.0.0"}]"#).unwrap();
        assert!(!raw[0].draft);
        assert!(raw[0].assets.is_empty());
        // ...and the assetless entry is then skipped by conversion.
        assert!(GithubReleases::convert(raw).is_empty());
    }
}
