//! Typed release metadata and platform asset matching.
//!
//! [`Release`] and [`Asset`] are the immutable records the rest of the
//! updater works with; they are produced by the repository client's decode
//! step and never persisted. [`Platform`] identifies the running OS and
//! architecture and owns the asset-name matching rules.
//!
//! Asset selection is deliberately strict: exactly one installable asset may
//! match the running platform. Zero matches or several matches fail
//! explicitly rather than guessing which artifact to install.

use semver::Version;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::core::SkiffError;

/// One published, versioned distribution of the tool.
#[derive(Debug, Clone, PartialEq)]
pub struct Release {
    /// Parsed semantic version of the release.
    pub version: Version,
    /// The raw tag used by the hosting service (e.g. `v0.3.2`).
    pub tag: String,
    /// Downloadable artifacts attached to the release, in service order.
    pub assets: Vec<Asset>,
}

impl Release {
    /// Resolve the single installable asset for `platform`.
    ///
    /// Enforces the exactly-one-match invariant: zero matches yields
    /// [`SkiffError::AssetNotFound`], more than one yields
    /// [`SkiffError::AssetAmbiguous`].
    pub fn installable_asset(&self, platform: &Platform) -> Result<&Asset, SkiffError> {
        let matches: Vec<&Asset> = self
            .assets
            .iter()
            .filter(|asset| asset.is_installable() && platform.matches_asset_name(&asset.name))
            .collect();

        match matches.len() {
            1 => Ok(matches[0]),
            0 => Err(SkiffError::AssetNotFound {
                tag: self.tag.clone(),
                os: platform.os.clone(),
                arch: platform.arch.clone(),
            }),
            count => {
                debug!(
                    "ambiguous assets for {}: {:?}",
                    self.tag,
                    matches.iter().map(|a| &a.name).collect::<Vec<_>>()
                );
                Err(SkiffError::AssetAmbiguous {
                    tag: self.tag.clone(),
                    count,
                    os: platform.os.clone(),
                    arch: platform.arch.clone(),
                })
            }
        }
    }

    /// Whether the release carries an unambiguous installable asset for
    /// `platform`.
    pub fn has_asset_for(&self, platform: &Platform) -> bool {
        self.installable_asset(platform).is_ok()
    }
}

/// One downloadable artifact belonging to a [`Release`].
#[derive(Debug, Clone, PartialEq)]
pub struct Asset {
    /// Platform-encoded file name (e.g. `skiff-x86_64-unknown-linux-gnu.tar.gz`).
    pub name: String,
    /// Location to fetch the artifact bytes from.
    pub download_url: String,
}

/// Companion-file suffixes that are never installable binaries.
const NON_BINARY_SUFFIXES: &[&str] =
    &[".sha256", ".sha256sum", ".sig", ".asc", ".txt", ".json", ".sbom", ".md5", ".pem"];

impl Asset {
    /// Where this asset lands on disk once downloaded into `home`.
    ///
    /// The location is derived from the staging home and the asset name; it
    /// is not an intrinsic property of the asset.
    pub fn local_path(&self, home: &Path) -> PathBuf {
        home.join(&self.name)
    }

    /// Whether this asset is a candidate binary artifact at all.
    ///
    /// Checksum, signature, and manifest companion files share the platform
    /// tokens of the binary they describe and must be excluded before
    /// matching.
    pub fn is_installable(&self) -> bool {
        let lower = self.name.to_lowercase();
        !NON_BINARY_SUFFIXES.iter().any(|suffix| lower.ends_with(suffix))
    }
}

/// The running operating system and CPU architecture.
///
/// Used only to match asset names; all other platform behavior lives behind
/// the installer's swap contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Platform {
    /// Operating system identifier (`std::env::consts::OS` vocabulary).
    pub os: String,
    /// Architecture identifier (`std::env::consts::ARCH` vocabulary).
    pub arch: String,
}

impl Platform {
    /// The platform of the running process.
    pub fn current() -> Self {
        Self {
            os: std::env::consts::OS.to_string(),
            arch: std::env::consts::ARCH.to_string(),
        }
    }

    /// Whether an asset file name encodes this platform.
    ///
    /// A name matches when it contains one of the OS spellings *and* one of
    /// the architecture spellings release pipelines commonly use. Matching is
    /// case-insensitive.
    pub fn matches_asset_name(&self, name: &str) -> bool {
        let lower = name.to_lowercase();
        let os_match = self.os_tokens().iter().any(|token| lower.contains(token));
        let arch_match = self.arch_tokens().iter().any(|token| lower.contains(token));
        os_match && arch_match
    }

    fn os_tokens(&self) -> &'static [&'static str] {
        match self.os.as_str() {
            "linux" => &["linux"],
            "macos" => &["darwin", "macos", "apple"],
            "windows" => &["windows", "win32", "win64"],
            _ => &[],
        }
    }

    fn arch_tokens(&self) -> &'static [&'static str] {
        match self.arch.as_str() {
            "x86_64" => &["x86_64", "amd64"],
            "aarch64" => &["aarch64", "arm64"],
            "arm" => &["armv7", "arm-"],
            _ => &[],
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.os, self.arch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn linux_x86() -> Platform {
        Platform { os: "linux".to_string(), arch: "x86_64".to_string() }
    }

    fn asset(name: &str) -> Asset {
        Asset {
            name: name.to_string(),
            download_url: format!("https://example.com/{name}"),
        }
    }

    fn release(tag: &str, assets: Vec<Asset>) -> Release {
        Release {
            version: crate::version::VersionComparator::parse(tag).unwrap(),
            tag: tag.to_string(),
            assets,
        }
    }

    #[test]
    fn test_asset_name_matching() {
        let platform = linux_x86();
        assert!(platform.matches_asset_name("skiff-x86_64-unknown-linux-gnu.tar.gz"));
        assert!(platform.matches_asset_name("skiff_linux_amd64.tar.gz"));
        assert!(!platform.matches_asset_name("skiff-aarch64-unknown-linux-gnu.tar.gz"));
        assert!(!platform.matches_asset_name("skiff-x86_64-apple-darwin.tar.gz"));
    }

    #[test]
    fn test_darwin_does_not_match_windows() {
        let windows = Platform { os: "windows".to_string(), arch: "x86_64".to_string() };
        assert!(!windows.matches_asset_name("skiff-x86_64-apple-darwin.tar.gz"));
        assert!(windows.matches_asset_name("skiff-x86_64-pc-windows-msvc.zip"));
    }

    #[test]
    fn test_exactly_one_match_succeeds() {
        let rel = release(
            "v1.0.0",
            vec![
                asset("skiff-x86_64-unknown-linux-gnu.tar.gz"),
                asset("skiff-aarch64-apple-darwin.tar.gz"),
            ],
        );
        let chosen = rel.installable_asset(&linux_x86()).unwrap();
        assert_eq!(chosen.name, "skiff-x86_64-unknown-linux-gnu.tar.gz");
    }

    #[test]
    fn test_zero_matches_fails_explicitly() {
        let rel = release("v1.0.0", vec![asset("skiff-aarch64-apple-darwin.tar.gz")]);
        let err = rel.installable_asset(&linux_x86()).unwrap_err();
        assert!(matches!(err, SkiffError::AssetNotFound { .. }));
    }

    #[test]
    fn test_multiple_matches_fail_explicitly() {
        let rel = release(
            "v1.0.0",
            vec![
                asset("skiff-x86_64-unknown-linux-gnu.tar.gz"),
                asset("skiff-x86_64-unknown-linux-musl.tar.gz"),
            ],
        );
        let err = rel.installable_asset(&linux_x86()).unwrap_err();
        assert!(matches!(err, SkiffError::AssetAmbiguous { count: 2, .. }));
    }

    #[test]
    fn test_checksum_companions_are_not_installable() {
        // The .sha256 companion shares every platform token with the binary;
        // it must be filtered before the exactly-one invariant is checked.
        let rel = release(
            "v1.0.0",
            vec![
                asset("skiff-x86_64-unknown-linux-gnu.tar.gz"),
                asset("skiff-x86_64-unknown-linux-gnu.tar.gz.sha256"),
            ],
        );
        let chosen = rel.installable_asset(&linux_x86()).unwrap();
        assert_eq!(chosen.name, "skiff-x86_64-unknown-linux-gnu.tar.gz");
    }

    #[test]
    fn test_local_path_derivation() {
        let a = asset("skiff-x86_64-unknown-linux-gnu.tar.gz");
        let path = a.local_path(Path::new("/home/user/.skiff"));
        assert_eq!(
            path,
            PathBuf::from("/home/user/.skiff/skiff-x86_64-unknown-linux-gnu.tar.gz")
        );
    }
}
