//! Error handling for Skiff
//!
//! This module provides the error types and user-friendly error reporting for
//! the skiff CLI. The error system is designed around two core principles:
//! 1. **Strongly-typed errors** for precise error handling in code
//! 2. **User-friendly messages** with actionable suggestions for CLI users
//!
//! # Architecture
//!
//! The error system consists of two main types:
//! - [`SkiffError`] - Enumerated error types for all failure cases in skiff
//! - [`ErrorContext`] - Wrapper that adds user-friendly messages and suggestions
//!
//! # Error Categories
//!
//! - **Build provenance**: [`SkiffError::UnsupportedBuild`]
//! - **Network**: [`SkiffError::NetworkError`], [`SkiffError::HttpStatus`]
//! - **Release resolution**: [`SkiffError::NoCompatibleRelease`],
//!   [`SkiffError::AssetNotFound`], [`SkiffError::AssetAmbiguous`],
//!   [`SkiffError::InvalidVersion`]
//! - **Installation**: [`SkiffError::InstallFailed`],
//!   [`SkiffError::PermissionDenied`], [`SkiffError::IoError`]
//!
//! # Error Conversion and Context
//!
//! Common library errors are automatically converted to skiff errors:
//! - [`std::io::Error`] → [`SkiffError::IoError`]
//! - [`serde_json::Error`] → [`SkiffError::DecodeError`]
//!
//! Use [`user_friendly_error`] at the invocation boundary to convert any error
//! into a user-facing format with contextual suggestions.
//!
//! # Examples
//!
//! ```rust,no_run
//! use skiff_cli::core::{SkiffError, user_friendly_error};
//!
//! fn detect() -> Result<(), SkiffError> {
//!     Err(SkiffError::NoCompatibleRelease {
//!         os: "linux".to_string(),
//!         arch: "riscv64".to_string(),
//!     })
//! }
//!
//! if let Err(e) = detect() {
//!     let ctx = user_friendly_error(anyhow::Error::from(e));
//!     ctx.display(); // Shows colored error with suggestions
//! }
//! ```

use colored::Colorize;
use std::fmt;
use thiserror::Error;

/// The main error type for skiff operations.
///
/// Each variant represents a specific failure mode of the self-update flow and
/// carries the details needed to render an actionable message. Variants map
/// directly onto the update state machine: anything that is a legitimate
/// terminal outcome (already up to date, user declined) is **not** an error
/// and never appears here.
#[derive(Error, Debug)]
pub enum SkiffError {
    /// The running binary was built from source and carries no release
    /// version, so there is nothing meaningful to compare against.
    #[error("this skiff binary was built from source; self-update is only available for release builds")]
    UnsupportedBuild,

    /// A metadata or asset fetch failed at the transport level.
    ///
    /// Surfaced verbatim; this layer never retries, because silent retries
    /// can mask rate-limiting or authentication failures the user needs to
    /// see.
    #[error("network error: {operation}")]
    NetworkError {
        /// Description of the operation that failed.
        operation: String,
        /// The underlying transport error.
        #[source]
        source: reqwest::Error,
    },

    /// The server answered, but with a non-success status code.
    #[error("request failed with HTTP {status}: {url}")]
    HttpStatus {
        /// HTTP status code returned by the server.
        status: u16,
        /// The URL that was requested.
        url: String,
    },

    /// No published release carries an artifact for the running platform.
    #[error("no release found for {os}/{arch}")]
    NoCompatibleRelease {
        /// Operating system identifier (e.g. "linux").
        os: String,
        /// Architecture identifier (e.g. "x86_64").
        arch: String,
    },

    /// A version string (local or remote) failed to parse as semver.
    #[error("invalid version string: '{input}'")]
    InvalidVersion {
        /// The offending input.
        input: String,
        /// The underlying semver parse error.
        #[source]
        source: semver::Error,
    },

    /// A release exists for the chosen version but has no asset matching the
    /// running platform.
    #[error("release {tag} has no asset for {os}/{arch}")]
    AssetNotFound {
        /// Tag of the release that was inspected.
        tag: String,
        /// Operating system identifier.
        os: String,
        /// Architecture identifier.
        arch: String,
    },

    /// More than one asset plausibly matches the running platform.
    ///
    /// Selection fails explicitly rather than guessing which artifact to
    /// install.
    #[error("release {tag} has {count} assets matching {os}/{arch}; refusing to guess")]
    AssetAmbiguous {
        /// Tag of the release that was inspected.
        tag: String,
        /// Number of matching assets found.
        count: usize,
        /// Operating system identifier.
        os: String,
        /// Architecture identifier.
        arch: String,
    },

    /// The downloaded artifact could not be turned into an installable
    /// binary (bad archive, missing entry, empty payload).
    #[error("install failed: {reason}")]
    InstallFailed {
        /// Human-readable description of what went wrong.
        reason: String,
    },

    /// Staging or swapping the executable was denied by the OS.
    #[error("permission denied: {path}")]
    PermissionDenied {
        /// The path that could not be written.
        path: String,
    },

    /// IO error from [`std::io::Error`].
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Release metadata could not be decoded into the typed model.
    #[error("failed to decode release metadata: {0}")]
    DecodeError(#[from] serde_json::Error),

    /// Catch-all for errors that don't fit other categories.
    #[error("{message}")]
    Other {
        /// The error message.
        message: String,
    },
}

/// Wrapper adding user-facing context to an error.
///
/// `ErrorContext` pairs the underlying error with an optional suggestion and
/// optional details, and knows how to render all three to stderr with color.
/// It is produced by [`user_friendly_error`] at the invocation boundary;
/// application code propagates plain `Result`s and never constructs one.
pub struct ErrorContext {
    /// The underlying error.
    pub error: anyhow::Error,
    /// An actionable suggestion for resolving the error.
    pub suggestion: Option<String>,
    /// Additional details about the failure.
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a context wrapper around an error with no suggestion.
    pub fn new(error: anyhow::Error) -> Self {
        Self { error, suggestion: None, details: None }
    }

    /// Attach an actionable suggestion.
    #[must_use]
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Attach additional details.
    #[must_use]
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Print the error, its cause chain, and any suggestion to stderr.
    pub fn display(&self) {
        eprintln!("{} {}", "Error:".red().bold(), self.error);

        for cause in self.error.chain().skip(1) {
            eprintln!("  {} {}", "Caused by:".dimmed(), cause);
        }

        if let Some(ref details) = self.details {
            eprintln!("\n{details}");
        }

        if let Some(ref suggestion) = self.suggestion {
            eprintln!("\n{} {}", "Suggestion:".yellow(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;
        if let Some(ref suggestion) = self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }
        Ok(())
    }
}

/// Convert any error into a user-friendly [`ErrorContext`].
///
/// Recognized [`SkiffError`] variants get a tailored suggestion; everything
/// else passes through unchanged so the cause chain still renders.
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    let suggestion = match error.downcast_ref::<SkiffError>() {
        Some(SkiffError::UnsupportedBuild) => Some(
            "Install a release build from https://github.com/skiff-dev/skiff/releases \
             (or via the install script) to enable self-update."
                .to_string(),
        ),
        Some(SkiffError::NetworkError { .. } | SkiffError::HttpStatus { .. }) => Some(
            "Check your network connection. GitHub API rate limits can also cause \
             failures; wait a few minutes and try again."
                .to_string(),
        ),
        Some(SkiffError::NoCompatibleRelease { os, arch }) => Some(format!(
            "No prebuilt binary is published for {os}/{arch}. You can build from \
             source with `cargo install skiff-cli`."
        )),
        Some(SkiffError::PermissionDenied { path }) => Some(format!(
            "Check that you have write access to {path}, or rerun with elevated \
             privileges."
        )),
        Some(SkiffError::AssetAmbiguous { .. }) => Some(
            "Run `skiff self-update --select` to pick the exact artifact to install.".to_string(),
        ),
        _ => None,
    };

    let mut ctx = ErrorContext::new(error);
    if let Some(s) = suggestion {
        ctx = ctx.with_suggestion(s);
    }
    ctx
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SkiffError::NoCompatibleRelease {
            os: "linux".to_string(),
            arch: "riscv64".to_string(),
        };
        assert_eq!(err.to_string(), "no release found for linux/riscv64");
    }

    #[test]
    fn test_unsupported_build_suggestion() {
        let ctx = user_friendly_error(anyhow::Error::from(SkiffError::UnsupportedBuild));
        assert!(ctx.suggestion.is_some());
        assert!(ctx.suggestion.unwrap().contains("release"));
    }

    #[test]
    fn test_context_passthrough_for_unknown_errors() {
        let ctx = user_friendly_error(anyhow::anyhow!("something odd"));
        assert!(ctx.suggestion.is_none());
        assert_eq!(format!("{}", ctx), "something odd");
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: SkiffError = io.into();
        assert!(matches!(err, SkiffError::IoError(_)));
    }

    #[test]
    fn test_ambiguous_asset_message() {
        let err = SkiffError::AssetAmbiguous {
            tag: "v1.2.0".to_string(),
            count: 2,
            os: "linux".to_string(),
            arch: "x86_64".to_string(),
        };
        assert!(err.to_string().contains("refusing to guess"));
    }
}
