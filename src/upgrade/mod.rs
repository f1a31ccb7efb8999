//! Self-update functionality for skiff.
//!
//! This module implements the complete update workflow for the skiff binary:
//! discovering published releases on GitHub, selecting the right release and
//! artifact for the running platform, downloading and unpacking it, and
//! atomically replacing the on-disk executable.
//!
//! # Architecture Overview
//!
//! The subsystem is built from small collaborators wired together by
//! [`SelfUpdater`]:
//!
//! - **[`github::ReleaseSource`]** - the release repository boundary:
//!   list releases, detect the latest for a platform, fetch asset bytes.
//!   [`github::GithubReleases`] is the production implementation with a
//!   typed decode of the GitHub API at this boundary.
//! - **[`selector::ReleaseSelector`]** - resolves "which release, which
//!   asset": automatic latest-release mode with an up-to-date
//!   short-circuit, and interactive mode where the user picks any release.
//! - **[`installer::BinaryInstaller`]** - stages the new binary adjacent to
//!   the target and swaps it in atomically; a failed update never leaves
//!   the system without a runnable executable.
//! - **[`notices::AnnotationTable`]** - version-tagged upgrade notices
//!   surfaced after a successful update, covering every version crossed.
//! - **[`prompt::UserDecision`]** - the confirmation/selection collaborator;
//!   `dialoguer` in production, scripted answers in tests.
//!
//! # Update Process Flow
//!
//! ```text
//! 1. Provenance check
//!    └── Source builds are refused before any network I/O
//!
//! 2. Release selection
//!    ├── Automatic: latest platform-compatible release vs. current version
//!    └── Interactive (--select): user-chosen release and asset
//!
//! 3. Confirmation (automatic mode)
//!
//! 4. Download and unpack
//!    ├── Fetch asset bytes with progress
//!    └── Extract the binary from .tar.gz / .zip (raw binaries pass through)
//!
//! 5. Install
//!    ├── Stage next to the target, verify, carry over permissions
//!    └── Atomic rename swap
//!
//! 6. Upgrade notices (automatic mode)
//! ```
//!
//! # Safety
//!
//! The installer's atomic swap is the core safety invariant: every failure
//! before the swap leaves the original executable untouched, and the swap
//! itself either completes or leaves the original as the sole survivor.
//! The running process keeps executing the old in-memory image until
//! restarted.
//!
//! All state is single-invocation-scoped; nothing is cached or persisted
//! between runs.

/// Asset archive unpacking (`.tar.gz`, `.zip`, raw passthrough).
pub mod archive;
/// Injected configuration for the update workflow.
pub mod config;
/// Release repository client and the GitHub implementation.
pub mod github;
/// Atomic executable replacement.
pub mod installer;
/// Version-tagged upgrade notices.
pub mod notices;
/// User-decision collaborator for prompts.
pub mod prompt;
/// Typed release metadata and platform matching.
pub mod release;
/// Release and asset selection.
pub mod selector;
/// Workflow orchestration.
pub mod self_updater;


pub use self_updater::{SelfUpdater, UpdateOutcome};
