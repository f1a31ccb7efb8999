//! Skiff - a lightweight manager for developer shell tools
//!
//! Skiff ships as a single static binary distributed through GitHub
//! releases, and this crate carries its CLI scaffold together with the
//! complete self-update subsystem: release discovery, platform-aware asset
//! selection, download and unpacking, and atomic replacement of the running
//! executable.
//!
//! # Architecture Overview
//!
//! - [`cli`] - Command-line interface and per-command modules
//! - [`core`] - Error taxonomy and user-facing error rendering
//! - [`upgrade`] - The self-update workflow: release client, selector,
//!   installer, and upgrade notices
//! - [`version`] - Semantic version comparison and build provenance
//!
//! # Key Properties
//!
//! - **Crash-safe installs**: the new binary is staged next to the target
//!   and swapped in with a single atomic rename; a failed update never
//!   leaves the system without a runnable executable.
//! - **Explicit platform matching**: exactly one release asset may match
//!   the running OS/architecture; anything else fails rather than guessing.
//! - **No hidden state**: release metadata is fetched fresh every run and
//!   nothing is cached or persisted between invocations.
//! - **Injected collaborators**: the release repository and the interactive
//!   prompt are traits, so the entire workflow runs in tests against
//!   fabricated releases and scripted answers.
//!
//! # Example
//!
//! ```rust,no_run
//! use skiff_cli::upgrade::config::UpdateConfig;
//! use skiff_cli::upgrade::github::GithubReleases;
//! use skiff_cli::upgrade::prompt::TerminalPrompt;
//! use skiff_cli::upgrade::{SelfUpdater, UpdateOutcome};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = UpdateConfig::new();
//! let source = GithubReleases::new(&config.repository)?;
//!
//! match SelfUpdater::new(config, source).run(&TerminalPrompt).await? {
//!     UpdateOutcome::Installed { version, .. } => {
//!         println!("updated to {version}");
//!     }
//!     UpdateOutcome::UpToDate { current } => {
//!         println!("{current} is already the latest");
//!     }
//!     UpdateOutcome::Declined => {}
//! }
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod core;
pub mod upgrade;
pub mod version;
