//! The `skiff self-update` command.
//!
//! Updates the skiff binary in place from GitHub releases. The default mode
//! resolves the latest release for the running platform, asks for
//! confirmation, and performs the atomic swap; `--select` opens the
//! interactive release picker instead (the downgrade/reinstall path).
//!
//! Read-only modes: `--check` queries for a newer version without touching
//! anything, `--status` prints the current and latest versions.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use tracing::debug;

use crate::upgrade::config::UpdateConfig;
use crate::upgrade::github::{GithubReleases, ReleaseSource};
use crate::upgrade::prompt::{AssumeYes, TerminalPrompt, UserDecision};
use crate::upgrade::{SelfUpdater, UpdateOutcome};

/// Command-line arguments for the self-update command.
///
/// # Examples
///
/// ```bash
/// skiff self-update              # Update to the latest release
/// skiff self-update --check      # Check for updates without installing
/// skiff self-update --status     # Show current and latest versions
/// skiff self-update --select     # Pick a release (downgrade/reinstall)
/// skiff self-update --yes        # Update without the confirmation prompt
/// ```
#[derive(Args, Debug)]
pub struct SelfUpdateCommand {
    /// Choose a release to install interactively instead of the latest.
    ///
    /// Lists every published release (pre-releases included) and, when the
    /// chosen release ships several artifacts, lets you pick the exact one.
    /// This path performs no up-to-date check, so it can downgrade.
    #[arg(long)]
    pub select: bool,

    /// Check for updates without installing.
    #[arg(long, conflicts_with_all = ["select", "status"])]
    pub check: bool,

    /// Show the current version and the latest available.
    #[arg(short, long, conflicts_with = "select")]
    pub status: bool,

    /// Skip the confirmation prompt.
    #[arg(short = 'y', long, conflicts_with = "select")]
    pub yes: bool,
}

impl SelfUpdateCommand {
    /// Execute the self-update command.
    pub async fn execute(self) -> Result<()> {
        let config = UpdateConfig::new();
        let source = GithubReleases::new(&config.repository)?;
        let updater = SelfUpdater::new(config, source);

        if self.status {
            return show_status(&updater).await;
        }
        if self.check {
            return check_for_updates(&updater).await;
        }

        let prompt: Box<dyn UserDecision> =
            if self.yes { Box::new(AssumeYes) } else { Box::new(TerminalPrompt) };

        let outcome = if self.select {
            updater.run_interactive(prompt.as_ref()).await?
        } else {
            updater.run(prompt.as_ref()).await?
        };

        render_outcome(&outcome);
        Ok(())
    }
}

fn render_outcome(outcome: &UpdateOutcome) {
    match outcome {
        UpdateOutcome::Installed { version, notices } => {
            println!("{}", format!("Successfully updated to version {version}").bold());
            if !notices.is_empty() {
                println!("\nTo use version {version}:");
                for notice in notices {
                    println!("- {notice}");
                }
            }
        }
        UpdateOutcome::UpToDate { current } => {
            println!("Current version ({current}) is the latest");
        }
        // Declining is a no-op, not an error; exit quietly.
        UpdateOutcome::Declined => {}
    }
}

async fn show_status<S: ReleaseSource>(updater: &SelfUpdater<S>) -> Result<()> {
    let current = updater.current_version();

    let latest = match updater.latest_available().await {
        Ok(version) => version,
        Err(error) => {
            debug!("failed to check for updates: {error}");
            None
        }
    };

    match latest {
        Some(ref latest_version)
            if updater
                .current_version()
                .release()
                .map(|running| latest_version > running)
                .unwrap_or(true) =>
        {
            println!("Current version: {current}");
            println!("Latest version:  {latest_version} (update available)");
        }
        _ => println!("Current version: {current} (up to date)"),
    }

    Ok(())
}

async fn check_for_updates<S: ReleaseSource>(updater: &SelfUpdater<S>) -> Result<()> {
    println!("{}", "Checking for updates...".cyan());

    match updater.check_for_update().await? {
        Some(latest) => {
            println!(
                "{}",
                format!("Update available: {} -> {latest}", updater.current_version()).green()
            );
            println!("Run `skiff self-update` to install the latest version");
        }
        None => {
            println!(
                "{}",
                format!("You are on the latest version ({})", updater.current_version()).green()
            );
        }
    }

    Ok(())
}
