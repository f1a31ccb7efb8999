//! Command-line interface for skiff.
//!
//! Each command is implemented as a separate module with its own argument
//! structure and execution logic. The root [`Cli`] parser carries the global
//! options shared by every command:
//!
//! - `--verbose` / `--quiet` - output level
//! - `--no-progress` - disable progress bars and spinners for automation
//!
//! # Command Architecture
//!
//! Global flags are translated into a [`CliConfig`] before dispatch, which
//! keeps environment mutation and logging setup in one place and lets tests
//! inject configuration without parsing a command line.
//!
//! ```bash
//! skiff self-update              # update skiff itself to the latest release
//! skiff self-update --select     # pick a specific release interactively
//! skiff --verbose self-update    # with debug logging
//! ```

mod self_update;

use anyhow::Result;
use clap::{Parser, Subcommand};

/// Runtime configuration for CLI execution.
///
/// Holds settings derived from global flags so they can be applied once at
/// startup (and injected directly in tests, without global state pollution).
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    /// Log filter directive for the tracing subscriber. `None` defers to the
    /// `RUST_LOG` environment variable.
    pub log_level: Option<String>,

    /// Whether to disable progress indicators and animated output.
    pub no_progress: bool,
}

impl CliConfig {
    /// Create a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply this configuration to the process environment.
    ///
    /// Sets `SKIFF_NO_PROGRESS` when progress output is disabled; the
    /// download progress bar checks it.
    pub fn apply_to_env(&self) {
        if self.no_progress {
            // SAFETY: called once at startup, before any other thread exists.
            unsafe { std::env::set_var("SKIFF_NO_PROGRESS", "1") };
        }
    }

    /// Install the tracing subscriber for this invocation.
    ///
    /// Repeated initialization (as happens across tests) is ignored.
    pub fn init_logging(&self) {
        use tracing_subscriber::EnvFilter;

        let filter = match self.log_level.as_deref() {
            Some(level) => EnvFilter::new(level),
            None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init();
    }
}

/// Main CLI application structure for skiff.
///
/// Handles global flags and delegates to subcommands for specific
/// operations.
#[derive(Parser)]
#[command(
    name = "skiff",
    about = "Skiff - a lightweight manager for developer shell tools",
    version,
    long_about = "Skiff manages curated developer shell tools and keeps itself up to date \
                  directly from GitHub releases."
)]
pub struct Cli {
    /// The subcommand to execute.
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output for debugging and detailed information.
    ///
    /// Equivalent to `RUST_LOG=debug`. Mutually exclusive with `--quiet`.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress all output except errors for automation.
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Disable progress bars and spinners for automation.
    ///
    /// Useful for CI pipelines and terminals without ANSI support.
    #[arg(long, global = true)]
    no_progress: bool,
}

/// Available subcommands for the skiff CLI.
#[derive(Subcommand)]
enum Commands {
    /// Update skiff itself from GitHub releases.
    ///
    /// Resolves the latest release for this platform, downloads the matching
    /// artifact, and atomically replaces the running executable. See
    /// [`self_update::SelfUpdateCommand`] for the available modes.
    SelfUpdate(self_update::SelfUpdateCommand),
}

impl Cli {
    /// Execute the CLI with configuration derived from the parsed arguments.
    pub async fn execute(self) -> Result<()> {
        let config = self.build_config();
        self.execute_with_config(config).await
    }

    /// Build a [`CliConfig`] from the parsed global flags.
    ///
    /// Verbose maps to debug logging, quiet to errors only; the default
    /// defers to `RUST_LOG`.
    #[must_use]
    pub fn build_config(&self) -> CliConfig {
        let log_level = if self.verbose {
            Some("debug".to_string())
        } else if self.quiet {
            Some("error".to_string())
        } else {
            None
        };

        CliConfig { log_level, no_progress: self.no_progress }
    }

    /// Execute the CLI with an explicitly provided configuration.
    ///
    /// Kept separate from [`execute`](Self::execute) so tests can inject
    /// configuration instead of building it from a command line.
    pub async fn execute_with_config(self, config: CliConfig) -> Result<()> {
        config.apply_to_env();
        config.init_logging();

        match self.command {
            Commands::SelfUpdate(cmd) => cmd.execute().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_config_verbose() {
        let cli = Cli::parse_from(["skiff", "--verbose", "self-update"]);
        let config = cli.build_config();
        assert_eq!(config.log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn test_build_config_quiet() {
        let cli = Cli::parse_from(["skiff", "--quiet", "self-update"]);
        let config = cli.build_config();
        assert_eq!(config.log_level.as_deref(), Some("error"));
    }

    #[test]
    fn test_build_config_default() {
        let cli = Cli::parse_from(["skiff", "self-update"]);
        let config = cli.build_config();
        assert_eq!(config.log_level, None);
        assert!(!config.no_progress);
    }

    #[test]
    fn test_verbose_quiet_conflict() {
        let result = Cli::try_parse_from(["skiff", "--verbose", "--quiet", "self-update"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_select_yes_conflict() {
        let result =
            Cli::try_parse_from(["skiff", "self-update", "--select", "--yes"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_self_update_flags_parse() {
        let cli = Cli::parse_from(["skiff", "self-update", "--check", "--no-progress"]);
        let config = cli.build_config();
        assert!(config.no_progress);
    }
}
