//! Skiff CLI entry point
//!
//! This is the main executable for skiff. It handles command-line argument
//! parsing, error display, and command execution.
//!
//! Failures are rendered once, here, through the user-friendly error
//! formatter; every terminal no-op outcome (already up to date, user
//! declined) exits zero.

use anyhow::Result;
use clap::Parser;
use skiff_cli::cli;
use skiff_cli::core::error::user_friendly_error;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = cli::Cli::parse();

    // Set up colored output for Windows
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    // Execute the command
    match cli.execute().await {
        Ok(()) => Ok(()),
        Err(e) => {
            // Convert to user-friendly error with context and suggestions
            let error_ctx = user_friendly_error(e);
            error_ctx.display();
            std::process::exit(1);
        }
    }
}
