//! User-decision collaborator for interactive prompts.
//!
//! The updater never talks to the terminal directly; it asks a
//! [`UserDecision`] implementation. [`TerminalPrompt`] is the production
//! implementation backed by `dialoguer`; tests supply scripted answers.

use anyhow::{Context, Result};
use dialoguer::{Confirm, Select};

/// Interactive decisions the update flow needs from the user.
///
/// Both operations treat cancellation (Esc, ctrl-c at the prompt) as a
/// legitimate answer, not an error: `choose_one` returns `None` and
/// `confirm` returns `false`.
pub trait UserDecision {
    /// Ask the user to pick one of `options`; `None` means cancelled.
    ///
    /// `default` preselects an entry for quick confirmation.
    fn choose_one(&self, message: &str, options: &[String], default: usize)
    -> Result<Option<usize>>;

    /// Ask a yes/no question. Declining and cancelling both answer `false`.
    fn confirm(&self, message: &str) -> Result<bool>;
}

/// Terminal-backed prompt implementation.
pub struct TerminalPrompt;

impl UserDecision for TerminalPrompt {
    fn choose_one(
        &self,
        message: &str,
        options: &[String],
        default: usize,
    ) -> Result<Option<usize>> {
        let selection = Select::new()
            .with_prompt(message)
            .items(options)
            .default(default)
            .interact_opt()
            .context("cannot get answer from console")?;
        Ok(selection)
    }

    fn confirm(&self, message: &str) -> Result<bool> {
        let answer = Confirm::new()
            .with_prompt(message)
            .default(false)
            .interact_opt()
            .context("cannot get answer from console")?;
        Ok(answer.unwrap_or(false))
    }
}

/// Non-interactive prompt that accepts every confirmation.
///
/// Used by `self-update --yes`; selection prompts are unreachable in that
/// mode (the flag conflicts with `--select`), so `choose_one` keeps the
/// preselected default.
pub struct AssumeYes;

impl UserDecision for AssumeYes {
    fn choose_one(
        &self,
        _message: &str,
        _options: &[String],
        default: usize,
    ) -> Result<Option<usize>> {
        Ok(Some(default))
    }

    fn confirm(&self, _message: &str) -> Result<bool> {
        Ok(true)
    }
}
