//
//  devops-client
//  interactive/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Interactive Prompts
//!
//! Thin wrappers over `dialoguer` used by the `auth` commands. Every prompt refuses
//! to run when prompting is disabled (`--no-prompt`) or stdin is not a terminal, so
//! scripted invocations fail fast instead of hanging.
//!
//! # Example
//!
//! ```no_run
//! use devops_client::interactive::{prompt_input, prompt_password};
//!
//! let url = prompt_input("Organization URL:", true).unwrap();
//! let token = prompt_password("Personal Access Token:", true).unwrap();
//! ```

use anyhow::Result;
use console::Term;
use dialoguer::{Confirm, Input, Password};

/// Returns `true` if prompts may be shown.
pub fn can_prompt(allowed: bool) -> bool {
    allowed && Term::stdout().features().is_attended()
}

fn ensure_can_prompt(allowed: bool, message: &str) -> Result<()> {
    if !can_prompt(allowed) {
        anyhow::bail!("Cannot prompt for '{}' in non-interactive mode", message.trim_end_matches(':'));
    }
    Ok(())
}

/// Prompts the user for text input. The input cannot be empty.
pub fn prompt_input(message: &str, allowed: bool) -> Result<String> {
    ensure_can_prompt(allowed, message)?;
    let input: String = Input::new().with_prompt(message).interact_text()?;
    Ok(input)
}

/// Prompts the user for masked input, such as a token.
///
/// # Notes
///
/// - The typed characters are never echoed
/// - Empty input is rejected by `dialoguer` and the prompt repeats
pub fn prompt_password(message: &str, allowed: bool) -> Result<String> {
    ensure_can_prompt(allowed, message)?;
    let password = Password::new().with_prompt(message).interact()?;
    Ok(password)
}

/// Prompts for a yes/no answer. Pressing Enter accepts `default`.
///
/// In non-interactive mode the default is returned without prompting.
pub fn prompt_confirm_with_default(message: &str, default: bool, allowed: bool) -> Result<bool> {
    if !can_prompt(allowed) {
        return Ok(default);
    }
    let confirmed = Confirm::new()
        .with_prompt(message)
        .default(default)
        .interact()?;
    Ok(confirmed)
}
