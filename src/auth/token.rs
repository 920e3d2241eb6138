//
//  devops-client
//  auth/token.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Token Input Helpers
//!
//! Reading tokens from stdin (for `dvo auth login --with-token`), checking their
//! shape, and masking them for display.
//!
//! ## Example
//!
//! ```rust
//! use devops_client::auth::{mask_token, validate_token};
//!
//! assert!(validate_token("52charpatlookslikethis"));
//! assert_eq!(mask_token("abcdefghijkl"), "abcd********");
//! ```

use anyhow::Result;

/// Reads a token from standard input.
///
/// Only the first line is read; surrounding whitespace is trimmed.
///
/// # Example
///
/// ```rust,no_run
/// use devops_client::auth::read_token_from_stdin;
///
/// let token = read_token_from_stdin()?;
/// println!("Token received ({} characters)", token.len());
/// # Ok::<(), anyhow::Error>(())
/// ```
pub fn read_token_from_stdin() -> Result<String> {
    use std::io::{self, BufRead};

    let stdin = io::stdin();
    let mut line = String::new();
    stdin.lock().read_line(&mut line)?;

    Ok(line.trim().to_string())
}

/// Validates the format of a token string.
///
/// A token must not be empty and must not contain whitespace. This does NOT check
/// the token against the server.
///
/// ```rust
/// use devops_client::auth::validate_token;
///
/// assert!(validate_token("abc123"));
/// assert!(!validate_token(""));
/// assert!(!validate_token("has space"));
/// ```
pub fn validate_token(token: &str) -> bool {
    !token.is_empty() && !token.chars().any(char::is_whitespace)
}

/// Masks all but the first four characters of a token.
pub fn mask_token(token: &str) -> String {
    let visible: String = token.chars().take(4).collect();
    let hidden = token.chars().count().saturating_sub(4);
    format!("{}{}", visible, "*".repeat(hidden))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_token() {
        assert!(validate_token("NjM0NTY3ODkwMTIzNDU2Nzg5MA=="));
        assert!(!validate_token("has\ttab"));
        assert!(!validate_token("has\nnewline"));
    }

    #[test]
    fn test_mask_token() {
        assert_eq!(mask_token("abc"), "abc");
        assert_eq!(mask_token("abcdef"), "abcd**");
    }
}
