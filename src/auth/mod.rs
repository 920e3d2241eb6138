//
//  devops-client
//  auth/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Authentication Module
//!
//! Auth handlers are pure strategies: each one knows how to stamp an outbound request
//! with an `Authorization` header and nothing else. The marshaling core never looks at
//! them; they are handed to the transport.
//!
//! ## Supported Authentication Methods
//!
//! - **Personal Access Token (PAT)**: Basic authentication with an empty user name and
//!   the token as password. The default for DevOps organizations.
//! - **Bearer**: OAuth / Entra ID access tokens.
//! - **Basic**: User name and password, for on-premises servers.
//!
//! NTLM and Kerberos negotiation are not supported.
//!
//! ## Module Structure
//!
//! - [`token`]: Token input and format validation
//! - [`keyring`]: Secure credential storage using the system keyring
//!
//! ## Example
//!
//! ```rust
//! use devops_client::auth::AuthCredential;
//!
//! let credential = AuthCredential::pat("abc123");
//! assert_eq!(credential.kind(), devops_client::auth::AuthKind::Pat);
//! ```

mod keyring;
mod token;

pub use keyring::*;
pub use token::*;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::RequestBuilder;
use serde::{Deserialize, Serialize};

/// The kind of credential configured for a connection.
///
/// Stored in the configuration file; the secret itself lives in the keyring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthKind {
    /// Personal Access Token.
    #[default]
    Pat,
    /// OAuth bearer token.
    Bearer,
    /// User name and password.
    Basic,
}

impl std::fmt::Display for AuthKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Pat => "pat",
            Self::Bearer => "bearer",
            Self::Basic => "basic",
        };
        f.write_str(name)
    }
}

impl std::str::FromStr for AuthKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pat" | "token" => Ok(Self::Pat),
            "bearer" | "oauth" => Ok(Self::Bearer),
            "basic" => Ok(Self::Basic),
            _ => anyhow::bail!("Unknown auth kind '{}'. Expected pat, bearer or basic", s),
        }
    }
}

/// Credentials applied to outbound requests.
///
/// # Variants
///
/// - `PersonalAccessToken`: Sent as `Basic base64(":" + token)`.
/// - `Bearer`: Sent as `Bearer <token>`.
/// - `Basic`: Standard HTTP Basic authentication.
#[derive(Debug, Clone)]
pub enum AuthCredential {
    /// Personal Access Token.
    PersonalAccessToken {
        /// The token string.
        token: String,
    },
    /// OAuth bearer token.
    Bearer {
        /// The access token.
        token: String,
    },
    /// Basic HTTP authentication with username and password.
    Basic {
        /// The username for authentication.
        username: String,
        /// The password for authentication.
        password: String,
    },
}

impl AuthCredential {
    /// Creates a PAT credential.
    pub fn pat(token: impl Into<String>) -> Self {
        Self::PersonalAccessToken {
            token: token.into(),
        }
    }

    /// Creates a bearer credential.
    pub fn bearer(token: impl Into<String>) -> Self {
        Self::Bearer {
            token: token.into(),
        }
    }

    /// Creates a Basic credential.
    pub fn basic(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self::Basic {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Builds a credential of the given kind from a stored secret.
    ///
    /// Basic credentials need a user name; without one the secret is treated as a PAT.
    pub fn from_kind(kind: AuthKind, username: Option<&str>, secret: String) -> Self {
        match (kind, username) {
            (AuthKind::Pat, _) | (AuthKind::Basic, None) => Self::pat(secret),
            (AuthKind::Bearer, _) => Self::bearer(secret),
            (AuthKind::Basic, Some(user)) => Self::basic(user, secret),
        }
    }

    /// The kind of this credential.
    pub fn kind(&self) -> AuthKind {
        match self {
            Self::PersonalAccessToken { .. } => AuthKind::Pat,
            Self::Bearer { .. } => AuthKind::Bearer,
            Self::Basic { .. } => AuthKind::Basic,
        }
    }

    /// The `Authorization` header value for this credential.
    ///
    /// # Example
    ///
    /// ```rust
    /// use devops_client::auth::AuthCredential;
    ///
    /// let credential = AuthCredential::pat("secret");
    /// assert_eq!(credential.authorization_header(), "Basic OnNlY3JldA==");
    /// ```
    pub fn authorization_header(&self) -> String {
        match self {
            Self::PersonalAccessToken { token } => {
                format!("Basic {}", STANDARD.encode(format!(":{}", token)))
            }
            Self::Bearer { token } => format!("Bearer {}", token),
            Self::Basic { username, password } => {
                format!("Basic {}", STANDARD.encode(format!("{}:{}", username, password)))
            }
        }
    }

    /// Applies the authentication credential to an HTTP request.
    pub fn apply_to_request(&self, request: RequestBuilder) -> RequestBuilder {
        request.header(reqwest::header::AUTHORIZATION, self.authorization_header())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authorization_headers() {
        assert_eq!(
            AuthCredential::bearer("abc").authorization_header(),
            "Bearer abc"
        );
        assert_eq!(
            AuthCredential::basic("user", "pass").authorization_header(),
            "Basic dXNlcjpwYXNz"
        );
        assert_eq!(
            AuthCredential::pat("secret").authorization_header(),
            "Basic OnNlY3JldA=="
        );
    }

    #[test]
    fn test_from_kind() {
        let basic = AuthCredential::from_kind(AuthKind::Basic, Some("me"), "pw".to_string());
        assert_eq!(basic.kind(), AuthKind::Basic);

        let fallback = AuthCredential::from_kind(AuthKind::Basic, None, "pw".to_string());
        assert_eq!(fallback.kind(), AuthKind::Pat);
    }

    #[test]
    fn test_auth_kind_parsing() {
        assert_eq!("PAT".parse::<AuthKind>().unwrap(), AuthKind::Pat);
        assert_eq!("oauth".parse::<AuthKind>().unwrap(), AuthKind::Bearer);
        assert!("ntlm".parse::<AuthKind>().is_err());
    }
}
