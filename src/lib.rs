//
//  devops-client
//  lib.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # DevOps Client Library
//!
//! A versioned REST resource client for DevOps platform APIs, plus the `dvo`
//! command-line interface built on top of it.
//!
//! ## Overview
//!
//! Every call a caller makes goes through the same pipeline:
//!
//! 1. The resource's route template is resolved against the server's advertised
//!    locations, and an API version is negotiated.
//! 2. The resource area may be redirected to a different host through the
//!    resource-area directory.
//! 3. `Accept`/`Content-Type` headers are built with the negotiated version.
//! 4. One HTTP call is made through the transport.
//! 5. The JSON response is reshaped per the expected type: collection envelopes are
//!    unwrapped, timestamps become `DateTime<Utc>` and enum names become numbers.
//!
//! ## Module Structure
//!
//! - [`api`]: The resolver, options builder, response shaper and resource clients
//! - [`auth`]: Credential strategies and keyring storage
//! - [`config`]: Configuration file management
//! - [`cli`]: Command-line interface definitions using clap
//! - [`output`]: Output formatting (Table, JSON)
//! - [`interactive`]: Interactive prompts
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use devops_client::api::{Connection, ResourceArea, ResponseShape};
//! use devops_client::api::routing::RouteValues;
//! use devops_client::auth::AuthCredential;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let connection = Connection::connect(
//!     "https://dev.azure.com/fabrikam",
//!     Some(AuthCredential::pat("my-token")),
//!     None,
//! )?;
//!
//! let client = connection
//!     .resource_client(&ResourceArea::new("core"))
//!     .await?;
//! let request = client
//!     .request("projects")
//!     .api_version("4.1")
//!     .route_values(RouteValues::new().with_optional::<&str>("projectId", None));
//!
//! let projects = client.get(request, ResponseShape::RAW).await?;
//! println!("{}", projects.into_json());
//! # Ok(())
//! # }
//! ```
//!
//! ## Deployment Differences
//!
//! | Feature | Hosted | On-premises |
//! |---------|--------|-------------|
//! | Resource-area redirection | Yes | No (directory is empty) |
//! | Personal Access Tokens | Yes | Yes |
//! | Basic authentication | No | Yes |

/// Command-line interface definitions.
///
/// Contains the [`Cli`] parser and every subcommand of the `dvo` binary.
pub mod cli;

/// The versioned REST resource client.
///
/// Resolves routes, negotiates versions, follows resource-area redirection and
/// shapes responses. See [`api::Connection`] for the entry point.
pub mod api;

/// Authentication.
///
/// Credential strategies applied by the transport, and keyring storage for
/// secrets.
pub mod auth;

/// Configuration management.
///
/// Reads and writes the TOML configuration holding named connections.
pub mod config;

/// Output formatting for command results.
pub mod output;

/// Interactive prompts.
pub mod interactive;

pub use cli::Cli;

pub use config::Config;

/// The application name, used for the configuration directory.
pub const APP_NAME: &str = "dvo";

/// The current version of the CLI, read from `Cargo.toml` at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Exit codes used by the `dvo` binary.
///
/// | Code | Constant | Meaning |
/// |------|----------|---------|
/// | 0 | `SUCCESS` | Command completed |
/// | 1 | `ERROR` | General error |
/// | 2 | `USAGE` | Invalid arguments or version token |
/// | 4 | `AUTH_ERROR` | Server rejected the credentials (401/403) |
/// | 8 | `NOT_FOUND` | Resource, location or resource area not found |
/// | 16 | `CANCELLED` | Interrupted by the user |
/// | 32 | `RATE_LIMIT` | Server throttled the request (429) |
pub mod exit_codes {
    /// Command completed successfully.
    pub const SUCCESS: i32 = 0;

    /// General error.
    pub const ERROR: i32 = 1;

    /// Invalid command usage.
    pub const USAGE: i32 = 2;

    /// Authentication failed.
    pub const AUTH_ERROR: i32 = 4;

    /// Resource not found.
    pub const NOT_FOUND: i32 = 8;

    /// Cancelled by user.
    pub const CANCELLED: i32 = 16;

    /// Rate limited by the server.
    pub const RATE_LIMIT: i32 = 32;
}
