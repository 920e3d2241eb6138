//
//  devops-client
//  api/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # API Client Layer
//!
//! This module provides the versioned REST resource client for the DevOps platform.
//!
//! ## Architecture
//!
//! The API layer is organized as follows:
//!
//! - [`version`]: API version tokens (`4.1-preview.3`)
//! - [`routing`]: Route template resolution and version negotiation
//! - [`areas`]: Resource-area redirection to other hosts
//! - [`options`]: Request header building
//! - [`transport`]: The HTTP collaborator
//! - [`shaping`] and [`descriptors`]: Typed response reshaping
//! - [`client`]: The connection and per-area resource client
//! - [`build`], [`git`]: Endpoint families built on the client
//! - [`common`]: Shared error type and list envelope
//!
//! ## Usage
//!
//! ### Calling a typed endpoint
//!
//! ```rust,no_run
//! use devops_client::api::build::BuildApi;
//! use devops_client::api::client::Connection;
//! use devops_client::auth::AuthCredential;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let connection = Connection::connect(
//!     "https://dev.azure.com/fabrikam",
//!     Some(AuthCredential::pat("your-pat")),
//!     None,
//! )?;
//!
//! let build = BuildApi::new(&connection).await?.get_build("Fabrikam", 42).await?;
//! println!("{:?} started at {:?}", build.status, build.start_time);
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! Every failure is an [`ApiError`]. Transport failures are carried unchanged in
//! [`ApiError::Transport`], so the status code and raw body stay available.

/// Collection-lookup and versioned-call facade.
///
/// Provides [`Connection`](client::Connection) and
/// [`ResourceClient`](client::ResourceClient), which run every call through
/// resolve, header building, one transport call and response shaping.
pub mod client;

/// Single-flight memoization shared by the connection caches.
pub mod cache;

/// Resource-area directory lookups.
pub mod areas;

/// Route templates, query strings and version negotiation.
pub mod routing;

/// API version tokens.
pub mod version;

/// Request header building.
pub mod options;

/// Response shaping per type descriptor.
pub mod shaping;

/// Built-in type descriptors.
pub mod descriptors;

/// HTTP transport collaborator.
pub mod transport;

/// Build endpoints.
pub mod build;

/// Git endpoints.
pub mod git;

/// Shared types and utilities.
///
/// Contains:
/// - [`ApiError`]: Unified error type for API operations
/// - [`ListResponse`](common::ListResponse): The `{count, value}` list envelope
pub mod common;

pub use client::{Connection, ResourceArea, ResourceClient, ResponseShape};
pub use common::ApiError;
pub use shaping::ShapedValue;
