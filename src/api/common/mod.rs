//
//  devops-client
//  api/common/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Common API Types
//!
//! This module provides the error type shared by every stage of a call and the
//! `{count, value}` envelope the platform uses for list responses.
//!
//! # Overview
//!
//! - [`ApiError`] - Unified error type for resolution, header building, transport and shaping
//! - [`ListResponse`] - Collection envelope returned by list endpoints
//! - [`ListReply`] - Bare array or envelope, as answered by discovery endpoints
//!
//! # Example
//!
//! ```rust
//! use devops_client::api::common::ApiError;
//!
//! fn describe(result: Result<(), ApiError>) {
//!     match result {
//!         Ok(()) => println!("Success!"),
//!         Err(ApiError::RouteResolution { missing, .. }) => {
//!             println!("Missing route values: {}", missing.join(", "))
//!         }
//!         Err(ApiError::Transport(e)) => println!("Server said: {}", e),
//!         Err(e) => println!("Error: {}", e),
//!     }
//! }
//! ```
//!
//! # Notes
//!
//! - Every variant is terminal for the call in progress; nothing is retried here
//! - Transport failures are carried unchanged inside [`ApiError::Transport`]

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::transport::TransportError;

/// Unified error type for versioned REST calls.
///
/// # Variants
///
/// | Variant | Raised by | Network call made? |
/// |---------|-----------|--------------------|
/// | `RouteResolution` | Route resolver | No |
/// | `ResourceAreaNotFound` | Resource-area lookup | Directory only |
/// | `InvalidVersionFormat` | Version parser / options builder | No |
/// | `UnsupportedApiVersion` | Version negotiation | Locations only |
/// | `LocationNotFound` | Location lookup | Locations only |
/// | `Transport` | Transport collaborator | Yes |
/// | `ShapeMismatch` | Response shaper | Yes |
/// | `DateParse` | Response shaper | Yes |
/// | `UnknownEnumValue` | Response shaper | Yes |
/// | `InvalidHeader` | Options builder | No |
/// | `InvalidUrl` | URL building | No |
/// | `Deserialize` | Typed conversion | Yes |
///
/// # Notes
///
/// - Shaping errors surface after a successful HTTP call on purpose: a data-contract
///   drift must not be silently swallowed.
#[derive(Error, Debug)]
pub enum ApiError {
    /// A route template placeholder had no value.
    ///
    /// Every missing placeholder name is listed, not just the first one.
    #[error("Route template '{template}' is missing values for: {}", .missing.join(", "))]
    RouteResolution {
        /// The template being filled.
        template: String,
        /// Names of the placeholders without values.
        missing: Vec<String>,
    },

    /// The resource-area directory is non-empty but has no entry for the area.
    #[error("Could not find resource area {resource_area_id} in the directory of {base_url}")]
    ResourceAreaNotFound {
        /// The resource area GUID that was looked up.
        resource_area_id: String,
        /// The base URL whose directory was consulted.
        base_url: String,
    },

    /// A version token did not match `<major>.<minor>[-preview[.<n>]]`.
    #[error("Invalid API version '{0}': expected <major>.<minor>[-preview[.<n>]]")]
    InvalidVersionFormat(String),

    /// The requested version is older than anything the server still serves.
    #[error("API version {requested} is older than the minimum {minimum} supported by {resource}")]
    UnsupportedApiVersion {
        /// Resource name or GUID.
        resource: String,
        /// The version the caller asked for.
        requested: String,
        /// The oldest version the server supports.
        minimum: String,
    },

    /// The server advertised no location for the resource within its area.
    #[error("No location for resource '{resource}' in area '{area}'")]
    LocationNotFound {
        /// Area name.
        area: String,
        /// Resource name or GUID.
        resource: String,
    },

    /// The transport collaborator failed; carried unchanged.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The response did not have the declared collection/record shape.
    #[error("Expected {expected} in response but found {found}")]
    ShapeMismatch {
        /// The shape the descriptor called for.
        expected: &'static str,
        /// The JSON kind actually received.
        found: &'static str,
    },

    /// A field declared as a timestamp did not hold an ISO-8601 string.
    #[error("Field '{field}' holds '{raw}', which is not an ISO-8601 timestamp")]
    DateParse {
        /// Field name.
        field: String,
        /// The raw value as received.
        raw: String,
    },

    /// A field declared as an enum held a name the descriptor does not know.
    #[error("Field '{field}' holds unknown {enum_name} value '{value}'")]
    UnknownEnumValue {
        /// Field name.
        field: String,
        /// Enum descriptor name.
        enum_name: &'static str,
        /// The raw value as received.
        value: String,
    },

    /// A header name or value is not valid HTTP.
    #[error("Invalid header '{name}'")]
    InvalidHeader {
        /// The offending header name.
        name: String,
    },

    /// A base URL or location URL could not be parsed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The shaped response could not be converted into the requested type.
    #[error("Could not decode response: {0}")]
    Deserialize(#[from] serde_json::Error),
}

/// Collection envelope used by list endpoints.
///
/// The platform wraps arrays as `{"count": N, "value": [...]}`. On-premises
/// servers answer the resource-area directory with `{"count": 0, "value": null}`,
/// so `value` is optional.
///
/// # Example
///
/// ```rust
/// use devops_client::api::common::ListResponse;
///
/// let json = r#"{"count": 2, "value": ["a", "b"]}"#;
/// let list: ListResponse<String> = serde_json::from_str(json).unwrap();
/// assert_eq!(list.into_values(), vec!["a".to_string(), "b".to_string()]);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListResponse<T> {
    /// Number of items the server reports.
    #[serde(default)]
    pub count: u32,

    /// The items, or `None` when the server sent `null`.
    pub value: Option<Vec<T>>,
}

impl<T> ListResponse<T> {
    /// Returns `true` if the envelope carries no items.
    pub fn is_empty(&self) -> bool {
        self.value.as_ref().map_or(true, Vec::is_empty)
    }

    /// Consumes the envelope and returns its items.
    pub fn into_values(self) -> Vec<T> {
        self.value.unwrap_or_default()
    }
}

/// A list reply that is either a bare JSON array or a `{count, value}` envelope.
///
/// Discovery endpoints answer with either form depending on the server version.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ListReply<T> {
    Bare(Vec<T>),
    Envelope(ListResponse<T>),
}

impl<T> ListReply<T> {
    /// Consumes the reply and returns its items.
    pub fn into_values(self) -> Vec<T> {
        match self {
            ListReply::Bare(items) => items,
            ListReply::Envelope(list) => list.into_values(),
        }
    }
}

impl<T> Default for ListResponse<T> {
    fn default() -> Self {
        Self {
            count: 0,
            value: None,
        }
    }
}
