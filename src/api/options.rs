//
//  devops-client
//  api/options.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Request options builder.
//!
//! Produces the header side-table for one outgoing call. The negotiated API version
//! travels inside the media type, e.g. `application/json;api-version=4.1-preview.3`.
//! Options are built fresh per call and never cached.

use std::collections::BTreeMap;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, CONTENT_TYPE};

use super::common::ApiError;
use super::version::ApiVersion;

/// Default media type for JSON endpoints.
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Media type for JSON Patch bodies (work item updates).
pub const JSON_PATCH_CONTENT_TYPE: &str = "application/json-patch+json";

/// Header configuration for one call.
///
/// # Example
///
/// ```rust
/// use devops_client::api::options::RequestOptions;
///
/// let options = RequestOptions::build("application/json", "4.1-preview.3", None)?;
/// assert_eq!(options.accept_header(), "application/json;api-version=4.1-preview.3");
/// # Ok::<(), devops_client::api::common::ApiError>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RequestOptions {
    /// Media type the caller accepts.
    pub accept_content_type: String,
    /// Media type of the request body, if any.
    pub body_content_type: String,
    /// The validated API version.
    pub api_version: ApiVersion,
    /// Extra headers, sent verbatim.
    pub additional_headers: BTreeMap<String, String>,
}

impl RequestOptions {
    /// Builds options for one call.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidVersionFormat`] if `api_version` is malformed.
    pub fn build(
        accept_content_type: &str,
        api_version: &str,
        additional_headers: Option<BTreeMap<String, String>>,
    ) -> Result<Self, ApiError> {
        let api_version = ApiVersion::parse(api_version)?;
        Ok(Self::for_version(
            accept_content_type,
            api_version,
            additional_headers,
        ))
    }

    /// Builds options from an already validated version.
    pub fn for_version(
        accept_content_type: &str,
        api_version: ApiVersion,
        additional_headers: Option<BTreeMap<String, String>>,
    ) -> Self {
        Self {
            accept_content_type: accept_content_type.to_string(),
            body_content_type: JSON_CONTENT_TYPE.to_string(),
            api_version,
            additional_headers: additional_headers.unwrap_or_default(),
        }
    }

    /// Sets the media type used for request bodies.
    pub fn with_body_content_type(mut self, content_type: &str) -> Self {
        self.body_content_type = content_type.to_string();
        self
    }

    /// `Accept` header value with the API version embedded.
    pub fn accept_header(&self) -> String {
        format!("{};api-version={}", self.accept_content_type, self.api_version)
    }

    /// `Content-Type` header value with the API version embedded.
    pub fn content_type_header(&self) -> String {
        format!(
            "{}; charset=utf-8;api-version={}",
            self.body_content_type, self.api_version
        )
    }

    /// Converts the options into HTTP headers.
    ///
    /// `Content-Type` is only set when the request carries a body.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidHeader`] if an additional header has an invalid
    /// name or value.
    pub fn to_headers(&self, has_body: bool) -> Result<HeaderMap, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, header_value("Accept", &self.accept_header())?);

        if has_body {
            headers.insert(
                CONTENT_TYPE,
                header_value("Content-Type", &self.content_type_header())?,
            );
        }

        for (name, value) in &self.additional_headers {
            let header_name =
                HeaderName::from_bytes(name.as_bytes()).map_err(|_| ApiError::InvalidHeader {
                    name: name.clone(),
                })?;
            headers.insert(header_name, header_value(name, value)?);
        }

        Ok(headers)
    }
}

fn header_value(name: &str, value: &str) -> Result<HeaderValue, ApiError> {
    HeaderValue::from_str(value).map_err(|_| ApiError::InvalidHeader {
        name: name.to_string(),
    })
}
