//
//  devops-client
//  api/areas.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Resource-Area Redirection
//!
//! Some resource families are served from a different host than the one the
//! connection was created with (release management lives on `vsrm.dev.azure.com`,
//! for example). The organization publishes a directory of those hosts at
//! `GET {base}/_apis/resourceAreas`:
//!
//! ```json
//! {
//!   "count": 1,
//!   "value": [
//!     {
//!       "id": "efc2f575-36ef-48e9-b672-0c6fb4a48ac5",
//!       "name": "Release",
//!       "locationUrl": "https://vsrm.dev.azure.com/fabrikam/"
//!     }
//!   ]
//! }
//! ```
//!
//! Some servers send the entries as a bare array instead of the envelope. On-premises
//! servers answer with `{"count": 0, "value": null}`: everything lives on the original
//! base URL.
//!
//! ## Caching
//!
//! The directory is fetched once per connection, and each resource area id is
//! answered once. Concurrent first-time callers for the same id share a single
//! in-flight lookup. Failures are not cached.

use std::sync::Arc;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use super::cache::SingleFlight;
use super::common::{ApiError, ListReply};
use super::routing::{build_url, QueryParams, RoutePath};
use super::transport::Transport;

/// One entry of the resource-area directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceAreaInfo {
    /// Resource area GUID.
    pub id: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Base URL serving this resource area.
    pub location_url: String,
}

/// Per-connection resource-area lookup cache.
#[derive(Default)]
pub struct ResourceAreaCache {
    directory: SingleFlight<String, Arc<Vec<ResourceAreaInfo>>>,
    areas: SingleFlight<String, Url>,
}

impl ResourceAreaCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the base URL that serves `resource_area_id`.
    ///
    /// # Returns
    ///
    /// - `base` itself when the directory is empty (on-premises)
    /// - the matching entry's `locationUrl` otherwise
    ///
    /// # Errors
    ///
    /// - [`ApiError::ResourceAreaNotFound`] if the directory is non-empty but has no
    ///   entry for the id
    /// - [`ApiError::Transport`] if the directory call fails
    pub async fn base_url_for(
        &self,
        transport: &dyn Transport,
        base: &Url,
        resource_area_id: &str,
    ) -> Result<Url, ApiError> {
        self.areas
            .get_or_try_init(resource_area_id.to_lowercase(), || async {
                let directory = self.directory(transport, base).await?;
                select_base_url(&directory, base, resource_area_id)
            })
            .await
    }

    /// Number of resource areas answered so far.
    pub fn resolved_areas(&self) -> usize {
        self.areas.len()
    }

    async fn directory(
        &self,
        transport: &dyn Transport,
        base: &Url,
    ) -> Result<Arc<Vec<ResourceAreaInfo>>, ApiError> {
        self.directory
            .get_or_try_init(base.as_str().to_string(), || fetch_directory(transport, base))
            .await
    }
}

fn select_base_url(
    directory: &[ResourceAreaInfo],
    base: &Url,
    resource_area_id: &str,
) -> Result<Url, ApiError> {
    if directory.is_empty() {
        debug!("Empty resource area directory, staying on {}", base);
        return Ok(base.clone());
    }

    let entry = directory
        .iter()
        .find(|area| area.id.eq_ignore_ascii_case(resource_area_id))
        .ok_or_else(|| ApiError::ResourceAreaNotFound {
            resource_area_id: resource_area_id.to_string(),
            base_url: base.to_string(),
        })?;

    let url = Url::parse(&entry.location_url)?;
    debug!("Resource area {} ({}) is served from {}", entry.name, entry.id, url);
    Ok(url)
}

async fn fetch_directory(
    transport: &dyn Transport,
    base: &Url,
) -> Result<Arc<Vec<ResourceAreaInfo>>, ApiError> {
    let url = build_url(
        base,
        &RoutePath::from_segments(["_apis", "resourceAreas"]),
        &QueryParams::new(),
    )?;
    debug!("Fetching resource area directory: GET {}", url);

    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

    let response = transport.get(url, headers).await?;
    let areas = match response.body {
        Some(body) => serde_json::from_value::<ListReply<ResourceAreaInfo>>(body)?.into_values(),
        None => Vec::new(),
    };

    Ok(Arc::new(areas))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::transport::HttpTransport;

    const RELEASE_AREA: &str = "efc2f575-36ef-48e9-b672-0c6fb4a48ac5";

    #[tokio::test]
    async fn test_concurrent_lookups_make_one_directory_call() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/_apis/resourceAreas")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(format!(
                r#"{{"count": 1, "value": [{{"id": "{}", "name": "Release", "locationUrl": "https://vsrm.example.com/fabrikam/"}}]}}"#,
                RELEASE_AREA.to_uppercase()
            ))
            .expect(1)
            .create_async()
            .await;

        let cache = Arc::new(ResourceAreaCache::new());
        let transport = Arc::new(HttpTransport::new().unwrap());
        let base: Url = server.url().parse().unwrap();

        let mut handles = Vec::new();
        for _ in 0..50 {
            let cache = Arc::clone(&cache);
            let transport = Arc::clone(&transport);
            let base = base.clone();
            handles.push(tokio::spawn(async move {
                cache
                    .base_url_for(transport.as_ref(), &base, RELEASE_AREA)
                    .await
            }));
        }

        for handle in handles {
            let url = handle.await.unwrap().unwrap();
            assert_eq!(url.as_str(), "https://vsrm.example.com/fabrikam/");
        }
        assert_eq!(cache.resolved_areas(), 1);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_bare_array_directory_redirects() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/_apis/resourceAreas")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(format!(
                r#"[{{"id": "{}", "locationUrl": "https://vsrm.example.com/fabrikam/"}}]"#,
                RELEASE_AREA
            ))
            .create_async()
            .await;

        let cache = ResourceAreaCache::new();
        let transport = HttpTransport::new().unwrap();
        let base: Url = server.url().parse().unwrap();

        let url = cache
            .base_url_for(&transport, &base, RELEASE_AREA)
            .await
            .unwrap();
        assert_eq!(url.as_str(), "https://vsrm.example.com/fabrikam/");
    }

    #[tokio::test]
    async fn test_on_premises_directory_keeps_base() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/tfs/DefaultCollection/_apis/resourceAreas")
            .with_status(200)
            .with_body(r#"{"count": 0, "value": null}"#)
            .create_async()
            .await;

        let cache = ResourceAreaCache::new();
        let transport = HttpTransport::new().unwrap();
        let base: Url = format!("{}/tfs/DefaultCollection", server.url()).parse().unwrap();

        let url = cache
            .base_url_for(&transport, &base, RELEASE_AREA)
            .await
            .unwrap();
        assert_eq!(url, base);
    }

    #[tokio::test]
    async fn test_unknown_area_is_an_error_and_not_cached() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/_apis/resourceAreas")
            .with_status(200)
            .with_body(r#"{"count": 1, "value": [{"id": "other", "locationUrl": "https://x.example.com/"}]}"#)
            .expect(1)
            .create_async()
            .await;

        let cache = ResourceAreaCache::new();
        let transport = HttpTransport::new().unwrap();
        let base: Url = server.url().parse().unwrap();

        for _ in 0..2 {
            let err = cache
                .base_url_for(&transport, &base, RELEASE_AREA)
                .await
                .unwrap_err();
            assert!(matches!(
                err,
                ApiError::ResourceAreaNotFound { resource_area_id, .. } if resource_area_id == RELEASE_AREA
            ));
        }
        assert_eq!(cache.resolved_areas(), 0);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_directory_failure_propagates_unchanged() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/_apis/resourceAreas")
            .with_status(401)
            .with_body(r#"{"message": "TF400813: not authorized"}"#)
            .create_async()
            .await;

        let cache = ResourceAreaCache::new();
        let transport = HttpTransport::new().unwrap();
        let base: Url = server.url().parse().unwrap();

        let err = cache
            .base_url_for(&transport, &base, RELEASE_AREA)
            .await
            .unwrap_err();
        match err {
            ApiError::Transport(inner) => assert_eq!(inner.status_code(), Some(401)),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
