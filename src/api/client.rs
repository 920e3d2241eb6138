//
//  devops-client
//  api/client.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Typed Resource Client
//!
//! This module provides the connection object and the per-area resource client that
//! every endpoint family is built on.
//!
//! ## Call pipeline
//!
//! Every call runs the same four steps, in this order, and stops at the first error:
//!
//! 1. **Resolve** the route template and negotiate the API version
//! 2. **Build** the request headers with the negotiated version embedded
//! 3. **Send** exactly one request through the transport
//! 4. **Shape** the response per the declared type descriptor
//!
//! Errors from any step reach the caller unchanged. Nothing is retried here.
//!
//! ## Shared state
//!
//! A [`Connection`] owns two caches: the resource-area directory and the per-area
//! resource locations. Both live exactly as long as the connection; two connections
//! never share them.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use devops_client::api::client::{Connection, ResourceArea, ResponseShape};
//! use devops_client::api::routing::RouteValues;
//! use devops_client::api::transport::HttpTransport;
//! use devops_client::auth::AuthCredential;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let transport = HttpTransport::new()?.with_auth(AuthCredential::pat("my-token"));
//! let connection = Connection::new("https://dev.azure.com/fabrikam", Arc::new(transport))?;
//!
//! let client = connection.resource_client(&ResourceArea::new("build")).await?;
//! let request = client
//!     .request("builds")
//!     .api_version("4.1")
//!     .route_values(RouteValues::new().with("project", "Fabrikam").with("buildId", 42));
//!
//! let build = client.get(request, ResponseShape::RAW).await?;
//! println!("{}", build.into_json());
//! # Ok(())
//! # }
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;
use url::Url;

use super::areas::ResourceAreaCache;
use super::common::ApiError;
use super::options::{RequestOptions, JSON_CONTENT_TYPE};
use super::routing::{ApiResourceLocation, LocationCache, ResourceVersionRequest};
use super::shaping::{shape, ShapedValue, TypeDescriptor};
use super::transport::{HttpTransport, Transport, TransportRequest};
use crate::auth::AuthCredential;

/// A resource family: its area name and, when it may live on another host, its
/// resource area GUID.
///
/// # Example
///
/// ```rust
/// use devops_client::api::client::ResourceArea;
///
/// let release = ResourceArea::new("release").with_id("efc2f575-36ef-48e9-b672-0c6fb4a48ac5");
/// assert_eq!(release.name, "release");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceArea {
    /// Area name, e.g. `build`.
    pub name: String,
    /// Resource area GUID used for host redirection.
    pub id: Option<String>,
}

impl ResourceArea {
    /// Creates an area served from the connection's own base URL.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            id: None,
        }
    }

    /// Sets the resource area GUID, enabling host redirection.
    pub fn with_id(mut self, id: &str) -> Self {
        self.id = Some(id.to_string());
        self
    }
}

/// How a response is shaped: which descriptor applies, and whether it is a list.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResponseShape {
    /// Descriptor to apply. `None` returns the response unchanged.
    pub descriptor: Option<&'static TypeDescriptor>,
    /// Whether the response is a collection.
    pub is_collection: bool,
}

impl ResponseShape {
    /// No shaping at all.
    pub const RAW: Self = Self {
        descriptor: None,
        is_collection: false,
    };

    /// A single record described by `descriptor`.
    pub const fn record(descriptor: &'static TypeDescriptor) -> Self {
        Self {
            descriptor: Some(descriptor),
            is_collection: false,
        }
    }

    /// A collection whose elements are described by `descriptor`.
    pub const fn collection(descriptor: &'static TypeDescriptor) -> Self {
        Self {
            descriptor: Some(descriptor),
            is_collection: true,
        }
    }
}

/// A connection to one organization or collection.
///
/// # Fields
///
/// * `base_url` - The organization/collection URL every call starts from
/// * `transport` - The HTTP collaborator, with credentials already attached
/// * `locations` - Resource locations discovered so far, per area
/// * `areas` - Resource-area directory answers
pub struct Connection {
    base_url: Url,
    transport: Arc<dyn Transport>,
    locations: Arc<LocationCache>,
    areas: ResourceAreaCache,
}

impl Connection {
    /// Creates a connection over an existing transport.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidUrl`] if `base_url` is not an absolute URL.
    pub fn new(base_url: &str, transport: Arc<dyn Transport>) -> Result<Self, ApiError> {
        Ok(Self {
            base_url: Url::parse(base_url.trim())?,
            transport,
            locations: Arc::new(LocationCache::new()),
            areas: ResourceAreaCache::new(),
        })
    }

    /// Creates a connection over a reqwest transport.
    ///
    /// # Parameters
    ///
    /// * `base_url` - Organization or collection URL
    /// * `credential` - Credentials attached to every request, if any
    /// * `timeout` - Per-request timeout enforced by the transport, if any
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use std::time::Duration;
    /// use devops_client::api::client::Connection;
    /// use devops_client::auth::AuthCredential;
    ///
    /// let connection = Connection::connect(
    ///     "https://dev.azure.com/fabrikam",
    ///     Some(AuthCredential::pat("my-token")),
    ///     Some(Duration::from_secs(30)),
    /// )?;
    /// # Ok::<(), anyhow::Error>(())
    /// ```
    pub fn connect(
        base_url: &str,
        credential: Option<AuthCredential>,
        timeout: Option<Duration>,
    ) -> Result<Self, ApiError> {
        let mut transport = match timeout {
            Some(timeout) => HttpTransport::with_timeout(timeout)?,
            None => HttpTransport::new()?,
        };
        if let Some(credential) = credential {
            transport = transport.with_auth(credential);
        }

        Self::new(base_url, Arc::new(transport))
    }

    /// The URL this connection was created with.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Seeds the locations of `area` from a static catalogue, skipping discovery.
    pub fn seed_locations(&self, area: &str, locations: Vec<ApiResourceLocation>) {
        self.locations.seed(area, locations);
    }

    /// Returns a client for one resource family.
    ///
    /// When the area carries a GUID, the resource-area directory decides which host
    /// serves it. The directory is consulted at most once per GUID.
    ///
    /// # Errors
    ///
    /// - [`ApiError::ResourceAreaNotFound`] if the directory has no entry for the area
    /// - [`ApiError::Transport`] if the directory call fails
    pub async fn resource_client(&self, area: &ResourceArea) -> Result<ResourceClient, ApiError> {
        let base_url = match &area.id {
            Some(id) => {
                self.areas
                    .base_url_for(self.transport.as_ref(), &self.base_url, id)
                    .await?
            }
            None => self.base_url.clone(),
        };

        debug!("Client for area '{}' uses {}", area.name, base_url);

        Ok(ResourceClient {
            base_url,
            area: area.name.clone(),
            transport: Arc::clone(&self.transport),
            locations: Arc::clone(&self.locations),
            accept: JSON_CONTENT_TYPE.to_string(),
            body_content_type: JSON_CONTENT_TYPE.to_string(),
            headers: BTreeMap::new(),
        })
    }
}

/// Issues versioned calls against one resource family.
///
/// Cheap to clone; clones share the connection's transport and caches.
#[derive(Clone)]
pub struct ResourceClient {
    base_url: Url,
    area: String,
    transport: Arc<dyn Transport>,
    locations: Arc<LocationCache>,
    accept: String,
    body_content_type: String,
    headers: BTreeMap<String, String>,
}

impl ResourceClient {
    /// The effective base URL after resource-area redirection.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The area this client serves.
    pub fn area(&self) -> &str {
        &self.area
    }

    /// Sets the media type used for request bodies (e.g. JSON Patch).
    pub fn with_body_content_type(mut self, content_type: &str) -> Self {
        self.body_content_type = content_type.to_string();
        self
    }

    /// Sets the accepted media type.
    pub fn with_accept(mut self, content_type: &str) -> Self {
        self.accept = content_type.to_string();
        self
    }

    /// Adds a header sent with every call.
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.insert(name.to_string(), value.to_string());
        self
    }

    /// Starts a request for `resource` (GUID or name) in this client's area.
    pub fn request(&self, resource: &str) -> ResourceVersionRequest {
        ResourceVersionRequest::new(&self.area, resource)
    }

    /// Sends a GET request.
    pub async fn get(
        &self,
        request: ResourceVersionRequest,
        shape: ResponseShape,
    ) -> Result<ShapedValue, ApiError> {
        self.send(Method::GET, request, None, shape).await
    }

    /// Sends a POST request with a JSON body.
    pub async fn create<B: Serialize + ?Sized>(
        &self,
        request: ResourceVersionRequest,
        body: &B,
        shape: ResponseShape,
    ) -> Result<ShapedValue, ApiError> {
        let body = serde_json::to_value(body)?;
        self.send(Method::POST, request, Some(body), shape).await
    }

    /// Sends a PATCH request with a JSON body.
    pub async fn update<B: Serialize + ?Sized>(
        &self,
        request: ResourceVersionRequest,
        body: &B,
        shape: ResponseShape,
    ) -> Result<ShapedValue, ApiError> {
        let body = serde_json::to_value(body)?;
        self.send(Method::PATCH, request, Some(body), shape).await
    }

    /// Sends a PUT request with a JSON body.
    pub async fn replace<B: Serialize + ?Sized>(
        &self,
        request: ResourceVersionRequest,
        body: &B,
        shape: ResponseShape,
    ) -> Result<ShapedValue, ApiError> {
        let body = serde_json::to_value(body)?;
        self.send(Method::PUT, request, Some(body), shape).await
    }

    /// Sends a DELETE request.
    pub async fn delete(
        &self,
        request: ResourceVersionRequest,
        shape: ResponseShape,
    ) -> Result<ShapedValue, ApiError> {
        self.send(Method::DELETE, request, None, shape).await
    }

    /// Runs the full pipeline for any verb.
    ///
    /// # Returns
    ///
    /// The shaped response. An empty response body yields [`ShapedValue::Null`].
    ///
    /// # Errors
    ///
    /// Whatever the failing step raised, unchanged:
    /// - resolution errors before any network call
    /// - [`ApiError::Transport`] for HTTP failures
    /// - shaping errors after a successful call
    pub async fn send(
        &self,
        method: Method,
        request: ResourceVersionRequest,
        body: Option<Value>,
        shape_as: ResponseShape,
    ) -> Result<ShapedValue, ApiError> {
        let resolved = self
            .locations
            .resolve(self.transport.as_ref(), &self.base_url, &request)
            .await?;

        let options = RequestOptions::for_version(
            &self.accept,
            resolved.api_version,
            Some(self.headers.clone()),
        )
        .with_body_content_type(&self.body_content_type);
        let headers = options.to_headers(body.is_some())?;

        debug!(
            "{} {} (api-version {})",
            method, resolved.request_url, resolved.api_version
        );

        let mut outbound = TransportRequest::new(method, resolved.request_url, headers);
        if let Some(body) = body {
            outbound = outbound.with_body(body);
        }
        let response = self.transport.send(outbound).await?;
        debug!("Response status: {}", response.status);

        let Some(raw) = response.body else {
            return Ok(ShapedValue::Null);
        };

        if let Some(descriptor) = shape_as.descriptor {
            debug!(
                "Shaping response as {}{}",
                descriptor.name,
                if shape_as.is_collection { "[]" } else { "" }
            );
        }
        shape(raw, shape_as.descriptor, shape_as.is_collection)
    }

    /// GET, deserialized into `T`.
    pub async fn get_typed<T: DeserializeOwned>(
        &self,
        request: ResourceVersionRequest,
        shape: ResponseShape,
    ) -> Result<T, ApiError> {
        self.get(request, shape).await?.into_typed()
    }

    /// POST, deserialized into `T`.
    pub async fn create_typed<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        request: ResourceVersionRequest,
        body: &B,
        shape: ResponseShape,
    ) -> Result<T, ApiError> {
        self.create(request, body, shape).await?.into_typed()
    }

    /// PATCH, deserialized into `T`.
    pub async fn update_typed<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        request: ResourceVersionRequest,
        body: &B,
        shape: ResponseShape,
    ) -> Result<T, ApiError> {
        self.update(request, body, shape).await?.into_typed()
    }

    /// PUT, deserialized into `T`.
    pub async fn replace_typed<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        request: ResourceVersionRequest,
        body: &B,
        shape: ResponseShape,
    ) -> Result<T, ApiError> {
        self.replace(request, body, shape).await?.into_typed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::routing::RouteValues;
    use crate::api::shaping::FieldKind;
    use crate::api::version::NumericVersion;
    use chrono::{TimeZone, Utc};
    use mockito::Matcher;
    use serde_json::json;

    const BUILDS_ID: &str = "0cd358e1-9217-4d94-8269-1c1ee6f93dcf";

    static BUILD: TypeDescriptor =
        TypeDescriptor::new("Build", &[("startTime", FieldKind::DateTime)]);

    fn builds_location() -> ApiResourceLocation {
        ApiResourceLocation {
            id: BUILDS_ID.to_string(),
            area: "build".to_string(),
            resource_name: "builds".to_string(),
            route_template: "{project}/_apis/build/builds/{buildId}".to_string(),
            resource_version: 4,
            min_version: NumericVersion::new(1, 0),
            max_version: NumericVersion::new(4, 1),
            released_version: NumericVersion::new(4, 0),
        }
    }

    fn locations_body() -> String {
        json!({"count": 1, "value": [builds_location()]}).to_string()
    }

    fn build_request(client: &ResourceClient, build_id: u32) -> ResourceVersionRequest {
        client
            .request(BUILDS_ID)
            .api_version("4.1-preview.3")
            .route_values(
                RouteValues::new()
                    .with("project", "Fabrikam")
                    .with("buildId", build_id),
            )
    }

    #[tokio::test]
    async fn test_get_resolves_sends_and_shapes() {
        let mut server = mockito::Server::new_async().await;
        let options = server
            .mock("OPTIONS", "/_apis/build")
            .with_status(200)
            .with_body(locations_body())
            .expect(1)
            .create_async()
            .await;
        let get = server
            .mock("GET", "/Fabrikam/_apis/build/builds/42")
            .match_header("accept", "application/json;api-version=4.1-preview.3")
            .with_status(200)
            .with_body(r#"{"id": 42, "status": "completed", "startTime": "2024-02-01T00:00:00Z"}"#)
            .expect(2)
            .create_async()
            .await;

        let connection = Connection::connect(&server.url(), None, None).unwrap();
        let client = connection
            .resource_client(&ResourceArea::new("build"))
            .await
            .unwrap();

        for _ in 0..2 {
            let build = client
                .get(build_request(&client, 42), ResponseShape::record(&BUILD))
                .await
                .unwrap();

            assert_eq!(build.get("id").unwrap().as_i64(), Some(42));
            assert_eq!(build.get("status").unwrap().as_str(), Some("completed"));
            assert_eq!(
                build.get("startTime").unwrap().as_datetime(),
                Some(&Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap())
            );
        }

        options.assert_async().await;
        get.assert_async().await;
    }

    #[tokio::test]
    async fn test_missing_route_value_makes_no_call() {
        let server = mockito::Server::new_async().await;
        let connection = Connection::connect(&server.url(), None, None).unwrap();
        connection.seed_locations("build", vec![builds_location()]);

        let client = connection
            .resource_client(&ResourceArea::new("build"))
            .await
            .unwrap();
        let request = client
            .request("builds")
            .route_values(RouteValues::new().with("project", "Fabrikam"));

        let err = client.get(request, ResponseShape::RAW).await.unwrap_err();
        assert!(matches!(
            err,
            ApiError::RouteResolution { missing, .. } if missing == vec!["buildId".to_string()]
        ));
    }

    #[tokio::test]
    async fn test_transport_error_is_not_reinterpreted() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/Fabrikam/_apis/build/builds/7")
            .with_status(404)
            .with_body(r#"{"message": "TF215016: build 7 does not exist"}"#)
            .create_async()
            .await;

        let connection = Connection::connect(&server.url(), None, None).unwrap();
        connection.seed_locations("build", vec![builds_location()]);
        let client = connection
            .resource_client(&ResourceArea::new("build"))
            .await
            .unwrap();

        let err = client
            .get(build_request(&client, 7), ResponseShape::record(&BUILD))
            .await
            .unwrap_err();
        match err {
            ApiError::Transport(inner) => {
                assert_eq!(inner.status_code(), Some(404));
                assert!(inner.to_string().contains("TF215016"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_custom_accept_keeps_negotiated_version() {
        let mut server = mockito::Server::new_async().await;
        let get = server
            .mock("GET", "/Fabrikam/_apis/build/builds/3")
            .match_header("accept", "application/zip;api-version=4.1-preview.3")
            .with_status(200)
            .with_body(r#"{"id": 3}"#)
            .create_async()
            .await;

        let connection = Connection::connect(&server.url(), None, None).unwrap();
        connection.seed_locations("build", vec![builds_location()]);
        let client = connection
            .resource_client(&ResourceArea::new("build"))
            .await
            .unwrap()
            .with_accept("application/zip");

        let value = client
            .get(build_request(&client, 3), ResponseShape::RAW)
            .await
            .unwrap();
        assert_eq!(value.get("id").unwrap().as_i64(), Some(3));
        get.assert_async().await;
    }

    #[tokio::test]
    async fn test_bad_date_fails_after_successful_call() {
        let mut server = mockito::Server::new_async().await;
        let get = server
            .mock("GET", "/Fabrikam/_apis/build/builds/1")
            .with_status(200)
            .with_body(r#"{"id": 1, "startTime": "soon"}"#)
            .create_async()
            .await;

        let connection = Connection::connect(&server.url(), None, None).unwrap();
        connection.seed_locations("build", vec![builds_location()]);
        let client = connection
            .resource_client(&ResourceArea::new("build"))
            .await
            .unwrap();

        let err = client
            .get(build_request(&client, 1), ResponseShape::record(&BUILD))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::DateParse { field, .. } if field == "startTime"));
        get.assert_async().await;
    }

    #[tokio::test]
    async fn test_create_sends_versioned_content_type_and_body() {
        let mut server = mockito::Server::new_async().await;
        let post = server
            .mock("POST", "/Fabrikam/_apis/build/builds")
            .match_query(Matcher::UrlEncoded("ignoreWarnings".into(), "true".into()))
            .match_header(
                "content-type",
                "application/json; charset=utf-8;api-version=4.1-preview.3",
            )
            .match_header("x-tfs-fedauthredirect", "Suppress")
            .match_body(Matcher::Json(json!({"definition": {"id": 5}})))
            .with_status(200)
            .with_body(r#"{"id": 99, "startTime": null}"#)
            .create_async()
            .await;

        let connection = Connection::connect(&server.url(), None, None).unwrap();
        connection.seed_locations("build", vec![builds_location()]);
        let client = connection
            .resource_client(&ResourceArea::new("build"))
            .await
            .unwrap()
            .with_header("X-TFS-FedAuthRedirect", "Suppress");

        let request = client
            .request("builds")
            .api_version("4.1-preview.3")
            .route_values(
                RouteValues::new()
                    .with("project", "Fabrikam")
                    .with_optional::<u32>("buildId", None),
            )
            .query(crate::api::routing::QueryParams::new().with("ignoreWarnings", true));

        #[derive(serde::Deserialize)]
        struct Queued {
            id: u32,
        }

        let queued: Queued = client
            .create_typed(
                request,
                &json!({"definition": {"id": 5}}),
                ResponseShape::record(&BUILD),
            )
            .await
            .unwrap();
        assert_eq!(queued.id, 99);
        post.assert_async().await;
    }

    #[tokio::test]
    async fn test_resource_area_redirects_to_other_host() {
        let mut directory = mockito::Server::new_async().await;
        let mut release_host = mockito::Server::new_async().await;

        let area_id = "efc2f575-36ef-48e9-b672-0c6fb4a48ac5";
        let lookup = directory
            .mock("GET", "/_apis/resourceAreas")
            .with_status(200)
            .with_body(
                json!({
                    "count": 1,
                    "value": [{"id": area_id, "name": "Release", "locationUrl": format!("{}/", release_host.url())}]
                })
                .to_string(),
            )
            .expect(1)
            .create_async()
            .await;
        release_host
            .mock("DELETE", "/Fabrikam/_apis/build/builds/3")
            .with_status(204)
            .create_async()
            .await;

        let connection = Connection::connect(&directory.url(), None, None).unwrap();
        connection.seed_locations("build", vec![builds_location()]);
        let area = ResourceArea::new("build").with_id(area_id);

        let client = connection.resource_client(&area).await.unwrap();
        let again = connection.resource_client(&area).await.unwrap();
        assert_eq!(client.base_url(), again.base_url());
        assert_eq!(client.base_url().as_str(), format!("{}/", release_host.url()));

        let deleted = client
            .delete(build_request(&client, 3), ResponseShape::RAW)
            .await
            .unwrap();
        assert_eq!(deleted, ShapedValue::Null);
        lookup.assert_async().await;
    }
}
