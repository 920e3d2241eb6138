//
//  devops-client
//  api/routing.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Route Template Resolution
//!
//! Turns a logical resource (area + resource GUID or name + requested API version)
//! and its route/query parameters into a concrete request URL plus the API version
//! the server will actually honour.
//!
//! ## Resolution steps
//!
//! 1. Look up the [`ApiResourceLocation`] for the resource. Locations are discovered
//!    once per area with `OPTIONS {base}/_apis/{area}` and cached for the lifetime of
//!    the connection, or seeded up front from a static catalogue.
//! 2. Negotiate the API version against what the location advertises.
//! 3. Fill the location's route template from the route values.
//! 4. Append the query parameters, dropping the ones without a value.
//!
//! ## Example
//!
//! ```rust
//! use devops_client::api::routing::{resolve_route, ApiResourceLocation, RouteValues};
//! use devops_client::api::version::NumericVersion;
//!
//! let location = ApiResourceLocation {
//!     id: "0cd358e1-9217-4d94-8269-1c1ee6f93dcf".to_string(),
//!     area: "build".to_string(),
//!     resource_name: "builds".to_string(),
//!     route_template: "{project}/_apis/build/builds/{buildId}".to_string(),
//!     resource_version: 3,
//!     min_version: NumericVersion::new(1, 0),
//!     max_version: NumericVersion::new(4, 1),
//!     released_version: NumericVersion::new(4, 0),
//! };
//!
//! let values = RouteValues::new().with("project", "Fabrikam").with("buildId", 42);
//! let path = resolve_route(&location.route_template, &location, &values).unwrap();
//! assert_eq!(path.to_string(), "Fabrikam/_apis/build/builds/42");
//! ```

use std::fmt;
use std::sync::Arc;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};
use url::Url;

use super::cache::SingleFlight;
use super::common::{ApiError, ListReply};
use super::transport::Transport;
use super::version::{ApiVersion, NumericVersion, VersionStage};

/// Where and how a resource is served, as advertised by the server.
///
/// Deserialized from the entries of the service locations document:
///
/// ```json
/// {
///   "id": "0cd358e1-9217-4d94-8269-1c1ee6f93dcf",
///   "area": "build",
///   "resourceName": "builds",
///   "routeTemplate": "{project}/_apis/build/builds/{buildId}",
///   "resourceVersion": 3,
///   "minVersion": "1.0",
///   "maxVersion": "4.1",
///   "releasedVersion": "4.0"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResourceLocation {
    /// Resource GUID.
    pub id: String,
    /// Area (service family) name.
    pub area: String,
    /// Symbolic resource name.
    pub resource_name: String,
    /// Path template relative to the base URL.
    pub route_template: String,
    /// Current preview revision of the resource.
    #[serde(default)]
    pub resource_version: u32,
    /// Oldest version still served.
    #[serde(default)]
    pub min_version: NumericVersion,
    /// Newest version served, possibly still in preview.
    #[serde(default)]
    pub max_version: NumericVersion,
    /// Newest released version.
    #[serde(default)]
    pub released_version: NumericVersion,
}

impl ApiResourceLocation {
    /// Returns `true` if `key` names this location by GUID or resource name.
    pub fn matches(&self, key: &str) -> bool {
        self.id.eq_ignore_ascii_case(key) || self.resource_name.eq_ignore_ascii_case(key)
    }
}

/// Ordered route placeholder values.
///
/// A value can be explicitly omitted with [`with_optional`](Self::with_optional),
/// which drops the template segment holding that placeholder. A placeholder that is
/// never mentioned is an error.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RouteValues {
    values: Vec<(String, Option<String>)>,
}

impl RouteValues {
    /// Creates an empty set of route values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a value.
    pub fn with(mut self, name: &str, value: impl fmt::Display) -> Self {
        self.insert(name, Some(value.to_string()));
        self
    }

    /// Adds a value that may be absent. `None` drops the placeholder's segment.
    pub fn with_optional<T: fmt::Display>(mut self, name: &str, value: Option<T>) -> Self {
        self.insert(name, value.map(|v| v.to_string()));
        self
    }

    /// Sets a value, replacing any earlier one with the same name.
    pub fn insert(&mut self, name: &str, value: Option<String>) {
        match self.values.iter_mut().find(|(key, _)| key == name) {
            Some(entry) => entry.1 = value,
            None => self.values.push((name.to_string(), value)),
        }
    }

    /// Looks up a value. The outer `Option` is `None` when the name was never given.
    pub fn get(&self, name: &str) -> Option<Option<&str>> {
        self.values
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_deref())
    }

    /// Returns `true` if no value was given.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Ordered query parameters.
///
/// Keys whose value is `None` are kept here but never serialized. Lists must be
/// joined by the caller; [`with_list`](Self::with_list) does the usual comma join.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryParams {
    params: Vec<(String, Option<String>)>,
}

impl QueryParams {
    /// Creates an empty parameter list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a parameter.
    pub fn with(mut self, key: &str, value: impl fmt::Display) -> Self {
        self.params.push((key.to_string(), Some(value.to_string())));
        self
    }

    /// Adds a parameter that may be absent.
    pub fn with_optional<T: fmt::Display>(mut self, key: &str, value: Option<T>) -> Self {
        self.params
            .push((key.to_string(), value.map(|v| v.to_string())));
        self
    }

    /// Adds a comma-joined list. An empty list counts as absent.
    pub fn with_list<T: fmt::Display>(mut self, key: &str, values: &[T]) -> Self {
        let joined = (!values.is_empty()).then(|| {
            values
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(",")
        });
        self.params.push((key.to_string(), joined));
        self
    }

    /// Parameters that carry a value, in insertion order.
    pub fn present(&self) -> impl Iterator<Item = (&str, &str)> {
        self.params
            .iter()
            .filter_map(|(key, value)| value.as_deref().map(|v| (key.as_str(), v)))
    }

    /// Returns `true` if no parameter carries a value.
    pub fn is_empty(&self) -> bool {
        self.present().next().is_none()
    }
}

/// A filled route template, as unencoded path segments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePath {
    segments: Vec<String>,
}

impl RoutePath {
    /// Builds a path from literal segments.
    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }

    /// The path segments, before percent-encoding.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }
}

impl fmt::Display for RoutePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("/"))
    }
}

/// Everything needed to resolve one call.
#[derive(Debug, Clone, Default)]
pub struct ResourceVersionRequest {
    /// Area name, e.g. `build`.
    pub area: String,
    /// Resource GUID or symbolic name.
    pub resource: String,
    /// Requested API version token. `None` asks for the newest the server offers.
    pub api_version: Option<String>,
    /// Route placeholder values.
    pub route_values: RouteValues,
    /// Query parameters.
    pub query: QueryParams,
}

impl ResourceVersionRequest {
    /// Creates a request for `resource` within `area`.
    pub fn new(area: &str, resource: &str) -> Self {
        Self {
            area: area.to_string(),
            resource: resource.to_string(),
            ..Self::default()
        }
    }

    /// Sets the requested API version.
    pub fn api_version(mut self, version: &str) -> Self {
        self.api_version = Some(version.to_string());
        self
    }

    /// Sets the route values.
    pub fn route_values(mut self, route_values: RouteValues) -> Self {
        self.route_values = route_values;
        self
    }

    /// Sets the query parameters.
    pub fn query(mut self, query: QueryParams) -> Self {
        self.query = query;
        self
    }
}

/// The outcome of resolution: where to send the call, and with which version.
#[derive(Debug, Clone, PartialEq)]
pub struct VersioningData {
    /// Absolute request URL, query string included.
    pub request_url: Url,
    /// The negotiated API version. Send this one, not the requested one.
    pub api_version: ApiVersion,
}

/// Fills a route template.
///
/// Placeholders are `{name}` or `{*name}` (wildcard, whose value may span several
/// segments). `area` and `resource` are supplied from `location` when the caller did
/// not give them. A segment whose placeholder was explicitly omitted is dropped.
///
/// # Errors
///
/// Returns [`ApiError::RouteResolution`] naming every placeholder without a value.
pub fn resolve_route(
    template: &str,
    location: &ApiResourceLocation,
    route_values: &RouteValues,
) -> Result<RoutePath, ApiError> {
    let mut segments = Vec::new();
    let mut missing = Vec::new();

    for raw_segment in template.split('/').filter(|s| !s.is_empty()) {
        let mut segment = String::new();
        let mut omitted = false;
        let mut wildcard = false;
        let mut rest = raw_segment;

        while let Some(start) = rest.find('{') {
            let Some(len) = rest[start..].find('}') else {
                break;
            };
            segment.push_str(&rest[..start]);

            let token = &rest[start + 1..start + len];
            let name = token.trim_start_matches('*');
            wildcard |= token.starts_with('*');

            match lookup(name, location, route_values) {
                Some(Some(value)) => segment.push_str(&value),
                Some(None) => omitted = true,
                None => missing.push(name.to_string()),
            }

            rest = &rest[start + len + 1..];
        }
        segment.push_str(rest);

        if omitted {
            continue;
        }
        if wildcard {
            segments.extend(
                segment
                    .split('/')
                    .filter(|s| !s.is_empty())
                    .map(str::to_string),
            );
        } else {
            segments.push(segment);
        }
    }

    if !missing.is_empty() {
        return Err(ApiError::RouteResolution {
            template: template.to_string(),
            missing,
        });
    }

    Ok(RoutePath { segments })
}

fn lookup(
    name: &str,
    location: &ApiResourceLocation,
    route_values: &RouteValues,
) -> Option<Option<String>> {
    if let Some(value) = route_values.get(name) {
        return Some(value.map(str::to_string));
    }

    match name {
        "area" => Some(Some(location.area.clone())),
        "resource" => Some(Some(location.resource_name.clone())),
        _ => None,
    }
}

/// Picks the API version to send for `location`.
///
/// | Requested | Result |
/// |-----------|--------|
/// | nothing | newest the server offers |
/// | below `minVersion` | [`ApiError::UnsupportedApiVersion`] |
/// | at or below `releasedVersion` | as requested |
/// | preview up to `maxVersion`, revision within `resourceVersion` | as requested |
/// | preview with a revision above `resourceVersion` | revision clamped |
/// | above `maxVersion` | newest the server offers |
///
/// The newest version is `maxVersion` when it is released, otherwise
/// `maxVersion-preview.resourceVersion`. Negotiating an already negotiated version
/// returns it unchanged.
///
/// # Errors
///
/// Returns [`ApiError::UnsupportedApiVersion`] when the request predates the oldest
/// version the server still serves.
pub fn negotiate(
    location: &ApiResourceLocation,
    requested: Option<ApiVersion>,
) -> Result<ApiVersion, ApiError> {
    let max = location.max_version;
    let newest = if max > location.released_version {
        ApiVersion::preview(max.major, max.minor, Some(location.resource_version))
    } else {
        ApiVersion::released(max.major, max.minor)
    };

    let Some(requested) = requested else {
        return Ok(newest);
    };
    let numeric = requested.numeric();

    if numeric < location.min_version {
        return Err(ApiError::UnsupportedApiVersion {
            resource: location.resource_name.clone(),
            requested: requested.to_string(),
            minimum: location.min_version.to_string(),
        });
    }

    if numeric <= location.released_version {
        return Ok(requested);
    }

    if numeric <= max {
        match requested.stage {
            VersionStage::Preview(None) => return Ok(requested),
            VersionStage::Preview(Some(revision))
                if revision <= location.resource_version =>
            {
                return Ok(requested)
            }
            _ => {}
        }
    }

    if numeric < max {
        return Ok(ApiVersion::preview(numeric.major, numeric.minor, None));
    }

    Ok(newest)
}

/// Joins a base URL, a filled route and query parameters.
///
/// Path segments are percent-encoded. Query parameters without a value are left out.
///
/// # Errors
///
/// Returns [`ApiError::InvalidUrl`] when `base` cannot carry a path.
pub fn build_url(base: &Url, path: &RoutePath, query: &QueryParams) -> Result<Url, ApiError> {
    let mut url = base.clone();
    url.set_query(None);
    url.set_fragment(None);

    {
        let mut segments = url
            .path_segments_mut()
            .map_err(|_| ApiError::InvalidUrl(url::ParseError::RelativeUrlWithCannotBeABaseBase))?;
        segments.pop_if_empty();
        segments.extend(path.segments());
    }

    if !query.is_empty() {
        let mut pairs = url.query_pairs_mut();
        for (key, value) in query.present() {
            pairs.append_pair(key, value);
        }
    }

    Ok(url)
}

/// Per-connection cache of resource locations.
///
/// Discovered locations are keyed by host and area, since one connection may hand
/// the cache to clients redirected to different hosts. Each pair is discovered at
/// most once: concurrent first callers share one `OPTIONS` round-trip. A failed
/// discovery is not cached.
#[derive(Default)]
pub struct LocationCache {
    discovered: SingleFlight<(String, String), Arc<Vec<ApiResourceLocation>>>,
    seeded: SingleFlight<String, Arc<Vec<ApiResourceLocation>>>,
}

impl LocationCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the locations of an area from a static catalogue.
    ///
    /// A seeded area is served from the catalogue on every host and is never
    /// discovered.
    pub fn seed(&self, area: &str, locations: Vec<ApiResourceLocation>) {
        self.seeded.insert(area.to_lowercase(), Arc::new(locations));
    }

    /// Returns every location of `area` on `base`, discovering them on first use.
    pub async fn locations(
        &self,
        transport: &dyn Transport,
        base: &Url,
        area: &str,
    ) -> Result<Arc<Vec<ApiResourceLocation>>, ApiError> {
        let area_key = area.to_lowercase();
        if let Some(locations) = self.seeded.get(&area_key) {
            return Ok(locations);
        }

        self.discovered
            .get_or_try_init((base.as_str().to_string(), area_key), || {
                discover(transport, base, area)
            })
            .await
    }

    /// Finds the location serving `resource` (GUID or name) within `area`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::LocationNotFound`] when the area has no such resource.
    pub async fn find(
        &self,
        transport: &dyn Transport,
        base: &Url,
        area: &str,
        resource: &str,
    ) -> Result<ApiResourceLocation, ApiError> {
        let locations = self.locations(transport, base, area).await?;

        locations
            .iter()
            .find(|location| location.matches(resource))
            .cloned()
            .ok_or_else(|| ApiError::LocationNotFound {
                area: area.to_string(),
                resource: resource.to_string(),
            })
    }

    /// Resolves a request into a URL and a negotiated API version.
    ///
    /// The requested version is validated before any network call is made.
    pub async fn resolve(
        &self,
        transport: &dyn Transport,
        base: &Url,
        request: &ResourceVersionRequest,
    ) -> Result<VersioningData, ApiError> {
        let requested = request
            .api_version
            .as_deref()
            .map(ApiVersion::parse)
            .transpose()?;

        let location = self
            .find(transport, base, &request.area, &request.resource)
            .await?;
        let api_version = negotiate(&location, requested)?;
        let path = resolve_route(&location.route_template, &location, &request.route_values)?;
        let request_url = build_url(base, &path, &request.query)?;

        trace!(
            "Resolved {}/{} to {} (api-version {})",
            request.area,
            request.resource,
            request_url,
            api_version
        );

        Ok(VersioningData {
            request_url,
            api_version,
        })
    }
}

async fn discover(
    transport: &dyn Transport,
    base: &Url,
    area: &str,
) -> Result<Arc<Vec<ApiResourceLocation>>, ApiError> {
    let url = build_url(
        base,
        &RoutePath::from_segments(["_apis", area]),
        &QueryParams::new(),
    )?;
    debug!("Discovering resource locations: OPTIONS {}", url);

    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

    let response = transport.options(url, headers).await?;
    let locations = match response.body {
        Some(body) => serde_json::from_value::<ListReply<ApiResourceLocation>>(body)?.into_values(),
        None => Vec::new(),
    };

    debug!("Area '{}' has {} resource locations", area, locations.len());
    Ok(Arc::new(locations))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::transport::{HttpTransport, TransportError, TransportRequest, TransportResponse};
    use async_trait::async_trait;

    const BUILDS_ID: &str = "0cd358e1-9217-4d94-8269-1c1ee6f93dcf";

    fn builds_location() -> ApiResourceLocation {
        ApiResourceLocation {
            id: BUILDS_ID.to_string(),
            area: "build".to_string(),
            resource_name: "builds".to_string(),
            route_template: "{project}/_apis/build/builds/{buildId}".to_string(),
            resource_version: 3,
            min_version: NumericVersion::new(2, 0),
            max_version: NumericVersion::new(4, 1),
            released_version: NumericVersion::new(4, 0),
        }
    }

    fn v(token: &str) -> ApiVersion {
        ApiVersion::parse(token).unwrap()
    }

    /// Fails every call; proves that resolution stayed offline.
    struct Offline;

    #[async_trait]
    impl Transport for Offline {
        async fn send(&self, request: TransportRequest) -> Result<TransportResponse, TransportError> {
            panic!("unexpected network call: {} {}", request.method, request.url)
        }
    }

    #[test]
    fn test_route_requires_every_placeholder() {
        let location = builds_location();
        let template = "{project}/_apis/{a}/{b}";

        let err = resolve_route(
            template,
            &location,
            &RouteValues::new().with("a", 1),
        )
        .unwrap_err();
        match err {
            ApiError::RouteResolution { missing, .. } => {
                assert_eq!(missing, vec!["project".to_string(), "b".to_string()])
            }
            other => panic!("unexpected error: {other:?}"),
        }

        let values = RouteValues::new()
            .with("project", "p")
            .with("a", 1)
            .with("b", 2)
            .with("unused", "ignored");
        let path = resolve_route(template, &location, &values).unwrap();
        assert_eq!(path.to_string(), "p/_apis/1/2");
    }

    #[test]
    fn test_route_fills_area_resource_and_omitted_segments() {
        let location = builds_location();
        let values = RouteValues::new()
            .with("project", "Fabrikam")
            .with_optional::<u32>("buildId", None);

        let path = resolve_route("{project}/_apis/{area}/{resource}/{buildId}", &location, &values)
            .unwrap();
        assert_eq!(path.to_string(), "Fabrikam/_apis/build/builds");
    }

    #[test]
    fn test_route_wildcard_spans_segments() {
        let location = builds_location();
        let values = RouteValues::new().with("path", "docs/readme.md");
        let path = resolve_route("_apis/items/{*path}", &location, &values).unwrap();
        assert_eq!(path.segments(), ["_apis", "items", "docs", "readme.md"]);
    }

    #[test]
    fn test_query_omits_absent_values() {
        let base: Url = "https://dev.azure.com/fabrikam".parse().unwrap();
        let query = QueryParams::new()
            .with_optional::<String>("x", None)
            .with("y", "v")
            .with_list("ids", &[1, 2, 3])
            .with_list::<u32>("empty", &[]);

        let url = build_url(&base, &RoutePath::from_segments(["_apis"]), &query).unwrap();
        let query_string = url.query().unwrap();
        assert_eq!(query_string, "y=v&ids=1%2C2%2C3");
        assert!(!query_string.contains("x"));
        assert!(!query_string.contains("empty"));

        let bare = build_url(&base, &RoutePath::from_segments(["_apis"]), &QueryParams::new())
            .unwrap();
        assert_eq!(bare.as_str(), "https://dev.azure.com/fabrikam/_apis");
    }

    #[test]
    fn test_build_url_encodes_segments() {
        let base: Url = "https://tfs.example.com/tfs/DefaultCollection/".parse().unwrap();
        let path = RoutePath::from_segments(["My Project", "_apis", "a/b"]);
        let url = build_url(&base, &path, &QueryParams::new()).unwrap();
        assert_eq!(
            url.path(),
            "/tfs/DefaultCollection/My%20Project/_apis/a%2Fb"
        );
    }

    #[test]
    fn test_negotiate_clamps_preview_revision() {
        let location = builds_location();

        let clamped = negotiate(&location, Some(v("4.1-preview.6"))).unwrap();
        assert_eq!(clamped, v("4.1-preview.3"));

        for lower in ["4.1-preview.6", "4.1-preview.5", "4.1-preview.4"] {
            assert_eq!(negotiate(&location, Some(v(lower))).unwrap(), clamped);
        }
        assert_eq!(negotiate(&location, Some(clamped)).unwrap(), clamped);
    }

    #[test]
    fn test_negotiate_rules() {
        let location = builds_location();

        assert_eq!(negotiate(&location, None).unwrap(), v("4.1-preview.3"));
        assert_eq!(negotiate(&location, Some(v("4.0"))).unwrap(), v("4.0"));
        assert_eq!(negotiate(&location, Some(v("3.2-preview.9"))).unwrap(), v("3.2-preview.9"));
        assert_eq!(negotiate(&location, Some(v("4.1-preview"))).unwrap(), v("4.1-preview"));
        assert_eq!(negotiate(&location, Some(v("4.1-preview.2"))).unwrap(), v("4.1-preview.2"));
        assert_eq!(negotiate(&location, Some(v("5.0"))).unwrap(), v("4.1-preview.3"));
        assert_eq!(negotiate(&location, Some(v("4.1"))).unwrap(), v("4.1-preview.3"));

        let err = negotiate(&location, Some(v("1.0"))).unwrap_err();
        assert!(matches!(err, ApiError::UnsupportedApiVersion { minimum, .. } if minimum == "2.0"));

        let mut released = builds_location();
        released.released_version = NumericVersion::new(4, 1);
        assert_eq!(negotiate(&released, None).unwrap(), v("4.1"));
        assert_eq!(negotiate(&released, Some(v("6.0-preview.1"))).unwrap(), v("4.1"));

        let mut wide = builds_location();
        wide.max_version = NumericVersion::new(5, 0);
        assert_eq!(negotiate(&wide, Some(v("4.1-preview.9"))).unwrap(), v("4.1-preview"));
    }

    #[tokio::test]
    async fn test_resolve_seeded_location_end_to_end() {
        let cache = LocationCache::new();
        cache.seed("build", vec![builds_location()]);

        let base: Url = "https://dev.azure.com/fabrikam".parse().unwrap();
        let request = ResourceVersionRequest::new("build", BUILDS_ID)
            .api_version("4.1-preview.3")
            .route_values(RouteValues::new().with("project", "Fabrikam").with("buildId", 42));

        let data = cache.resolve(&Offline, &base, &request).await.unwrap();
        assert!(data.request_url.path().ends_with("/Fabrikam/_apis/build/builds/42"));
        assert_eq!(data.api_version.to_string(), "4.1-preview.3");

        let again = cache.resolve(&Offline, &base, &request).await.unwrap();
        assert_eq!(again, data);
    }

    #[tokio::test]
    async fn test_resolve_validates_before_network() {
        let cache = LocationCache::new();
        let base: Url = "https://dev.azure.com/fabrikam".parse().unwrap();
        let request = ResourceVersionRequest::new("build", "builds").api_version("latest");

        let err = cache.resolve(&Offline, &base, &request).await.unwrap_err();
        assert!(matches!(err, ApiError::InvalidVersionFormat(_)));
    }

    #[tokio::test]
    async fn test_locations_discovered_once_per_area() {
        let mut server = mockito::Server::new_async().await;
        let body = serde_json::json!({
            "count": 1,
            "value": [serde_json::to_value(builds_location()).unwrap()]
        });
        let mock = server
            .mock("OPTIONS", "/_apis/build")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body.to_string())
            .expect(1)
            .create_async()
            .await;

        let transport = HttpTransport::new().unwrap();
        let base: Url = server.url().parse().unwrap();
        let cache = LocationCache::new();

        let by_name = cache.find(&transport, &base, "build", "Builds").await.unwrap();
        let by_id = cache.find(&transport, &base, "Build", BUILDS_ID).await.unwrap();
        assert_eq!(by_name, by_id);

        let err = cache
            .find(&transport, &base, "build", "definitions")
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::LocationNotFound { .. }));

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_locations_are_discovered_per_host() {
        let mut primary = mockito::Server::new_async().await;
        let mut redirected = mockito::Server::new_async().await;
        let body = serde_json::json!({
            "count": 1,
            "value": [serde_json::to_value(builds_location()).unwrap()]
        });
        let primary_mock = primary
            .mock("OPTIONS", "/_apis/build")
            .with_status(200)
            .with_body(body.to_string())
            .expect(1)
            .create_async()
            .await;
        let redirected_mock = redirected
            .mock("OPTIONS", "/_apis/build")
            .with_status(200)
            .with_body("[]")
            .expect(1)
            .create_async()
            .await;

        let transport = HttpTransport::new().unwrap();
        let cache = LocationCache::new();
        let primary_base: Url = primary.url().parse().unwrap();
        let redirected_base: Url = redirected.url().parse().unwrap();

        let found = cache
            .find(&transport, &primary_base, "build", "builds")
            .await
            .unwrap();
        assert_eq!(found.id, BUILDS_ID);

        let err = cache
            .find(&transport, &redirected_base, "build", "builds")
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::LocationNotFound { .. }));

        primary_mock.assert_async().await;
        redirected_mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_seeded_area_skips_discovery_on_any_host() {
        let cache = LocationCache::new();
        cache.seed("Build", vec![builds_location()]);

        for base in ["https://dev.azure.com/fabrikam", "https://vsrm.dev.azure.com/fabrikam"] {
            let base: Url = base.parse().unwrap();
            let locations = cache.locations(&Offline, &base, "build").await.unwrap();
            assert_eq!(locations.len(), 1);
        }
    }
}
