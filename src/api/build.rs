//
//  devops-client
//  api/build.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Build API
//!
//! Endpoint family for builds. Each method pins its resource GUID, API version,
//! route values, query keys and response descriptor, then hands off to the
//! [`ResourceClient`] pipeline.
//!
//! ## Example
//!
//! ```rust,no_run
//! use devops_client::api::build::{BuildApi, BuildQuery};
//! use devops_client::api::client::Connection;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let connection = Connection::connect("https://dev.azure.com/fabrikam", None, None)?;
//! let builds = BuildApi::new(&connection).await?;
//!
//! for build in builds.get_builds("Fabrikam", &BuildQuery::default().top(10)).await? {
//!     println!("#{} {}", build.id, build.build_number.unwrap_or_default());
//! }
//! # Ok(())
//! # }
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::client::{Connection, ResourceArea, ResourceClient, ResponseShape};
use super::common::ApiError;
use super::descriptors::BUILD;
use super::routing::{ApiResourceLocation, QueryParams, RouteValues};
use super::version::NumericVersion;

/// Area name of the build service.
pub const BUILD_AREA: &str = "build";

/// Resource area GUID of the build service.
pub const BUILD_AREA_ID: &str = "5d6898bb-45ec-463f-95f9-54d49c71752e";

const BUILDS_LOCATION_ID: &str = "0cd358e1-9217-4d94-8269-1c1ee6f93dcf";

const API_VERSION: &str = "4.1";

/// Lifecycle state of a build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BuildStatus {
    None,
    InProgress,
    Completed,
    Cancelling,
    Postponed,
    NotStarted,
    #[serde(other)]
    Unknown,
}

/// Outcome of a completed build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BuildResult {
    None,
    Succeeded,
    PartiallySucceeded,
    Failed,
    Canceled,
    #[serde(other)]
    Unknown,
}

/// Reference to a build definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DefinitionReference {
    /// Definition id.
    pub id: u32,
    /// Definition name.
    #[serde(default)]
    pub name: Option<String>,
    /// Folder path of the definition, e.g. `\\Release`.
    #[serde(default)]
    pub path: Option<String>,
    /// When the definition was created.
    #[serde(default)]
    pub created_date: Option<DateTime<Utc>>,
}

/// An identity as embedded in other resources.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityRef {
    /// Identity GUID.
    #[serde(default)]
    pub id: Option<String>,
    /// Name shown in the UI.
    #[serde(default)]
    pub display_name: Option<String>,
    /// Sign-in name, usually an email address.
    #[serde(default)]
    pub unique_name: Option<String>,
}

/// A build.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Build {
    /// Build id.
    pub id: u32,
    /// Build number, e.g. `20240201.3`.
    #[serde(default)]
    pub build_number: Option<String>,
    /// Current state.
    #[serde(default)]
    pub status: Option<BuildStatus>,
    /// Outcome, once completed.
    #[serde(default)]
    pub result: Option<BuildResult>,
    /// When the build was queued.
    #[serde(default)]
    pub queue_time: Option<DateTime<Utc>>,
    /// When the build started.
    #[serde(default)]
    pub start_time: Option<DateTime<Utc>>,
    /// When the build finished.
    #[serde(default)]
    pub finish_time: Option<DateTime<Utc>>,
    /// Branch built, e.g. `refs/heads/main`.
    #[serde(default)]
    pub source_branch: Option<String>,
    /// Commit built.
    #[serde(default)]
    pub source_version: Option<String>,
    /// The definition this build ran.
    #[serde(default)]
    pub definition: Option<DefinitionReference>,
    /// Who the build was requested for.
    #[serde(default)]
    pub requested_for: Option<IdentityRef>,
    /// REST URL of the build.
    #[serde(default)]
    pub url: Option<String>,
}

/// Body of a queue request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueBuild {
    /// Definition to queue.
    pub definition: QueueDefinition,
    /// Branch to build; the definition default when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_branch: Option<String>,
    /// Variables as a JSON-encoded object.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<String>,
}

/// The definition to queue.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueueDefinition {
    /// Definition id.
    pub id: u32,
}

impl QueueBuild {
    /// Queues `definition_id` on its default branch.
    pub fn new(definition_id: u32) -> Self {
        Self {
            definition: QueueDefinition { id: definition_id },
            source_branch: None,
            parameters: None,
        }
    }

    /// Builds a specific branch, e.g. `refs/heads/main`.
    pub fn branch(mut self, branch: &str) -> Self {
        self.source_branch = Some(branch.to_string());
        self
    }
}

/// Filters for [`BuildApi::get_builds`].
///
/// Unset filters are left out of the query string.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BuildQuery {
    /// Only builds of these definition ids.
    pub definitions: Vec<u32>,
    /// Only builds in this state.
    pub status_filter: Option<BuildStatus>,
    /// Only builds with this outcome.
    pub result_filter: Option<BuildResult>,
    /// Only builds of this branch.
    pub branch_name: Option<String>,
    /// Only builds requested for this identity.
    pub requested_for: Option<String>,
    /// Maximum number of builds.
    pub top: Option<u32>,
    /// Only builds finished after this time.
    pub min_time: Option<DateTime<Utc>>,
    /// Only builds finished before this time.
    pub max_time: Option<DateTime<Utc>>,
}

impl BuildQuery {
    /// Limits the number of builds returned.
    pub fn top(mut self, top: u32) -> Self {
        self.top = Some(top);
        self
    }

    /// Only builds of these definitions.
    pub fn definitions(mut self, definitions: &[u32]) -> Self {
        self.definitions = definitions.to_vec();
        self
    }

    /// Only builds in this state.
    pub fn status(mut self, status: BuildStatus) -> Self {
        self.status_filter = Some(status);
        self
    }

    /// Only builds of this branch.
    pub fn branch(mut self, branch: &str) -> Self {
        self.branch_name = Some(branch.to_string());
        self
    }

    fn to_params(&self) -> Result<QueryParams, ApiError> {
        Ok(QueryParams::new()
            .with_list("definitions", &self.definitions)
            .with_optional("statusFilter", enum_token(self.status_filter)?)
            .with_optional("resultFilter", enum_token(self.result_filter)?)
            .with_optional("branchName", self.branch_name.as_deref())
            .with_optional("requestedFor", self.requested_for.as_deref())
            .with_optional("$top", self.top)
            .with_optional("minTime", self.min_time.map(|t| t.to_rfc3339()))
            .with_optional("maxTime", self.max_time.map(|t| t.to_rfc3339())))
    }
}

fn enum_token<T: Serialize>(value: Option<T>) -> Result<Option<String>, ApiError> {
    value
        .map(|v| match serde_json::to_value(v)? {
            serde_json::Value::String(s) => Ok(s),
            other => Ok(other.to_string()),
        })
        .transpose()
}

/// The resource locations of the build area, for seeding a connection.
pub fn locations() -> Vec<ApiResourceLocation> {
    vec![ApiResourceLocation {
        id: BUILDS_LOCATION_ID.to_string(),
        area: BUILD_AREA.to_string(),
        resource_name: "builds".to_string(),
        route_template: "{project}/_apis/build/builds/{buildId}".to_string(),
        resource_version: 4,
        min_version: NumericVersion::new(1, 0),
        max_version: NumericVersion::new(4, 1),
        released_version: NumericVersion::new(4, 1),
    }]
}

/// Build endpoints.
#[derive(Clone)]
pub struct BuildApi {
    client: ResourceClient,
}

impl BuildApi {
    /// Creates the build client for a connection.
    ///
    /// # Errors
    ///
    /// Fails if the resource-area directory cannot be read or has no build entry.
    pub async fn new(connection: &Connection) -> Result<Self, ApiError> {
        let area = ResourceArea::new(BUILD_AREA).with_id(BUILD_AREA_ID);
        Ok(Self {
            client: connection.resource_client(&area).await?,
        })
    }

    /// Gets one build.
    pub async fn get_build(&self, project: &str, build_id: u32) -> Result<Build, ApiError> {
        let request = self
            .client
            .request(BUILDS_LOCATION_ID)
            .api_version(API_VERSION)
            .route_values(
                RouteValues::new()
                    .with("project", project)
                    .with("buildId", build_id),
            );

        self.client
            .get_typed(request, ResponseShape::record(&BUILD))
            .await
    }

    /// Lists builds, newest first.
    pub async fn get_builds(&self, project: &str, query: &BuildQuery) -> Result<Vec<Build>, ApiError> {
        let request = self
            .client
            .request(BUILDS_LOCATION_ID)
            .api_version(API_VERSION)
            .route_values(
                RouteValues::new()
                    .with("project", project)
                    .with_optional::<u32>("buildId", None),
            )
            .query(query.to_params()?);

        self.client
            .get_typed(request, ResponseShape::collection(&BUILD))
            .await
    }

    /// Queues a build.
    pub async fn queue_build(
        &self,
        project: &str,
        build: &QueueBuild,
        ignore_warnings: Option<bool>,
    ) -> Result<Build, ApiError> {
        let request = self
            .client
            .request(BUILDS_LOCATION_ID)
            .api_version(API_VERSION)
            .route_values(
                RouteValues::new()
                    .with("project", project)
                    .with_optional::<u32>("buildId", None),
            )
            .query(QueryParams::new().with_optional("ignoreWarnings", ignore_warnings));

        self.client
            .create_typed(request, build, ResponseShape::record(&BUILD))
            .await
    }

    /// Deletes a build.
    pub async fn delete_build(&self, project: &str, build_id: u32) -> Result<(), ApiError> {
        let request = self
            .client
            .request(BUILDS_LOCATION_ID)
            .api_version(API_VERSION)
            .route_values(
                RouteValues::new()
                    .with("project", project)
                    .with("buildId", build_id),
            );

        self.client.delete(request, ResponseShape::RAW).await?;
        Ok(())
    }
}
