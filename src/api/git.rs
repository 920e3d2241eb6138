//
//  devops-client
//  api/git.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Git API
//!
//! Endpoint family for Git repositories and commits. The project route value is
//! optional: without it, repositories are listed across the whole collection.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::client::{Connection, ResourceArea, ResourceClient, ResponseShape};
use super::common::ApiError;
use super::descriptors::{GIT_COMMIT_REF, GIT_REPOSITORY};
use super::routing::{ApiResourceLocation, QueryParams, RouteValues};
use super::version::NumericVersion;

/// Area name of the Git service.
pub const GIT_AREA: &str = "git";

/// Resource area GUID of the Git service.
pub const GIT_AREA_ID: &str = "4e080c62-fa21-4fbc-8fef-2a10a2b38049";

const REPOSITORIES_LOCATION_ID: &str = "225f7195-f9c7-4d14-ab28-a83f7ff77e1f";
const COMMITS_LOCATION_ID: &str = "c2570c3b-5b3f-41b8-98bf-5407bfde8d58";

const API_VERSION: &str = "4.1";

/// A project as embedded in other resources.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamProjectReference {
    /// Project GUID.
    pub id: String,
    /// Project name.
    pub name: String,
    /// Last time the project changed.
    #[serde(default)]
    pub last_update_time: Option<DateTime<Utc>>,
}

/// A Git repository.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GitRepository {
    /// Repository GUID.
    pub id: String,
    /// Repository name.
    pub name: String,
    /// Default branch ref, e.g. `refs/heads/main`.
    #[serde(default)]
    pub default_branch: Option<String>,
    /// HTTPS clone URL.
    #[serde(default)]
    pub remote_url: Option<String>,
    /// SSH clone URL.
    #[serde(default)]
    pub ssh_url: Option<String>,
    /// Browser URL.
    #[serde(default)]
    pub web_url: Option<String>,
    /// Size in bytes.
    #[serde(default)]
    pub size: Option<u64>,
    /// Owning project.
    #[serde(default)]
    pub project: Option<TeamProjectReference>,
}

/// Author or committer of a commit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GitUserDate {
    /// Display name.
    #[serde(default)]
    pub name: Option<String>,
    /// Email address.
    #[serde(default)]
    pub email: Option<String>,
    /// When the change was authored or committed.
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
}

/// A commit, as listed by the commits endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GitCommitRef {
    /// Full commit SHA.
    pub commit_id: String,
    /// Commit message.
    #[serde(default)]
    pub comment: Option<String>,
    /// Who wrote the change.
    #[serde(default)]
    pub author: Option<GitUserDate>,
    /// Who committed it.
    #[serde(default)]
    pub committer: Option<GitUserDate>,
    /// REST URL of the commit.
    #[serde(default)]
    pub url: Option<String>,
}

/// Filters for [`GitApi::get_commits`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommitCriteria {
    /// Branch to list.
    pub item_version: Option<String>,
    /// Only commits by this author.
    pub author: Option<String>,
    /// Only commits after this date.
    pub from_date: Option<DateTime<Utc>>,
    /// Only commits before this date.
    pub to_date: Option<DateTime<Utc>>,
    /// Number of commits to skip.
    pub skip: Option<u32>,
    /// Maximum number of commits.
    pub top: Option<u32>,
}

impl CommitCriteria {
    fn to_params(&self) -> QueryParams {
        QueryParams::new()
            .with_optional("searchCriteria.itemVersion.version", self.item_version.as_deref())
            .with_optional("searchCriteria.author", self.author.as_deref())
            .with_optional("searchCriteria.fromDate", self.from_date.map(|d| d.to_rfc3339()))
            .with_optional("searchCriteria.toDate", self.to_date.map(|d| d.to_rfc3339()))
            .with_optional("searchCriteria.$skip", self.skip)
            .with_optional("searchCriteria.$top", self.top)
    }
}

/// The resource locations of the Git area, for seeding a connection.
pub fn locations() -> Vec<ApiResourceLocation> {
    let location = |id: &str, resource: &str, template: &str| ApiResourceLocation {
        id: id.to_string(),
        area: GIT_AREA.to_string(),
        resource_name: resource.to_string(),
        route_template: template.to_string(),
        resource_version: 1,
        min_version: NumericVersion::new(1, 0),
        max_version: NumericVersion::new(4, 1),
        released_version: NumericVersion::new(4, 1),
    };

    vec![
        location(
            REPOSITORIES_LOCATION_ID,
            "repositories",
            "{project}/_apis/git/repositories/{repositoryId}",
        ),
        location(
            COMMITS_LOCATION_ID,
            "commits",
            "{project}/_apis/git/repositories/{repositoryId}/commits/{commitId}",
        ),
    ]
}

/// Git endpoints.
#[derive(Clone)]
pub struct GitApi {
    client: ResourceClient,
}

impl GitApi {
    /// Creates the Git client for a connection.
    pub async fn new(connection: &Connection) -> Result<Self, ApiError> {
        let area = ResourceArea::new(GIT_AREA).with_id(GIT_AREA_ID);
        Ok(Self {
            client: connection.resource_client(&area).await?,
        })
    }

    /// Lists repositories, in one project or the whole collection.
    pub async fn get_repositories(
        &self,
        project: Option<&str>,
        include_links: Option<bool>,
    ) -> Result<Vec<GitRepository>, ApiError> {
        let request = self
            .client
            .request(REPOSITORIES_LOCATION_ID)
            .api_version(API_VERSION)
            .route_values(
                RouteValues::new()
                    .with_optional("project", project)
                    .with_optional::<&str>("repositoryId", None),
            )
            .query(QueryParams::new().with_optional("includeLinks", include_links));

        self.client
            .get_typed(request, ResponseShape::collection(&GIT_REPOSITORY))
            .await
    }

    /// Gets a repository by name or id.
    pub async fn get_repository(
        &self,
        repository_id: &str,
        project: Option<&str>,
    ) -> Result<GitRepository, ApiError> {
        let request = self
            .client
            .request(REPOSITORIES_LOCATION_ID)
            .api_version(API_VERSION)
            .route_values(
                RouteValues::new()
                    .with_optional("project", project)
                    .with("repositoryId", repository_id),
            );

        self.client
            .get_typed(request, ResponseShape::record(&GIT_REPOSITORY))
            .await
    }

    /// Lists commits of a repository.
    pub async fn get_commits(
        &self,
        repository_id: &str,
        criteria: &CommitCriteria,
        project: Option<&str>,
    ) -> Result<Vec<GitCommitRef>, ApiError> {
        let request = self
            .client
            .request(COMMITS_LOCATION_ID)
            .api_version(API_VERSION)
            .route_values(
                RouteValues::new()
                    .with_optional("project", project)
                    .with("repositoryId", repository_id)
                    .with_optional::<&str>("commitId", None),
            )
            .query(criteria.to_params());

        self.client
            .get_typed(request, ResponseShape::collection(&GIT_COMMIT_REF))
            .await
    }
}
