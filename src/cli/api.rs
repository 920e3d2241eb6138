//
//  devops-client
//  cli/api.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Direct versioned API access command
//!
//! Calls any resource through the same pipeline the typed commands use: the
//! route is resolved from the server's advertised locations, the API version is
//! negotiated, the area may be redirected to another host, and the response can
//! be shaped as one of the registered types.
//!
//! ## Examples
//!
//! ```bash
//! # List projects with the newest version the server offers
//! dvo api core projects -r projectId
//!
//! # Get a build, timestamps normalized
//! dvo api build builds -r project=Fabrikam -r buildId=42 --type Build \
//!     --resource-area-id 5d6898bb-45ec-463f-95f9-54d49c71752e
//!
//! # Queue a build with an explicit version
//! dvo api build builds -X POST --api-version 4.1 -r project=Fabrikam -r buildId \
//!     --input queue.json
//! ```

use std::fs;

use anyhow::{bail, Context, Result};
use clap::Args;
use reqwest::Method;
use serde_json::Value;

use crate::api::routing::{QueryParams, RouteValues};
use crate::api::shaping::TypeRegistry;
use crate::api::{ResourceArea, ResponseShape};

use super::{open_connection, GlobalOptions};

/// Make a versioned call to any resource
#[derive(Args, Debug)]
pub struct ApiCommand {
    /// Resource area, e.g. `build` or `git`
    pub area: String,

    /// Resource name or location GUID, e.g. `builds`
    pub resource: String,

    /// HTTP method
    #[arg(long, short = 'X', default_value = "GET")]
    pub method: String,

    /// API version, e.g. `4.1` or `5.0-preview.2` (defaults to the newest offered)
    #[arg(long)]
    pub api_version: Option<String>,

    /// Route value as `name=value`; a bare `name` leaves that segment out
    #[arg(long = "route", short = 'r', action = clap::ArgAction::Append)]
    pub route: Vec<String>,

    /// Query parameter as `key=value`
    #[arg(long = "query", short = 'q', action = clap::ArgAction::Append)]
    pub query: Vec<String>,

    /// Extra header as `Name: Value`
    #[arg(long, short = 'H', action = clap::ArgAction::Append)]
    pub header: Vec<String>,

    /// JSON request body from a file, or `-` for stdin
    #[arg(long, short = 'f')]
    pub input: Option<String>,

    /// Media type of the request body, e.g. `application/json-patch+json`
    #[arg(long)]
    pub content_type: Option<String>,

    /// Media type to accept, e.g. `application/zip`; the api-version is appended
    #[arg(long)]
    pub accept: Option<String>,

    /// Shape the response as this registered type, e.g. `Build`
    #[arg(long = "type", short = 't')]
    pub type_name: Option<String>,

    /// The response is a collection of `--type` values
    #[arg(long, requires = "type_name")]
    pub collection: bool,

    /// Resource area GUID, to follow redirection to the area's own host
    #[arg(long)]
    pub resource_area_id: Option<String>,
}

impl ApiCommand {
    pub async fn run(&self, global: &GlobalOptions) -> Result<()> {
        let method = self.parse_method()?;
        let shape = self.response_shape()?;
        let route_values = parse_route_values(&self.route)?;
        let query = parse_query(&self.query)?;
        let body = self.read_body()?;

        let (connection, _) = open_connection(global)?;

        let mut area = ResourceArea::new(&self.area);
        if let Some(id) = &self.resource_area_id {
            area = area.with_id(id);
        }
        let mut client = connection.resource_client(&area).await?;

        if let Some(content_type) = &self.content_type {
            client = client.with_body_content_type(content_type);
        }
        if let Some(accept) = &self.accept {
            client = client.with_accept(accept);
        }
        for header in &self.header {
            let (name, value) = parse_header(header)?;
            client = client.with_header(name, value);
        }

        let mut request = client
            .request(&self.resource)
            .route_values(route_values)
            .query(query);
        if let Some(version) = &self.api_version {
            request = request.api_version(version);
        }

        let response = client.send(method, request, body, shape).await?;
        println!("{}", serde_json::to_string_pretty(&response)?);
        Ok(())
    }

    fn parse_method(&self) -> Result<Method> {
        match self.method.to_uppercase().as_str() {
            "GET" => Ok(Method::GET),
            "POST" => Ok(Method::POST),
            "PUT" => Ok(Method::PUT),
            "PATCH" => Ok(Method::PATCH),
            "DELETE" => Ok(Method::DELETE),
            "HEAD" => Ok(Method::HEAD),
            "OPTIONS" => Ok(Method::OPTIONS),
            _ => bail!("Unsupported HTTP method: {}", self.method),
        }
    }

    fn response_shape(&self) -> Result<ResponseShape> {
        let Some(name) = &self.type_name else {
            return Ok(ResponseShape::RAW);
        };

        let registry = TypeRegistry::builtin();
        let descriptor = registry.get(name).ok_or_else(|| {
            anyhow::anyhow!(
                "Unknown type '{}'. Registered types: {}",
                name,
                registry.names().collect::<Vec<_>>().join(", ")
            )
        })?;

        Ok(if self.collection {
            ResponseShape::collection(descriptor)
        } else {
            ResponseShape::record(descriptor)
        })
    }

    fn read_body(&self) -> Result<Option<Value>> {
        let Some(input) = &self.input else {
            return Ok(None);
        };

        let content = if input == "-" {
            let mut buffer = String::new();
            std::io::Read::read_to_string(&mut std::io::stdin(), &mut buffer)?;
            buffer
        } else {
            fs::read_to_string(input).with_context(|| format!("Could not read {}", input))?
        };

        let value = serde_json::from_str(&content).context("Request body is not valid JSON")?;
        Ok(Some(value))
    }
}

fn parse_route_values(pairs: &[String]) -> Result<RouteValues> {
    let mut values = RouteValues::new();
    for pair in pairs {
        match pair.split_once('=') {
            Some((name, value)) if !name.is_empty() => {
                values.insert(name, Some(value.to_string()));
            }
            None if !pair.is_empty() => values.insert(pair, None),
            _ => bail!("Invalid route value '{}'. Expected name=value or name", pair),
        }
    }
    Ok(values)
}

fn parse_query(pairs: &[String]) -> Result<QueryParams> {
    let mut params = QueryParams::new();
    for pair in pairs {
        let Some((key, value)) = pair.split_once('=').filter(|(key, _)| !key.is_empty()) else {
            bail!("Invalid query parameter '{}'. Expected key=value", pair);
        };
        params = params.with(key, value);
    }
    Ok(params)
}

fn parse_header(header: &str) -> Result<(&str, &str)> {
    match header.split_once(':') {
        Some((name, value)) if !name.trim().is_empty() => Ok((name.trim(), value.trim())),
        _ => bail!("Invalid header format: {}. Expected 'Name: Value'", header),
    }
}
