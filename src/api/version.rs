//
//  devops-client
//  api/version.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! API version tokens.
//!
//! Every call against the platform selects a response schema with an API version
//! token such as `4.1-preview.3`. This module parses those tokens, orders them, and
//! renders them back in canonical form.
//!
//! # Grammar
//!
//! ```text
//! <major>.<minor>[-preview[.<revision>]]
//! ```
//!
//! # Ordering
//!
//! Versions compare numerically first. For the same `major.minor`, previews sort
//! below the released version, and preview revisions sort by number. A bare
//! `-preview` (no revision) means "latest preview" and sorts above numbered ones.
//!
//! # Example
//!
//! ```rust
//! use devops_client::api::version::ApiVersion;
//!
//! let requested: ApiVersion = "4.1-preview.3".parse().unwrap();
//! assert!(requested.is_preview());
//! assert!(requested < "4.1".parse().unwrap());
//! assert_eq!(requested.to_string(), "4.1-preview.3");
//! ```

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::common::ApiError;

/// Matches `<major>.<minor>[-preview[.<revision>]]`.
///
/// # Capture Groups
/// 1. Major version
/// 2. Minor version
/// 3. The `-preview` suffix, if any
/// 4. Preview revision, if any
static VERSION_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d+)\.(\d+)(-preview(?:\.(\d+))?)?$").unwrap()
});

/// Release stage of an API version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VersionStage {
    /// A released, stable schema.
    Released,
    /// A preview schema, optionally pinned to a resource revision.
    Preview(Option<u32>),
}

impl VersionStage {
    fn rank(&self) -> (u8, u32) {
        match self {
            Self::Preview(Some(revision)) => (0, *revision),
            Self::Preview(None) => (0, u32::MAX),
            Self::Released => (1, 0),
        }
    }
}

/// A parsed API version token.
///
/// # Example
///
/// ```rust
/// use devops_client::api::version::{ApiVersion, VersionStage};
///
/// let version = ApiVersion::preview(5, 0, Some(2));
/// assert_eq!(version.stage, VersionStage::Preview(Some(2)));
/// assert_eq!(version.to_string(), "5.0-preview.2");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ApiVersion {
    /// Major version number.
    pub major: u32,
    /// Minor version number.
    pub minor: u32,
    /// Released or preview.
    pub stage: VersionStage,
}

impl ApiVersion {
    /// Creates a released version such as `4.1`.
    pub fn released(major: u32, minor: u32) -> Self {
        Self {
            major,
            minor,
            stage: VersionStage::Released,
        }
    }

    /// Creates a preview version such as `4.1-preview.3`.
    pub fn preview(major: u32, minor: u32, revision: Option<u32>) -> Self {
        Self {
            major,
            minor,
            stage: VersionStage::Preview(revision),
        }
    }

    /// Parses a version token.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidVersionFormat`] when the token does not match
    /// `<major>.<minor>[-preview[.<n>]]`.
    pub fn parse(token: &str) -> Result<Self, ApiError> {
        let invalid = || ApiError::InvalidVersionFormat(token.to_string());

        let captures = VERSION_PATTERN.captures(token.trim()).ok_or_else(invalid)?;
        let major = captures[1].parse().map_err(|_| invalid())?;
        let minor = captures[2].parse().map_err(|_| invalid())?;

        let stage = match (captures.get(3), captures.get(4)) {
            (None, _) => VersionStage::Released,
            (Some(_), None) => VersionStage::Preview(None),
            (Some(_), Some(revision)) => {
                VersionStage::Preview(Some(revision.as_str().parse().map_err(|_| invalid())?))
            }
        };

        Ok(Self {
            major,
            minor,
            stage,
        })
    }

    /// The `major.minor` part of this version.
    pub fn numeric(&self) -> NumericVersion {
        NumericVersion::new(self.major, self.minor)
    }

    /// Returns `true` for `-preview` versions.
    pub fn is_preview(&self) -> bool {
        matches!(self.stage, VersionStage::Preview(_))
    }

    /// The preview revision, if this is a numbered preview.
    pub fn preview_revision(&self) -> Option<u32> {
        match self.stage {
            VersionStage::Preview(revision) => revision,
            VersionStage::Released => None,
        }
    }
}

impl FromStr for ApiVersion {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)?;
        match self.stage {
            VersionStage::Released => Ok(()),
            VersionStage::Preview(None) => write!(f, "-preview"),
            VersionStage::Preview(Some(revision)) => write!(f, "-preview.{}", revision),
        }
    }
}

impl Ord for ApiVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.numeric()
            .cmp(&other.numeric())
            .then_with(|| self.stage.rank().cmp(&other.stage.rank()))
    }
}

impl PartialOrd for ApiVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A `major.minor` pair as advertised by the server for a resource location.
///
/// Deserializes from the string form used in the locations document (`"4.1"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct NumericVersion {
    /// Major version number.
    pub major: u32,
    /// Minor version number.
    pub minor: u32,
}

impl NumericVersion {
    /// Creates a numeric version.
    pub fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }
}

impl TryFrom<String> for NumericVersion {
    type Error = ApiError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<NumericVersion> for String {
    fn from(value: NumericVersion) -> Self {
        value.to_string()
    }
}

impl FromStr for NumericVersion {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let version = ApiVersion::parse(s)?;
        if version.is_preview() {
            return Err(ApiError::InvalidVersionFormat(s.to_string()));
        }
        Ok(version.numeric())
    }
}

impl fmt::Display for NumericVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_released() {
        let version = ApiVersion::parse("4.1").unwrap();
        assert_eq!(version, ApiVersion::released(4, 1));
        assert!(!version.is_preview());
    }

    #[test]
    fn test_parse_preview_variants() {
        assert_eq!(
            ApiVersion::parse("4.1-preview.3").unwrap(),
            ApiVersion::preview(4, 1, Some(3))
        );
        assert_eq!(
            ApiVersion::parse("5.0-preview").unwrap(),
            ApiVersion::preview(5, 0, None)
        );
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for token in ["", "4", "4.1-beta", "v4.1", "4.1-preview.", "4.1.2", "four.one"] {
            assert!(
                matches!(ApiVersion::parse(token), Err(ApiError::InvalidVersionFormat(_))),
                "{token} should be rejected"
            );
        }
    }

    #[test]
    fn test_display_is_canonical() {
        for token in ["4.1", "4.1-preview", "4.1-preview.3", "10.0-preview.12"] {
            assert_eq!(ApiVersion::parse(token).unwrap().to_string(), token);
        }
    }

    #[test]
    fn test_ordering() {
        let v = |s: &str| ApiVersion::parse(s).unwrap();
        assert!(v("4.0") < v("4.1-preview.1"));
        assert!(v("4.1-preview.1") < v("4.1-preview.3"));
        assert!(v("4.1-preview.3") < v("4.1-preview"));
        assert!(v("4.1-preview") < v("4.1"));
        assert!(v("4.1") < v("5.0-preview.1"));
    }

    #[test]
    fn test_numeric_version_from_json() {
        let version: NumericVersion = serde_json::from_str("\"4.1\"").unwrap();
        assert_eq!(version, NumericVersion::new(4, 1));
        assert!(serde_json::from_str::<NumericVersion>("\"4.1-preview\"").is_err());
    }
}
