//
//  devops-client
//  config/connections.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Connection URL Utilities
//!
//! The platform is reachable either as the hosted service (one URL per
//! organization) or as an on-premises server (one URL per project collection):
//!
//! | Deployment | Example URL | Resource areas |
//! |------------|-------------|----------------|
//! | Hosted | `https://dev.azure.com/fabrikam` | Redirected per area |
//! | Hosted (legacy) | `https://fabrikam.visualstudio.com` | Redirected per area |
//! | On-premises | `https://tfs.example.com/tfs/DefaultCollection` | All on the same host |
//!
//! ## Usage
//!
//! ```rust
//! use devops_client::config::{is_hosted_service, normalize_url};
//!
//! assert_eq!(normalize_url(" https://dev.azure.com/fabrikam/ "), "https://dev.azure.com/fabrikam");
//! assert!(is_hosted_service("https://dev.azure.com/fabrikam"));
//! assert!(!is_hosted_service("https://tfs.example.com/tfs/DefaultCollection"));
//! ```

/// Hostname of the hosted service.
pub const HOSTED_SERVICE: &str = "dev.azure.com";

/// Domain of legacy hosted organizations.
pub const LEGACY_HOSTED_DOMAIN: &str = "visualstudio.com";

/// Normalizes a connection URL for storage and keyring lookups.
///
/// Whitespace and trailing slashes are removed. Scheme and host are lowercased;
/// the path keeps its case, since collection names are case-preserving.
pub fn normalize_url(url: &str) -> String {
    let url = url.trim().trim_end_matches('/');

    match url.split_once("://") {
        Some((scheme, rest)) => {
            let (host, path) = match rest.find('/') {
                Some(index) => rest.split_at(index),
                None => (rest, ""),
            };
            format!("{}://{}{}", scheme.to_lowercase(), host.to_lowercase(), path)
        }
        None => url.to_string(),
    }
}

/// Returns `true` if `url` points at the hosted service.
pub fn is_hosted_service(url: &str) -> bool {
    let normalized = normalize_url(url);
    let host = normalized
        .split_once("://")
        .map_or(normalized.as_str(), |(_, rest)| rest)
        .split('/')
        .next()
        .unwrap_or_default();

    host == HOSTED_SERVICE || host.ends_with(&format!(".{}", LEGACY_HOSTED_DOMAIN))
}

/// Suggests a connection name for `url`: the organization, or the collection.
///
/// ```rust
/// use devops_client::config::connection_name_for;
///
/// assert_eq!(connection_name_for("https://dev.azure.com/Fabrikam"), "fabrikam");
/// assert_eq!(connection_name_for("https://fabrikam.visualstudio.com"), "fabrikam");
/// assert_eq!(connection_name_for("https://tfs.example.com/tfs/DefaultCollection"), "defaultcollection");
/// ```
pub fn connection_name_for(url: &str) -> String {
    let normalized = normalize_url(url);
    let rest = normalized
        .split_once("://")
        .map_or(normalized.as_str(), |(_, rest)| rest);
    let mut parts = rest.split('/');
    let host = parts.next().unwrap_or_default();
    let last_path = parts.filter(|p| !p.is_empty()).last();

    let name = match last_path {
        Some(segment) => segment,
        None => host.split('.').next().unwrap_or(host),
    };
    name.to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_keeps_path_case() {
        assert_eq!(
            normalize_url("HTTPS://TFS.Example.com/tfs/DefaultCollection//"),
            "https://tfs.example.com/tfs/DefaultCollection"
        );
        assert_eq!(normalize_url("dev.azure.com/x/"), "dev.azure.com/x");
    }

    #[test]
    fn test_hosted_detection() {
        assert!(is_hosted_service("https://DEV.AZURE.COM/fabrikam"));
        assert!(is_hosted_service("https://fabrikam.visualstudio.com/"));
        assert!(!is_hosted_service("https://visualstudio.com.evil.example/"));
        assert!(!is_hosted_service("http://localhost:8080/tfs"));
    }
}
