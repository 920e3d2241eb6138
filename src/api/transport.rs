//
//  devops-client
//  api/transport.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # HTTP Transport
//!
//! The transport is the collaborator that actually moves bytes. The marshaling core
//! only needs one capability from it: send a request with headers and an optional JSON
//! body, and hand back the decoded JSON plus the status, or an error carrying the status
//! code, status text and raw body for non-2xx responses.
//!
//! ## Features
//!
//! - [`Transport`] trait so tests and embedders can substitute their own transport
//! - [`HttpTransport`], the reqwest-backed implementation
//! - Authentication header injection through [`AuthCredential`]
//! - Server error message extraction for readable failures
//!
//! Timeouts, TLS and redirects are the transport's business, never the core's.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::{Client, Method, StatusCode};
use serde_json::Value;
use thiserror::Error;
use url::Url;

use crate::auth::AuthCredential;

/// Extracts a human readable message from a platform error body.
///
/// The platform returns errors in the format:
/// ```json
/// {"$id": "1", "message": "TF401019: The Git repository ... does not exist", "typeKey": "..."}
/// ```
///
/// Some gateways wrap it as `{"error": {"message": "..."}}` or
/// `{"errors": [{"message": "..."}]}`; those are recognised too.
///
/// # Returns
///
/// The message if one could be found, otherwise `None`.
pub fn extract_server_message(body: &str) -> Option<String> {
    let json = serde_json::from_str::<Value>(body).ok()?;

    if let Some(message) = json.get("message").and_then(|m| m.as_str()) {
        return Some(message.to_string());
    }

    if let Some(message) = json
        .get("error")
        .and_then(|e| e.get("message"))
        .and_then(|m| m.as_str())
    {
        return Some(message.to_string());
    }

    json.get("errors")
        .and_then(|e| e.as_array())
        .and_then(|arr| arr.first())
        .and_then(|e| e.get("message"))
        .and_then(|m| m.as_str())
        .map(str::to_string)
}

/// Errors raised by a [`Transport`].
///
/// These are propagated by the core unchanged.
#[derive(Error, Debug)]
pub enum TransportError {
    /// The server answered with a non-2xx status.
    #[error("API error ({status_code} {status_message}): {message}")]
    Status {
        /// Numeric HTTP status.
        status_code: u16,
        /// Canonical reason phrase for the status.
        status_message: String,
        /// The body exactly as received.
        raw_body: String,
        /// The server's own message if one could be extracted, else the raw body.
        message: String,
    },

    /// Connection, TLS, timeout or other network-level failure.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// A successful response whose body is not JSON.
    #[error("Response from {url} is not valid JSON: {source}")]
    InvalidBody {
        /// The request URL.
        url: String,
        /// The decoding failure.
        #[source]
        source: serde_json::Error,
    },
}

impl TransportError {
    /// Builds a [`TransportError::Status`] from a status code and raw body.
    pub fn from_status(status: StatusCode, raw_body: String) -> Self {
        let message = extract_server_message(&raw_body).unwrap_or_else(|| raw_body.clone());
        Self::Status {
            status_code: status.as_u16(),
            status_message: status.canonical_reason().unwrap_or("Unknown").to_string(),
            raw_body,
            message,
        }
    }

    /// The platform's own error text for a status error.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Status { message, .. } => Some(message),
            _ => None,
        }
    }

    /// The HTTP status code, if the server answered at all.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status { status_code, .. } => Some(*status_code),
            Self::Network(e) => e.status().map(|s| s.as_u16()),
            Self::InvalidBody { .. } => None,
        }
    }
}

/// One outbound request.
#[derive(Debug, Clone)]
pub struct TransportRequest {
    /// HTTP verb.
    pub method: Method,
    /// Fully resolved URL, query string included.
    pub url: Url,
    /// Accept/Content-Type and any additional headers.
    pub headers: HeaderMap,
    /// JSON body for POST/PUT/PATCH.
    pub body: Option<Value>,
}

impl TransportRequest {
    /// Creates a request without a body.
    pub fn new(method: Method, url: Url, headers: HeaderMap) -> Self {
        Self {
            method,
            url,
            headers,
            body: None,
        }
    }

    /// Attaches a JSON body.
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

/// A successful (2xx) response.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    /// HTTP status.
    pub status: StatusCode,
    /// Decoded JSON body; `None` for empty bodies such as `204 No Content`.
    pub body: Option<Value>,
}

/// The HTTP collaborator consumed by the marshaling core.
///
/// Implementors only provide [`send`](Transport::send); the verb helpers are derived
/// from it.
///
/// # Example
///
/// ```rust,no_run
/// use devops_client::api::transport::{HttpTransport, Transport};
/// use reqwest::header::HeaderMap;
///
/// # async fn example() -> anyhow::Result<()> {
/// let transport = HttpTransport::new()?;
/// let url = "https://dev.azure.com/fabrikam/_apis/resourceAreas".parse()?;
/// let response = transport.get(url, HeaderMap::new()).await?;
/// println!("{}", response.status);
/// # Ok(())
/// # }
/// ```
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends one request.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Status`] for non-2xx responses, carrying the status
    /// code, status text and raw body.
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, TransportError>;

    /// Sends a GET request.
    async fn get(&self, url: Url, headers: HeaderMap) -> Result<TransportResponse, TransportError> {
        self.send(TransportRequest::new(Method::GET, url, headers))
            .await
    }

    /// Sends a POST request with a JSON body.
    async fn post(
        &self,
        url: Url,
        body: Value,
        headers: HeaderMap,
    ) -> Result<TransportResponse, TransportError> {
        self.send(TransportRequest::new(Method::POST, url, headers).with_body(body))
            .await
    }

    /// Sends a PUT request with a JSON body.
    async fn put(
        &self,
        url: Url,
        body: Value,
        headers: HeaderMap,
    ) -> Result<TransportResponse, TransportError> {
        self.send(TransportRequest::new(Method::PUT, url, headers).with_body(body))
            .await
    }

    /// Sends a PATCH request with a JSON body.
    async fn patch(
        &self,
        url: Url,
        body: Value,
        headers: HeaderMap,
    ) -> Result<TransportResponse, TransportError> {
        self.send(TransportRequest::new(Method::PATCH, url, headers).with_body(body))
            .await
    }

    /// Sends a DELETE request.
    async fn delete(
        &self,
        url: Url,
        headers: HeaderMap,
    ) -> Result<TransportResponse, TransportError> {
        self.send(TransportRequest::new(Method::DELETE, url, headers))
            .await
    }

    /// Sends an OPTIONS request. Used to discover resource locations.
    async fn options(
        &self,
        url: Url,
        headers: HeaderMap,
    ) -> Result<TransportResponse, TransportError> {
        self.send(TransportRequest::new(Method::OPTIONS, url, headers))
            .await
    }
}

/// reqwest-backed [`Transport`].
///
/// # Example
///
/// ```rust,no_run
/// use std::time::Duration;
/// use devops_client::api::transport::HttpTransport;
/// use devops_client::auth::AuthCredential;
///
/// let transport = HttpTransport::with_timeout(Duration::from_secs(30))?
///     .with_auth(AuthCredential::pat("my-token"));
/// # Ok::<(), anyhow::Error>(())
/// ```
pub struct HttpTransport {
    /// The underlying HTTP client
    http: Client,
    /// Optional authentication credentials
    auth: Option<AuthCredential>,
}

impl HttpTransport {
    /// Creates a transport without a timeout.
    pub fn new() -> Result<Self, TransportError> {
        Ok(Self {
            http: Client::builder()
                .user_agent(format!("dvo/{}", crate::VERSION))
                .build()?,
            auth: None,
        })
    }

    /// Creates a transport whose requests fail after `timeout`.
    pub fn with_timeout(timeout: Duration) -> Result<Self, TransportError> {
        Ok(Self {
            http: Client::builder()
                .user_agent(format!("dvo/{}", crate::VERSION))
                .timeout(timeout)
                .build()?,
            auth: None,
        })
    }

    /// Sets the credentials applied to every request.
    pub fn with_auth(mut self, auth: AuthCredential) -> Self {
        self.auth = Some(auth);
        self
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, TransportError> {
        let url = request.url.to_string();
        let mut builder = self
            .http
            .request(request.method, request.url)
            .headers(request.headers);

        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        if let Some(auth) = &self.auth {
            builder = auth.apply_to_request(builder);
        }

        let response = builder.send().await?;
        let status = response.status();

        if !status.is_success() {
            let text = response.text().await?;
            return Err(TransportError::from_status(status, text));
        }

        let bytes = response.bytes().await?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(TransportResponse { status, body: None });
        }

        let body = serde_json::from_slice(&bytes)
            .map_err(|source| TransportError::InvalidBody { url, source })?;

        Ok(TransportResponse {
            status,
            body: Some(body),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_platform_message() {
        let body = r#"{"$id":"1","innerException":null,"message":"TF401019: repo missing","typeKey":"GitRepositoryNotFoundException"}"#;
        assert_eq!(
            extract_server_message(body).as_deref(),
            Some("TF401019: repo missing")
        );
    }

    #[test]
    fn test_extract_wrapped_messages() {
        assert_eq!(
            extract_server_message(r#"{"error": {"message": "bad gateway"}}"#).as_deref(),
            Some("bad gateway")
        );
        assert_eq!(
            extract_server_message(r#"{"errors": [{"message": "first"}, {"message": "second"}]}"#)
                .as_deref(),
            Some("first")
        );
        assert_eq!(extract_server_message("<html>oops</html>"), None);
    }

    #[test]
    fn test_status_error_keeps_raw_body() {
        let err = TransportError::from_status(StatusCode::NOT_FOUND, "not json".to_string());
        match &err {
            TransportError::Status {
                status_code,
                status_message,
                raw_body,
                message,
            } => {
                assert_eq!(*status_code, 404);
                assert_eq!(status_message, "Not Found");
                assert_eq!(raw_body, "not json");
                assert_eq!(message, "not json");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(err.status_code(), Some(404));
        assert_eq!(err.server_message(), Some("not json"));
    }

    #[tokio::test]
    async fn test_http_transport_decodes_json() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/_apis/thing")
            .match_header("accept", "application/json;api-version=4.1")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"id": 7}"#)
            .create_async()
            .await;

        let transport = HttpTransport::new().unwrap();
        let url: Url = format!("{}/_apis/thing", server.url()).parse().unwrap();
        let mut headers = HeaderMap::new();
        headers.insert("accept", "application/json;api-version=4.1".parse().unwrap());

        let response = transport.get(url, headers).await.unwrap();
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.body, Some(serde_json::json!({"id": 7})));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_http_transport_empty_body_and_errors() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("DELETE", "/_apis/thing/1")
            .with_status(204)
            .create_async()
            .await;
        server
            .mock("GET", "/_apis/thing/2")
            .with_status(404)
            .with_body(r#"{"message": "TF000000: not here"}"#)
            .create_async()
            .await;

        let transport = HttpTransport::new().unwrap();
        let deleted = transport
            .delete(
                format!("{}/_apis/thing/1", server.url()).parse().unwrap(),
                HeaderMap::new(),
            )
            .await
            .unwrap();
        assert!(deleted.body.is_none());

        let err = transport
            .get(
                format!("{}/_apis/thing/2", server.url()).parse().unwrap(),
                HeaderMap::new(),
            )
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), Some(404));
        assert!(err.to_string().contains("TF000000: not here"));
    }

    #[tokio::test]
    async fn test_truncated_error_body_is_a_network_error() {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            socket
                .write_all(b"HTTP/1.1 500 Internal Server Error\r\nContent-Length: 100\r\n\r\n{\"mess")
                .await
                .unwrap();
            socket.shutdown().await.unwrap();
        });

        let transport = HttpTransport::new().unwrap();
        let url: Url = format!("http://{addr}/_apis/thing").parse().unwrap();
        let err = transport.get(url, HeaderMap::new()).await.unwrap_err();
        assert!(matches!(err, TransportError::Network(_)), "unexpected error: {err:?}");
    }
}
