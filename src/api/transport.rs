// src/api/transport.rs
//! The seam between request composition and the HTTP stack.
//!
//! `NotionClient` builds fully-formed `ApiRequest`s; a `Transport` only
//! moves bytes. The blocking reqwest client is the production transport,
//! and `crate::mock` provides in-memory ones.

use crate::error::{NotionError, Result};
use crate::types::ApiKey;
use reqwest::blocking::{Client, Response};
use reqwest::{header, Method, StatusCode};
use url::Url;

/// A request ready to be sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRequest {
    pub method: Method,
    pub url: Url,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl ApiRequest {
    /// First value of a header, matched case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Path of the URL, e.g. `/v1/users`.
    pub fn path(&self) -> &str {
        self.url.path()
    }

    /// First value of a query parameter.
    pub fn query_param(&self, name: &str) -> Option<String> {
        self.url
            .query_pairs()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.into_owned())
    }
}

/// Raw response body with its status and the URL it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse<T> {
    pub data: T,
    pub status: StatusCode,
    pub url: String,
}

/// Executes one request. Implementations must be shareable across threads.
pub trait Transport: Send + Sync {
    fn execute(&self, request: ApiRequest) -> Result<ApiResponse<String>>;
}

/// Blocking reqwest transport carrying the bearer token on every request.
#[derive(Clone, Debug)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Creates a transport authenticated with `api_key`.
    pub fn new(api_key: &ApiKey) -> Result<Self> {
        let client = Client::builder()
            .default_headers(Self::create_headers(api_key)?)
            .build()?;
        Ok(Self { client })
    }

    /// Wraps a caller-built client, e.g. one whose token comes from an
    /// OAuth helper or that has its own timeouts.
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    fn create_headers(api_key: &ApiKey) -> Result<header::HeaderMap> {
        let mut headers = header::HeaderMap::new();

        let auth_header = format!("Bearer {}", api_key.as_str());
        let mut value = header::HeaderValue::from_str(&auth_header).map_err(|e| {
            NotionError::MissingConfiguration(format!("Invalid API token format: {}", e))
        })?;
        value.set_sensitive(true);
        headers.insert(header::AUTHORIZATION, value);

        Ok(headers)
    }
}

impl Transport for HttpTransport {
    fn execute(&self, request: ApiRequest) -> Result<ApiResponse<String>> {
        let mut builder = self.client.request(request.method, request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }
        extract_response_text(builder.send()?)
    }
}

/// Extracts the response body as text with metadata.
pub fn extract_response_text(response: Response) -> Result<ApiResponse<String>> {
    let status = response.status();
    let url = response.url().to_string();
    let text = response.text()?;

    Ok(ApiResponse {
        data: text,
        status,
        url,
    })
}
