//! API client for communicating with the real-estate REST API.
//!
//! This module provides the `ApiClient` struct, the reqwest-backed
//! implementation of `Backend`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, multipart, Client, Response, StatusCode};
use serde_json::Value;
use tracing::{debug, error};

use super::{ApiError, ApiRequest, Backend, FormPart, RequestBody};

// ============================================================================
// Constants
// ============================================================================

/// Base URL used when neither the environment nor the config file set one.
pub const DEFAULT_API_URL: &str = "http://localhost:3001/api";

/// HTTP request timeout in seconds.
pub const REQUEST_TIMEOUT_SECS: u64 = 30;

/// API client for the back-office service.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    /// Create a new API client for the given base URL
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        Self::with_timeout(base_url, Duration::from_secs(REQUEST_TIMEOUT_SECS))
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
        })
    }

    /// Set the bearer token for authenticated requests
    pub fn set_token(&mut self, token: String) {
        self.token = Some(token);
    }

    /// Create a new ApiClient with the given token, sharing the connection pool.
    pub fn with_token(&self, token: String) -> Self {
        Self {
            client: self.client.clone(),
            base_url: self.base_url.clone(),
            token: Some(token),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn auth_headers(&self) -> Result<header::HeaderMap, ApiError> {
        let mut headers = header::HeaderMap::new();
        if let Some(ref token) = self.token {
            let value = header::HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|e| ApiError::InvalidRequest(format!("Invalid token: {}", e)))?;
            headers.insert(header::AUTHORIZATION, value);
        }
        Ok(headers)
    }

    fn multipart_form(parts: &[FormPart]) -> multipart::Form {
        parts.iter().fold(multipart::Form::new(), |form, part| match part {
            FormPart::Text { name, value } => form.text(name.clone(), value.clone()),
            FormPart::File {
                name,
                file_name,
                bytes,
            } => form.part(
                name.clone(),
                multipart::Part::bytes(bytes.clone()).file_name(file_name.clone()),
            ),
        })
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: Response) -> Result<Response, ApiError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body))
        }
    }

    /// True when a successful response carries no JSON payload.
    fn is_empty_response(response: &Response) -> bool {
        if response.status() == StatusCode::NO_CONTENT {
            return true;
        }
        if response.content_length() == Some(0) {
            return true;
        }
        let is_json = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|ct| ct.contains("application/json"))
            .unwrap_or(false);
        !is_json
    }

    async fn send(&self, request: &ApiRequest) -> Result<Option<Value>, ApiError> {
        let url = self.url(&request.path);

        let mut builder = self
            .client
            .request(request.method.clone(), &url)
            .headers(self.auth_headers()?);

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }

        builder = match &request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(body) => builder.json(body),
            RequestBody::Multipart(parts) => builder.multipart(Self::multipart_form(parts)),
        };

        let response = builder.send().await?;
        let response = Self::check_response(response).await?;

        if Self::is_empty_response(&response) {
            debug!(method = %request.method, url = %url, status = %response.status(), "No content");
            return Ok(None);
        }

        let text = response.text().await?;
        if text.trim().is_empty() {
            return Ok(None);
        }

        serde_json::from_str(&text).map(Some).map_err(|e| {
            ApiError::InvalidResponse(format!("Failed to parse JSON response from {}: {}", url, e))
        })
    }
}

#[async_trait]
impl Backend for ApiClient {
    async fn execute(&self, request: &ApiRequest) -> Result<Option<Value>, ApiError> {
        debug!(method = %request.method, path = %request.path, "Sending request");
        let result = self.send(request).await;
        if let Err(ref e) = result {
            error!(method = %request.method, path = %request.path, error = %e, "API request failed");
        }
        result
    }
}

// ============================================================================
// Tests
// ============================================================================
