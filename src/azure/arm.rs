//! Authenticated HTTP client for Azure Resource Manager.

use crate::error::BastionError;
use colored::Colorize;
use reqwest::header::{HeaderMap, AUTHORIZATION, CONTENT_TYPE, LOCATION, RETRY_AFTER};
use reqwest::{Client, Method, StatusCode};
use serde::Deserialize;
use std::time::Duration;

pub const ASYNC_OPERATION_HEADER: &str = "Azure-AsyncOperation";

/// Response status, the headers that drive polling, and the body.
#[derive(Debug)]
pub struct ArmResponse {
    pub status: StatusCode,
    pub async_operation: Option<String>,
    pub location: Option<String>,
    pub retry_after: Option<Duration>,
    pub text: String,
}

impl ArmResponse {
    /// Best effort `code: message` from an ARM error body, or the raw body.
    pub fn error_message(&self) -> String {
        #[derive(Deserialize)]
        struct Envelope {
            error: Detail,
        }
        #[derive(Deserialize)]
        struct Detail {
            code: Option<String>,
            message: Option<String>,
        }
        match serde_json::from_str::<Envelope>(&self.text) {
            Ok(Envelope { error }) => match (error.code, error.message) {
                (Some(code), Some(message)) => format!("{code}: {message}"),
                (None, Some(message)) => message,
                (Some(code), None) => code,
                (None, None) => format!("status {}", self.status),
            },
            Err(_) if self.text.trim().is_empty() => format!("status {}", self.status),
            Err(_) => self.text.trim().to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ArmClient {
    http: Client,
    endpoint: String,
    bearer: String,
}

impl ArmClient {
    pub fn new(endpoint: &str, bearer: &str, timeout: Duration) -> Result<ArmClient, BastionError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| BastionError::Configuration(format!("Error building HTTP client: {e}")))?;
        Ok(ArmClient {
            http,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            bearer: bearer.to_string(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Absolute URL for an ARM path.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.endpoint, path)
    }

    /// Issue one request. `api_version` is appended as a query parameter when given;
    /// polling URLs handed out by Azure already carry their own.
    pub async fn send(
        &self,
        method: Method,
        url: &str,
        api_version: Option<&str>,
        body: Option<Vec<u8>>,
    ) -> Result<ArmResponse, reqwest::Error> {
        log::debug!("{} {url} api-version={api_version:?}", method.as_str().on_blue());

        let mut request = self
            .http
            .request(method.clone(), url)
            .header(AUTHORIZATION, format!("Bearer {}", self.bearer));
        if let Some(version) = api_version {
            request = request.query(&[("api-version", version)]);
        }
        if let Some(body) = body {
            request = request
                .header(CONTENT_TYPE, "application/json; charset=utf-8")
                .body(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let headers = response.headers().clone();
        let text = response.text().await?;
        log::debug!("{} {url} -> {status} ({} bytes)", method.as_str(), text.len());

        Ok(ArmResponse {
            status,
            async_operation: header_value(&headers, ASYNC_OPERATION_HEADER),
            location: header_value(&headers, LOCATION.as_str()),
            retry_after: header_value(&headers, RETRY_AFTER.as_str())
                .and_then(|v| v.parse::<u64>().ok())
                .map(Duration::from_secs),
            text,
        })
    }
}

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .filter(|v| !v.is_empty())
}
