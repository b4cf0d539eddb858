//! `reqwest`-backed HTTP transport.

use async_trait::async_trait;
use std::time::Duration;

use super::{HttpRequest, HttpResponse, HttpTransport, Method, RequestBody, TransportError};

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// [`HttpTransport`] implementation on top of a shared `reqwest::Client`.
///
/// Cloning is cheap; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Create a transport with the default timeout and user agent.
    pub fn new() -> Result<Self, TransportError> {
        Self::with_settings(
            Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            concat!("kcadmin/", env!("CARGO_PKG_VERSION")),
        )
    }

    /// Create a transport with a custom timeout and user agent.
    pub fn with_settings(timeout: Duration, user_agent: &str) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map_err(|e| TransportError::InvalidRequest {
                message: format!("failed to build HTTP client: {}", e),
            })?;

        Ok(Self { client })
    }

    /// Wrap an existing `reqwest::Client`.
    pub fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

fn to_reqwest_method(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Post => reqwest::Method::POST,
        Method::Put => reqwest::Method::PUT,
        Method::Patch => reqwest::Method::PATCH,
        Method::Delete => reqwest::Method::DELETE,
    }
}

fn map_reqwest_error(e: reqwest::Error) -> TransportError {
    if e.is_timeout() {
        TransportError::Timeout {
            message: e.to_string(),
        }
    } else if e.is_builder() {
        TransportError::InvalidRequest {
            message: e.to_string(),
        }
    } else {
        TransportError::Network {
            message: e.to_string(),
        }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let mut builder = self
            .client
            .request(to_reqwest_method(request.method), &request.url);

        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        builder = match request.body {
            RequestBody::Empty => builder,
            RequestBody::Raw(body) => builder.body(body),
            RequestBody::Form(fields) => builder.form(&fields),
        };

        let response = builder.send().await.map_err(map_reqwest_error)?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response.text().await.map_err(map_reqwest_error)?;

        tracing::debug!("{} {} -> {}", request.method, request.url, status);

        if !(200..300).contains(&status) {
            return Err(TransportError::from_status(status, body));
        }

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}
