//! HTTP transport abstraction.
//!
//! This module provides:
//! - [`Method`], [`HttpRequest`], [`RequestBody`] - A fully rendered outgoing request
//! - [`HttpResponse`] - Status, headers and body of a completed call
//! - [`HttpTransport`] - Trait for the component that actually performs HTTP
//! - [`TransportError`] - Failures raised by a transport
//! - [`ReqwestTransport`] - `reqwest` implementation (with `reqwest-transport` feature)
//!
//! Transports treat every non-2xx status as an error and keep 4xx responses
//! distinguishable, since grant types fall back to their primary credentials
//! only on a client error from the token endpoint.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::fmt;
use thiserror::Error;

#[cfg(feature = "reqwest-transport")]
mod reqwest_transport;

#[cfg(feature = "reqwest-transport")]
pub use reqwest_transport::ReqwestTransport;

/// HTTP method of an outgoing request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    /// Upper-case method name as it appears on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Body of an outgoing request.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum RequestBody {
    /// No body.
    #[default]
    Empty,

    /// A pre-encoded body sent verbatim (JSON text for commands).
    Raw(String),

    /// URL-encoded form fields, in order.
    Form(Vec<(String, String)>),
}

/// A fully rendered request handed to an [`HttpTransport`].
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: RequestBody,
}

impl HttpRequest {
    /// Create a request with no headers and no body.
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Vec::new(),
            body: RequestBody::Empty,
        }
    }

    /// Send URL-encoded form fields as the body.
    pub fn with_form(mut self, fields: Vec<(String, String)>) -> Self {
        self.body = RequestBody::Form(fields);
        self
    }

    /// Look up a header value (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }

    /// Form field value, if the body is a form.
    pub fn form_field(&self, name: &str) -> Option<&str> {
        match &self.body {
            RequestBody::Form(fields) => fields
                .iter()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.as_str()),
            _ => None,
        }
    }
}

/// A completed HTTP exchange.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpResponse {
    /// Create a response with the given status and body.
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.into(),
        }
    }

    /// Whether the status is in the 2xx range.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Look up a header value (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }

    /// Decode the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_str(&self.body)
    }
}

fn find_header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_str())
}

/// Error raised by an [`HttpTransport`].
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    /// The server answered with a 4xx status.
    #[error("client error {status}: {body}")]
    Client { status: u16, body: String },

    /// The server answered with any other non-2xx status.
    #[error("server error {status}: {body}")]
    Server { status: u16, body: String },

    /// The request could not be delivered or the response could not be read.
    #[error("network error: {message}")]
    Network { message: String },

    /// The transport's configured timeout elapsed.
    #[error("request timed out: {message}")]
    Timeout { message: String },

    /// The request could not be built (bad URL, bad header).
    #[error("invalid request: {message}")]
    InvalidRequest { message: String },
}

impl TransportError {
    /// Classify a non-2xx status into the matching variant.
    pub fn from_status(status: u16, body: impl Into<String>) -> Self {
        let body = body.into();
        if (400..500).contains(&status) {
            TransportError::Client { status, body }
        } else {
            TransportError::Server { status, body }
        }
    }

    /// Whether this is a 4xx response.
    pub fn is_client_error(&self) -> bool {
        matches!(self, TransportError::Client { .. })
    }

    /// HTTP status, for status-carrying variants.
    pub fn status(&self) -> Option<u16> {
        match self {
            TransportError::Client { status, .. } | TransportError::Server { status, .. } => {
                Some(*status)
            }
            _ => None,
        }
    }
}

/// Component that performs HTTP requests.
///
/// Implementations must map 4xx responses to [`TransportError::Client`] and
/// every other non-2xx response to [`TransportError::Server`]. Timeouts are
/// the transport's responsibility.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Perform the request and return the response.
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}
