//! Top-level error types for kcadmin.

use thiserror::Error;

use crate::config::ConfigError;
use crate::http::TransportError;

/// Convenience alias used throughout the crate.
pub type Result<T, E = KcAdminError> = std::result::Result<T, E>;

/// Top-level error type encompassing all kcadmin errors.
#[derive(Debug, Error)]
pub enum KcAdminError {
    /// The token endpoint refused the grant type's primary credentials with a
    /// 4xx status, after any refresh attempt was also refused.
    #[error("credential fetch failed: {0}")]
    CredentialFetchFailed(#[source] TransportError),

    /// The token endpoint body, or a token inside it, could not be decoded.
    #[error("token decode failed: {message}")]
    TokenDecodeFailed { message: String },

    /// Network, timeout or HTTP status failure from the transport.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A query response could not be decoded into the requested type.
    #[error("failed to deserialize response into {target}: {source}")]
    DeserializationFailed {
        target: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// A command payload could not be serialized.
    #[error("failed to serialize payload: {0}")]
    Serialization(#[source] serde_json::Error),

    /// A `{name}` placeholder in a path template had no matching parameter.
    #[error("missing path parameter `{name}` for template {template}")]
    MissingPathParam { name: String, template: String },

    /// The payload cannot be encoded with the requested content type.
    #[error("invalid payload: {message}")]
    InvalidPayload { message: String },

    /// No access token is available after authorization.
    #[error("not authorized: {message}")]
    NotAuthorized { message: String },

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl KcAdminError {
    /// Build a [`KcAdminError::TokenDecodeFailed`] from any displayable cause.
    pub(crate) fn token_decode(message: impl std::fmt::Display) -> Self {
        Self::TokenDecodeFailed {
            message: message.to_string(),
        }
    }

    /// HTTP status carried by the underlying transport error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Transport(e) | Self::CredentialFetchFailed(e) => e.status(),
            _ => None,
        }
    }
}
