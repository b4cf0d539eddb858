//! Access and refresh credentials.
//!
//! This module provides:
//! - [`Secret`] - A wrapper for sensitive values that prevents accidental logging
//! - [`Credential`] - A decoded access or refresh token with its expiry claim
//! - [`TokenResponse`] - The token pair returned by the token endpoint
//!
//! Tokens are compact JWS strings (`header.payload.signature`). Only the
//! payload claims are decoded; signatures are never verified, the server is
//! trusted to have issued what it returned.

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{KcAdminError, Result};

/// A secret value that prevents accidental exposure in logs.
///
/// The inner value is only accessible via [`expose()`](Secret::expose).
/// Debug and Display implementations show `[REDACTED]` instead of the value.
#[derive(Clone, Serialize, Deserialize)]
pub struct Secret(String);

impl Secret {
    /// Create a new secret from a string value.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Expose the secret value.
    ///
    /// Use sparingly and never log the result.
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Whether the secret is the empty string.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Debug for Secret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Secret([REDACTED])")
    }
}

impl std::fmt::Display for Secret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[REDACTED]")
    }
}

impl PartialEq for Secret {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl Eq for Secret {}

/// Registered claims read from a token payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Expiry, seconds since the Unix epoch.
    #[serde(default, deserialize_with = "numeric_date")]
    pub exp: Option<i64>,

    /// Issued-at, seconds since the Unix epoch.
    #[serde(default, deserialize_with = "numeric_date")]
    pub iat: Option<i64>,

    /// Subject.
    #[serde(default)]
    pub sub: Option<String>,

    /// Authorized party (the client the token was issued to).
    #[serde(default)]
    pub azp: Option<String>,

    /// Keycloak token type (`Bearer`, `Refresh`, `Offline`).
    #[serde(default)]
    pub typ: Option<String>,
}

/// NumericDate may carry fractional seconds; they are floored.
fn numeric_date<'de, D>(deserializer: D) -> std::result::Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Number>::deserialize(deserializer)?;
    Ok(value.and_then(|n| n.as_i64().or_else(|| n.as_f64().map(|f| f.floor() as i64))))
}

/// An immutable, decoded access or refresh token.
///
/// Credentials are replaced wholesale on every refresh, never mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct Credential {
    encoded: Secret,
    claims: Claims,
    expires_at: Option<DateTime<Utc>>,
}

impl Credential {
    /// Decode the claims of a compact three-segment token.
    ///
    /// Fails with [`KcAdminError::TokenDecodeFailed`] when the token does not
    /// have exactly three segments, the payload is not base64url, or the
    /// payload is not a JSON claims object.
    pub fn parse(encoded: impl Into<String>) -> Result<Self> {
        let encoded = encoded.into();

        let segments: Vec<&str> = encoded.split('.').collect();
        if segments.len() != 3 {
            return Err(KcAdminError::token_decode(format!(
                "expected 3 dot-separated segments, found {}",
                segments.len()
            )));
        }

        let payload = URL_SAFE_NO_PAD
            .decode(segments[1].trim_end_matches('='))
            .map_err(|e| KcAdminError::token_decode(format!("payload is not base64url: {}", e)))?;

        let claims: Claims = serde_json::from_slice(&payload)
            .map_err(|e| KcAdminError::token_decode(format!("invalid claims: {}", e)))?;

        let expires_at = match claims.exp {
            Some(exp) => Some(DateTime::from_timestamp(exp, 0).ok_or_else(|| {
                KcAdminError::token_decode(format!("exp claim out of range: {}", exp))
            })?),
            None => None,
        };

        Ok(Self {
            encoded: Secret::new(encoded),
            claims,
            expires_at,
        })
    }

    /// The encoded token string.
    pub fn expose(&self) -> &str {
        self.encoded.expose()
    }

    /// Decoded claims.
    pub fn claims(&self) -> &Claims {
        &self.claims
    }

    /// When the token expires (None if it carries no `exp` claim).
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    /// Whether the token is expired as of `at`.
    ///
    /// True iff `at >= exp`. Returns `false` if no expiry is set.
    pub fn is_expired(&self, at: DateTime<Utc>) -> bool {
        self.expires_at.map(|exp| at >= exp).unwrap_or(false)
    }

    /// The `Authorization` header value for this token.
    pub fn authorization_header(&self) -> String {
        format!("Bearer {}", self.encoded.expose())
    }
}

/// Token pair returned by the token endpoint.
///
/// `access_token` is always non-empty; `refresh_token` is absent when the
/// server did not issue one (typical for `client_credentials`).
#[derive(Debug, Clone, PartialEq)]
pub struct TokenResponse {
    pub access_token: Secret,
    pub refresh_token: Option<Secret>,
}

#[derive(Deserialize)]
struct RawTokenResponse {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    refresh_token: Option<String>,
}

impl TokenResponse {
    /// Decode a token endpoint response body.
    pub fn from_body(body: &str) -> Result<Self> {
        let raw: RawTokenResponse = serde_json::from_str(body).map_err(|e| {
            KcAdminError::token_decode(format!("token endpoint returned invalid JSON: {}", e))
        })?;

        let access_token = raw
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| KcAdminError::token_decode("missing access_token in response"))?;

        Ok(Self {
            access_token: Secret::new(access_token),
            refresh_token: raw.refresh_token.filter(|t| !t.is_empty()).map(Secret::new),
        })
    }
}
