//! Grant types: strategies for obtaining credentials from the token endpoint.
//!
//! This module provides:
//! - [`GrantType`] - Trait shared by every credential-acquisition strategy
//! - [`Password`] - Resource-owner password grant (admin user login)
//! - [`ClientCredentials`] - Service-account grant for confidential clients
//!
//! # Refresh and fallback
//!
//! All grant types follow the same rule, implemented once in
//! [`GrantType::fetch_tokens`]:
//!
//! 1. With a non-empty refresh token, try `grant_type=refresh_token` first.
//! 2. If the token endpoint answers 4xx (expired or revoked refresh token),
//!    fall back to the grant's primary credentials.
//! 3. Without a refresh token, go straight to the primary credentials.
//!
//! Any other failure of the refresh attempt propagates unmodified.

mod client_credentials;
mod password;

pub use client_credentials::ClientCredentials;
pub use password::Password;

use async_trait::async_trait;

use crate::error::{KcAdminError, Result};
use crate::http::{HttpRequest, HttpResponse, HttpTransport, Method, TransportError};
use crate::path::encode_segment;
use crate::token::TokenResponse;

/// Client id used by the admin console CLI, pre-registered in every realm.
pub const DEFAULT_ADMIN_CLIENT_ID: &str = "admin-cli";

/// Token endpoint URL for a realm.
pub fn token_endpoint(base_url: &str, realm: &str) -> String {
    format!(
        "{}/realms/{}/protocol/openid-connect/token",
        base_url.trim_end_matches('/'),
        encode_segment(realm)
    )
}

/// A strategy for exchanging credentials for an access/refresh token pair.
///
/// Implementors only describe their form parameters; the request sequence is
/// shared through the provided [`fetch_tokens`](GrantType::fetch_tokens).
#[async_trait]
pub trait GrantType: Send + Sync + std::fmt::Debug {
    /// The `grant_type` value of the primary (fresh) request.
    fn name(&self) -> &'static str;

    /// OAuth client id the tokens are requested for.
    fn client_id(&self) -> &str;

    /// Form fields requesting fresh credentials.
    fn fetch_token_form(&self) -> Vec<(String, String)>;

    /// Form fields exchanging `refresh_token` for new credentials.
    fn refresh_token_form(&self, refresh_token: &str) -> Vec<(String, String)>;

    /// Obtain a token pair, refreshing when possible.
    ///
    /// # Errors
    ///
    /// - [`KcAdminError::Transport`] if the refresh attempt fails with
    ///   anything other than a 4xx status
    /// - [`KcAdminError::CredentialFetchFailed`] if the fresh request is
    ///   rejected with a 4xx status
    /// - [`KcAdminError::Transport`] for any other failure of the fresh request
    /// - [`KcAdminError::TokenDecodeFailed`] if the body is not a token response
    async fn fetch_tokens(
        &self,
        transport: &dyn HttpTransport,
        base_url: &str,
        realm: &str,
        refresh_token: Option<&str>,
    ) -> Result<TokenResponse> {
        let url = token_endpoint(base_url, realm);

        let response = match refresh_token.filter(|t| !t.is_empty()) {
            Some(refresh_token) => {
                tracing::debug!(
                    "Refreshing tokens for client {} in realm {}",
                    self.client_id(),
                    realm
                );

                match post_form(transport, &url, self.refresh_token_form(refresh_token)).await {
                    Ok(response) => response,
                    Err(e) if e.is_client_error() => {
                        tracing::warn!(
                            "Refresh token rejected ({}), falling back to {} grant",
                            e,
                            self.name()
                        );
                        post_form(transport, &url, self.fetch_token_form())
                            .await
                            .map_err(fresh_request_error)?
                    }
                    Err(e) => return Err(KcAdminError::Transport(e)),
                }
            }
            None => {
                tracing::debug!(
                    "Requesting tokens with {} grant for client {} in realm {}",
                    self.name(),
                    self.client_id(),
                    realm
                );
                post_form(transport, &url, self.fetch_token_form())
                    .await
                    .map_err(fresh_request_error)?
            }
        };

        TokenResponse::from_body(&response.body)
    }
}

async fn post_form(
    transport: &dyn HttpTransport,
    url: &str,
    form: Vec<(String, String)>,
) -> Result<HttpResponse, TransportError> {
    transport
        .send(HttpRequest::new(Method::Post, url).with_form(form))
        .await
}

/// Only a 4xx on the fresh request means the credentials were refused.
fn fresh_request_error(error: TransportError) -> KcAdminError {
    if error.is_client_error() {
        KcAdminError::CredentialFetchFailed(error)
    } else {
        KcAdminError::Transport(error)
    }
}

/// Build an owned form field list from borrowed pairs.
fn form(fields: &[(&str, &str)]) -> Vec<(String, String)> {
    fields
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{MockTransport, token_body};

    const BASE: &str = "http://kc.test";

    fn grant() -> Password {
        Password::new("admin", "secret")
    }

    #[test]
    fn test_token_endpoint() {
        assert_eq!(
            token_endpoint("http://kc.test/", "master"),
            "http://kc.test/realms/master/protocol/openid-connect/token"
        );
    }

    #[tokio::test]
    async fn test_without_refresh_token_uses_primary_grant_only() {
        let transport = MockTransport::new();
        transport.respond(200, token_body("access", Some("refresh")));

        let tokens = grant()
            .fetch_tokens(&transport, BASE, "master", None)
            .await
            .unwrap();

        assert_eq!(tokens.access_token.expose(), "access");
        assert_eq!(tokens.refresh_token.unwrap().expose(), "refresh");

        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].method, Method::Post);
        assert_eq!(
            requests[0].url,
            "http://kc.test/realms/master/protocol/openid-connect/token"
        );
        assert_eq!(requests[0].form_field("grant_type"), Some("password"));
    }

    #[tokio::test]
    async fn test_empty_refresh_token_counts_as_absent() {
        let transport = MockTransport::new();
        transport.respond(200, token_body("access", None));

        grant()
            .fetch_tokens(&transport, BASE, "master", Some(""))
            .await
            .unwrap();

        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].form_field("grant_type"), Some("password"));
    }

    #[tokio::test]
    async fn test_refresh_success_skips_primary_grant() {
        let transport = MockTransport::new();
        transport.respond(200, token_body("new-access", Some("new-refresh")));

        let tokens = grant()
            .fetch_tokens(&transport, BASE, "demo", Some("old-refresh"))
            .await
            .unwrap();

        assert_eq!(tokens.access_token.expose(), "new-access");
        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].form_field("grant_type"), Some("refresh_token"));
        assert_eq!(requests[0].form_field("refresh_token"), Some("old-refresh"));
        assert!(requests[0].url.contains("/realms/demo/"));
    }

    #[tokio::test]
    async fn test_refresh_client_error_falls_back_to_primary_grant() {
        let transport = MockTransport::new();
        transport.respond(400, r#"{"error":"invalid_grant"}"#);
        transport.respond(200, token_body("fallback-access", Some("fallback-refresh")));

        let tokens = grant()
            .fetch_tokens(&transport, BASE, "master", Some("stale"))
            .await
            .unwrap();

        assert_eq!(tokens.access_token.expose(), "fallback-access");

        let grants: Vec<_> = transport
            .requests()
            .iter()
            .map(|r| r.form_field("grant_type").unwrap_or_default().to_string())
            .collect();
        assert_eq!(grants, vec!["refresh_token", "password"]);
    }

    #[tokio::test]
    async fn test_refresh_server_error_propagates_without_fallback() {
        let transport = MockTransport::new();
        transport.respond(503, "unavailable");

        let result = grant()
            .fetch_tokens(&transport, BASE, "master", Some("refresh"))
            .await;

        match result {
            Err(KcAdminError::Transport(TransportError::Server { status, .. })) => {
                assert_eq!(status, 503)
            }
            other => panic!("expected server transport error, got {:?}", other),
        }
        assert_eq!(transport.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_refresh_network_error_propagates_without_fallback() {
        let transport = MockTransport::new();
        transport.fail(TransportError::Timeout {
            message: "30s".to_string(),
        });

        let result = grant()
            .fetch_tokens(&transport, BASE, "master", Some("refresh"))
            .await;

        assert!(matches!(
            result,
            Err(KcAdminError::Transport(TransportError::Timeout { .. }))
        ));
        assert_eq!(transport.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_both_attempts_failing_is_credential_fetch_failure() {
        let transport = MockTransport::new();
        transport.respond(400, r#"{"error":"invalid_grant"}"#);
        transport.respond(401, r#"{"error":"invalid_grant"}"#);

        let result = grant()
            .fetch_tokens(&transport, BASE, "master", Some("stale"))
            .await;

        match result {
            Err(KcAdminError::CredentialFetchFailed(e)) => assert_eq!(e.status(), Some(401)),
            other => panic!("expected CredentialFetchFailed, got {:?}", other),
        }
        assert_eq!(transport.requests().len(), 2);
    }

    #[tokio::test]
    async fn test_primary_failure_without_refresh_token() {
        let transport = MockTransport::new();
        transport.respond(401, r#"{"error":"invalid_grant"}"#);

        let result = grant().fetch_tokens(&transport, BASE, "master", None).await;

        assert!(matches!(result, Err(KcAdminError::CredentialFetchFailed(_))));
    }

    #[tokio::test]
    async fn test_primary_server_error_propagates_unwrapped() {
        let transport = MockTransport::new();
        transport.respond(503, "down");

        let result = grant().fetch_tokens(&transport, BASE, "master", None).await;

        match result {
            Err(KcAdminError::Transport(TransportError::Server { status, body })) => {
                assert_eq!(status, 503);
                assert_eq!(body, "down");
            }
            other => panic!("expected server transport error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_primary_timeout_propagates_unwrapped() {
        let transport = MockTransport::new();
        transport.fail(TransportError::Timeout {
            message: "30s".to_string(),
        });

        let result = grant().fetch_tokens(&transport, BASE, "master", None).await;

        assert!(matches!(
            result,
            Err(KcAdminError::Transport(TransportError::Timeout { .. }))
        ));
    }

    #[tokio::test]
    async fn test_fallback_server_error_propagates_unwrapped() {
        let transport = MockTransport::new();
        transport.respond(400, r#"{"error":"invalid_grant"}"#);
        transport.respond(503, "down");

        let result = grant()
            .fetch_tokens(&transport, BASE, "master", Some("stale"))
            .await;

        match result {
            Err(KcAdminError::Transport(TransportError::Server { status, .. })) => {
                assert_eq!(status, 503)
            }
            other => panic!("expected server transport error, got {:?}", other),
        }
        assert_eq!(transport.requests().len(), 2);
    }

    #[tokio::test]
    async fn test_fallback_timeout_propagates_unwrapped() {
        let transport = MockTransport::new();
        transport.respond(400, r#"{"error":"invalid_grant"}"#);
        transport.fail(TransportError::Timeout {
            message: "30s".to_string(),
        });

        let result = grant()
            .fetch_tokens(&transport, BASE, "master", Some("stale"))
            .await;

        assert!(matches!(
            result,
            Err(KcAdminError::Transport(TransportError::Timeout { .. }))
        ));
        assert_eq!(transport.requests().len(), 2);
    }

    #[tokio::test]
    async fn test_malformed_body_is_decode_failure() {
        let transport = MockTransport::new();
        transport.respond(200, "<html>login</html>");

        let result = grant().fetch_tokens(&transport, BASE, "master", None).await;

        assert!(matches!(result, Err(KcAdminError::TokenDecodeFailed { .. })));
    }
}
