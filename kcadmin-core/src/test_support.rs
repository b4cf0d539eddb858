//! Shared helpers for unit tests.

use async_trait::async_trait;
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{Duration, Utc};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

use crate::client::AuthorizingClient;
use crate::grant::Password;
use crate::http::{HttpRequest, HttpResponse, HttpTransport, TransportError};
use crate::store::{MemoryTokenStorage, TokenStorage};
use crate::token::Credential;

/// Build an unsigned compact token carrying the given claims.
pub(crate) fn jwt(claims: &serde_json::Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
    format!("{}.{}.sig", header, payload)
}

/// Build a token expiring at `exp` (seconds since epoch).
pub(crate) fn jwt_with_exp(exp: i64) -> String {
    jwt(&serde_json::json!({ "exp": exp, "sub": "admin" }))
}

/// A token valid for the next hour; `tag` ends up in the `sub` claim so
/// tokens can be told apart.
pub(crate) fn fresh_jwt(tag: &str) -> String {
    jwt(&serde_json::json!({
        "exp": (Utc::now() + Duration::hours(1)).timestamp(),
        "sub": tag,
    }))
}

/// A token that expired an hour ago.
pub(crate) fn expired_jwt(tag: &str) -> String {
    jwt(&serde_json::json!({
        "exp": (Utc::now() - Duration::hours(1)).timestamp(),
        "sub": tag,
    }))
}

/// Token endpoint body for the given pair.
pub(crate) fn token_body(access: &str, refresh: Option<&str>) -> String {
    match refresh {
        Some(refresh) => serde_json::json!({
            "access_token": access,
            "refresh_token": refresh,
            "token_type": "Bearer",
        }),
        None => serde_json::json!({
            "access_token": access,
            "token_type": "Bearer",
        }),
    }
    .to_string()
}

/// Transport that records every request and replays scripted responses in
/// order.
#[derive(Default)]
pub(crate) struct MockTransport {
    requests: Mutex<Vec<HttpRequest>>,
    responses: Mutex<VecDeque<Result<HttpResponse, TransportError>>>,
}

impl MockTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Queue a response; statuses >= 400 are queued as transport errors.
    pub(crate) fn respond(&self, status: u16, body: impl Into<String>) {
        let body = body.into();
        let result = if (200..300).contains(&status) {
            Ok(HttpResponse::new(status, body))
        } else {
            Err(TransportError::from_status(status, body))
        };
        self.responses.lock().push_back(result);
    }

    /// Queue a raw transport error.
    pub(crate) fn fail(&self, error: TransportError) {
        self.responses.lock().push_back(Err(error));
    }

    /// Every request sent so far, in order.
    pub(crate) fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self.requests.lock().push(request);
        self.responses
            .lock()
            .pop_front()
            .unwrap_or_else(|| {
                Err(TransportError::Network {
                    message: "no scripted response".to_string(),
                })
            })
    }
}

/// A client for `http://kc.test` whose storage already holds a valid access
/// token, so requests go straight to `transport`.
pub(crate) fn authorized_client(transport: Arc<MockTransport>) -> Arc<AuthorizingClient> {
    let storage = Arc::new(MemoryTokenStorage::new());
    storage.store_access_token(
        Credential::parse(fresh_jwt("test")).expect("test token must parse"),
    );
    Arc::new(AuthorizingClient::new(
        "http://kc.test",
        "master",
        transport,
        storage,
        Arc::new(Password::new("admin", "admin")),
    ))
}
