//! Authorizing HTTP client.
//!
//! [`AuthorizingClient`] wraps an [`HttpTransport`] and makes sure every
//! outgoing request carries a valid bearer token:
//!
//! 1. If no unexpired access token is stored, authorize through the
//!    configured [`GrantType`] (refreshing when a refresh token is stored).
//! 2. Attach `Authorization: Bearer <access token>` to the caller's options.
//! 3. Send the request to `base_url + path` and return the response as is.
//!
//! Expiry is checked before the call instead of reacting to a 401, so a
//! request is never sent with a token already known to be expired. This
//! relies on the `exp` claim and on a reasonably synchronized local clock.
//!
//! Concurrent callers that find the client unauthorized are serialized on a
//! per-client lock, and the authorization state is checked again once the
//! lock is held, so they share a single token-endpoint round trip.

use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::criteria::Criteria;
use crate::error::{KcAdminError, Result};
use crate::grant::GrantType;
use crate::http::{HttpRequest, HttpResponse, HttpTransport, Method, RequestBody};
use crate::store::TokenStorage;
use crate::token::Credential;

/// Realm whose token endpoint issues admin credentials by default.
pub const DEFAULT_AUTH_REALM: &str = "master";

/// Caller-supplied parts of a request.
///
/// The client adds the `Authorization` header on top of these; a
/// caller-supplied `Authorization` header is replaced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestOptions {
    pub headers: Vec<(String, String)>,
    pub body: RequestBody,
    pub query: Option<Criteria>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Send a pre-encoded body.
    pub fn raw_body(mut self, body: impl Into<String>) -> Self {
        self.body = RequestBody::Raw(body.into());
        self
    }

    /// Send URL-encoded form fields.
    pub fn form_body(mut self, fields: Vec<(String, String)>) -> Self {
        self.body = RequestBody::Form(fields);
        self
    }

    /// Append criteria as the query string.
    pub fn query(mut self, criteria: Criteria) -> Self {
        self.query = Some(criteria);
        self
    }
}

/// HTTP client that transparently obtains and refreshes credentials.
///
/// One instance owns one [`TokenStorage`] and one [`GrantType`] for its whole
/// lifetime. Share it behind an `Arc`.
pub struct AuthorizingClient {
    base_url: String,
    auth_realm: String,
    transport: Arc<dyn HttpTransport>,
    storage: Arc<dyn TokenStorage>,
    grant: Arc<dyn GrantType>,
    expiry_leeway: Duration,
    authorize_lock: Mutex<()>,
}

impl AuthorizingClient {
    /// Create a client.
    ///
    /// # Arguments
    ///
    /// * `base_url` - Server root, e.g. `https://sso.example.com`
    /// * `auth_realm` - Realm whose token endpoint issues the credentials
    /// * `transport` - Performs the HTTP calls
    /// * `storage` - Holds the credential pair
    /// * `grant` - Obtains credentials
    pub fn new(
        base_url: impl Into<String>,
        auth_realm: impl Into<String>,
        transport: Arc<dyn HttpTransport>,
        storage: Arc<dyn TokenStorage>,
        grant: Arc<dyn GrantType>,
    ) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            auth_realm: auth_realm.into(),
            transport,
            storage,
            grant,
            expiry_leeway: Duration::zero(),
            authorize_lock: Mutex::new(()),
        }
    }

    /// Treat access tokens as expired `leeway` before their `exp` claim.
    pub fn with_expiry_leeway(mut self, leeway: Duration) -> Self {
        self.expiry_leeway = leeway;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn auth_realm(&self) -> &str {
        &self.auth_realm
    }

    /// The storage holding this client's credentials.
    pub fn storage(&self) -> &Arc<dyn TokenStorage> {
        &self.storage
    }

    /// Whether a stored access token is valid right now.
    pub fn is_authorized(&self) -> bool {
        self.is_authorized_at(Utc::now())
    }

    /// Whether a stored access token is valid at `now`.
    ///
    /// A missing token counts as unauthorized. This only reads the storage.
    pub fn is_authorized_at(&self, now: DateTime<Utc>) -> bool {
        self.valid_access_token(now).is_some()
    }

    fn valid_access_token(&self, now: DateTime<Utc>) -> Option<Credential> {
        self.storage
            .retrieve_access_token()
            .filter(|token| match now.checked_add_signed(self.expiry_leeway) {
                Some(at) => !token.is_expired(at),
                None => false,
            })
    }

    /// Obtain new credentials and store them, overwriting previous values.
    pub async fn authorize(&self) -> Result<()> {
        let _guard = self.authorize_lock.lock().await;
        self.authorize_locked().await
    }

    async fn authorize_locked(&self) -> Result<()> {
        let stored_refresh = self.storage.retrieve_refresh_token();

        let tokens = self
            .grant
            .fetch_tokens(
                self.transport.as_ref(),
                &self.base_url,
                &self.auth_realm,
                stored_refresh.as_ref().map(|t| t.expose()),
            )
            .await?;

        let access = Credential::parse(tokens.access_token.expose())?;
        let refresh = tokens
            .refresh_token
            .map(|t| Credential::parse(t.expose()))
            .transpose()?;

        self.storage.store_access_token(access);
        match refresh {
            Some(refresh) => self.storage.store_refresh_token(refresh),
            None => tracing::debug!("No refresh token issued, keeping the stored one"),
        }

        tracing::info!(
            "Authorized client {} against realm {}",
            self.grant.client_id(),
            self.auth_realm
        );

        Ok(())
    }

    /// A valid access token, authorizing first if necessary.
    async fn ensure_access_token(&self) -> Result<Credential> {
        if let Some(token) = self.valid_access_token(Utc::now()) {
            return Ok(token);
        }

        let _guard = self.authorize_lock.lock().await;

        // Another caller may have authorized while we waited.
        if let Some(token) = self.valid_access_token(Utc::now()) {
            return Ok(token);
        }

        self.authorize_locked().await?;

        self.storage
            .retrieve_access_token()
            .ok_or_else(|| KcAdminError::NotAuthorized {
                message: "no access token stored after authorization".to_string(),
            })
    }

    /// Send an authorized request to `base_url + path`.
    ///
    /// The response is returned unmodified; non-2xx statuses surface as
    /// [`KcAdminError::Transport`] according to the transport's contract.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        options: RequestOptions,
    ) -> Result<HttpResponse> {
        let token = self.ensure_access_token().await?;

        let RequestOptions {
            headers,
            body,
            query,
        } = options;

        let mut headers: Vec<(String, String)> = headers
            .into_iter()
            .filter(|(name, _)| !name.eq_ignore_ascii_case("authorization"))
            .collect();
        headers.push(("Authorization".to_string(), token.authorization_header()));

        let request = HttpRequest {
            method,
            url: self.url_for(path, query.as_ref()),
            headers,
            body,
        };

        tracing::debug!("{} {}", request.method, request.url);

        Ok(self.transport.send(request).await?)
    }

    /// `base_url + path` with exactly one `/` between them, plus the query
    /// string rendered from `query`.
    fn url_for(&self, path: &str, query: Option<&Criteria>) -> String {
        let mut url = self.base_url.clone();
        if !path.is_empty() && !path.starts_with('/') {
            url.push('/');
        }
        url.push_str(path);

        if let Some(query) = query.and_then(Criteria::to_query_string) {
            url.push(if path.contains('?') { '&' } else { '?' });
            url.push_str(&query);
        }

        url
    }
}

impl std::fmt::Debug for AuthorizingClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthorizingClient")
            .field("base_url", &self.base_url)
            .field("auth_realm", &self.auth_realm)
            .field("grant", &self.grant)
            .field("storage", &self.storage)
            .field("expiry_leeway", &self.expiry_leeway)
            .finish_non_exhaustive()
    }
}
