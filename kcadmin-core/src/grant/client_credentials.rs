//! Client credentials grant for service accounts.

use super::{GrantType, form};
use crate::token::Secret;

/// Authenticates as a confidential client's service account.
///
/// Keycloak usually issues no refresh token for this grant; the client then
/// requests a fresh pair whenever the access token expires.
#[derive(Debug, Clone)]
pub struct ClientCredentials {
    client_id: String,
    client_secret: Secret,
}

impl ClientCredentials {
    /// Create a client credentials grant.
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: Secret::new(client_secret),
        }
    }
}

impl GrantType for ClientCredentials {
    fn name(&self) -> &'static str {
        "client_credentials"
    }

    fn client_id(&self) -> &str {
        &self.client_id
    }

    fn fetch_token_form(&self) -> Vec<(String, String)> {
        form(&[
            ("grant_type", "client_credentials"),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.expose()),
        ])
    }

    fn refresh_token_form(&self, refresh_token: &str) -> Vec<(String, String)> {
        form(&[
            ("grant_type", "refresh_token"),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.expose()),
            ("refresh_token", refresh_token),
        ])
    }
}
