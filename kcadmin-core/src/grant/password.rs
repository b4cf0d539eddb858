//! Resource-owner password grant.

use super::{DEFAULT_ADMIN_CLIENT_ID, GrantType, form};
use crate::token::Secret;

/// Logs in as an (admin) user with username and password.
///
/// # Example
///
/// ```
/// use kcadmin_core::grant::{GrantType, Password};
///
/// let grant = Password::new("admin", "admin");
/// assert_eq!(grant.client_id(), "admin-cli");
/// ```
#[derive(Debug, Clone)]
pub struct Password {
    username: String,
    password: Secret,
    client_id: String,
}

impl Password {
    /// Create a password grant for the default `admin-cli` client.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: Secret::new(password),
            client_id: DEFAULT_ADMIN_CLIENT_ID.to_string(),
        }
    }

    /// Use a different public client.
    pub fn with_client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = client_id.into();
        self
    }

    /// The login name.
    pub fn username(&self) -> &str {
        &self.username
    }
}

impl GrantType for Password {
    fn name(&self) -> &'static str {
        "password"
    }

    fn client_id(&self) -> &str {
        &self.client_id
    }

    fn fetch_token_form(&self) -> Vec<(String, String)> {
        form(&[
            ("grant_type", "password"),
            ("username", self.username.as_str()),
            ("password", self.password.expose()),
            ("client_id", self.client_id.as_str()),
        ])
    }

    fn refresh_token_form(&self, refresh_token: &str) -> Vec<(String, String)> {
        form(&[
            ("grant_type", "refresh_token"),
            ("client_id", self.client_id.as_str()),
            ("refresh_token", refresh_token),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(fields: &[(&str, &str)]) -> Vec<(String, String)> {
        form(fields)
    }

    #[test]
    fn test_fetch_form() {
        let grant = Password::new("admin", "s3cret");

        assert_eq!(
            grant.fetch_token_form(),
            pairs(&[
                ("grant_type", "password"),
                ("username", "admin"),
                ("password", "s3cret"),
                ("client_id", "admin-cli"),
            ])
        );
    }

    #[test]
    fn test_refresh_form_carries_no_password() {
        let grant = Password::new("admin", "s3cret").with_client_id("ops-cli");
        let fields = grant.refresh_token_form("rt");

        assert_eq!(
            fields,
            pairs(&[
                ("grant_type", "refresh_token"),
                ("client_id", "ops-cli"),
                ("refresh_token", "rt"),
            ])
        );
        assert!(fields.iter().all(|(k, _)| k != "password"));
    }

    #[test]
    fn test_debug_redacts_password() {
        let grant = Password::new("admin", "s3cret");
        let debug = format!("{:?}", grant);
        assert!(!debug.contains("s3cret"));
        assert!(debug.contains("admin"));
    }
}
