//! Entry point wiring configuration, transport, storage and grant together.

use chrono::Duration;
use std::sync::Arc;

use crate::client::{AuthorizingClient, DEFAULT_AUTH_REALM};
use crate::command::CommandExecutor;
use crate::error::Result;
use crate::grant::GrantType;
use crate::http::HttpTransport;
use crate::query::QueryExecutor;
use crate::resource::{Clients, IdentityProviders, Resource, Users};
use crate::store::{MemoryTokenStorage, TokenStorage};

/// Admin API client for one server and one set of credentials.
///
/// # Example
///
/// ```rust,no_run
/// use kcadmin_core::{GrantConfig, KeycloakAdmin, KeycloakConfig, Secret};
///
/// # async fn run() -> kcadmin_core::Result<()> {
/// let config = KeycloakConfig::new(
///     "http://localhost:8080",
///     GrantConfig::Password {
///         username: "admin".to_string(),
///         password: Secret::new("admin"),
///         client_id: "admin-cli".to_string(),
///     },
/// )
/// .with_realm("demo");
///
/// let admin = KeycloakAdmin::new(&config)?;
/// let users = admin.users().all(None, None).await?;
/// println!("{} users", users.len());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct KeycloakAdmin {
    client: Arc<AuthorizingClient>,
    commands: CommandExecutor,
    queries: QueryExecutor,
    realm: String,
}

impl KeycloakAdmin {
    /// Build a client from configuration, using the `reqwest` transport and
    /// in-memory token storage.
    #[cfg(feature = "reqwest-transport")]
    pub fn new(config: &crate::config::KeycloakConfig) -> Result<Self> {
        config.validate()?;

        let transport =
            crate::http::ReqwestTransport::with_settings(config.timeout(), &config.user_agent)?;

        Self::builder(config.base_url.clone(), config.grant.build())
            .realm(config.realm.clone())
            .auth_realm(config.auth_realm.clone())
            .expiry_leeway(config.expiry_leeway())
            .transport(Arc::new(transport))
            .build()
    }

    /// Start building a client with explicit collaborators.
    pub fn builder(base_url: impl Into<String>, grant: Arc<dyn GrantType>) -> KeycloakAdminBuilder {
        KeycloakAdminBuilder {
            base_url: base_url.into(),
            grant,
            realm: DEFAULT_AUTH_REALM.to_string(),
            auth_realm: DEFAULT_AUTH_REALM.to_string(),
            expiry_leeway: Duration::zero(),
            transport: None,
            storage: None,
        }
    }

    /// Default realm of the resource facades.
    pub fn realm(&self) -> &str {
        &self.realm
    }

    pub fn users(&self) -> Users {
        Users::new(self.resource())
    }

    pub fn clients(&self) -> Clients {
        Clients::new(self.resource())
    }

    pub fn identity_providers(&self) -> IdentityProviders {
        IdentityProviders::new(self.resource())
    }

    /// The underlying authorizing client, for endpoints without a facade.
    pub fn client(&self) -> &Arc<AuthorizingClient> {
        &self.client
    }

    pub fn command_executor(&self) -> &CommandExecutor {
        &self.commands
    }

    pub fn query_executor(&self) -> &QueryExecutor {
        &self.queries
    }

    fn resource(&self) -> Resource {
        Resource::new(self.commands.clone(), self.queries.clone(), self.realm.clone())
    }
}

/// Builder for [`KeycloakAdmin`].
pub struct KeycloakAdminBuilder {
    base_url: String,
    grant: Arc<dyn GrantType>,
    realm: String,
    auth_realm: String,
    expiry_leeway: Duration,
    transport: Option<Arc<dyn HttpTransport>>,
    storage: Option<Arc<dyn TokenStorage>>,
}

impl KeycloakAdminBuilder {
    /// Default realm of the resource facades.
    pub fn realm(mut self, realm: impl Into<String>) -> Self {
        self.realm = realm.into();
        self
    }

    /// Realm whose token endpoint issues the credentials.
    pub fn auth_realm(mut self, realm: impl Into<String>) -> Self {
        self.auth_realm = realm.into();
        self
    }

    pub fn expiry_leeway(mut self, leeway: Duration) -> Self {
        self.expiry_leeway = leeway;
        self
    }

    pub fn transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn storage(mut self, storage: Arc<dyn TokenStorage>) -> Self {
        self.storage = Some(storage);
        self
    }

    /// Assemble the client.
    ///
    /// Without an explicit transport the `reqwest` transport is used when the
    /// `reqwest-transport` feature is enabled; otherwise a transport is
    /// required. Storage defaults to [`MemoryTokenStorage`].
    pub fn build(self) -> Result<KeycloakAdmin> {
        let transport = match self.transport {
            Some(transport) => transport,
            None => default_transport()?,
        };
        let storage = self
            .storage
            .unwrap_or_else(|| Arc::new(MemoryTokenStorage::new()));

        let client = Arc::new(
            AuthorizingClient::new(self.base_url, self.auth_realm, transport, storage, self.grant)
                .with_expiry_leeway(self.expiry_leeway),
        );

        Ok(KeycloakAdmin {
            commands: CommandExecutor::new(client.clone()),
            queries: QueryExecutor::new(client.clone()),
            client,
            realm: self.realm,
        })
    }
}

#[cfg(feature = "reqwest-transport")]
fn default_transport() -> Result<Arc<dyn HttpTransport>> {
    Ok(Arc::new(crate::http::ReqwestTransport::new()?))
}

#[cfg(not(feature = "reqwest-transport"))]
fn default_transport() -> Result<Arc<dyn HttpTransport>> {
    Err(crate::config::ConfigError::Invalid {
        field: "transport",
        message: "no HTTP transport configured".to_string(),
    }
    .into())
}
