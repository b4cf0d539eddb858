//! Connection configuration.
//!
//! Configuration lives in `config.toml` under the platform config directory
//! (for example `~/.config/kcadmin/config.toml` on Linux):
//!
//! ```toml
//! base_url = "https://sso.example.com"
//! realm = "demo"
//!
//! [grant]
//! type = "password"
//! username = "admin"
//! password = "admin"
//! ```
//!
//! `KCADMIN_BASE_URL`, `KCADMIN_REALM`, `KCADMIN_USERNAME` and
//! `KCADMIN_PASSWORD` override the file. Without a file, the environment
//! alone is enough when it provides a base URL, a username and a password.

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

use crate::client::DEFAULT_AUTH_REALM;
use crate::grant::{ClientCredentials, DEFAULT_ADMIN_CLIENT_ID, GrantType, Password};
use crate::token::Secret;

pub const ENV_BASE_URL: &str = "KCADMIN_BASE_URL";
pub const ENV_REALM: &str = "KCADMIN_REALM";
pub const ENV_USERNAME: &str = "KCADMIN_USERNAME";
pub const ENV_PASSWORD: &str = "KCADMIN_PASSWORD";

const CONFIG_FILE: &str = "config.toml";

/// Upper bound for `expiry_leeway_secs` (one day).
pub const MAX_EXPIRY_LEEWAY_SECS: u64 = 86_400;

/// Errors from loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No configuration file and not enough environment variables.
    #[error(
        "no configuration found at {path:?} and \
         KCADMIN_BASE_URL/KCADMIN_USERNAME/KCADMIN_PASSWORD are not all set"
    )]
    NotFound { path: PathBuf },

    #[error("failed to read config from {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config from {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid base url {url:?}: {message}")]
    InvalidBaseUrl { url: String, message: String },

    #[error("invalid value for {field}: {message}")]
    Invalid {
        field: &'static str,
        message: String,
    },
}

/// How the client authenticates against the token endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GrantConfig {
    /// Admin user login through the `admin-cli` client (or `client_id`).
    Password {
        username: String,
        password: Secret,
        #[serde(default = "default_client_id")]
        client_id: String,
    },

    /// Service account of a confidential client.
    ClientCredentials {
        client_id: String,
        client_secret: Secret,
    },
}

impl GrantConfig {
    /// Instantiate the configured grant type.
    pub fn build(&self) -> Arc<dyn GrantType> {
        match self {
            GrantConfig::Password {
                username,
                password,
                client_id,
            } => Arc::new(
                Password::new(username.clone(), password.expose())
                    .with_client_id(client_id.clone()),
            ),
            GrantConfig::ClientCredentials {
                client_id,
                client_secret,
            } => Arc::new(ClientCredentials::new(
                client_id.clone(),
                client_secret.expose(),
            )),
        }
    }
}

/// Everything needed to talk to one server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeycloakConfig {
    /// Server root, e.g. `https://sso.example.com`.
    pub base_url: String,

    /// Realm that resource facades target unless overridden per call.
    #[serde(default = "default_realm")]
    pub realm: String,

    /// Realm whose token endpoint issues the credentials.
    #[serde(default = "default_realm")]
    pub auth_realm: String,

    /// Per-request timeout of the HTTP transport.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Seconds before `exp` at which an access token is already treated as
    /// expired.
    #[serde(default)]
    pub expiry_leeway_secs: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    pub grant: GrantConfig,

    /// File the configuration was loaded from.
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

fn default_realm() -> String {
    DEFAULT_AUTH_REALM.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_user_agent() -> String {
    concat!("kcadmin/", env!("CARGO_PKG_VERSION")).to_string()
}

fn default_client_id() -> String {
    DEFAULT_ADMIN_CLIENT_ID.to_string()
}

impl KeycloakConfig {
    /// Configuration with defaults for everything but the server and grant.
    pub fn new(base_url: impl Into<String>, grant: GrantConfig) -> Self {
        Self {
            base_url: base_url.into(),
            realm: default_realm(),
            auth_realm: default_realm(),
            timeout_secs: default_timeout_secs(),
            expiry_leeway_secs: 0,
            user_agent: default_user_agent(),
            grant,
            config_path: None,
        }
    }

    /// Builder-style realm override.
    pub fn with_realm(mut self, realm: impl Into<String>) -> Self {
        self.realm = realm.into();
        self
    }

    pub fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.timeout_secs)
    }

    /// Leeway as a duration, capped at [`MAX_EXPIRY_LEEWAY_SECS`].
    pub fn expiry_leeway(&self) -> chrono::Duration {
        let secs = self.expiry_leeway_secs.min(MAX_EXPIRY_LEEWAY_SECS);
        i64::try_from(secs)
            .ok()
            .and_then(chrono::Duration::try_seconds)
            .unwrap_or_else(chrono::Duration::zero)
    }

    /// Build a password-grant configuration purely from variables returned
    /// by `lookup`, if all required ones are present.
    pub fn from_env_with(lookup: impl Fn(&str) -> Option<String>) -> Option<Self> {
        let base_url = lookup(ENV_BASE_URL)?;
        let username = lookup(ENV_USERNAME)?;
        let password = lookup(ENV_PASSWORD)?;

        let mut config = Self::new(
            base_url,
            GrantConfig::Password {
                username,
                password: Secret::new(password),
                client_id: default_client_id(),
            },
        );
        if let Some(realm) = lookup(ENV_REALM) {
            config.realm = realm;
        }
        Some(config)
    }

    /// Apply environment overrides provided by `lookup`.
    ///
    /// Username and password only apply to a password grant.
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(base_url) = lookup(ENV_BASE_URL) {
            self.base_url = base_url;
        }
        if let Some(realm) = lookup(ENV_REALM) {
            self.realm = realm;
        }

        match &mut self.grant {
            GrantConfig::Password {
                username, password, ..
            } => {
                if let Some(value) = lookup(ENV_USERNAME) {
                    *username = value;
                }
                if let Some(value) = lookup(ENV_PASSWORD) {
                    *password = Secret::new(value);
                }
            }
            GrantConfig::ClientCredentials { .. } => {
                if lookup(ENV_USERNAME).is_some() || lookup(ENV_PASSWORD).is_some() {
                    tracing::warn!(
                        "Ignoring {} and {} for a client_credentials grant",
                        ENV_USERNAME,
                        ENV_PASSWORD
                    );
                }
            }
        }
    }

    /// Check the configuration before any request is made.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = url::Url::parse(&self.base_url).map_err(|e| ConfigError::InvalidBaseUrl {
            url: self.base_url.clone(),
            message: e.to_string(),
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidBaseUrl {
                url: self.base_url.clone(),
                message: format!("unsupported scheme {}", url.scheme()),
            });
        }

        require("realm", &self.realm)?;
        require("auth_realm", &self.auth_realm)?;

        if self.timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "timeout_secs",
                message: "must be greater than zero".to_string(),
            });
        }

        if self.expiry_leeway_secs > MAX_EXPIRY_LEEWAY_SECS {
            return Err(ConfigError::Invalid {
                field: "expiry_leeway_secs",
                message: format!("must be at most {} seconds", MAX_EXPIRY_LEEWAY_SECS),
            });
        }

        match &self.grant {
            GrantConfig::Password {
                username,
                client_id,
                ..
            } => {
                require("grant.username", username)?;
                require("grant.client_id", client_id)?;
            }
            GrantConfig::ClientCredentials {
                client_id,
                client_secret,
            } => {
                require("grant.client_id", client_id)?;
                if client_secret.is_empty() {
                    return Err(ConfigError::Invalid {
                        field: "grant.client_secret",
                        message: "must not be empty".to_string(),
                    });
                }
            }
        }

        Ok(())
    }
}

fn require(field: &'static str, value: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Invalid {
            field,
            message: "must not be empty".to_string(),
        });
    }
    Ok(())
}

/// Path of the default configuration file.
pub fn default_config_path() -> PathBuf {
    project_dirs()
        .map(|d| d.config_dir().join(CONFIG_FILE))
        .unwrap_or_else(|| PathBuf::from("kcadmin.toml"))
}

/// Load configuration from the default location, applying environment
/// overrides.
pub fn load_config() -> Result<KeycloakConfig, ConfigError> {
    load_config_with(&default_config_path(), |key| std::env::var(key).ok())
}

/// Load configuration from an explicit file, applying environment
/// overrides.
pub fn load_config_from_path(path: impl AsRef<Path>) -> Result<KeycloakConfig, ConfigError> {
    load_config_with(path.as_ref(), |key| std::env::var(key).ok())
}

/// Load configuration from `path`, reading variables through `lookup`.
///
/// A missing file falls back to [`KeycloakConfig::from_env_with`].
pub fn load_config_with(
    path: &Path,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<KeycloakConfig, ConfigError> {
    let config = if path.exists() {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config: KeycloakConfig =
            toml::from_str(&contents).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        config.apply_env_overrides(&lookup);
        config.config_path = Some(path.to_path_buf());
        config
    } else {
        tracing::debug!("No config file at {:?}, trying environment", path);
        KeycloakConfig::from_env_with(&lookup).ok_or_else(|| ConfigError::NotFound {
            path: path.to_path_buf(),
        })?
    };

    config.validate()?;
    Ok(config)
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("org", "kcadmin", "kcadmin")
}
