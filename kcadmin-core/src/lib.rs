//! # kcadmin core
//!
//! Client core for the Keycloak admin REST API.
//!
//! This crate provides:
//! - Credential handling: token decoding, storage and grant types
//! - [`AuthorizingClient`], which keeps a valid bearer token on every request
//! - [`CommandExecutor`] and [`QueryExecutor`] for writes and typed reads
//! - Resource facades ([`Users`], [`Clients`], [`IdentityProviders`]) and
//!   the [`KeycloakAdmin`] entry point
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use kcadmin_core::{Criteria, KeycloakAdmin, load_config};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config()?;
//! let admin = KeycloakAdmin::new(&config)?;
//!
//! let users = admin
//!     .users()
//!     .search(Some(Criteria::new().with("search", "jane")), None)
//!     .await?;
//! for user in &users {
//!     println!("{:?}", user.username);
//! }
//! # Ok(())
//! # }
//! ```

pub mod admin;
pub mod client;
pub mod command;
pub mod config;
pub mod criteria;
pub mod error;
pub mod grant;
pub mod http;
pub mod path;
pub mod query;
pub mod representation;
pub mod resource;
pub mod store;
pub mod token;

#[cfg(test)]
mod test_support;

// Re-export commonly used types at crate root
pub use admin::{KeycloakAdmin, KeycloakAdminBuilder};

pub use client::{AuthorizingClient, RequestOptions};

pub use command::{Command, CommandExecutor, ContentType, Payload};

pub use config::{
    ConfigError,
    GrantConfig,
    KeycloakConfig,
    load_config,
    load_config_from_path,
};

pub use criteria::Criteria;

pub use error::{KcAdminError, Result};

pub use grant::{ClientCredentials, GrantType, Password};

pub use http::{HttpRequest, HttpResponse, HttpTransport, Method, RequestBody, TransportError};

#[cfg(feature = "reqwest-transport")]
pub use http::ReqwestTransport;

pub use path::{PathParams, render_path};

pub use query::{Query, QueryExecutor};

pub use representation::{
    ClientRepresentation,
    Collection,
    CredentialRepresentation,
    GroupRepresentation,
    IdentityProviderRepresentation,
    RoleRepresentation,
    UserRepresentation,
};

pub use resource::{Clients, IdentityProviders, Users};

pub use store::{MemoryTokenStorage, TokenStorage};

pub use token::{Credential, Secret, TokenResponse};
