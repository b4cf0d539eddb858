//! Typed facades over the admin API endpoints.
//!
//! This module provides:
//! - [`Users`] - Realm users, their groups, role mappings and credentials
//! - [`Clients`] - Clients, their secrets, roles and sessions
//! - [`IdentityProviders`] - Brokered identity providers
//!
//! Every facade targets a default realm; each method also takes an optional
//! realm that overrides it for that call.

mod clients;
mod identity_providers;
mod users;

pub use clients::Clients;
pub use identity_providers::IdentityProviders;
pub use users::Users;

use crate::command::CommandExecutor;
use crate::path::PathParams;
use crate::query::QueryExecutor;

/// Executors and default realm shared by all facades.
#[derive(Debug, Clone)]
pub(crate) struct Resource {
    pub(crate) commands: CommandExecutor,
    pub(crate) queries: QueryExecutor,
    realm: String,
}

impl Resource {
    pub(crate) fn new(
        commands: CommandExecutor,
        queries: QueryExecutor,
        realm: impl Into<String>,
    ) -> Self {
        Self {
            commands,
            queries,
            realm: realm.into(),
        }
    }

    /// Path parameters holding the realm a call targets.
    pub(crate) fn realm_params(&self, realm: Option<&str>) -> PathParams {
        PathParams::new().with("realm", realm.unwrap_or(&self.realm))
    }

    pub(crate) fn realm(&self) -> &str {
        &self.realm
    }
}
