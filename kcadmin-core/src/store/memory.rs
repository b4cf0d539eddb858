//! In-memory token storage implementation.

use parking_lot::RwLock;

use super::TokenStorage;
use crate::token::Credential;

/// In-memory token storage.
///
/// Credentials are lost when the process exits.
///
/// # Thread Safety
///
/// Each slot sits behind its own `RwLock`, so reads and writes are atomic
/// per slot and the storage is safe to share across tasks.
#[derive(Default)]
pub struct MemoryTokenStorage {
    access: RwLock<Option<Credential>>,
    refresh: RwLock<Option<Credential>>,
}

impl MemoryTokenStorage {
    /// Create an empty storage.
    pub fn new() -> Self {
        Self::default()
    }
}

impl std::fmt::Debug for MemoryTokenStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryTokenStorage")
            .field("has_access_token", &self.access.read().is_some())
            .field("has_refresh_token", &self.refresh.read().is_some())
            .finish()
    }
}

impl TokenStorage for MemoryTokenStorage {
    fn store_access_token(&self, token: Credential) {
        *self.access.write() = Some(token);
    }

    fn store_refresh_token(&self, token: Credential) {
        *self.refresh.write() = Some(token);
    }

    fn retrieve_access_token(&self) -> Option<Credential> {
        self.access.read().clone()
    }

    fn retrieve_refresh_token(&self) -> Option<Credential> {
        self.refresh.read().clone()
    }
}
