//! Token storage abstraction.
//!
//! This module provides:
//! - [`TokenStorage`] - Trait for the holder of the current credential pair
//! - [`MemoryTokenStorage`] - In-process implementation
//!
//! A storage instance belongs to exactly one configured client and is shared
//! by every request that client issues. It is never shared across two
//! independently configured clients.
//!
//! # Example
//!
//! ```rust
//! use kcadmin_core::store::{MemoryTokenStorage, TokenStorage};
//!
//! let storage = MemoryTokenStorage::new();
//! assert!(storage.retrieve_access_token().is_none());
//! ```

mod memory;

pub use memory::MemoryTokenStorage;

use crate::token::Credential;

/// Holder of at most one access and at most one refresh credential.
///
/// This is a pure holder: no validation happens here. Reads return the most
/// recently stored value and each slot is read and written atomically, so a
/// concurrent reader never observes a half-written credential.
pub trait TokenStorage: Send + Sync + std::fmt::Debug {
    /// Replace the stored access credential.
    fn store_access_token(&self, token: Credential);

    /// Replace the stored refresh credential.
    fn store_refresh_token(&self, token: Credential);

    /// The current access credential, if any.
    fn retrieve_access_token(&self) -> Option<Credential>;

    /// The current refresh credential, if any.
    fn retrieve_refresh_token(&self) -> Option<Credential>;
}
