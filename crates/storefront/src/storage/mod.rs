//! Local key/value storage.
//!
//! The storefront persists a handful of string values between sessions
//! (the guest cart and the logged-in user). Everything goes through the
//! [`LocalStore`] trait so the engine never cares whether values live in
//! memory or on disk.
//!
//! Values are opaque strings; callers serialize JSON themselves and treat a
//! missing or unparseable value as "nothing stored".

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use thiserror::Error;

/// Keys the storefront writes to local storage.
pub mod keys {
    /// Auth token for the logged-in user.
    pub const TOKEN: &str = "token";

    /// JSON-serialized current user.
    pub const USER: &str = "user";

    /// JSON-serialized guest cart snapshot.
    pub const GUEST_CART: &str = "guestCart";
}

/// Errors that can occur when reading or writing local storage.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Underlying filesystem operation failed.
    #[error("I/O error on key {key}: {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    /// Key contains characters that cannot be stored.
    #[error("invalid storage key: {0}")]
    InvalidKey(String),

    /// Value could not be serialized for storage.
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// A string-valued key/value store.
///
/// Reads are infallible by contract: an unreadable value is reported as
/// absent so callers fall back to their empty default.
pub trait LocalStore: Send + Sync {
    /// Fetch the value stored under `key`, if any.
    fn get(&self, key: &str) -> Option<String>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be persisted.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete `key`. Removing an absent key succeeds.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store refuses the removal.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}
