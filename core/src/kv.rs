//! Key-value store trait and related types for persisting application state.
//!
//! A key-value store holds opaque byte values under short string keys. The
//! application decides how values are encoded; the store only guarantees that
//! a successful [`KeyValueStore::set`] is visible to every later
//! [`KeyValueStore::get`], including from a fresh process when the backend
//! is durable.
//!
//! # Implementations
//!
//! - `FileStore` (in `tasklist-storage` crate): one file per key in a directory
//! - `InMemoryStore` (in `tasklist-testing` crate): Fast, deterministic testing
//!
//! # Example
//!
//! ```
//! use tasklist_core::kv::{KeyValueStore, KvError};
//!
//! fn remember_name<S: KeyValueStore + ?Sized>(store: &S, name: &str) -> Result<(), KvError> {
//!     store.set("userName", name.as_bytes())
//! }
//! ```

use thiserror::Error;

/// Errors that can occur during key-value store operations.
#[derive(Error, Debug)]
pub enum KvError {
    /// The key contains characters the backend cannot represent.
    #[error("Invalid key: {0:?}")]
    InvalidKey(String),

    /// Reading or writing the value failed at the I/O layer.
    #[error("I/O error for key {key}: {source}")]
    Io {
        /// The key being read or written.
        key: String,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The backend refused the operation.
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Key-value store abstraction for small, named, persisted values.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` so they can be shared through the
/// reducer environment and moved into effects.
///
/// # Dyn Compatibility
///
/// The trait is object safe; the application holds it as
/// `Arc<dyn KeyValueStore>`.
pub trait KeyValueStore: Send + Sync {
    /// Load the value stored under `key`.
    ///
    /// Returns `Ok(None)` when nothing has been stored under the key yet.
    ///
    /// # Errors
    ///
    /// Returns [`KvError::InvalidKey`] for keys the backend cannot hold and
    /// [`KvError::Io`] or [`KvError::Unavailable`] when the read fails.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, KvError>;

    /// Replace the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`KvError::InvalidKey`] for keys the backend cannot hold and
    /// [`KvError::Io`] or [`KvError::Unavailable`] when the write fails. A
    /// failed write leaves the previous value in place.
    fn set(&self, key: &str, value: &[u8]) -> Result<(), KvError>;
}
