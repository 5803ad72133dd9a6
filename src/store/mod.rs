//! Small key-value persistence capability.
//!
//! The quota tracker only ever needs to read and overwrite a single named
//! key, so it depends on this trait rather than on a concrete database.
//! [`sqlite::SqliteStore`] is the on-disk implementation; [`memory::MemoryStore`]
//! is the in-process fake used by tests.

pub mod memory;
pub mod sqlite;

use anyhow::Result;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// A string-to-string store owned by a single caller.
pub trait KeyValueStore: Send + Sync {
    /// Get a value by key.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Set a value (upsert).
    fn set(&self, key: &str, value: &str) -> Result<()>;
}
