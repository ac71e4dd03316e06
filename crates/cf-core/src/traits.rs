//! # Core Traits (Ports)
//!
//! Any storage plugin must implement these traits to back the forum store.

use async_trait::async_trait;

use crate::error::Result;

/// Local key-value persistence contract.
///
/// Values are opaque byte blobs; the forum store writes one JSON blob
/// under one key.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait KvStore: Send + Sync {
    /// Returns the stored value, or `None` when the key was never written.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Replaces the value under `key`.
    async fn set(&self, key: &str, value: &[u8]) -> Result<()>;

    /// Removes `key`. Removing an absent key succeeds.
    async fn delete(&self, key: &str) -> Result<()>;
}
