//! Key-value store seam.

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;

use common::RepoResult;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// The key-value operations a key-value repository needs.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Keys matching a glob-style pattern
    async fn matching_keys(&self, pattern: &str) -> RepoResult<Vec<String>>;

    async fn read(&self, key: &str) -> RepoResult<Option<String>>;

    /// Write a value that expires after `seconds`
    async fn write_with_expiry(&self, key: &str, value: String, seconds: u64) -> RepoResult<()>;

    /// Remove keys, returning how many existed
    async fn remove(&self, keys: Vec<String>) -> RepoResult<u64>;
}

#[async_trait]
impl KeyValueStore for ConnectionManager {
    async fn matching_keys(&self, pattern: &str) -> RepoResult<Vec<String>> {
        let mut conn = self.clone();
        let keys: Vec<String> = conn.keys(pattern).await?;
        Ok(keys)
    }

    async fn read(&self, key: &str) -> RepoResult<Option<String>> {
        let mut conn = self.clone();
        let value: Option<String> = conn.get(key).await?;
        Ok(value)
    }

    async fn write_with_expiry(&self, key: &str, value: String, seconds: u64) -> RepoResult<()> {
        let mut conn = self.clone();
        let _: () = conn.set_ex(key, value, seconds).await?;
        Ok(())
    }

    async fn remove(&self, keys: Vec<String>) -> RepoResult<u64> {
        if keys.is_empty() {
            return Ok(0);
        }

        let mut conn = self.clone();
        let removed: u64 = conn.del(keys).await?;
        Ok(removed)
    }
}
