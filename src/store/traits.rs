//! `SettingsStore` trait: the key/value persistence the quiz writes to.

use async_trait::async_trait;

use crate::error::DatabaseError;

/// Per-visitor JSON key/value storage.
///
/// Writes are unconditional overwrites; the last writer wins.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// Read a value, `None` if the key was never written or was deleted.
    async fn get_setting(
        &self,
        user_id: &str,
        key: &str,
    ) -> Result<Option<serde_json::Value>, DatabaseError>;

    /// Insert or replace a value.
    async fn set_setting(
        &self,
        user_id: &str,
        key: &str,
        value: &serde_json::Value,
    ) -> Result<(), DatabaseError>;

    /// Remove a value. Returns whether anything was deleted.
    async fn delete_setting(&self, user_id: &str, key: &str) -> Result<bool, DatabaseError>;
}
