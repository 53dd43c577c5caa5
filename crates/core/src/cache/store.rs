//! Store abstraction consumed by the character service.

use super::connection::CacheDb;
use crate::Error;
use serde_json::Value;

/// Keyed character store with read-time expiry.
///
/// `get` must treat expired rows as absent; `put` replaces any existing row.
#[async_trait::async_trait]
pub trait CharacterStore: Send + Sync {
    /// Fetch the fresh payload for `id`, if any.
    async fn get(&self, id: u32) -> Result<Option<Value>, Error>;

    /// Insert or replace the payload for `id`.
    async fn put(&self, id: u32, payload: &Value) -> Result<(), Error>;
}

#[async_trait::async_trait]
impl CharacterStore for CacheDb {
    async fn get(&self, id: u32) -> Result<Option<Value>, Error> {
        self.get_character(id).await
    }

    async fn put(&self, id: u32, payload: &Value) -> Result<(), Error> {
        self.put_character(id, payload).await
    }
}
