//! Cache-aside character lookup.
//!
//! The service owns its store and fetcher; nothing here is global. Concurrent
//! misses for the same id are not coalesced: each one fetches and writes, and
//! the last write wins.

use std::sync::Arc;

use charcache_client::Fetcher;
use charcache_core::CharacterStore;
use serde_json::Value;

use crate::error::ApiError;

/// Result of a successful lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct Lookup {
    pub data: Value,
    pub cached: bool,
}

/// Orchestrates the store and the fetcher for character requests.
pub struct CharacterService {
    store: Arc<dyn CharacterStore>,
    fetcher: Arc<dyn Fetcher>,
}

impl CharacterService {
    pub fn new(store: Arc<dyn CharacterStore>, fetcher: Arc<dyn Fetcher>) -> Self {
        Self { store, fetcher }
    }

    /// Look up a character, fetching and caching it on miss.
    ///
    /// A failed cache write is logged and otherwise ignored; the fetched record
    /// is still returned.
    pub async fn get_character(&self, id: u32) -> Result<Lookup, ApiError> {
        match self.store.get(id).await {
            Ok(Some(data)) => return Ok(Lookup { data, cached: true }),
            Ok(None) => {}
            Err(e) => {
                tracing::error!(id, error = %e, "cache read failed");
                return Err(ApiError::from_store(e));
            }
        }

        tracing::info!(id, "fetching character from upstream");
        let data = self.fetcher.fetch(id).await.map_err(|e| {
            tracing::warn!(id, error = %e, "failed to fetch character");
            ApiError::FetchFailed(e)
        })?;

        if let Err(e) = self.store.put(id, &data).await {
            tracing::warn!(id, error = %e, "failed to cache character");
        }

        Ok(Lookup { data, cached: false })
    }
}
