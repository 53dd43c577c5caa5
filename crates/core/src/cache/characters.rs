//! Character record reads and writes.
//!
//! Rows are replaced wholesale on every write. Freshness is decided here, at
//! read time, by comparing `cached_at` against [`DEFAULT_TTL`].

use super::connection::CacheDb;
use crate::Error;
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::time::Duration;
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite;

/// How long a cached character stays valid for reads.
pub const DEFAULT_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// A cached character row, as stored.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedRecord {
    pub id: u32,
    pub payload: Value,
    pub cached_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CachedRecord {
    /// Whether the record is still valid at `now`.
    ///
    /// A record stamped in the future (clock skew) counts as fresh.
    pub fn is_fresh(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        is_fresh(self.cached_at, now, ttl)
    }
}

fn is_fresh(cached_at: DateTime<Utc>, now: DateTime<Utc>, ttl: Duration) -> bool {
    match (now - cached_at).to_std() {
        Ok(age) => age <= ttl,
        Err(_) => true,
    }
}

fn decode_payload(id: u32, data: &str) -> Result<Value, Error> {
    serde_json::from_str(data).map_err(|e| Error::CorruptEntry(format!("character {id}: undecodable payload: {e}")))
}

fn parse_timestamp(id: u32, column: &str, raw: &str) -> Result<DateTime<Utc>, Error> {
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| Error::CorruptEntry(format!("character {id}: bad {column} {raw:?}: {e}")))
}

impl CacheDb {
    /// Insert or replace the cached record for `id`, stamped with the current time.
    pub async fn put_character(&self, id: u32, payload: &Value) -> Result<(), Error> {
        self.put_character_at(id, payload, Utc::now()).await
    }

    /// Insert or replace the cached record for `id`, stamped with `at`.
    pub async fn put_character_at(&self, id: u32, payload: &Value, at: DateTime<Utc>) -> Result<(), Error> {
        let data = serde_json::to_string(payload)?;
        let stamp = at.to_rfc3339();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT OR REPLACE INTO characters (id, character_data, cached_at, updated_at)
                     VALUES (?1, ?2, ?3, ?3)",
                    params![id, data, stamp],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Get the stored row for `id` regardless of age.
    ///
    /// Returns None if no row exists.
    pub async fn get_record(&self, id: u32) -> Result<Option<CachedRecord>, Error> {
        let row = self
            .conn
            .call(move |conn| -> Result<Option<(String, String, String)>, Error> {
                let mut stmt =
                    conn.prepare("SELECT character_data, cached_at, updated_at FROM characters WHERE id = ?1")?;

                let result = stmt.query_row(params![id], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)));

                match result {
                    Ok(row) => Ok(Some(row)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)?;

        let Some((data, cached_at, updated_at)) = row else {
            return Ok(None);
        };

        Ok(Some(CachedRecord {
            id,
            payload: decode_payload(id, &data)?,
            cached_at: parse_timestamp(id, "cached_at", &cached_at)?,
            updated_at: parse_timestamp(id, "updated_at", &updated_at)?,
        }))
    }

    /// Get the cached payload for `id` if present and fresh.
    ///
    /// Returns None if no row exists or the row is older than [`DEFAULT_TTL`].
    pub async fn get_character(&self, id: u32) -> Result<Option<Value>, Error> {
        self.get_character_as_of(id, Utc::now()).await
    }

    /// Only `cached_at` is inspected before the age check, so an expired row
    /// reads as absent whatever its payload holds.
    pub(crate) async fn get_character_as_of(&self, id: u32, now: DateTime<Utc>) -> Result<Option<Value>, Error> {
        let row = self
            .conn
            .call(move |conn| -> Result<Option<(String, String)>, Error> {
                let mut stmt = conn.prepare("SELECT character_data, cached_at FROM characters WHERE id = ?1")?;

                match stmt.query_row(params![id], |row| Ok((row.get(0)?, row.get(1)?))) {
                    Ok(row) => Ok(Some(row)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)?;

        let Some((data, cached_at)) = row else {
            return Ok(None);
        };

        let cached_at = parse_timestamp(id, "cached_at", &cached_at)?;
        if !is_fresh(cached_at, now, DEFAULT_TTL) {
            tracing::debug!(id, %cached_at, "cached character expired");
            return Ok(None);
        }

        decode_payload(id, &data).map(Some)
    }
}
