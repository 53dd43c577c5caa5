//! Test doubles for the store and fetcher seams.

use async_trait::async_trait;
use charcache_client::Fetcher;
use charcache_core::{CacheDb, CharacterStore, Error};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Fetcher serving a fixed set of records and counting calls.
#[derive(Default)]
pub struct FakeFetcher {
    records: HashMap<u32, Value>,
    calls: AtomicUsize,
}

impl FakeFetcher {
    pub fn with_record(mut self, id: u32, record: Value) -> Self {
        self.records.insert(id, record);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Fetcher for FakeFetcher {
    async fn fetch(&self, id: u32) -> Result<Value, Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.records.get(&id).cloned().ok_or(Error::NotFound(id))
    }
}

/// A database handle whose connection has already been closed.
pub async fn closed_db() -> CacheDb {
    let db = CacheDb::open_in_memory().await.unwrap();
    let handle = db.clone();
    db.close().await.unwrap();
    handle
}

/// An on-disk database holding an expired row for `id` whose payload is not JSON.
///
/// The row is written through a second raw connection, bypassing `put_character`.
pub async fn db_with_stale_garbage(id: u32) -> (CacheDb, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("characters.db");
    let db = CacheDb::open(&path).await.unwrap();

    let stale = (chrono::Utc::now() - chrono::Duration::hours(25)).to_rfc3339();
    let raw = tokio_rusqlite::Connection::open(&path).await.unwrap();
    raw.call(move |conn| {
        conn.execute(
            "INSERT INTO characters (id, character_data, cached_at, updated_at) VALUES (?1, 'not json', ?2, ?2)",
            tokio_rusqlite::params![id, stale],
        )
    })
    .await
    .unwrap();
    raw.close().await.unwrap();

    (db, dir)
}

/// Store whose reads succeed against SQLite but whose writes always fail.
pub struct ReadOnlyStore {
    pub reads: CacheDb,
    writes: CacheDb,
}

impl ReadOnlyStore {
    pub async fn new() -> Self {
        Self { reads: CacheDb::open_in_memory().await.unwrap(), writes: closed_db().await }
    }
}

#[async_trait]
impl CharacterStore for ReadOnlyStore {
    async fn get(&self, id: u32) -> Result<Option<Value>, Error> {
        self.reads.get_character(id).await
    }

    async fn put(&self, id: u32, payload: &Value) -> Result<(), Error> {
        self.writes.put_character(id, payload).await
    }
}

/// Store holding a row that cannot be decoded.
pub struct CorruptStore;

#[async_trait]
impl CharacterStore for CorruptStore {
    async fn get(&self, id: u32) -> Result<Option<Value>, Error> {
        Err(Error::CorruptEntry(format!("character {id}: undecodable payload")))
    }

    async fn put(&self, _id: u32, _payload: &Value) -> Result<(), Error> {
        Ok(())
    }
}
