//! SQLite-backed cache for fetched character records.
//!
//! This module provides a persistent cache keyed by character id using SQLite
//! with async access via tokio-rusqlite. It supports:
//!
//! - Upsert-as-replace writes (one row per id, no history)
//! - Freshness checked at read time against a fixed TTL
//! - Automatic schema migrations
//! - WAL mode for concurrent access
//!
//! Expired rows are never swept; they stay on disk until the next successful
//! fetch for the same id overwrites them.

pub mod characters;
pub mod connection;
pub mod migrations;
pub mod store;

pub use crate::Error;

pub use characters::{CachedRecord, DEFAULT_TTL};
pub use connection::CacheDb;
pub use store::CharacterStore;
