//! Core types and shared functionality for charcache.
//!
//! This crate provides:
//! - Character cache with SQLite backend and a fixed TTL
//! - Unified error types
//! - Configuration structures

pub mod cache;
pub mod config;
pub mod error;

pub use cache::{CacheDb, CachedRecord, CharacterStore, DEFAULT_TTL};
pub use config::AppConfig;
pub use error::Error;
