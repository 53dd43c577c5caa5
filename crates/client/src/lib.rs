//! Client code for charcache.
//!
//! This crate provides the fetcher seam the service consumes and the HTTP
//! implementation used by the server and CLI.

pub mod fetch;

pub use fetch::{FetchConfig, Fetcher, HttpFetcher};
