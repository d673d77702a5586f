//! Namespaced key-value store over arbitrary JSON documents.
//!
//! A [`Store`] maps string keys to JSON values inside named namespaces.
//! It runs either in memory (volatile) or backed by a single JSON file,
//! in which case every mutation is flushed to disk.

pub mod error;
pub mod store;

pub use error::StoreError;
pub use store::Store;
