// src/store/mod.rs
//! Opaque document store: key-addressable records with get/set/update
//! semantics. The auth flow never sees what engine sits behind this trait.

use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;

pub mod sqlite;

#[cfg(test)]
pub mod memory;

pub use sqlite::SqliteStore;

/// Field map of a stored document
pub type Document = Map<String, Value>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("document not found")]
    NotFound,
    #[error("stored document is not a JSON object")]
    Malformed,
}

/// Key-addressable record store
///
/// `set` writes the whole document with last-write-wins semantics; `update`
/// merges the given fields into an existing document and fails with
/// [`StoreError::NotFound`] when the target does not exist.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn get(&self, collection: &str, key: &str) -> Result<Option<Document>, StoreError>;
    async fn set(&self, collection: &str, key: &str, fields: Document) -> Result<(), StoreError>;
    async fn update(&self, collection: &str, key: &str, fields: Document) -> Result<(), StoreError>;
}
