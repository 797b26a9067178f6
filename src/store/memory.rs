// src/store/memory.rs
//! In-memory document store used by tests

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::RwLock;

use super::{Document, DocumentStore, StoreError};

/// Test double with the same contract as the SQLite store, plus a poison
/// switch for failure-path tests and an operation counter.
#[derive(Default)]
pub struct MemoryStore {
    docs: RwLock<HashMap<(String, String), Document>>,
    poisoned: AtomicBool,
    operations: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent operation fail
    pub fn poison(&self) {
        self.poisoned.store(true, Ordering::SeqCst);
    }

    /// Number of get/set/update calls seen so far
    pub fn operation_count(&self) -> usize {
        self.operations.load(Ordering::SeqCst)
    }

    pub async fn document_count(&self, collection: &str) -> usize {
        self.docs
            .read()
            .await
            .keys()
            .filter(|(c, _)| c == collection)
            .count()
    }

    fn record_operation(&self) -> Result<(), StoreError> {
        self.operations.fetch_add(1, Ordering::SeqCst);
        if self.poisoned.load(Ordering::SeqCst) {
            return Err(StoreError::Database(sqlx::Error::PoolClosed));
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get(&self, collection: &str, key: &str) -> Result<Option<Document>, StoreError> {
        self.record_operation()?;
        Ok(self
            .docs
            .read()
            .await
            .get(&(collection.to_string(), key.to_string()))
            .cloned())
    }

    async fn set(&self, collection: &str, key: &str, fields: Document) -> Result<(), StoreError> {
        self.record_operation()?;
        self.docs
            .write()
            .await
            .insert((collection.to_string(), key.to_string()), fields);
        Ok(())
    }

    async fn update(&self, collection: &str, key: &str, fields: Document) -> Result<(), StoreError> {
        self.record_operation()?;
        let mut docs = self.docs.write().await;
        match docs.get_mut(&(collection.to_string(), key.to_string())) {
            Some(doc) => {
                for (field, value) in fields {
                    doc.insert(field, value);
                }
                Ok(())
            }
            None => Err(StoreError::NotFound),
        }
    }
}
