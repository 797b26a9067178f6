// src/store/sqlite.rs
//! SQLite binding for the document store

use async_trait::async_trait;
use serde_json::Value;
use sqlx::SqlitePool;

use super::{Document, DocumentStore, StoreError};

/// Document store backed by the `documents` table
///
/// Rows are keyed by (collection, key); the field map is stored as JSON
/// text and merged in-database with `json_patch` on update.
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DocumentStore for SqliteStore {
    async fn get(&self, collection: &str, key: &str) -> Result<Option<Document>, StoreError> {
        let row: Option<(String,)> =
            sqlx::query_as("SELECT fields FROM documents WHERE collection = ? AND key = ?")
                .bind(collection)
                .bind(key)
                .fetch_optional(&self.pool)
                .await?;

        match row {
            Some((raw,)) => match serde_json::from_str::<Value>(&raw) {
                Ok(Value::Object(fields)) => Ok(Some(fields)),
                _ => Err(StoreError::Malformed),
            },
            None => Ok(None),
        }
    }

    async fn set(&self, collection: &str, key: &str, fields: Document) -> Result<(), StoreError> {
        let raw = Value::Object(fields).to_string();
        sqlx::query(
            r#"
            INSERT INTO documents (collection, key, fields, updated_at)
            VALUES (?, ?, ?, datetime('now'))
            ON CONFLICT (collection, key)
            DO UPDATE SET fields = excluded.fields, updated_at = excluded.updated_at
            "#,
        )
        .bind(collection)
        .bind(key)
        .bind(&raw)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update(&self, collection: &str, key: &str, fields: Document) -> Result<(), StoreError> {
        let raw = Value::Object(fields).to_string();
        let result = sqlx::query(
            r#"
            UPDATE documents
            SET fields = json_patch(fields, ?), updated_at = datetime('now')
            WHERE collection = ? AND key = ?
            "#,
        )
        .bind(&raw)
        .bind(collection)
        .bind(key)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::migrations::run_migrations;
    use serde_json::json;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn setup_store() -> SqliteStore {
        let pool = SqlitePoolOptions::new()
            .connect("sqlite::memory:")
            .await
            .expect("Failed to create test database");
        run_migrations(&pool).await.expect("Failed to run migrations");
        SqliteStore::new(pool)
    }

    fn doc(value: Value) -> Document {
        match value {
            Value::Object(map) => map,
            _ => panic!("test document must be a JSON object"),
        }
    }

    #[tokio::test]
    async fn set_then_get_round_trips() {
        let store = setup_store().await;
        store
            .set("users", "u1", doc(json!({"email": "a@b.com", "logins": 1})))
            .await
            .expect("set should succeed");

        let fetched = store.get("users", "u1").await.expect("get should succeed");
        assert_eq!(fetched, Some(doc(json!({"email": "a@b.com", "logins": 1}))));
    }

    #[tokio::test]
    async fn get_missing_returns_none() {
        let store = setup_store().await;
        let fetched = store.get("users", "nope").await.expect("get should succeed");
        assert!(fetched.is_none());
    }

    #[tokio::test]
    async fn set_overwrites_existing_document() {
        let store = setup_store().await;
        store
            .set("users", "u1", doc(json!({"email": "old@b.com"})))
            .await
            .expect("first set");
        store
            .set("users", "u1", doc(json!({"email": "new@b.com"})))
            .await
            .expect("second set");

        let fetched = store.get("users", "u1").await.expect("get").unwrap();
        assert_eq!(fetched.get("email"), Some(&json!("new@b.com")));
    }

    #[tokio::test]
    async fn update_merges_only_given_fields() {
        let store = setup_store().await;
        store
            .set("users", "u1", doc(json!({"email": "a@b.com", "name": "Kim"})))
            .await
            .expect("set");
        store
            .update("users", "u1", doc(json!({"name": "Lee"})))
            .await
            .expect("update");

        let fetched = store.get("users", "u1").await.expect("get").unwrap();
        assert_eq!(fetched.get("email"), Some(&json!("a@b.com")));
        assert_eq!(fetched.get("name"), Some(&json!("Lee")));
    }

    #[tokio::test]
    async fn update_missing_document_is_not_found() {
        let store = setup_store().await;
        let result = store.update("users", "ghost", doc(json!({"name": "x"}))).await;
        assert!(matches!(result, Err(StoreError::NotFound)));
    }

    #[tokio::test]
    async fn collections_are_isolated() {
        let store = setup_store().await;
        store
            .set("users", "k", doc(json!({"kind": "user"})))
            .await
            .expect("set users");
        store
            .set("sessions", "k", doc(json!({"kind": "session"})))
            .await
            .expect("set sessions");

        let user = store.get("users", "k").await.expect("get").unwrap();
        assert_eq!(user.get("kind"), Some(&json!("user")));
    }
}
