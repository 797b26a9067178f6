// src/auth/directory.rs
//! Canonical user records over the document store
//!
//! This module is the only writer of the `users` collection.

use chrono::Utc;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, error, info};

use super::models::{NormalizedClaims, UserRecord};
use crate::common::error::AuthError;
use crate::store::DocumentStore;

const USERS_COLLECTION: &str = "users";

pub struct UserDirectory {
    store: Arc<dyn DocumentStore>,
}

impl UserDirectory {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Fetch the record for an existing user
    pub async fn find(&self, uid: &str) -> Result<Option<UserRecord>, AuthError> {
        let doc = self.store.get(USERS_COLLECTION, uid).await.map_err(|e| {
            error!(error = %e, uid = %uid, "User lookup failed");
            AuthError::Directory(format!("user lookup failed: {}", e))
        })?;

        match doc {
            Some(fields) => Ok(Some(record_from_fields(uid, fields)?)),
            None => Ok(None),
        }
    }

    /// Look up the user for `claims.subject_id`, creating the record on
    /// first login
    ///
    /// Existing records keep their profile fields - a later login never
    /// overwrites `email`, `display_name` or `avatar_url`; only
    /// `last_login_at` changes. New records start with
    /// `created_at == last_login_at`.
    pub async fn get_or_create(&self, claims: &NormalizedClaims) -> Result<UserRecord, AuthError> {
        let uid = claims.subject_id.as_str();
        let now = Utc::now();

        let existing = self.store.get(USERS_COLLECTION, uid).await.map_err(|e| {
            error!(error = %e, uid = %uid, "User lookup failed");
            AuthError::Directory(format!("user lookup failed: {}", e))
        })?;

        match existing {
            Some(fields) => {
                let mut record = record_from_fields(uid, fields)?;
                record.last_login_at = now;

                let mut patch = Map::new();
                let timestamp = serde_json::to_value(now).map_err(|e| {
                    AuthError::Directory(format!("failed to serialize login time: {}", e))
                })?;
                patch.insert("last_login_at".to_string(), timestamp);

                self.store
                    .update(USERS_COLLECTION, uid, patch)
                    .await
                    .map_err(|e| {
                        error!(error = %e, uid = %uid, "Failed to update last login time");
                        AuthError::Directory(format!("user update failed: {}", e))
                    })?;

                debug!(uid = %uid, "Existing user logged in");
                Ok(record)
            }
            None => {
                let record = UserRecord {
                    uid: uid.to_string(),
                    email: claims.email.clone(),
                    display_name: claims.display_name.clone(),
                    avatar_url: claims.avatar_url.clone(),
                    provider_id: claims.provider,
                    created_at: now,
                    last_login_at: now,
                };

                self.store
                    .set(USERS_COLLECTION, uid, fields_from_record(&record)?)
                    .await
                    .map_err(|e| {
                        error!(error = %e, uid = %uid, "Failed to create user record");
                        AuthError::Directory(format!("user creation failed: {}", e))
                    })?;

                info!(uid = %uid, provider = %record.provider_id, "Created new user record");
                Ok(record)
            }
        }
    }
}

fn record_from_fields(uid: &str, fields: Map<String, Value>) -> Result<UserRecord, AuthError> {
    serde_json::from_value(Value::Object(fields)).map_err(|e| {
        error!(error = %e, uid = %uid, "Stored user record is malformed");
        AuthError::Directory(format!("malformed user record: {}", e))
    })
}

fn fields_from_record(record: &UserRecord) -> Result<Map<String, Value>, AuthError> {
    match serde_json::to_value(record) {
        Ok(Value::Object(fields)) => Ok(fields),
        Ok(_) => Err(AuthError::Directory(
            "user record did not serialize to an object".to_string(),
        )),
        Err(e) => Err(AuthError::Directory(format!(
            "failed to serialize user record: {}",
            e
        ))),
    }
}
