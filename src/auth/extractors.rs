//! Authentication extractors for Axum

use async_trait::async_trait;
use axum::{
    extract::{Extension, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};
use std::sync::Arc;
use tracing::{debug, warn};

use super::models::UserRecord;
use crate::common::{safe_email_log, AppState, AuthError};

/// Authenticated user extractor
///
/// Validates the session token from the Authorization header and loads
/// the user record it refers to. Handlers that take this parameter only
/// run for live sessions.
#[derive(Debug)]
pub struct AuthedUser {
    pub user: UserRecord,
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthedUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        // Extract the Extension containing the AppState
        let Extension(app_state): Extension<Arc<AppState>> =
            Extension::from_request_parts(parts, state)
                .await
                .map_err(|_| AuthError::Internal("missing app state".to_string()))?;

        // Extract Bearer token from Authorization header
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .map(|s| s.to_string());

        let token = match token {
            Some(t) => t,
            None => {
                warn!("Authentication failed: missing Authorization header");
                return Err(AuthError::InvalidToken);
            }
        };

        // Handle "Bearer <token>" format or raw token
        let bare_token = if let Some(rest) = token.strip_prefix("Bearer ") {
            rest.to_string()
        } else {
            token
        };

        let user = app_state.auth.authenticate(&bare_token).await?;

        debug!(
            uid = %user.uid,
            email = %user.email.as_deref().map(safe_email_log).unwrap_or_default(),
            "User authentication successful via extractor"
        );

        Ok(AuthedUser { user })
    }
}
