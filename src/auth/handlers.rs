//! Authentication handlers

use axum::extract::{Extension, Json};
use std::sync::Arc;
use tracing::info;

use super::extractors::AuthedUser;
use super::models::{Provider, SocialLoginRequest, TokenResponse, UserRecord};
use crate::common::{AppState, AuthError};

/// POST /auth/google/login
/// Authenticates a user via a Google-issued Firebase id token
///
/// # Request Body
/// ```json
/// {
///   "token": "<firebase id token>"
/// }
/// ```
///
/// # Response
/// ```json
/// {
///   "access_token": "<session jwt>",
///   "token_type": "bearer"
/// }
/// ```
pub async fn google_login(
    Extension(state): Extension<Arc<AppState>>,
    Json(payload): Json<SocialLoginRequest>,
) -> Result<Json<TokenResponse>, AuthError> {
    info!("🔐 Received Google login request");

    let token = state.auth.login(Provider::Google, &payload.token).await?;
    Ok(Json(TokenResponse::bearer(token)))
}

/// POST /auth/apple/login
/// Same flow as Google; Apple sign-ins also arrive as Firebase id tokens
pub async fn apple_login(
    Extension(state): Extension<Arc<AppState>>,
    Json(payload): Json<SocialLoginRequest>,
) -> Result<Json<TokenResponse>, AuthError> {
    info!("🔐 Received Apple login request");

    let token = state.auth.login(Provider::Apple, &payload.token).await?;
    Ok(Json(TokenResponse::bearer(token)))
}

/// POST /auth/kakao/login
/// Authenticates a user via a Kakao OAuth access token
pub async fn kakao_login(
    Extension(state): Extension<Arc<AppState>>,
    Json(payload): Json<SocialLoginRequest>,
) -> Result<Json<TokenResponse>, AuthError> {
    info!("🔐 Received Kakao login request");

    let token = state.auth.login(Provider::Kakao, &payload.token).await?;
    Ok(Json(TokenResponse::bearer(token)))
}

/// GET /auth/me
/// Returns the authenticated user's record
///
/// # Response
/// ```json
/// {
///   "uid": "...",
///   "email": "...",
///   "display_name": "...",
///   "avatar_url": null,
///   "provider_id": "google.com",
///   "created_at": "...",
///   "last_login_at": "..."
/// }
/// ```
pub async fn me_handler(authed: AuthedUser) -> Json<UserRecord> {
    Json(authed.user)
}
