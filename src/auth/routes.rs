//! Authentication routes

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers;

/// Creates and returns the authentication router
///
/// # Routes
/// - `POST /auth/google/login` - Google sign-in via Firebase id token
/// - `POST /auth/apple/login` - Apple sign-in via Firebase id token
/// - `POST /auth/kakao/login` - Kakao sign-in via OAuth access token
/// - `GET /auth/me` - Get current user information
pub fn auth_routes() -> Router {
    Router::new()
        .route("/auth/google/login", post(handlers::google_login))
        .route("/auth/apple/login", post(handlers::apple_login))
        .route("/auth/kakao/login", post(handlers::kakao_login))
        .route("/auth/me", get(handlers::me_handler))
}
