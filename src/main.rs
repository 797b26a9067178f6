// src/main.rs
use axum::{extract::Extension, routing::get, Json, Router};
use dotenv::dotenv;
use reqwest::Client;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::path::PathBuf;
use std::time::Duration;
use std::{net::SocketAddr, str::FromStr, sync::Arc};
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

// ============================================================================
// MODULE IMPORTS
// ============================================================================

mod auth;
mod common;
mod services;
mod store;

// ============================================================================
// COMMON IMPORTS
// ============================================================================

use auth::directory::UserDirectory;
use auth::token::SessionTokenCodec;
use auth::verifier::{FirebaseVerifier, KakaoVerifier};
use auth::AuthService;
use common::{AppConfig, AppState};
use services::{FirebaseIdentityPlatform, KakaoClient};
use store::SqliteStore;

/// GET /
/// Service health check
async fn root() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "service": "auth-api", "status": "ok" }))
}

// ============================================================================
// MAIN APPLICATION ENTRY POINT
// ============================================================================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    // ========================================================================
    // CONFIGURATION
    // ========================================================================

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Invalid configuration, refusing to start");
            return Err(e.into());
        }
    };

    // ========================================================================
    // DATABASE SETUP
    // ========================================================================

    let path_part = config
        .database_url
        .strip_prefix("sqlite://")
        .or_else(|| config.database_url.strip_prefix("sqlite:"));
    if let Some(path_part) = path_part {
        let path_without_params = path_part.split('?').next().unwrap_or("");
        if !path_without_params.is_empty() && !path_without_params.starts_with(':') {
            let db_path = PathBuf::from(path_without_params);
            if let Some(parent) = db_path.parent() {
                if !parent.as_os_str().is_empty() {
                    tokio::fs::create_dir_all(parent).await?;
                }
            }
        }
    }

    let connect_options = SqliteConnectOptions::from_str(&config.database_url)?
        .create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .connect_with(connect_options)
        .await?;

    // Run database migrations
    common::migrations::run_migrations(&pool).await?;

    // ========================================================================
    // SERVICE INITIALIZATION
    // ========================================================================

    let http_client = Client::builder()
        .timeout(Duration::from_secs(config.http_timeout_secs))
        .build()?;

    let platform = Arc::new(FirebaseIdentityPlatform::new(
        http_client.clone(),
        config.service_account.clone(),
        config.firebase_jwks_url.clone(),
        config.identity_toolkit_url.clone(),
    )?);
    info!(
        project_id = %config.service_account.project_id,
        "FirebaseIdentityPlatform initialized"
    );

    // A failed fetch here is not fatal. Verification refreshes on demand
    // and reports the auth system as uninitialized until a fetch succeeds.
    if let Err(e) = platform.refresh_keys().await {
        warn!(error = %e, "Could not prime identity token signing keys");
    }

    let store = Arc::new(SqliteStore::new(pool));

    let sessions = SessionTokenCodec::new(
        &config.session_secret,
        &config.session_algorithm,
        config.session_ttl_minutes,
    )?;

    let auth_service = Arc::new(AuthService::new(
        FirebaseVerifier::new(platform.clone()),
        KakaoVerifier::new(
            KakaoClient::new(http_client, config.kakao_user_info_url.clone()),
            platform,
        ),
        UserDirectory::new(store),
        sessions,
    ));
    info!("AuthService initialized");

    // ========================================================================
    // APPLICATION STATE
    // ========================================================================

    let state = Arc::new(AppState {
        auth: auth_service,
    });

    // ========================================================================
    // ROUTER COMPOSITION
    // ========================================================================

    let app = Router::new()
        .route("/", get(root))
        // ====================================================================
        // AUTHENTICATION ROUTES
        // ====================================================================
        .merge(auth::auth_routes())
        // ====================================================================
        // MIDDLEWARE AND LAYERS
        // ====================================================================
        .layer(Extension(state))
        .layer({
            let origins: Vec<axum::http::HeaderValue> = config
                .cors_origins
                .split(',')
                .filter_map(|origin| origin.trim().parse().ok())
                .collect();

            CorsLayer::new()
                .allow_origin(origins)
                .allow_methods([
                    axum::http::Method::GET,
                    axum::http::Method::POST,
                    axum::http::Method::OPTIONS,
                ])
                .allow_headers([
                    axum::http::header::CONTENT_TYPE,
                    axum::http::header::AUTHORIZATION,
                ])
                .allow_credentials(true)
        })
        .layer(TraceLayer::new_for_http());

    // ========================================================================
    // SERVER STARTUP
    // ========================================================================

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("Listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}
