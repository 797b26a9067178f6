// src/auth/platform.rs
//! Identity-platform capability consumed by the verifiers
//!
//! The production implementation lives in `services::firebase`; tests
//! substitute scripted stubs.

use async_trait::async_trait;

use crate::common::error::AuthError;

/// Decoded identity token as returned by the platform
#[derive(Debug, Clone)]
pub struct DecodedIdToken {
    pub uid: String,
    pub email: Option<String>,
    pub name: Option<String>,
    pub picture: Option<String>,
    pub sign_in_provider: String,
}

/// Account row in the platform's own user store
#[derive(Debug, Clone)]
pub struct PlatformAccount {
    pub uid: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub photo_url: Option<String>,
}

/// New account to create in the platform's user store
#[derive(Debug, Clone)]
pub struct NewPlatformAccount {
    pub email: String,
    pub display_name: Option<String>,
    pub photo_url: Option<String>,
}

/// Verification and account operations backed by the identity platform
///
/// Implementations speak the shared [`AuthError`] taxonomy directly: token
/// problems map to `TokenExpired`/`InvalidToken`, issuer reachability to
/// `VerificationFailed`/`AuthNotInitialized`, account-store problems to
/// `Directory`.
#[async_trait]
pub trait IdentityPlatform: Send + Sync {
    async fn verify_id_token(&self, token: &str) -> Result<DecodedIdToken, AuthError>;

    async fn find_account_by_email(&self, email: &str)
        -> Result<Option<PlatformAccount>, AuthError>;

    async fn create_account(&self, account: NewPlatformAccount)
        -> Result<PlatformAccount, AuthError>;
}
