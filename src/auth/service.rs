// src/auth/service.rs
//! Login orchestration
//!
//! `AuthService` is the single entry point the handlers talk to. A login
//! verifies the provider credential, resolves the canonical user record
//! and issues a session token for it. `authenticate` is the reverse
//! direction, used by the request extractor.

use tracing::{info, warn};

use super::directory::UserDirectory;
use super::models::{NormalizedClaims, Provider, UserRecord};
use super::token::SessionTokenCodec;
use super::verifier::{FirebaseVerifier, KakaoVerifier};
use crate::common::error::AuthError;

pub struct AuthService {
    firebase: FirebaseVerifier,
    kakao: KakaoVerifier,
    directory: UserDirectory,
    sessions: SessionTokenCodec,
}

impl AuthService {
    pub fn new(
        firebase: FirebaseVerifier,
        kakao: KakaoVerifier,
        directory: UserDirectory,
        sessions: SessionTokenCodec,
    ) -> Self {
        Self {
            firebase,
            kakao,
            directory,
            sessions,
        }
    }

    /// Verify a provider credential and issue a session token
    ///
    /// The credential is an id token for Google and Apple and an OAuth
    /// access token for Kakao. Nothing is written to the directory unless
    /// verification succeeds.
    pub async fn login(&self, provider: Provider, credential: &str) -> Result<String, AuthError> {
        let claims = self.verify(provider, credential).await?;
        let record = self.directory.get_or_create(&claims).await?;
        let token = self.sessions.issue(&record.uid)?;

        info!(uid = %record.uid, provider = %provider, "Login successful");
        Ok(token)
    }

    /// Resolve a session token back to its user record
    pub async fn authenticate(&self, token: &str) -> Result<UserRecord, AuthError> {
        let claims = self.sessions.verify(token)?;

        match self.directory.find(&claims.sub).await? {
            Some(record) => Ok(record),
            None => {
                warn!(uid = %claims.sub, "Session token subject no longer exists");
                Err(AuthError::InvalidToken)
            }
        }
    }

    async fn verify(
        &self,
        provider: Provider,
        credential: &str,
    ) -> Result<NormalizedClaims, AuthError> {
        match provider {
            Provider::Google | Provider::Apple => self.firebase.verify(credential).await,
            Provider::Kakao => self.kakao.verify(credential).await,
        }
    }
}
