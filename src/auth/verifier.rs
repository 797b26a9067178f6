// src/auth/verifier.rs
//! Credential verifiers
//!
//! Each verifier turns one kind of inbound credential into
//! `NormalizedClaims`. The Firebase verifier handles Google and Apple id
//! tokens; the Kakao verifier exchanges an OAuth access token for a
//! profile and pins it to a backing platform account so the subject id
//! is stable across logins.

use std::sync::Arc;
use tracing::{debug, info, warn};

use super::models::{NormalizedClaims, Provider};
use super::platform::{IdentityPlatform, NewPlatformAccount};
use crate::common::error::AuthError;
use crate::common::helpers::safe_email_log;
use crate::services::kakao::KakaoClient;

pub struct FirebaseVerifier {
    platform: Arc<dyn IdentityPlatform>,
}

impl FirebaseVerifier {
    pub fn new(platform: Arc<dyn IdentityPlatform>) -> Self {
        Self { platform }
    }

    pub async fn verify(&self, id_token: &str) -> Result<NormalizedClaims, AuthError> {
        let decoded = self.platform.verify_id_token(id_token).await?;

        if decoded.uid.is_empty() {
            warn!("Verified token carries no subject id");
            return Err(AuthError::InvalidTokenPayload(
                "token is missing a subject id".to_string(),
            ));
        }

        let provider = Provider::from_sign_in_provider(&decoded.sign_in_provider).ok_or_else(
            || {
                warn!(sign_in_provider = %decoded.sign_in_provider, "Token from an unsupported provider");
                AuthError::InvalidTokenPayload(format!(
                    "unsupported sign-in provider: {}",
                    decoded.sign_in_provider
                ))
            },
        )?;

        debug!(uid = %decoded.uid, provider = %provider, "Identity token verified");

        Ok(NormalizedClaims {
            subject_id: decoded.uid,
            email: decoded.email,
            display_name: decoded.name,
            avatar_url: decoded.picture,
            provider,
        })
    }
}

pub struct KakaoVerifier {
    client: KakaoClient,
    platform: Arc<dyn IdentityPlatform>,
}

impl KakaoVerifier {
    pub fn new(client: KakaoClient, platform: Arc<dyn IdentityPlatform>) -> Self {
        Self { client, platform }
    }

    pub async fn verify(&self, access_token: &str) -> Result<NormalizedClaims, AuthError> {
        let info = self.client.fetch_user_info(access_token).await?;

        let kakao_id = info.id.ok_or_else(|| {
            warn!("Kakao response is missing the account id");
            AuthError::InvalidTokenPayload("kakao response is missing the account id".to_string())
        })?;

        let account = info.kakao_account.unwrap_or_default();
        let email = account.email.ok_or_else(|| {
            warn!(kakao_id, "Kakao account has no email");
            AuthError::InvalidTokenPayload(
                "kakao account email is required for sign-in".to_string(),
            )
        })?;
        let profile = account.profile.unwrap_or_default();

        debug!(kakao_id, email = %safe_email_log(&email), "Kakao profile fetched");

        // Lookup always precedes creation so repeat logins reuse the same
        // backing account.
        let backing = match self.platform.find_account_by_email(&email).await? {
            Some(existing) => existing,
            None => {
                info!(email = %safe_email_log(&email), "Creating backing account for new Kakao user");
                self.platform
                    .create_account(NewPlatformAccount {
                        email: email.clone(),
                        display_name: profile.nickname.clone(),
                        photo_url: profile.profile_image_url.clone(),
                    })
                    .await?
            }
        };

        Ok(NormalizedClaims {
            subject_id: backing.uid,
            email: Some(email),
            display_name: profile.nickname,
            avatar_url: profile.profile_image_url,
            provider: Provider::Kakao,
        })
    }
}
