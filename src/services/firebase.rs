// src/services/firebase.rs
//! Firebase identity platform client
//!
//! Two responsibilities live here. Token verification pulls the public
//! signing keys from the securetoken JWKS endpoint, caches them by key id
//! and checks RS256 signatures locally. Account management talks to the
//! Identity Toolkit API with a service-account access token obtained
//! through the JWT bearer grant and cached until shortly before expiry.
//!
//! No lock is ever held across a network call. Key refresh fetches first
//! and swaps the cache afterwards; verification decodes under a read
//! guard, which is pure CPU work.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{
    decode, decode_header, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

use crate::auth::platform::{
    DecodedIdToken, IdentityPlatform, NewPlatformAccount, PlatformAccount,
};
use crate::common::config::{ConfigError, ServiceAccountKey};
use crate::common::error::AuthError;

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const IDENTITY_TOOLKIT_SCOPE: &str = "https://www.googleapis.com/auth/identitytoolkit";

/// Cached access tokens are replaced this many seconds before they expire
const TOKEN_EXPIRY_MARGIN_SECS: i64 = 60;

pub struct FirebaseIdentityPlatform {
    http: Client,
    project_id: String,
    issuer: String,
    jwks_url: String,
    identity_toolkit_url: String,
    token_uri: String,
    client_email: String,
    private_key_id: Option<String>,
    signing_key: EncodingKey,
    jwks: RwLock<HashMap<String, DecodingKey>>,
    token_cache: RwLock<Option<CachedAccessToken>>,
}

struct CachedAccessToken {
    token: String,
    expires_at: DateTime<Utc>,
}

#[derive(Deserialize)]
struct JwksResponse {
    keys: Vec<Jwk>,
}

#[derive(Deserialize)]
struct Jwk {
    kid: String,
    n: String,
    e: String,
    #[serde(default)]
    kty: String,
}

#[derive(Debug, Deserialize)]
struct IdTokenClaims {
    #[serde(default)]
    sub: String,
    email: Option<String>,
    name: Option<String>,
    picture: Option<String>,
    #[serde(default)]
    firebase: FirebaseClaim,
}

#[derive(Debug, Default, Deserialize)]
struct FirebaseClaim {
    #[serde(default)]
    sign_in_provider: String,
}

#[derive(Serialize)]
struct AccessTokenAssertion<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Deserialize)]
struct AccessTokenResponse {
    access_token: String,
    expires_in: i64,
}

#[derive(Serialize)]
struct AccountLookupRequest {
    email: Vec<String>,
}

#[derive(Deserialize)]
struct AccountLookupResponse {
    #[serde(default)]
    users: Vec<RawAccount>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawAccount {
    local_id: String,
    email: Option<String>,
    display_name: Option<String>,
    photo_url: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateAccountRequest {
    email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    photo_url: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateAccountResponse {
    local_id: String,
}

impl FirebaseIdentityPlatform {
    pub fn new(
        http: Client,
        service_account: ServiceAccountKey,
        jwks_url: String,
        identity_toolkit_url: String,
    ) -> Result<Self, ConfigError> {
        let signing_key = EncodingKey::from_rsa_pem(service_account.private_key.as_bytes())
            .map_err(|e| ConfigError::ServiceAccount(format!("invalid RSA private key: {}", e)))?;

        Ok(Self {
            http,
            issuer: format!(
                "https://securetoken.google.com/{}",
                service_account.project_id
            ),
            project_id: service_account.project_id,
            jwks_url,
            identity_toolkit_url,
            token_uri: service_account.token_uri,
            client_email: service_account.client_email,
            private_key_id: service_account.private_key_id,
            signing_key,
            jwks: RwLock::new(HashMap::new()),
            token_cache: RwLock::new(None),
        })
    }

    /// Replace the cached signing keys with a fresh JWKS fetch
    ///
    /// When the fetch fails and no keys were ever loaded, verification
    /// cannot work at all and the error is `AuthNotInitialized`. With a
    /// warm cache the stale keys stay usable and the failure surfaces as
    /// `VerificationFailed`.
    pub async fn refresh_keys(&self) -> Result<(), AuthError> {
        match self.fetch_keys().await {
            Ok(keys) => {
                let key_count = keys.len();
                let mut cache = self.jwks.write().await;
                *cache = keys;
                info!(key_count, "Refreshed identity token signing keys");
                Ok(())
            }
            Err(detail) => {
                warn!(error = %detail, "Failed to refresh identity token signing keys");
                if self.jwks.read().await.is_empty() {
                    Err(AuthError::AuthNotInitialized)
                } else {
                    Err(AuthError::VerificationFailed(detail))
                }
            }
        }
    }

    async fn fetch_keys(&self) -> Result<HashMap<String, DecodingKey>, String> {
        let response = self
            .http
            .get(&self.jwks_url)
            .send()
            .await
            .map_err(|e| format!("jwks request failed: {}", e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(format!("jwks endpoint returned status {}", status.as_u16()));
        }

        let body: JwksResponse = response
            .json()
            .await
            .map_err(|e| format!("jwks endpoint returned an unreadable response: {}", e))?;

        let mut keys = HashMap::new();
        for jwk in body.keys {
            if jwk.kty != "RSA" {
                continue;
            }
            match DecodingKey::from_rsa_components(&jwk.n, &jwk.e) {
                Ok(key) => {
                    keys.insert(jwk.kid, key);
                }
                Err(e) => {
                    warn!(kid = %jwk.kid, error = %e, "Skipping unparseable signing key");
                }
            }
        }

        if keys.is_empty() {
            return Err("jwks endpoint returned no usable keys".to_string());
        }
        Ok(keys)
    }

    /// Service-account access token for the Identity Toolkit API, cached
    /// until `TOKEN_EXPIRY_MARGIN_SECS` before its expiry
    async fn access_token(&self) -> Result<String, AuthError> {
        let now = Utc::now();
        {
            let cache = self.token_cache.read().await;
            if let Some(cached) = cache.as_ref() {
                if cached.expires_at > now + Duration::seconds(TOKEN_EXPIRY_MARGIN_SECS) {
                    return Ok(cached.token.clone());
                }
            }
        }

        let mut header = Header::new(Algorithm::RS256);
        header.kid = self.private_key_id.clone();
        let assertion = AccessTokenAssertion {
            iss: &self.client_email,
            scope: IDENTITY_TOOLKIT_SCOPE,
            aud: &self.token_uri,
            iat: now.timestamp(),
            exp: (now + Duration::hours(1)).timestamp(),
        };
        let signed = encode(&header, &assertion, &self.signing_key).map_err(|e| {
            AuthError::Directory(format!("failed to sign service account assertion: {}", e))
        })?;

        let response = self
            .http
            .post(&self.token_uri)
            .form(&[
                ("grant_type", JWT_BEARER_GRANT),
                ("assertion", signed.as_str()),
            ])
            .send()
            .await
            .map_err(|e| AuthError::Directory(format!("token grant request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(http_status = %status, body = %body, "Service account token grant was rejected");
            return Err(AuthError::Directory(format!(
                "token grant returned status {}",
                status.as_u16()
            )));
        }

        let granted: AccessTokenResponse = response.json().await.map_err(|e| {
            AuthError::Directory(format!("token grant returned an unreadable response: {}", e))
        })?;

        let mut cache = self.token_cache.write().await;
        *cache = Some(CachedAccessToken {
            token: granted.access_token.clone(),
            expires_at: now + Duration::seconds(granted.expires_in),
        });

        Ok(granted.access_token)
    }
}

#[async_trait]
impl IdentityPlatform for FirebaseIdentityPlatform {
    async fn verify_id_token(&self, token: &str) -> Result<DecodedIdToken, AuthError> {
        let header = decode_header(token).map_err(|e| {
            debug!(error = %e, "Identity token header is unreadable");
            AuthError::InvalidToken
        })?;
        let kid = header.kid.ok_or(AuthError::InvalidToken)?;

        // Keys rotate server-side. An unknown kid triggers one refresh
        // before the token is rejected.
        if !self.jwks.read().await.contains_key(&kid) {
            debug!(kid = %kid, "Unknown signing key, refreshing key set");
            self.refresh_keys().await?;
        }

        let keys = self.jwks.read().await;
        let key = keys.get(&kid).ok_or(AuthError::InvalidToken)?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_issuer(&[&self.issuer]);
        validation.set_audience(&[&self.project_id]);

        let decoded = decode::<IdTokenClaims>(token, key, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => {
                    debug!(error = %e, "Identity token rejected");
                    AuthError::InvalidToken
                }
            }
        })?;

        let claims = decoded.claims;
        Ok(DecodedIdToken {
            uid: claims.sub,
            email: claims.email,
            name: claims.name,
            picture: claims.picture,
            sign_in_provider: claims.firebase.sign_in_provider,
        })
    }

    async fn find_account_by_email(&self, email: &str) -> Result<Option<PlatformAccount>, AuthError> {
        let access_token = self.access_token().await?;
        let url = format!(
            "{}/projects/{}/accounts:lookup",
            self.identity_toolkit_url, self.project_id
        );

        let response = self
            .http
            .post(&url)
            .bearer_auth(access_token)
            .json(&AccountLookupRequest {
                email: vec![email.to_string()],
            })
            .send()
            .await
            .map_err(|e| AuthError::Directory(format!("account lookup request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(http_status = %status, body = %body, "Account lookup was rejected");
            return Err(AuthError::Directory(format!(
                "account lookup returned status {}",
                status.as_u16()
            )));
        }

        let body: AccountLookupResponse = response.json().await.map_err(|e| {
            AuthError::Directory(format!(
                "account lookup returned an unreadable response: {}",
                e
            ))
        })?;

        Ok(body.users.into_iter().next().map(|account| PlatformAccount {
            uid: account.local_id,
            email: account.email,
            display_name: account.display_name,
            photo_url: account.photo_url,
        }))
    }

    async fn create_account(&self, account: NewPlatformAccount) -> Result<PlatformAccount, AuthError> {
        let access_token = self.access_token().await?;
        let url = format!(
            "{}/projects/{}/accounts",
            self.identity_toolkit_url, self.project_id
        );

        let request = CreateAccountRequest {
            email: account.email.clone(),
            display_name: account.display_name.clone(),
            photo_url: account.photo_url.clone(),
        };

        let response = self
            .http
            .post(&url)
            .bearer_auth(access_token)
            .json(&request)
            .send()
            .await
            .map_err(|e| AuthError::Directory(format!("account creation request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(http_status = %status, body = %body, "Account creation was rejected");
            return Err(AuthError::Directory(format!(
                "account creation returned status {}",
                status.as_u16()
            )));
        }

        let created: CreateAccountResponse = response.json().await.map_err(|e| {
            AuthError::Directory(format!(
                "account creation returned an unreadable response: {}",
                e
            ))
        })?;

        info!(uid = %created.local_id, "Created backing platform account");
        Ok(PlatformAccount {
            uid: created.local_id,
            email: Some(account.email),
            display_name: account.display_name,
            photo_url: account.photo_url,
        })
    }
}
