//! Authentication data models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity providers accepted by the login endpoints
///
/// Serialized with the federated provider ids used in identity token claims
/// (`google.com`, `apple.com`, `kakao.com`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Provider {
    #[serde(rename = "google.com")]
    Google,
    #[serde(rename = "apple.com")]
    Apple,
    #[serde(rename = "kakao.com")]
    Kakao,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Google => "google.com",
            Provider::Apple => "apple.com",
            Provider::Kakao => "kakao.com",
        }
    }

    /// Parse the `firebase.sign_in_provider` claim; anything outside the
    /// fixed enumeration is rejected by the caller
    pub fn from_sign_in_provider(value: &str) -> Option<Self> {
        match value {
            "google.com" => Some(Provider::Google),
            "apple.com" => Some(Provider::Apple),
            "kakao.com" => Some(Provider::Kakao),
            _ => None,
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Provider-agnostic claim set produced by a successful verification
#[derive(Debug, Clone)]
pub struct NormalizedClaims {
    pub subject_id: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    pub provider: Provider,
}

/// Canonical user record, one per subject id
///
/// `created_at` is set once on first login; `last_login_at` is the only
/// field refreshed on subsequent logins.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    pub uid: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    pub provider_id: Provider,
    pub created_at: DateTime<Utc>,
    pub last_login_at: DateTime<Utc>,
}

/// Claims embedded in a session token
#[derive(Serialize, Deserialize, Debug)]
pub struct SessionClaims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

/// Request body shared by all social login endpoints
#[derive(Deserialize)]
pub struct SocialLoginRequest {
    pub token: String,
}

/// Response body for successful logins
#[derive(Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

impl TokenResponse {
    pub fn bearer(access_token: String) -> Self {
        Self {
            access_token,
            token_type: "bearer".to_string(),
        }
    }
}
