// src/services/kakao.rs
//! Kakao user-info client
//!
//! Exchanges a Kakao OAuth access token for the account profile via the
//! `/v2/user/me` endpoint. Only the fields this service reads are
//! deserialized; everything else in the Kakao response is ignored.

use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::common::error::AuthError;
use crate::common::helpers::safe_token_log;

#[derive(Debug, Deserialize)]
pub struct KakaoUserInfo {
    pub id: Option<i64>,
    pub kakao_account: Option<KakaoAccount>,
}

#[derive(Debug, Default, Deserialize)]
pub struct KakaoAccount {
    pub email: Option<String>,
    pub profile: Option<KakaoProfile>,
}

#[derive(Debug, Default, Deserialize)]
pub struct KakaoProfile {
    pub nickname: Option<String>,
    pub profile_image_url: Option<String>,
}

#[derive(Clone)]
pub struct KakaoClient {
    http: Client,
    user_info_url: String,
}

impl KakaoClient {
    pub fn new(http: Client, user_info_url: String) -> Self {
        Self {
            http,
            user_info_url,
        }
    }

    /// Fetch the account profile for a Kakao access token
    ///
    /// Any transport failure or non-2xx response maps to
    /// `AuthError::ExternalProvider`; Kakao never sees our own errors.
    pub async fn fetch_user_info(&self, access_token: &str) -> Result<KakaoUserInfo, AuthError> {
        debug!(token = %safe_token_log(access_token), "Fetching Kakao user info");

        let response = self
            .http
            .get(&self.user_info_url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "Kakao user info request failed");
                AuthError::ExternalProvider(format!("kakao request failed: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(http_status = %status, body = %body, "Kakao rejected the access token");
            return Err(AuthError::ExternalProvider(format!(
                "kakao api returned status {}",
                status.as_u16()
            )));
        }

        response.json::<KakaoUserInfo>().await.map_err(|e| {
            warn!(error = %e, "Kakao returned an unparseable body");
            AuthError::ExternalProvider("kakao returned an unreadable response".to_string())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn kakao_server(status: u16, body: serde_json::Value) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/user/me"))
            .respond_with(ResponseTemplate::new(status).set_body_json(body))
            .mount(&server)
            .await;
        server
    }

    fn client_for(server: &MockServer) -> KakaoClient {
        KakaoClient::new(Client::new(), format!("{}/v2/user/me", server.uri()))
    }

    #[tokio::test]
    async fn parses_a_full_kakao_profile() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/user/me"))
            .and(header("Authorization", "Bearer kakao-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": 42,
                "kakao_account": {
                    "email": "a@b.com",
                    "profile": {
                        "nickname": "Kim",
                        "profile_image_url": "https://img.example.com/kim.png"
                    }
                }
            })))
            .mount(&server)
            .await;

        let info = client_for(&server)
            .fetch_user_info("kakao-token")
            .await
            .unwrap();

        assert_eq!(info.id, Some(42));
        let account = info.kakao_account.unwrap();
        assert_eq!(account.email.as_deref(), Some("a@b.com"));
        let profile = account.profile.unwrap();
        assert_eq!(profile.nickname.as_deref(), Some("Kim"));
        assert_eq!(
            profile.profile_image_url.as_deref(),
            Some("https://img.example.com/kim.png")
        );
    }

    #[tokio::test]
    async fn minimal_body_parses_without_account() {
        let server = kakao_server(200, json!({ "id": 42 })).await;

        let info = client_for(&server).fetch_user_info("t").await.unwrap();

        assert_eq!(info.id, Some(42));
        assert!(info.kakao_account.is_none());
    }

    #[tokio::test]
    async fn rejected_token_is_an_external_provider_error() {
        let server = kakao_server(401, json!({ "msg": "invalid token", "code": -401 })).await;

        let err = client_for(&server)
            .fetch_user_info("bad-token")
            .await
            .unwrap_err();

        match err {
            AuthError::ExternalProvider(detail) => assert!(detail.contains("401")),
            other => panic!("expected ExternalProvider, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn unreachable_kakao_is_an_external_provider_error() {
        let client = KakaoClient::new(Client::new(), "http://127.0.0.1:1/v2/user/me".to_string());

        let err = client.fetch_user_info("t").await.unwrap_err();

        assert!(matches!(err, AuthError::ExternalProvider(_)));
    }
}
