use async_trait::async_trait;
use reqwest::Client;
use roaster_core::config::RoasterConfig;
use roaster_core::generation::UserInfoService;
use roaster_core::session::UserInfo;
use roaster_core::{Result, RoasterError};

/// Resolves access tokens against the identity provider's user-info endpoint.
#[derive(Clone)]
pub struct HttpUserInfoService {
    client: Client,
    endpoint: String,
}

impl HttpUserInfoService {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into(),
        }
    }

    pub fn from_config(config: &RoasterConfig) -> Self {
        Self::new(config.user_info_url.clone())
    }
}

#[async_trait]
impl UserInfoService for HttpUserInfoService {
    async fn fetch_user_info(&self, access_token: &str) -> Result<UserInfo> {
        let response = self
            .client
            .get(&self.endpoint)
            .bearer_auth(access_token)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!("[Auth] User info request rejected: {}", status);
            return Err(RoasterError::auth(format!(
                "user info request returned {}",
                status.as_u16()
            )));
        }

        Ok(response.json::<UserInfo>().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_fetch_user_info_with_bearer_token() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/oauth2/v2/userinfo"))
            .and(header("authorization", "Bearer tok-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "42",
                "email": "jane@example.com",
                "name": "Jane",
                "picture": "https://img/jane.png",
                "verified_email": true
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let service =
            HttpUserInfoService::new(format!("{}/oauth2/v2/userinfo", mock_server.uri()));
        let info = service.fetch_user_info("tok-1").await.unwrap();

        assert_eq!(info.id, "42");
        assert_eq!(info.email, "jane@example.com");
        assert_eq!(info.name, "Jane");
    }

    #[tokio::test]
    async fn test_rejected_token_is_auth_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&mock_server)
            .await;

        let service = HttpUserInfoService::new(mock_server.uri());
        let err = service.fetch_user_info("expired").await.unwrap_err();
        assert!(matches!(err, RoasterError::Auth(_)));
    }
}
