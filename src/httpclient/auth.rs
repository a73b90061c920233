use crate::api::{ApiClientError, ErrorKind};
use reqwest::Client as ReqwestClient;
use serde::Deserialize;
use tokio::sync::Mutex;

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Obtains an access token with the OAuth2 client credentials grant.
///
/// The first token is cached for the lifetime of the handler and is not refreshed.
pub struct AuthenticationHandler {
    token_url: url::Url,
    client_id: String,
    client_secret: String,
    token: Mutex<Option<String>>,
}

impl AuthenticationHandler {
    pub fn new(token_url: url::Url, client_id: &str, client_secret: &str) -> AuthenticationHandler {
        AuthenticationHandler {
            token_url,
            client_id: client_id.to_string(),
            client_secret: client_secret.to_string(),
            token: Mutex::new(None),
        }
    }

    pub async fn access_token(&self, client: &ReqwestClient) -> Result<String, ApiClientError> {
        let mut cached = self.token.lock().await;
        if let Some(token) = cached.as_ref() {
            return Ok(token.clone());
        }

        log::debug!(
            "Requesting an access token from [{}] for client [{}]",
            &self.token_url,
            &self.client_id
        );
        let form = [
            ("grant_type", "client_credentials"),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
        ];
        let response = match client.post(self.token_url.clone()).form(&form).send().await {
            Ok(resp) => resp,
            Err(e) => {
                log::warn!("Token request send failure: {}", e);
                return Err(ApiClientError::new(
                    ErrorKind::Transport,
                    line!(),
                    &format!("token request failed: {}", e),
                ));
            }
        };

        if !response.status().is_success() {
            let status = response.status().as_u16();
            log::warn!("Token request failure: {}", status);
            let body = response.text().await.unwrap_or_default();
            return Err(ApiClientError::status(status, &body));
        }

        let body = response.bytes().await.map_err(|e| {
            ApiClientError::new(ErrorKind::Transport, line!(), &e.to_string())
        })?;
        let token: TokenResponse = serde_json::from_slice(&body)?;
        *cached = Some(token.access_token.clone());
        Ok(token.access_token)
    }
}
