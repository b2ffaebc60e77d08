use async_trait::async_trait;
use serde::Deserialize;

use relay_common::error::RelayError;
use relay_common::types::Credential;

/// Source of the bearer credential used by the feed fetcher.
#[async_trait]
pub trait CredentialSource: Send + Sync {
    async fn acquire(&self) -> Result<Credential, RelayError>;
}

/// OAuth2 client-credentials exchange against `{api_base}/oauth2/token`.
pub struct ClientCredentials {
    client: reqwest::Client,
    token_url: String,
    consumer_key: String,
    consumer_secret: String,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

impl ClientCredentials {
    pub fn new(
        client: reqwest::Client,
        api_base_url: &str,
        consumer_key: impl Into<String>,
        consumer_secret: impl Into<String>,
    ) -> Self {
        Self {
            client,
            token_url: format!("{}/oauth2/token", api_base_url.trim_end_matches('/')),
            consumer_key: consumer_key.into(),
            consumer_secret: consumer_secret.into(),
        }
    }
}

#[async_trait]
impl CredentialSource for ClientCredentials {
    async fn acquire(&self) -> Result<Credential, RelayError> {
        let resp = self
            .client
            .post(&self.token_url)
            .basic_auth(&self.consumer_key, Some(&self.consumer_secret))
            .header(
                reqwest::header::CONTENT_TYPE,
                "application/x-www-form-urlencoded",
            )
            .body("grant_type=client_credentials")
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            tracing::error!(
                status = status.as_u16(),
                body = %body,
                "Token endpoint rejected client credentials"
            );
            return Err(RelayError::Auth(format!(
                "token endpoint returned {}: {}",
                status.as_u16(),
                body
            )));
        }

        let token: TokenResponse = serde_json::from_str(&body)
            .map_err(|e| RelayError::Auth(format!("malformed token response: {e}")))?;
        if token.access_token.is_empty() {
            return Err(RelayError::Auth("token endpoint returned an empty access_token".into()));
        }

        tracing::info!("Obtained bearer token");
        Ok(Credential::new(token.access_token))
    }
}
