use async_trait::async_trait;
use serde_json::json;

use crate::auth::dto::{LoginResponse, RegisterResponse};
use crate::users::dto::PublicUser;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The server answered with a failure body; `message` is surfaced
    /// verbatim to whoever renders it.
    #[error("{message}")]
    Api { status: u16, message: String },
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

/// The slice of the HTTP surface the session manager needs. A trait so
/// tests drive the state machine without a server.
#[async_trait]
pub trait SessionApi: Send + Sync {
    async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<PublicUser, ClientError>;
    async fn login(&self, email: &str, password: &str)
        -> Result<(String, PublicUser), ClientError>;
    async fn profile(&self, token: &str) -> Result<PublicUser, ClientError>;
}

pub struct HttpApi {
    base_url: String,
    client: reqwest::Client,
}

impl HttpApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn fail(response: reqwest::Response) -> ClientError {
        let status = response.status().as_u16();
        let message = response
            .json::<serde_json::Value>()
            .await
            .ok()
            .and_then(|body| {
                body.get("message")
                    .and_then(|m| m.as_str())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| "Something went wrong".to_string());
        ClientError::Api { status, message }
    }
}

#[async_trait]
impl SessionApi for HttpApi {
    async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<PublicUser, ClientError> {
        let response = self
            .client
            .post(self.url("/auth/register"))
            .json(&json!({ "name": name, "email": email, "password": password }))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Self::fail(response).await);
        }
        let body: RegisterResponse = response.json().await?;
        Ok(body.user)
    }

    async fn login(
        &self,
        email: &str,
        password: &str,
    ) -> Result<(String, PublicUser), ClientError> {
        let response = self
            .client
            .post(self.url("/auth/login"))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Self::fail(response).await);
        }
        let body: LoginResponse = response.json().await?;
        Ok((body.token, body.user))
    }

    async fn profile(&self, token: &str) -> Result<PublicUser, ClientError> {
        let response = self
            .client
            .get(self.url("/profile"))
            .bearer_auth(token)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Self::fail(response).await);
        }
        Ok(response.json().await?)
    }
}
