//! Client for the external identity provider that issues bearer tokens.

use reqwest::{Client, StatusCode};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

const USER_PATH: &str = "/auth/v1/user";
const REQUEST_TIMEOUT_SECS: u64 = 15;

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("token rejected by identity provider (status {0})")]
    Rejected(u16),

    #[error("identity provider unreachable: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("failed to build identity client: {0}")]
    Client(String),
}

/// The subset of the provider's user object this service relies on.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct IdentityUser {
    pub id: Uuid,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Clone)]
pub struct IdentityClient {
    client: Client,
    base_url: String,
    service_key: String,
}

impl IdentityClient {
    pub fn new(base_url: impl Into<String>, service_key: String) -> Result<Self, IdentityError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| IdentityError::Client(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            service_key,
        })
    }

    /// Resolves a bearer token to the provider's user. Any non-2xx answer,
    /// or a payload without a valid user id, counts as a rejected token.
    pub async fn verify(&self, token: &str) -> Result<IdentityUser, IdentityError> {
        let response = self
            .client
            .get(format!("{}{}", self.base_url, USER_PATH))
            .bearer_auth(token)
            .header("apikey", &self.service_key)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            if status != StatusCode::UNAUTHORIZED && status != StatusCode::FORBIDDEN {
                warn!(status = status.as_u16(), "Identity provider returned unexpected status");
            }
            return Err(IdentityError::Rejected(status.as_u16()));
        }

        let user = response.json::<IdentityUser>().await.map_err(|e| {
            warn!(error = %e, "Identity provider returned an unreadable user");
            IdentityError::Rejected(status.as_u16())
        })?;
        debug!(user_id = %user.id, email = ?user.email, "Bearer token verified");
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::HeaderMap, http::StatusCode as AxumStatus, routing::get, Json, Router};
    use serde_json::json;

    use crate::test_support::{spawn_server, SERVICE_KEY};

    const GOOD_TOKEN: &str = "good-token";

    async fn spawn_identity(user_id: Uuid) -> String {
        let router = Router::new().route(
            USER_PATH,
            get(move |headers: HeaderMap| async move {
                let auth = headers
                    .get("authorization")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or_default()
                    .to_string();
                let apikey = headers
                    .get("apikey")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or_default()
                    .to_string();
                if auth == format!("Bearer {GOOD_TOKEN}") && apikey == SERVICE_KEY {
                    (
                        AxumStatus::OK,
                        Json(json!({ "id": user_id, "email": "rec@example.com" })),
                    )
                } else {
                    (
                        AxumStatus::UNAUTHORIZED,
                        Json(json!({ "msg": "invalid JWT" })),
                    )
                }
            }),
        );
        spawn_server(router).await
    }

    #[tokio::test]
    async fn test_verify_accepts_valid_token() {
        let user_id = Uuid::new_v4();
        let base = spawn_identity(user_id).await;
        let client = IdentityClient::new(base, "service-key".into()).unwrap();

        let user = client.verify(GOOD_TOKEN).await.unwrap();

        assert_eq!(user.id, user_id);
        assert_eq!(user.email.as_deref(), Some("rec@example.com"));
    }

    #[tokio::test]
    async fn test_verify_rejects_bad_token() {
        let base = spawn_identity(Uuid::new_v4()).await;
        let client = IdentityClient::new(base, "service-key".into()).unwrap();

        let err = client.verify("forged").await.unwrap_err();

        assert!(matches!(err, IdentityError::Rejected(401)));
    }
}
