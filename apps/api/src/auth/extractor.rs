use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use serde::Serialize;
use tracing::{error, warn};
use uuid::Uuid;

use crate::auth::identity::IdentityError;
use crate::errors::AppError;
use crate::models::user::{Role, UserRow};
use crate::state::AppState;

/// The authenticated caller, resolved from the bearer token and the local
/// `users` table. Add it to a handler's arguments to require authentication.
#[derive(Debug, Clone, Serialize)]
pub struct CurrentUser {
    pub id: Uuid,
    pub email: String,
    pub role: Role,
}

impl CurrentUser {
    /// Fails with 403 unless the caller holds one of `allowed`.
    pub fn require(&self, allowed: &[Role]) -> Result<(), AppError> {
        if allowed.contains(&self.role) {
            return Ok(());
        }
        let required = allowed
            .iter()
            .map(|r| r.as_str())
            .collect::<Vec<_>>()
            .join(" or ");
        warn!(
            user_id = %self.id,
            role = %self.role,
            required = %required,
            "Role mismatch"
        );
        Err(AppError::Forbidden(format!(
            "Required role: {required}, but user has role: {}",
            self.role
        )))
    }
}

/// Extracts the token from an `Authorization: Bearer <token>` header value.
pub fn bearer_token(header: Option<&str>) -> Option<&str> {
    let token = header?.strip_prefix("Bearer ")?.trim();
    (!token.is_empty()).then_some(token)
}

/// True when the provider reports an email that the local row does not match.
fn email_drifted(provider: Option<&str>, local: &str) -> bool {
    provider.is_some_and(|email| !email.trim().eq_ignore_ascii_case(local.trim()))
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, AppError> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok());
        let token = bearer_token(header).ok_or_else(|| {
            AppError::Unauthorized("Missing or invalid authorization header".to_string())
        })?;

        let identity = state.identity.verify(token).await.map_err(|e| match e {
            IdentityError::Rejected(_) => {
                AppError::Unauthorized("Invalid or expired token".to_string())
            }
            other => {
                error!("Authentication failed: {other}");
                AppError::Internal(anyhow::anyhow!("Authentication failed: {other}"))
            }
        })?;

        let user = sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE id = $1")
            .bind(identity.id)
            .fetch_optional(&state.db)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        let role = user.role.parse::<Role>().map_err(|e| {
            warn!(user_id = %user.id, "User has unsupported role: {e}");
            AppError::Forbidden(format!("Unsupported role: {}", user.role))
        })?;

        if email_drifted(identity.email.as_deref(), &user.email) {
            warn!(
                user_id = %user.id,
                provider_email = ?identity.email,
                local_email = %user.email,
                "Local user email differs from identity provider"
            );
        }

        Ok(CurrentUser {
            id: user.id,
            email: user.email,
            role,
        })
    }
}
