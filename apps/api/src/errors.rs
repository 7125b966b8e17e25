use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

use crate::ai_backend::AiBackendError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    /// The application is not in the status the requested transition needs.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("AI backend error: {message}")]
    AiBackend {
        status: StatusCode,
        message: String,
        details: Value,
    },

    #[error("Storage error: {0}")]
    Storage(String),

    /// The resume reached storage but the AI backend did not accept it.
    #[error("Resume stored at {resume_file_url} but AI sync failed: {details}")]
    ResumeSync {
        resume_file_url: String,
        details: String,
    },

    /// The resume reached storage but the application row was not updated.
    #[error("Resume stored at {resume_file_url} but not recorded: {error}")]
    ResumeNotRecorded {
        resume_file_url: String,
        #[source]
        error: sqlx::Error,
    },

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(format!("Invalid request body: {}", rejection.body_text()))
    }
}

impl AppError {
    /// AI failure reported as a 500 under a fixed, action-specific message.
    pub fn ai(message: &str, err: &AiBackendError) -> Self {
        AppError::AiBackend {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.to_string(),
            details: Value::String(err.to_string()),
        }
    }

    /// AI failure that forwards the backend's own message, and its 400 when
    /// the backend rejected the input.
    pub fn ai_passthrough(err: &AiBackendError) -> Self {
        let status = if err.status() == Some(400) {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        AppError::AiBackend {
            status,
            message: err.to_string(),
            details: err
                .body()
                .cloned()
                .unwrap_or_else(|| Value::String(err.to_string())),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let mut details: Option<Value> = None;
        let mut resume_file_url: Option<String> = None;

        let (status, code, message) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg),
            AppError::InvalidState(msg) => (StatusCode::BAD_REQUEST, "INVALID_STATE", msg),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg),
            AppError::Database(e) => {
                tracing::error!("Database error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "A database error occurred".to_string(),
                )
            }
            AppError::AiBackend {
                status,
                message,
                details: extra,
            } => {
                tracing::error!(%status, details = %extra, "AI backend error: {message}");
                details = Some(extra);
                (status, "AI_BACKEND_ERROR", message)
            }
            AppError::Storage(msg) => {
                tracing::error!("Storage error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "STORAGE_ERROR",
                    "Failed to upload resume to storage".to_string(),
                )
            }
            AppError::ResumeSync {
                resume_file_url: url,
                details: extra,
            } => {
                tracing::error!(resume_file_url = %url, "Resume AI sync failed: {extra}");
                details = Some(Value::String(extra));
                resume_file_url = Some(url);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "AI_BACKEND_ERROR",
                    "Resume uploaded but failed to sync with AI backend".to_string(),
                )
            }
            AppError::ResumeNotRecorded {
                resume_file_url: url,
                error,
            } => {
                tracing::error!(resume_file_url = %url, "Failed to record uploaded resume: {error}");
                resume_file_url = Some(url);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "Resume uploaded but failed to update application".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let mut error = json!({
            "code": code,
            "message": message
        });
        if let Some(details) = details {
            error["details"] = details;
        }

        let mut body = json!({ "error": error });
        if let Some(url) = resume_file_url {
            body["resumeFileUrl"] = Value::String(url);
        }

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), 64 * 1024)
            .await
            .expect("read body");
        serde_json::from_slice(&bytes).expect("json body")
    }

    #[tokio::test]
    async fn test_invalid_state_is_bad_request() {
        let response =
            AppError::InvalidState("Resume must be uploaded before screening".into())
                .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "INVALID_STATE");
        assert_eq!(
            body["error"]["message"],
            "Resume must be uploaded before screening"
        );
    }

    #[tokio::test]
    async fn test_database_errors_are_masked() {
        let response = AppError::Database(sqlx::Error::PoolTimedOut).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert_eq!(body["error"]["message"], "A database error occurred");
        assert!(body["error"].get("details").is_none());
    }

    #[tokio::test]
    async fn test_ai_error_carries_details() {
        let err = AiBackendError::Api {
            status: 502,
            message: "upstream down".into(),
            body: None,
        };
        let response = AppError::ai("Screening failed", &err).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert_eq!(body["error"]["message"], "Screening failed");
        assert_eq!(body["error"]["details"], "upstream down");
    }

    #[tokio::test]
    async fn test_ai_passthrough_keeps_backend_bad_request() {
        let err = AiBackendError::Api {
            status: 400,
            message: "Slot is in the past".into(),
            body: Some(json!({ "detail": "Slot is in the past" })),
        };
        let response = AppError::ai_passthrough(&err).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"]["message"], "Slot is in the past");
        assert_eq!(body["error"]["details"]["detail"], "Slot is in the past");
    }

    #[tokio::test]
    async fn test_resume_sync_failure_keeps_url() {
        let response = AppError::ResumeSync {
            resume_file_url: "https://files.example/resumes/a.pdf".into(),
            details: "No response from AI backend".into(),
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert_eq!(body["resumeFileUrl"], "https://files.example/resumes/a.pdf");
    }

    #[tokio::test]
    async fn test_unrecorded_resume_keeps_url_and_masks_database_error() {
        let response = AppError::ResumeNotRecorded {
            resume_file_url: "https://files.example/resumes/a.pdf".into(),
            error: sqlx::Error::PoolTimedOut,
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert_eq!(body["resumeFileUrl"], "https://files.example/resumes/a.pdf");
        assert_eq!(body["error"]["code"], "DATABASE_ERROR");
        assert!(body["error"].get("details").is_none());
    }
}
