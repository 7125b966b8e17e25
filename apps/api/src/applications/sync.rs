//! Registration of local applications with the AI backend.
//!
//! Registration runs when an application is created. If it fails there, it is
//! attempted again, unchanged, on the next resume upload for the same
//! application. There is no backoff and no idempotency key beyond the
//! application id.

use sqlx::PgPool;
use thiserror::Error;
use tracing::{error, info};

use crate::ai_backend::{AiBackendClient, AiBackendError, CreateApplicationRequest};
use crate::applications::repository::set_ai_application_id;
use crate::db::is_schema_drift;
use crate::errors::AppError;
use crate::models::application::ApplicationRow;
use crate::models::job::JobRow;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error(transparent)]
    Ai(#[from] AiBackendError),

    #[error("AI backend did not return application_id")]
    MissingId,

    #[error("Database schema is out of date. Please run migrations to add the ai_application_id column.")]
    SchemaDrift,

    #[error("Update returned no rows")]
    NotPersisted,

    #[error("Failed to store AI application id: {0}")]
    Database(sqlx::Error),
}

impl From<SyncError> for AppError {
    fn from(err: SyncError) -> Self {
        AppError::AiBackend {
            status: axum::http::StatusCode::INTERNAL_SERVER_ERROR,
            message: "Failed to sync with AI backend. Please try again later.".to_string(),
            details: serde_json::Value::String(err.to_string()),
        }
    }
}

/// Registers `application` and persists the returned correlation id.
pub async fn register(
    pool: &PgPool,
    ai: &AiBackendClient,
    application: &ApplicationRow,
    job: &JobRow,
) -> Result<String, SyncError> {
    info!(application_id = %application.id, "Registering application with AI backend");

    let response = ai
        .create_application(&CreateApplicationRequest {
            job_id: job.id,
            job_description: job.screening_description(),
            resume_text: "",
        })
        .await?;
    let ai_id = response.application_id().ok_or(SyncError::MissingId)?;

    let updated = set_ai_application_id(pool, application.id, &ai_id)
        .await
        .map_err(|e| {
            if is_schema_drift(&e) {
                error!(
                    application_id = %application.id,
                    "Column 'ai_application_id' is missing. Please run migrations."
                );
                SyncError::SchemaDrift
            } else {
                SyncError::Database(e)
            }
        })?;
    if updated == 0 {
        return Err(SyncError::NotPersisted);
    }

    info!(application_id = %application.id, ai_application_id = %ai_id, "Application synced with AI backend");
    Ok(ai_id)
}
