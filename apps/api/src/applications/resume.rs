//! Resume intake: multipart parsing, storage, and forwarding to the AI backend.

use axum::extract::Multipart;
use bytes::Bytes;
use sqlx::PgPool;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::ai_backend::{AiBackendClient, AiBackendError};
use crate::applications::repository::mark_resume_uploaded;
use crate::errors::AppError;
use crate::storage::{resume_object_key, ResumeStorage};

const RESUME_FIELD: &str = "resume";
const PDF_MIME: &str = "application/pdf";
const DEFAULT_FILE_NAME: &str = "resume.pdf";

/// A PDF received from a candidate.
#[derive(Debug, Clone)]
pub struct ResumeUpload {
    pub file_name: String,
    pub bytes: Bytes,
}

/// Reads the `resume` field of a multipart body. Other fields are ignored.
pub async fn read_resume_upload(
    mut multipart: Multipart,
    max_bytes: usize,
) -> Result<ResumeUpload, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid upload: {}", e.body_text())))?
    {
        if field.name() != Some(RESUME_FIELD) {
            continue;
        }

        check_content_type(field.content_type())?;
        let file_name = field
            .file_name()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or(DEFAULT_FILE_NAME)
            .to_string();

        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Invalid upload: {}", e.body_text())))?;
        check_size(bytes.len(), max_bytes)?;

        return Ok(ResumeUpload { file_name, bytes });
    }

    Err(AppError::Validation("No file uploaded".to_string()))
}

fn check_content_type(content_type: Option<&str>) -> Result<(), AppError> {
    let is_pdf = content_type
        .and_then(|ct| ct.split(';').next())
        .map(|ct| ct.trim().eq_ignore_ascii_case(PDF_MIME))
        .unwrap_or(false);
    if is_pdf {
        Ok(())
    } else {
        Err(AppError::Validation("Only PDF files are allowed".to_string()))
    }
}

fn check_size(len: usize, max_bytes: usize) -> Result<(), AppError> {
    if len == 0 {
        return Err(AppError::Validation("Uploaded file is empty".to_string()));
    }
    if len > max_bytes {
        return Err(AppError::Validation(format!(
            "File too large; the limit is {} MB",
            max_bytes / (1024 * 1024)
        )));
    }
    Ok(())
}

/// What happened to a resume after it reached storage.
#[derive(Debug)]
pub struct ForwardOutcome {
    pub resume_file_url: String,
    pub resume_text: Option<String>,
    /// Set when the AI backend did not accept the file. The stored URL is still valid.
    pub ai_error: Option<AiBackendError>,
}

/// Stores the PDF, then forwards it to the AI backend.
///
/// Storage failure aborts. AI failure does not: the outcome still carries the
/// storage URL, with text extracted locally instead of from the backend.
pub async fn store_and_forward(
    storage: &dyn ResumeStorage,
    ai: &AiBackendClient,
    application_id: Uuid,
    ai_application_id: &str,
    upload: &ResumeUpload,
    uploaded_at_millis: i64,
) -> Result<ForwardOutcome, AppError> {
    let key = resume_object_key(application_id, uploaded_at_millis);
    let stored = storage
        .put_pdf(&key, upload.bytes.clone())
        .await
        .map_err(|e| AppError::Storage(e.to_string()))?;
    info!(%application_id, key = %stored.key, "Resume stored");

    let (preview, ai_error) = match ai
        .upload_resume(ai_application_id, &upload.file_name, upload.bytes.clone())
        .await
    {
        Ok(response) => (
            response
                .resume_text_preview
                .filter(|t| !t.trim().is_empty()),
            None,
        ),
        Err(e) => {
            warn!(%application_id, error = %e, "AI backend rejected resume upload");
            (None, Some(e))
        }
    };

    let resume_text = match preview {
        Some(text) => Some(text),
        None => extract_pdf_text(upload.bytes.clone()).await,
    };

    Ok(ForwardOutcome {
        resume_file_url: stored.public_url,
        resume_text,
        ai_error,
    })
}

/// Points the application at the stored file. A failure here still reports
/// the storage URL, since the object already exists.
pub async fn record_stored_resume(
    pool: &PgPool,
    application_id: Uuid,
    outcome: &ForwardOutcome,
) -> Result<(), AppError> {
    mark_resume_uploaded(
        pool,
        application_id,
        &outcome.resume_file_url,
        outcome.resume_text.as_deref(),
    )
    .await
    .map_err(|error| AppError::ResumeNotRecorded {
        resume_file_url: outcome.resume_file_url.clone(),
        error,
    })?;
    Ok(())
}

/// Best-effort local text extraction. Runs on the blocking pool since PDF
/// parsing is CPU-bound and may panic on malformed input.
pub async fn extract_pdf_text(pdf: Bytes) -> Option<String> {
    let result =
        tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&pdf)).await;
    match result {
        Ok(Ok(text)) => {
            let text = text.trim().to_string();
            (!text.is_empty()).then_some(text)
        }
        Ok(Err(e)) => {
            debug!(error = %e, "Local resume text extraction failed");
            None
        }
        Err(e) => {
            debug!(error = %e, "Local resume text extraction aborted");
            None
        }
    }
}
