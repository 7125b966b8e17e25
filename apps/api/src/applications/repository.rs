use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::models::application::{
    ApplicationRow, ApplicationStatus, ApplicationWithCandidate, CandidateSummary,
};
use crate::models::application_log::ApplicationLogView;

#[derive(FromRow)]
struct ApplicationCandidateRow {
    #[sqlx(flatten)]
    application: ApplicationRow,
    candidate_email: String,
}

pub async fn insert_application(
    pool: &PgPool,
    job_id: Uuid,
    user_id: Uuid,
) -> sqlx::Result<ApplicationRow> {
    sqlx::query_as::<_, ApplicationRow>(
        "INSERT INTO applications (job_id, user_id, status) VALUES ($1, $2, $3) RETURNING *",
    )
    .bind(job_id)
    .bind(user_id)
    .bind(ApplicationStatus::Submitted.as_str())
    .fetch_one(pool)
    .await
}

pub async fn find_application(
    pool: &PgPool,
    application_id: Uuid,
) -> sqlx::Result<Option<ApplicationRow>> {
    sqlx::query_as::<_, ApplicationRow>("SELECT * FROM applications WHERE id = $1")
        .bind(application_id)
        .fetch_optional(pool)
        .await
}

/// Loads an application only if it belongs to `user_id`.
pub async fn find_application_for_user(
    pool: &PgPool,
    application_id: Uuid,
    user_id: Uuid,
) -> sqlx::Result<Option<ApplicationRow>> {
    sqlx::query_as::<_, ApplicationRow>(
        "SELECT * FROM applications WHERE id = $1 AND user_id = $2",
    )
    .bind(application_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await
}

pub async fn find_existing(
    pool: &PgPool,
    job_id: Uuid,
    user_id: Uuid,
) -> sqlx::Result<Option<ApplicationRow>> {
    sqlx::query_as::<_, ApplicationRow>(
        "SELECT * FROM applications WHERE job_id = $1 AND user_id = $2 LIMIT 1",
    )
    .bind(job_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await
}

pub async fn list_for_user(pool: &PgPool, user_id: Uuid) -> sqlx::Result<Vec<ApplicationRow>> {
    sqlx::query_as::<_, ApplicationRow>(
        "SELECT * FROM applications WHERE user_id = $1 ORDER BY created_at DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
}

pub async fn list_for_job(
    pool: &PgPool,
    job_id: Uuid,
) -> sqlx::Result<Vec<ApplicationWithCandidate>> {
    let rows = sqlx::query_as::<_, ApplicationCandidateRow>(
        r#"
        SELECT a.*, u.email AS candidate_email
        FROM applications a
        INNER JOIN users u ON u.id = a.user_id
        WHERE a.job_id = $1
        ORDER BY a.created_at DESC
        "#,
    )
    .bind(job_id)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|row| ApplicationWithCandidate {
            candidate: CandidateSummary {
                id: row.application.user_id,
                email: row.candidate_email,
            },
            application: row.application,
        })
        .collect())
}

pub async fn find_candidate(pool: &PgPool, user_id: Uuid) -> sqlx::Result<Option<CandidateSummary>> {
    let row: Option<(Uuid, String)> = sqlx::query_as("SELECT id, email FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_optional(pool)
        .await?;
    Ok(row.map(|(id, email)| CandidateSummary { id, email }))
}

/// Returns the number of rows updated; 0 means the application vanished.
pub async fn set_ai_application_id(
    pool: &PgPool,
    application_id: Uuid,
    ai_application_id: &str,
) -> sqlx::Result<u64> {
    let result = sqlx::query("UPDATE applications SET ai_application_id = $1 WHERE id = $2")
        .bind(ai_application_id)
        .bind(application_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

/// Records a stored resume. A `None` text keeps whatever text was there.
pub async fn mark_resume_uploaded(
    pool: &PgPool,
    application_id: Uuid,
    resume_file_url: &str,
    resume_text: Option<&str>,
) -> sqlx::Result<ApplicationRow> {
    sqlx::query_as::<_, ApplicationRow>(
        r#"
        UPDATE applications
        SET resume_file_url = $1,
            resume_text = COALESCE($2, resume_text),
            status = $3
        WHERE id = $4
        RETURNING *
        "#,
    )
    .bind(resume_file_url)
    .bind(resume_text)
    .bind(ApplicationStatus::ResumeUploaded.as_str())
    .bind(application_id)
    .fetch_one(pool)
    .await
}

pub async fn record_screening(
    pool: &PgPool,
    application_id: Uuid,
    score: i32,
    report: &Value,
    status: &str,
) -> sqlx::Result<ApplicationRow> {
    sqlx::query_as::<_, ApplicationRow>(
        r#"
        UPDATE applications
        SET screening_score = $1, screening_report = $2, status = $3
        WHERE id = $4
        RETURNING *
        "#,
    )
    .bind(score)
    .bind(report)
    .bind(status)
    .bind(application_id)
    .fetch_one(pool)
    .await
}

pub async fn set_status(
    pool: &PgPool,
    application_id: Uuid,
    status: ApplicationStatus,
) -> sqlx::Result<ApplicationRow> {
    sqlx::query_as::<_, ApplicationRow>(
        "UPDATE applications SET status = $1 WHERE id = $2 RETURNING *",
    )
    .bind(status.as_str())
    .bind(application_id)
    .fetch_one(pool)
    .await
}

pub async fn mark_interview_scheduled(
    pool: &PgPool,
    application_id: Uuid,
    scheduled_at: DateTime<Utc>,
    interview_link: Option<&str>,
) -> sqlx::Result<ApplicationRow> {
    sqlx::query_as::<_, ApplicationRow>(
        r#"
        UPDATE applications
        SET interview_scheduled_at = $1, interview_link = $2, status = $3
        WHERE id = $4
        RETURNING *
        "#,
    )
    .bind(scheduled_at)
    .bind(interview_link)
    .bind(ApplicationStatus::InterviewScheduled.as_str())
    .bind(application_id)
    .fetch_one(pool)
    .await
}

pub async fn mark_offer_sent(
    pool: &PgPool,
    application_id: Uuid,
    offer_details: &Value,
) -> sqlx::Result<ApplicationRow> {
    sqlx::query_as::<_, ApplicationRow>(
        r#"
        UPDATE applications
        SET offer_sent_at = NOW(), offer_details = $1, status = $2
        WHERE id = $3
        RETURNING *
        "#,
    )
    .bind(offer_details)
    .bind(ApplicationStatus::OfferSent.as_str())
    .bind(application_id)
    .fetch_one(pool)
    .await
}

pub async fn mark_hired(pool: &PgPool, application_id: Uuid) -> sqlx::Result<ApplicationRow> {
    sqlx::query_as::<_, ApplicationRow>(
        r#"
        UPDATE applications
        SET compliance_checked_at = NOW(), hired_at = NOW(), status = $1
        WHERE id = $2
        RETURNING *
        "#,
    )
    .bind(ApplicationStatus::Hired.as_str())
    .bind(application_id)
    .fetch_one(pool)
    .await
}

pub async fn insert_log(
    pool: &PgPool,
    application_id: Uuid,
    action: &str,
    performed_by: Uuid,
    details: &Value,
) -> sqlx::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO application_logs (application_id, action, performed_by, details)
        VALUES ($1, $2, $3, $4)
        "#,
    )
    .bind(application_id)
    .bind(action)
    .bind(performed_by)
    .bind(details)
    .execute(pool)
    .await?;
    Ok(())
}

/// Audit trail of one application, newest first, with actor emails.
pub async fn list_logs(
    pool: &PgPool,
    application_id: Uuid,
) -> sqlx::Result<Vec<ApplicationLogView>> {
    sqlx::query_as::<_, ApplicationLogView>(
        r#"
        SELECT l.id, l.action, u.email AS performed_by, l.details, l.created_at
        FROM application_logs l
        INNER JOIN users u ON u.id = l.performed_by
        WHERE l.application_id = $1
        ORDER BY l.created_at DESC
        "#,
    )
    .bind(application_id)
    .fetch_all(pool)
    .await
}
