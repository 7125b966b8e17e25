use sqlx::PgPool;
use uuid::Uuid;

use crate::jobs::validation::{JobFilters, NewJob};
use crate::models::job::JobRow;

pub async fn insert_job(pool: &PgPool, job: &NewJob, posted_by: Uuid) -> sqlx::Result<JobRow> {
    sqlx::query_as::<_, JobRow>(
        r#"
        INSERT INTO jobs (title, description, requirements, location, posted_by)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        "#,
    )
    .bind(&job.title)
    .bind(&job.description)
    .bind(&job.requirements)
    .bind(&job.location)
    .bind(posted_by)
    .fetch_one(pool)
    .await
}

/// Lists jobs, newest first. Filters are case-insensitive substring matches;
/// `search` looks at both title and description.
pub async fn list_jobs(pool: &PgPool, filters: &JobFilters) -> sqlx::Result<Vec<JobRow>> {
    sqlx::query_as::<_, JobRow>(
        r#"
        SELECT *
        FROM jobs
        WHERE ($1::text IS NULL OR location ILIKE $1)
          AND ($2::text IS NULL OR title ILIKE $2 OR description ILIKE $2)
        ORDER BY created_at DESC
        "#,
    )
    .bind(filters.location_pattern())
    .bind(filters.search_pattern())
    .fetch_all(pool)
    .await
}

pub async fn find_job(pool: &PgPool, job_id: Uuid) -> sqlx::Result<Option<JobRow>> {
    sqlx::query_as::<_, JobRow>("SELECT * FROM jobs WHERE id = $1")
        .bind(job_id)
        .fetch_optional(pool)
        .await
}
