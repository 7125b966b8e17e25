use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use tracing::info;
use uuid::Uuid;

use crate::auth::CurrentUser;
use crate::errors::AppError;
use crate::extract::AppJson;
use crate::jobs::repository::{find_job, insert_job, list_jobs};
use crate::jobs::validation::{CreateJobRequest, JobFilters};
use crate::models::job::JobRow;
use crate::models::user::Role;
use crate::state::AppState;

/// POST /api/jobs
pub async fn handle_create_job(
    State(state): State<AppState>,
    user: CurrentUser,
    AppJson(request): AppJson<CreateJobRequest>,
) -> Result<(StatusCode, Json<JobRow>), AppError> {
    user.require(&[Role::Recruiter])?;
    let new_job = request.validate()?;

    let job = insert_job(&state.db, &new_job, user.id).await?;
    info!(job_id = %job.id, recruiter_id = %user.id, "Job posted");

    Ok((StatusCode::CREATED, Json(job)))
}

/// GET /api/jobs
pub async fn handle_list_jobs(
    State(state): State<AppState>,
    Query(filters): Query<JobFilters>,
) -> Result<Json<Vec<JobRow>>, AppError> {
    Ok(Json(list_jobs(&state.db, &filters).await?))
}

/// GET /api/jobs/:id
pub async fn handle_get_job(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
) -> Result<Json<JobRow>, AppError> {
    let job = find_job(&state.db, job_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Job not found".to_string()))?;
    Ok(Json(job))
}
