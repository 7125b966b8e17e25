use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde_json::json;
use tracing::{info, warn};
use uuid::Uuid;

use crate::ai_backend::ScheduleRequest;
use crate::applications::audit::{self, interview_message, offer_message, LogAction, HIRED_MESSAGE};
use crate::applications::repository::{
    find_application, find_application_for_user, find_candidate, find_existing,
    insert_application, list_for_job, list_for_user, list_logs, mark_hired,
    mark_interview_scheduled, mark_offer_sent, record_screening,
    set_status,
};
use crate::applications::requests::{
    display_salary, ComplianceRequest, CreateApplicationRequest, ResumeUploadResponse,
    ScheduleInterviewRequest, ScreeningResponse, SendOfferRequest, ShortlistRequest,
};
use crate::applications::resume::{read_resume_upload, record_stored_resume, store_and_forward};
use crate::applications::sync;
use crate::applications::workflow::{require_ai_id, screening_outcome, Decision, Transition};
use crate::auth::CurrentUser;
use crate::db::{is_schema_drift, is_unique_violation};
use crate::errors::AppError;
use crate::extract::AppJson;
use crate::jobs::repository::find_job;
use crate::models::application::{
    ApplicationDetail, ApplicationRow, ApplicationStatus, ApplicationWithCandidate,
};
use crate::models::application_log::ApplicationLogView;
use crate::models::job::JobRow;
use crate::models::user::Role;
use crate::notifications::notify;
use crate::state::AppState;

const DUPLICATE_APPLICATION: &str = "You have already applied for this job";

fn application_not_found() -> AppError {
    AppError::NotFound("Application not found".to_string())
}

/// Loads an application together with its job, and checks that the caller
/// posted that job.
async fn load_for_recruiter(
    state: &AppState,
    application_id: Uuid,
    user: &CurrentUser,
) -> Result<(ApplicationRow, JobRow), AppError> {
    let application = find_application(&state.db, application_id)
        .await?
        .ok_or_else(application_not_found)?;
    let job = find_job(&state.db, application.job_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Job not found".to_string()))?;
    if !job.is_owned_by(user.id) {
        warn!(%application_id, user_id = %user.id, "Recruiter does not own the job");
        return Err(AppError::Forbidden("Access denied".to_string()));
    }
    Ok((application, job))
}

/// POST /api/applications
pub async fn handle_create_application(
    State(state): State<AppState>,
    user: CurrentUser,
    AppJson(request): AppJson<CreateApplicationRequest>,
) -> Result<(StatusCode, Json<ApplicationRow>), AppError> {
    user.require(&[Role::Candidate])?;
    let job_id = request.job_id()?;

    let job = find_job(&state.db, job_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Job not found".to_string()))?;

    if find_existing(&state.db, job_id, user.id).await?.is_some() {
        return Err(AppError::Validation(DUPLICATE_APPLICATION.to_string()));
    }

    let mut application = match insert_application(&state.db, job_id, user.id).await {
        Ok(row) => row,
        Err(e) if is_unique_violation(&e) => {
            return Err(AppError::Validation(DUPLICATE_APPLICATION.to_string()))
        }
        Err(e) => return Err(e.into()),
    };
    info!(application_id = %application.id, %job_id, candidate_id = %user.id, "Application created");

    // Registration failure is retried on resume upload.
    match sync::register(&state.db, &state.ai, &application, &job).await {
        Ok(ai_id) => application.ai_application_id = Some(ai_id),
        Err(e) => warn!(
            application_id = %application.id,
            error = %e,
            "AI backend sync failed; will retry on resume upload"
        ),
    }

    Ok((StatusCode::CREATED, Json(application)))
}

/// GET /api/applications
pub async fn handle_list_my_applications(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<Vec<ApplicationRow>>, AppError> {
    user.require(&[Role::Candidate])?;
    Ok(Json(list_for_user(&state.db, user.id).await?))
}

/// GET /api/applications/jobs/:jobId/applications
pub async fn handle_list_job_applications(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(job_id): Path<Uuid>,
) -> Result<Json<Vec<ApplicationWithCandidate>>, AppError> {
    user.require(&[Role::Recruiter])?;
    let owned = find_job(&state.db, job_id)
        .await?
        .filter(|job| job.is_owned_by(user.id));
    if owned.is_none() {
        return Err(AppError::NotFound(
            "Job not found or access denied".to_string(),
        ));
    }
    Ok(Json(list_for_job(&state.db, job_id).await?))
}

/// GET /api/applications/:id
pub async fn handle_get_application(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(application_id): Path<Uuid>,
) -> Result<Json<ApplicationDetail>, AppError> {
    user.require(&[Role::Recruiter])?;
    let (application, job) = load_for_recruiter(&state, application_id, &user).await?;
    let candidate = find_candidate(&state.db, application.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Candidate not found".to_string()))?;

    Ok(Json(ApplicationDetail {
        application,
        job,
        candidate,
    }))
}

/// POST /api/applications/:id/resume
pub async fn handle_upload_resume(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(application_id): Path<Uuid>,
    multipart: Multipart,
) -> Result<Json<ResumeUploadResponse>, AppError> {
    user.require(&[Role::Candidate])?;
    let upload = read_resume_upload(multipart, state.config.max_resume_bytes).await?;

    let application = find_application_for_user(&state.db, application_id, user.id)
        .await?
        .ok_or_else(application_not_found)?;
    Transition::UploadResume.check(&application)?;

    let ai_id = match application.ai_application_id.clone() {
        Some(id) if !id.trim().is_empty() => id,
        _ => {
            let job = find_job(&state.db, application.job_id)
                .await?
                .ok_or_else(|| AppError::NotFound("Job not found".to_string()))?;
            sync::register(&state.db, &state.ai, &application, &job).await?
        }
    };

    let outcome = store_and_forward(
        state.storage.as_ref(),
        &state.ai,
        application_id,
        &ai_id,
        &upload,
        Utc::now().timestamp_millis(),
    )
    .await?;

    record_stored_resume(&state.db, application_id, &outcome).await?;

    audit::record(
        &state.db,
        application_id,
        LogAction::ResumeUpload,
        user.id,
        json!({
            "fileName": upload.file_name,
            "resumeFileUrl": outcome.resume_file_url,
            "aiSynced": outcome.ai_error.is_none(),
        }),
    )
    .await;

    if let Some(e) = outcome.ai_error {
        return Err(AppError::ResumeSync {
            resume_file_url: outcome.resume_file_url,
            details: e.to_string(),
        });
    }

    info!(%application_id, "Resume uploaded");
    Ok(Json(ResumeUploadResponse {
        status: ApplicationStatus::ResumeUploaded.as_str(),
        resume_file_url: outcome.resume_file_url,
        message: "Resume uploaded successfully",
    }))
}

/// POST /api/applications/:id/screen
pub async fn handle_screen(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(application_id): Path<Uuid>,
) -> Result<Json<ScreeningResponse>, AppError> {
    user.require(&[Role::Candidate])?;
    let application = find_application_for_user(&state.db, application_id, user.id)
        .await?
        .ok_or_else(application_not_found)?;
    Transition::Screen.check(&application)?;
    let ai_id = require_ai_id(&application)?;

    let response = match state.ai.screen(ai_id).await {
        Ok(response) => response,
        Err(e) => {
            if let Err(db_err) =
                set_status(&state.db, application_id, ApplicationStatus::ScreeningFailed).await
            {
                warn!(%application_id, error = %db_err, "Failed to mark screening as failed");
            }
            return Err(AppError::ai("Screening failed", &e));
        }
    };

    let report = response.report();
    let score = response.score();
    let status = screening_outcome(response.status.as_deref())
        .map(|s| s.as_str().to_string())
        .unwrap_or_else(|| application.status_str().to_string());

    record_screening(&state.db, application_id, score, &report, &status).await?;

    audit::record(
        &state.db,
        application_id,
        LogAction::Screening,
        user.id,
        json!({
            "score": score,
            "status": status,
            "screeningReport": report,
            "aiResponse": response.to_value(),
        }),
    )
    .await;

    info!(%application_id, score, status = %status, "Application screened");
    Ok(Json(ScreeningResponse {
        status,
        screening_report: report,
        score,
    }))
}

/// PUT /api/applications/:id/shortlist
pub async fn handle_shortlist(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(application_id): Path<Uuid>,
    AppJson(request): AppJson<ShortlistRequest>,
) -> Result<Json<ApplicationRow>, AppError> {
    user.require(&[Role::Recruiter])?;
    let decision = Decision::parse(request.decision.as_deref())?;

    let (application, _job) = load_for_recruiter(&state, application_id, &user).await?;
    let ai_id = require_ai_id(&application)?;
    Transition::Shortlist.check(&application)?;

    let ai_response = state
        .ai
        .shortlist(ai_id, decision.as_str())
        .await
        .map_err(|e| AppError::ai("Failed to update decision in AI backend", &e))?;

    let status = decision.resulting_status();
    let updated = set_status(&state.db, application_id, status).await?;

    audit::record(
        &state.db,
        application_id,
        LogAction::Shortlist,
        user.id,
        json!({
            "decision": decision.as_str(),
            "status": status.as_str(),
            "aiResponse": ai_response,
        }),
    )
    .await;

    info!(%application_id, decision = decision.as_str(), "Shortlist decision recorded");
    Ok(Json(updated))
}

/// POST /api/applications/:id/schedule
pub async fn handle_schedule_interview(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(application_id): Path<Uuid>,
    AppJson(request): AppJson<ScheduleInterviewRequest>,
) -> Result<Json<ApplicationRow>, AppError> {
    user.require(&[Role::Recruiter])?;
    let slot = request.validate()?;

    let (application, _job) = load_for_recruiter(&state, application_id, &user).await?;
    let ai_id = require_ai_id(&application)?;
    Transition::ScheduleInterview.check(&application)?;

    let response = state
        .ai
        .schedule(
            ai_id,
            &ScheduleRequest {
                scheduled_at: &slot.raw,
                timezone: slot.timezone.name(),
            },
        )
        .await
        .map_err(|e| AppError::ai_passthrough(&e))?;
    let link = response.link();

    let updated =
        mark_interview_scheduled(&state.db, application_id, slot.at, link.as_deref()).await?;

    notify(
        &state.db,
        application.user_id,
        &interview_message(slot.local(), link.as_deref()),
    )
    .await;

    audit::record(
        &state.db,
        application_id,
        LogAction::Schedule,
        user.id,
        json!({
            "scheduledAt": slot.raw,
            "timezone": slot.timezone.name(),
            "interviewLink": link,
            "aiResponse": response.to_value(),
        }),
    )
    .await;

    info!(%application_id, scheduled_at = %slot.at, "Interview scheduled");
    Ok(Json(updated))
}

/// POST /api/applications/:id/offer
pub async fn handle_send_offer(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(application_id): Path<Uuid>,
    AppJson(request): AppJson<SendOfferRequest>,
) -> Result<Json<ApplicationRow>, AppError> {
    user.require(&[Role::Recruiter])?;
    let offer = request.validate()?;

    let (application, _job) = load_for_recruiter(&state, application_id, &user).await?;
    let ai_id = require_ai_id(&application)?;
    Transition::SendOffer.check(&application)?;

    let ai_response = state
        .ai
        .offer(ai_id, &offer)
        .await
        .map_err(|e| AppError::ai("Failed to send offer in AI backend", &e))?;

    let offer_details = serde_json::to_value(&offer)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to encode offer: {e}")))?;
    let updated = mark_offer_sent(&state.db, application_id, &offer_details).await?;

    notify(
        &state.db,
        application.user_id,
        &offer_message(&offer.position, &display_salary(&offer.salary), &offer.start_date),
    )
    .await;

    let mut details = offer_details;
    details["aiResponse"] = ai_response;
    audit::record(&state.db, application_id, LogAction::Offer, user.id, details).await;

    info!(%application_id, position = %offer.position, "Offer sent");
    Ok(Json(updated))
}

/// POST /api/applications/:id/compliance
pub async fn handle_compliance(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(application_id): Path<Uuid>,
    request: Option<AppJson<ComplianceRequest>>,
) -> Result<Json<ApplicationRow>, AppError> {
    user.require(&[Role::Recruiter])?;
    let AppJson(request) = request.unwrap_or_default();

    let (application, _job) = load_for_recruiter(&state, application_id, &user).await?;
    let ai_id = require_ai_id(&application)?;
    Transition::CompleteHiring.check(&application)?;

    let ai_response = state
        .ai
        .compliance(ai_id, request.notes.as_deref())
        .await
        .map_err(|e| AppError::ai_passthrough(&e))?;

    let updated = mark_hired(&state.db, application_id).await?;

    notify(&state.db, application.user_id, HIRED_MESSAGE).await;

    audit::record(
        &state.db,
        application_id,
        LogAction::Compliance,
        user.id,
        json!({
            "notes": request.notes,
            "aiResponse": ai_response,
        }),
    )
    .await;

    info!(%application_id, "Candidate hired");
    Ok(Json(updated))
}

/// GET /api/applications/:id/logs
pub async fn handle_list_logs(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(application_id): Path<Uuid>,
) -> Result<Json<Vec<ApplicationLogView>>, AppError> {
    user.require(&[Role::Recruiter, Role::Admin])?;
    if user.role == Role::Recruiter {
        load_for_recruiter(&state, application_id, &user).await?;
    } else if find_application(&state.db, application_id).await?.is_none() {
        return Err(application_not_found());
    }

    match list_logs(&state.db, application_id).await {
        Ok(logs) => Ok(Json(logs)),
        Err(e) if is_schema_drift(&e) => {
            warn!(%application_id, error = %e, "Application logs table unavailable; returning empty list");
            Ok(Json(Vec::<ApplicationLogView>::new()))
        }
        Err(e) => Err(e.into()),
    }
}

