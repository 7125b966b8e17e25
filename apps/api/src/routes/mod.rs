pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post, put},
    Router,
};

use crate::admin::handlers as admin;
use crate::applications::handlers as applications;
use crate::auth::handlers as auth;
use crate::jobs::handlers as jobs;
use crate::notifications::handlers as notifications;
use crate::state::AppState;

/// Room for multipart boundaries and headers on top of the file itself.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

pub fn build_router(state: AppState) -> Router {
    let resume_body_limit = state.config.max_resume_bytes + MULTIPART_OVERHEAD_BYTES;

    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/auth/me", get(auth::handle_me))
        // Job board
        .route(
            "/api/jobs",
            post(jobs::handle_create_job).get(jobs::handle_list_jobs),
        )
        .route("/api/jobs/:id", get(jobs::handle_get_job))
        // Application pipeline
        .route(
            "/api/applications",
            post(applications::handle_create_application)
                .get(applications::handle_list_my_applications),
        )
        .route(
            "/api/applications/jobs/:job_id/applications",
            get(applications::handle_list_job_applications),
        )
        .route(
            "/api/applications/:id",
            get(applications::handle_get_application),
        )
        .route(
            "/api/applications/:id/resume",
            post(applications::handle_upload_resume)
                .layer(DefaultBodyLimit::max(resume_body_limit)),
        )
        .route(
            "/api/applications/:id/screen",
            post(applications::handle_screen),
        )
        .route(
            "/api/applications/:id/shortlist",
            put(applications::handle_shortlist),
        )
        .route(
            "/api/applications/:id/schedule",
            post(applications::handle_schedule_interview),
        )
        .route(
            "/api/applications/:id/offer",
            post(applications::handle_send_offer),
        )
        .route(
            "/api/applications/:id/compliance",
            post(applications::handle_compliance),
        )
        .route(
            "/api/applications/:id/logs",
            get(applications::handle_list_logs),
        )
        // Admin and inbox
        .route("/api/admin/stats", get(admin::handle_stats))
        .route(
            "/api/notifications",
            get(notifications::handle_list_notifications),
        )
        .with_state(state)
}
