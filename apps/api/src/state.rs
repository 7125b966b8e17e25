use std::sync::Arc;

use sqlx::PgPool;

use crate::ai_backend::AiBackendClient;
use crate::auth::IdentityClient;
use crate::config::Config;
use crate::storage::ResumeStorage;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub identity: IdentityClient,
    pub ai: AiBackendClient,
    /// Resume object storage. Default: S3 (or MinIO in local setups).
    pub storage: Arc<dyn ResumeStorage>,
    pub config: Config,
}
