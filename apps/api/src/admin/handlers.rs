use axum::{extract::State, Json};

use crate::admin::stats::{load_stats, AdminStats};
use crate::auth::CurrentUser;
use crate::errors::AppError;
use crate::models::user::Role;
use crate::state::AppState;

/// GET /api/admin/stats
pub async fn handle_stats(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<AdminStats>, AppError> {
    user.require(&[Role::Admin])?;
    Ok(Json(load_stats(&state.db).await?))
}
