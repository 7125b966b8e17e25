use axum::{extract::State, Json};

use crate::auth::CurrentUser;
use crate::errors::AppError;
use crate::models::notification::NotificationRow;
use crate::notifications::list_for_user;
use crate::state::AppState;

/// GET /api/notifications
pub async fn handle_list_notifications(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<Vec<NotificationRow>>, AppError> {
    Ok(Json(list_for_user(&state.db, user.id).await?))
}
