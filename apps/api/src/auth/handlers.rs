use axum::Json;
use serde::Serialize;

use crate::auth::CurrentUser;

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub user: CurrentUser,
}

/// GET /api/auth/me
pub async fn handle_me(user: CurrentUser) -> Json<MeResponse> {
    Json(MeResponse { user })
}
