pub mod handlers;

use sqlx::PgPool;
use tracing::warn;
use uuid::Uuid;

use crate::models::notification::NotificationRow;

/// Best-effort: a failed notification is logged and never fails the caller.
pub async fn notify(pool: &PgPool, user_id: Uuid, message: &str) {
    let result = sqlx::query("INSERT INTO notifications (user_id, message) VALUES ($1, $2)")
        .bind(user_id)
        .bind(message)
        .execute(pool)
        .await;
    if let Err(e) = result {
        warn!(%user_id, error = %e, "Failed to create notification");
    }
}

pub async fn list_for_user(pool: &PgPool, user_id: Uuid) -> sqlx::Result<Vec<NotificationRow>> {
    sqlx::query_as::<_, NotificationRow>(
        "SELECT * FROM notifications WHERE user_id = $1 ORDER BY created_at DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
}
