use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

/// Audit entry joined with the actor's email.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationLogView {
    pub id: Uuid,
    pub action: String,
    /// Email of the acting user.
    pub performed_by: String,
    pub details: Value,
    pub created_at: DateTime<Utc>,
}
