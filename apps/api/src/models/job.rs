use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct JobRow {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub requirements: Option<Value>,
    pub location: Option<String>,
    pub posted_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl JobRow {
    /// Text the AI backend screens resumes against.
    pub fn screening_description(&self) -> &str {
        self.description
            .as_deref()
            .filter(|d| !d.trim().is_empty())
            .unwrap_or(&self.title)
    }

    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.posted_by == Some(user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job(description: Option<&str>) -> JobRow {
        JobRow {
            id: Uuid::new_v4(),
            title: "Platform Engineer".into(),
            description: description.map(String::from),
            requirements: None,
            location: None,
            posted_by: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_screening_description_falls_back_to_title() {
        assert_eq!(job(None).screening_description(), "Platform Engineer");
        assert_eq!(job(Some("  ")).screening_description(), "Platform Engineer");
        assert_eq!(job(Some("Own the CI")).screening_description(), "Own the CI");
    }

    #[test]
    fn test_unowned_job_is_owned_by_nobody() {
        assert!(!job(None).is_owned_by(Uuid::new_v4()));
    }
}
