use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::job::JobRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationRow {
    pub id: Uuid,
    pub job_id: Uuid,
    pub user_id: Uuid,
    pub status: Option<String>,
    /// Correlation id assigned by the AI backend. `None` until registration succeeds.
    pub ai_application_id: Option<String>,
    pub screening_score: Option<i32>,
    pub screening_report: Option<Value>,
    pub resume_text: Option<String>,
    pub resume_file_url: Option<String>,
    pub interview_scheduled_at: Option<DateTime<Utc>>,
    pub interview_link: Option<String>,
    pub offer_sent_at: Option<DateTime<Utc>>,
    pub offer_details: Option<Value>,
    pub compliance_checked_at: Option<DateTime<Utc>>,
    pub hired_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl ApplicationRow {
    pub fn status_str(&self) -> &str {
        self.status.as_deref().unwrap_or("")
    }

    pub fn status(&self) -> Option<ApplicationStatus> {
        self.status.as_deref().and_then(|s| s.parse().ok())
    }
}

/// Public identity of the candidate behind an application.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateSummary {
    pub id: Uuid,
    pub email: String,
}

/// Application listed for a recruiter, with the candidate attached.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationWithCandidate {
    #[serde(flatten)]
    pub application: ApplicationRow,
    pub candidate: CandidateSummary,
}

/// Full recruiter view of one application.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationDetail {
    #[serde(flatten)]
    pub application: ApplicationRow,
    pub job: JobRow,
    pub candidate: CandidateSummary,
}

/// The stored status strings, in pipeline order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Submitted,
    ResumeUploaded,
    ScreeningPassed,
    ScreeningFailed,
    Shortlisted,
    Rejected,
    InterviewScheduled,
    OfferSent,
    Hired,
}

impl ApplicationStatus {
    pub const ALL: [ApplicationStatus; 9] = [
        ApplicationStatus::Submitted,
        ApplicationStatus::ResumeUploaded,
        ApplicationStatus::ScreeningPassed,
        ApplicationStatus::ScreeningFailed,
        ApplicationStatus::Shortlisted,
        ApplicationStatus::Rejected,
        ApplicationStatus::InterviewScheduled,
        ApplicationStatus::OfferSent,
        ApplicationStatus::Hired,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ApplicationStatus::Submitted => "submitted",
            ApplicationStatus::ResumeUploaded => "resume_uploaded",
            ApplicationStatus::ScreeningPassed => "screening_passed",
            ApplicationStatus::ScreeningFailed => "screening_failed",
            ApplicationStatus::Shortlisted => "shortlisted",
            ApplicationStatus::Rejected => "rejected",
            ApplicationStatus::InterviewScheduled => "interview_scheduled",
            ApplicationStatus::OfferSent => "offer_sent",
            ApplicationStatus::Hired => "hired",
        }
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApplicationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ApplicationStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("unknown application status '{s}'"))
    }
}
