//! Append-only audit trail and candidate-facing messages.

use chrono::DateTime;
use chrono_tz::Tz;
use serde_json::Value;
use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;

use crate::applications::repository::insert_log;

/// Actions recorded in `application_logs`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogAction {
    ResumeUpload,
    Screening,
    Shortlist,
    Schedule,
    Offer,
    Compliance,
}

impl LogAction {
    pub fn as_str(self) -> &'static str {
        match self {
            LogAction::ResumeUpload => "resume_upload",
            LogAction::Screening => "screening",
            LogAction::Shortlist => "shortlist",
            LogAction::Schedule => "schedule",
            LogAction::Offer => "offer",
            LogAction::Compliance => "compliance",
        }
    }
}

/// Best-effort: a failed write is logged and never fails the request.
pub async fn record(
    pool: &PgPool,
    application_id: Uuid,
    action: LogAction,
    performed_by: Uuid,
    details: Value,
) {
    match insert_log(pool, application_id, action.as_str(), performed_by, &details).await {
        Ok(()) => info!(%application_id, action = action.as_str(), %performed_by, "Application log recorded"),
        Err(e) => warn!(
            %application_id,
            action = action.as_str(),
            error = %e,
            "Failed to create application log"
        ),
    }
}

/// Candidate-facing text, with the slot shown in the zone it was booked in.
pub fn interview_message(at: DateTime<Tz>, link: Option<&str>) -> String {
    let mut message = format!(
        "Interview scheduled for {} at {} ({}).",
        at.format("%Y-%m-%d"),
        at.format("%H:%M"),
        at.timezone().name()
    );
    if let Some(link) = link {
        message.push_str(&format!(" Link: {link}"));
    }
    message
}

pub fn offer_message(position: &str, salary: &str, start_date: &str) -> String {
    format!("Offer sent for {position}. Salary: {salary}, Start Date: {start_date}")
}

pub const HIRED_MESSAGE: &str = "Congratulations! You have been hired. Welcome to the team!";

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_interview_message_with_and_without_link() {
        let at = Tz::UTC.with_ymd_and_hms(2026, 3, 2, 14, 30, 0).unwrap();
        assert_eq!(
            interview_message(at, Some("https://meet.example/x")),
            "Interview scheduled for 2026-03-02 at 14:30 (UTC). Link: https://meet.example/x"
        );
        assert_eq!(
            interview_message(at, None),
            "Interview scheduled for 2026-03-02 at 14:30 (UTC)."
        );
    }

    #[test]
    fn test_interview_message_uses_booking_zone() {
        let at = Utc
            .with_ymd_and_hms(2026, 3, 2, 19, 30, 0)
            .unwrap()
            .with_timezone(&chrono_tz::America::New_York);
        assert_eq!(
            interview_message(at, None),
            "Interview scheduled for 2026-03-02 at 14:30 (America/New_York)."
        );
    }

    #[test]
    fn test_offer_message() {
        assert_eq!(
            offer_message("SRE", "90000", "2026-01-05"),
            "Offer sent for SRE. Salary: 90000, Start Date: 2026-01-05"
        );
    }

    #[test]
    fn test_log_action_names() {
        assert_eq!(LogAction::ResumeUpload.as_str(), "resume_upload");
        assert_eq!(LogAction::Compliance.as_str(), "compliance");
    }
}
