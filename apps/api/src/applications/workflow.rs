//! Status guards for the application pipeline.
//!
//! Every mutating route checks the stored status string against its
//! precondition before touching the AI backend or the row. A failed check is
//! a 400 and leaves the application untouched.

use tracing::warn;

use crate::errors::AppError;
use crate::models::application::{ApplicationRow, ApplicationStatus};

use ApplicationStatus::*;

/// A mutating step of the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    UploadResume,
    Screen,
    Shortlist,
    ScheduleInterview,
    SendOffer,
    CompleteHiring,
}

impl Transition {
    /// Statuses from which the step may start.
    pub fn allowed_from(self) -> &'static [ApplicationStatus] {
        match self {
            Transition::UploadResume => &[Submitted, ResumeUploaded],
            Transition::Screen => &[ResumeUploaded],
            Transition::Shortlist => &[ScreeningPassed, ScreeningFailed],
            Transition::ScheduleInterview => &[Shortlisted],
            Transition::SendOffer => &[InterviewScheduled],
            Transition::CompleteHiring => &[OfferSent],
        }
    }

    fn rejection_message(self) -> &'static str {
        match self {
            Transition::UploadResume => "Resume can no longer be replaced at this stage",
            Transition::Screen => "Resume must be uploaded before screening",
            Transition::Shortlist => "Application must be screened before a shortlist decision",
            Transition::ScheduleInterview => {
                "Application must be shortlisted before scheduling interview"
            }
            Transition::SendOffer => "Interview must be scheduled before sending offer",
            Transition::CompleteHiring => "Offer must be sent before marking as hired",
        }
    }

    /// Fails with 400 unless the application's status permits this step.
    pub fn check(self, application: &ApplicationRow) -> Result<(), AppError> {
        match application.status() {
            Some(current) if self.allowed_from().contains(&current) => Ok(()),
            _ => {
                warn!(
                    application_id = %application.id,
                    status = application.status_str(),
                    transition = ?self,
                    "Rejected out-of-order status transition"
                );
                Err(AppError::InvalidState(self.rejection_message().to_string()))
            }
        }
    }
}

/// The AI backend correlation id, or 400 if registration never succeeded.
pub fn require_ai_id(application: &ApplicationRow) -> Result<&str, AppError> {
    application
        .ai_application_id
        .as_deref()
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| AppError::Validation("Application not synced with AI backend".to_string()))
}

/// Recruiter verdict on a screened application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Hire,
    Reject,
}

impl Decision {
    pub fn parse(raw: Option<&str>) -> Result<Self, AppError> {
        match raw {
            Some("hire") => Ok(Decision::Hire),
            Some("reject") => Ok(Decision::Reject),
            _ => Err(AppError::Validation(
                "Invalid decision. Must be 'hire' or 'reject'".to_string(),
            )),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Decision::Hire => "hire",
            Decision::Reject => "reject",
        }
    }

    pub fn resulting_status(self) -> ApplicationStatus {
        match self {
            Decision::Hire => Shortlisted,
            Decision::Reject => Rejected,
        }
    }
}

/// Status to store after a successful screening call. Only the two screening
/// outcomes are accepted from the backend; anything else keeps the current
/// status so the candidate can screen again.
pub fn screening_outcome(reported: Option<&str>) -> Option<ApplicationStatus> {
    match reported.map(str::parse::<ApplicationStatus>) {
        Some(Ok(status @ (ScreeningPassed | ScreeningFailed))) => Some(status),
        Some(_) => {
            warn!(reported = ?reported, "Ignoring unexpected screening status from AI backend");
            None
        }
        None => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn application(status: &str, ai_id: Option<&str>) -> ApplicationRow {
        ApplicationRow {
            id: Uuid::new_v4(),
            job_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            status: Some(status.to_string()),
            ai_application_id: ai_id.map(String::from),
            screening_score: None,
            screening_report: None,
            resume_text: None,
            resume_file_url: None,
            interview_scheduled_at: None,
            interview_link: None,
            offer_sent_at: None,
            offer_details: None,
            compliance_checked_at: None,
            hired_at: None,
            created_at: Utc::now(),
        }
    }

    const TRANSITIONS: [Transition; 6] = [
        Transition::UploadResume,
        Transition::Screen,
        Transition::Shortlist,
        Transition::ScheduleInterview,
        Transition::SendOffer,
        Transition::CompleteHiring,
    ];

    #[test]
    fn test_each_transition_accepts_only_its_preconditions() {
        for transition in TRANSITIONS {
            for status in ApplicationStatus::ALL {
                let result = transition.check(&application(status.as_str(), Some("ai")));
                assert_eq!(
                    result.is_ok(),
                    transition.allowed_from().contains(&status),
                    "{transition:?} from {status}"
                );
            }
        }
    }

    #[test]
    fn test_happy_path_is_a_chain() {
        let path = [
            (Transition::UploadResume, Submitted, ResumeUploaded),
            (Transition::Screen, ResumeUploaded, ScreeningPassed),
            (Transition::Shortlist, ScreeningPassed, Shortlisted),
            (Transition::ScheduleInterview, Shortlisted, InterviewScheduled),
            (Transition::SendOffer, InterviewScheduled, OfferSent),
            (Transition::CompleteHiring, OfferSent, Hired),
        ];
        for (transition, from, _to) in path {
            assert!(transition.check(&application(from.as_str(), Some("ai"))).is_ok());
        }
        for window in path.windows(2) {
            assert_eq!(window[0].2, window[1].1);
        }
    }

    #[test]
    fn test_schedule_requires_shortlist_message() {
        let err = Transition::ScheduleInterview
            .check(&application("screening_passed", Some("ai")))
            .unwrap_err();
        match err {
            AppError::InvalidState(msg) => assert_eq!(
                msg,
                "Application must be shortlisted before scheduling interview"
            ),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_unknown_or_missing_status_blocks_everything() {
        let mut app = application("archived", Some("ai"));
        for transition in TRANSITIONS {
            assert!(transition.check(&app).is_err());
        }
        app.status = None;
        for transition in TRANSITIONS {
            assert!(transition.check(&app).is_err());
        }
    }

    #[test]
    fn test_require_ai_id() {
        assert_eq!(
            require_ai_id(&application("shortlisted", Some("ai-9"))).unwrap(),
            "ai-9"
        );
        assert!(require_ai_id(&application("shortlisted", None)).is_err());
        assert!(require_ai_id(&application("shortlisted", Some(" "))).is_err());
    }

    #[test]
    fn test_decision_parsing() {
        assert_eq!(Decision::parse(Some("hire")).unwrap(), Decision::Hire);
        assert_eq!(
            Decision::parse(Some("reject")).unwrap().resulting_status(),
            Rejected
        );
        assert_eq!(Decision::Hire.resulting_status(), Shortlisted);
        assert!(Decision::parse(Some("HIRE")).is_err());
        assert!(Decision::parse(None).is_err());
    }

    #[test]
    fn test_screening_outcome_accepts_only_screening_statuses() {
        assert_eq!(
            screening_outcome(Some("screening_passed")),
            Some(ScreeningPassed)
        );
        assert_eq!(
            screening_outcome(Some("screening_failed")),
            Some(ScreeningFailed)
        );
        assert_eq!(screening_outcome(Some("hired")), None);
        assert_eq!(screening_outcome(Some("pending")), None);
        assert_eq!(screening_outcome(None), None);
    }
}
