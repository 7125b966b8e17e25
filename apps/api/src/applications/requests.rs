//! Request bodies of the application routes and their validation.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::ai_backend::OfferRequest;
use crate::errors::AppError;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateApplicationRequest {
    pub job_id: Option<String>,
}

impl CreateApplicationRequest {
    pub fn job_id(&self) -> Result<Uuid, AppError> {
        self.job_id
            .as_deref()
            .and_then(|id| Uuid::parse_str(id.trim()).ok())
            .ok_or_else(|| AppError::Validation("Invalid job ID".to_string()))
    }
}

#[derive(Debug, Deserialize)]
pub struct ShortlistRequest {
    pub decision: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleInterviewRequest {
    pub scheduled_at: Option<String>,
    pub timezone: Option<String>,
}

/// A validated interview slot. `raw` is forwarded to the AI backend untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct InterviewSlot {
    pub raw: String,
    pub at: DateTime<Utc>,
    pub timezone: Tz,
}

impl InterviewSlot {
    /// The slot on the recruiter's wall clock.
    pub fn local(&self) -> DateTime<Tz> {
        self.at.with_timezone(&self.timezone)
    }
}

impl ScheduleInterviewRequest {
    /// A `scheduledAt` without an offset is read in `timezone` (an IANA name,
    /// default UTC).
    pub fn validate(self) -> Result<InterviewSlot, AppError> {
        let raw = self
            .scheduled_at
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| AppError::Validation("scheduledAt is required".to_string()))?;
        let timezone = match self.timezone.as_deref().map(str::trim) {
            None | Some("") => Tz::UTC,
            Some(name) => name
                .parse::<Tz>()
                .map_err(|_| AppError::Validation(format!("Unknown timezone: {name}")))?,
        };
        let at = parse_timestamp_in(&raw, timezone).ok_or_else(|| {
            AppError::Validation(format!(
                "scheduledAt must be an ISO-8601 date-time that exists in {}",
                timezone.name()
            ))
        })?;
        Ok(InterviewSlot { raw, at, timezone })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendOfferRequest {
    pub salary: Option<Value>,
    pub start_date: Option<String>,
    pub position: Option<String>,
    pub notes: Option<String>,
}

impl SendOfferRequest {
    pub fn validate(self) -> Result<OfferRequest, AppError> {
        let missing = || AppError::Validation("salary, startDate, and position are required".into());

        let salary = self.salary.filter(is_present_salary).ok_or_else(missing)?;
        let start_date = self
            .start_date
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty())
            .ok_or_else(missing)?;
        let position = self
            .position
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .ok_or_else(missing)?;

        if parse_date(&start_date).is_none() {
            return Err(AppError::Validation(
                "startDate must be a date (YYYY-MM-DD)".to_string(),
            ));
        }
        if let Value::Number(n) = &salary {
            if n.as_f64().map_or(true, |v| v <= 0.0) {
                return Err(AppError::Validation("salary must be positive".to_string()));
            }
        }

        Ok(OfferRequest {
            salary,
            start_date,
            position,
            notes: self.notes.filter(|n| !n.trim().is_empty()),
        })
    }
}

fn is_present_salary(value: &Value) -> bool {
    match value {
        Value::Number(_) => true,
        Value::String(s) => !s.trim().is_empty(),
        _ => false,
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ComplianceRequest {
    pub notes: Option<String>,
}

/// Body of a successful resume upload.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeUploadResponse {
    pub status: &'static str,
    pub resume_file_url: String,
    pub message: &'static str,
}

/// Body of a successful screening.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreeningResponse {
    pub status: String,
    pub screening_report: Value,
    pub score: i32,
}

/// Accepts RFC 3339, or a zone-less `YYYY-MM-DDTHH:MM[:SS]` read as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    parse_timestamp_in(raw, Tz::UTC)
}

/// Like [`parse_timestamp`], but zone-less input is wall-clock time in `tz`.
/// Times skipped by a DST change do not exist; repeated ones take the earlier
/// instant.
pub fn parse_timestamp_in(raw: &str, tz: Tz) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    let naive = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())?;
    tz.from_local_datetime(&naive)
        .earliest()
        .map(|local| local.with_timezone(&Utc))
}

/// Accepts a calendar date or a full timestamp.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| parse_timestamp(raw).map(|dt| dt.date_naive()))
}

/// Human form of a salary for notification text.
pub fn display_salary(salary: &Value) -> String {
    match salary {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
