use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

#[derive(Debug, Serialize)]
pub struct CreateApplicationRequest<'a> {
    pub job_id: Uuid,
    pub job_description: &'a str,
    pub resume_text: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct CreateApplicationResponse {
    /// String or number depending on the backend's storage.
    #[serde(default)]
    application_id: Option<Value>,
}

impl CreateApplicationResponse {
    pub fn application_id(&self) -> Option<String> {
        match self.application_id.as_ref()? {
            Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct UploadResumeResponse {
    #[serde(default)]
    pub resume_text_preview: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ScreenResponse {
    #[serde(default)]
    pub screening_report: Option<Value>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(flatten)]
    pub rest: serde_json::Map<String, Value>,
}

impl ScreenResponse {
    pub fn report(&self) -> Value {
        self.screening_report
            .clone()
            .unwrap_or_else(|| Value::Object(Default::default()))
    }

    /// Score from the report, clamped to 0..=100; 0 when absent.
    pub fn score(&self) -> i32 {
        self.screening_report
            .as_ref()
            .and_then(|r| r.get("score"))
            .and_then(Value::as_f64)
            .map(|s| s.round().clamp(0.0, 100.0) as i32)
            .unwrap_or(0)
    }

    /// Echo of the full payload for the audit log.
    pub fn to_value(&self) -> Value {
        let mut map = self.rest.clone();
        map.insert("screening_report".into(), self.report());
        if let Some(status) = &self.status {
            map.insert("status".into(), Value::String(status.clone()));
        }
        Value::Object(map)
    }
}

#[derive(Debug, Serialize)]
pub struct ScheduleRequest<'a> {
    pub scheduled_at: &'a str,
    pub timezone: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct ScheduleResponse {
    #[serde(default)]
    pub interview_link: Option<String>,
    #[serde(default)]
    pub calendly_link: Option<String>,
    #[serde(flatten)]
    pub rest: serde_json::Map<String, Value>,
}

impl ScheduleResponse {
    pub fn link(&self) -> Option<String> {
        self.interview_link
            .clone()
            .or_else(|| self.calendly_link.clone())
            .filter(|l| !l.trim().is_empty())
    }

    pub fn to_value(&self) -> Value {
        let mut map = self.rest.clone();
        if let Some(link) = &self.interview_link {
            map.insert("interview_link".into(), Value::String(link.clone()));
        }
        if let Some(link) = &self.calendly_link {
            map.insert("calendly_link".into(), Value::String(link.clone()));
        }
        Value::Object(map)
    }
}

/// Offer terms, forwarded verbatim and stored as the application's
/// `offer_details`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OfferRequest {
    pub salary: Value,
    pub start_date: String,
    pub position: String,
    pub notes: Option<String>,
}
