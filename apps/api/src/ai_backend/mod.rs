//! AI backend client: the single point of entry for calls to the external
//! screening service.
//!
//! No other module may call the AI backend directly. The backend owns resume
//! parsing, scoring and scheduling; this service only forwards workflow
//! actions and records what comes back.

use bytes::Bytes;
use reqwest::{multipart, Client, Method, RequestBuilder};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

pub mod dto;

pub use dto::{
    CreateApplicationRequest, CreateApplicationResponse, OfferRequest, ScheduleRequest,
    ScheduleResponse, ScreenResponse, UploadResumeResponse,
};

const USER_AGENT: &str = "HR-Platform-API/1.0";
const REQUEST_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Error)]
pub enum AiBackendError {
    #[error("No response from AI backend")]
    Transport(#[source] reqwest::Error),

    /// Non-2xx answer. `message` is the backend's own explanation when it sent one.
    #[error("{message}")]
    Api {
        status: u16,
        message: String,
        body: Option<Value>,
    },

    #[error("Invalid response from AI backend: {0}")]
    Parse(String),

    #[error("Failed to build AI backend request: {0}")]
    Request(String),
}

impl AiBackendError {
    /// HTTP status the backend answered with, if it answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            AiBackendError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn body(&self) -> Option<&Value> {
        match self {
            AiBackendError::Api { body, .. } => body.as_ref(),
            _ => None,
        }
    }
}

/// Thin wrapper over the AI backend's REST surface.
#[derive(Clone)]
pub struct AiBackendClient {
    client: Client,
    base_url: String,
}

impl AiBackendClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, AiBackendError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| AiBackendError::Request(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Registers a local application and returns the backend's correlation id.
    pub async fn create_application(
        &self,
        request: &CreateApplicationRequest<'_>,
    ) -> Result<CreateApplicationResponse, AiBackendError> {
        self.send_json(Method::POST, "/api/applications", Some(request))
            .await
    }

    /// Forwards a resume PDF as multipart field `file`.
    pub async fn upload_resume(
        &self,
        ai_application_id: &str,
        file_name: &str,
        pdf: Bytes,
    ) -> Result<UploadResumeResponse, AiBackendError> {
        let part = multipart::Part::bytes(pdf.to_vec())
            .file_name(file_name.to_string())
            .mime_str("application/pdf")
            .map_err(|e| AiBackendError::Request(e.to_string()))?;
        let form = multipart::Form::new().part("file", part);
        let path = format!("/api/applications/{ai_application_id}/upload_resume");

        let builder = self.request(Method::POST, &path).multipart(form);
        self.execute(Method::POST, &path, builder).await
    }

    pub async fn screen(&self, ai_application_id: &str) -> Result<ScreenResponse, AiBackendError> {
        let path = format!("/api/applications/{ai_application_id}/screen");
        self.send_json::<(), _>(Method::POST, &path, None).await
    }

    pub async fn shortlist(
        &self,
        ai_application_id: &str,
        decision: &str,
    ) -> Result<Value, AiBackendError> {
        let path = format!("/api/applications/{ai_application_id}/shortlist");
        let body = serde_json::json!({ "decision": decision });
        self.send_json(Method::PUT, &path, Some(&body)).await
    }

    pub async fn schedule(
        &self,
        ai_application_id: &str,
        request: &ScheduleRequest<'_>,
    ) -> Result<ScheduleResponse, AiBackendError> {
        let path = format!("/api/applications/{ai_application_id}/schedule");
        self.send_json(Method::POST, &path, Some(request)).await
    }

    pub async fn offer(
        &self,
        ai_application_id: &str,
        request: &OfferRequest,
    ) -> Result<Value, AiBackendError> {
        let path = format!("/api/applications/{ai_application_id}/offer");
        self.send_json(Method::POST, &path, Some(request)).await
    }

    pub async fn compliance(
        &self,
        ai_application_id: &str,
        notes: Option<&str>,
    ) -> Result<Value, AiBackendError> {
        let path = format!("/api/applications/{ai_application_id}/compliance");
        let body = serde_json::json!({ "notes": notes });
        self.send_json(Method::POST, &path, Some(&body)).await
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client.request(method, format!("{}{}", self.base_url, path))
    }

    async fn send_json<B, T>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<T, AiBackendError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let mut builder = self.request(method.clone(), path);
        if let Some(body) = body {
            builder = builder.json(body);
        }
        self.execute(method, path, builder).await
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        builder: RequestBuilder,
    ) -> Result<T, AiBackendError> {
        debug!(%method, path, "Calling AI backend");

        let response = builder.send().await.map_err(|e| {
            warn!(%method, path, error = %e, "AI backend unreachable");
            AiBackendError::Transport(e)
        })?;

        let status = response.status();
        let text = response.text().await.map_err(AiBackendError::Transport)?;

        if !status.is_success() {
            let body = serde_json::from_str::<Value>(&text).ok();
            let message = extract_error_message(
                body.as_ref(),
                status.canonical_reason().unwrap_or("unknown status"),
            );
            warn!(%method, path, status = status.as_u16(), "AI backend returned error: {message}");
            return Err(AiBackendError::Api {
                status: status.as_u16(),
                message,
                body: body.or_else(|| (!text.is_empty()).then(|| Value::String(text))),
            });
        }

        debug!(%method, path, status = status.as_u16(), "AI backend call succeeded");

        // Some endpoints answer 2xx with an empty body.
        let text: &str = if text.trim().is_empty() { "{}" } else { &text };
        serde_json::from_str(text).map_err(|e| AiBackendError::Parse(e.to_string()))
    }
}

/// Picks the most specific explanation the backend gave: `detail`, then
/// `error`, then `message`.
fn extract_error_message(body: Option<&Value>, reason: &str) -> String {
    body.and_then(|b| {
        ["detail", "error", "message"]
            .iter()
            .find_map(|key| match b.get(*key) {
                Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
                Some(Value::Null) | None => None,
                Some(other) => Some(other.to_string()),
            })
    })
    .unwrap_or_else(|| format!("AI backend error: {reason}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        extract::{Multipart, Path},
        http::StatusCode,
        routing::{post, put},
        Json, Router,
    };
    use serde_json::json;

    use crate::test_support::spawn_server;

    #[test]
    fn test_error_message_prefers_detail() {
        let body = json!({ "detail": "bad slot", "error": "other", "message": "x" });
        assert_eq!(extract_error_message(Some(&body), "Bad Request"), "bad slot");
    }

    #[test]
    fn test_error_message_falls_back_through_fields() {
        let body = json!({ "message": "quota exceeded" });
        assert_eq!(
            extract_error_message(Some(&body), "Too Many Requests"),
            "quota exceeded"
        );
        assert_eq!(
            extract_error_message(None, "Bad Gateway"),
            "AI backend error: Bad Gateway"
        );
    }

    #[test]
    fn test_error_message_stringifies_structured_detail() {
        let body = json!({ "detail": [{ "loc": ["body", "timezone"] }] });
        let message = extract_error_message(Some(&body), "Unprocessable Entity");
        assert!(message.contains("timezone"), "got {message}");
    }

    #[tokio::test]
    async fn test_create_application_reads_numeric_id() {
        let router = Router::new().route(
            "/api/applications",
            post(|Json(body): Json<Value>| async move {
                assert_eq!(body["resume_text"], "");
                Json(json!({ "application_id": 42 }))
            }),
        );
        let client = AiBackendClient::new(spawn_server(router).await).unwrap();

        let response = client
            .create_application(&CreateApplicationRequest {
                job_id: uuid::Uuid::nil(),
                job_description: "Rust engineer",
                resume_text: "",
            })
            .await
            .unwrap();

        assert_eq!(response.application_id().as_deref(), Some("42"));
    }

    #[tokio::test]
    async fn test_upload_resume_sends_file_field() {
        let router = Router::new().route(
            "/api/applications/:id/upload_resume",
            post(|Path(id): Path<String>, mut multipart: Multipart| async move {
                let field = multipart.next_field().await.unwrap().unwrap();
                assert_eq!(field.name(), Some("file"));
                assert_eq!(field.content_type(), Some("application/pdf"));
                let data = field.bytes().await.unwrap();
                Json(json!({
                    "resume_text_preview": format!("{id}:{}", data.len())
                }))
            }),
        );
        let client = AiBackendClient::new(spawn_server(router).await).unwrap();

        let response = client
            .upload_resume("ai-7", "cv.pdf", Bytes::from_static(b"%PDF-1.4 fake"))
            .await
            .unwrap();

        assert_eq!(response.resume_text_preview.as_deref(), Some("ai-7:13"));
    }

    #[tokio::test]
    async fn test_api_error_keeps_status_and_detail() {
        let router = Router::new().route(
            "/api/applications/:id/shortlist",
            put(|| async {
                (
                    StatusCode::BAD_REQUEST,
                    Json(json!({ "detail": "Application not screened" })),
                )
            }),
        );
        let client = AiBackendClient::new(spawn_server(router).await).unwrap();

        let err = client.shortlist("ai-1", "hire").await.unwrap_err();

        assert_eq!(err.status(), Some(400));
        assert_eq!(err.to_string(), "Application not screened");
        assert_eq!(err.body().unwrap()["detail"], "Application not screened");
    }

    #[tokio::test]
    async fn test_empty_success_body_is_accepted() {
        let router = Router::new().route(
            "/api/applications/:id/compliance",
            post(|| async { StatusCode::NO_CONTENT }),
        );
        let client = AiBackendClient::new(spawn_server(router).await).unwrap();

        let value = client.compliance("ai-1", None).await.unwrap();

        assert_eq!(value, json!({}));
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_transport_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let client = AiBackendClient::new(format!("http://{addr}")).unwrap();

        let err = client.screen("ai-1").await.unwrap_err();

        assert!(matches!(err, AiBackendError::Transport(_)));
        assert_eq!(err.to_string(), "No response from AI backend");
        assert_eq!(err.status(), None);
    }
}
