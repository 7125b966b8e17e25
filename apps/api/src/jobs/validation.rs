use serde::Deserialize;
use serde_json::Value;

use crate::errors::AppError;

const MIN_TITLE_CHARS: usize = 3;

/// Body of `POST /api/jobs` as sent by clients. Everything is optional here so
/// that missing fields produce a validation message rather than a decode error.
#[derive(Debug, Default, Deserialize)]
pub struct CreateJobRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub requirements: Option<Value>,
    pub location: Option<String>,
}

/// A job posting that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct NewJob {
    pub title: String,
    pub description: Option<String>,
    pub requirements: Option<Value>,
    pub location: Option<String>,
}

impl CreateJobRequest {
    pub fn validate(self) -> Result<NewJob, AppError> {
        let title = self.title.map(|t| t.trim().to_string()).unwrap_or_default();
        if title.chars().count() < MIN_TITLE_CHARS {
            return Err(AppError::Validation(format!(
                "Title must be at least {MIN_TITLE_CHARS} characters"
            )));
        }

        let requirements = match self.requirements {
            None | Some(Value::Null) => None,
            Some(Value::Object(map)) => Some(Value::Object(map)),
            Some(_) => {
                return Err(AppError::Validation(
                    "Requirements must be an object".to_string(),
                ))
            }
        };

        Ok(NewJob {
            title,
            description: non_blank(self.description),
            requirements,
            location: non_blank(self.location),
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// `GET /api/jobs` filters.
#[derive(Debug, Default, Deserialize)]
pub struct JobFilters {
    pub location: Option<String>,
    pub search: Option<String>,
}

impl JobFilters {
    pub fn location_pattern(&self) -> Option<String> {
        self.location.as_deref().and_then(contains_pattern)
    }

    pub fn search_pattern(&self) -> Option<String> {
        self.search.as_deref().and_then(contains_pattern)
    }
}

/// `ILIKE` pattern matching `needle` anywhere, with LIKE wildcards escaped.
fn contains_pattern(needle: &str) -> Option<String> {
    let needle = needle.trim();
    if needle.is_empty() {
        return None;
    }
    let mut escaped = String::with_capacity(needle.len() + 2);
    escaped.push('%');
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    Some(escaped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request(body: Value) -> CreateJobRequest {
        serde_json::from_value(body).unwrap()
    }

    #[test]
    fn test_title_is_required() {
        let err = request(json!({})).validate().unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_short_title_rejected() {
        let err = request(json!({ "title": " QA " })).validate().unwrap_err();
        match err {
            AppError::Validation(msg) => assert_eq!(msg, "Title must be at least 3 characters"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_requirements_must_be_object() {
        let err = request(json!({ "title": "Data Engineer", "requirements": ["sql"] }))
            .validate()
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_valid_job_normalises_blank_fields() {
        let job = request(json!({
            "title": "  Data Engineer ",
            "description": "",
            "requirements": { "years": 3 },
            "location": " Berlin "
        }))
        .validate()
        .unwrap();

        assert_eq!(
            job,
            NewJob {
                title: "Data Engineer".into(),
                description: None,
                requirements: Some(json!({ "years": 3 })),
                location: Some("Berlin".into()),
            }
        );
    }

    #[test]
    fn test_filter_patterns_escape_wildcards() {
        let filters = JobFilters {
            location: Some("  ".into()),
            search: Some("100%_rust".into()),
        };
        assert_eq!(filters.location_pattern(), None);
        assert_eq!(filters.search_pattern().as_deref(), Some("%100\\%\\_rust%"));
    }
}
