use anyhow::{Context, Result};

const DEFAULT_AI_BACKEND_URL: &str = "https://agentic-hr-backend.onrender.com";
const DEFAULT_MAX_RESUME_BYTES: usize = 10 * 1024 * 1024;

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    /// Base URL of the identity provider that issues bearer tokens.
    pub identity_url: String,
    pub identity_service_key: String,
    pub ai_backend_url: String,
    pub s3_bucket: String,
    pub s3_endpoint: String,
    pub s3_region: String,
    /// Prefix used to build the public URL of an uploaded resume.
    pub s3_public_url: String,
    pub aws_access_key_id: String,
    pub aws_secret_access_key: String,
    pub max_resume_bytes: usize,
    pub run_migrations: bool,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let s3_bucket = require_env("S3_BUCKET")?;
        let s3_endpoint = require_env("S3_ENDPOINT")?;
        let s3_public_url = std::env::var("S3_PUBLIC_URL").unwrap_or_else(|_| {
            format!("{}/{}", s3_endpoint.trim_end_matches('/'), s3_bucket)
        });

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            identity_url: require_env("IDENTITY_URL")?,
            identity_service_key: require_env("IDENTITY_SERVICE_KEY")?,
            ai_backend_url: std::env::var("AI_BACKEND_URL")
                .unwrap_or_else(|_| DEFAULT_AI_BACKEND_URL.to_string()),
            s3_bucket,
            s3_endpoint,
            s3_region: std::env::var("S3_REGION").unwrap_or_else(|_| "us-east-1".to_string()),
            s3_public_url,
            aws_access_key_id: require_env("AWS_ACCESS_KEY_ID")?,
            aws_secret_access_key: require_env("AWS_SECRET_ACCESS_KEY")?,
            max_resume_bytes: match std::env::var("MAX_RESUME_BYTES") {
                Ok(v) => v
                    .parse::<usize>()
                    .context("MAX_RESUME_BYTES must be a byte count")?,
                Err(_) => DEFAULT_MAX_RESUME_BYTES,
            },
            run_migrations: match std::env::var("RUN_MIGRATIONS") {
                Ok(v) => parse_flag(&v)
                    .with_context(|| format!("RUN_MIGRATIONS must be true or false, got '{v}'"))?,
                Err(_) => true,
            },
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "4000".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flag_accepts_common_spellings() {
        assert_eq!(parse_flag("TRUE"), Some(true));
        assert_eq!(parse_flag(" off "), Some(false));
        assert_eq!(parse_flag("0"), Some(false));
        assert_eq!(parse_flag("maybe"), None);
    }
}
