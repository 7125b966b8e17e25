//! Resume object storage.
//!
//! `AppState` carries an `Arc<dyn ResumeStorage>`; production wires the S3
//! implementation, tests an in-memory one.

use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use bytes::Bytes;
use tracing::info;
use uuid::Uuid;

/// A stored object and where it can be fetched from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub key: String,
    pub public_url: String,
}

#[async_trait]
pub trait ResumeStorage: Send + Sync {
    /// Writes a PDF under `key`. Never overwrites silently: keys are unique per upload.
    async fn put_pdf(&self, key: &str, body: Bytes) -> anyhow::Result<StoredObject>;
}

/// Object key for a resume: `<application id>-<unix millis>.pdf`.
pub fn resume_object_key(application_id: Uuid, uploaded_at_millis: i64) -> String {
    format!("{application_id}-{uploaded_at_millis}.pdf")
}

fn join_url(base: &str, key: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), key)
}

pub struct S3ResumeStorage {
    client: aws_sdk_s3::Client,
    bucket: String,
    public_base_url: String,
}

impl S3ResumeStorage {
    pub fn new(client: aws_sdk_s3::Client, bucket: String, public_base_url: String) -> Self {
        Self {
            client,
            bucket,
            public_base_url,
        }
    }
}

#[async_trait]
impl ResumeStorage for S3ResumeStorage {
    async fn put_pdf(&self, key: &str, body: Bytes) -> anyhow::Result<StoredObject> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(body))
            .content_type("application/pdf")
            .send()
            .await
            .map_err(|e| anyhow::anyhow!("S3 upload failed: {e}"))?;

        info!("Uploaded resume to s3://{}/{}", self.bucket, key);

        Ok(StoredObject {
            key: key.to_string(),
            public_url: join_url(&self.public_base_url, key),
        })
    }
}


#[cfg(test)]
mod tests {
    use super::memory::MemoryResumeStorage;
    use super::*;

    #[test]
    fn test_resume_object_key_format() {
        let id = Uuid::parse_str("6f1c2d3e-0000-4000-8000-000000000001").unwrap();
        assert_eq!(
            resume_object_key(id, 1_700_000_000_000),
            "6f1c2d3e-0000-4000-8000-000000000001-1700000000000.pdf"
        );
    }

    #[test]
    fn test_join_url_handles_trailing_slash() {
        assert_eq!(
            join_url("http://minio:9000/resumes/", "a.pdf"),
            "http://minio:9000/resumes/a.pdf"
        );
        assert_eq!(
            join_url("http://minio:9000/resumes", "a.pdf"),
            "http://minio:9000/resumes/a.pdf"
        );
    }

    #[tokio::test]
    async fn test_memory_storage_returns_public_url() {
        let storage = MemoryResumeStorage::default();
        let stored = storage
            .put_pdf("x.pdf", Bytes::from_static(b"%PDF"))
            .await
            .unwrap();
        assert_eq!(stored.public_url, "https://files.test/resumes/x.pdf");
        assert!(storage.objects.lock().unwrap().contains_key("x.pdf"));
    }

    #[tokio::test]
    async fn test_failing_storage_errors() {
        let storage = MemoryResumeStorage::failing();
        assert!(storage
            .put_pdf("x.pdf", Bytes::from_static(b"%PDF"))
            .await
            .is_err());
    }
}
