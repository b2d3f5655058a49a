use std::time::Duration;

use async_trait::async_trait;
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use reqwest::{Client, StatusCode};
use serde_json::Value;
use thiserror::Error;

use crate::models::{OpaqueId, SnapshotError};

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("backend request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("backend returned {status}: {body}")]
    Status { status: StatusCode, body: String },
    #[error("backend returned an unreadable curriculum: {0}")]
    Decode(String),
    #[error("no curriculum for enrollment {0}")]
    NotFound(OpaqueId),
}

impl From<SourceError> for SnapshotError {
    fn from(e: SourceError) -> Self {
        match e {
            SourceError::NotFound(_) => SnapshotError::Missing,
            other => SnapshotError::Unavailable(other.to_string()),
        }
    }
}

/// Where curriculum snapshots come from. The service only ever talks to the
/// platform backend; tests plug in canned payloads.
#[async_trait]
pub trait CurriculumSource: Send + Sync {
    async fn fetch_curriculum(
        &self,
        enrollment_id: &OpaqueId,
        bearer: Option<&str>,
    ) -> Result<Value, SourceError>;
}

pub struct HttpCurriculumSource {
    client: Client,
    base_url: String,
}

impl HttpCurriculumSource {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, SourceError> {
        let client = Client::builder().timeout(timeout).build()?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self { client, base_url })
    }

    fn curriculum_url(&self, enrollment_id: &OpaqueId) -> String {
        let id = enrollment_id.to_string();
        format!(
            "{}/enrollments/{}/curriculum",
            self.base_url,
            utf8_percent_encode(&id, NON_ALPHANUMERIC)
        )
    }
}

#[async_trait]
impl CurriculumSource for HttpCurriculumSource {
    async fn fetch_curriculum(
        &self,
        enrollment_id: &OpaqueId,
        bearer: Option<&str>,
    ) -> Result<Value, SourceError> {
        let url = self.curriculum_url(enrollment_id);
        let mut req = self.client.get(&url);
        if let Some(token) = bearer {
            req = req.bearer_auth(token);
        }

        let res = req.send().await?;
        let status = res.status();
        if status == StatusCode::NOT_FOUND {
            return Err(SourceError::NotFound(enrollment_id.clone()));
        }
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(SourceError::Status { status, body });
        }

        let body = res.text().await?;
        let value: Value =
            serde_json::from_str(&body).map_err(|e| SourceError::Decode(e.to_string()))?;
        if value.is_null() {
            return Err(SourceError::NotFound(enrollment_id.clone()));
        }
        tracing::debug!(%enrollment_id, bytes = body.len(), "fetched curriculum");
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_percent_encoded_into_the_path() {
        let src = HttpCurriculumSource::new("http://backend/api/", Duration::from_secs(1)).unwrap();
        assert_eq!(
            src.curriculum_url(&OpaqueId::from("a/b c")),
            "http://backend/api/enrollments/a%2Fb%20c/curriculum"
        );
        assert_eq!(
            src.curriculum_url(&OpaqueId::Number(42)),
            "http://backend/api/enrollments/42/curriculum"
        );
    }

    #[test]
    fn not_found_maps_to_missing_snapshot() {
        let e: SnapshotError = SourceError::NotFound(OpaqueId::Number(1)).into();
        assert_eq!(e, SnapshotError::Missing);
        let e: SnapshotError = SourceError::Decode("eof".into()).into();
        assert!(matches!(e, SnapshotError::Unavailable(m) if m.contains("eof")));
    }
}
