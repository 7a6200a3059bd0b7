/// Screening API gateway: the single point of entry for all backend calls.
///
/// ARCHITECTURAL RULE: no other module may talk to the backend directly.
/// Every request goes through [`ScreeningClient`] so status handling and
/// error-body parsing stay in one place.
use std::path::Path;
use std::time::Duration;

use reqwest::multipart::{Form, Part};
use reqwest::{Body, Client};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;
use tokio::fs::File;
use tokio::sync::watch;
use tokio_util::io::ReaderStream;
use tracing::debug;

use crate::models::{JobId, Shortlist, StatusSnapshot, UploadReceipt};

pub mod progress;

use progress::ProgressReader;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
/// Timeout for the small GET requests (status, shortlist, health).
/// Uploads carry no overall timeout: a 500 MB archive on a slow link is fine.
const GET_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("backend error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ApiError {
    /// Server-supplied error text, when the backend sent any.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::Api { message, .. } if !message.trim().is_empty() => Some(message),
            _ => None,
        }
    }
}

/// Error body the backend attaches to non-2xx responses.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

/// Response of `GET /health`.
#[derive(Debug, Deserialize)]
pub struct HealthReport {
    pub status: String,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub service: Option<String>,
}

/// The one HTTP client used by all components of the console.
#[derive(Clone)]
pub struct ScreeningClient {
    http: Client,
    base_url: String,
}

impl ScreeningClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            http: Client::builder()
                .connect_timeout(CONNECT_TIMEOUT)
                .build()
                .expect("Failed to build HTTP client"),
            base_url,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// POST /upload-zip
    ///
    /// Streams the archive as the `zip_file` multipart part, reporting
    /// monotone 0-100 progress through `progress` as bytes are handed to the
    /// transport.
    pub async fn upload_archive(
        &self,
        archive: &Path,
        description: &str,
        must_haves: &str,
        progress: watch::Sender<u8>,
    ) -> Result<UploadReceipt, ApiError> {
        let file = File::open(archive).await?;
        let total = file.metadata().await?.len();
        let filename = archive
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "cv_archive.zip".to_string());

        let reader = ProgressReader::new(file, total, progress);
        let body = Body::wrap_stream(ReaderStream::new(reader));
        let part = Part::stream_with_length(body, total)
            .file_name(filename)
            .mime_str("application/zip")?;

        let form = Form::new()
            .part("zip_file", part)
            .text("description", description.to_string())
            .text("must_haves", must_haves.to_string());

        let response = self
            .http
            .post(self.url("/upload-zip"))
            .multipart(form)
            .send()
            .await?;

        let receipt: UploadReceipt = self.parse_json(response).await?;
        debug!(job_id = %receipt.job_id, "upload accepted");
        Ok(receipt)
    }

    /// GET /job-status/{job_id}
    pub async fn job_status(&self, job_id: &JobId) -> Result<StatusSnapshot, ApiError> {
        let response = self
            .http
            .get(self.url(&format!("/job-status/{job_id}")))
            .timeout(GET_TIMEOUT)
            .send()
            .await?;
        self.parse_json(response).await
    }

    /// GET /shortlist/{job_id}
    pub async fn shortlist(&self, job_id: &JobId) -> Result<Shortlist, ApiError> {
        let response = self
            .http
            .get(self.url(&format!("/shortlist/{job_id}")))
            .timeout(GET_TIMEOUT)
            .send()
            .await?;
        self.parse_json(response).await
    }

    /// GET /health
    pub async fn health(&self) -> Result<HealthReport, ApiError> {
        let response = self
            .http
            .get(self.url("/health"))
            .timeout(GET_TIMEOUT)
            .send()
            .await?;
        self.parse_json(response).await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Decodes a 2xx body as `T`; turns non-2xx into `ApiError::Api`,
    /// preferring the backend's `{"error": ...}` text over the raw body.
    async fn parse_json<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, ApiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorBody>(&body)
                .map(|b| b.error)
                .unwrap_or(body);
            return Err(ApiError::Api {
                status: status.as_u16(),
                message,
            });
        }
        Ok(response.json().await?)
    }
}
