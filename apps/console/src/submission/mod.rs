//! Submission controller: local validation and the upload call.
//!
//! Validation failures never touch the network; they surface as user-facing
//! messages in the same inline area as server errors.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tokio::sync::watch;

use crate::api::{ApiError, ScreeningClient};
use crate::models::UploadReceipt;

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("Please enter a job description")]
    EmptyDescription,

    #[error("Please select a valid ZIP file")]
    NotAnArchive,

    #[error(transparent)]
    Api(#[from] ApiError),
}

impl SubmitError {
    /// True for errors raised before any network call.
    pub fn is_validation(&self) -> bool {
        !matches!(self, SubmitError::Api(_))
    }

    /// Message for the inline error area: validation text as-is, server text
    /// when the backend supplied any, a generic retry hint otherwise.
    pub fn user_message(&self) -> String {
        match self {
            SubmitError::Api(err) => err
                .server_message()
                .map(str::to_string)
                .unwrap_or_else(|| "Error uploading file. Please try again.".to_string()),
            other => other.to_string(),
        }
    }
}

/// One screening request as entered by the user.
#[derive(Debug, Clone)]
pub struct SubmissionRequest {
    pub description: String,
    /// Comma-separated must-have skills; empty means no hard requirements.
    pub must_haves: String,
    pub archive_path: PathBuf,
}

/// A request that passed local validation.
#[derive(Debug, Clone)]
pub struct ValidSubmission {
    description: String,
    must_haves: String,
    archive_path: PathBuf,
}

impl SubmissionRequest {
    /// Local preconditions: a `.zip` filename and a non-blank description.
    /// Trims the description and normalizes the must-have list.
    pub fn validate(&self) -> Result<ValidSubmission, SubmitError> {
        if !has_zip_extension(&self.archive_path) {
            return Err(SubmitError::NotAnArchive);
        }
        let description = self.description.trim();
        if description.is_empty() {
            return Err(SubmitError::EmptyDescription);
        }
        Ok(ValidSubmission {
            description: description.to_string(),
            must_haves: normalize_must_haves(&self.must_haves),
            archive_path: self.archive_path.clone(),
        })
    }
}

/// Validates, uploads, and returns the backend's receipt.
///
/// Progress lands on `progress` as the archive streams out; the receipt's
/// job id is what the caller hands to the status poller.
pub async fn submit(
    client: &ScreeningClient,
    request: &SubmissionRequest,
    progress: watch::Sender<u8>,
) -> Result<UploadReceipt, SubmitError> {
    let valid = request.validate()?;
    let receipt = client
        .upload_archive(
            &valid.archive_path,
            &valid.description,
            &valid.must_haves,
            progress,
        )
        .await?;
    Ok(receipt)
}

fn has_zip_extension(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.eq_ignore_ascii_case("zip"))
        .unwrap_or(false)
}

/// Splits on commas, trims each entry, drops empties, re-joins.
/// "Go, Kubernetes,," becomes "Go,Kubernetes"; whitespace-only input becomes "".
fn normalize_must_haves(raw: &str) -> String {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(description: &str, must_haves: &str, archive: &str) -> SubmissionRequest {
        SubmissionRequest {
            description: description.to_string(),
            must_haves: must_haves.to_string(),
            archive_path: PathBuf::from(archive),
        }
    }

    #[test]
    fn test_validate_rejects_non_zip_extension() {
        for name in ["cvs.tar", "cvs.tar.gz", "cvs", "cvs.zip.exe"] {
            let err = request("desc", "", name).validate().unwrap_err();
            assert!(matches!(err, SubmitError::NotAnArchive), "{name}");
            assert!(err.is_validation());
        }
    }

    #[test]
    fn test_validate_accepts_zip_case_insensitively() {
        assert!(request("desc", "", "cvs.zip").validate().is_ok());
        assert!(request("desc", "", "CVS.ZIP").validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_blank_description() {
        for desc in ["", "   ", "\n\t"] {
            let err = request(desc, "", "cvs.zip").validate().unwrap_err();
            assert!(matches!(err, SubmitError::EmptyDescription));
            assert!(err.is_validation());
        }
    }

    #[test]
    fn test_validate_trims_description() {
        let valid = request("  Senior backend engineer  ", "", "cvs.zip")
            .validate()
            .unwrap();
        assert_eq!(valid.description, "Senior backend engineer");
    }

    #[test]
    fn test_normalize_must_haves() {
        assert_eq!(normalize_must_haves("Go, Kubernetes"), "Go,Kubernetes");
        assert_eq!(normalize_must_haves(" Go ,, Kubernetes , "), "Go,Kubernetes");
        assert_eq!(normalize_must_haves(""), "");
        assert_eq!(normalize_must_haves("  ,  "), "");
    }

    #[tokio::test]
    async fn test_invalid_submission_makes_no_network_call() {
        // Nothing listens on this address; a network attempt would surface
        // as an Api error rather than the validation variant.
        let client = ScreeningClient::new("http://127.0.0.1:9");
        let (tx, _rx) = tokio::sync::watch::channel(0u8);
        let err = submit(&client, &request("desc", "", "cvs.tar"), tx)
            .await
            .unwrap_err();
        assert!(matches!(err, SubmitError::NotAnArchive));
    }

    #[test]
    fn test_user_message_prefers_server_text() {
        let err = SubmitError::Api(ApiError::Api {
            status: 400,
            message: "No CV files found in ZIP".to_string(),
        });
        assert_eq!(err.user_message(), "No CV files found in ZIP");
        assert!(!err.is_validation());
    }

    #[test]
    fn test_user_message_falls_back_on_transport_errors() {
        let err = SubmitError::Api(ApiError::Api {
            status: 502,
            message: "  ".to_string(),
        });
        assert_eq!(err.user_message(), "Error uploading file. Please try again.");
    }
}
