//! Job identity and lifecycle types.

use std::fmt;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Opaque job identifier issued by the backend.
///
/// The wire carries it as a JSON number (SQLite row id) or a string; the
/// client normalizes to a string and never interprets the contents.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JobId(String);

impl JobId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for JobId {
    fn from(value: &str) -> Self {
        JobId(value.to_string())
    }
}

impl From<u64> for JobId {
    fn from(value: u64) -> Self {
        JobId(value.to_string())
    }
}

impl Serialize for JobId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for JobId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct JobIdVisitor;

        impl<'de> Visitor<'de> for JobIdVisitor {
            type Value = JobId;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a job id as a number or string")
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<JobId, E> {
                Ok(JobId(v.to_string()))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<JobId, E> {
                Ok(JobId(v.to_string()))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<JobId, E> {
                Ok(JobId(v.to_string()))
            }
        }

        deserializer.deserialize_any(JobIdVisitor)
    }
}

/// Lifecycle state of a screening job as reported by `/job-status`.
///
/// `Completed` and `Failed` are terminal. Status strings this client does not
/// know are kept verbatim in `Other` and treated as still-in-progress, so a
/// newer backend cannot wedge the client into a premature stop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobState {
    Queued,
    Processing,
    Completed,
    Failed,
    Other(String),
}

impl JobState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobState::Completed | JobState::Failed)
    }

    pub fn as_str(&self) -> &str {
        match self {
            JobState::Queued => "Queued",
            JobState::Processing => "Processing",
            JobState::Completed => "Completed",
            JobState::Failed => "Failed",
            JobState::Other(s) => s,
        }
    }
}

impl From<String> for JobState {
    fn from(value: String) -> Self {
        match value.as_str() {
            "Queued" => JobState::Queued,
            "Processing" => JobState::Processing,
            "Completed" => JobState::Completed,
            "Failed" => JobState::Failed,
            _ => JobState::Other(value),
        }
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for JobState {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for JobState {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(String::deserialize(deserializer)?.into())
    }
}

/// Point-in-time view of a job, fetched by one poll tick.
/// Each snapshot supersedes the previous one; none survive a session reset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusSnapshot {
    pub status: JobState,
    #[serde(default)]
    pub processed: u64,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub percentage: f64,
}

/// Response of a successful `/upload-zip` call.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadReceipt {
    pub job_id: JobId,
    #[serde(default)]
    pub total_cvs_found: Option<u64>,
    #[serde(default)]
    pub message: Option<String>,
}
