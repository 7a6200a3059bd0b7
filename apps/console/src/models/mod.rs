// Wire types for the screening backend contract.
// Everything here mirrors what the backend actually sends; decoding quirks
// (numeric-or-string job ids, JSON-encoded skill lists) live with the types.

pub mod candidate;
pub mod job;

pub use candidate::{decode_skills, Candidate, Shortlist};
pub use job::{JobId, JobState, StatusSnapshot, UploadReceipt};
