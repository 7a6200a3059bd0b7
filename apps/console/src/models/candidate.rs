//! Shortlist candidate types.

use serde::{Deserialize, Serialize};

/// One ranked candidate from the shortlist.
///
/// `found_skills` and `missing_skills` arrive as JSON-encoded strings (the
/// backend stores them as TEXT columns) and may be absent entirely. They stay
/// raw here; [`decode_skills`] turns them into lists at projection time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: i64,
    pub filename: String,
    pub score: f64,
    #[serde(default)]
    pub found_skills: Option<String>,
    #[serde(default)]
    pub missing_skills: Option<String>,
}

impl Candidate {
    pub fn found_skills(&self) -> Vec<String> {
        decode_skills(self.found_skills.as_deref())
    }

    pub fn missing_skills(&self) -> Vec<String> {
        decode_skills(self.missing_skills.as_deref())
    }
}

/// The ranked top-N result set returned once a job completes.
#[derive(Debug, Clone, Deserialize)]
pub struct Shortlist {
    #[serde(default)]
    pub top_5: Vec<Candidate>,
}

/// Decodes a JSON-encoded skill list.
///
/// A missing or malformed payload decodes to the empty list so one bad row
/// cannot take down the whole shortlist view.
pub fn decode_skills(raw: Option<&str>) -> Vec<String> {
    raw.and_then(|s| serde_json::from_str(s).ok())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_skills_valid_payload() {
        let skills = decode_skills(Some(r#"["Rust", "Go", "Kubernetes"]"#));
        assert_eq!(skills, vec!["Rust", "Go", "Kubernetes"]);
    }

    #[test]
    fn test_decode_skills_empty_array() {
        assert!(decode_skills(Some("[]")).is_empty());
    }

    #[test]
    fn test_decode_skills_missing_payload() {
        assert!(decode_skills(None).is_empty());
    }

    #[test]
    fn test_decode_skills_malformed_payload() {
        assert!(decode_skills(Some("not json at all")).is_empty());
        assert!(decode_skills(Some(r#"{"oops": true}"#)).is_empty());
    }

    #[test]
    fn test_candidate_deserializes_with_raw_skill_strings() {
        let candidate: Candidate = serde_json::from_str(
            r#"{
                "id": 1,
                "filename": "alice.pdf",
                "score": 92.5,
                "found_skills": "[\"Rust\", \"Go\"]",
                "missing_skills": "[\"Kubernetes\"]"
            }"#,
        )
        .unwrap();
        assert_eq!(candidate.found_skills(), vec!["Rust", "Go"]);
        assert_eq!(candidate.missing_skills(), vec!["Kubernetes"]);
    }

    #[test]
    fn test_candidate_tolerates_null_skills() {
        let candidate: Candidate = serde_json::from_str(
            r#"{"id": 2, "filename": "bob.pdf", "score": 40.0,
                "found_skills": null, "missing_skills": null}"#,
        )
        .unwrap();
        assert!(candidate.found_skills().is_empty());
        assert!(candidate.missing_skills().is_empty());
    }

    #[test]
    fn test_shortlist_defaults_to_empty() {
        let shortlist: Shortlist = serde_json::from_str(r#"{"status": "Completed"}"#).unwrap();
        assert!(shortlist.top_5.is_empty());
    }
}
