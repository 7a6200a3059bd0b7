//! Presentation projector.
//!
//! Pure mapping from session state to a display-ready [`RenderModel`]:
//! no network, no timers, no globals. The terminal view turns the model into
//! text; nothing here formats strings beyond decoding the skill lists.

use crate::models::Candidate;
use crate::models::StatusSnapshot;
use crate::session::{Phase, SessionState};

/// Found-skill tags shown per candidate card before the overflow badge.
pub const MAX_FOUND_TAGS: usize = 10;

#[derive(Debug, Clone, PartialEq)]
pub struct RenderModel {
    pub screen: Screen,
    /// Inline message area, shared by validation and server errors.
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Screen {
    /// No active job.
    Form,
    Uploading {
        percent: u8,
    },
    Polling {
        job_id: String,
        status: Option<StatusSnapshot>,
    },
    Complete {
        job_id: String,
        total: u64,
        cards: Vec<CandidateCard>,
    },
    Failed {
        job_id: String,
        status: Option<StatusSnapshot>,
    },
}

/// One ranked shortlist entry, already truncated for display.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateCard {
    /// 1-based shortlist position.
    pub rank: usize,
    pub filename: String,
    pub score: f64,
    /// First `MAX_FOUND_TAGS` found skills, decoded.
    pub found_skills: Vec<String>,
    /// How many found skills the truncation hid; 0 means no badge.
    pub more_found: usize,
    /// Missing must-haves, never truncated.
    pub missing_skills: Vec<String>,
}

pub fn project(state: &SessionState) -> RenderModel {
    let job_id = state
        .job_id
        .as_ref()
        .map(|id| id.to_string())
        .unwrap_or_default();

    let screen = match state.phase {
        Phase::Form => Screen::Form,
        Phase::Uploading => Screen::Uploading {
            percent: state.upload_progress,
        },
        Phase::Polling => Screen::Polling {
            job_id,
            status: state.snapshot.clone(),
        },
        Phase::Complete => Screen::Complete {
            job_id,
            total: state.snapshot.as_ref().map(|s| s.total).unwrap_or_default(),
            cards: state
                .candidates
                .iter()
                .enumerate()
                .map(|(i, c)| card(i, c))
                .collect(),
        },
        Phase::Failed => Screen::Failed {
            job_id,
            status: state.snapshot.clone(),
        },
    };

    RenderModel {
        screen,
        error: state.error.clone(),
    }
}

fn card(index: usize, candidate: &Candidate) -> CandidateCard {
    let mut found = candidate.found_skills();
    let more_found = found.len().saturating_sub(MAX_FOUND_TAGS);
    found.truncate(MAX_FOUND_TAGS);
    CandidateCard {
        rank: index + 1,
        filename: candidate.filename.clone(),
        score: candidate.score,
        found_skills: found,
        more_found,
        missing_skills: candidate.missing_skills(),
    }
}
