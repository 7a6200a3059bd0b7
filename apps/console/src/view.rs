//! Terminal view: turns a [`RenderModel`] into printable lines.
//!
//! Pure string formatting; actual printing happens at the call sites in
//! `screen.rs` so these functions stay testable.

use crate::models::{JobState, StatusSnapshot};
use crate::projector::{CandidateCard, RenderModel, Screen};

pub fn lines(model: &RenderModel) -> Vec<String> {
    let mut out = match &model.screen {
        Screen::Form => vec!["Ready to screen. Submit a job description and a ZIP of CVs.".to_string()],
        Screen::Uploading { percent } => vec![upload_line(*percent)],
        Screen::Polling { status, .. } => vec![status_line(status.as_ref())],
        Screen::Complete {
            job_id,
            total,
            cards,
        } => {
            let mut block = vec![format!(
                "Analysis complete for job #{job_id}: processed {total} resumes."
            )];
            block.push(format!("Top {} candidates:", cards.len()));
            for card in cards {
                block.extend(card_lines(card));
            }
            block
        }
        Screen::Failed { job_id, .. } => {
            vec![format!("Screening job #{job_id} failed on the backend.")]
        }
    };
    if let Some(error) = &model.error {
        out.push(format!("Error: {error}"));
    }
    out
}

pub fn upload_line(percent: u8) -> String {
    format!("Uploading archive... {percent}%")
}

pub fn status_line(status: Option<&StatusSnapshot>) -> String {
    match status {
        None => "Waiting for first status report...".to_string(),
        Some(s) if s.status == JobState::Processing => format!(
            "Analyzing resumes: {}/{} ({:.0}%)",
            s.processed, s.total, s.percentage
        ),
        Some(s) => format!("Status: {}", s.status),
    }
}

fn card_lines(card: &CandidateCard) -> Vec<String> {
    let mut out = vec![format!(
        "  #{} {} (match score {:.1}%)",
        card.rank, card.filename, card.score
    )];
    if !card.found_skills.is_empty() {
        let mut tags = card.found_skills.join(", ");
        if card.more_found > 0 {
            tags.push_str(&format!(" (+{} more)", card.more_found));
        }
        out.push(format!("     skills found: {tags}"));
    }
    if !card.missing_skills.is_empty() {
        out.push(format!(
            "     missing must-haves: {}",
            card.missing_skills.join(", ")
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(found: usize, more: usize, missing: usize) -> CandidateCard {
        CandidateCard {
            rank: 1,
            filename: "alice.pdf".to_string(),
            score: 92.55,
            found_skills: (0..found).map(|i| format!("s{i}")).collect(),
            more_found: more,
            missing_skills: (0..missing).map(|i| format!("m{i}")).collect(),
        }
    }

    #[test]
    fn test_score_renders_with_one_decimal() {
        let lines = card_lines(&card(1, 0, 0));
        assert!(lines[0].contains("92.5%"), "{}", lines[0]);
    }

    #[test]
    fn test_overflow_badge_names_hidden_count() {
        let lines = card_lines(&card(10, 3, 0));
        let skills = &lines[1];
        assert!(skills.ends_with("(+3 more)"), "{skills}");
    }

    #[test]
    fn test_no_badge_without_overflow() {
        let lines = card_lines(&card(4, 0, 0));
        assert!(!lines[1].contains("more"), "{}", lines[1]);
    }

    #[test]
    fn test_empty_skill_sections_are_omitted() {
        let lines = card_lines(&card(0, 0, 0));
        assert_eq!(lines.len(), 1);
    }

    #[test]
    fn test_missing_skills_listed_in_full() {
        let lines = card_lines(&card(0, 0, 12));
        let missing = lines.last().unwrap();
        assert!(missing.contains("m0") && missing.contains("m11"), "{missing}");
    }

    #[test]
    fn test_processing_status_line() {
        let s = StatusSnapshot {
            status: JobState::Processing,
            processed: 3,
            total: 10,
            percentage: 30.0,
        };
        assert_eq!(status_line(Some(&s)), "Analyzing resumes: 3/10 (30%)");
    }

    #[test]
    fn test_queued_status_line() {
        let s = StatusSnapshot {
            status: JobState::Queued,
            processed: 0,
            total: 10,
            percentage: 0.0,
        };
        assert_eq!(status_line(Some(&s)), "Status: Queued");
    }

    #[test]
    fn test_error_is_appended_to_any_screen() {
        let model = RenderModel {
            screen: Screen::Form,
            error: Some("Please enter a job description".to_string()),
        };
        let lines = lines(&model);
        assert_eq!(
            lines.last().unwrap(),
            "Error: Please enter a job description"
        );
    }
}
