//! Scripted state behind the mock backend.

use std::collections::HashMap;

use crate::models::{Candidate, JobState, StatusSnapshot};

/// Builds a snapshot with the backend's percentage convention:
/// `round(processed / total * 100, 1)`, or 0 when total is 0.
pub fn step(status: JobState, processed: u64, total: u64) -> StatusSnapshot {
    let percentage = if total > 0 {
        (processed as f64 / total as f64 * 1000.0).round() / 10.0
    } else {
        0.0
    };
    StatusSnapshot {
        status,
        processed,
        total,
        percentage,
    }
}

/// Scripted lifecycle applied to every job created against the mock.
///
/// Each `/job-status` hit serves one step and advances the cursor; the last
/// step holds forever.
#[derive(Debug, Clone)]
pub struct ScreeningScript {
    pub steps: Vec<StatusSnapshot>,
    pub shortlist: Vec<Candidate>,
}

impl ScreeningScript {
    /// Queued, half-way Processing, then Completed.
    pub fn completing(total: u64, shortlist: Vec<Candidate>) -> Self {
        Self {
            steps: vec![
                step(JobState::Queued, 0, total),
                step(JobState::Processing, total / 2, total),
                step(JobState::Completed, total, total),
            ],
            shortlist,
        }
    }

    /// Queued, early Processing, then Failed. No shortlist exists.
    pub fn failing(total: u64) -> Self {
        Self {
            steps: vec![
                step(JobState::Queued, 0, total),
                step(JobState::Processing, total / 3, total),
                step(JobState::Failed, total / 3, total),
            ],
            shortlist: Vec::new(),
        }
    }

    /// Never reaches a terminal state; the Processing step holds.
    pub fn stuck(total: u64) -> Self {
        Self {
            steps: vec![
                step(JobState::Queued, 0, total),
                step(JobState::Processing, 1, total),
            ],
            shortlist: Vec::new(),
        }
    }

    pub fn total(&self) -> u64 {
        self.steps.last().map(|s| s.total).unwrap_or_default()
    }
}

/// One job instance walking its script.
#[derive(Debug)]
pub struct MockJob {
    pub script: ScreeningScript,
    pub cursor: usize,
    pub status_hits: u64,
    pub shortlist_hits: u64,
}

impl MockJob {
    pub fn new(script: ScreeningScript) -> Self {
        Self {
            script,
            cursor: 0,
            status_hits: 0,
            shortlist_hits: 0,
        }
    }

    /// Serves the current step and moves the cursor, holding the last step.
    pub fn advance(&mut self) -> StatusSnapshot {
        let snapshot = self.current();
        if self.cursor + 1 < self.script.steps.len() {
            self.cursor += 1;
        }
        snapshot
    }

    pub fn current(&self) -> StatusSnapshot {
        self.script.steps[self.cursor].clone()
    }
}

#[derive(Debug)]
pub struct MockState {
    pub next_job_id: u64,
    pub jobs: HashMap<u64, MockJob>,
    pub script: ScreeningScript,
    /// Fail this many upcoming `/job-status` hits with a 500.
    pub fail_status_hits: u32,
}

impl MockState {
    pub fn new(script: ScreeningScript) -> Self {
        Self {
            next_job_id: 1,
            jobs: HashMap::new(),
            script,
            fail_status_hits: 0,
        }
    }

    pub fn create_job(&mut self) -> u64 {
        let id = self.next_job_id;
        self.next_job_id += 1;
        self.jobs.insert(id, MockJob::new(self.script.clone()));
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_percentage_matches_backend_rounding() {
        assert!((step(JobState::Processing, 3, 10).percentage - 30.0).abs() < f64::EPSILON);
        assert!((step(JobState::Processing, 1, 3).percentage - 33.3).abs() < f64::EPSILON);
        assert!((step(JobState::Queued, 0, 0).percentage - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_job_walks_script_and_holds_last_step() {
        let mut job = MockJob::new(ScreeningScript::completing(10, Vec::new()));
        assert_eq!(job.advance().status, JobState::Queued);
        assert_eq!(job.advance().status, JobState::Processing);
        assert_eq!(job.advance().status, JobState::Completed);
        assert_eq!(job.advance().status, JobState::Completed);
        assert_eq!(job.current().status, JobState::Completed);
    }

    #[test]
    fn test_stuck_script_never_terminates() {
        let mut job = MockJob::new(ScreeningScript::stuck(4));
        for _ in 0..20 {
            assert!(!job.advance().status.is_terminal());
        }
    }

    #[test]
    fn test_create_job_issues_sequential_ids() {
        let mut state = MockState::new(ScreeningScript::completing(1, Vec::new()));
        assert_eq!(state.create_job(), 1);
        assert_eq!(state.create_job(), 2);
        assert_eq!(state.jobs.len(), 2);
    }
}
