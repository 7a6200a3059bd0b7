//! The single "active job" slot.
//!
//! A session owns at most one screening job at a time. Starting a new
//! submission bumps the generation counter, cancels the previous poll task,
//! and resets every piece of job state (full reset, not merge). Poll events
//! are applied only when their generation matches the session's current one,
//! so a response that was in flight when the slot changed hands can never
//! resurrect stale data.

use std::time::Duration;

use tokio::sync::mpsc;
use tracing::debug;

use crate::api::ScreeningClient;
use crate::models::{Candidate, JobId, StatusSnapshot, UploadReceipt};
use crate::polling::{self, PollEvent, PollEventKind, PollHandle};

/// Where the client currently is in one screening attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No active job; the form is open.
    Form,
    /// Upload in flight, progress below 100.
    Uploading,
    /// Job id known, waiting for a terminal status.
    Polling,
    /// Terminal: shortlist stored.
    Complete,
    /// Terminal: backend reported failure.
    Failed,
}

/// Everything the presentation projector reads. Plain data, no handles.
#[derive(Debug, Clone)]
pub struct SessionState {
    pub phase: Phase,
    pub upload_progress: u8,
    pub job_id: Option<JobId>,
    pub snapshot: Option<StatusSnapshot>,
    pub candidates: Vec<Candidate>,
    pub error: Option<String>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            phase: Phase::Form,
            upload_progress: 0,
            job_id: None,
            snapshot: None,
            candidates: Vec::new(),
            error: None,
        }
    }
}

pub struct ScreeningSession {
    client: ScreeningClient,
    poll_interval: Duration,
    generation: u64,
    active: Option<PollHandle>,
    events: Option<mpsc::UnboundedReceiver<PollEvent>>,
    state: SessionState,
}

impl ScreeningSession {
    pub fn new(client: ScreeningClient, poll_interval: Duration) -> Self {
        Self {
            client,
            poll_interval,
            generation: 0,
            active: None,
            events: None,
            state: SessionState::default(),
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    #[cfg(test)]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Enters `Uploading`, wiping all state from any previous job.
    pub fn begin_upload(&mut self) {
        self.invalidate();
        self.state = SessionState {
            phase: Phase::Uploading,
            ..SessionState::default()
        };
    }

    /// Records upload progress. Ignores values that would move backwards.
    pub fn set_upload_progress(&mut self, percent: u8) {
        if self.state.phase == Phase::Uploading && percent > self.state.upload_progress {
            self.state.upload_progress = percent.min(100);
        }
    }

    /// Submission failed: back to the form with the message in the inline
    /// error area. The user may resubmit immediately.
    pub fn submission_failed(&mut self, message: String) {
        self.invalidate();
        self.state = SessionState {
            phase: Phase::Form,
            error: Some(message),
            ..SessionState::default()
        };
    }

    /// Upload succeeded: the receipt's job id takes the active slot and the
    /// poll task starts under the current generation.
    pub fn activate(&mut self, receipt: &UploadReceipt) {
        self.state.phase = Phase::Polling;
        self.state.upload_progress = 100;
        self.state.job_id = Some(receipt.job_id.clone());
        let (handle, events) = polling::spawn(
            self.client.clone(),
            receipt.job_id.clone(),
            self.generation,
            self.poll_interval,
        );
        self.active = Some(handle);
        self.events = Some(events);
    }

    /// Next poll event, or `None` when no poll task is attached (or the task
    /// has ended and drained).
    pub async fn next_event(&mut self) -> Option<PollEvent> {
        match self.events.as_mut() {
            Some(receiver) => receiver.recv().await,
            None => None,
        }
    }

    /// Applies a poll event. Returns whether state changed; events from a
    /// stale generation or outside the polling phase are discarded.
    pub fn apply(&mut self, event: PollEvent) -> bool {
        if event.generation != self.generation {
            debug!(
                event_generation = event.generation,
                current_generation = self.generation,
                job_id = %event.job_id,
                "discarding stale poll event"
            );
            return false;
        }
        if self.state.phase != Phase::Polling {
            return false;
        }
        match event.kind {
            PollEventKind::Snapshot(snapshot) => {
                self.state.snapshot = Some(snapshot);
            }
            PollEventKind::Complete {
                snapshot,
                candidates,
            } => {
                self.state.snapshot = Some(snapshot);
                self.state.candidates = candidates;
                self.state.phase = Phase::Complete;
            }
            PollEventKind::Failed(snapshot) => {
                self.state.snapshot = Some(snapshot);
                self.state.error = Some(format!("Screening job {} failed", event.job_id));
                self.state.phase = Phase::Failed;
            }
        }
        true
    }

    /// Full reset to the empty form. Cancels any running poll task.
    pub fn reset(&mut self) {
        self.invalidate();
        self.state = SessionState::default();
    }

    /// Bumps the generation and tears down the active poll task, so nothing
    /// started before this point can touch state again.
    fn invalidate(&mut self) {
        self.generation += 1;
        if let Some(handle) = self.active.take() {
            handle.cancel();
        }
        self.events = None;
    }
}
