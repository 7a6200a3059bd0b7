//! Status poller: drives one job from submission to a terminal outcome.
//!
//! A spawned task ticks at a fixed cadence, fetches `/job-status`, and emits
//! generation-tagged events. Tick failures are logged and swallowed; the next
//! tick is the retry. On `Completed` the shortlist is fetched exactly once
//! and the task stops. Cancelling the handle stops the timer and prevents any
//! in-flight response from being emitted.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::api::ScreeningClient;
use crate::models::{Candidate, JobId, JobState, StatusSnapshot};

/// Status poll cadence unless overridden by configuration.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

#[derive(Debug)]
pub enum PollEventKind {
    /// A fresh snapshot; supersedes the previous one.
    Snapshot(StatusSnapshot),
    /// Terminal success: the shortlist was fetched and the poller stopped.
    Complete {
        snapshot: StatusSnapshot,
        candidates: Vec<Candidate>,
    },
    /// Terminal failure reported by the backend; no shortlist exists.
    Failed(StatusSnapshot),
}

/// One observation from the poll task. `generation` identifies the
/// submission that spawned the task; consumers must discard events whose
/// generation is not the current one.
#[derive(Debug)]
pub struct PollEvent {
    pub generation: u64,
    pub job_id: JobId,
    pub kind: PollEventKind,
}

/// Owner handle for a running poll task. Dropping it cancels the task.
pub struct PollHandle {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl PollHandle {
    pub fn cancel(&self) {
        self.cancel.cancel();
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
        self.task.abort();
    }
}

/// Starts polling `job_id` every `interval`. The first fetch happens one full
/// interval after spawn, not immediately.
pub fn spawn(
    client: ScreeningClient,
    job_id: JobId,
    generation: u64,
    interval: Duration,
) -> (PollHandle, mpsc::UnboundedReceiver<PollEvent>) {
    let cancel = CancellationToken::new();
    let (events, receiver) = mpsc::unbounded_channel();
    let task = tokio::spawn(poll_loop(
        client,
        job_id,
        generation,
        interval,
        cancel.clone(),
        events,
    ));
    (PollHandle { cancel, task }, receiver)
}

async fn poll_loop(
    client: ScreeningClient,
    job_id: JobId,
    generation: u64,
    interval: Duration,
    cancel: CancellationToken,
    events: mpsc::UnboundedSender<PollEvent>,
) {
    let mut ticker = time::interval_at(time::Instant::now() + interval, interval);
    // One request per tick boundary; a slow response delays the next tick
    // instead of stacking requests.
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let send = |kind: PollEventKind| {
        events
            .send(PollEvent {
                generation,
                job_id: job_id.clone(),
                kind,
            })
            .is_ok()
    };

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {}
        }

        let snapshot = tokio::select! {
            _ = cancel.cancelled() => break,
            res = client.job_status(&job_id) => match res {
                Ok(snapshot) => snapshot,
                Err(err) => {
                    warn!(job_id = %job_id, error = %err, "status poll failed; retrying next tick");
                    continue;
                }
            }
        };

        match snapshot.status {
            JobState::Completed => {
                let shortlist = tokio::select! {
                    _ = cancel.cancelled() => break,
                    res = client.shortlist(&job_id) => res
                };
                match shortlist {
                    Ok(shortlist) => {
                        debug!(
                            job_id = %job_id,
                            candidates = shortlist.top_5.len(),
                            "job completed, shortlist stored"
                        );
                        send(PollEventKind::Complete {
                            snapshot,
                            candidates: shortlist.top_5,
                        });
                        break;
                    }
                    Err(err) => {
                        warn!(job_id = %job_id, error = %err, "shortlist fetch failed; retrying next tick");
                        // Surface the terminal status meanwhile; next tick
                        // re-runs the status fetch and the shortlist fetch.
                        if !send(PollEventKind::Snapshot(snapshot)) {
                            break;
                        }
                    }
                }
            }
            JobState::Failed => {
                send(PollEventKind::Failed(snapshot));
                break;
            }
            _ => {
                if !send(PollEventKind::Snapshot(snapshot)) {
                    break;
                }
            }
        }
    }
}
