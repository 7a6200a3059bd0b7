//! The `screen` subcommand: one full submit, poll, render cycle.

use std::time::Duration;

use anyhow::{anyhow, Result};
use tokio::sync::watch;
use tracing::info;

use crate::api::ScreeningClient;
use crate::projector;
use crate::session::{Phase, ScreeningSession};
use crate::submission::{self, SubmissionRequest};
use crate::view;

pub async fn run(
    client: ScreeningClient,
    poll_interval: Duration,
    request: SubmissionRequest,
) -> Result<()> {
    let mut session = ScreeningSession::new(client.clone(), poll_interval);

    let outcome = tokio::select! {
        res = drive(&mut session, &client, &request) => Some(res),
        _ = tokio::signal::ctrl_c() => None,
    };

    match outcome {
        Some(result) => result,
        None => {
            // Tear down the poll task before exiting so the abandoned job id
            // is never fetched again.
            session.reset();
            println!();
            println!("Cancelled.");
            Err(anyhow!("cancelled by user"))
        }
    }
}

async fn drive(
    session: &mut ScreeningSession,
    client: &ScreeningClient,
    request: &SubmissionRequest,
) -> Result<()> {
    session.begin_upload();
    print_model(session);

    let (progress_tx, mut progress_rx) = watch::channel(0u8);
    let receipt = {
        let submit = submission::submit(client, request, progress_tx);
        tokio::pin!(submit);
        loop {
            tokio::select! {
                res = &mut submit => break res,
                Ok(()) = progress_rx.changed() => {
                    let percent = *progress_rx.borrow_and_update();
                    session.set_upload_progress(percent);
                    println!("{}", view::upload_line(percent));
                }
            }
        }
    };

    let receipt = match receipt {
        Ok(receipt) => receipt,
        Err(err) => {
            let message = err.user_message();
            session.submission_failed(message.clone());
            print_model(session);
            return Err(anyhow!(message));
        }
    };

    if let Some(message) = &receipt.message {
        info!("backend: {message}");
    }
    let found = receipt
        .total_cvs_found
        .map(|n| format!(" ({n} CVs found)"))
        .unwrap_or_default();
    println!("Processing job #{}{found}", receipt.job_id);

    session.activate(&receipt);

    loop {
        let Some(event) = session.next_event().await else {
            return Err(anyhow!("status stream ended before a terminal state"));
        };
        if !session.apply(event) {
            continue;
        }
        print_model(session);
        match session.state().phase {
            Phase::Complete => return Ok(()),
            Phase::Failed => {
                let message = session
                    .state()
                    .error
                    .clone()
                    .unwrap_or_else(|| "screening job failed".to_string());
                return Err(anyhow!(message));
            }
            _ => {}
        }
    }
}

fn print_model(session: &ScreeningSession) {
    for line in view::lines(&projector::project(session.state())) {
        println!("{line}");
    }
}
