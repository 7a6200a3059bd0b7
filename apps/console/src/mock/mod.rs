#![allow(dead_code)]

//! In-process stand-in for the screening backend.
//!
//! Serves the exact wire contract the console consumes, driven by a
//! [`ScreeningScript`] instead of real résumé processing. The test suite
//! binds it to an ephemeral port; the `mock` subcommand serves it for local
//! demos against a real console process.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard};

use axum::extract::{DefaultBodyLimit, Multipart, Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::task::JoinHandle;
use tracing::info;

use crate::models::{Candidate, JobId, StatusSnapshot};

pub mod state;

pub use state::{step, ScreeningScript};

use state::MockState;

/// Mirrors the backend's 500 MB MAX_CONTENT_LENGTH.
const MAX_UPLOAD_BYTES: usize = 500 * 1024 * 1024;

type ApiResult<T> = Result<T, (StatusCode, Json<Value>)>;

fn reject(status: StatusCode, message: &str) -> (StatusCode, Json<Value>) {
    (status, Json(json!({ "error": message })))
}

/// Candidate fixtures in descending score order, skills pre-encoded the way
/// the backend stores them.
pub fn fixture_candidates(count: usize) -> Vec<Candidate> {
    const FILENAMES: [&str; 6] = [
        "alice_nguyen.pdf",
        "bob_santos.docx",
        "carol_osei.pdf",
        "dmitri_volkov.txt",
        "erin_walsh.pdf",
        "farid_haddad.docx",
    ];
    const FOUND: [&[&str]; 3] = [
        &["Python", "Go", "Kubernetes", "PostgreSQL", "Docker"],
        &["Python", "AWS", "Terraform"],
        &["Java", "Spring"],
    ];
    const MISSING: [&[&str]; 3] = [&[], &["Kubernetes"], &["Go", "Kubernetes"]];

    (0..count)
        .map(|i| Candidate {
            id: i as i64 + 1,
            filename: FILENAMES[i % FILENAMES.len()].to_string(),
            score: 95.0 - i as f64 * 7.5,
            found_skills: Some(serde_json::to_string(FOUND[i % FOUND.len()]).expect("fixture")),
            missing_skills: Some(
                serde_json::to_string(MISSING[i % MISSING.len()]).expect("fixture"),
            ),
        })
        .collect()
}

#[derive(Clone)]
pub struct MockBackend {
    state: Arc<Mutex<MockState>>,
}

impl MockBackend {
    pub fn new(script: ScreeningScript) -> Self {
        Self {
            state: Arc::new(Mutex::new(MockState::new(script))),
        }
    }

    pub fn router(&self) -> Router {
        Router::new()
            .route("/upload-zip", post(upload_zip))
            .route("/job-status/:job_id", get(job_status))
            .route("/shortlist/:job_id", get(shortlist))
            .route("/health", get(health))
            .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
            .with_state(self.clone())
    }

    /// Binds an ephemeral localhost port and serves in a background task.
    pub async fn spawn(&self) -> (SocketAddr, JoinHandle<()>) {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock backend");
        let addr = listener.local_addr().expect("mock local addr");
        let app = self.router();
        let task = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("mock backend serve");
        });
        (addr, task)
    }

    /// Serves on a fixed port until the process exits (`mock` subcommand).
    pub async fn serve(&self, port: u16) -> anyhow::Result<()> {
        let addr = SocketAddr::from(([127, 0, 0, 1], port));
        let listener = tokio::net::TcpListener::bind(addr).await?;
        info!("mock screening backend listening on http://{addr}");
        axum::serve(listener, self.router()).await?;
        Ok(())
    }

    /// Creates a scripted job without going through `/upload-zip`.
    pub fn register_job(&self) -> JobId {
        JobId::from(self.lock().create_job())
    }

    /// Fails the next `count` `/job-status` hits with a 500.
    pub fn inject_status_failures(&self, count: u32) {
        self.lock().fail_status_hits = count;
    }

    pub fn status_hits(&self, job_id: &JobId) -> u64 {
        self.job_counter(job_id, |job| job.status_hits)
    }

    pub fn shortlist_hits(&self, job_id: &JobId) -> u64 {
        self.job_counter(job_id, |job| job.shortlist_hits)
    }

    fn job_counter(&self, job_id: &JobId, read: impl Fn(&state::MockJob) -> u64) -> u64 {
        let id: u64 = match job_id.as_str().parse() {
            Ok(id) => id,
            Err(_) => return 0,
        };
        self.lock().jobs.get(&id).map(read).unwrap_or(0)
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().expect("mock state lock poisoned")
    }
}

/// POST /upload-zip with the backend's validation order and error texts.
async fn upload_zip(
    State(mock): State<MockBackend>,
    mut multipart: Multipart,
) -> ApiResult<Json<Value>> {
    let mut zip_part_seen = false;
    let mut zip_filename: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| reject(StatusCode::BAD_REQUEST, &err.to_string()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "zip_file" => {
                zip_part_seen = true;
                zip_filename = field.file_name().map(str::to_string);
                // Drain the body so streaming uploads complete.
                field
                    .bytes()
                    .await
                    .map_err(|err| reject(StatusCode::BAD_REQUEST, &err.to_string()))?;
            }
            "description" | "must_haves" => {
                field
                    .text()
                    .await
                    .map_err(|err| reject(StatusCode::BAD_REQUEST, &err.to_string()))?;
            }
            _ => {}
        }
    }

    if !zip_part_seen {
        return Err(reject(StatusCode::BAD_REQUEST, "No ZIP file uploaded"));
    }
    let filename = zip_filename.unwrap_or_default();
    if filename.is_empty() {
        return Err(reject(StatusCode::BAD_REQUEST, "No selected file"));
    }
    if !filename.to_ascii_lowercase().ends_with(".zip") {
        return Err(reject(StatusCode::BAD_REQUEST, "File must be a ZIP archive"));
    }

    let (job_id, total) = {
        let mut state = mock.lock();
        let total = state.script.total();
        (state.create_job(), total)
    };

    Ok(Json(json!({
        "message": "Started processing ZIP file",
        "job_id": job_id,
        "total_cvs_found": total,
    })))
}

/// GET /job-status/:job_id, advancing the job's script by one step.
async fn job_status(
    State(mock): State<MockBackend>,
    Path(job_id): Path<String>,
) -> ApiResult<Json<StatusSnapshot>> {
    let mut state = mock.lock();
    if state.fail_status_hits > 0 {
        state.fail_status_hits -= 1;
        return Err(reject(
            StatusCode::INTERNAL_SERVER_ERROR,
            "injected status failure",
        ));
    }
    let id: u64 = job_id
        .parse()
        .map_err(|_| reject(StatusCode::NOT_FOUND, "Job not found"))?;
    let job = state
        .jobs
        .get_mut(&id)
        .ok_or_else(|| reject(StatusCode::NOT_FOUND, "Job not found"))?;
    job.status_hits += 1;
    Ok(Json(job.advance()))
}

/// GET /shortlist/:job_id
async fn shortlist(
    State(mock): State<MockBackend>,
    Path(job_id): Path<String>,
) -> ApiResult<Json<Value>> {
    let mut state = mock.lock();
    let id: u64 = job_id
        .parse()
        .map_err(|_| reject(StatusCode::NOT_FOUND, "Job not found"))?;
    let job = state
        .jobs
        .get_mut(&id)
        .ok_or_else(|| reject(StatusCode::NOT_FOUND, "Job not found"))?;
    job.shortlist_hits += 1;
    Ok(Json(json!({
        "status": job.current().status,
        "top_5": job.script.shortlist.clone(),
    })))
}

/// GET /health
async fn health() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "smarthire-mock",
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::multipart::{Form, Part};

    async fn post_upload(addr: SocketAddr, form: Form) -> (u16, Value) {
        let response = reqwest::Client::new()
            .post(format!("http://{addr}/upload-zip"))
            .multipart(form)
            .send()
            .await
            .unwrap();
        let status = response.status().as_u16();
        let body = response.json().await.unwrap();
        (status, body)
    }

    fn zip_part(filename: &str) -> Part {
        Part::bytes(vec![0x50, 0x4b, 0x03, 0x04]).file_name(filename.to_string())
    }

    #[tokio::test]
    async fn test_upload_without_zip_part_is_rejected() {
        let mock = MockBackend::new(ScreeningScript::completing(3, Vec::new()));
        let (addr, _server) = mock.spawn().await;
        let form = Form::new().text("description", "desc");
        let (status, body) = post_upload(addr, form).await;
        assert_eq!(status, 400);
        assert_eq!(body["error"], "No ZIP file uploaded");
    }

    #[tokio::test]
    async fn test_upload_with_non_zip_filename_is_rejected() {
        let mock = MockBackend::new(ScreeningScript::completing(3, Vec::new()));
        let (addr, _server) = mock.spawn().await;
        let form = Form::new()
            .part("zip_file", zip_part("cvs.rar"))
            .text("description", "desc")
            .text("must_haves", "");
        let (status, body) = post_upload(addr, form).await;
        assert_eq!(status, 400);
        assert_eq!(body["error"], "File must be a ZIP archive");
    }

    #[tokio::test]
    async fn test_upload_issues_sequential_job_ids() {
        let mock = MockBackend::new(ScreeningScript::completing(3, Vec::new()));
        let (addr, _server) = mock.spawn().await;
        for expected in 1..=2 {
            let form = Form::new()
                .part("zip_file", zip_part("cvs.zip"))
                .text("description", "desc")
                .text("must_haves", "");
            let (status, body) = post_upload(addr, form).await;
            assert_eq!(status, 200);
            assert_eq!(body["job_id"], expected);
            assert_eq!(body["total_cvs_found"], 3);
        }
    }

    #[tokio::test]
    async fn test_shortlist_counts_hits_and_serves_fixtures() {
        let mock = MockBackend::new(ScreeningScript::completing(3, fixture_candidates(5)));
        let (addr, _server) = mock.spawn().await;
        let job_id = mock.register_job();

        let body: Value = reqwest::get(format!("http://{addr}/shortlist/{job_id}"))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(body["top_5"].as_array().unwrap().len(), 5);
        assert_eq!(mock.shortlist_hits(&job_id), 1);
    }

    #[tokio::test]
    async fn test_injected_failures_burn_off() {
        let mock = MockBackend::new(ScreeningScript::completing(3, Vec::new()));
        let (addr, _server) = mock.spawn().await;
        let job_id = mock.register_job();
        mock.inject_status_failures(1);

        let first = reqwest::get(format!("http://{addr}/job-status/{job_id}"))
            .await
            .unwrap();
        assert_eq!(first.status().as_u16(), 500);

        let second = reqwest::get(format!("http://{addr}/job-status/{job_id}"))
            .await
            .unwrap();
        assert_eq!(second.status().as_u16(), 200);
    }

    #[test]
    fn test_fixture_candidates_scores_descend() {
        let fixtures = fixture_candidates(5);
        assert!(fixtures.windows(2).all(|w| w[0].score >= w[1].score));
        assert!(fixtures.iter().all(|c| c.found_skills.is_some()));
    }
}
