use autostep_core::job::Job;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

use crate::error::AppError;
use crate::state::AppState;

/// GET /api/queue: local job queue in arrival order.
pub async fn get_queue(State(app): State<AppState>) -> Json<Vec<Job>> {
    Json(app.orchestrator.snapshot())
}

/// POST /api/queue: queue a job by hand. The job runs on a later run tick
/// like any fetched job.
pub async fn enqueue_job(
    State(app): State<AppState>,
    Json(job): Json<Job>,
) -> Result<(StatusCode, Json<Job>), AppError> {
    if job.id.trim().is_empty() {
        return Err(AppError::bad_request("job id must not be empty"));
    }
    if job.state.is_terminal() || job.running {
        return Err(AppError::bad_request("only pending jobs can be queued"));
    }
    if !app.orchestrator.enqueue(job.clone()) {
        return Err(AppError::conflict(format!("job '{}' is already queued", job.id)));
    }
    Ok((StatusCode::CREATED, Json(job)))
}
